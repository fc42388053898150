mod app_state;
mod config;
mod db;
mod models;
mod routes;
mod services;

use axum::{routing::get, routing::post, Json, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::json;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::{auth::AuthService, storage::ImageStore};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing reporters-note server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("job_claims_total", "Jobs claimed by workers");
    metrics::describe_counter!(
        "job_claim_conflicts_total",
        "Claim attempts refused because the job was no longer open"
    );
    metrics::describe_counter!("reports_submitted_total", "Photo reports submitted");
    metrics::describe_counter!("job_approvals_total", "Jobs approved by admins");
    metrics::describe_counter!("job_rejections_total", "Jobs rejected back to workers");
    metrics::describe_histogram!(
        "report_submission_seconds",
        "Time to upload photos and record a report"
    );

    // Initialize database connection pool
    tracing::info!("Connecting to PostgreSQL database");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run database migrations
    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // Initialize image storage client
    tracing::info!("Initializing image storage client");
    let storage = ImageStore::new(
        &config.s3_bucket,
        &config.s3_endpoint,
        &config.s3_access_key,
        &config.s3_secret_key,
        &config.s3_public_url,
    )
    .expect("Failed to initialize image storage client");

    // Initialize session/auth service
    let auth = AuthService::new(
        &config.jwt_secret,
        config.admin_email_list(),
        config.session_ttl_hours,
    );

    // Create shared application state
    let state = AppState::new(db_pool, storage, auth);

    // Build API routes
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                Json(json!({
                    "service": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }))
            }),
        )
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/v1/auth/signup", post(routes::auth::signup))
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route("/api/v1/auth/callback", get(routes::auth::callback))
        .route("/api/v1/auth/logout", post(routes::auth::logout))
        .route("/api/v1/me", get(routes::auth::me))
        // Worker-facing job routes
        .route("/api/v1/jobs", get(routes::jobs::list_open))
        .route("/api/v1/jobs/mine", get(routes::jobs::my_jobs))
        .route("/api/v1/jobs/{id}", get(routes::jobs::job_detail))
        .route("/api/v1/jobs/{id}/claim", post(routes::jobs::claim))
        .route("/api/v1/jobs/{id}/report", post(routes::reports::submit_report))
        // Admin routes
        .route(
            "/api/v1/admin/jobs",
            get(routes::admin::list_jobs).post(routes::admin::create_job),
        )
        .route(
            "/api/v1/admin/jobs/{id}/report",
            get(routes::admin::latest_report),
        )
        .route("/api/v1/admin/jobs/{id}/approve", post(routes::admin::approve))
        .route("/api/v1/admin/jobs/{id}/reject", post(routes::admin::reject))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting reporters-note on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

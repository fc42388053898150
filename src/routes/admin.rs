use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::db::job_queries::{self, NewJob};
use crate::db::report_queries;
use crate::models::job::{validate_feedback, JobStatus};
use crate::models::report::{PhotoUpload, Report};
use crate::routes::auth::AdminSession;
use crate::routes::error::AppError;
use crate::routes::jobs::JobView;
use crate::services::storage;

/// Admin home: everything still in flight, grouped by status.
#[derive(Debug, Serialize)]
pub struct AdminJobsResponse {
    pub review: Vec<JobView>,
    pub assigned: Vec<JobView>,
    pub open: Vec<JobView>,
}

/// GET /api/v1/admin/jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
) -> Result<Json<AdminJobsResponse>, AppError> {
    let jobs = job_queries::list_active_jobs(&state.db).await?;

    let mut response = AdminJobsResponse {
        review: Vec::new(),
        assigned: Vec::new(),
        open: Vec::new(),
    };
    for job in jobs {
        match job.status {
            JobStatus::Review => response.review.push(job.into()),
            JobStatus::Assigned => response.assigned.push(job.into()),
            JobStatus::Open => response.open.push(job.into()),
            JobStatus::Completed => {}
        }
    }

    Ok(Json(response))
}

#[derive(Debug, Default, Validate)]
struct NewJobForm {
    #[garde(length(min = 1, max = 200))]
    title: String,

    #[garde(length(min = 1, max = 200))]
    company: String,

    #[garde(length(min = 1, max = 100))]
    reward: String,

    #[garde(length(min = 1, max = 200))]
    location: String,

    #[garde(length(min = 1, max = 10_000))]
    description: String,

    #[garde(skip)]
    reference_image: Option<PhotoUpload>,
}

/// POST /api/v1/admin/jobs — post a new assignment.
///
/// The optional reference image is uploaded before the row insert, so
/// a failed insert can leave an orphaned blob but never a job without
/// its image.
pub async fn create_job(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    multipart: Multipart,
) -> Result<(StatusCode, Json<JobView>), AppError> {
    let form = parse_job_form(multipart).await?;
    form.validate()?;

    let reference_image = match &form.reference_image {
        Some(image) => {
            let format = image::guess_format(&image.bytes)
                .map_err(|_| AppError::Validation("unsupported image format".to_string()))?;
            let key = storage::reference_image_key(&image.filename);
            let url = state
                .storage
                .upload(&key, &image.bytes, format.to_mime_type())
                .await?;
            Some(url)
        }
        None => None,
    };

    let job = job_queries::create_job(
        &state.db,
        &NewJob {
            title: form.title,
            company: form.company,
            reward: form.reward,
            location: form.location,
            description: form.description,
            reference_image,
        },
    )
    .await?;

    tracing::info!(job_id = job.id, admin = %session.email, "job posted");
    Ok((StatusCode::CREATED, Json(job.into())))
}

/// GET /api/v1/admin/jobs/{id}/report — latest report for review.
pub async fn latest_report(
    State(state): State<AppState>,
    AdminSession(_): AdminSession,
    Path(job_id): Path<i64>,
) -> Result<Json<Report>, AppError> {
    job_queries::get_job(&state.db, job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let report = report_queries::latest_report_for_job(&state.db, job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(report))
}

/// POST /api/v1/admin/jobs/{id}/approve — review → completed.
pub async fn approve(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(job_id): Path<i64>,
) -> Result<Json<JobView>, AppError> {
    match job_queries::approve_job(&state.db, job_id).await? {
        Some(job) => {
            metrics::counter!("job_approvals_total").increment(1);
            tracing::info!(job_id, admin = %session.email, "job approved");
            Ok(Json(job.into()))
        }
        None => Err(transition_refused(&state, job_id, "approve").await),
    }
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// POST /api/v1/admin/jobs/{id}/reject — review → assigned with feedback.
pub async fn reject(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path(job_id): Path<i64>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<JobView>, AppError> {
    let feedback = validate_feedback(&req.reason).ok_or_else(|| {
        AppError::Validation("a rejection reason is required".to_string())
    })?;

    match job_queries::reject_job(&state.db, job_id, &feedback).await? {
        Some(job) => {
            metrics::counter!("job_rejections_total").increment(1);
            tracing::info!(job_id, admin = %session.email, "job rejected back to worker");
            Ok(Json(job.into()))
        }
        None => Err(transition_refused(&state, job_id, "reject").await),
    }
}

/// A conditional update matched no row: either the job is gone or it
/// is not in the state the operation requires.
async fn transition_refused(state: &AppState, job_id: i64, operation: &str) -> AppError {
    match job_queries::get_job(&state.db, job_id).await {
        Ok(Some(existing)) => {
            tracing::info!(job_id, status = %existing.status, operation, "transition refused");
            AppError::Conflict(format!(
                "cannot {operation} a job in status {}",
                existing.status
            ))
        }
        Ok(None) => AppError::NotFound,
        Err(e) => AppError::Database(e),
    }
}

async fn parse_job_form(mut multipart: Multipart) -> Result<NewJobForm, AppError> {
    let mut form = NewJobForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" => form.title = read_text(field).await?,
            "company" => form.company = read_text(field).await?,
            "reward" => form.reward = read_text(field).await?,
            "location" => form.location = read_text(field).await?,
            "description" => form.description = read_text(field).await?,
            "reference_image" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "reference.jpg".to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("failed to read reference image: {e}"))
                })?;
                form.reference_image = Some(PhotoUpload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed field: {e}")))
}

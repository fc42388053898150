use reporters_note::{
    config::AppConfig,
    db::{self, job_queries, job_queries::NewJob, profile_queries, report_queries},
    models::job::JobStatus,
    models::profile::Profile,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Integration tests: job lifecycle against a real database.
///
/// These exercise the conditional status transitions end to end:
/// claim, submit, reject with feedback, resubmit, approve, and the
/// concurrent-claim race.
///
/// Note: requires a running PostgreSQL instance configured via
/// environment variables. Run with:
/// cargo test --test integration_test -- --ignored

async fn setup() -> PgPool {
    let config = AppConfig::from_env().expect("Failed to load config");
    let pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn test_worker(pool: &PgPool) -> Profile {
    let email = format!("worker-{}@test.invalid", Uuid::new_v4().simple());
    profile_queries::create_profile(pool, &email, "not-a-real-hash")
        .await
        .expect("Failed to create test profile")
}

async fn test_job(pool: &PgPool) -> i64 {
    let job = job_queries::create_job(
        pool,
        &NewJob {
            title: "駅前の街頭ポスター撮影".to_string(),
            company: "テスト商事".to_string(),
            reward: "5000".to_string(),
            location: "釜石市".to_string(),
            description: "指定のポスターを2方向から撮影してください。".to_string(),
            reference_image: None,
        },
    )
    .await
    .expect("Failed to create job");
    assert_eq!(job.status, JobStatus::Open);
    job.id
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_full_lifecycle_with_rejection() {
    let pool = setup().await;
    let worker = test_worker(&pool).await;
    let job_id = test_job(&pool).await;

    // 1. Claim: open → assigned, assignment recorded server-side
    let claimed = job_queries::claim_job(&pool, job_id, worker.id)
        .await
        .expect("claim query failed")
        .expect("claim should succeed on an open job");
    assert_eq!(claimed.status, JobStatus::Assigned);
    assert_eq!(claimed.assigned_worker_id, Some(worker.id));

    // 2. Submit: report row inserted, then assigned → review
    let report = report_queries::create_report(
        &pool,
        job_id,
        Some("https://img.test.invalid/reports/1.jpg"),
        None,
        Some("現地で撮影しました"),
        Some("田中太郎"),
    )
    .await
    .expect("Failed to insert report");
    assert_eq!(report.job_id, job_id);

    let in_review = job_queries::advance_to_review(&pool, job_id, worker.id)
        .await
        .expect("advance query failed")
        .expect("assignee should be able to advance");
    assert_eq!(in_review.status, JobStatus::Review);

    // 3. Reject: review → assigned, feedback carried to the worker
    let rejected = job_queries::reject_job(&pool, job_id, "写真が暗すぎます")
        .await
        .expect("reject query failed")
        .expect("reject should succeed in review");
    assert_eq!(rejected.status, JobStatus::Assigned);
    assert_eq!(rejected.feedback.as_deref(), Some("写真が暗すぎます"));

    // 4. Resubmit and approve: review → completed, terminal
    report_queries::create_report(
        &pool,
        job_id,
        Some("https://img.test.invalid/reports/2.jpg"),
        Some("https://img.test.invalid/reports/3.jpg"),
        None,
        Some("田中太郎"),
    )
    .await
    .expect("Failed to insert second report");

    job_queries::advance_to_review(&pool, job_id, worker.id)
        .await
        .expect("advance query failed")
        .expect("resubmission should advance again");

    let completed = job_queries::approve_job(&pool, job_id)
        .await
        .expect("approve query failed")
        .expect("approve should succeed in review");
    assert_eq!(completed.status, JobStatus::Completed);

    // 5. Terminal: nothing moves a completed job
    assert!(job_queries::approve_job(&pool, job_id).await.unwrap().is_none());
    assert!(job_queries::reject_job(&pool, job_id, "x").await.unwrap().is_none());
    assert!(job_queries::claim_job(&pool, job_id, worker.id)
        .await
        .unwrap()
        .is_none());

    // 6. The latest report is the resubmission
    let latest = report_queries::latest_report_for_job(&pool, job_id)
        .await
        .expect("latest report query failed")
        .expect("report should exist");
    assert_eq!(
        latest.photo_url_1.as_deref(),
        Some("https://img.test.invalid/reports/2.jpg")
    );
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_concurrent_claims_resolve_to_one_winner() {
    let pool = setup().await;
    let worker_a = test_worker(&pool).await;
    let worker_b = test_worker(&pool).await;
    let job_id = test_job(&pool).await;

    // Both workers race the same open job; the conditional update lets
    // exactly one through.
    let (a, b) = tokio::join!(
        job_queries::claim_job(&pool, job_id, worker_a.id),
        job_queries::claim_job(&pool, job_id, worker_b.id),
    );
    let a = a.expect("claim query failed");
    let b = b.expect("claim query failed");

    assert!(
        a.is_some() ^ b.is_some(),
        "exactly one claim must win (a: {}, b: {})",
        a.is_some(),
        b.is_some()
    );

    let job = job_queries::get_job(&pool, job_id)
        .await
        .expect("get query failed")
        .expect("job should exist");
    assert_eq!(job.status, JobStatus::Assigned);
    let winner = a.or(b).unwrap();
    assert_eq!(job.assigned_worker_id, winner.assigned_worker_id);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_no_state_skipping_in_storage() {
    let pool = setup().await;
    let worker = test_worker(&pool).await;
    let job_id = test_job(&pool).await;

    // open → review directly is impossible
    assert!(job_queries::advance_to_review(&pool, job_id, worker.id)
        .await
        .unwrap()
        .is_none());
    // open → completed directly is impossible
    assert!(job_queries::approve_job(&pool, job_id).await.unwrap().is_none());
    // rejecting an open job is impossible
    assert!(job_queries::reject_job(&pool, job_id, "reason")
        .await
        .unwrap()
        .is_none());

    let job = job_queries::get_job(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Open, "refused transitions must not mutate");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_only_assignee_can_submit() {
    let pool = setup().await;
    let assignee = test_worker(&pool).await;
    let other = test_worker(&pool).await;
    let job_id = test_job(&pool).await;

    job_queries::claim_job(&pool, job_id, assignee.id)
        .await
        .unwrap()
        .expect("claim should succeed");

    assert!(
        job_queries::advance_to_review(&pool, job_id, other.id)
            .await
            .unwrap()
            .is_none(),
        "a non-assignee must not advance the job"
    );

    let job = job_queries::get_job(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Assigned);
    assert_eq!(job.assigned_worker_id, Some(assignee.id));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn test_worker_job_listing() {
    let pool = setup().await;
    let worker = test_worker(&pool).await;
    let job_id = test_job(&pool).await;

    let open = job_queries::list_open_jobs(&pool).await.unwrap();
    assert!(open.iter().any(|j| j.id == job_id));

    job_queries::claim_job(&pool, job_id, worker.id)
        .await
        .unwrap()
        .expect("claim should succeed");

    let open = job_queries::list_open_jobs(&pool).await.unwrap();
    assert!(!open.iter().any(|j| j.id == job_id), "claimed jobs leave the open list");

    let mine = job_queries::list_worker_jobs(&pool, worker.id).await.unwrap();
    assert!(mine.iter().any(|j| j.id == job_id));
}

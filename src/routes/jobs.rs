use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app_state::AppState;
use crate::db::job_queries;
use crate::models::job::{format_reward, Job, JobStatus};
use crate::routes::auth::{MaybeSession, Session};
use crate::routes::error::AppError;

/// Job as served to clients. Assignment internals stay server-side;
/// `reward_display` carries the formatted yen amount.
#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub reward: String,
    pub reward_display: String,
    pub location: String,
    pub description: String,
    pub status: JobStatus,
    pub reference_image: Option<String>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Job> for JobView {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            reward_display: format_reward(&job.reward),
            reward: job.reward,
            location: job.location,
            description: job.description,
            status: job.status,
            reference_image: job.reference_image,
            feedback: job.feedback,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JobDetailResponse {
    #[serde(flatten)]
    pub job: JobView,
    /// True when the requesting session holds this job's assignment.
    pub mine: bool,
}

/// GET /api/v1/jobs — open jobs, newest first.
pub async fn list_open(State(state): State<AppState>) -> Result<Json<Vec<JobView>>, AppError> {
    let jobs = job_queries::list_open_jobs(&state.db).await?;
    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}

/// GET /api/v1/jobs/mine — the session user's assigned/review jobs.
pub async fn my_jobs(
    State(state): State<AppState>,
    Session(session): Session,
) -> Result<Json<Vec<JobView>>, AppError> {
    let jobs = job_queries::list_worker_jobs(&state.db, session.user_id).await?;
    Ok(Json(jobs.into_iter().map(JobView::from).collect()))
}

/// GET /api/v1/jobs/{id} — job detail with an ownership flag.
pub async fn job_detail(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    Path(job_id): Path<i64>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = job_queries::get_job(&state.db, job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let mine = match (&session, job.assigned_worker_id) {
        (Some(s), Some(assignee)) => s.user_id == assignee,
        _ => false,
    };

    Ok(Json(JobDetailResponse {
        job: JobView::from(job),
        mine,
    }))
}

/// POST /api/v1/jobs/{id}/claim — take ownership of an open job.
///
/// The update is conditional on the job still being open; when two
/// workers race, exactly one wins and the other gets a conflict.
pub async fn claim(
    State(state): State<AppState>,
    Session(session): Session,
    Path(job_id): Path<i64>,
) -> Result<Json<JobDetailResponse>, AppError> {
    match job_queries::claim_job(&state.db, job_id, session.user_id).await? {
        Some(job) => {
            metrics::counter!("job_claims_total").increment(1);
            tracing::info!(job_id, worker_id = %session.user_id, "job claimed");
            Ok(Json(JobDetailResponse {
                job: JobView::from(job),
                mine: true,
            }))
        }
        None => {
            // Either the job does not exist or someone got there first.
            let existing = job_queries::get_job(&state.db, job_id)
                .await?
                .ok_or(AppError::NotFound)?;
            metrics::counter!("job_claim_conflicts_total").increment(1);
            tracing::info!(job_id, status = %existing.status, "claim lost or job not open");
            Err(AppError::Conflict(
                "this job is no longer open".to_string(),
            ))
        }
    }
}

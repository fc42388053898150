use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::job::{Job, JobStatus};

const JOB_COLUMNS: &str = "id, title, company, reward, location, description, status, \
                           reference_image, feedback, assigned_worker_id, created_at";

/// Fields for a new job posting; status always starts at 'open'.
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub reward: String,
    pub location: String,
    pub description: String,
    pub reference_image: Option<String>,
}

fn job_from_row(row: &PgRow) -> Result<Job, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    let status: JobStatus = status_str
        .parse()
        .map_err(|e: strum::ParseError| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Job {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        reward: row.try_get("reward")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        status,
        reference_image: row.try_get("reference_image")?,
        feedback: row.try_get("feedback")?,
        assigned_worker_id: row.try_get("assigned_worker_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a new job posting in status 'open'.
pub async fn create_job(pool: &PgPool, new: &NewJob) -> Result<Job, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO jobs (title, company, reward, location, description, reference_image, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'open')
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(&new.title)
    .bind(&new.company)
    .bind(&new.reward)
    .bind(&new.location)
    .bind(&new.description)
    .bind(&new.reference_image)
    .fetch_one(pool)
    .await?;

    job_from_row(&row)
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, job_id: i64) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE id = $1
        "#,
    ))
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Open jobs, newest first (worker listing).
pub async fn list_open_jobs(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE status = 'open'
        ORDER BY created_at DESC
        "#,
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

/// Everything still in flight (admin listing): open, assigned, review.
pub async fn list_active_jobs(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE status IN ('open', 'assigned', 'review')
        ORDER BY created_at DESC
        "#,
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

/// Jobs assigned to a worker that still need their attention.
pub async fn list_worker_jobs(pool: &PgPool, worker_id: Uuid) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {JOB_COLUMNS}
        FROM jobs
        WHERE assigned_worker_id = $1
          AND status IN ('assigned', 'review')
        ORDER BY created_at DESC
        "#,
    ))
    .bind(worker_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(job_from_row).collect()
}

/// Claim an open job for a worker. Conditional on the row still being
/// 'open', so concurrent claims resolve to exactly one winner; the
/// loser gets None.
pub async fn claim_job(
    pool: &PgPool,
    job_id: i64,
    worker_id: Uuid,
) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE jobs
        SET status = 'assigned', assigned_worker_id = $2
        WHERE id = $1 AND status = 'open'
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(job_id)
    .bind(worker_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Advance assigned → review after a report insert. Only the assignee
/// may advance; None if the job moved or belongs to someone else.
pub async fn advance_to_review(
    pool: &PgPool,
    job_id: i64,
    worker_id: Uuid,
) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE jobs
        SET status = 'review'
        WHERE id = $1 AND status = 'assigned' AND assigned_worker_id = $2
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(job_id)
    .bind(worker_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Approve a reviewed job: review → completed, terminal.
pub async fn approve_job(pool: &PgPool, job_id: i64) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE jobs
        SET status = 'completed'
        WHERE id = $1 AND status = 'review'
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

/// Reject a reviewed job back to the worker: review → assigned with
/// the rejection reason. The caller validates the reason first.
pub async fn reject_job(
    pool: &PgPool,
    job_id: i64,
    feedback: &str,
) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        UPDATE jobs
        SET status = 'assigned', feedback = $2
        WHERE id = $1 AND status = 'review'
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(job_id)
    .bind(feedback)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(job_from_row).transpose()
}

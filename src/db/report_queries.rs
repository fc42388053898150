use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::report::Report;

fn report_from_row(row: &PgRow) -> Result<Report, sqlx::Error> {
    Ok(Report {
        id: row.try_get("id")?,
        job_id: row.try_get("job_id")?,
        photo_url_1: row.try_get("photo_url_1")?,
        photo_url_2: row.try_get("photo_url_2")?,
        report_text: row.try_get("report_text")?,
        worker_name: row.try_get("worker_name")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Insert a submitted report. Reports are never updated or deleted.
pub async fn create_report(
    pool: &PgPool,
    job_id: i64,
    photo_url_1: Option<&str>,
    photo_url_2: Option<&str>,
    report_text: Option<&str>,
    worker_name: Option<&str>,
) -> Result<Report, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO reports (job_id, photo_url_1, photo_url_2, report_text, worker_name)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, job_id, photo_url_1, photo_url_2, report_text, worker_name, created_at
        "#,
    )
    .bind(job_id)
    .bind(photo_url_1)
    .bind(photo_url_2)
    .bind(report_text)
    .bind(worker_name)
    .fetch_one(pool)
    .await?;

    report_from_row(&row)
}

/// The most recent report for a job; older rows are kept but review
/// only ever consults the latest.
pub async fn latest_report_for_job(
    pool: &PgPool,
    job_id: i64,
) -> Result<Option<Report>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT id, job_id, photo_url_1, photo_url_2, report_text, worker_name, created_at
        FROM reports
        WHERE job_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(report_from_row).transpose()
}

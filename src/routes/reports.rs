use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use serde::Serialize;

use crate::app_state::AppState;
use crate::db::{job_queries, report_queries};
use crate::models::job::JobStatus;
use crate::models::report::{NewReport, PhotoUpload, Report};
use crate::routes::auth::Session;
use crate::routes::error::AppError;

#[derive(Debug, Serialize)]
pub struct SubmitReportResponse {
    pub report: Report,
    pub job_status: JobStatus,
}

/// POST /api/v1/jobs/{id}/report — submit a photo report.
///
/// Validation happens before any network side effect. The remaining
/// steps run sequentially: upload each photo, insert the report row,
/// then advance the job to review. A failure mid-way is surfaced
/// without compensation; an uploaded photo with no report row is an
/// orphaned blob, never orphaned job state, because the status update
/// comes last.
pub async fn submit_report(
    State(state): State<AppState>,
    Session(session): Session,
    Path(job_id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitReportResponse>), AppError> {
    let form = parse_report_form(multipart).await?;
    form.validate()?;

    if !form.has_photo() {
        return Err(AppError::Validation(
            "at least one photo is required".to_string(),
        ));
    }

    // Sniff formats up front so a bad file fails before any upload.
    let photo_1 = form.photo_1.as_ref().map(sniff_photo).transpose()?;
    let photo_2 = form.photo_2.as_ref().map(sniff_photo).transpose()?;

    let job = job_queries::get_job(&state.db, job_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if job.status != JobStatus::Assigned || job.assigned_worker_id != Some(session.user_id) {
        return Err(AppError::Conflict(
            "job is not assigned to you".to_string(),
        ));
    }

    let started = std::time::Instant::now();

    let photo_url_1 = match (&form.photo_1, photo_1) {
        (Some(photo), Some(content_type)) => {
            Some(upload_photo(&state, job_id, 1, photo, content_type).await?)
        }
        _ => None,
    };
    let photo_url_2 = match (&form.photo_2, photo_2) {
        (Some(photo), Some(content_type)) => {
            Some(upload_photo(&state, job_id, 2, photo, content_type).await?)
        }
        _ => None,
    };

    let report = report_queries::create_report(
        &state.db,
        job_id,
        photo_url_1.as_deref(),
        photo_url_2.as_deref(),
        form.cleaned_text().as_deref(),
        form.trimmed_worker_name().as_deref(),
    )
    .await
    .map_err(|e| {
        // Photos are already in the bucket at this point; they stay.
        tracing::error!(job_id, error = %e, "report insert failed after photo upload");
        AppError::Database(e)
    })?;

    let job = job_queries::advance_to_review(&state.db, job_id, session.user_id)
        .await?
        .ok_or_else(|| {
            tracing::error!(job_id, report_id = report.id, "job moved during submission");
            AppError::Conflict("job is no longer assigned to you".to_string())
        })?;

    metrics::counter!("reports_submitted_total").increment(1);
    metrics::histogram!("report_submission_seconds").record(started.elapsed().as_secs_f64());
    tracing::info!(job_id, report_id = report.id, "report submitted, job in review");

    Ok((
        StatusCode::CREATED,
        Json(SubmitReportResponse {
            report,
            job_status: job.status,
        }),
    ))
}

async fn parse_report_form(mut multipart: Multipart) -> Result<NewReport, AppError> {
    let mut form = NewReport::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "worker_name" => {
                form.worker_name = Some(read_text(field).await?);
            }
            "report_text" => {
                form.report_text = Some(read_text(field).await?);
            }
            "photo_1" | "photo_2" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "photo.jpg".to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("failed to read {name}: {e}")))?;
                let upload = PhotoUpload {
                    filename,
                    bytes: bytes.to_vec(),
                };
                if name == "photo_1" {
                    form.photo_1 = Some(upload);
                } else {
                    form.photo_2 = Some(upload);
                }
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

fn sniff_photo(photo: &PhotoUpload) -> Result<&'static str, AppError> {
    let format = image::guess_format(&photo.bytes)
        .map_err(|_| AppError::Validation("unsupported image format".to_string()))?;
    Ok(format.to_mime_type())
}

async fn upload_photo(
    state: &AppState,
    job_id: i64,
    slot: u8,
    photo: &PhotoUpload,
    content_type: &str,
) -> Result<String, AppError> {
    let key = crate::services::storage::report_photo_key(job_id, slot, &photo.filename);
    let url = state.storage.upload(&key, &photo.bytes, content_type).await?;
    tracing::debug!(job_id, slot, key, "report photo uploaded");
    Ok(url)
}

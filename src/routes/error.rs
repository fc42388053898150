use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;

use crate::services::{auth::AuthError, storage::StorageError};

/// Unified handler error. Backend failures are logged with full detail;
/// the response body carries it only in debug builds and stays generic
/// in release builds.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("authentication required")]
    Unauthenticated,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Non-admin hit an admin route: redirect to the root path, no
    /// message beyond the redirect target.
    #[error("admin capability required")]
    AdminRequired,

    #[error("not found")]
    NotFound,

    /// Lost claim race or illegal lifecycle transition.
    #[error("{0}")]
    Conflict(String),

    /// Refused before any network side effect.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::AdminRequired => StatusCode::SEE_OTHER,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => backend_message("database operation failed", e),
            AppError::Storage(e) => backend_message("image upload failed", e),
            AppError::Unauthenticated => "authentication required".to_string(),
            AppError::InvalidCredentials => "invalid email or password".to_string(),
            AppError::Auth(_) => "invalid or expired session".to_string(),
            _ => self.to_string(),
        }
    }
}

fn backend_message(generic: &str, detail: &dyn std::error::Error) -> String {
    if cfg!(debug_assertions) {
        format!("{generic}: {detail}")
    } else {
        format!("{generic}, please try again")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "object storage error");
            }
            AppError::Auth(e) => {
                tracing::debug!(error = %e, "auth failure");
            }
            _ => {}
        }

        if matches!(self, AppError::AdminRequired) {
            return Redirect::to("/").into_response();
        }

        let body = Json(json!({ "error": self.user_message() }));
        (self.status(), body).into_response()
    }
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        AppError::Validation(report.to_string())
    }
}

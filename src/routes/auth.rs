use axum::extract::{FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::db::profile_queries;
use crate::models::profile::{LoginRequest, SessionInfo, SignupRequest};
use crate::routes::error::AppError;
use crate::services::auth::{self, sanitize_redirect, SESSION_COOKIE};

/// An authenticated session, extracted from the session cookie.
pub struct Session(pub SessionInfo);

/// A session if present; routes that merely personalize output use this.
pub struct MaybeSession(pub Option<SessionInfo>);

/// A session holding the admin capability. Extraction fails with a
/// redirect to the root path for everyone else.
pub struct AdminSession(pub SessionInfo);

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;
        let info = state.auth.verify_session(cookie.value())?;
        Ok(Session(info))
    }
}

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let info = jar
            .get(SESSION_COOKIE)
            .and_then(|c| state.auth.verify_session(c.value()).ok());
        Ok(MaybeSession(info))
    }
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let info = jar
            .get(SESSION_COOKIE)
            .and_then(|c| state.auth.verify_session(c.value()).ok());

        match info {
            Some(info) if info.admin => Ok(AdminSession(info)),
            _ => Err(AppError::AdminRequired),
        }
    }
}

/// Response carrying the one-time authorization code; the client sends
/// it to the callback endpoint to obtain the session cookie.
#[derive(Debug, Serialize)]
pub struct AuthCodeResponse {
    pub code: String,
}

/// POST /api/v1/auth/signup — create an account.
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthCodeResponse>), AppError> {
    req.check()?;

    let password_hash = auth::hash_password(&req.password).await?;

    let profile = profile_queries::create_profile(&state.db, &req.email, &password_hash)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("email is already registered".to_string())
            }
            _ => AppError::Database(e),
        })?;

    tracing::info!(user_id = %profile.id, "account created");

    let code = state.auth.issue_code(&profile)?;
    Ok((StatusCode::CREATED, Json(AuthCodeResponse { code })))
}

/// POST /api/v1/auth/login — authenticate and get an authorization code.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthCodeResponse>, AppError> {
    use garde::Validate;
    req.validate()?;

    let profile = profile_queries::find_by_email(&state.db, &req.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&req.password, &profile.password_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    let code = state.auth.issue_code(&profile)?;
    Ok(Json(AuthCodeResponse { code }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub redirect: Option<String>,
}

/// GET /api/v1/auth/callback — exchange the authorization code for the
/// session cookie, then redirect. The redirect target is restricted to
/// same-origin paths.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(code) = query.code else {
        tracing::warn!("auth callback without code parameter");
        return Redirect::to("/login?error=no_code").into_response();
    };

    let redirect_path = sanitize_redirect(query.redirect.as_deref());

    match state.auth.exchange_code(&code) {
        Ok((token, info)) => {
            tracing::info!(user_id = %info.user_id, admin = info.admin, "session established");
            let cookie = session_cookie(token);
            (jar.add(cookie), Redirect::to(&redirect_path)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "auth code exchange failed");
            Redirect::to("/login?error=exchange_failed").into_response()
        }
    }
}

/// POST /api/v1/auth/logout — drop the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), StatusCode::NO_CONTENT)
}

/// GET /api/v1/me — session identity; clients derive UI mode from
/// `admin` instead of keeping their own toggle.
pub async fn me(Session(info): Session) -> Json<SessionInfo> {
    Json(info)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::{Profile, SessionInfo};

/// Where the auth callback sends the browser when no (or an invalid)
/// redirect target was supplied.
pub const DEFAULT_REDIRECT: &str = "/";

/// Lifetime of a one-time authorization code.
const CODE_TTL_MINUTES: i64 = 5;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "rn_session";

/// Token claims. `purpose` distinguishes short-lived authorization
/// codes from session tokens so one can never stand in for the other.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    email: String,
    admin: bool,
    purpose: TokenPurpose,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TokenPurpose {
    Code,
    Session,
}

/// Issues and verifies session credentials, and decides the admin
/// capability. The capability is evaluated once, when a token is
/// minted; admin routes only read it back.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    admin_emails: Vec<String>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(jwt_secret: &str, admin_emails: Vec<String>, session_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            admin_emails: admin_emails
                .into_iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// One capability, decided server-side: allow-list membership
    /// (case-insensitive) or the profile's own admin flag.
    pub fn is_admin(&self, profile: &Profile) -> bool {
        profile.is_admin || self.admin_emails.contains(&profile.email.to_lowercase())
    }

    /// Mint a one-time authorization code for a just-authenticated
    /// profile. The callback endpoint exchanges it for a session cookie.
    pub fn issue_code(&self, profile: &Profile) -> Result<String, AuthError> {
        self.issue(profile, TokenPurpose::Code, Duration::minutes(CODE_TTL_MINUTES))
    }

    /// Exchange an authorization code for a session token.
    pub fn exchange_code(&self, code: &str) -> Result<(String, SessionInfo), AuthError> {
        let claims = self.verify(code, TokenPurpose::Code)?;
        let info = SessionInfo {
            user_id: claims.sub,
            email: claims.email.clone(),
            admin: claims.admin,
        };
        let now = Utc::now();
        let session = Claims {
            sub: claims.sub,
            email: claims.email,
            admin: claims.admin,
            purpose: TokenPurpose::Session,
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };
        let token = encode(&Header::default(), &session, &self.encoding_key)?;
        Ok((token, info))
    }

    /// Verify a session token from the cookie.
    pub fn verify_session(&self, token: &str) -> Result<SessionInfo, AuthError> {
        let claims = self.verify(token, TokenPurpose::Session)?;
        Ok(SessionInfo {
            user_id: claims.sub,
            email: claims.email,
            admin: claims.admin,
        })
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    fn issue(
        &self,
        profile: &Profile,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: profile.id,
            email: profile.email.to_lowercase(),
            admin: self.is_admin(profile),
            purpose,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;
        if data.claims.purpose != expected {
            return Err(AuthError::WrongPurpose);
        }
        Ok(data.claims)
    }
}

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored bcrypt hash on the blocking pool.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Sanitize the callback's redirect target: only same-origin paths are
/// honored. Absolute URLs, protocol-relative URLs, and `javascript:`/
/// `data:` schemes fall back to the default.
pub fn sanitize_redirect(raw: Option<&str>) -> String {
    let Some(redirect) = raw else {
        return DEFAULT_REDIRECT.to_string();
    };

    if redirect.starts_with("http://")
        || redirect.starts_with("https://")
        || redirect.starts_with("//")
        || redirect.starts_with("javascript:")
        || redirect.starts_with("data:")
    {
        tracing::warn!(redirect, "rejected redirect target");
        return DEFAULT_REDIRECT.to_string();
    }

    if redirect.starts_with('/') {
        redirect.to_string()
    } else {
        DEFAULT_REDIRECT.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid or expired token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token used for the wrong purpose")]
    WrongPurpose,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(
            "test-secret",
            vec!["Boss@Example.com".to_string()],
            24,
        )
    }

    fn profile(email: &str, is_admin: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: String::new(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_allow_list_is_case_insensitive() {
        let svc = service();
        assert!(svc.is_admin(&profile("boss@example.com", false)));
        assert!(svc.is_admin(&profile("BOSS@EXAMPLE.COM", false)));
        assert!(!svc.is_admin(&profile("worker@example.com", false)));
    }

    #[test]
    fn test_profile_flag_grants_admin() {
        let svc = service();
        assert!(svc.is_admin(&profile("worker@example.com", true)));
    }

    #[test]
    fn test_code_exchange_round_trip() {
        let svc = service();
        let p = profile("boss@example.com", false);
        let code = svc.issue_code(&p).unwrap();
        let (token, info) = svc.exchange_code(&code).unwrap();
        assert_eq!(info.user_id, p.id);
        assert!(info.admin);

        let session = svc.verify_session(&token).unwrap();
        assert_eq!(session.email, "boss@example.com");
        assert!(session.admin);
    }

    #[test]
    fn test_session_token_is_not_a_code() {
        let svc = service();
        let code = svc.issue_code(&profile("worker@example.com", false)).unwrap();
        let (token, _) = svc.exchange_code(&code).unwrap();
        assert!(matches!(
            svc.exchange_code(&token),
            Err(AuthError::WrongPurpose)
        ));
        assert!(matches!(
            svc.verify_session(&code),
            Err(AuthError::WrongPurpose)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let other = AuthService::new("other-secret", vec![], 24);
        let code = other.issue_code(&profile("worker@example.com", false)).unwrap();
        assert!(svc.exchange_code(&code).is_err());
    }

    #[test]
    fn test_sanitize_redirect_accepts_local_paths() {
        assert_eq!(sanitize_redirect(Some("/admin/jobs")), "/admin/jobs");
        assert_eq!(sanitize_redirect(Some("/")), "/");
    }

    #[test]
    fn test_sanitize_redirect_rejects_external_targets() {
        assert_eq!(sanitize_redirect(Some("http://evil.test/")), DEFAULT_REDIRECT);
        assert_eq!(sanitize_redirect(Some("https://evil.test/")), DEFAULT_REDIRECT);
        assert_eq!(sanitize_redirect(Some("//evil.test")), DEFAULT_REDIRECT);
        assert_eq!(sanitize_redirect(Some("javascript:alert(1)")), DEFAULT_REDIRECT);
        assert_eq!(sanitize_redirect(Some("data:text/html,x")), DEFAULT_REDIRECT);
    }

    #[test]
    fn test_sanitize_redirect_defaults() {
        assert_eq!(sanitize_redirect(None), DEFAULT_REDIRECT);
        assert_eq!(sanitize_redirect(Some("relative/path")), DEFAULT_REDIRECT);
        assert_eq!(sanitize_redirect(Some("")), DEFAULT_REDIRECT);
    }
}

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. Workers and admins share the same table; the
/// admin capability comes from the allow-list or the `is_admin` flag.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[garde(context(SignupContext))]
pub struct SignupRequest {
    #[garde(custom(looks_like_email))]
    pub email: String,

    #[garde(length(min = 6, max = 72))]
    pub password: String,

    #[garde(custom(matches_password))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(length(min = 1))]
    pub email: String,

    #[garde(length(min = 1))]
    pub password: String,
}

fn looks_like_email(value: &str, _ctx: &SignupContext) -> garde::Result {
    let Some((local, domain)) = value.split_once('@') else {
        return Err(garde::Error::new("not an email address"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(garde::Error::new("not an email address"));
    }
    Ok(())
}

fn matches_password(value: &str, ctx: &SignupContext) -> garde::Result {
    if value == ctx.password {
        Ok(())
    } else {
        Err(garde::Error::new("passwords do not match"))
    }
}

/// garde context carrying the password for the confirm check.
#[derive(Debug, Default)]
pub struct SignupContext {
    pub password: String,
}

impl SignupRequest {
    pub fn check(&self) -> Result<(), garde::Report> {
        let ctx = SignupContext {
            password: self.password.clone(),
        };
        self.validate_with(&ctx)
    }
}

/// Session identity surfaced to clients via GET /api/v1/me. UI mode is
/// derived from `admin`; there is no separate view toggle.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str, confirm: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(request("worker@example.com", "hunter22", "hunter22")
            .check()
            .is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert!(request("worker@example.com", "abc", "abc").check().is_err());
    }

    #[test]
    fn test_confirm_mismatch() {
        assert!(request("worker@example.com", "hunter22", "hunter23")
            .check()
            .is_err());
    }

    #[test]
    fn test_bad_email() {
        assert!(request("not-an-email", "hunter22", "hunter22")
            .check()
            .is_err());
        assert!(request("user@nodot", "hunter22", "hunter22")
            .check()
            .is_err());
    }
}

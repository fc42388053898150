use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection string
    pub database_url: String,

    /// Image bucket name (S3-compatible)
    #[serde(default = "default_bucket")]
    pub s3_bucket: String,

    /// S3 endpoint URL
    pub s3_endpoint: String,

    /// S3 access key ID
    pub s3_access_key: String,

    /// S3 secret access key
    pub s3_secret_key: String,

    /// Public base URL under which uploaded objects are reachable
    /// (bucket must be public-read)
    pub s3_public_url: String,

    /// HMAC secret for session and authorization-code tokens
    pub jwt_secret: String,

    /// Comma-separated admin email allow-list
    #[serde(default)]
    pub admin_emails: String,

    /// Session lifetime in hours
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_bucket() -> String {
    "images".to_string()
}

fn default_session_ttl_hours() -> i64 {
    24 * 7
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// The allow-list, split and lowercased.
    pub fn admin_email_list(&self) -> Vec<String> {
        self.admin_emails
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_admins(admins: &str) -> AppConfig {
        AppConfig {
            bind_addr: default_bind_addr(),
            database_url: String::new(),
            s3_bucket: default_bucket(),
            s3_endpoint: String::new(),
            s3_access_key: String::new(),
            s3_secret_key: String::new(),
            s3_public_url: String::new(),
            jwt_secret: String::new(),
            admin_emails: admins.to_string(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }

    #[test]
    fn test_admin_email_list_parsing() {
        let config = config_with_admins(" Boss@Example.com, second@example.com ,,");
        assert_eq!(
            config.admin_email_list(),
            vec!["boss@example.com", "second@example.com"]
        );
    }

    #[test]
    fn test_empty_allow_list() {
        assert!(config_with_admins("").admin_email_list().is_empty());
    }
}

use s3::creds::Credentials;
use s3::{Bucket, Region};
use uuid::Uuid;

/// Client for the public image bucket (S3-compatible).
///
/// All objects are publicly readable; callers persist the returned
/// public URL, never the key.
pub struct ImageStore {
    bucket: Box<Bucket>,
    public_base_url: String,
}

impl ImageStore {
    pub fn new(
        bucket_name: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        public_base_url: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: "auto".to_string(),
            endpoint: endpoint.to_string(),
        };

        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;

        Ok(Self {
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload image bytes and return the public URL.
    pub async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(StorageError::S3)?;
        Ok(self.public_url(key))
    }

    /// Delete an object (maintenance only; the application never
    /// compensates a partial submission).
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.bucket.delete_object(key).await.map_err(StorageError::S3)?;
        Ok(())
    }

    /// Cheap connectivity probe for health checks.
    pub async fn health_check(&self) -> Result<(), StorageError> {
        self.bucket
            .list("health/".to_string(), Some("/".to_string()))
            .await
            .map_err(StorageError::S3)?;
        Ok(())
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// Key for a job's reference image: `reference_images/<millis>_<rand>.<ext>`.
pub fn reference_image_key(filename: &str) -> String {
    format!(
        "reference_images/{}_{}.{}",
        chrono::Utc::now().timestamp_millis(),
        random_suffix(),
        file_extension(filename)
    )
}

/// Key for a report photo: `reports/<jobId>_<millis>_<slot>_<rand>.<ext>`.
pub fn report_photo_key(job_id: i64, slot: u8, filename: &str) -> String {
    format!(
        "reports/{}_{}_{}_{}.{}",
        job_id,
        chrono::Utc::now().timestamp_millis(),
        slot,
        random_suffix(),
        file_extension(filename)
    )
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..7].to_string()
}

fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5)
        .unwrap_or_else(|| "jpg".to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 operation failed: {0}")]
    S3(#[from] s3::error::S3Error),

    #[error("Storage configuration error: {0}")]
    Config(String),
}

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// A worker's submission of photos and notes against a job.
/// Reports are insert-only; older rows stay as an audit trail and only
/// the latest is served to admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub job_id: i64,
    pub photo_url_1: Option<String>,
    pub photo_url_2: Option<String>,
    pub report_text: Option<String>,
    pub worker_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A report as parsed out of the multipart submission form, before any
/// photo has been uploaded.
#[derive(Debug, Default, Validate)]
pub struct NewReport {
    #[garde(length(max = 100))]
    pub worker_name: Option<String>,

    #[garde(length(max = 10_000))]
    pub report_text: Option<String>,

    #[garde(skip)]
    pub photo_1: Option<PhotoUpload>,

    #[garde(skip)]
    pub photo_2: Option<PhotoUpload>,
}

/// Raw bytes of one uploaded photo plus its original filename.
#[derive(Debug)]
pub struct PhotoUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl NewReport {
    /// At least one photo is required; checked before any network call.
    pub fn has_photo(&self) -> bool {
        self.photo_1.is_some() || self.photo_2.is_some()
    }

    pub fn trimmed_worker_name(&self) -> Option<String> {
        self.worker_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn cleaned_text(&self) -> Option<String> {
        self.report_text
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> PhotoUpload {
        PhotoUpload {
            filename: "site.jpg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_zero_photos_rejected() {
        let form = NewReport {
            worker_name: Some("田中太郎".to_string()),
            report_text: Some("memo".to_string()),
            ..Default::default()
        };
        assert!(!form.has_photo());
    }

    #[test]
    fn test_one_photo_in_either_slot_is_enough() {
        let first = NewReport {
            photo_1: Some(photo()),
            ..Default::default()
        };
        let second = NewReport {
            photo_2: Some(photo()),
            ..Default::default()
        };
        assert!(first.has_photo());
        assert!(second.has_photo());
    }

    #[test]
    fn test_worker_name_trimmed() {
        let form = NewReport {
            worker_name: Some("  田中太郎 ".to_string()),
            photo_1: Some(photo()),
            ..Default::default()
        };
        assert_eq!(form.trimmed_worker_name(), Some("田中太郎".to_string()));

        let blank = NewReport {
            worker_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.trimmed_worker_name(), None);
    }

    #[test]
    fn test_blank_text_becomes_none() {
        let form = NewReport {
            report_text: Some("  \n ".to_string()),
            ..Default::default()
        };
        assert_eq!(form.cleaned_text(), None);
    }
}

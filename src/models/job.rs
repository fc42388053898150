use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// Lifecycle status of a photo-assignment job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Open,
    Assigned,
    Review,
    Completed,
}

impl JobStatus {
    /// The only legal moves: open → assigned → review → completed,
    /// plus the rejection path review → assigned. `completed` is terminal.
    pub fn can_transition(self, to: JobStatus) -> bool {
        matches!(
            (self, to),
            (JobStatus::Open, JobStatus::Assigned)
                | (JobStatus::Assigned, JobStatus::Review)
                | (JobStatus::Review, JobStatus::Completed)
                | (JobStatus::Review, JobStatus::Assigned)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == JobStatus::Completed
    }
}

/// A paid photo-collection assignment posted by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    /// Stored as text: usually a yen amount ("5000"), sometimes free
    /// text such as "応相談".
    pub reward: String,
    pub location: String,
    pub description: String,
    pub status: JobStatus,
    pub reference_image: Option<String>,
    /// Rejection reason carried back to the worker on review → assigned.
    pub feedback: Option<String>,
    /// Which account claimed this job. None while open.
    pub assigned_worker_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Render a reward for display: numeric text becomes a yen amount with
/// thousands separators, anything else passes through unchanged.
pub fn format_reward(reward: &str) -> String {
    match reward.trim().parse::<i64>() {
        Ok(n) => format!("¥{}", group_thousands(n)),
        Err(_) => reward.to_string(),
    }
}

fn group_thousands(n: i64) -> String {
    let (sign, digits) = if n < 0 {
        ("-", n.unsigned_abs().to_string())
    } else {
        ("", n.to_string())
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

/// Validate a rejection reason. Empty or whitespace-only reasons are
/// refused before any database write; the trimmed reason is stored.
pub fn validate_feedback(reason: &str) -> Option<String> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JobStatus; 4] = [
        JobStatus::Open,
        JobStatus::Assigned,
        JobStatus::Review,
        JobStatus::Completed,
    ];

    #[test]
    fn test_legal_transitions() {
        assert!(JobStatus::Open.can_transition(JobStatus::Assigned));
        assert!(JobStatus::Assigned.can_transition(JobStatus::Review));
        assert!(JobStatus::Review.can_transition(JobStatus::Completed));
        assert!(JobStatus::Review.can_transition(JobStatus::Assigned));
    }

    #[test]
    fn test_no_state_skipping() {
        assert!(!JobStatus::Open.can_transition(JobStatus::Review));
        assert!(!JobStatus::Open.can_transition(JobStatus::Completed));
        assert!(!JobStatus::Assigned.can_transition(JobStatus::Completed));
    }

    #[test]
    fn test_no_backward_paths_except_rejection() {
        assert!(!JobStatus::Assigned.can_transition(JobStatus::Open));
        assert!(!JobStatus::Review.can_transition(JobStatus::Open));
    }

    #[test]
    fn test_completed_is_terminal() {
        for to in ALL {
            assert!(!JobStatus::Completed.can_transition(to));
        }
        assert!(JobStatus::Completed.is_terminal());
    }

    #[test]
    fn test_no_self_transitions() {
        for s in ALL {
            assert!(!s.can_transition(s));
        }
    }

    #[test]
    fn test_status_string_round_trip() {
        for s in ALL {
            let text = s.as_ref().to_string();
            assert_eq!(text.parse::<JobStatus>().unwrap(), s);
        }
        assert_eq!(JobStatus::Open.as_ref(), "open");
        assert_eq!(JobStatus::Review.as_ref(), "review");
    }

    #[test]
    fn test_format_reward_numeric() {
        assert_eq!(format_reward("5000"), "¥5,000");
        assert_eq!(format_reward("500"), "¥500");
        assert_eq!(format_reward("1234567"), "¥1,234,567");
        assert_eq!(format_reward("0"), "¥0");
    }

    #[test]
    fn test_format_reward_passthrough() {
        assert_eq!(format_reward("応相談"), "応相談");
        assert_eq!(format_reward("time and materials"), "time and materials");
        assert_eq!(format_reward(""), "");
    }

    #[test]
    fn test_validate_feedback() {
        assert_eq!(
            validate_feedback("写真が暗すぎます"),
            Some("写真が暗すぎます".to_string())
        );
        assert_eq!(
            validate_feedback("  retake photo 2  "),
            Some("retake photo 2".to_string())
        );
        assert_eq!(validate_feedback(""), None);
        assert_eq!(validate_feedback("   \t\n"), None);
    }
}

//! Explanation content entries and their review sub-state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review status of a single content entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    AwaitingReview,
    Passed,
    Failed,
    Revised,
}

impl ContentStatus {
    /// Check if the entry is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContentStatus::Passed)
    }

    /// Check if a reviewer decision is meaningful from this state
    pub fn is_reviewable(&self) -> bool {
        matches!(self, ContentStatus::AwaitingReview | ContentStatus::Revised)
    }
}

impl From<String> for ContentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "awaiting_review" => ContentStatus::AwaitingReview,
            "passed" => ContentStatus::Passed,
            "failed" => ContentStatus::Failed,
            "revised" => ContentStatus::Revised,
            _ => ContentStatus::AwaitingReview,
        }
    }
}

impl From<ContentStatus> for String {
    fn from(status: ContentStatus) -> Self {
        match status {
            ContentStatus::AwaitingReview => "awaiting_review".to_string(),
            ContentStatus::Passed => "passed".to_string(),
            ContentStatus::Failed => "failed".to_string(),
            ContentStatus::Revised => "revised".to_string(),
        }
    }
}

/// One submitted piece of justification under a request
///
/// An entry carries free text, at most one attached file, or both;
/// it must never be empty on both counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: Uuid,

    /// Owning request
    pub request_id: Uuid,

    /// Free text; may be blank when a file is attached
    #[serde(default)]
    pub body: String,

    pub file_name: Option<String>,

    pub file_url: Option<String>,

    pub status: ContentStatus,

    /// Set only after a review decision
    pub reviewer_id: Option<Uuid>,

    pub reviewed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl ContentEntry {
    /// Check if the entry has an attached file
    pub fn has_file(&self) -> bool {
        self.file_url.is_some()
    }

    /// Check the body-or-file invariant
    pub fn has_payload(&self) -> bool {
        !self.body.trim().is_empty() || self.has_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reviewable_states() {
        assert!(ContentStatus::AwaitingReview.is_reviewable());
        assert!(ContentStatus::Revised.is_reviewable());
        assert!(!ContentStatus::Passed.is_reviewable());
        assert!(!ContentStatus::Failed.is_reviewable());
    }

    #[test]
    fn test_passed_is_terminal() {
        assert!(ContentStatus::Passed.is_terminal());
        assert!(!ContentStatus::Revised.is_terminal());
    }

    #[test]
    fn test_payload_invariant() {
        let entry = ContentEntry {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            body: "  ".to_string(),
            file_name: None,
            file_url: None,
            status: ContentStatus::AwaitingReview,
            reviewer_id: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };
        assert!(!entry.has_payload());

        let with_file = ContentEntry {
            file_name: Some("evidence.pdf".to_string()),
            file_url: Some("https://blobs/evidence.pdf".to_string()),
            ..entry
        };
        assert!(with_file.has_payload());
    }
}

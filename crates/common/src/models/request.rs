//! Explanation request entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::request_file::RequestFile;

/// Overall status of an explanation request
///
/// `Approved` and `Rejected` exist in older console payloads and are kept
/// decodable for display, but no transition in the workflow produces them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Completed,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Check if the request is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }
}

impl From<String> for RequestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => RequestStatus::Pending,
            "completed" => RequestStatus::Completed,
            "approved" => RequestStatus::Approved,
            "rejected" => RequestStatus::Rejected,
            _ => RequestStatus::Pending,
        }
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => "pending".to_string(),
            RequestStatus::Completed => "completed".to_string(),
            RequestStatus::Approved => "approved".to_string(),
            RequestStatus::Rejected => "rejected".to_string(),
        }
    }
}

/// A formal ask for justification, scoped to one plan
///
/// A plan owns at most one live request; the request owns its attached
/// files and, via backend cascade, its content entries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    pub id: Uuid,

    /// Owning plan (1:1 - a plan has at most one live request)
    pub plan_id: Uuid,

    /// Actor who opened the request
    pub requester_id: Uuid,

    /// Actor required to respond
    pub responder_id: Uuid,

    pub status: RequestStatus,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub attachments: Vec<RequestFile>,
}

impl ExplanationRequest {
    /// Check whether the given actor is the designated responder
    pub fn owned_by(&self, actor_id: Uuid) -> bool {
        self.responder_id == actor_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
    }

    #[test]
    fn test_unknown_status_falls_back_to_pending() {
        assert_eq!(
            RequestStatus::from("archived".to_string()),
            RequestStatus::Pending
        );
    }
}

//! Backend collaborator interface
//!
//! The console backend owns persistence for plans, requests, content
//! entries, and file rows. The engine consumes it through the
//! [`WorkflowApi`] trait:
//! - [`HttpWorkflowApi`] talks to the real REST backend
//! - [`MemoryWorkflowApi`] is an in-process implementation with the same
//!   contract (including server-side cascade on request deletion), used by
//!   local development and tests

mod http;
mod memory;

pub use http::HttpWorkflowApi;
pub use memory::MemoryWorkflowApi;

use crate::errors::Result;
use crate::models::{Actor, ContentEntry, ContentStatus, ExplanationRequest, RequestFile, RequestStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Payload for opening an explanation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub plan_id: Uuid,
    pub requester_id: Uuid,
    pub responder_id: Uuid,
    pub status: RequestStatus,
}

/// Partial update of an explanation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
}

/// Payload for submitting a content entry
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewContentEntry {
    pub request_id: Uuid,

    #[validate(length(max = 50000))]
    pub body: String,

    pub file_name: Option<String>,

    pub file_url: Option<String>,

    pub status: ContentStatus,
}

/// Full update of a content entry's editable fields
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContentEntryPatch {
    #[validate(length(max = 50000))]
    pub body: String,

    pub file_name: Option<String>,

    pub file_url: Option<String>,

    pub status: ContentStatus,
}

/// A reviewer decision applied to a content entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub status: ContentStatus,
    pub reviewer_id: Uuid,
    pub reviewed_at: DateTime<Utc>,
}

/// Payload for linking an uploaded file to a request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRequestFile {
    pub request_id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub file_name: String,

    #[validate(length(min = 1))]
    pub file_url: String,
}

/// Persistence and identity operations consumed from the console backend
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// Resolve the actor behind the current session
    async fn fetch_current_actor(&self) -> Result<Actor>;

    /// List requests scoped to a plan (at most one expected)
    async fn list_requests_for_plan(&self, plan_id: Uuid) -> Result<Vec<ExplanationRequest>>;

    /// Persist a new explanation request
    async fn create_request(&self, payload: NewRequest) -> Result<ExplanationRequest>;

    /// Update an explanation request
    async fn update_request(&self, id: Uuid, payload: RequestPatch) -> Result<ExplanationRequest>;

    /// Delete a request; the backend cascades attachments and entries
    async fn delete_request(&self, id: Uuid) -> Result<()>;

    /// List content entries under a request
    async fn list_content_entries(&self, request_id: Uuid) -> Result<Vec<ContentEntry>>;

    /// Persist a new content entry
    async fn create_content_entry(&self, payload: NewContentEntry) -> Result<ContentEntry>;

    /// Update a content entry
    async fn update_content_entry(
        &self,
        id: Uuid,
        payload: ContentEntryPatch,
    ) -> Result<ContentEntry>;

    /// Delete a single content entry
    async fn delete_content_entry(&self, id: Uuid) -> Result<()>;

    /// Apply a reviewer decision to a content entry
    async fn evaluate_content_entry(&self, id: Uuid, decision: ReviewDecision)
        -> Result<ContentEntry>;

    /// Record a file row attached to a request
    async fn link_file_to_request(&self, payload: NewRequestFile) -> Result<RequestFile>;

    /// Remove a file row from its request
    async fn unlink_request_file(&self, id: Uuid) -> Result<()>;
}

//! Explanation content manager
//!
//! Owns the many-entries-per-request collection and each entry's review
//! sub-state. Scoped to one request; construct a fresh manager when the
//! parent request changes. The entry list is re-fetched after every
//! mutation so a caller never observes ordering stale relative to its
//! own writes.

use crate::attachments::AttachmentLifecycle;
use crate::policy::Capabilities;
use auditflow_common::api::{ContentEntryPatch, NewContentEntry, ReviewDecision, WorkflowApi};
use auditflow_common::errors::{AppError, Result};
use auditflow_common::metrics::record_evaluation;
use auditflow_common::models::{Actor, ContentEntry, ContentStatus, ExplanationRequest};
use auditflow_common::storage::{BlobStore, FileUpload};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// A reviewer decision
///
/// Deliberately narrower than [`ContentStatus`]: reviewers can only pass
/// or fail an entry, never push it back into the submission states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewOutcome {
    Passed,
    Failed,
}

impl ReviewOutcome {
    fn status(self) -> ContentStatus {
        match self {
            ReviewOutcome::Passed => ContentStatus::Passed,
            ReviewOutcome::Failed => ContentStatus::Failed,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ReviewOutcome::Passed => "passed",
            ReviewOutcome::Failed => "failed",
        }
    }
}

/// Manager for the content entries of one explanation request
pub struct ContentManager {
    api: Arc<dyn WorkflowApi>,
    attachments: AttachmentLifecycle,
    actor: Actor,
    request_id: Uuid,
    responder_id: Uuid,
    entries: Vec<ContentEntry>,
}

impl ContentManager {
    pub fn new(
        request_id: Uuid,
        responder_id: Uuid,
        actor: Actor,
        api: Arc<dyn WorkflowApi>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            attachments: AttachmentLifecycle::new(api.clone(), store),
            api,
            actor,
            request_id,
            responder_id,
            entries: Vec::new(),
        }
    }

    /// Convenience constructor scoped to a loaded request
    pub fn for_request(
        request: &ExplanationRequest,
        actor: Actor,
        api: Arc<dyn WorkflowApi>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self::new(request.id, request.responder_id, actor, api, store)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// The last fetched entries, newest first
    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    /// Capabilities of the acting actor against this request
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::resolve(self.actor.role, self.actor.id == self.responder_id)
    }

    /// Re-fetch the entry list, newest first
    ///
    /// A backend not-found is a normal empty state here, not a failure.
    pub async fn refresh(&mut self) -> Result<&[ContentEntry]> {
        let mut entries = match self.api.list_content_entries(self.request_id).await {
            Ok(entries) => entries,
            Err(AppError::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.entries = entries;

        Ok(&self.entries)
    }

    /// Submit a new entry; it always starts awaiting review
    pub async fn create(&mut self, body: &str, file: Option<&FileUpload>) -> Result<ContentEntry> {
        self.require(|c| c.add_or_edit_content, "submit explanation content")?;

        if body.trim().is_empty() && file.is_none() {
            return Err(AppError::Validation {
                message: "explanation content needs text or a file".to_string(),
                field: Some("body".to_string()),
            });
        }

        // Entries always start awaiting review, regardless of caller input
        let mut payload = NewContentEntry {
            request_id: self.request_id,
            body: body.to_string(),
            file_name: None,
            file_url: None,
            status: ContentStatus::AwaitingReview,
        };
        payload.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: Some("body".to_string()),
        })?;

        if let Some(file) = file {
            let blob = self.attachments.upload(file).await?;
            payload.file_name = Some(file.file_name.clone());
            payload.file_url = Some(blob.url);
        }

        let entry = self.api.create_content_entry(payload).await?;

        tracing::info!(
            entry_id = %entry.id,
            request_id = %self.request_id,
            has_file = entry.has_file(),
            "Content entry submitted"
        );
        metrics::counter!("auditflow_content_entries_created_total").increment(1);

        self.refresh().await?;
        Ok(entry)
    }

    /// Edit an entry's text and/or replace its file
    ///
    /// A failed entry counts as revised once the responder actually
    /// changed something: a new file, or different body text. An edit
    /// that changes nothing leaves the status where it was.
    pub async fn edit(
        &mut self,
        id: Uuid,
        body: &str,
        file: Option<&FileUpload>,
    ) -> Result<ContentEntry> {
        self.require(|c| c.add_or_edit_content, "edit explanation content")?;

        let existing = self.find(id).await?;

        // A carried-over file keeps the entry valid without new text
        if body.trim().is_empty() && file.is_none() && existing.file_url.is_none() {
            return Err(AppError::Validation {
                message: "explanation content needs text or a file".to_string(),
                field: Some("body".to_string()),
            });
        }

        let body_changed = body != existing.body;
        let status = if existing.status == ContentStatus::Failed
            && (file.is_some() || body_changed)
        {
            ContentStatus::Revised
        } else {
            existing.status
        };

        let mut payload = ContentEntryPatch {
            body: body.to_string(),
            file_name: existing.file_name.clone(),
            file_url: existing.file_url.clone(),
            status,
        };
        payload.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: Some("body".to_string()),
        })?;

        // A new file is uploaded first and replaces the previous reference
        if let Some(file) = file {
            let blob = self.attachments.upload(file).await?;
            payload.file_name = Some(file.file_name.clone());
            payload.file_url = Some(blob.url);
        }

        let updated = self.api.update_content_entry(id, payload).await?;

        tracing::info!(
            entry_id = %updated.id,
            status = ?updated.status,
            "Content entry edited"
        );

        self.refresh().await?;
        Ok(updated)
    }

    /// Record a reviewer decision on an entry
    ///
    /// Meaningful from the awaiting-review and revised states; the screen
    /// only offers it there. Re-evaluating overwrites the prior decision.
    pub async fn evaluate(&mut self, id: Uuid, outcome: ReviewOutcome) -> Result<ContentEntry> {
        self.require(|c| c.evaluate_content, "evaluate explanation content")?;

        let entry = self
            .api
            .evaluate_content_entry(
                id,
                ReviewDecision {
                    status: outcome.status(),
                    reviewer_id: self.actor.id,
                    reviewed_at: Utc::now(),
                },
            )
            .await?;

        tracing::info!(
            entry_id = %entry.id,
            outcome = outcome.as_str(),
            reviewer_id = %self.actor.id,
            "Content entry evaluated"
        );
        record_evaluation(outcome.as_str());

        self.refresh().await?;
        Ok(entry)
    }

    /// Remove an entry; top-level authority only
    pub async fn delete(&mut self, id: Uuid) -> Result<()> {
        self.require(|c| c.delete_request, "delete explanation content")?;

        self.api.delete_content_entry(id).await?;

        tracing::info!(
            entry_id = %id,
            request_id = %self.request_id,
            "Content entry deleted"
        );

        self.refresh().await?;
        Ok(())
    }

    async fn find(&mut self, id: Uuid) -> Result<ContentEntry> {
        // Always read the backend's current view; a reviewer may have
        // decided on the entry since our last refresh
        self.refresh().await?;

        self.entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("content_entry", id))
    }

    fn require(&self, check: impl Fn(&Capabilities) -> bool, action: &str) -> Result<()> {
        if check(&self.capabilities()) {
            Ok(())
        } else {
            Err(AppError::Authorization {
                message: format!("not permitted to {}", action),
            })
        }
    }
}

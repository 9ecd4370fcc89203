//! In-memory backend with the same contract as the REST collaborator
//!
//! Backs local development and the engine's tests. Mirrors the behavior
//! the engine relies on from the real backend: unknown resources come
//! back as not-found, responders must exist at request creation, and
//! deleting a request cascades over its files and content entries.

use super::{
    ContentEntryPatch, NewContentEntry, NewRequest, NewRequestFile, RequestPatch, ReviewDecision,
    WorkflowApi,
};
use crate::errors::{AppError, Result};
use crate::models::{Actor, ContentEntry, ExplanationRequest, RequestFile};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    actors: HashMap<Uuid, Actor>,
    current_actor: Option<Uuid>,
    requests: HashMap<Uuid, ExplanationRequest>,
    files: HashMap<Uuid, RequestFile>,
    entries: HashMap<Uuid, ContentEntry>,
}

/// [`WorkflowApi`] implementation over in-process tables
#[derive(Default)]
pub struct MemoryWorkflowApi {
    tables: RwLock<Tables>,
}

impl MemoryWorkflowApi {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Fixture helpers (not part of the WorkflowApi contract)
    // ========================================================================

    /// Register an actor in the backend's directory
    pub async fn insert_actor(&self, actor: Actor) {
        self.tables.write().await.actors.insert(actor.id, actor);
    }

    /// Point the session at a registered actor
    pub async fn set_current_actor(&self, actor_id: Uuid) {
        self.tables.write().await.current_actor = Some(actor_id);
    }

    /// Number of live request-file rows
    pub async fn file_count(&self) -> usize {
        self.tables.read().await.files.len()
    }

    /// Number of live content entries
    pub async fn entry_count(&self) -> usize {
        self.tables.read().await.entries.len()
    }

    /// Number of live requests
    pub async fn request_count(&self) -> usize {
        self.tables.read().await.requests.len()
    }

    fn with_attachments(tables: &Tables, request: &ExplanationRequest) -> ExplanationRequest {
        let mut attachments: Vec<RequestFile> = tables
            .files
            .values()
            .filter(|f| f.request_id == request.id)
            .cloned()
            .collect();
        attachments.sort_by_key(|f| f.created_at);

        ExplanationRequest {
            attachments,
            ..request.clone()
        }
    }
}

#[async_trait]
impl WorkflowApi for MemoryWorkflowApi {
    // ========================================================================
    // Identity
    // ========================================================================

    async fn fetch_current_actor(&self) -> Result<Actor> {
        let tables = self.tables.read().await;

        tables
            .current_actor
            .and_then(|id| tables.actors.get(&id))
            .cloned()
            .ok_or_else(|| AppError::Authorization {
                message: "no active session".to_string(),
            })
    }

    // ========================================================================
    // Explanation requests
    // ========================================================================

    async fn list_requests_for_plan(&self, plan_id: Uuid) -> Result<Vec<ExplanationRequest>> {
        let tables = self.tables.read().await;

        Ok(tables
            .requests
            .values()
            .filter(|r| r.plan_id == plan_id)
            .map(|r| Self::with_attachments(&tables, r))
            .collect())
    }

    async fn create_request(&self, payload: NewRequest) -> Result<ExplanationRequest> {
        let mut tables = self.tables.write().await;

        if !tables.actors.contains_key(&payload.responder_id) {
            return Err(AppError::not_found("actor", payload.responder_id));
        }

        if tables.requests.values().any(|r| r.plan_id == payload.plan_id) {
            return Err(AppError::Conflict {
                message: "plan already has an explanation request".to_string(),
            });
        }

        let request = ExplanationRequest {
            id: Uuid::new_v4(),
            plan_id: payload.plan_id,
            requester_id: payload.requester_id,
            responder_id: payload.responder_id,
            status: payload.status,
            created_at: Utc::now(),
            attachments: Vec::new(),
        };

        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn update_request(&self, id: Uuid, payload: RequestPatch) -> Result<ExplanationRequest> {
        let mut tables = self.tables.write().await;

        let request = tables
            .requests
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("explanation_request", id))?;

        if let Some(responder_id) = payload.responder_id {
            request.responder_id = responder_id;
        }
        if let Some(status) = payload.status {
            request.status = status;
        }

        let updated = request.clone();
        Ok(Self::with_attachments(&tables, &updated))
    }

    async fn delete_request(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;

        tables
            .requests
            .remove(&id)
            .ok_or_else(|| AppError::not_found("explanation_request", id))?;

        // Server-side cascade over owned rows
        tables.files.retain(|_, f| f.request_id != id);
        tables.entries.retain(|_, e| e.request_id != id);

        Ok(())
    }

    // ========================================================================
    // Content entries
    // ========================================================================

    async fn list_content_entries(&self, request_id: Uuid) -> Result<Vec<ContentEntry>> {
        let tables = self.tables.read().await;

        if !tables.requests.contains_key(&request_id) {
            return Err(AppError::not_found("explanation_request", request_id));
        }

        Ok(tables
            .entries
            .values()
            .filter(|e| e.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn create_content_entry(&self, payload: NewContentEntry) -> Result<ContentEntry> {
        let mut tables = self.tables.write().await;

        if !tables.requests.contains_key(&payload.request_id) {
            return Err(AppError::not_found("explanation_request", payload.request_id));
        }

        let entry = ContentEntry {
            id: Uuid::new_v4(),
            request_id: payload.request_id,
            body: payload.body,
            file_name: payload.file_name,
            file_url: payload.file_url,
            status: payload.status,
            reviewer_id: None,
            reviewed_at: None,
            created_at: Utc::now(),
        };

        tables.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn update_content_entry(
        &self,
        id: Uuid,
        payload: ContentEntryPatch,
    ) -> Result<ContentEntry> {
        let mut tables = self.tables.write().await;

        let entry = tables
            .entries
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("content_entry", id))?;

        entry.body = payload.body;
        entry.file_name = payload.file_name;
        entry.file_url = payload.file_url;
        entry.status = payload.status;

        Ok(entry.clone())
    }

    async fn delete_content_entry(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;

        tables
            .entries
            .remove(&id)
            .ok_or_else(|| AppError::not_found("content_entry", id))?;

        Ok(())
    }

    async fn evaluate_content_entry(
        &self,
        id: Uuid,
        decision: ReviewDecision,
    ) -> Result<ContentEntry> {
        let mut tables = self.tables.write().await;

        let entry = tables
            .entries
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("content_entry", id))?;

        entry.status = decision.status;
        entry.reviewer_id = Some(decision.reviewer_id);
        entry.reviewed_at = Some(decision.reviewed_at);

        Ok(entry.clone())
    }

    // ========================================================================
    // Request files
    // ========================================================================

    async fn link_file_to_request(&self, payload: NewRequestFile) -> Result<RequestFile> {
        let mut tables = self.tables.write().await;

        if !tables.requests.contains_key(&payload.request_id) {
            return Err(AppError::not_found("explanation_request", payload.request_id));
        }

        let file = RequestFile {
            id: Uuid::new_v4(),
            request_id: payload.request_id,
            file_name: payload.file_name,
            file_url: payload.file_url,
            created_at: Utc::now(),
        };

        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn unlink_request_file(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;

        tables
            .files
            .remove(&id)
            .ok_or_else(|| AppError::not_found("request_file", id))?;

        Ok(())
    }
}

//! Explanation request manager
//!
//! Owns the one-request-per-plan invariant, the request's status
//! transitions, and its attached files. Constructed per plan with its
//! dependencies injected, so a screen can hold one manager per plan it
//! is showing without any process-wide state.

use crate::attachments::AttachmentLifecycle;
use crate::policy::Capabilities;
use auditflow_common::api::{NewRequest, RequestPatch, WorkflowApi};
use auditflow_common::errors::{AppError, Result};
use auditflow_common::models::{Actor, ExplanationRequest, RequestFile, RequestStatus};
use auditflow_common::storage::{BlobStore, FileUpload};
use std::sync::Arc;
use uuid::Uuid;

/// Result of loading a plan's request
///
/// Absence of a request is a normal state for a plan, not an error.
#[derive(Clone, Debug)]
pub enum PlanRequest {
    Found(ExplanationRequest),
    NotFound,
}

/// Manager for the single explanation request of one plan
pub struct RequestManager {
    api: Arc<dyn WorkflowApi>,
    attachments: AttachmentLifecycle,
    actor: Actor,
    plan_id: Uuid,
    current: Option<ExplanationRequest>,
}

impl RequestManager {
    pub fn new(
        plan_id: Uuid,
        actor: Actor,
        api: Arc<dyn WorkflowApi>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            attachments: AttachmentLifecycle::new(api.clone(), store),
            api,
            actor,
            plan_id,
            current: None,
        }
    }

    pub fn plan_id(&self) -> Uuid {
        self.plan_id
    }

    /// The loaded request, if any
    pub fn request(&self) -> Option<&ExplanationRequest> {
        self.current.as_ref()
    }

    /// Capabilities of the acting actor against the loaded request
    pub fn capabilities(&self) -> Capabilities {
        let is_owner = self
            .current
            .as_ref()
            .map(|r| r.owned_by(self.actor.id))
            .unwrap_or(false);

        Capabilities::resolve(self.actor.role, is_owner)
    }

    /// Fetch the plan's request from the backend
    pub async fn load(&mut self) -> Result<PlanRequest> {
        let mut requests = self.api.list_requests_for_plan(self.plan_id).await?;

        if requests.len() > 1 {
            tracing::warn!(
                plan_id = %self.plan_id,
                count = requests.len(),
                "Plan has more than one explanation request; using the oldest"
            );
        }

        requests.sort_by_key(|r| r.created_at);
        self.current = requests.into_iter().next();

        Ok(match &self.current {
            Some(request) => PlanRequest::Found(request.clone()),
            None => PlanRequest::NotFound,
        })
    }

    /// Open an explanation request with its initial attachments
    ///
    /// Files are uploaded and linked one at a time. A mid-batch failure
    /// leaves the already-linked prefix in place and surfaces the upload
    /// error; callers should `load()` again to observe what was kept.
    pub async fn create(
        &mut self,
        responder_id: Uuid,
        initial_files: Vec<FileUpload>,
    ) -> Result<ExplanationRequest> {
        self.require(|c| c.create_request, "create an explanation request")?;

        if responder_id.is_nil() {
            return Err(AppError::MissingField {
                field: "responder_id".to_string(),
            });
        }
        if initial_files.is_empty() {
            return Err(AppError::Validation {
                message: "an explanation request needs at least one file".to_string(),
                field: Some("files".to_string()),
            });
        }

        // One live request per plan
        let existing = self.api.list_requests_for_plan(self.plan_id).await?;
        if !existing.is_empty() {
            return Err(AppError::Conflict {
                message: "plan already has an explanation request".to_string(),
            });
        }

        let mut request = self
            .api
            .create_request(NewRequest {
                plan_id: self.plan_id,
                requester_id: self.actor.id,
                responder_id,
                status: RequestStatus::Pending,
            })
            .await?;

        tracing::info!(
            request_id = %request.id,
            plan_id = %self.plan_id,
            responder_id = %responder_id,
            files = initial_files.len(),
            "Explanation request created"
        );
        metrics::counter!("auditflow_requests_created_total").increment(1);

        for file in &initial_files {
            let linked = self.attachments.attach_to_request(request.id, file).await?;
            request.attachments.push(linked);
        }

        self.current = Some(request.clone());
        Ok(request)
    }

    /// Reassign the responder and/or set the overall status
    ///
    /// Does not touch attachments.
    pub async fn update(
        &mut self,
        responder_id: Uuid,
        status: RequestStatus,
    ) -> Result<ExplanationRequest> {
        self.require(|c| c.edit_request_status, "edit the explanation request")?;

        if responder_id.is_nil() {
            return Err(AppError::MissingField {
                field: "responder_id".to_string(),
            });
        }

        let request = self.loaded()?;
        let updated = self
            .api
            .update_request(
                request.id,
                RequestPatch {
                    responder_id: Some(responder_id),
                    status: Some(status),
                },
            )
            .await?;

        tracing::info!(
            request_id = %updated.id,
            responder_id = %responder_id,
            status = ?status,
            "Explanation request updated"
        );

        self.current = Some(updated.clone());
        Ok(updated)
    }

    /// Transition the request from `Pending` to `Completed`
    pub async fn complete(&mut self) -> Result<ExplanationRequest> {
        self.require(|c| c.edit_request_status, "complete the explanation request")?;

        let request = self.loaded()?;
        if request.status != RequestStatus::Pending {
            return Err(AppError::InvalidState {
                message: "request is not pending".to_string(),
            });
        }

        let updated = self
            .api
            .update_request(
                request.id,
                RequestPatch {
                    responder_id: None,
                    status: Some(RequestStatus::Completed),
                },
            )
            .await?;

        tracing::info!(request_id = %updated.id, "Explanation request completed");
        metrics::counter!("auditflow_requests_completed_total").increment(1);

        self.current = Some(updated.clone());
        Ok(updated)
    }

    /// Delete the request; the backend cascades attachments and entries
    pub async fn delete(&mut self) -> Result<()> {
        self.require(|c| c.delete_request, "delete the explanation request")?;

        let request_id = self.loaded()?.id;
        self.api.delete_request(request_id).await?;

        tracing::info!(
            request_id = %request_id,
            plan_id = %self.plan_id,
            "Explanation request deleted"
        );
        metrics::counter!("auditflow_requests_deleted_total").increment(1);

        self.current = None;
        Ok(())
    }

    /// Upload a file and attach it to the loaded request
    pub async fn add_attachment(&mut self, file: &FileUpload) -> Result<RequestFile> {
        self.require(|c| c.upload_request_file, "attach a file")?;

        let request_id = self.loaded()?.id;
        let linked = self.attachments.attach_to_request(request_id, file).await?;

        if let Some(request) = self.current.as_mut() {
            request.attachments.push(linked.clone());
        }

        Ok(linked)
    }

    /// Remove an attachment from the loaded request
    pub async fn remove_attachment(&mut self, file_id: Uuid) -> Result<()> {
        self.require(|c| c.delete_request_file, "remove a file")?;

        self.attachments.unlink(file_id).await?;

        if let Some(request) = self.current.as_mut() {
            request.attachments.retain(|f| f.id != file_id);
        }

        Ok(())
    }

    fn loaded(&self) -> Result<&ExplanationRequest> {
        self.current.as_ref().ok_or_else(|| AppError::InvalidState {
            message: "no explanation request loaded for this plan".to_string(),
        })
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

#[cfg(test)]
mod tests {
    use super::*;
    use auditflow_common::api::MemoryWorkflowApi;
    use auditflow_common::models::Role;
    use auditflow_common::storage::MemoryBlobStore;

    struct Fixture {
        api: Arc<MemoryWorkflowApi>,
        store: Arc<MemoryBlobStore>,
        lead: Actor,
        member: Actor,
        unit: Actor,
        plan_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let api = Arc::new(MemoryWorkflowApi::new());
        let lead = Actor::new("lead", Role::Lead);
        let member = Actor::new("member", Role::Member);
        let unit = Actor::new("unit", Role::Unit);
        api.insert_actor(lead.clone()).await;
        api.insert_actor(member.clone()).await;
        api.insert_actor(unit.clone()).await;

        Fixture {
            api,
            store: Arc::new(MemoryBlobStore::new()),
            lead,
            member,
            unit,
            plan_id: Uuid::new_v4(),
        }
    }

    impl Fixture {
        fn manager(&self, actor: &Actor) -> RequestManager {
            RequestManager::new(
                self.plan_id,
                actor.clone(),
                self.api.clone(),
                self.store.clone(),
            )
        }

        fn manager_with_store(&self, actor: &Actor, store: MemoryBlobStore) -> RequestManager {
            RequestManager::new(
                self.plan_id,
                actor.clone(),
                self.api.clone(),
                Arc::new(store),
            )
        }
    }

    fn pdf(name: &str) -> FileUpload {
        FileUpload::new(name, "application/pdf", vec![0xAB; 16])
    }

    #[tokio::test]
    async fn test_load_without_request_is_not_an_error() {
        let fx = fixture().await;
        let mut manager = fx.manager(&fx.member);

        let loaded = manager.load().await.unwrap();
        assert!(matches!(loaded, PlanRequest::NotFound));
        assert!(manager.request().is_none());
    }

    #[tokio::test]
    async fn test_create_requires_responder_and_files() {
        let fx = fixture().await;
        let mut manager = fx.manager(&fx.member);

        let err = manager.create(Uuid::nil(), vec![pdf("a.pdf")]).await.unwrap_err();
        assert!(matches!(err, AppError::MissingField { .. }));

        let err = manager.create(fx.unit.id, Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_unit_cannot_create_request() {
        let fx = fixture().await;
        let mut manager = fx.manager(&fx.unit);

        let err = manager
            .create(fx.unit.id, vec![pdf("a.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization { .. }));
        assert_eq!(fx.api.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_create_links_initial_files_in_order() {
        let fx = fixture().await;
        let mut manager = fx.manager(&fx.member);

        let request = manager
            .create(fx.unit.id, vec![pdf("a.pdf"), pdf("b.pdf")])
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.requester_id, fx.member.id);
        assert_eq!(request.attachments.len(), 2);
        assert_eq!(fx.store.uploaded().await, vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_second_request_for_plan_is_rejected() {
        let fx = fixture().await;
        let mut first = fx.manager(&fx.member);
        first.create(fx.unit.id, vec![pdf("a.pdf")]).await.unwrap();

        let mut second = fx.manager(&fx.lead);
        let err = second
            .create(fx.unit.id, vec![pdf("b.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_partial_upload_failure_keeps_linked_prefix() {
        let fx = fixture().await;
        let mut manager = fx.manager_with_store(&fx.member, MemoryBlobStore::failing_after(1));

        let err = manager
            .create(fx.unit.id, vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Upload { .. }));

        // The request and the first file survive; nothing is rolled back
        let mut reader = fx.manager(&fx.member);
        match reader.load().await.unwrap() {
            PlanRequest::Found(request) => {
                assert_eq!(request.attachments.len(), 1);
                assert_eq!(request.attachments[0].file_name, "a.pdf");
            }
            PlanRequest::NotFound => panic!("request should have been persisted"),
        }
    }

    #[tokio::test]
    async fn test_complete_is_single_shot() {
        let fx = fixture().await;
        let mut manager = fx.manager(&fx.member);
        manager.create(fx.unit.id, vec![pdf("a.pdf")]).await.unwrap();

        let completed = manager.complete().await.unwrap();
        assert_eq!(completed.status, RequestStatus::Completed);

        let err = manager.complete().await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState { .. }));
        assert_eq!(
            manager.request().unwrap().status,
            RequestStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_delete_is_lead_only_and_cascades() {
        let fx = fixture().await;
        let mut member = fx.manager(&fx.member);
        member.create(fx.unit.id, vec![pdf("a.pdf")]).await.unwrap();

        let err = member.delete().await.unwrap_err();
        assert!(matches!(err, AppError::Authorization { .. }));

        let mut lead = fx.manager(&fx.lead);
        lead.load().await.unwrap();
        lead.delete().await.unwrap();

        assert_eq!(fx.api.request_count().await, 0);
        assert_eq!(fx.api.file_count().await, 0);
        assert!(lead.request().is_none());
    }

    #[tokio::test]
    async fn test_attachment_commands_are_gated() {
        let fx = fixture().await;
        let mut member = fx.manager(&fx.member);
        let request = member.create(fx.unit.id, vec![pdf("a.pdf")]).await.unwrap();

        let linked = member.add_attachment(&pdf("extra.pdf")).await.unwrap();
        assert_eq!(member.request().unwrap().attachments.len(), 2);

        member.remove_attachment(linked.id).await.unwrap();
        assert_eq!(member.request().unwrap().attachments.len(), 1);

        let mut unit = fx.manager(&fx.unit);
        unit.load().await.unwrap();
        let err = unit.add_attachment(&pdf("x.pdf")).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization { .. }));
        let err = unit
            .remove_attachment(request.attachments[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization { .. }));
    }
}

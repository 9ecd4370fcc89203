//! End-to-end workflow scenarios over the in-memory collaborators

use auditflow_common::api::MemoryWorkflowApi;
use auditflow_common::errors::AppError;
use auditflow_common::models::{Actor, ContentStatus, RequestStatus, Role};
use auditflow_common::storage::{FileUpload, MemoryBlobStore};
use auditflow_engine::{ContentManager, PlanRequest, RequestManager, ReviewOutcome};
use std::sync::Arc;
use uuid::Uuid;

struct Console {
    api: Arc<MemoryWorkflowApi>,
    store: Arc<MemoryBlobStore>,
    lead: Actor,
    member: Actor,
    unit: Actor,
    plan_id: Uuid,
}

async fn console() -> Console {
    let api = Arc::new(MemoryWorkflowApi::new());
    let lead = Actor::new("audit-lead", Role::Lead);
    let member = Actor::new("audit-member", Role::Member);
    let unit = Actor::new("responding-unit", Role::Unit);
    api.insert_actor(lead.clone()).await;
    api.insert_actor(member.clone()).await;
    api.insert_actor(unit.clone()).await;

    Console {
        api,
        store: Arc::new(MemoryBlobStore::new()),
        lead,
        member,
        unit,
        plan_id: Uuid::new_v4(),
    }
}

impl Console {
    fn requests_as(&self, actor: &Actor) -> RequestManager {
        RequestManager::new(
            self.plan_id,
            actor.clone(),
            self.api.clone(),
            self.store.clone(),
        )
    }

    fn contents_as(
        &self,
        actor: &Actor,
        request: &auditflow_common::models::ExplanationRequest,
    ) -> ContentManager {
        ContentManager::for_request(request, actor.clone(), self.api.clone(), self.store.clone())
    }
}

fn pdf(name: &str) -> FileUpload {
    FileUpload::new(name, "application/pdf", vec![0xEF; 32])
}

#[tokio::test]
async fn explanation_round_trips_until_passed() {
    let console = console().await;

    // A member opens the request against the responding unit
    let mut requests = console.requests_as(&console.member);
    let request = requests
        .create(console.unit.id, vec![pdf("findings.pdf")])
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    // The unit responds with a text-only explanation
    let mut unit_contents = console.contents_as(&console.unit, &request);
    let entry = unit_contents
        .create("explanation text", None)
        .await
        .unwrap();
    assert_eq!(entry.status, ContentStatus::AwaitingReview);

    // The lead is not convinced
    let mut lead_contents = console.contents_as(&console.lead, &request);
    let failed = lead_contents
        .evaluate(entry.id, ReviewOutcome::Failed)
        .await
        .unwrap();
    assert_eq!(failed.status, ContentStatus::Failed);

    // The unit attaches a fix, which marks the entry revised
    let revised = unit_contents
        .edit(entry.id, "explanation text", Some(&pdf("fix.pdf")))
        .await
        .unwrap();
    assert_eq!(revised.status, ContentStatus::Revised);

    // Second review passes, terminally
    let passed = lead_contents
        .evaluate(entry.id, ReviewOutcome::Passed)
        .await
        .unwrap();
    assert_eq!(passed.status, ContentStatus::Passed);
    assert_eq!(passed.reviewer_id, Some(console.lead.id));
    assert!(passed.status.is_terminal());

    // With every entry passed, the member closes the request
    let completed = requests.complete().await.unwrap();
    assert_eq!(completed.status, RequestStatus::Completed);
}

#[tokio::test]
async fn deleting_a_request_hides_its_children() {
    let console = console().await;

    let mut requests = console.requests_as(&console.member);
    let request = requests
        .create(console.unit.id, vec![pdf("findings.pdf"), pdf("annex.pdf")])
        .await
        .unwrap();

    let mut unit_contents = console.contents_as(&console.unit, &request);
    unit_contents.create("first entry", None).await.unwrap();
    unit_contents
        .create("second entry", Some(&pdf("evidence.pdf")))
        .await
        .unwrap();

    let mut lead_requests = console.requests_as(&console.lead);
    lead_requests.load().await.unwrap();
    lead_requests.delete().await.unwrap();

    // The plan reads as having no request
    let mut reader = console.requests_as(&console.member);
    assert!(matches!(reader.load().await.unwrap(), PlanRequest::NotFound));

    // The entry list reads as empty rather than erroring
    let mut contents = console.contents_as(&console.unit, &request);
    assert!(contents.refresh().await.unwrap().is_empty());

    assert_eq!(console.api.file_count().await, 0);
    assert_eq!(console.api.entry_count().await, 0);
}

#[tokio::test]
async fn capability_flags_follow_the_viewer() {
    let console = console().await;

    let mut requests = console.requests_as(&console.member);
    let request = requests
        .create(console.unit.id, vec![pdf("findings.pdf")])
        .await
        .unwrap();

    // The designated responder may write content but nothing else
    let owner = console.contents_as(&console.unit, &request).capabilities();
    assert!(owner.add_or_edit_content);
    assert!(!owner.evaluate_content);
    assert!(!owner.delete_request);

    // Another unit viewing the same request gets nothing
    let other = Actor::new("bystander-unit", Role::Unit);
    let stranger = console.contents_as(&other, &request).capabilities();
    assert!(!stranger.add_or_edit_content);

    // A lead keeps full authority regardless of ownership
    let lead = console.contents_as(&console.lead, &request).capabilities();
    assert!(lead.evaluate_content);
    assert!(lead.delete_request);
}

#[tokio::test]
async fn authorization_failures_abort_before_any_write() {
    let console = console().await;

    let mut requests = console.requests_as(&console.member);
    let request = requests
        .create(console.unit.id, vec![pdf("findings.pdf")])
        .await
        .unwrap();

    let uploads_before = console.store.uploaded().await.len();

    // A unit trying to attach a request file is stopped locally
    let mut unit_requests = console.requests_as(&console.unit);
    unit_requests.load().await.unwrap();
    let err = unit_requests.add_attachment(&pdf("sneaky.pdf")).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization { .. }));

    // No upload happened for the denied command
    assert_eq!(console.store.uploaded().await.len(), uploads_before);
    assert_eq!(console.api.file_count().await, request.attachments.len());
}

//! Attachment lifecycle glue
//!
//! Uploads go to blob storage first; the returned URL is then recorded
//! against its owner. Request files get their own rows; content entries
//! embed the file fields on their own payloads. Uploads are not retried
//! and repeated links are not de-duplicated here.

use auditflow_common::api::{NewRequestFile, WorkflowApi};
use auditflow_common::errors::{AppError, Result};
use auditflow_common::metrics::record_upload;
use auditflow_common::models::RequestFile;
use auditflow_common::storage::{BlobStore, FileUpload, StoredBlob};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;
use validator::Validate;

/// Upload-then-link glue shared by the request and content managers
#[derive(Clone)]
pub struct AttachmentLifecycle {
    api: Arc<dyn WorkflowApi>,
    store: Arc<dyn BlobStore>,
}

impl AttachmentLifecycle {
    pub fn new(api: Arc<dyn WorkflowApi>, store: Arc<dyn BlobStore>) -> Self {
        Self { api, store }
    }

    /// Upload a file and return its stored location
    pub async fn upload(&self, file: &FileUpload) -> Result<StoredBlob> {
        let start = Instant::now();

        match self.store.upload(file).await {
            Ok(blob) => {
                record_upload(start.elapsed().as_secs_f64(), true);
                tracing::debug!(
                    file_name = %file.file_name,
                    url = %blob.url,
                    "File uploaded"
                );
                Ok(blob)
            }
            Err(e) => {
                record_upload(start.elapsed().as_secs_f64(), false);
                tracing::warn!(
                    file_name = %file.file_name,
                    error = %e,
                    "File upload failed"
                );
                Err(e)
            }
        }
    }

    /// Upload a file and record it as a request attachment
    pub async fn attach_to_request(
        &self,
        request_id: Uuid,
        file: &FileUpload,
    ) -> Result<RequestFile> {
        if file.file_name.trim().is_empty() {
            return Err(AppError::MissingField {
                field: "file_name".to_string(),
            });
        }

        let blob = self.upload(file).await?;

        let payload = NewRequestFile {
            request_id,
            file_name: file.file_name.clone(),
            file_url: blob.url,
        };
        payload.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
            field: Some("file_name".to_string()),
        })?;

        self.api.link_file_to_request(payload).await
    }

    /// Remove a request attachment row
    pub async fn unlink(&self, file_id: Uuid) -> Result<()> {
        self.api.unlink_request_file(file_id).await?;

        tracing::debug!(file_id = %file_id, "Request file unlinked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditflow_common::api::{MemoryWorkflowApi, NewRequest};
    use auditflow_common::errors::AppError;
    use auditflow_common::models::{Actor, RequestStatus, Role};
    use auditflow_common::storage::MemoryBlobStore;

    async fn fixture(store: MemoryBlobStore) -> (AttachmentLifecycle, Uuid) {
        let api = Arc::new(MemoryWorkflowApi::new());
        let lead = Actor::new("lead", Role::Lead);
        let unit = Actor::new("unit", Role::Unit);
        api.insert_actor(lead.clone()).await;
        api.insert_actor(unit.clone()).await;

        let request = api
            .create_request(NewRequest {
                plan_id: Uuid::new_v4(),
                requester_id: lead.id,
                responder_id: unit.id,
                status: RequestStatus::Pending,
            })
            .await
            .unwrap();

        (AttachmentLifecycle::new(api, Arc::new(store)), request.id)
    }

    #[tokio::test]
    async fn test_attach_links_uploaded_url() {
        let (attachments, request_id) = fixture(MemoryBlobStore::new()).await;
        let file = FileUpload::new("findings.pdf", "application/pdf", vec![1, 2, 3]);

        let linked = attachments.attach_to_request(request_id, &file).await.unwrap();

        assert_eq!(linked.request_id, request_id);
        assert_eq!(linked.file_name, "findings.pdf");
        assert!(linked.file_url.contains("findings.pdf"));
    }

    #[tokio::test]
    async fn test_upload_failure_links_nothing() {
        let (attachments, request_id) = fixture(MemoryBlobStore::failing_after(0)).await;
        let file = FileUpload::new("findings.pdf", "application/pdf", vec![1, 2, 3]);

        let err = attachments
            .attach_to_request(request_id, &file)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upload { .. }));
    }
}

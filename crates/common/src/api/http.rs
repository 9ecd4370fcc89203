//! REST client for the console backend

use super::{
    ContentEntryPatch, NewContentEntry, NewRequest, NewRequestFile, RequestPatch, ReviewDecision,
    WorkflowApi,
};
use crate::config::BackendConfig;
use crate::errors::{AppError, Result};
use crate::models::{Actor, ContentEntry, ExplanationRequest, RequestFile};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

/// [`WorkflowApi`] implementation over the backend's REST surface
pub struct HttpWorkflowApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpWorkflowApi {
    /// Create a new client from backend configuration
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        resource: &str,
        id: &str,
    ) -> Result<T> {
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        Self::read_json(response, resource, id).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
        id: &str,
    ) -> Result<T> {
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::read_json(response, resource, id).await
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
        id: &str,
    ) -> Result<T> {
        let response = self
            .authorize(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?;
        Self::read_json(response, resource, id).await
    }

    async fn delete_empty(&self, path: &str, resource: &str, id: &str) -> Result<()> {
        let response = self
            .authorize(self.client.delete(self.url(path)))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(Self::map_error(response, resource, id).await)
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        resource: &str,
        id: &str,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::map_error(response, resource, id).await);
        }

        response.json::<T>().await.map_err(|e| AppError::Backend {
            status: 200,
            message: format!("Failed to parse response: {}", e),
        })
    }

    async fn map_error(response: Response, resource: &str, id: &str) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => AppError::not_found(resource, id),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Authorization {
                message: if body.is_empty() {
                    "backend refused the operation".to_string()
                } else {
                    body
                },
            },
            StatusCode::CONFLICT => AppError::Conflict { message: body },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation {
                message: body,
                field: None,
            },
            _ => AppError::Backend {
                status: status.as_u16(),
                message: body,
            },
        }
    }
}

#[async_trait]
impl WorkflowApi for HttpWorkflowApi {
    async fn fetch_current_actor(&self) -> Result<Actor> {
        self.get_json("/actors/me", "actor", "me").await
    }

    async fn list_requests_for_plan(&self, plan_id: Uuid) -> Result<Vec<ExplanationRequest>> {
        self.get_json(
            &format!("/plans/{}/explanation-requests", plan_id),
            "plan",
            &plan_id.to_string(),
        )
        .await
    }

    async fn create_request(&self, payload: NewRequest) -> Result<ExplanationRequest> {
        self.post_json(
            "/explanation-requests",
            &payload,
            "explanation_request",
            &payload.plan_id.to_string(),
        )
        .await
    }

    async fn update_request(&self, id: Uuid, payload: RequestPatch) -> Result<ExplanationRequest> {
        self.put_json(
            &format!("/explanation-requests/{}", id),
            &payload,
            "explanation_request",
            &id.to_string(),
        )
        .await
    }

    async fn delete_request(&self, id: Uuid) -> Result<()> {
        self.delete_empty(
            &format!("/explanation-requests/{}", id),
            "explanation_request",
            &id.to_string(),
        )
        .await
    }

    async fn list_content_entries(&self, request_id: Uuid) -> Result<Vec<ContentEntry>> {
        self.get_json(
            &format!("/explanation-requests/{}/contents", request_id),
            "explanation_request",
            &request_id.to_string(),
        )
        .await
    }

    async fn create_content_entry(&self, payload: NewContentEntry) -> Result<ContentEntry> {
        self.post_json(
            "/explanation-contents",
            &payload,
            "explanation_request",
            &payload.request_id.to_string(),
        )
        .await
    }

    async fn update_content_entry(
        &self,
        id: Uuid,
        payload: ContentEntryPatch,
    ) -> Result<ContentEntry> {
        self.put_json(
            &format!("/explanation-contents/{}", id),
            &payload,
            "content_entry",
            &id.to_string(),
        )
        .await
    }

    async fn delete_content_entry(&self, id: Uuid) -> Result<()> {
        self.delete_empty(
            &format!("/explanation-contents/{}", id),
            "content_entry",
            &id.to_string(),
        )
        .await
    }

    async fn evaluate_content_entry(
        &self,
        id: Uuid,
        decision: ReviewDecision,
    ) -> Result<ContentEntry> {
        self.post_json(
            &format!("/explanation-contents/{}/evaluation", id),
            &decision,
            "content_entry",
            &id.to_string(),
        )
        .await
    }

    async fn link_file_to_request(&self, payload: NewRequestFile) -> Result<RequestFile> {
        self.post_json(
            "/request-files",
            &payload,
            "explanation_request",
            &payload.request_id.to_string(),
        )
        .await
    }

    async fn unlink_request_file(&self, id: Uuid) -> Result<()> {
        self.delete_empty(
            &format!("/request-files/{}", id),
            "request_file",
            &id.to_string(),
        )
        .await
    }
}

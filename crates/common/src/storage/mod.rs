//! Blob storage abstraction
//!
//! A single-shot upload interface: hand over bytes, get back a stable
//! URL. There is no built-in retry; an upload failure surfaces to the
//! caller, which decides whether to try again (the workflow deliberately
//! keeps partial multi-file failures visible instead of rolling back).

use crate::config::StorageConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// An in-memory file handed to the engine by the console screen
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A successfully stored blob
#[derive(Debug, Clone, Deserialize)]
pub struct StoredBlob {
    pub url: String,
}

/// Trait for blob storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a file and return its stable URL
    async fn upload(&self, file: &FileUpload) -> Result<StoredBlob>;
}

/// Blob store over the console's HTTP upload endpoint
pub struct HttpBlobStore {
    client: reqwest::Client,
    upload_url: String,
    max_file_bytes: usize,
}

impl HttpBlobStore {
    /// Create a new store from storage configuration
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            max_file_bytes: config.max_file_bytes,
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, file: &FileUpload) -> Result<StoredBlob> {
        if file.is_empty() {
            return Err(AppError::Validation {
                message: "file is empty".to_string(),
                field: Some("file".to_string()),
            });
        }

        if file.bytes.len() > self.max_file_bytes {
            return Err(AppError::Validation {
                message: format!(
                    "file exceeds {} byte limit ({} bytes)",
                    self.max_file_bytes,
                    file.bytes.len()
                ),
                field: Some("file".to_string()),
            });
        }

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| AppError::Upload {
                file_name: file.file_name.clone(),
                message: format!("invalid content type: {}", e),
            })?;

        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Upload {
                file_name: file.file_name.clone(),
                message: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upload {
                file_name: file.file_name.clone(),
                message: format!("storage error {}: {}", status, body),
            });
        }

        response.json::<StoredBlob>().await.map_err(|e| AppError::Upload {
            file_name: file.file_name.clone(),
            message: format!("failed to parse response: {}", e),
        })
    }
}

/// In-memory blob store for local development and tests
///
/// Can be armed to fail from the N-th upload onward, which is how the
/// engine's tests exercise partial multi-file failures.
#[derive(Default)]
pub struct MemoryBlobStore {
    uploads: RwLock<Vec<String>>,
    fail_from: Option<usize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed for the first `n` uploads, fail every one after
    pub fn failing_after(n: usize) -> Self {
        Self {
            uploads: RwLock::new(Vec::new()),
            fail_from: Some(n),
        }
    }

    /// File names uploaded so far, in order
    pub async fn uploaded(&self) -> Vec<String> {
        self.uploads.read().await.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, file: &FileUpload) -> Result<StoredBlob> {
        let mut uploads = self.uploads.write().await;

        if let Some(limit) = self.fail_from {
            if uploads.len() >= limit {
                return Err(AppError::Upload {
                    file_name: file.file_name.clone(),
                    message: "simulated storage outage".to_string(),
                });
            }
        }

        uploads.push(file.file_name.clone());

        Ok(StoredBlob {
            url: format!("memory://blobs/{}/{}", Uuid::new_v4(), file.file_name),
        })
    }
}

//! Error types for the explanation workflow
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - Machine-readable error codes for the console screens
//! - A caller-correctable vs. infrastructure split
//!
//! Validation and authorization failures are raised before any network
//! call; transport and backend failures bubble up unwrapped so the
//! screen layer decides on user-visible messaging.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,

    // Authorization errors (2xxx)
    Forbidden,

    // Resource errors (3xxx)
    NotFound,

    // State errors (4xxx)
    Conflict,
    InvalidState,

    // Collaborator errors (5xxx)
    UploadFailed,
    TransportError,
    BackendError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,

            // Authorization (2xxx)
            ErrorCode::Forbidden => 2001,

            // Resources (3xxx)
            ErrorCode::NotFound => 3001,

            // State (4xxx)
            ErrorCode::Conflict => 4001,
            ErrorCode::InvalidState => 4002,

            // Collaborators (5xxx)
            ErrorCode::UploadFailed => 5001,
            ErrorCode::TransportError => 5002,
            ErrorCode::BackendError => 5003,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    // Authorization errors
    #[error("Not permitted: {message}")]
    Authorization { message: String },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    // State errors
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    // Collaborator errors
    #[error("Upload failed for {file_name}: {message}")]
    Upload { file_name: String, message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Backend error {status}: {message}")]
    Backend { status: u16, message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::Authorization { .. } => ErrorCode::Forbidden,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Conflict { .. } => ErrorCode::Conflict,
            AppError::InvalidState { .. } => ErrorCode::InvalidState,
            AppError::Upload { .. } => ErrorCode::UploadFailed,
            AppError::Transport { .. } => ErrorCode::TransportError,
            AppError::Backend { .. } => ErrorCode::BackendError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Check if this error is correctable by the caller (form-level surfacing)
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation { .. }
                | AppError::MissingField { .. }
                | AppError::Authorization { .. }
                | AppError::Conflict { .. }
                | AppError::InvalidState { .. }
        )
    }

    /// Check if this error came from a collaborator rather than the engine
    pub fn is_collaborator_error(&self) -> bool {
        matches!(
            self,
            AppError::Upload { .. } | AppError::Transport { .. } | AppError::Backend { .. }
        )
    }

    /// Shorthand for a not-found error on a given resource type
    pub fn not_found(resource_type: &str, id: impl ToString) -> Self {
        AppError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport {
            message: err.to_string(),
        }
    }
}

/// Structured error payload surfaced to the console screens
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&AppError> for ErrorDetails {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

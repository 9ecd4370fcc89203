//! Domain models for the explanation workflow
//!
//! Plain serde types shared between the engine, the backend clients,
//! and the console screens. Status enums are string-backed on the wire
//! with lenient decoding, matching the backend's payloads.

pub mod actor;
pub mod content_entry;
pub mod request;
pub mod request_file;

pub use actor::{Actor, Role};
pub use content_entry::{ContentEntry, ContentStatus};
pub use request::{ExplanationRequest, RequestStatus};
pub use request_file::RequestFile;

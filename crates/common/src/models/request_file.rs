//! File attachment rows owned by an explanation request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored file linked to exactly one explanation request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFile {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

//! Actors and trust tiers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trust tier of an authenticated actor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full authority over requests and reviews
    Lead,
    /// Day-to-day operator of the console
    Member,
    /// External responder, lowest trust
    Unit,
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "lead" => Role::Lead,
            "member" => Role::Member,
            "unit" => Role::Unit,
            // Unknown roles fall back to the lowest trust tier
            _ => Role::Unit,
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Lead => "lead".to_string(),
            Role::Member => "member".to_string(),
            Role::Unit => "unit".to_string(),
        }
    }
}

/// An authenticated actor as resolved from the session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Actor {
    /// Create an actor with a fresh id, mainly useful in fixtures
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            role,
        }
    }
}

//! Session handling and actor resolution
//!
//! Provides:
//! - Session token issuing and validation
//! - Mapping of session claims onto an [`Actor`]
//! - The Actor Resolver consulted by the workflow managers
//!
//! Authentication transport (cookies, headers, refresh) belongs to the
//! hosting console; the engine only ever sees an opaque token string or
//! the backend's notion of the current actor.

use crate::api::WorkflowApi;
use crate::errors::{AppError, Result};
use crate::models::{Actor, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Session claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (actor ID)
    pub sub: String,

    /// Display name
    pub username: String,

    /// Trust tier
    pub role: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl TryFrom<SessionClaims> for Actor {
    type Error = AppError;

    fn try_from(claims: SessionClaims) -> Result<Actor> {
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Authorization {
            message: "session subject is not a valid actor id".to_string(),
        })?;

        Ok(Actor {
            id,
            username: claims.username,
            role: Role::from(claims.role),
        })
    }
}

/// Session token manager
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SessionTokens {
    /// Create a new session token manager with the given secret
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Issue a session token for an actor
    pub fn issue(&self, actor: &Actor) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.ttl_secs);

        let claims = SessionClaims {
            sub: actor.id.to_string(),
            username: actor.username.clone(),
            role: String::from(actor.role),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::Internal {
                message: format!("Failed to issue session token: {}", e),
            }
        })
    }

    /// Validate a session token and decode its claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::Authorization {
                    message: "session expired".to_string(),
                },
                _ => AppError::Authorization {
                    message: "invalid session token".to_string(),
                },
            })
    }
}

/// Resolves the current actor's identity and role
///
/// Leaf dependency of the workflow managers: everything permission-related
/// starts from the actor this resolver hands back.
pub struct ActorResolver {
    api: Arc<dyn WorkflowApi>,
}

impl ActorResolver {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self { api }
    }

    /// Resolve the current actor from the backend session
    pub async fn resolve(&self) -> Result<Actor> {
        let actor = self.api.fetch_current_actor().await?;

        tracing::debug!(
            actor_id = %actor.id,
            role = ?actor.role,
            "Resolved current actor"
        );

        Ok(actor)
    }

    /// Resolve an actor from a locally validated session token
    pub fn resolve_from_token(&self, tokens: &SessionTokens, token: &str) -> Result<Actor> {
        tokens.validate(token)?.try_into()
    }
}

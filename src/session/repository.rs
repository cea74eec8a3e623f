use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Session, SessionData};
use crate::AuthError;

/// Storage for server-side sessions.
#[async_trait]
pub trait SessionRepository {
    /// Stores `data` under a freshly generated opaque id, returned.
    async fn create(&self, data: SessionData) -> Result<String, AuthError>;

    async fn find(&self, session_id: &str) -> Result<Option<Session>, AuthError>;

    async fn destroy(&self, session_id: &str) -> Result<(), AuthError>;

    /// Destroys every session belonging to one identity.
    async fn destroy_identity_sessions(&self, identity_id: i64) -> Result<(), AuthError>;

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

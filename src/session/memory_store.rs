//! In-memory session storage.
//!
//! Sessions die with the process; use an external store for multi-instance
//! deployments.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::repository::SessionRepository;
use super::{Session, SessionData};
use crate::crypto::{generate_token, SESSION_ID_LENGTH};
use crate::AuthError;

#[derive(Clone, Default)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, data: SessionData) -> Result<String, AuthError> {
        let session_id = generate_token(SESSION_ID_LENGTH);

        self.sessions
            .write()
            .map_err(|_| AuthError::StoreUnavailable("session lock poisoned".to_owned()))?
            .insert(session_id.clone(), data);

        Ok(session_id)
    }

    async fn find(&self, session_id: &str) -> Result<Option<Session>, AuthError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthError::StoreUnavailable("session lock poisoned".to_owned()))?;

        Ok(sessions.get(session_id).map(|data| Session {
            id: session_id.to_owned(),
            data: data.clone(),
        }))
    }

    async fn destroy(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions
            .write()
            .map_err(|_| AuthError::StoreUnavailable("session lock poisoned".to_owned()))?
            .remove(session_id);

        Ok(())
    }

    async fn destroy_identity_sessions(&self, identity_id: i64) -> Result<(), AuthError> {
        self.sessions
            .write()
            .map_err(|_| AuthError::StoreUnavailable("session lock poisoned".to_owned()))?
            .retain(|_, data| data.identity_id != identity_id);

        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::StoreUnavailable("session lock poisoned".to_owned()))?;

        let before = sessions.len();
        sessions.retain(|_, data| data.expires_at > now);

        Ok(before.saturating_sub(sessions.len()) as u64)
    }
}

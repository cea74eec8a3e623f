//! Server-side sessions carried by a signed cookie.

mod config;
mod cookie;
mod memory_store;
mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use config::{SameSite, SessionConfig};
pub use cookie::{sign_session_id, verify_signed_cookie};
pub use memory_store::InMemorySessionRepository;
pub use repository::SessionRepository;

/// What a session remembers about its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub identity_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A stored session: opaque id plus its data.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub data: SessionData,
}

impl Session {
    pub fn new(id: String, data: SessionData) -> Self {
        Self { id, data }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.data.expires_at
    }
}

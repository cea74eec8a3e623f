use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Username prefix for identities auto-created from a bare phone number.
///
/// A placeholder becomes a full identity when registration completes; the
/// prefix is how the OTP flow tells a first-time caller from a returning
/// one.
pub const PLACEHOLDER_PREFIX: &str = "temp_";

/// The durable record of a person.
///
/// Verification flags only ever move false to true, and identities are
/// never deleted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub phone_verified: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// True while the identity is the synthesized stand-in created by a
    /// first OTP request, before registration completes.
    pub fn is_placeholder(&self) -> bool {
        self.username.starts_with(PLACEHOLDER_PREFIX)
    }
}

/// Fields for creating an identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub hashed_password: String,
    pub full_name: Option<String>,
}

impl NewIdentity {
    /// The synthesized identity backing an unregistered phone number.
    ///
    /// `hashed_password` is a real argon2 hash of a random value, so the
    /// placeholder can never be logged into by password.
    pub fn placeholder(phone_number: &str, hashed_password: String) -> Self {
        Self {
            username: format!("{PLACEHOLDER_PREFIX}{phone_number}"),
            email: format!("{PLACEHOLDER_PREFIX}{phone_number}@placeholder.invalid"),
            phone_number: Some(phone_number.to_owned()),
            hashed_password,
            full_name: None,
        }
    }
}

/// Partial update: only populated fields change.
#[derive(Debug, Clone, Default)]
pub struct IdentityPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hashed_password: Option<String>,
    pub full_name: Option<String>,
}

impl IdentityPatch {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.hashed_password.is_none()
            && self.full_name.is_none()
    }
}

#[async_trait]
pub trait IdentityRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AuthError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AuthError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError>;
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Identity>, AuthError>;

    /// Creates with `is_active = true`, `is_admin = false` and both
    /// verification flags false. Unique-constraint collisions surface as
    /// [`AuthError::Conflict`].
    async fn create(&self, new: NewIdentity) -> Result<Identity, AuthError>;

    /// Applies only the populated fields of `patch`. Unique-constraint
    /// collisions surface as [`AuthError::Conflict`].
    async fn update(&self, id: i64, patch: IdentityPatch) -> Result<Identity, AuthError>;

    /// One-way transition; idempotent.
    async fn mark_phone_verified(&self, id: i64) -> Result<(), AuthError>;

    /// One-way transition; idempotent.
    async fn mark_email_verified(&self, id: i64) -> Result<(), AuthError>;
}

#[cfg(any(test, feature = "mocks"))]
impl Identity {
    pub fn mock(id: i64, username: &str) -> Self {
        let now = Utc::now();
        Identity {
            id,
            username: username.to_owned(),
            email: format!("{username}@example.com"),
            phone_number: None,
            hashed_password: "fakehashedpassword".to_owned(),
            full_name: None,
            is_active: true,
            is_admin: false,
            phone_verified: false,
            email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

use std::sync::Arc;

use chrono::Utc;

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{self, AuthEvent};
use crate::notify::{self, Notifier};
use crate::repository::{Identity, IdentityRepository, NewIdentity};
use crate::validators::{normalize_phone, validate_email, validate_password, validate_username};
use crate::{AuthError, ConflictField, SecretString};

/// Fields for password registration (the no-phone-challenge path).
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Explicit registration with username, email and password.
pub struct RegisterAction<I: IdentityRepository> {
    identities: I,
    notifier: Arc<dyn Notifier>,
    hasher: Argon2Hasher,
}

impl<I: IdentityRepository> RegisterAction<I> {
    pub fn new(identities: I, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            identities,
            notifier,
            hasher: Argon2Hasher::default(),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Validates the input, checks each unique field up front (failing
    /// fast with a field-specific conflict), then creates the identity.
    /// The verification email goes out fire-and-forget; its fate never
    /// affects the result.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "register", skip_all, err))]
    pub async fn execute(&self, input: RegisterInput) -> Result<Identity, AuthError> {
        validate_email(&input.email)?;
        validate_username(&input.username)?;
        validate_password(input.password.expose())?;
        let phone_number = input
            .phone_number
            .as_deref()
            .map(normalize_phone)
            .transpose()?;

        if self.identities.find_by_email(&input.email).await?.is_some() {
            return Err(AuthError::Conflict(ConflictField::Email));
        }
        if self
            .identities
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict(ConflictField::Username));
        }
        if let Some(ref phone) = phone_number {
            if self.identities.find_by_phone(phone).await?.is_some() {
                return Err(AuthError::Conflict(ConflictField::PhoneNumber));
            }
        }

        let hashed = self.hasher.hash(input.password.expose())?;
        let identity = self
            .identities
            .create(NewIdentity {
                username: input.username,
                email: input.email,
                phone_number,
                hashed_password: hashed,
                full_name: input.full_name,
            })
            .await?;

        notify::send_verification_email_detached(
            Arc::clone(&self.notifier),
            identity.email.clone(),
            identity.username.clone(),
        );

        events::dispatch(AuthEvent::Registered {
            identity_id: identity.id,
            username: identity.username.clone(),
            at: Utc::now(),
        })
        .await;
        events::dispatch(AuthEvent::VerificationEmailSent {
            identity_id: identity.id,
            at: Utc::now(),
        })
        .await;

        Ok(identity)
    }
}

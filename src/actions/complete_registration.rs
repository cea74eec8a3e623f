use std::sync::Arc;

use chrono::Utc;

use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{self, AuthEvent};
use crate::jwt::JwtService;
use crate::notify::{self, Notifier};
use crate::repository::{Identity, IdentityPatch, IdentityRepository};
use crate::validators::{normalize_phone, validate_email, validate_password, validate_username};
use crate::{AuthError, ConflictField, SecretString};

/// Fields supplied after a verified challenge to turn a placeholder into a
/// real identity.
#[derive(Debug, Clone)]
pub struct CompleteRegistrationInput {
    pub phone_number: String,
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub full_name: Option<String>,
}

/// Finishes phone-first registration.
pub struct CompleteRegistrationAction<I: IdentityRepository> {
    identities: I,
    jwt: JwtService,
    notifier: Arc<dyn Notifier>,
    hasher: Argon2Hasher,
}

impl<I: IdentityRepository> CompleteRegistrationAction<I> {
    pub fn new(identities: I, jwt: JwtService, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            identities,
            jwt,
            notifier,
            hasher: Argon2Hasher::default(),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Claims the placeholder identity behind `phone_number`, giving it
    /// real credentials and marking the phone verified.
    ///
    /// Rejects with a field-specific conflict when the email or username
    /// belongs to a *different* identity, and when the phone number is
    /// already attached to a completed registration. The verification
    /// email is fire-and-forget. Returns the identity and its first
    /// access token.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "complete_registration", skip_all, err)
    )]
    pub async fn execute(
        &self,
        input: CompleteRegistrationInput,
    ) -> Result<(Identity, String), AuthError> {
        validate_email(&input.email)?;
        validate_username(&input.username)?;
        validate_password(input.password.expose())?;
        let phone_number = normalize_phone(&input.phone_number)?;

        // Only a challenge flow creates identities for bare phone numbers,
        // so "no identity" means no flow was ever started for this phone.
        let identity = self
            .identities
            .find_by_phone(&phone_number)
            .await?
            .ok_or(AuthError::OtpInvalid)?;

        if !identity.is_placeholder() {
            return Err(AuthError::Conflict(ConflictField::PhoneNumber));
        }

        if let Some(other) = self.identities.find_by_email(&input.email).await? {
            if other.id != identity.id {
                return Err(AuthError::Conflict(ConflictField::Email));
            }
        }
        if let Some(other) = self.identities.find_by_username(&input.username).await? {
            if other.id != identity.id {
                return Err(AuthError::Conflict(ConflictField::Username));
            }
        }

        let hashed = self.hasher.hash(input.password.expose())?;
        let mut identity = self
            .identities
            .update(
                identity.id,
                IdentityPatch {
                    username: Some(input.username),
                    email: Some(input.email),
                    hashed_password: Some(hashed),
                    full_name: input.full_name,
                    ..Default::default()
                },
            )
            .await?;

        self.identities.mark_phone_verified(identity.id).await?;
        identity.phone_verified = true;

        notify::send_verification_email_detached(
            Arc::clone(&self.notifier),
            identity.email.clone(),
            identity.username.clone(),
        );

        events::dispatch(AuthEvent::RegistrationCompleted {
            identity_id: identity.id,
            username: identity.username.clone(),
            at: Utc::now(),
        })
        .await;
        events::dispatch(AuthEvent::PhoneVerified {
            identity_id: identity.id,
            at: Utc::now(),
        })
        .await;
        events::dispatch(AuthEvent::VerificationEmailSent {
            identity_id: identity.id,
            at: Utc::now(),
        })
        .await;

        let token = self.jwt.issue(identity.id)?;

        Ok((identity, token))
    }
}

use chrono::Utc;

use crate::crypto::{dummy_verify, Argon2Hasher, PasswordHasher};
use crate::events::{self, AuthEvent};
use crate::repository::{Identity, IdentityRepository};
use crate::{AuthError, SecretString};

/// Password login: login name or email, plus password.
pub struct LoginAction<I: IdentityRepository> {
    identities: I,
    hasher: Argon2Hasher,
}

impl<I: IdentityRepository> LoginAction<I> {
    pub fn new(identities: I) -> Self {
        Self {
            identities,
            hasher: Argon2Hasher::default(),
        }
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Authenticates `login` (username, falling back to email) against
    /// `password`.
    ///
    /// Unknown login and wrong password are indistinguishable in both the
    /// returned error and elapsed time: the unknown-login path burns an
    /// argon2 verification against a fixed dummy hash.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "login", skip_all, err))]
    pub async fn execute(
        &self,
        login: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        let identity = match self.identities.find_by_username(login).await? {
            Some(identity) => Some(identity),
            None => self.identities.find_by_email(login).await?,
        };

        let Some(identity) = identity else {
            dummy_verify();
            events::dispatch(AuthEvent::LoginFailed {
                login: login.to_owned(),
                at: Utc::now(),
            })
            .await;
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(password.expose(), &identity.hashed_password)?
        {
            events::dispatch(AuthEvent::LoginFailed {
                login: login.to_owned(),
                at: Utc::now(),
            })
            .await;
            return Err(AuthError::InvalidCredentials);
        }

        if !identity.is_active {
            return Err(AuthError::Inactive);
        }

        log::info!(
            target: "latchkey_auth",
            "msg=\"login succeeded\" identity_id={}",
            identity.id
        );
        events::dispatch(AuthEvent::LoginSucceeded {
            identity_id: identity.id,
            username: identity.username.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(identity)
    }
}

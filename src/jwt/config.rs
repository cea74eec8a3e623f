use std::fmt;

use chrono::Duration;

use crate::{AuthError, SecretString};

/// Minimum signing-secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Signing configuration for bearer tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub(crate) secret: SecretString,
    pub(crate) access_expiry: Duration,
    pub(crate) issuer: Option<String>,
    pub(crate) audience: Option<String>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("access_expiry", &self.access_expiry)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl JwtConfig {
    /// Creates a configuration with the given signing secret.
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when the secret is shorter than
    /// [`MIN_SECRET_LENGTH`] bytes.
    pub fn new(secret: impl Into<SecretString>) -> Result<Self, AuthError> {
        let secret = secret.into();

        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::ConfigurationError(format!(
                "token signing secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                secret.len()
            )));
        }

        Ok(Self {
            secret,
            access_expiry: Duration::minutes(30),
            issuer: None,
            audience: None,
        })
    }

    #[must_use]
    pub fn with_access_expiry(mut self, expiry: Duration) -> Self {
        self.access_expiry = expiry;
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn access_expiry(&self) -> Duration {
        self.access_expiry
    }
}

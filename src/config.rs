//! Crate configuration.
//!
//! Plain structs with fixed defaults; the embedding application overrides
//! what it needs:
//!
//! ```rust
//! use chrono::Duration;
//! use latchkey::{AuthConfig, OtpConfig};
//!
//! let config = AuthConfig {
//!     otp: OtpConfig {
//!         ttl: Duration::minutes(5),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

use crate::session::SessionConfig;

/// Top-level configuration for the authentication core.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// OTP challenge settings.
    pub otp: OtpConfig,
    /// Bearer-token settings.
    pub tokens: TokenConfig,
    /// Session/cookie settings.
    pub session: SessionConfig,
}

/// Settings for phone OTP challenges.
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Digits per passcode. Default: 6.
    pub code_length: usize,
    /// How long an issued passcode stays valid. Default: 600 seconds.
    pub ttl: Duration,
    /// Verification attempts before a challenge is discarded. Default: 3.
    pub max_attempts: u32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            ttl: Duration::seconds(600),
            max_attempts: 3,
        }
    }
}

impl OtpConfig {
    #[must_use]
    pub fn with_code_length(mut self, length: usize) -> Self {
        self.code_length = length;
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Settings for bearer-token issuance, independent of OTP settings.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// How long an access token stays valid. Default: 30 minutes.
    pub access_expiry: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_expiry: Duration::minutes(30),
        }
    }
}

impl TokenConfig {
    #[must_use]
    pub fn with_access_expiry(mut self, expiry: Duration) -> Self {
        self.access_expiry = expiry;
        self
    }
}

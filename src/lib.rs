//! latchkey: identity verification and authentication core.
//!
//! Three independent credential mechanisms share one identity store:
//! password login, phone-number OTP challenge/response, and bearer/session
//! tokens. A separate fixed credential pair guards the administrative
//! surface. Everything is built against narrow repository traits so the
//! embedding application chooses the storage backend (postgres, or the
//! in-memory stores for tests and single-node development).
//!
//! # Modules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`otp`] | Issue and verify single-use phone passcodes |
//! | [`actions`] | End-to-end flows (login, registration, OTP, logout) |
//! | [`resolver`] | Turn request credentials into a resolved identity |
//! | [`gate`] | Pure allow/deny decisions over resolved identities |
//! | [`jwt`] | Signed bearer tokens |
//! | [`session`] | Server-side sessions and signed cookies |
//! | [`admin`] | Fixed admin credential gate |
//! | [`repository`] | Storage traits, data types and mocks |
//! | [`postgres`] | sqlx-backed repositories (`postgres` feature) |
//! | [`api`] | axum handlers and routes (`axum` feature) |

pub mod actions;
pub mod admin;
pub mod config;
pub mod crypto;
pub mod events;
pub mod gate;
pub mod jwt;
pub mod notify;
pub mod otp;
pub mod repository;
pub mod resolver;
pub mod secret;
pub mod session;
pub mod validators;

#[cfg(feature = "axum")]
pub mod api;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::fmt;

pub use config::{AuthConfig, OtpConfig, TokenConfig};
pub use events::register_event_listeners;
pub use gate::{authorize, Denial, Predicate};
pub use repository::{
    ChallengeAttempt, ChallengeRepository, Identity, IdentityPatch, IdentityRepository,
    NewIdentity, OtpChallenge,
};
pub use resolver::{IdentityResolver, RequestCredentials, ResolveMode, ResolvedIdentity};
pub use secret::SecretString;

#[cfg(any(test, feature = "mocks"))]
pub use notify::MockNotifier;
#[cfg(any(test, feature = "mocks"))]
pub use repository::{InMemoryChallengeRepository, MockIdentityRepository};

/// Which unique identity field an operation collided on.
///
/// Carried by [`AuthError::Conflict`] so callers can point the client at the
/// exact field to correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    Email,
    Username,
    PhoneNumber,
}

impl ConflictField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::PhoneNumber => "phone_number",
        }
    }
}

/// Every failure crossing the crate boundary is one of these.
///
/// Store-specific errors, hash-library errors and token-library errors are
/// mapped before they escape; nothing internal leaks to a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Bad password or unknown login name. Deliberately does not say which.
    InvalidCredentials,
    /// Absent, expired, exhausted or mismatched OTP. Deliberately does not
    /// say which.
    OtpInvalid,
    /// A unique identity field already belongs to a different identity.
    Conflict(ConflictField),
    /// No valid credential on a request that required one.
    Unauthenticated,
    /// The resolved identity exists but is deactivated.
    Inactive,
    /// The resolved identity lacks the required privilege.
    InsufficientPrivilege,
    /// Bearer token failed signature or structural validation.
    TokenInvalid,
    /// Bearer token was valid but its expiry is in the past.
    TokenExpired,
    /// Input rejected by a validator before touching storage.
    Validation(String),
    /// Password hashing or hash parsing failed.
    PasswordHashError,
    /// The crate was constructed with unusable settings.
    ConfigurationError(String),
    /// The backing store could not be reached or errored. Transient; the
    /// caller may retry. The payload is for logs, never for clients.
    StoreUnavailable(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::OtpInvalid => write!(f, "Invalid or expired code"),
            Self::Conflict(field) => write!(f, "{} already in use", field.as_str()),
            Self::Unauthenticated => write!(f, "Not authenticated"),
            Self::Inactive => write!(f, "Inactive user"),
            Self::InsufficientPrivilege => write!(f, "Not enough permissions"),
            Self::TokenInvalid => write!(f, "Invalid token"),
            Self::TokenExpired => write!(f, "Token has expired"),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::PasswordHashError => write!(f, "Failed to process password"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
            Self::StoreUnavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// True for failures the caller may safely retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_never_leaks_detail() {
        // The two deliberately-uniform errors must not mention which
        // sub-case occurred.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
        assert_eq!(AuthError::OtpInvalid.to_string(), "Invalid or expired code");
    }

    #[test]
    fn test_conflict_names_the_field() {
        assert_eq!(
            AuthError::Conflict(ConflictField::Email).to_string(),
            "email already in use"
        );
        assert_eq!(
            AuthError::Conflict(ConflictField::PhoneNumber).to_string(),
            "phone_number already in use"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(AuthError::StoreUnavailable("timeout".to_owned()).is_transient());
        assert!(!AuthError::InvalidCredentials.is_transient());
        assert!(!AuthError::OtpInvalid.is_transient());
    }
}

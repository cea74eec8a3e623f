//! The administrative credential gate.
//!
//! A fixed operator credential pair, deliberately outside the identity
//! store: an operator credential is a different trust boundary from a user
//! with an `is_admin` flag. There is no `Default`; the pair must be
//! supplied explicitly at startup.

use chrono::Utc;

use crate::events::{self, AuthEvent};
use crate::SecretString;

/// The out-of-band admin credential pair.
pub struct AdminCredentials {
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks a submitted pair against the configured one.
    ///
    /// Both fields are compared in constant time, and both comparisons
    /// always run. Failures are dispatched to the audit event stream;
    /// callers must render the same generic invalid-credentials message as
    /// the user login surface, so the admin endpoint is not
    /// distinguishable to a probe.
    pub async fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok =
            crate::secret::constant_time_eq(self.username.as_bytes(), username.as_bytes());
        let password_ok = self.password.constant_time_eq(password);

        if username_ok && password_ok {
            events::dispatch(AuthEvent::AdminLoginSucceeded {
                username: username.to_owned(),
                at: Utc::now(),
            })
            .await;
            true
        } else {
            log::warn!(
                target: "latchkey_admin",
                "msg=\"admin credential check failed\" username={username}"
            );
            events::dispatch(AuthEvent::AdminLoginFailed {
                username: username.to_owned(),
                at: Utc::now(),
            })
            .await;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> AdminCredentials {
        AdminCredentials::new("admin", "operator-password-0123456789")
    }

    #[tokio::test]
    async fn test_correct_pair() {
        assert!(credentials().verify("admin", "operator-password-0123456789").await);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        assert!(!credentials().verify("admin", "wrong").await);
    }

    #[tokio::test]
    async fn test_wrong_username() {
        assert!(!credentials().verify("root", "operator-password-0123456789").await);
    }

    #[tokio::test]
    async fn test_both_wrong() {
        assert!(!credentials().verify("root", "wrong").await);
        assert!(!credentials().verify("", "").await);
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("admin"));
        assert!(!debug.contains("operator-password"));
    }
}

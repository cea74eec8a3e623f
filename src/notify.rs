//! Outbound notification collaborator.
//!
//! SMS and email delivery are someone else's job; the actions hand off and
//! move on. Delivery failures are logged, never surfaced to the caller of
//! an action.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{AuthError, SecretString};

/// Delivery channel for passcodes and verification emails.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send_otp(&self, phone_number: &str, code: &SecretString) -> Result<(), AuthError>;

    async fn send_verification_email(&self, email: &str, username: &str)
        -> Result<(), AuthError>;
}

/// Spawns `send_otp` without awaiting it; errors land in the log.
pub(crate) fn send_otp_detached(notifier: Arc<dyn Notifier>, phone_number: String, code: SecretString) {
    tokio::spawn(async move {
        if let Err(err) = notifier.send_otp(&phone_number, &code).await {
            log::warn!(
                target: "latchkey_notify",
                "msg=\"otp delivery failed\" phone_number={phone_number} error={err}"
            );
        }
    });
}

/// Spawns `send_verification_email` without awaiting it; errors land in
/// the log.
pub(crate) fn send_verification_email_detached(
    notifier: Arc<dyn Notifier>,
    email: String,
    username: String,
) {
    tokio::spawn(async move {
        if let Err(err) = notifier.send_verification_email(&email, &username).await {
            log::warn!(
                target: "latchkey_notify",
                "msg=\"verification email delivery failed\" email={email} error={err}"
            );
        }
    });
}

/// Logs deliveries instead of sending them. Development stand-in.
///
/// The passcode is a [`SecretString`], so even this logger prints
/// `[REDACTED]` where the code would be.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_otp(&self, phone_number: &str, code: &SecretString) -> Result<(), AuthError> {
        log::info!(
            target: "latchkey_notify",
            "msg=\"would send sms\" phone_number={phone_number} code={code}"
        );
        Ok(())
    }

    async fn send_verification_email(
        &self,
        email: &str,
        username: &str,
    ) -> Result<(), AuthError> {
        log::info!(
            target: "latchkey_notify",
            "msg=\"would send verification email\" email={email} username={username}"
        );
        Ok(())
    }
}

/// Records every delivery for assertions.
#[cfg(any(test, feature = "mocks"))]
#[derive(Clone, Default)]
pub struct MockNotifier {
    pub sent_otps: Arc<std::sync::Mutex<Vec<(String, SecretString)>>>,
    pub sent_emails: Arc<std::sync::Mutex<Vec<(String, String)>>>,
}

#[cfg(any(test, feature = "mocks"))]
impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent passcode sent to `phone_number`, if any.
    #[allow(clippy::unwrap_used)]
    pub fn last_otp_for(&self, phone_number: &str) -> Option<SecretString> {
        self.sent_otps
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(phone, _)| phone == phone_number)
            .map(|(_, code)| code.clone())
    }
}

#[cfg(any(test, feature = "mocks"))]
#[async_trait]
impl Notifier for MockNotifier {
    #[allow(clippy::unwrap_used)]
    async fn send_otp(&self, phone_number: &str, code: &SecretString) -> Result<(), AuthError> {
        self.sent_otps
            .lock()
            .unwrap()
            .push((phone_number.to_owned(), code.clone()));
        Ok(())
    }

    #[allow(clippy::unwrap_used)]
    async fn send_verification_email(
        &self,
        email: &str,
        username: &str,
    ) -> Result<(), AuthError> {
        self.sent_emails
            .lock()
            .unwrap()
            .push((email.to_owned(), username.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_is_infallible() {
        let notifier = LogNotifier::new();
        assert!(notifier
            .send_otp("5551234567", &SecretString::new("123456"))
            .await
            .is_ok());
        assert!(notifier
            .send_verification_email("a@example.com", "alice")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_mock_notifier_records() {
        let notifier = MockNotifier::new();
        notifier
            .send_otp("5551234567", &SecretString::new("111111"))
            .await
            .unwrap();
        notifier
            .send_otp("5551234567", &SecretString::new("222222"))
            .await
            .unwrap();

        // most recent wins
        let code = notifier.last_otp_for("5551234567").unwrap();
        assert_eq!(code.expose(), "222222");
        assert!(notifier.last_otp_for("5550000000").is_none());
    }
}

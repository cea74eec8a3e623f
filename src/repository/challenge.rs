use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthError, SecretString};

/// A single-use passcode bound to one phone number.
///
/// There is at most one challenge per phone number; issuing another
/// replaces it and the old passcode is dead from that point on.
#[derive(Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub phone_number: String,
    pub code: SecretString,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
}

impl OtpChallenge {
    pub fn new(phone_number: &str, code: SecretString, issued_at: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            phone_number: phone_number.to_owned(),
            code,
            issued_at,
            expires_at: issued_at + ttl,
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Live = present, unexpired, and attempts remaining.
    pub fn is_live(&self, now: DateTime<Utc>, max_attempts: u32) -> bool {
        !self.is_expired(now) && self.attempts < max_attempts
    }
}

impl std::fmt::Debug for OtpChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpChallenge")
            .field("phone_number", &self.phone_number)
            .field("code", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("attempts", &self.attempts)
            .finish()
    }
}

/// Outcome of one verification attempt.
///
/// Deliberately two-valued: which of absent/expired/exhausted/mismatch
/// caused a rejection never leaves the store, so callers cannot leak it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeAttempt {
    /// Exact match against a live challenge. The challenge is gone.
    Verified,
    /// Anything else. Attempts against a live challenge were counted.
    Rejected,
}

impl ChallengeAttempt {
    pub fn is_verified(self) -> bool {
        matches!(self, Self::Verified)
    }
}

/// Keyed store of live challenges, phone number → challenge.
///
/// This store is the single source of truth for passcodes. Implementations
/// must make [`verify_and_consume`](Self::verify_and_consume) linearizable
/// per phone number: two concurrent calls may not both observe attempts
/// below the cap, and at most one may return
/// [`ChallengeAttempt::Verified`] for a given challenge. A `replace` racing
/// a verify must land entirely before or entirely after it.
#[async_trait]
pub trait ChallengeRepository {
    /// Stores `challenge`, atomically displacing any existing challenge for
    /// the same phone number.
    async fn replace(&self, challenge: OtpChallenge) -> Result<(), AuthError>;

    async fn find(&self, phone_number: &str) -> Result<Option<OtpChallenge>, AuthError>;

    /// One verification attempt, as a single atomic step:
    ///
    /// - no challenge, expired, or attempts already at `max_attempts` →
    ///   `Rejected` (dead entries are removed on the way out);
    /// - otherwise the attempt counter increments, then the candidate is
    ///   compared in constant time: a match consumes the challenge and
    ///   returns `Verified`; a mismatch returns `Rejected`, and if the
    ///   increment reached `max_attempts` the challenge is removed.
    async fn verify_and_consume(
        &self,
        phone_number: &str,
        candidate: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<ChallengeAttempt, AuthError>;

    async fn remove(&self, phone_number: &str) -> Result<(), AuthError>;

    /// Deletes expired challenges, returning how many went.
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_liveness() {
        let now = Utc::now();
        let challenge = OtpChallenge::new("5551234567", SecretString::new("123456"), now, Duration::seconds(600));

        assert!(challenge.is_live(now, 3));
        assert!(!challenge.is_live(now + Duration::seconds(601), 3));
        assert!(challenge.is_live(now + Duration::seconds(600), 3));

        let mut exhausted = challenge.clone();
        exhausted.attempts = 3;
        assert!(!exhausted.is_live(now, 3));
    }

    #[test]
    fn test_debug_redacts_code() {
        let challenge = OtpChallenge::new(
            "5551234567",
            SecretString::new("123456"),
            Utc::now(),
            Duration::seconds(600),
        );
        let debug = format!("{challenge:?}");
        assert!(!debug.contains("123456"));
        assert!(debug.contains("5551234567"));
    }
}

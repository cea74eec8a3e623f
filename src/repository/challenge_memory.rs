//! In-memory challenge store.
//!
//! Suitable for tests and single-instance deployments; a multi-instance
//! deployment needs the durable postgres store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::challenge::{ChallengeAttempt, ChallengeRepository, OtpChallenge};
use crate::AuthError;

/// Challenges in a `HashMap` behind one mutex.
///
/// Holding the lock across the whole check-increment-consume sequence is
/// what makes `verify_and_consume` linearizable here.
#[derive(Clone, Default)]
pub struct InMemoryChallengeRepository {
    challenges: Arc<Mutex<HashMap<String, OtpChallenge>>>,
}

impl InMemoryChallengeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.challenges.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, OtpChallenge>>, AuthError> {
        self.challenges
            .lock()
            .map_err(|_| AuthError::StoreUnavailable("challenge lock poisoned".to_owned()))
    }
}

#[async_trait]
impl ChallengeRepository for InMemoryChallengeRepository {
    async fn replace(&self, challenge: OtpChallenge) -> Result<(), AuthError> {
        self.lock()?
            .insert(challenge.phone_number.clone(), challenge);
        Ok(())
    }

    async fn find(&self, phone_number: &str) -> Result<Option<OtpChallenge>, AuthError> {
        Ok(self.lock()?.get(phone_number).cloned())
    }

    async fn verify_and_consume(
        &self,
        phone_number: &str,
        candidate: &str,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> Result<ChallengeAttempt, AuthError> {
        let mut challenges = self.lock()?;

        let Some(challenge) = challenges.get_mut(phone_number) else {
            return Ok(ChallengeAttempt::Rejected);
        };

        if challenge.is_expired(now) || challenge.attempts >= max_attempts {
            challenges.remove(phone_number);
            return Ok(ChallengeAttempt::Rejected);
        }

        challenge.attempts += 1;

        if challenge.code.constant_time_eq(candidate) {
            challenges.remove(phone_number);
            return Ok(ChallengeAttempt::Verified);
        }

        if challenge.attempts >= max_attempts {
            challenges.remove(phone_number);
        }

        Ok(ChallengeAttempt::Rejected)
    }

    async fn remove(&self, phone_number: &str) -> Result<(), AuthError> {
        self.lock()?.remove(phone_number);
        Ok(())
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut challenges = self.lock()?;
        let before = challenges.len();
        challenges.retain(|_, c| !c.is_expired(now));
        let pruned = before.saturating_sub(challenges.len());
        Ok(pruned as u64)
    }
}

//! OTP challenge manager.
//!
//! Owns the lifecycle of phone passcodes: issue (with placeholder-identity
//! creation for unseen phone numbers) and verify (fail-closed, single-use).
//! Expiry, attempt cap and code length come from [`OtpConfig`].

use chrono::Utc;

use crate::config::OtpConfig;
use crate::crypto::{self, Argon2Hasher, PasswordHasher};
use crate::repository::{
    ChallengeRepository, Identity, IdentityRepository, NewIdentity, OtpChallenge,
};
use crate::{AuthError, SecretString};

/// Issues and verifies phone OTP challenges.
///
/// Cheap to construct per call site; the repositories carry the state.
pub struct OtpManager<C, I>
where
    C: ChallengeRepository,
    I: IdentityRepository,
{
    challenges: C,
    identities: I,
    config: OtpConfig,
}

impl<C: ChallengeRepository, I: IdentityRepository> OtpManager<C, I> {
    pub fn new(challenges: C, identities: I, config: OtpConfig) -> Self {
        Self {
            challenges,
            identities,
            config,
        }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// Issues a fresh passcode for `phone_number`.
    ///
    /// Replaces any live challenge for that phone; the previous code is
    /// dead the moment this returns. If no identity carries the phone
    /// number yet, a placeholder identity is created first.
    ///
    /// The passcode goes only to the caller, for handoff to the delivery
    /// channel; there is no per-phone issue throttle beyond the attempt
    /// cap on each challenge.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "otp_issue", skip_all, err))]
    pub async fn issue(&self, phone_number: &str) -> Result<SecretString, AuthError> {
        if self.identities.find_by_phone(phone_number).await?.is_none() {
            let unguessable = crypto::generate_token(32);
            let hashed = Argon2Hasher::default().hash(&unguessable)?;
            self.identities
                .create(NewIdentity::placeholder(phone_number, hashed))
                .await?;
            log::info!(
                target: "latchkey_otp",
                "msg=\"placeholder identity created\" phone_number={phone_number}"
            );
        }

        let code = crypto::generate_numeric_code(self.config.code_length);
        let challenge = OtpChallenge::new(phone_number, code.clone(), Utc::now(), self.config.ttl);
        self.challenges.replace(challenge).await?;

        log::info!(
            target: "latchkey_otp",
            "msg=\"challenge issued\" phone_number={phone_number}"
        );

        Ok(code)
    }

    /// Verifies a candidate passcode, consuming the challenge on success.
    ///
    /// Fails closed with [`AuthError::OtpInvalid`] on every rejection:
    /// absent, expired, exhausted and mismatched all look alike to the
    /// caller. Returns the identity bound to the phone number on success.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "otp_verify", skip_all, err))]
    pub async fn verify(
        &self,
        phone_number: &str,
        candidate: &str,
    ) -> Result<Identity, AuthError> {
        let attempt = self
            .challenges
            .verify_and_consume(phone_number, candidate, Utc::now(), self.config.max_attempts)
            .await?;

        if !attempt.is_verified() {
            log::info!(
                target: "latchkey_otp",
                "msg=\"challenge rejected\" phone_number={phone_number}"
            );
            return Err(AuthError::OtpInvalid);
        }

        // The challenge existed, so the identity it was issued against must
        // too; treat its absence as a store fault, not a caller error.
        let identity = self
            .identities
            .find_by_phone(phone_number)
            .await?
            .ok_or_else(|| {
                AuthError::StoreUnavailable(format!(
                    "no identity for verified phone {phone_number}"
                ))
            })?;

        log::info!(
            target: "latchkey_otp",
            "msg=\"challenge verified\" phone_number={phone_number} identity_id={}",
            identity.id
        );

        Ok(identity)
    }
}

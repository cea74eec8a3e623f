use chrono::Utc;

use crate::events::{self, AuthEvent};
use crate::jwt::JwtService;
use crate::otp::OtpManager;
use crate::repository::{ChallengeRepository, Identity, IdentityRepository};
use crate::validators::{normalize_phone, validate_otp_format};
use crate::AuthError;

/// Successful challenge verification.
#[derive(Debug, Clone)]
pub struct OtpVerification {
    pub identity: Identity,
    /// True when the identity is still a placeholder; the caller should
    /// drive registration completion next.
    pub is_new_user: bool,
    /// Access token, minted for returning identities only. New users get
    /// theirs from registration completion.
    pub access_token: Option<String>,
}

/// Submits a candidate passcode against a live challenge.
pub struct VerifyOtpAction<C, I>
where
    C: ChallengeRepository,
    I: IdentityRepository,
{
    otp: OtpManager<C, I>,
    jwt: JwtService,
}

impl<C: ChallengeRepository, I: IdentityRepository> VerifyOtpAction<C, I> {
    pub fn new(otp: OtpManager<C, I>, jwt: JwtService) -> Self {
        Self { otp, jwt }
    }

    /// Verifies `candidate` for `raw_phone`.
    ///
    /// Every challenge failure (absent, expired, exhausted, wrong code)
    /// comes back as the same [`AuthError::OtpInvalid`]; only input-shape
    /// problems (non-numeric, wrong length) are reported as validation
    /// errors, since they cannot leak challenge state.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "verify_otp", skip_all, err))]
    pub async fn execute(
        &self,
        raw_phone: &str,
        candidate: &str,
    ) -> Result<OtpVerification, AuthError> {
        let phone_number = normalize_phone(raw_phone)?;
        validate_otp_format(candidate, self.otp.config().code_length)?;

        let identity = match self.otp.verify(&phone_number, candidate).await {
            Ok(identity) => identity,
            Err(err) => {
                if err == AuthError::OtpInvalid {
                    events::dispatch(AuthEvent::OtpRejected {
                        phone_number,
                        at: Utc::now(),
                    })
                    .await;
                }
                return Err(err);
            }
        };

        let is_new_user = identity.is_placeholder();
        let access_token = if is_new_user {
            None
        } else {
            Some(self.jwt.issue(identity.id)?)
        };

        events::dispatch(AuthEvent::OtpVerified {
            identity_id: identity.id,
            phone_number,
            is_new_user,
            at: Utc::now(),
        })
        .await;

        Ok(OtpVerification {
            identity,
            is_new_user,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OtpConfig;
    use crate::jwt::JwtConfig;
    use crate::repository::{InMemoryChallengeRepository, MockIdentityRepository};

    fn jwt() -> JwtService {
        JwtService::new(JwtConfig::new("test-secret-32-bytes-long-key-01").unwrap())
    }

    fn setup() -> (
        OtpManager<InMemoryChallengeRepository, MockIdentityRepository>,
        VerifyOtpAction<InMemoryChallengeRepository, MockIdentityRepository>,
        MockIdentityRepository,
    ) {
        let challenges = InMemoryChallengeRepository::new();
        let identities = MockIdentityRepository::new();
        let issue_manager =
            OtpManager::new(challenges.clone(), identities.clone(), OtpConfig::default());
        let verify_manager =
            OtpManager::new(challenges, identities.clone(), OtpConfig::default());
        (
            issue_manager,
            VerifyOtpAction::new(verify_manager, jwt()),
            identities,
        )
    }

    #[tokio::test]
    async fn test_new_user_flow() {
        let (manager, action, _) = setup();
        let code = manager.issue("5551234567").await.unwrap();

        let verification = action.execute("5551234567", code.expose()).await.unwrap();
        assert!(verification.is_new_user);
        assert!(verification.access_token.is_none());
        assert!(verification.identity.is_placeholder());
    }

    #[tokio::test]
    async fn test_returning_user_gets_token() {
        let (manager, action, identities) = setup();

        // a completed identity already owns the phone number
        let mut identity = crate::repository::Identity::mock(0, "alice");
        identity.phone_number = Some("5551234567".to_owned());
        identity.phone_verified = true;
        let identity = identities.seed(identity);

        let code = manager.issue("5551234567").await.unwrap();
        let verification = action.execute("5551234567", code.expose()).await.unwrap();

        assert!(!verification.is_new_user);
        assert_eq!(verification.identity.id, identity.id);
        let token = verification.access_token.unwrap();
        assert_eq!(jwt().verify(&token).unwrap(), identity.id);
    }

    #[tokio::test]
    async fn test_wrong_code_is_uniform() {
        let (manager, action, _) = setup();
        manager.issue("5551234567").await.unwrap();

        let err = action.execute("5551234567", "000000").await.unwrap_err();
        assert_eq!(err, AuthError::OtpInvalid);
    }

    #[tokio::test]
    async fn test_no_challenge_is_uniform() {
        let (_, action, _) = setup();
        let err = action.execute("5559999999", "123456").await.unwrap_err();
        assert_eq!(err, AuthError::OtpInvalid);
    }

    #[tokio::test]
    async fn test_shape_errors_are_validation() {
        let (_, action, _) = setup();
        let err = action.execute("5551234567", "12ab56").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_phone_normalization_matches_challenge() {
        let (manager, action, _) = setup();
        let code = manager.issue("5551234567").await.unwrap();

        // formatted input reaches the same challenge
        let verification = action
            .execute("(555) 123-4567", code.expose())
            .await
            .unwrap();
        assert!(verification.is_new_user);
    }
}

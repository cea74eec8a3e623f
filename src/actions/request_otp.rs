use std::sync::Arc;

use chrono::Utc;

use crate::events::{self, AuthEvent};
use crate::notify::{self, Notifier};
use crate::otp::OtpManager;
use crate::repository::{ChallengeRepository, IdentityRepository};
use crate::validators::normalize_phone;
use crate::AuthError;

/// Starts (or restarts) an OTP challenge for a phone number.
pub struct RequestOtpAction<C, I>
where
    C: ChallengeRepository,
    I: IdentityRepository,
{
    otp: OtpManager<C, I>,
    notifier: Arc<dyn Notifier>,
}

impl<C: ChallengeRepository, I: IdentityRepository> RequestOtpAction<C, I> {
    pub fn new(otp: OtpManager<C, I>, notifier: Arc<dyn Notifier>) -> Self {
        Self { otp, notifier }
    }

    /// Issues a passcode for `raw_phone` and hands it to the delivery
    /// channel.
    ///
    /// Succeeds whether or not an identity already carries the number (a
    /// placeholder is created when needed), so the response does not
    /// reveal which phone numbers are registered. The passcode itself
    /// never appears in the return value.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "request_otp", skip_all, err))]
    pub async fn execute(&self, raw_phone: &str) -> Result<(), AuthError> {
        let phone_number = normalize_phone(raw_phone)?;

        let code = self.otp.issue(&phone_number).await?;

        notify::send_otp_detached(Arc::clone(&self.notifier), phone_number.clone(), code);

        events::dispatch(AuthEvent::OtpIssued {
            phone_number,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}

use chrono::Utc;

use crate::events::{self, AuthEvent};
use crate::session::SessionRepository;
use crate::AuthError;

/// Destroys a server-side session.
pub struct LogoutAction<S: SessionRepository> {
    sessions: S,
}

impl<S: SessionRepository> LogoutAction<S> {
    pub fn new(sessions: S) -> Self {
        Self { sessions }
    }

    /// Idempotent: logging out an unknown or already-destroyed session is
    /// still a success.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all, err))]
    pub async fn execute(&self, session_id: &str) -> Result<(), AuthError> {
        let session = self.sessions.find(session_id).await?;

        self.sessions.destroy(session_id).await?;

        if let Some(session) = session {
            events::dispatch(AuthEvent::LoggedOut {
                identity_id: session.data.identity_id,
                at: Utc::now(),
            })
            .await;
        }

        Ok(())
    }
}

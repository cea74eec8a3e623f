use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::admin::AdminCredentials;
use crate::config::AuthConfig;
use crate::jwt::JwtService;
use crate::notify::Notifier;
use crate::repository::{ChallengeRepository, IdentityRepository};
use crate::session::SessionRepository;

/// Shared state behind every handler.
pub struct AppState<I, C, S> {
    pub identities: I,
    pub challenges: C,
    pub sessions: S,
    pub jwt: JwtService,
    pub config: AuthConfig,
    pub notifier: Arc<dyn Notifier>,
    /// Present only when the admin surface is mounted.
    pub admin: Option<Arc<AdminCredentials>>,
}

impl<I: Clone, C: Clone, S: Clone> Clone for AppState<I, C, S> {
    fn clone(&self) -> Self {
        Self {
            identities: self.identities.clone(),
            challenges: self.challenges.clone(),
            sessions: self.sessions.clone(),
            jwt: self.jwt.clone(),
            config: self.config.clone(),
            notifier: Arc::clone(&self.notifier),
            admin: self.admin.clone(),
        }
    }
}

/// The authentication endpoints: password login/registration, the OTP
/// challenge pair, registration completion and logout.
pub fn auth_routes<I, C, S>() -> Router<AppState<I, C, S>>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(handlers::login::<I, C, S>))
        .route("/register", post(handlers::register::<I, C, S>))
        .route("/logout", post(handlers::logout::<I, C, S>))
        .route("/request-otp", post(handlers::request_otp::<I, C, S>))
        .route("/verify-otp", post(handlers::verify_otp::<I, C, S>))
        .route(
            "/complete-registration",
            post(handlers::complete_registration::<I, C, S>),
        )
}

/// Routes about the authenticated identity itself.
pub fn identity_routes<I, C, S>() -> Router<AppState<I, C, S>>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    Router::new().route("/me", get(handlers::me::<I, C, S>))
}

/// The admin credential gate. Mount only when `AppState::admin` is set;
/// with no credentials configured every login attempt is refused.
pub fn admin_routes<I, C, S>() -> Router<AppState<I, C, S>>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(handlers::admin_login::<I, C, S>))
        .route("/logout", post(handlers::admin_logout::<I, C, S>))
}

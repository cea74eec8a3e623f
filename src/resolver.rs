//! Per-request identity resolution.
//!
//! One resolver replaces the layered "current user" helpers that tend to
//! accrete around cookie and bearer auth. Priority is fixed: a signed
//! session cookie wins over a bearer token, and the first credential
//! *present* decides: a request carrying an invalid cookie is not
//! re-tried against its bearer header.

use crate::jwt::JwtService;
use crate::repository::IdentityRepository;
use crate::session::{verify_signed_cookie, SessionConfig, SessionRepository};
use crate::AuthError;

/// Credentials lifted off an inbound request by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials {
    /// Raw value of the session cookie, if the request carried one.
    pub session_cookie: Option<String>,
    /// Token from an `Authorization: Bearer` header, if present.
    pub bearer_token: Option<String>,
}

impl RequestCredentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_cookie(value: impl Into<String>) -> Self {
        Self {
            session_cookie: Some(value.into()),
            bearer_token: None,
        }
    }

    pub fn from_bearer(token: impl Into<String>) -> Self {
        Self {
            session_cookie: None,
            bearer_token: Some(token.into()),
        }
    }
}

/// The per-request outcome of authentication. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedIdentity {
    Anonymous,
    Authenticated {
        id: i64,
        is_active: bool,
        is_admin: bool,
    },
}

impl ResolvedIdentity {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn identity_id(&self) -> Option<i64> {
        match self {
            Self::Authenticated { id, .. } => Some(*id),
            Self::Anonymous => None,
        }
    }
}

/// Whether a failed resolution is an error or just `Anonymous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Any missing or invalid credential surfaces `Unauthenticated`.
    Required,
    /// Credential failures collapse to `Anonymous`. Store failures still
    /// propagate; a flaky backend must not demote callers to anonymous.
    Optional,
}

/// Resolves request credentials to an identity.
pub struct IdentityResolver<S, I>
where
    S: SessionRepository,
    I: IdentityRepository,
{
    sessions: S,
    identities: I,
    jwt: JwtService,
    session_config: SessionConfig,
}

impl<S: SessionRepository, I: IdentityRepository> IdentityResolver<S, I> {
    pub fn new(sessions: S, identities: I, jwt: JwtService, session_config: SessionConfig) -> Self {
        Self {
            sessions,
            identities,
            jwt,
            session_config,
        }
    }

    /// Resolves `credentials` under `mode`.
    ///
    /// `Ok(Anonymous)` only ever comes out of `Optional` mode.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "resolve", skip_all))]
    pub async fn resolve(
        &self,
        credentials: &RequestCredentials,
        mode: ResolveMode,
    ) -> Result<ResolvedIdentity, AuthError> {
        let outcome = if let Some(cookie) = credentials.session_cookie.as_deref() {
            self.resolve_cookie(cookie).await
        } else if let Some(token) = credentials.bearer_token.as_deref() {
            self.resolve_bearer(token).await
        } else {
            Err(AuthError::Unauthenticated)
        };

        match (outcome, mode) {
            (Ok(resolved), _) => Ok(resolved),
            (Err(err), _) if err.is_transient() => Err(err),
            (Err(_), ResolveMode::Optional) => Ok(ResolvedIdentity::Anonymous),
            (Err(_), ResolveMode::Required) => Err(AuthError::Unauthenticated),
        }
    }

    async fn resolve_cookie(&self, cookie: &str) -> Result<ResolvedIdentity, AuthError> {
        let session_id = verify_signed_cookie(cookie, &self.session_config.secret)
            .ok_or(AuthError::Unauthenticated)?;

        let session = self
            .sessions
            .find(&session_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if session.is_expired() {
            return Err(AuthError::Unauthenticated);
        }

        self.load(session.data.identity_id).await
    }

    async fn resolve_bearer(&self, token: &str) -> Result<ResolvedIdentity, AuthError> {
        let identity_id = self.jwt.verify(token)?;
        self.load(identity_id).await
    }

    async fn load(&self, identity_id: i64) -> Result<ResolvedIdentity, AuthError> {
        let identity = self
            .identities
            .find_by_id(identity_id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(ResolvedIdentity::Authenticated {
            id: identity.id,
            is_active: identity.is_active,
            is_admin: identity.is_admin,
        })
    }
}

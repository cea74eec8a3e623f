//! Request credential extraction and the authenticated-identity extractor.

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::routes::AppState;
use crate::gate::{authorize, Predicate};
use crate::repository::{ChallengeRepository, Identity, IdentityRepository};
use crate::resolver::{IdentityResolver, RequestCredentials, ResolveMode};
use crate::session::SessionRepository;
use crate::AuthError;

/// Token from an `Authorization: Bearer` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// Named cookie value from the `Cookie` header.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

pub(super) fn request_credentials(headers: &HeaderMap, cookie_name: &str) -> RequestCredentials {
    RequestCredentials {
        session_cookie: extract_cookie(headers, cookie_name),
        bearer_token: extract_bearer_token(headers),
    }
}

/// Extractor for routes that require an authenticated, active identity.
///
/// Runs the resolver in required mode (session cookie first, then bearer
/// token), gates on `IsActive`, and loads the full identity record.
#[derive(Debug, Clone)]
pub struct CurrentIdentity<I, C, S> {
    identity: Identity,
    _marker: PhantomData<(I, C, S)>,
}

impl<I, C, S> CurrentIdentity<I, C, S> {
    pub fn into_inner(self) -> Identity {
        self.identity
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl<I, C, S> FromRequestParts<AppState<I, C, S>> for CurrentIdentity<I, C, S>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<I, C, S>,
    ) -> Result<Self, Self::Rejection> {
        let credentials =
            request_credentials(&parts.headers, &state.config.session.cookie_name);

        let resolver = IdentityResolver::new(
            state.sessions.clone(),
            state.identities.clone(),
            state.jwt.clone(),
            state.config.session.clone(),
        );

        let resolved = resolver
            .resolve(&credentials, ResolveMode::Required)
            .await
            .map_err(AppError)?;

        authorize(&resolved, Predicate::IsActive).map_err(|denial| AppError(denial.into()))?;

        let identity_id = resolved
            .identity_id()
            .ok_or(AppError(AuthError::Unauthenticated))?;

        let identity = state
            .identities
            .find_by_id(identity_id)
            .await
            .map_err(AppError)?
            .ok_or(AppError(AuthError::Unauthenticated))?;

        Ok(CurrentIdentity {
            identity,
            _marker: PhantomData,
        })
    }
}

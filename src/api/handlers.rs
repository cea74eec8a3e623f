//! HTTP handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use super::error::AppError;
use super::extract::{extract_cookie, CurrentIdentity};
use super::routes::AppState;
use super::types::{
    AuthResponse, CompleteRegistrationRequest, ErrorResponse, IdentityResponse, LoginRequest,
    MessageResponse, OtpUserData, OtpVerifyRequest, OtpVerifyResponse, PhoneNumberRequest,
    RegisterRequest,
};
use crate::actions::{
    CompleteRegistrationAction, CompleteRegistrationInput, LoginAction, LogoutAction,
    RegisterAction, RegisterInput, RequestOtpAction, VerifyOtpAction,
};
use crate::otp::OtpManager;
use crate::repository::{ChallengeRepository, IdentityRepository};
use crate::session::{
    sign_session_id, verify_signed_cookie, SessionConfig, SessionData, SessionRepository,
};
use crate::AuthError;

/// Cookie carrying the signed admin login, distinct from user sessions.
const ADMIN_COOKIE: &str = "latchkey_admin";

fn build_cookie(config: &SessionConfig, name: &str, value: &str, max_age_seconds: i64) -> String {
    let mut cookie = format!(
        "{name}={value}; Path={}; Max-Age={max_age_seconds}",
        config.cookie_path
    );
    if config.cookie_http_only {
        cookie.push_str("; HttpOnly");
    }
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    match config.cookie_same_site {
        crate::session::SameSite::Strict => cookie.push_str("; SameSite=Strict"),
        crate::session::SameSite::Lax => cookie.push_str("; SameSite=Lax"),
        crate::session::SameSite::None => cookie.push_str("; SameSite=None"),
    }
    cookie
}

fn clear_cookie(config: &SessionConfig, name: &str) -> String {
    build_cookie(config, name, "", 0)
}

/// POST /login: password login; sets the session cookie and returns an
/// access token.
pub async fn login<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let action = LoginAction::new(state.identities.clone());
    let identity = action.execute(&body.username, &body.password).await?;

    let now = Utc::now();
    let session_id = state
        .sessions
        .create(SessionData {
            identity_id: identity.id,
            username: identity.username.clone(),
            created_at: now,
            expires_at: now + state.config.session.lifetime,
        })
        .await?;
    let cookie = build_cookie(
        &state.config.session,
        &state.config.session.cookie_name,
        &sign_session_id(&session_id, &state.config.session.secret),
        state.config.session.lifetime.num_seconds(),
    );

    let access_token = state.jwt.issue(identity.id)?;
    let expires_in = state.config.tokens.access_expiry.num_seconds();

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            user: IdentityResponse::from(identity),
            access_token,
            expires_in,
        }),
    ))
}

/// POST /register: password registration.
pub async fn register<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let action = RegisterAction::new(state.identities.clone(), Arc::clone(&state.notifier));
    let identity = action
        .execute(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
            full_name: body.full_name,
            phone_number: body.phone_number,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(IdentityResponse::from(identity))))
}

/// POST /logout: destroys the session behind the cookie, if any.
pub async fn logout<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    if let Some(cookie) = extract_cookie(&headers, &state.config.session.cookie_name) {
        if let Some(session_id) = verify_signed_cookie(&cookie, &state.config.session.secret) {
            LogoutAction::new(state.sessions.clone())
                .execute(&session_id)
                .await?;
        }
    }

    let cleared = clear_cookie(&state.config.session, &state.config.session.cookie_name);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cleared)],
        Json(MessageResponse::ok("Successfully logged out")),
    ))
}

/// POST /request-otp: issues a challenge for the phone number.
///
/// The response is the same whether or not the phone number was already
/// registered, and never carries the passcode.
pub async fn request_otp<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    Json(body): Json<PhoneNumberRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let otp = OtpManager::new(
        state.challenges.clone(),
        state.identities.clone(),
        state.config.otp.clone(),
    );
    let action = RequestOtpAction::new(otp, Arc::clone(&state.notifier));
    action.execute(&body.phone_number).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse::ok("OTP sent successfully")),
    ))
}

/// POST /verify-otp: submits a candidate passcode.
pub async fn verify_otp<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    Json(body): Json<OtpVerifyRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let otp = OtpManager::new(
        state.challenges.clone(),
        state.identities.clone(),
        state.config.otp.clone(),
    );
    let action = VerifyOtpAction::new(otp, state.jwt.clone());
    let verification = action.execute(&body.phone_number, &body.otp).await?;

    let user = if verification.is_new_user {
        OtpUserData {
            id: verification.identity.id,
            phone_number: verification.identity.phone_number.clone(),
            username: None,
            email: None,
        }
    } else {
        OtpUserData {
            id: verification.identity.id,
            phone_number: verification.identity.phone_number.clone(),
            username: Some(verification.identity.username.clone()),
            email: Some(verification.identity.email.clone()),
        }
    };

    Ok((
        StatusCode::OK,
        Json(OtpVerifyResponse {
            message: "OTP verified successfully".to_owned(),
            success: true,
            is_new_user: verification.is_new_user,
            user,
            access_token: verification.access_token,
        }),
    ))
}

/// POST /complete-registration: turns a verified placeholder into a real
/// identity and returns its first access token.
pub async fn complete_registration<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    Json(body): Json<CompleteRegistrationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let action = CompleteRegistrationAction::new(
        state.identities.clone(),
        state.jwt.clone(),
        Arc::clone(&state.notifier),
    );
    let (identity, access_token) = action
        .execute(CompleteRegistrationInput {
            phone_number: body.phone_number,
            username: body.username,
            email: body.email,
            password: body.password,
            full_name: body.full_name,
        })
        .await?;

    let expires_in = state.config.tokens.access_expiry.num_seconds();
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: IdentityResponse::from(identity),
            access_token,
            expires_in,
        }),
    ))
}

/// GET /me: the authenticated identity.
pub async fn me<I, C, S>(current: CurrentIdentity<I, C, S>) -> impl IntoResponse
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    Json(IdentityResponse::from(current.into_inner()))
}

/// POST /admin/login: the fixed operator credential gate.
///
/// Failure is rendered exactly like a user login failure; nothing about
/// the response distinguishes this surface to a probe.
pub async fn admin_login<I, C, S>(
    State(state): State<AppState<I, C, S>>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let verified = match state.admin {
        Some(ref admin) => {
            admin
                .verify(&body.username, body.password.expose())
                .await
        }
        None => {
            log::warn!(
                target: "latchkey_admin",
                "msg=\"admin login attempted with no credentials configured\""
            );
            false
        }
    };

    if !verified {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::from(AuthError::InvalidCredentials)),
        )
            .into_response();
    }

    let cookie = build_cookie(
        &state.config.session,
        ADMIN_COOKIE,
        &sign_session_id(&body.username, &state.config.session.secret),
        state.config.session.lifetime.num_seconds(),
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::ok("Successfully logged in")),
    )
        .into_response()
}

/// POST /admin/logout: clears the admin cookie.
pub async fn admin_logout<I, C, S>(State(state): State<AppState<I, C, S>>) -> impl IntoResponse
where
    I: IdentityRepository + Clone + Send + Sync + 'static,
    C: ChallengeRepository + Clone + Send + Sync + 'static,
    S: SessionRepository + Clone + Send + Sync + 'static,
{
    let cleared = clear_cookie(&state.config.session, ADMIN_COOKIE);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared)],
        Json(MessageResponse::ok("Successfully logged out")),
    )
}

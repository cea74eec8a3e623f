//! Request and response bodies.

use serde::{Deserialize, Serialize};

use crate::repository::Identity;
use crate::{AuthError, SecretString};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhoneNumberRequest {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpVerifyRequest {
    pub phone_number: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRegistrationRequest {
    pub phone_number: String,
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub full_name: Option<String>,
}

/// Identity as seen by clients; no credential material.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_admin: bool,
    pub phone_verified: bool,
    pub email_verified: bool,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username,
            email: identity.email,
            phone_number: identity.phone_number,
            full_name: identity.full_name,
            is_active: identity.is_active,
            is_admin: identity.is_admin,
            phone_verified: identity.phone_verified,
            email_verified: identity.email_verified,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: IdentityResponse,
    pub access_token: String,
    /// Seconds until the access token expires.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub success: bool,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

/// What the client learns from a verified challenge.
///
/// `username`/`email` stay `None` for a new user; the placeholder values
/// are internal and never leave the crate.
#[derive(Debug, Serialize)]
pub struct OtpUserData {
    pub id: i64,
    pub phone_number: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OtpVerifyResponse {
    pub message: String,
    pub success: bool,
    pub is_new_user: bool,
    pub user: OtpUserData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        let error = match &err {
            // transient detail is for logs, not clients
            AuthError::StoreUnavailable(_) => "Service temporarily unavailable".to_owned(),
            _ => err.to_string(),
        };
        Self { error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_response_has_no_hash() {
        let identity = Identity::mock(1, "alice");
        let response = IdentityResponse::from(identity);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hash"));
    }

    #[test]
    fn test_store_error_is_masked() {
        let response =
            ErrorResponse::from(AuthError::StoreUnavailable("pg: connection refused".to_owned()));
        assert_eq!(response.error, "Service temporarily unavailable");
    }
}

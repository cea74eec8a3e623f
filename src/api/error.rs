use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::ErrorResponse;
use crate::AuthError;

/// Converts [`AuthError`] into an HTTP response.
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AuthError::StoreUnavailable(ref detail) = self.0 {
            log::error!(target: "latchkey_api", "msg=\"store unavailable\" detail={detail}");
        }

        let status = match &self.0 {
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::TokenInvalid
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::OtpInvalid
            | AuthError::Conflict(_)
            | AuthError::Validation(_)
            | AuthError::Inactive => StatusCode::BAD_REQUEST,
            AuthError::InsufficientPrivilege => StatusCode::FORBIDDEN,
            AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::PasswordHashError | AuthError::ConfigurationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

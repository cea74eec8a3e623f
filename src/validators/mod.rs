//! Input validation, applied before any storage access.

pub mod email;
pub mod password;
pub mod phone;
pub mod username;

pub use email::validate_email;
pub use password::validate_password;
pub use phone::{normalize_phone, validate_otp_format};
pub use username::validate_username;

use crate::AuthError;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordTooShort,
    PasswordTooLong,
    PhoneTooShort,
    PhoneTooLong,
    OtpNotNumeric,
    OtpWrongLength,
    UsernameTooShort,
    UsernameTooLong,
    UsernameInvalidChars,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::PasswordTooShort => write!(f, "Password must be at least 8 characters long"),
            Self::PasswordTooLong => write!(f, "Password is too long (max 128 characters)"),
            Self::PhoneTooShort => write!(f, "Phone number must have at least 10 digits"),
            Self::PhoneTooLong => write!(f, "Phone number is too long (max 15 digits)"),
            Self::OtpNotNumeric => write!(f, "Code must contain only digits"),
            Self::OtpWrongLength => write!(f, "Code has the wrong length"),
            Self::UsernameTooShort => write!(f, "Username must be at least 3 characters long"),
            Self::UsernameTooLong => write!(f, "Username is too long (max 50 characters)"),
            Self::UsernameInvalidChars => write!(
                f,
                "Username can only contain alphanumeric characters, underscores, hyphens, and dots"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

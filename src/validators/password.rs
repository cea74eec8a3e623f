use super::ValidationError;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum password length, bounding argon2 input size.
pub const MAX_PASSWORD_LENGTH: usize = 128;

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_reasonable_passwords() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("correct horse battery staple").is_ok());
    }

    #[test]
    fn test_rejects_short() {
        assert_eq!(
            validate_password("1234567").unwrap_err(),
            ValidationError::PasswordTooShort
        );
        assert_eq!(
            validate_password("").unwrap_err(),
            ValidationError::PasswordTooShort
        );
    }

    #[test]
    fn test_rejects_long() {
        assert_eq!(
            validate_password(&"x".repeat(129)).unwrap_err(),
            ValidationError::PasswordTooLong
        );
    }
}

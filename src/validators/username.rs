use super::ValidationError;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooLong);
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ValidationError::UsernameInvalidChars);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("alice.b-42_x").is_ok());
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(
            validate_username("ab").unwrap_err(),
            ValidationError::UsernameTooShort
        );
        assert_eq!(
            validate_username(&"a".repeat(51)).unwrap_err(),
            ValidationError::UsernameTooLong
        );
    }

    #[test]
    fn test_invalid_chars() {
        assert_eq!(
            validate_username("alice smith").unwrap_err(),
            ValidationError::UsernameInvalidChars
        );
        assert_eq!(
            validate_username("alice@home").unwrap_err(),
            ValidationError::UsernameInvalidChars
        );
    }
}

use super::ValidationError;

/// Minimum digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 10;
/// Maximum digits in a phone number (E.164 bound).
pub const MAX_PHONE_DIGITS: usize = 15;

/// Strips formatting (spaces, dashes, parentheses, a leading `+`) and
/// validates the remaining digit count.
///
/// The returned digit string is the canonical form used as the challenge
/// key and stored on the identity; every entry point normalizes before
/// touching storage so `555-123-4567` and `5551234567` are one phone.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::PhoneTooShort);
    }

    if digits.len() > MAX_PHONE_DIGITS {
        return Err(ValidationError::PhoneTooLong);
    }

    Ok(digits)
}

/// Checks a submitted passcode is exactly `expected_length` digits.
///
/// Shape-only check; matching against the live challenge happens in the
/// challenge store.
pub fn validate_otp_format(candidate: &str, expected_length: usize) -> Result<(), ValidationError> {
    if !candidate.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::OtpNotNumeric);
    }

    if candidate.len() != expected_length {
        return Err(ValidationError::OtpWrongLength);
    }

    Ok(())
}

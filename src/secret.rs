//! Sensitive string handling.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string that refuses to print itself.
///
/// Passwords, passcodes and signing secrets travel through the crate as
/// `SecretString` so a stray `{:?}` in a log line shows `[REDACTED]`
/// instead of the value.
///
/// ```rust
/// use latchkey::SecretString;
///
/// let code = SecretString::new("482913");
/// assert_eq!(format!("{code:?}"), "SecretString([REDACTED])");
/// assert_eq!(code.expose(), "482913");
/// ```
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The wrapped value. Call only at the point of use (hashing,
    /// comparison, handing off to a delivery channel).
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Compares against a candidate without short-circuiting on the first
    /// differing byte. Length differences still return early; both secrets
    /// compared through this crate are fixed-length.
    pub fn constant_time_eq(&self, candidate: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }
}

/// Byte-wise constant-time comparison.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl Eq for SecretString {}

// Serialization exposes the value: passcodes and tokens do get returned in
// response bodies, and that path goes through serde.
impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString(s))
    }
}

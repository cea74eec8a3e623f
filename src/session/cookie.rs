//! HMAC-SHA256 signed cookie values.
//!
//! The cookie carries `{session_id}.{hex signature}`; tampering with
//! either half invalidates it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::secret::{constant_time_eq, SecretString};

type HmacSha256 = Hmac<Sha256>;

/// Signs a session id for transport in a cookie.
pub fn sign_session_id(session_id: &str, secret: &SecretString) -> String {
    let signature = compute_hmac(session_id.as_bytes(), secret.expose().as_bytes());
    format!("{}.{}", session_id, hex::encode(signature))
}

/// Verifies a signed cookie value, returning the session id.
///
/// `None` on any malformed or tampered value.
pub fn verify_signed_cookie(cookie_value: &str, secret: &SecretString) -> Option<String> {
    let (session_id, signature_hex) = cookie_value.rsplit_once('.')?;

    let actual = hex::decode(signature_hex).ok()?;
    let expected = compute_hmac(session_id.as_bytes(), secret.expose().as_bytes());

    if constant_time_eq(&expected, &actual) {
        Some(session_id.to_owned())
    } else {
        log::warn!(
            target: "latchkey_session",
            "msg=\"session cookie signature mismatch\" cookie_prefix=\"{}...\"",
            &cookie_value.chars().take(8).collect::<String>()
        );
        None
    }
}

fn compute_hmac(message: &[u8], key: &[u8]) -> Vec<u8> {
    // HMAC-SHA256 accepts keys of any length, so new_from_slice cannot fail.
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::new("cookie-signing-secret-that-is-long-enough")
    }

    #[test]
    fn test_sign_and_verify() {
        let signed = sign_session_id("session123", &secret());
        assert_eq!(
            verify_signed_cookie(&signed, &secret()),
            Some("session123".to_owned())
        );
    }

    #[test]
    fn test_tampered_signature() {
        let tampered = format!("session123.{}", "0".repeat(64));
        assert!(verify_signed_cookie(&tampered, &secret()).is_none());
    }

    #[test]
    fn test_tampered_session_id() {
        let signed = sign_session_id("session123", &secret());
        let signature = signed.rsplit_once('.').unwrap().1;
        let tampered = format!("othersession.{signature}");
        assert!(verify_signed_cookie(&tampered, &secret()).is_none());
    }

    #[test]
    fn test_wrong_secret() {
        let signed = sign_session_id("session123", &secret());
        let other = SecretString::new("a-different-secret-also-long-enough!!");
        assert!(verify_signed_cookie(&signed, &other).is_none());
    }

    #[test]
    fn test_malformed_values() {
        assert!(verify_signed_cookie("nodot", &secret()).is_none());
        assert!(verify_signed_cookie("session.nothex", &secret()).is_none());
        assert!(verify_signed_cookie("", &secret()).is_none());
    }
}

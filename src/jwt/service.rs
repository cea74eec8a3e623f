use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{Claims, JwtConfig};
use crate::crypto::generate_token;
use crate::AuthError;

/// Length of the `jti` claim.
const JTI_LENGTH: usize = 16;

/// Encodes and verifies HS256 access tokens.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.expose().as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.expose().as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mints an access token for `identity_id`, expiring after the
    /// configured duration.
    pub fn issue(&self, identity_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity_id.to_string(),
            exp: (now + self.config.access_expiry).timestamp(),
            iat: now.timestamp(),
            jti: generate_token(JTI_LENGTH),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// Verifies signature, structure and expiry, returning the identity id.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        self.decode(token)?.identity_id()
    }

    /// Decodes and validates a token, returning its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);

        if let Some(ref iss) = self.config.issuer {
            validation.set_issuer(&[iss]);
        }

        if let Some(ref aud) = self.config.audience {
            validation.set_audience(&[aud]);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::Header;

    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig::new(secret).unwrap())
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let service = service("test-secret-32-bytes-long-key-01");
        let token = service.issue(42).unwrap();
        assert_eq!(service.verify(&token).unwrap(), 42);
    }

    #[test]
    fn test_garbage_token() {
        let service = service("test-secret-32-bytes-long-key-02");
        assert_eq!(
            service.verify("not.a.token").unwrap_err(),
            AuthError::TokenInvalid
        );
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = service("test-secret-32-bytes-long-key-03");
        let verifier = service("test-secret-32-bytes-long-key-04");

        let token = issuer.issue(42).unwrap();
        assert_eq!(verifier.verify(&token).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_expired_token() {
        let service = service("test-secret-32-bytes-long-key-05");

        let claims = Claims {
            sub: "42".to_owned(),
            exp: Utc::now().timestamp() - 3600,
            iat: Utc::now().timestamp() - 7200,
            jti: "test-jti".to_owned(),
            iss: None,
            aud: None,
        };
        let key = EncodingKey::from_secret(b"test-secret-32-bytes-long-key-05");
        let token = jsonwebtoken::encode(&Header::default(), &claims, &key).unwrap();

        assert_eq!(service.verify(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn test_issuer_audience_enforced() {
        let config = JwtConfig::new("test-secret-32-bytes-long-key-06")
            .unwrap()
            .with_issuer("latchkey")
            .with_audience("bowls-api");
        let service = JwtService::new(config);

        let token = service.issue(42).unwrap();
        let claims = service.decode(&token).unwrap();
        assert_eq!(claims.iss.as_deref(), Some("latchkey"));
        assert_eq!(claims.aud.as_deref(), Some("bowls-api"));

        // a verifier expecting a different audience must reject it
        let other = JwtService::new(
            JwtConfig::new("test-secret-32-bytes-long-key-06")
                .unwrap()
                .with_audience("other-api"),
        );
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_jti_unique() {
        let service = service("test-secret-32-bytes-long-key-07");
        let a = service.decode(&service.issue(1).unwrap()).unwrap();
        let b = service.decode(&service.issue(1).unwrap()).unwrap();
        assert_ne!(a.jti, b.jti);
    }
}

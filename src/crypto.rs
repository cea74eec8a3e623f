//! Password hashing and random code/token generation.

use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};
use password_hash::{PasswordHash, PasswordHasher as ArgonPasswordHasher, SaltString};
use rand::rngs::OsRng;
use rand::Rng;

use crate::secret::SecretString;
use crate::AuthError;

/// Length of opaque session identifiers.
pub const SESSION_ID_LENGTH: usize = 32;

/// A throwaway argon2id hash of an unguessable value. Verified against when
/// a login name does not resolve, so the unknown-user path costs the same
/// as the wrong-password path.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$wromhnsfmzMe0Rl46qUCCw$nJcJuBhnOl2UZO/S7ANT1b5JjYkcx7a9MFmpqqkXGGQ";

/// Pluggable password hashing.
///
/// The crate ships [`Argon2Hasher`]; swap in another implementation to
/// interoperate with an existing credential store.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing PHC string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is
    /// malformed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Argon2id hasher with configurable cost parameters.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Memory cost in KiB.
    memory_cost: u32,
    /// Iteration count.
    time_cost: u32,
    /// Lanes.
    parallelism: u32,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        // argon2 crate defaults
        Self {
            memory_cost: 19456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Argon2Hasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// OWASP-recommended production parameters: 64 MiB, 3 iterations,
    /// 4 lanes.
    pub fn production() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        // Parameters come from the hash itself, not from this hasher's
        // configuration, so old hashes keep verifying after a cost bump.
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Burn one argon2 verification against a fixed hash.
///
/// Called on the lookup-miss path of password login so "no such user" and
/// "wrong password" take comparable time.
pub fn dummy_verify() {
    if let Ok(parsed) = PasswordHash::new(DUMMY_HASH) {
        let _ = Argon2::default().verify_password(b"latchkey-dummy", &parsed);
    }
}

/// Generates a random numeric passcode of the given length, from the OS
/// entropy source.
pub fn generate_numeric_code(length: usize) -> SecretString {
    let mut rng = OsRng;
    let code: String = (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    SecretString::new(code)
}

/// Generates a random alphanumeric token (session ids, jti claims).
pub fn generate_token(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(rng.sample(rand::distributions::Alphanumeric)))
        .collect()
}

//! sqlx/postgres implementations of the repository traits.
//!
//! Enabled with the `postgres` feature. Run
//! [`migrations::run`](migrations::run) once at startup.

mod challenge;
mod identity;
pub mod migrations;

pub use challenge::PostgresChallengeRepository;
pub use identity::PostgresIdentityRepository;

use crate::{AuthError, ConflictField};

/// Maps a sqlx error, turning unique-constraint violations into the
/// field-specific conflict and everything else into the transient store
/// error.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => ConflictField::Email,
                Some(c) if c.contains("phone") => ConflictField::PhoneNumber,
                _ => ConflictField::Username,
            };
            return AuthError::Conflict(field);
        }
    }
    AuthError::StoreUnavailable(err.to_string())
}

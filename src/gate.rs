//! Authorization gate: pure allow/deny over a resolved identity.
//!
//! No I/O happens here; call sites compose predicates as they need
//! ("active AND (self OR admin)" and the like).

use crate::resolver::ResolvedIdentity;
use crate::AuthError;

/// Coarse-grained checks a call site can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    IsActive,
    /// Implies the active check: a deactivated admin is denied `Inactive`
    /// before privilege is even considered.
    IsAdmin,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    Unauthenticated,
    Inactive,
    InsufficientPrivilege,
}

impl From<Denial> for AuthError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::Unauthenticated => AuthError::Unauthenticated,
            Denial::Inactive => AuthError::Inactive,
            Denial::InsufficientPrivilege => AuthError::InsufficientPrivilege,
        }
    }
}

/// Evaluates `predicate` against `resolved`.
pub fn authorize(resolved: &ResolvedIdentity, predicate: Predicate) -> Result<(), Denial> {
    let (is_active, is_admin) = match resolved {
        ResolvedIdentity::Anonymous => return Err(Denial::Unauthenticated),
        ResolvedIdentity::Authenticated {
            is_active, is_admin, ..
        } => (*is_active, *is_admin),
    };

    match predicate {
        Predicate::IsActive => {
            if is_active {
                Ok(())
            } else {
                Err(Denial::Inactive)
            }
        }
        Predicate::IsAdmin => {
            if !is_active {
                Err(Denial::Inactive)
            } else if is_admin {
                Ok(())
            } else {
                Err(Denial::InsufficientPrivilege)
            }
        }
    }
}

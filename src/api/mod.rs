//! HTTP surface for the authentication core, built on axum.
//!
//! The embedding application owns the router; these handlers cover the
//! endpoints the core defines: password login/registration, the OTP
//! challenge pair, registration completion, logout, the current-identity
//! probe, and the admin credential gate.

mod error;
mod extract;
mod handlers;
mod routes;
mod types;

pub use error::AppError;
pub use extract::{extract_bearer_token, extract_cookie, CurrentIdentity};
pub use routes::{admin_routes, auth_routes, identity_routes, AppState};
pub use types::*;

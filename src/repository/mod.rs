//! Storage traits and data types.
//!
//! Implement these traits to plug in your own backend; the crate ships
//! sqlx/postgres implementations behind the `postgres` feature and
//! in-memory implementations behind `mocks` (always available to unit
//! tests).
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`IdentityRepository`] | Identity lookup, creation and partial update |
//! | [`ChallengeRepository`] | Live OTP challenges, one per phone number |
//!
//! [`ChallengeRepository::verify_and_consume`] is the one operation with a
//! hard atomicity contract; see its docs.

mod challenge;
mod identity;

#[cfg(any(test, feature = "mocks"))]
mod challenge_memory;
#[cfg(any(test, feature = "mocks"))]
mod identity_mock;

pub use challenge::{ChallengeAttempt, ChallengeRepository, OtpChallenge};
pub use identity::{Identity, IdentityPatch, IdentityRepository, NewIdentity};

#[cfg(any(test, feature = "mocks"))]
pub use challenge_memory::InMemoryChallengeRepository;
#[cfg(any(test, feature = "mocks"))]
pub use identity_mock::MockIdentityRepository;

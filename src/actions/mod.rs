//! End-to-end authentication flows.
//!
//! Each action is a small struct generic over the repositories it needs,
//! so unit tests run against the in-memory mocks and production runs
//! against postgres.

pub mod complete_registration;
pub mod login;
pub mod logout;
pub mod register;
pub mod request_otp;
pub mod verify_otp;

pub use complete_registration::{CompleteRegistrationAction, CompleteRegistrationInput};
pub use login::LoginAction;
pub use logout::LogoutAction;
pub use register::{RegisterAction, RegisterInput};
pub use request_otp::RequestOtpAction;
pub use verify_otp::{OtpVerification, VerifyOtpAction};

use chrono::{DateTime, Utc};

/// Events emitted by the authentication flows.
///
/// Passcodes never appear in events; phone numbers and usernames do, the
/// same as the rest of the log surface.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    // identity lifecycle
    Registered {
        identity_id: i64,
        username: String,
        at: DateTime<Utc>,
    },
    RegistrationCompleted {
        identity_id: i64,
        username: String,
        at: DateTime<Utc>,
    },

    // password authentication
    LoginSucceeded {
        identity_id: i64,
        username: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        login: String,
        at: DateTime<Utc>,
    },
    LoggedOut {
        identity_id: i64,
        at: DateTime<Utc>,
    },

    // otp challenges
    OtpIssued {
        phone_number: String,
        at: DateTime<Utc>,
    },
    OtpVerified {
        identity_id: i64,
        phone_number: String,
        is_new_user: bool,
        at: DateTime<Utc>,
    },
    OtpRejected {
        phone_number: String,
        at: DateTime<Utc>,
    },

    // verification flags
    PhoneVerified {
        identity_id: i64,
        at: DateTime<Utc>,
    },
    VerificationEmailSent {
        identity_id: i64,
        at: DateTime<Utc>,
    },

    // admin credential gate (the audit trail the admin surface relies on)
    AdminLoginSucceeded {
        username: String,
        at: DateTime<Utc>,
    },
    AdminLoginFailed {
        username: String,
        at: DateTime<Utc>,
    },
}

impl AuthEvent {
    /// Dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "identity.registered",
            Self::RegistrationCompleted { .. } => "identity.registration_completed",
            Self::LoginSucceeded { .. } => "auth.login.succeeded",
            Self::LoginFailed { .. } => "auth.login.failed",
            Self::LoggedOut { .. } => "auth.logged_out",
            Self::OtpIssued { .. } => "otp.issued",
            Self::OtpVerified { .. } => "otp.verified",
            Self::OtpRejected { .. } => "otp.rejected",
            Self::PhoneVerified { .. } => "identity.phone_verified",
            Self::VerificationEmailSent { .. } => "identity.verification_email_sent",
            Self::AdminLoginSucceeded { .. } => "admin.login.succeeded",
            Self::AdminLoginFailed { .. } => "admin.login.failed",
        }
    }

    /// When the event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Registered { at, .. }
            | Self::RegistrationCompleted { at, .. }
            | Self::LoginSucceeded { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::LoggedOut { at, .. }
            | Self::OtpIssued { at, .. }
            | Self::OtpVerified { at, .. }
            | Self::OtpRejected { at, .. }
            | Self::PhoneVerified { at, .. }
            | Self::VerificationEmailSent { at, .. }
            | Self::AdminLoginSucceeded { at, .. }
            | Self::AdminLoginFailed { at, .. } => *at,
        }
    }
}

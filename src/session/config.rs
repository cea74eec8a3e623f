use chrono::Duration;

use crate::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    Lax,
    #[default]
    Strict,
}

/// Cookie and lifetime settings for server-side sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
    /// How long a session lives. Default: 14 days.
    pub lifetime: Duration,
    /// HMAC key for cookie signing. Empty by default: `validate` fails
    /// until the application supplies one.
    pub secret: SecretString,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "latchkey_session".to_owned(),
            cookie_path: "/".to_owned(),
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: SameSite::Strict,
            lifetime: Duration::days(14),
            secret: SecretString::new(""),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.secret.is_empty() {
            return Err("session secret must not be empty");
        }
        if self.secret.len() < 32 {
            return Err("session secret should be at least 32 bytes");
        }
        Ok(())
    }
}

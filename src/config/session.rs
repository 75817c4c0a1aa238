//! Session and passcode configuration.

use serde::Deserialize;

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC key for signing session tokens. Required.
    pub secret: String,
    /// Shared passcode officers log in with. Required.
    pub officer_passcode: String,
    /// Passcode that elevates a session to admin. Required.
    pub admin_passcode: String,
    /// Token lifetime in seconds.
    pub ttl_secs: u64,
    /// Mark the session cookie `Secure`.
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            officer_passcode: String::new(),
            admin_passcode: String::new(),
            ttl_secs: 12 * 60 * 60,
            secure_cookie: false,
        }
    }
}

/// Minimum secret length accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

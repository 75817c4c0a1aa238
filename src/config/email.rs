//! Outbound email configuration.

use serde::Deserialize;

/// Confirmation email delivery configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// When false, confirmations are only logged.
    pub enabled: bool,
    /// Mail API endpoint accepting `{from, to, subject, html}`.
    pub api_url: String,
    /// Bearer key for the mail API.
    pub api_key: String,
    /// Sender address.
    pub from: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Pending confirmations held before new ones are dropped.
    pub queue_capacity: usize,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from: "Tinsel <noreply@example.org>".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            queue_capacity: 256,
        }
    }
}

//! Outbound mail interface.

use async_trait::async_trait;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Errors that can occur while delivering mail.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail configuration error: {0}")]
    Config(String),

    #[error("Mailer unavailable: {0}")]
    Unavailable(String),
}

/// Interface for sending mail.
///
/// Implementations:
/// - `HttpMailer`: JSON mail API over HTTPS
/// - `LogMailer`: logs and drops (mail disabled)
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

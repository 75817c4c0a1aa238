//! Mailer used when outbound email is disabled.

use async_trait::async_trait;
use tracing::info;

use crate::interfaces::{EmailMessage, MailError, Mailer};

/// Logs each message instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "Email disabled, not sending");
        Ok(())
    }
}

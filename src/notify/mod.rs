//! Best-effort claim confirmation email.
//!
//! Messages go through a bounded queue drained by one worker task. Nothing
//! here can fail or delay a claim: a full queue drops the message and a
//! failed send is logged.

mod http_mailer;
mod log_mailer;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::EmailConfig;
use crate::interfaces::{EmailMessage, MailError, Mailer};
use crate::model::{ClaimRecord, Student};

pub use http_mailer::HttpMailer;
pub use log_mailer::LogMailer;

/// Subject line of claim confirmations.
pub const CONFIRMATION_SUBJECT: &str = "Tinsel Treats Claimed!";

/// Pick the mailer for the configuration.
pub fn mailer_from_config(config: &EmailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    if config.enabled {
        info!(endpoint = %config.api_url, "Email confirmations enabled");
        Ok(Arc::new(HttpMailer::new(config)?))
    } else {
        info!("Email confirmations disabled, using log mailer");
        Ok(Arc::new(LogMailer))
    }
}

/// Queue handle for outgoing confirmations.
#[derive(Clone)]
pub struct EmailDispatcher {
    sender: mpsc::Sender<EmailMessage>,
}

impl EmailDispatcher {
    /// Spawn the delivery worker.
    ///
    /// The worker exits once every dispatcher clone is dropped and the queue
    /// is drained.
    pub fn start(mailer: Arc<dyn Mailer>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<EmailMessage>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                if let Err(e) = mailer.send(&message).await {
                    warn!(to = %message.to, error = %e, "Confirmation email failed");
                }
            }
        });

        (Self { sender }, worker)
    }

    /// Queue a message without waiting. Returns false when it was dropped.
    pub fn enqueue(&self, message: EmailMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(message)) => {
                warn!(to = %message.to, "Email queue full, confirmation dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                warn!(to = %message.to, "Email worker stopped, confirmation dropped");
                false
            }
        }
    }
}

/// Render the confirmation for a claim. `None` when the student has no address.
pub fn confirmation_email(student: &Student, claim: &ClaimRecord) -> Option<EmailMessage> {
    let to = student.email.trim();
    if to.is_empty() {
        return None;
    }

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{subject}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 640px; margin: 0 auto; padding: 20px;">
    <h1>Tinsel Treats</h1>
    <p>Hi {name},</p>
    <p>This is to confirm that you have claimed your <strong>{item}</strong> for day {day} of Tinsel Treats.</p>
    <p>Merry Christmas and good luck on your final examinations!</p>
    <p style="font-size: 0.9em; color: #555;">This claim was processed by Officer {officer}.</p>
    <p style="font-size: 0.8em; color: #666;">This email was sent to {to}.</p>
  </div>
</body>
</html>"#,
        subject = CONFIRMATION_SUBJECT,
        name = escape_html(&student.first_name),
        item = escape_html(&claim.item_claimed),
        day = claim.day_number,
        officer = escape_html(&claim.officer_name),
        to = escape_html(to),
    );

    Some(EmailMessage {
        to: to.to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        html,
    })
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

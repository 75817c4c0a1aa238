//! Mail API client.
//!
//! POSTs `{from, to, subject, html}` as JSON with a bearer key, the shape
//! accepted by Resend-style transactional mail APIs.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::EmailConfig;
use crate::interfaces::{EmailMessage, MailError, Mailer};

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Mailer backed by an HTTPS mail API, with retry on transient failures.
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    max_retries: usize,
}

impl HttpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, MailError> {
        if config.api_url.is_empty() {
            return Err(MailError::Config("email.api_url not configured".to_string()));
        }
        if config.api_key.is_empty() {
            return Err(MailError::Config("email.api_key not configured".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            max_retries: config.max_retries,
        })
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(5))
            .with_max_times(self.max_retries)
            .with_jitter()
    }

    fn is_retryable(err: &MailError) -> bool {
        match err {
            MailError::Http(e) => e.is_timeout() || e.is_connect(),
            MailError::Unavailable(_) => true,
            _ => false,
        }
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    async fn post(&self, message: &EmailMessage) -> Result<(), MailError> {
        let body = SendRequest {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %message.to, "Confirmation email accepted");
            return Ok(());
        }

        let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(200)
            .collect();

        if Self::is_retryable_status(status) {
            warn!(status = %status, body = %body, "Mail API returned retryable status");
            Err(MailError::Unavailable(format!("HTTP {} - {}", status, body)))
        } else {
            error!(status = %status, body = %body, "Mail API rejected message");
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        (|| async { self.post(message).await })
            .retry(self.backoff())
            .when(Self::is_retryable)
            .await
    }
}

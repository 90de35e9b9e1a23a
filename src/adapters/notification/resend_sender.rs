//! Resend Sender - Emails completed intakes through the Resend API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ResendConfig::new(api_key, "Intake <intake@clinic.com>", "desk@clinic.com")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let sender = ResendSender::new(config)?;
//! ```
//!
//! Each request carries the notice's dispatch id as its `Idempotency-Key`,
//! so a retried send never produces a second email.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::intake::IntakeNotice;
use crate::ports::{NotificationError, NotificationSender};

/// Configuration for the Resend sender.
#[derive(Debug, Clone)]
pub struct ResendConfig {
    api_key: Secret<String>,
    /// "Name <address>" sender header.
    pub from: String,
    /// Scheduling team inbox.
    pub to: String,
    /// Base URL for the API (default: https://api.resend.com).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ResendConfig {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            from: from.into(),
            to: to.into(),
            base_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    text: String,
}

/// Resend email sender.
pub struct ResendSender {
    config: ResendConfig,
    client: Client,
}

impl ResendSender {
    /// # Errors
    ///
    /// `NotConfigured` when the key is empty or the HTTP client cannot be built.
    pub fn new(config: ResendConfig) -> Result<Self, NotificationError> {
        if config.api_key().trim().is_empty() {
            return Err(NotificationError::NotConfigured("Resend API key".to_string()));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.base_url.trim_end_matches('/'))
    }

    fn to_request<'a>(&'a self, notice: &IntakeNotice) -> SendEmailRequest<'a> {
        SendEmailRequest {
            from: &self.config.from,
            to: [&self.config.to],
            subject: notice.subject(),
            text: notice.render_text(),
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<(), NotificationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 | 403 => Err(NotificationError::NotConfigured(format!(
                "Resend rejected credentials: {}",
                message
            ))),
            code => Err(NotificationError::Rejected {
                status: code,
                message,
            }),
        }
    }
}

#[async_trait]
impl NotificationSender for ResendSender {
    async fn send(&self, notice: &IntakeNotice) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(self.config.api_key())
            .header("Idempotency-Key", notice.dispatch_id.to_string())
            .json(&self.to_request(notice))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    NotificationError::network(format!("Connection failed: {}", e))
                } else {
                    NotificationError::network(e.to_string())
                }
            })?;

        self.handle_response_status(response).await
    }

    fn name(&self) -> &'static str {
        "resend"
    }
}

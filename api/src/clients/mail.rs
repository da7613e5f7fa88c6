//! Outbound mail transports

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::MailRelayConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),
    #[error("Network timeout")]
    Timeout,
    #[error("Mail relay rejected message with status {status}")]
    Rejected { status: u16, body: String },
}

/// A fully composed notification email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    /// CRLF-separated header block
    pub headers: String,
    /// HTML body
    pub body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Hand the message over for delivery. `Err` means it was not accepted.
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTP mail relay
pub struct HttpMailTransport {
    url: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    to: &'a str,
    from: &'a str,
    subject: &'a str,
    headers: &'a str,
    html: &'a str,
}

impl HttpMailTransport {
    pub fn new(url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::ClientBuilder::new()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        HttpMailTransport {
            url: url.into(),
            token,
            client,
        }
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let message = RelayMessage {
            to: &email.to,
            from: &email.from,
            subject: &email.subject,
            headers: &email.headers,
            html: &email.body,
        };

        let mut request = self.client.post(&self.url).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MailError::Timeout
            } else {
                MailError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), to = %email.to, "Mail relay rejected message");
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %email.to, subject = %email.subject, "Mail relay accepted message");
        Ok(())
    }
}

/// Writes messages to the log instead of sending them. Used when no relay
/// is configured.
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        info!(to = %email.to, from = %email.from, subject = %email.subject, "Notification email (not sent, no relay configured)");
        debug!(body = %email.body, "Notification email body");
        Ok(())
    }
}

pub fn transport_from_config(config: &MailRelayConfig, timeout: Duration) -> Arc<dyn MailTransport> {
    match &config.url {
        Some(url) => Arc::new(HttpMailTransport::new(url.clone(), config.token.clone(), timeout)),
        None => Arc::new(LogMailTransport),
    }
}

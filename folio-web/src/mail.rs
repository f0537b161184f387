//! Contact message relay
//!
//! Messages go out through a transactional mail provider's HTTP API. The
//! contact endpoint hands a message to [`relay_in_background`] and answers the
//! visitor immediately; delivery failures are logged and never retried.

use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::MailConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// One outgoing email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound mail transport
pub trait Mailer: Send + Sync {
    /// Sender and recipient addresses; `None` when nothing is forwarded
    fn envelope(&self) -> Option<(&str, &str)>;

    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<(), MailError>>;
}

/// Used when mail credentials are absent
#[derive(Debug, Default)]
pub struct DisabledMailer;

impl Mailer for DisabledMailer {
    fn envelope(&self) -> Option<(&str, &str)> {
        None
    }

    fn send<'a>(&'a self, _message: &'a MailMessage) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Posts messages as JSON to the provider endpoint with a bearer API key
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl HttpMailer {
    pub fn new(config: MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

impl Mailer for HttpMailer {
    fn envelope(&self) -> Option<(&str, &str)> {
        Some((self.config.from.as_str(), self.config.to.as_str()))
    }

    fn send<'a>(&'a self, message: &'a MailMessage) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.config.api_key)
                .json(message)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(MailError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }
            Ok(())
        })
    }
}

/// Build the configured mailer, falling back to [`DisabledMailer`]
pub fn mailer_from_config(config: Option<&MailConfig>) -> Arc<dyn Mailer> {
    match config {
        Some(config) => match HttpMailer::new(config.clone()) {
            Ok(mailer) => Arc::new(mailer),
            Err(e) => {
                error!("Mail relay disabled: {}", e);
                Arc::new(DisabledMailer)
            }
        },
        None => Arc::new(DisabledMailer),
    }
}

/// Send on a background task; the caller never waits for delivery
pub fn relay_in_background(mailer: Arc<dyn Mailer>, message: MailMessage) {
    tokio::spawn(async move {
        match mailer.send(&message).await {
            Ok(()) => info!("Contact message from {} relayed", message.reply_to),
            Err(e) => error!("Contact message from {} not delivered: {}", message.reply_to, e),
        }
    });
}

//! Outbound email as an ordered chain of transports.
//!
//! Each transport is tried in order; a failure is logged and the next one
//! is tried. The chain always ends with the `mailto:` handoff, which cannot
//! fail, so delivery as a whole never errors.

use async_trait::async_trait;
use contracts::usecases::u502_admin_message::{DeliveryMethod, DeliveryReport};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::shared::config::MailConfig;

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Relay rejected the message with status {0}")]
    Rejected(u16),
}

/// Delivered; `handoff_link` is set when the user has to finish sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub handoff_link: Option<String>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn method(&self) -> DeliveryMethod;

    async fn send(&self, mail: &OutgoingMail) -> Result<Delivered, MailError>;
}

/// POSTs the message as JSON to an HTTP mail relay
pub struct RelayMailer {
    client: reqwest::Client,
    url: String,
}

impl RelayMailer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Http(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl MailTransport for RelayMailer {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Relay
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<Delivered, MailError> {
        let response = self
            .client
            .post(&self.url)
            .json(mail)
            .send()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }
        tracing::info!("Mail to {} accepted by relay", mail.to);
        Ok(Delivered { handoff_link: None })
    }
}

/// Hands the message to the user's mail client through a `mailto:` link
pub struct MailtoFallback;

impl MailtoFallback {
    pub fn link(mail: &OutgoingMail) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            mail.to.trim(),
            urlencoding::encode(&mail.subject),
            urlencoding::encode(&mail.body)
        )
    }
}

#[async_trait]
impl MailTransport for MailtoFallback {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::MailClient
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<Delivered, MailError> {
        Ok(Delivered {
            handoff_link: Some(Self::link(mail)),
        })
    }
}

pub struct MailChain {
    from: String,
    transports: Vec<Box<dyn MailTransport>>,
}

impl MailChain {
    /// `transports` are tried in order, then the mailto fallback
    pub fn new(from: impl Into<String>, mut transports: Vec<Box<dyn MailTransport>>) -> Self {
        transports.push(Box::new(MailtoFallback));
        Self {
            from: from.into(),
            transports,
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        let mut transports: Vec<Box<dyn MailTransport>> = Vec::new();
        let relay_url = config.relay_url.trim();
        if !relay_url.is_empty() {
            match RelayMailer::new(relay_url, Duration::from_secs(config.timeout_seconds)) {
                Ok(relay) => transports.push(Box::new(relay)),
                Err(e) => tracing::warn!("Mail relay disabled: {}", e),
            }
        }
        Self::new(config.from.clone(), transports)
    }

    pub fn compose(&self, to: &str, subject: &str, body: &str) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: to.trim().to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    pub async fn deliver(&self, mail: &OutgoingMail) -> DeliveryReport {
        let mut skipped = Vec::new();
        for transport in &self.transports {
            match transport.send(mail).await {
                Ok(delivered) => {
                    return DeliveryReport {
                        method: transport.method(),
                        handoff_link: delivered.handoff_link,
                        skipped,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Mail transport {:?} failed, trying next: {}",
                        transport.method(),
                        e
                    );
                    skipped.push(e.to_string());
                }
            }
        }
        DeliveryReport {
            method: DeliveryMethod::MailClient,
            handoff_link: Some(MailtoFallback::link(mail)),
            skipped,
        }
    }
}

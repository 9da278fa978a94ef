//! Digest delivery channels.

use async_trait::async_trait;
use std::time::Duration;

use aidigest_core::{DigestRecord, Notifier, NotifyError};

/// POSTs the finished digest as JSON to a configured webhook URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("aidigest/0.1 (digest-delivery)")
            .build()
            .map_err(|e| NotifyError(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, record: &DigestRecord) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| NotifyError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError(format!("webhook answered {status}")));
        }
        tracing::info!(date = %record.digest_date, "digest delivered to webhook");
        Ok(())
    }
}

/// Used when no webhook is configured; delivery succeeds without sending.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, record: &DigestRecord) -> Result<(), NotifyError> {
        tracing::info!(date = %record.digest_date, "no webhook configured; skipping delivery");
        Ok(())
    }
}

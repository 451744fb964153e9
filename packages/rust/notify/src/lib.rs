//! Best-effort status notifications.
//!
//! A [`Notifier`] cannot fail from the caller's point of view: delivery
//! problems are logged and swallowed so the pipeline outcome never depends on
//! the notification channel.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use sheetwriter_shared::NotifySettings;

/// Sink for human-readable status messages.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn notify(&self, message: &str);
}

/// Incoming-webhook payload (`{"text": ...}`).
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts messages to a Slack-compatible incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: Url,
}

impl WebhookNotifier {
    pub fn new(url: Url, settings: &NotifySettings) -> Self {
        // A builder failure only loses the timeout; fall back to a default client.
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build webhook client, using defaults");
                Client::new()
            });
        Self { client, url }
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) {
        let result = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload { text: message })
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => debug!("notification delivered"),
            Ok(response) => warn!(status = %response.status(), "webhook rejected notification"),
            Err(e) => warn!(error = %e, "failed to deliver notification"),
        }
    }
}

/// Used when no webhook is configured: the message goes to the log instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, message: &str) {
        warn!("webhook URL not configured; notification logged only");
        info!(%message, "notification");
    }
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn notify(&self, _message: &str) {}
}

/// The notifier selected from configuration.
#[derive(Debug, Clone)]
pub enum ChannelNotifier {
    Webhook(WebhookNotifier),
    Log(LogNotifier),
}

impl ChannelNotifier {
    /// Webhook when a URL is configured, log line otherwise.
    pub fn from_config(webhook_url: Option<&Url>, settings: &NotifySettings) -> Self {
        match webhook_url {
            Some(url) => Self::Webhook(WebhookNotifier::new(url.clone(), settings)),
            None => Self::Log(LogNotifier),
        }
    }
}

impl Notifier for ChannelNotifier {
    async fn notify(&self, message: &str) {
        match self {
            Self::Webhook(n) => n.notify(message).await,
            Self::Log(n) => n.notify(message).await,
        }
    }
}

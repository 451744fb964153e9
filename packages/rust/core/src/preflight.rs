//! Startup validation. Anything that fails before the pipeline starts is
//! reported through the notifier, then returned.

use tracing::error;

use sheetwriter_notify::{ChannelNotifier, Notifier};
use sheetwriter_shared::{AppConfig, CheckConfig, Credentials, NotifySettings, Result, Settings};

use crate::pipeline::{Stage, failure_message};

/// Notifier available before settings are validated: the webhook when its
/// URL parses, a log line otherwise.
pub fn early_notifier(credentials: &Credentials, settings: &NotifySettings) -> ChannelNotifier {
    let webhook = credentials.webhook().ok().flatten();
    ChannelNotifier::from_config(webhook.as_ref(), settings)
}

/// Pass `result` through, sending one failure notice when it is an error.
pub async fn notify_on_error<T, N: Notifier>(notifier: &N, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            error!(error = %e, "startup failed");
            notifier.notify(&failure_message(Stage::Init, &e)).await;
            Err(e)
        }
    }
}

/// Validate everything a pipeline run needs.
pub async fn prepare_run<N: Notifier>(
    settings: Result<Settings>,
    credentials: &Credentials,
    notifier: &N,
) -> Result<AppConfig> {
    let settings = notify_on_error(notifier, settings).await?;
    notify_on_error(notifier, AppConfig::new(settings, credentials)).await
}

/// Validate everything the connectivity check needs.
pub async fn prepare_check<N: Notifier>(
    settings: Result<Settings>,
    credentials: &Credentials,
    notifier: &N,
) -> Result<CheckConfig> {
    let settings = notify_on_error(notifier, settings).await?;
    notify_on_error(notifier, CheckConfig::new(settings, credentials)).await
}

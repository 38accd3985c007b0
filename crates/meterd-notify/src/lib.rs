//! Sample notification delivery with pluggable channel support.
//!
//! Completed polling batches are handed to a [`Notifier`] as one event per
//! batch: event type [`SAMPLE_EVENT_TYPE`], payload `{"samples": [...]}`
//! with each sample in the canonical wire form produced by [`wire`].
//! Built-in channels are structured-log emission (`log://`) and HTTP POST
//! (`http://` / `https://`).

pub mod channels;
pub mod error;
pub mod wire;


use anyhow::Result;
use async_trait::async_trait;
use error::NotifyError;
use serde_json::Value;
use std::sync::Arc;

/// Event type carried by every polled-sample notification.
pub const SAMPLE_EVENT_TYPE: &str = "telemetry.polling";

/// A sink for completed sample batches.
///
/// One call per flushed batch. Delivery failures are the channel's to
/// report; the polling layer logs and moves on — a sink outage never
/// stops the polling cycle.
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Delivers one event. `context` carries request-scoped metadata
    /// (agent instance id, uniform destination); `payload` is the event
    /// body.
    async fn notify(&self, context: &Value, event_type: &str, payload: Value) -> Result<()>;

    /// Returns the channel name (e.g. `"log"`, `"webhook"`).
    fn name(&self) -> &str;
}

/// Creates the notifier for `url`, dispatching on the URL scheme.
///
/// # Errors
///
/// Returns [`NotifyError::UnknownScheme`] for unrecognized schemes and
/// [`NotifyError::InvalidUrl`] when the URL has no scheme.
pub fn build_notifier(url: &str) -> error::Result<Arc<dyn Notifier>> {
    let (scheme, _) = url
        .split_once("://")
        .ok_or_else(|| NotifyError::InvalidUrl(url.to_string()))?;
    match scheme {
        "log" => Ok(Arc::new(channels::log::LogNotifier)),
        "http" | "https" => Ok(Arc::new(channels::webhook::WebhookNotifier::new(url))),
        _ => Err(NotifyError::UnknownScheme(scheme.to_string())),
    }
}

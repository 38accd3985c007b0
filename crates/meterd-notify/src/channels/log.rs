use crate::Notifier;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Emits each notification through the process log. The default channel:
/// useful for development and for deployments where a downstream log
/// shipper picks samples up.
#[derive(Debug)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, context: &Value, event_type: &str, payload: Value) -> Result<()> {
        let samples = payload
            .get("samples")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        tracing::info!(
            event_type,
            samples,
            context = %context,
            payload = %payload,
            "sample notification"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

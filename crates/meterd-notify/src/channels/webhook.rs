use crate::Notifier;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

const MAX_ATTEMPTS: u32 = 3;

/// Posts each notification as a JSON envelope to a single HTTP endpoint,
/// with bounded retries and exponential backoff.
#[derive(Debug)]
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn envelope(context: &Value, event_type: &str, payload: &Value) -> String {
        json!({
            "context": context,
            "event_type": event_type,
            "payload": payload,
        })
        .to_string()
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, context: &Value, event_type: &str, payload: Value) -> Result<()> {
        let body = Self::envelope(context, event_type, &payload);
        let mut last_err = None;

        for attempt in 0..MAX_ATTEMPTS {
            match self
                .client
                .post(&self.url)
                .header("Content-Type", "application/json")
                .body(body.clone())
                .send()
                .await
            {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(());
                    }
                    tracing::warn!(
                        attempt = attempt + 1,
                        status = %status,
                        "notification endpoint returned non-success status, retrying"
                    );
                    last_err = Some(anyhow::anyhow!("HTTP {status}"));
                }
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "notification send failed, retrying"
                    );
                    last_err = Some(e.into());
                }
            }
            if attempt < MAX_ATTEMPTS - 1 {
                tokio::time::sleep(std::time::Duration::from_millis(100 * 2u64.pow(attempt)))
                    .await;
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("notification delivery failed")))
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

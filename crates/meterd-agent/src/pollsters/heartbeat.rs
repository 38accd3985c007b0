use async_trait::async_trait;
use meterd_common::types::Sample;
use meterd_polling::error::PollsterError;
use meterd_polling::plugin::{PollContext, Pollster};

/// Emits a constant liveness gauge per resource. Cheap way to verify the
/// polling pipeline end to end and to feed presence dashboards.
pub struct HeartbeatPollster;

#[async_trait]
impl Pollster for HeartbeatPollster {
    fn name(&self) -> &str {
        "heartbeat"
    }

    fn default_discovery(&self) -> Option<String> {
        Some("local_node".to_string())
    }

    async fn get_samples(
        &self,
        _ctx: &PollContext<'_>,
        resources: &[String],
    ) -> Result<Vec<Sample>, PollsterError> {
        Ok(resources
            .iter()
            .map(|r| Sample::gauge("heartbeat", "beat", 1.0, r))
            .collect())
    }
}

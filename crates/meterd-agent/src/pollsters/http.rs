use async_trait::async_trait;
use meterd_common::types::Sample;
use meterd_polling::error::{PluginError, PollsterError};
use meterd_polling::plugin::{PollContext, Pollster};
use std::time::{Duration, Instant};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Times an HTTP GET against each resource URL and reports the response
/// time in milliseconds, with the status code in the sample metadata.
///
/// Resources that are not `http(s)` URLs at all can never be polled and
/// are reported as permanently unpollable; network errors are transient
/// and retried on the next cycle.
pub struct HttpResponseTimePollster {
    client: reqwest::Client,
}

impl HttpResponseTimePollster {
    pub fn create() -> Result<Self, PluginError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PluginError::Init(e.into()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Pollster for HttpResponseTimePollster {
    fn name(&self) -> &str {
        "http.response_time"
    }

    async fn get_samples(
        &self,
        _ctx: &PollContext<'_>,
        resources: &[String],
    ) -> Result<Vec<Sample>, PollsterError> {
        let mut samples = Vec::new();
        let mut unpollable = Vec::new();

        for resource in resources {
            if !resource.starts_with("http://") && !resource.starts_with("https://") {
                tracing::error!(resource = %resource, "not an http(s) URL");
                unpollable.push(resource.clone());
                continue;
            }

            let started = Instant::now();
            match self.client.get(resource).send().await {
                Ok(resp) => {
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    samples.push(
                        Sample::gauge("http.response_time", "ms", elapsed_ms, resource)
                            .with_metadata(
                                "status_code",
                                serde_json::json!(resp.status().as_u16()),
                            ),
                    );
                }
                Err(e) => {
                    tracing::warn!(resource = %resource, error = %e, "probe failed, retrying next cycle");
                }
            }
        }

        if !unpollable.is_empty() {
            return Err(PollsterError::Permanent {
                resources: unpollable,
            });
        }
        Ok(samples)
    }
}

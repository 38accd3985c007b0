use async_trait::async_trait;
use meterd_polling::error::DiscoveryError;
use meterd_polling::plugin::{Discovery, PollContext};

/// Discovers the identity-catalog endpoints of a service type, e.g.
/// `endpoint:compute` yields every compute endpoint URL. Uses the cycle's
/// cached identity client; an identity outage skips this reference for
/// the cycle. Opts out of partitioning: the endpoint universe is small
/// and every agent sees the same catalog.
pub struct EndpointDiscovery;

#[async_trait]
impl Discovery for EndpointDiscovery {
    fn name(&self) -> &str {
        "endpoint"
    }

    fn group_id(&self) -> Option<&str> {
        None
    }

    async fn discover(
        &self,
        ctx: &PollContext<'_>,
        param: Option<&str>,
    ) -> Result<Vec<String>, DiscoveryError> {
        let Some(service_type) = param else {
            return Err(DiscoveryError::Other(anyhow::anyhow!(
                "endpoint discovery requires a service type parameter"
            )));
        };
        let client = ctx.session.client().await?;
        let endpoints = client.endpoints(service_type).await?;
        Ok(endpoints.into_iter().map(|e| e.url).collect())
    }
}

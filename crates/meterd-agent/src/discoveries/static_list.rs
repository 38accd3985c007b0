use async_trait::async_trait;
use meterd_polling::error::DiscoveryError;
use meterd_polling::plugin::{Discovery, PollContext};

/// Turns the discovery parameter into a resource list: comma-separated
/// identifiers, e.g. `static_list:srv-1,srv-2,srv-3`. Lets operators put
/// a resource inventory on the discovery side of a source so it is
/// divided across the partition group.
pub struct StaticListDiscovery;

#[async_trait]
impl Discovery for StaticListDiscovery {
    fn name(&self) -> &str {
        "static_list"
    }

    fn group_id(&self) -> Option<&str> {
        Some("static_list")
    }

    async fn discover(
        &self,
        _ctx: &PollContext<'_>,
        param: Option<&str>,
    ) -> Result<Vec<String>, DiscoveryError> {
        let Some(param) = param else {
            return Ok(Vec::new());
        };
        Ok(param
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect())
    }
}

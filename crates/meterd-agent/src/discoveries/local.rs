use async_trait::async_trait;
use meterd_polling::error::DiscoveryError;
use meterd_polling::plugin::{Discovery, PollContext};

/// Discovers exactly one resource: the local host. Opts out of
/// partitioning, since every agent must poll itself.
pub struct LocalNodeDiscovery {
    node_id: String,
}

impl LocalNodeDiscovery {
    pub fn new() -> Self {
        let node_id = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        Self { node_id }
    }
}

impl Default for LocalNodeDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Discovery for LocalNodeDiscovery {
    fn name(&self) -> &str {
        "local_node"
    }

    fn group_id(&self) -> Option<&str> {
        None
    }

    async fn discover(
        &self,
        _ctx: &PollContext<'_>,
        _param: Option<&str>,
    ) -> Result<Vec<String>, DiscoveryError> {
        Ok(vec![self.node_id.clone()])
    }
}

use crate::error::DiscoveryError;
use crate::plugin::PollContext;
use crate::registry::DiscoveryRegistry;
use meterd_coordination::partition::PartitionCoordinator;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-cycle discovery memo, keyed by the raw discovery reference.
/// Created fresh for every polling-task invocation so repeated references
/// within one cycle don't re-invoke the plugin.
pub type DiscoveryCache = HashMap<String, Vec<String>>;

/// Splits a discovery reference `scheme[:param]` into plugin name and
/// optional parameter.
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once(':') {
        Some((name, param)) => (name, Some(param)),
        None => (reference, None),
    }
}

/// Resolves discovery references into resource lists.
///
/// Every failure is contained to the failing reference: an unknown plugin
/// name, a missing catalog service, an identity-client outage, or a
/// plugin error all log and skip that one reference — a broken discovery
/// never aborts the polling cycle.
pub struct DiscoveryDispatcher {
    registry: Arc<DiscoveryRegistry>,
    partition: Option<Arc<PartitionCoordinator>>,
}

impl DiscoveryDispatcher {
    pub fn new(
        registry: Arc<DiscoveryRegistry>,
        partition: Option<Arc<PartitionCoordinator>>,
    ) -> Self {
        Self { registry, partition }
    }

    /// Partition coordinator, when partitioning is active. Used by the
    /// resource resolver to filter static resource sets.
    pub fn partition(&self) -> Option<&Arc<PartitionCoordinator>> {
        self.partition.as_ref()
    }

    /// Resolves `references` into the concatenated resource list,
    /// consulting and populating the per-cycle `cache`.
    pub async fn discover(
        &self,
        references: &[String],
        cache: &mut DiscoveryCache,
        ctx: &PollContext<'_>,
    ) -> Vec<String> {
        let mut resources = Vec::new();
        for reference in references {
            if let Some(hit) = cache.get(reference) {
                resources.extend(hit.iter().cloned());
                continue;
            }

            let (name, param) = split_reference(reference);
            let Some(plugin) = self.registry.get(name) else {
                tracing::debug!(discovery = name, "unknown discovery, skipping");
                continue;
            };

            if let Some(service_type) = plugin.service_type() {
                match self.catalog_has(service_type, ctx).await {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!(
                            discovery = name,
                            service_type,
                            "service not in catalog, skipping discovery"
                        );
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(
                            discovery = name,
                            error = %e,
                            "identity client unavailable, skipping discovery"
                        );
                        continue;
                    }
                }
            }

            match plugin.discover(ctx, param).await {
                Ok(mut discovered) => {
                    if let (Some(partition), Some(group_key)) =
                        (&self.partition, plugin.group_id())
                    {
                        let group = partition.construct_group_id(group_key);
                        discovered.retain(|r| partition.belongs_to_self(&group, r));
                    }
                    cache.insert(reference.clone(), discovered.clone());
                    resources.extend(discovered);
                }
                Err(DiscoveryError::Client(e)) => {
                    tracing::warn!(
                        discovery = name,
                        error = %e,
                        "identity error during discovery, skipping"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        discovery = name,
                        reference = %reference,
                        error = %e,
                        "discovery failed, skipping"
                    );
                }
            }
        }
        resources
    }

    async fn catalog_has(
        &self,
        service_type: &str,
        ctx: &PollContext<'_>,
    ) -> Result<bool, DiscoveryError> {
        let client = ctx.session.client().await?;
        let endpoints = client.endpoints(service_type).await?;
        Ok(!endpoints.is_empty())
    }
}

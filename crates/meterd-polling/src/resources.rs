use crate::discovery::{DiscoveryCache, DiscoveryDispatcher};
use crate::plugin::PollContext;
use crate::source::Source;
use meterd_coordination::partition::static_set_key;
use std::collections::HashSet;

/// The resource universe of one (source, pollster) pair: the static list
/// and discovery references copied from the source, plus the blacklist of
/// resources the pollster declared permanently unpollable.
///
/// The blacklist only grows; it is cleared by agent restart, never within
/// a cycle. Membership is a hash-set lookup so large resource universes
/// stay O(1) per test.
pub struct ResourceSet {
    static_resources: Vec<String>,
    discovery: Vec<String>,
    blacklist: HashSet<String>,
}

impl ResourceSet {
    pub fn from_source(source: &Source) -> Self {
        Self {
            static_resources: source.resources.clone(),
            discovery: source.discovery.clone(),
            blacklist: HashSet::new(),
        }
    }

    /// Computes this cycle's candidate resources: discovered resources
    /// plus the static list, with the static list filtered down to
    /// locally-owned resources when partitioning is active. The partition
    /// group for a static set is keyed by the hash of the full set, so
    /// sources with identical static lists share one group.
    pub async fn resolve(
        &self,
        dispatcher: &DiscoveryDispatcher,
        cache: &mut DiscoveryCache,
        ctx: &PollContext<'_>,
    ) -> Vec<String> {
        let discovered = if self.discovery.is_empty() {
            Vec::new()
        } else {
            dispatcher.discover(&self.discovery, cache, ctx).await
        };

        if self.static_resources.is_empty() {
            return discovered;
        }

        let mut resources: Vec<String> = match dispatcher.partition() {
            Some(partition) => {
                let group = partition.construct_group_id(&static_set_key(&self.static_resources));
                self.static_resources
                    .iter()
                    .filter(|r| partition.belongs_to_self(&group, r))
                    .cloned()
                    .collect()
            }
            None => self.static_resources.clone(),
        };
        resources.extend(discovered);
        resources
    }

    pub fn is_blacklisted(&self, resource_id: &str) -> bool {
        self.blacklist.contains(resource_id)
    }

    /// Adds resources to the blacklist; returns how many were new.
    pub fn extend_blacklist(&mut self, resources: Vec<String>) -> usize {
        let before = self.blacklist.len();
        self.blacklist.extend(resources);
        self.blacklist.len() - before
    }

    pub fn blacklist_len(&self) -> usize {
        self.blacklist.len()
    }
}

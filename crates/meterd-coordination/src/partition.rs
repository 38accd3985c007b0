use crate::error::Result;
use crate::{Coordinator, MembershipHandle};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

/// Derives the stable per-agent-pool group prefix from the sorted
/// configured namespaces plus an optional operator-supplied prefix.
///
/// # Examples
///
/// ```
/// use meterd_coordination::partition::group_prefix;
///
/// let ns = vec!["ipmi".to_string(), "central".to_string()];
/// assert_eq!(group_prefix(&ns, None), "central-ipmi");
/// assert_eq!(group_prefix(&ns, Some("prod")), "central-ipmi-prod");
/// ```
pub fn group_prefix(namespaces: &[String], operator_prefix: Option<&str>) -> String {
    let mut sorted: Vec<&str> = namespaces.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    let mut prefix = sorted.join("-");
    if let Some(op) = operator_prefix {
        if !prefix.is_empty() {
            prefix.push('-');
        }
        prefix.push_str(op);
    }
    prefix
}

/// Partition-group key for a static resource set: the SHA-256 of the
/// sorted full list. Two sources with identical static lists share one
/// group; any edit to the list re-keys the group entirely.
pub fn static_set_key(resources: &[String]) -> String {
    let mut sorted: Vec<&str> = resources.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    format!("{:x}", Sha256::digest(sorted.join("\n").as_bytes()))
}

/// Agent-side view of partition-group membership.
///
/// Owns the joined [`MembershipHandle`]s keyed by group id. `join` is
/// idempotent; ownership queries are lock-cheap reads served from the
/// handle map and never touch the backend.
pub struct PartitionCoordinator {
    coordinator: Arc<dyn Coordinator>,
    prefix: String,
    handles: RwLock<HashMap<String, MembershipHandle>>,
}

impl PartitionCoordinator {
    pub fn new(coordinator: Arc<dyn Coordinator>, prefix: String) -> Self {
        Self {
            coordinator,
            prefix,
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub async fn start(&self) -> Result<()> {
        self.coordinator.start().await
    }

    pub async fn stop(&self) {
        if let Err(e) = self.coordinator.stop().await {
            tracing::warn!(error = %e, "coordination backend stop failed");
        }
    }

    /// Namespaced group id for a discovery's reported group id or a
    /// static-set key.
    pub fn construct_group_id(&self, key: &str) -> String {
        format!("{}-{}", self.prefix, key)
    }

    /// Joins every group id not already joined. Rejoining is a no-op.
    pub async fn join(&self, group_ids: impl IntoIterator<Item = String>) -> Result<()> {
        for group_id in group_ids {
            if self.lock_handles().contains_key(&group_id) {
                continue;
            }
            let handle = self.coordinator.join_partitioned_group(&group_id).await?;
            tracing::info!(group = %group_id, "joined partition group");
            self.handles
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(group_id, handle);
        }
        Ok(())
    }

    pub fn is_joined(&self, group_id: &str) -> bool {
        self.lock_handles().contains_key(group_id)
    }

    /// Ownership test for `resource_id` in `group_id`. A group that was
    /// never joined is treated as unpartitioned: the local agent polls
    /// everything rather than silently dropping resources.
    pub fn belongs_to_self(&self, group_id: &str, resource_id: &str) -> bool {
        match self.lock_handles().get(group_id) {
            Some(handle) => handle.belongs_to_self(resource_id),
            None => {
                tracing::debug!(group = group_id, "ownership query for unjoined group");
                true
            }
        }
    }

    fn lock_handles(&self) -> RwLockReadGuard<'_, HashMap<String, MembershipHandle>> {
        self.handles
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect;
    use std::collections::HashSet;

    fn coordinator_for(instance: &str) -> PartitionCoordinator {
        let coord = connect("static://agent-0,agent-1,agent-2", instance).unwrap();
        PartitionCoordinator::new(coord, "central".to_string())
    }

    #[test]
    fn group_prefix_sorts_and_appends_operator_prefix() {
        let ns = vec!["compute".to_string(), "central".to_string(), "central".to_string()];
        assert_eq!(group_prefix(&ns, None), "central-compute");
        assert_eq!(group_prefix(&ns, Some("rack-7")), "central-compute-rack-7");
    }

    #[test]
    fn identical_static_sets_share_a_group_key() {
        let a = vec!["r2".to_string(), "r1".to_string()];
        let b = vec!["r1".to_string(), "r2".to_string()];
        let c = vec!["r1".to_string(), "r2".to_string(), "r3".to_string()];
        assert_eq!(static_set_key(&a), static_set_key(&b));
        assert_ne!(static_set_key(&a), static_set_key(&c));
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let pc = coordinator_for("agent-0");
        pc.start().await.unwrap();
        let group = pc.construct_group_id("disk");
        pc.join([group.clone()]).await.unwrap();
        assert!(pc.is_joined(&group));
        // Second join of the same group must not error or duplicate.
        pc.join([group.clone(), group.clone()]).await.unwrap();
        assert!(pc.is_joined(&group));
    }

    #[tokio::test]
    async fn partition_is_disjoint_and_complete_across_members() {
        let agents = ["agent-0", "agent-1", "agent-2"];
        let mut coordinators = Vec::new();
        for a in agents {
            let pc = coordinator_for(a);
            pc.start().await.unwrap();
            pc.join([pc.construct_group_id("disk")]).await.unwrap();
            coordinators.push(pc);
        }
        let group = coordinators[0].construct_group_id("disk");

        let resources: Vec<String> = (0..120).map(|i| format!("res-{i}")).collect();
        let mut owned_union: HashSet<&str> = HashSet::new();
        for r in &resources {
            let owners: Vec<usize> = coordinators
                .iter()
                .enumerate()
                .filter(|(_, pc)| pc.belongs_to_self(&group, r))
                .map(|(i, _)| i)
                .collect();
            assert_eq!(owners.len(), 1, "resource {r} owned by {owners:?}");
            owned_union.insert(r);
        }
        assert_eq!(owned_union.len(), resources.len());
    }

    #[tokio::test]
    async fn unjoined_group_defaults_to_local_ownership() {
        let pc = coordinator_for("agent-0");
        assert!(pc.belongs_to_self("never-joined", "res-1"));
    }
}

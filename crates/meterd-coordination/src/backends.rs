use crate::error::{CoordinationError, Result};
use crate::hashring::HashRing;
use crate::{Coordinator, MembershipHandle};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Coordination backend with a fixed member list taken from the backend
/// URL (`static://agent-1,agent-2,...`).
///
/// Every cooperating agent must be configured with the same member list;
/// the local instance id is added to the view if the operator left it out.
#[derive(Debug)]
pub struct StaticCoordinator {
    instance_id: String,
    members: Vec<String>,
}

impl StaticCoordinator {
    pub fn new(instance_id: &str, member_list: &str) -> Self {
        let mut members: Vec<String> = member_list
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();
        if !members.iter().any(|m| m == instance_id) {
            members.push(instance_id.to_string());
        }
        Self {
            instance_id: instance_id.to_string(),
            members,
        }
    }
}

#[async_trait]
impl Coordinator for StaticCoordinator {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn start(&self) -> Result<()> {
        tracing::info!(members = self.members.len(), "static coordination backend ready");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn join_partitioned_group(&self, group_id: &str) -> Result<MembershipHandle> {
        let ring = Arc::new(RwLock::new(HashRing::new(self.members.iter().cloned())));
        tracing::debug!(group = group_id, members = self.members.len(), "joined partition group");
        Ok(MembershipHandle::new(group_id, &self.instance_id, ring))
    }
}

/// Coordination backend reading the member list from a file
/// (`file:///etc/meterd/members`), one member id per line, `#` comments
/// allowed. The file is read once at [`start`](Coordinator::start); a
/// missing or unreadable file fails agent startup.
#[derive(Debug)]
pub struct FileCoordinator {
    instance_id: String,
    path: PathBuf,
    members: RwLock<Vec<String>>,
}

impl FileCoordinator {
    pub fn new(instance_id: &str, path: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            path: PathBuf::from(path),
            members: RwLock::new(Vec::new()),
        }
    }

    fn lock_members(&self) -> std::sync::RwLockReadGuard<'_, Vec<String>> {
        self.members
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Coordinator for FileCoordinator {
    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn start(&self) -> Result<()> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CoordinationError::BackendUnavailable(format!(
                "member file {}: {e}",
                self.path.display()
            ))
        })?;
        let mut members: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();
        if !members.iter().any(|m| m == &self.instance_id) {
            members.push(self.instance_id.clone());
        }
        tracing::info!(
            path = %self.path.display(),
            members = members.len(),
            "file coordination backend ready"
        );
        let mut view = self
            .members
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *view = members;
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        Ok(())
    }

    async fn join_partitioned_group(&self, group_id: &str) -> Result<MembershipHandle> {
        let members = self.lock_members();
        if members.is_empty() {
            return Err(CoordinationError::BackendUnavailable(
                "file backend not started".to_string(),
            ));
        }
        let ring = Arc::new(RwLock::new(HashRing::new(members.iter().cloned())));
        tracing::debug!(group = group_id, members = members.len(), "joined partition group");
        Ok(MembershipHandle::new(group_id, &self.instance_id, ring))
    }
}

//! Distributed coordination boundary for partitioned polling.
//!
//! Cooperating agent processes join named partition groups in a
//! coordination backend; each group exposes a [`MembershipHandle`] whose
//! [`belongs_to_self`](MembershipHandle::belongs_to_self) test divides a
//! resource universe across the group members via consistent hashing.
//! Backends are selected by URL scheme through [`connect`].

pub mod backends;
pub mod error;
pub mod hashring;
pub mod partition;

use crate::error::{CoordinationError, Result};
use crate::hashring::HashRing;
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// A coordination-service client scoped to one agent instance.
///
/// Implementations are created by [`connect`] and shared read-only across
/// every polling interval. `start` is called once before any group join;
/// an unreachable backend surfaces there and is fatal to agent startup.
#[async_trait]
pub trait Coordinator: Send + Sync + std::fmt::Debug {
    /// The local agent's member id within every joined group.
    fn instance_id(&self) -> &str;

    async fn start(&self) -> Result<()>;

    async fn stop(&self) -> Result<()>;

    /// Joins (or creates) the partitioned group and returns a membership
    /// handle for ownership tests against its current member view.
    async fn join_partitioned_group(&self, group_id: &str) -> Result<MembershipHandle>;
}

/// Ownership test handle for one partition group.
///
/// The ring view is shared read-only with the backend that produced it;
/// callers never mutate it. Results may change between calls when the
/// backend refreshes group membership.
#[derive(Clone)]
pub struct MembershipHandle {
    group_id: String,
    instance_id: String,
    ring: Arc<RwLock<HashRing>>,
}

impl MembershipHandle {
    pub fn new(group_id: &str, instance_id: &str, ring: Arc<RwLock<HashRing>>) -> Self {
        Self {
            group_id: group_id.to_string(),
            instance_id: instance_id.to_string(),
            ring,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Returns whether the local instance owns `resource_id` under the
    /// current membership view. An empty view means no partitioning is in
    /// effect for the group, so the local instance polls everything.
    pub fn belongs_to_self(&self, resource_id: &str) -> bool {
        let ring = self
            .ring
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match ring.owner(resource_id) {
            Some(owner) => owner == self.instance_id,
            None => true,
        }
    }
}

/// Creates a coordinator for `backend_url`, dispatching on the URL scheme.
///
/// Supported schemes: `static://member1,member2,...` (fixed member list)
/// and `file:///path/to/members` (member list loaded at startup, one id
/// per line).
///
/// # Errors
///
/// Returns [`CoordinationError::UnsupportedBackend`] for unknown schemes
/// and [`CoordinationError::InvalidUrl`] when the URL has no scheme.
pub fn connect(backend_url: &str, instance_id: &str) -> Result<Arc<dyn Coordinator>> {
    let (scheme, rest) = backend_url
        .split_once("://")
        .ok_or_else(|| CoordinationError::InvalidUrl(backend_url.to_string()))?;
    match scheme {
        "static" => Ok(Arc::new(backends::StaticCoordinator::new(
            instance_id,
            rest,
        ))),
        "file" => Ok(Arc::new(backends::FileCoordinator::new(instance_id, rest))),
        _ => Err(CoordinationError::UnsupportedBackend(scheme.to_string())),
    }
}

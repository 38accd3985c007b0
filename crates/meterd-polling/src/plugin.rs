use crate::error::{DiscoveryError, PollsterError};
use crate::identity::CachedSession;
use async_trait::async_trait;
use meterd_common::types::Sample;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Scratch cache created fresh for every polling-task invocation and
/// shared across all pollster and discovery calls within it. Pollsters
/// memoize expensive cross-cutting lookups here (an inventory listing,
/// a parsed API response) so that plugins polled in the same cycle don't
/// repeat them. Opaque to the polling engine.
pub struct CycleCache {
    inner: Mutex<HashMap<String, Value>>,
}

impl CycleCache {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: Value) {
        self.lock().insert(key.to_string(), value);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CycleCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-cycle state handed to every pollster and discovery invocation.
pub struct PollContext<'a> {
    pub cache: &'a CycleCache,
    /// Identity-service session, acquired at most once per cycle.
    pub session: &'a CachedSession,
}

/// A telemetry collector: given a resource list, produces samples.
///
/// Instantiated once at agent startup by the plugin registry; stateless
/// between cycles apart from blacklisting, which the polling task tracks
/// on the collector's behalf. Requires `Send + Sync` because one instance
/// may be bound to sources on several polling intervals.
#[async_trait]
pub trait Pollster: Send + Sync {
    /// Pollster name matched against source `meters` patterns.
    fn name(&self) -> &str;

    /// Discovery reference tried when configuration yields no resources,
    /// letting the pollster self-discover.
    fn default_discovery(&self) -> Option<String> {
        None
    }

    /// Produces samples for the given resources.
    ///
    /// # Errors
    ///
    /// [`PollsterError::Permanent`] blacklists the named resources for
    /// the process lifetime; any other error skips this cycle only.
    async fn get_samples(
        &self,
        ctx: &PollContext<'_>,
        resources: &[String],
    ) -> Result<Vec<Sample>, PollsterError>;
}

/// A resource discoverer: produces the resource identifiers a pollster
/// should poll, optionally scoped to a partition group.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Discovery name referenced from source `discovery` entries.
    fn name(&self) -> &str;

    /// Partition group this discovery's resources are divided under, or
    /// `None` to opt out of partitioning (every agent polls the full
    /// result).
    fn group_id(&self) -> Option<&str>;

    /// Service type that must be present in the identity service catalog
    /// before this discovery runs.
    fn service_type(&self) -> Option<&str> {
        None
    }

    async fn discover(
        &self,
        ctx: &PollContext<'_>,
        param: Option<&str>,
    ) -> Result<Vec<String>, DiscoveryError>;
}

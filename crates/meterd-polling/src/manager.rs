use crate::config::PollingConfig;
use crate::discovery::{split_reference, DiscoveryCache, DiscoveryDispatcher};
use crate::error::AgentError;
use crate::identity::{CachedSession, IdentityClientProvider};
use crate::plugin::{CycleCache, PollContext, Pollster};
use crate::registry::{DiscoveryRegistry, PollsterRegistry};
use crate::scheduler::PollingScheduler;
use crate::task::{PollingTask, TaskShared};
use meterd_coordination::partition::{group_prefix, static_set_key, PartitionCoordinator};
use meterd_notify::Notifier;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Top-level orchestrator: validates configuration, owns the plugin
/// registries and the partition coordinator, builds one [`PollingTask`]
/// per distinct interval, and drives the scheduler through graceful
/// start/stop.
pub struct AgentManager {
    cfg: PollingConfig,
    pollsters: Arc<PollsterRegistry>,
    discoveries: Arc<DiscoveryRegistry>,
    provider: Arc<dyn IdentityClientProvider>,
    notifier: Arc<dyn Notifier>,
    partition: Option<Arc<PartitionCoordinator>>,
    scheduler: Option<PollingScheduler>,
}

impl std::fmt::Debug for AgentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentManager").finish_non_exhaustive()
    }
}

impl AgentManager {
    /// Structural configuration checks, callable before any plugin
    /// loading. `pollster_list` and a coordination backend are both
    /// workload-splitting mechanisms; combining them risks duplicate or
    /// lost samples, so the combination is refused outright.
    pub fn validate(cfg: &PollingConfig) -> Result<(), AgentError> {
        if !cfg.pollster_list.is_empty() && cfg.coordination.backend_url.is_some() {
            return Err(AgentError::IncompatibleWorkloadSplit);
        }
        for source in &cfg.sources {
            if source.interval == 0 {
                return Err(AgentError::InvalidInterval {
                    source_name: source.name.clone(),
                    interval: source.interval,
                });
            }
        }
        Ok(())
    }

    pub fn new(
        cfg: PollingConfig,
        mut pollsters: PollsterRegistry,
        discoveries: DiscoveryRegistry,
        provider: Arc<dyn IdentityClientProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AgentError> {
        Self::validate(&cfg)?;
        if !cfg.pollster_list.is_empty() {
            pollsters.retain_matching(&cfg.pollster_list);
        }
        if pollsters.is_empty() {
            return Err(AgentError::NoPollsters);
        }
        tracing::info!(
            pollsters = pollsters.len(),
            sources = cfg.sources.len(),
            "agent manager initialized"
        );
        Ok(Self {
            cfg,
            pollsters: Arc::new(pollsters),
            discoveries: Arc::new(discoveries),
            provider,
            notifier,
            partition: None,
            scheduler: None,
        })
    }

    /// Starts coordination (when configured) and the polling schedule.
    ///
    /// # Errors
    ///
    /// An unreachable coordination backend is fatal here; nothing is
    /// polled in that case.
    pub async fn start(&mut self) -> Result<(), AgentError> {
        if let Some(backend_url) = self.cfg.coordination.backend_url.clone() {
            let coordinator =
                meterd_coordination::connect(&backend_url, &self.cfg.instance_id)?;
            let prefix = group_prefix(
                &self.cfg.namespaces,
                self.cfg.coordination.partitioning_group_prefix.as_deref(),
            );
            let partition = Arc::new(PartitionCoordinator::new(coordinator, prefix));
            partition.start().await?;
            partition.join(self.partition_group_ids(&partition)).await?;
            self.partition = Some(partition);
        }

        let tasks = self.build_tasks();
        if tasks.is_empty() {
            tracing::warn!("no polling tasks configured; agent is idle");
        }
        self.scheduler = Some(PollingScheduler::spawn(
            tasks,
            self.cfg.shuffle_time_before_polling_task,
        ));
        tracing::info!(instance_id = %self.cfg.instance_id, "polling started");
        Ok(())
    }

    /// Stops the schedule, letting in-flight cycles finish, then leaves
    /// the coordination backend.
    pub async fn stop(&mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop().await;
        }
        if let Some(partition) = &self.partition {
            partition.stop().await;
        }
        tracing::info!("polling stopped");
    }

    /// Every partition group id derivable from configuration: one per
    /// distinct static resource set and one per partitioned discovery
    /// referenced by a source or by a pollster's default discovery.
    fn partition_group_ids(&self, partition: &PartitionCoordinator) -> Vec<String> {
        let mut keys: BTreeSet<String> = BTreeSet::new();
        for source in &self.cfg.sources {
            if !source.resources.is_empty() {
                keys.insert(static_set_key(&source.resources));
            }
            for reference in &source.discovery {
                self.insert_discovery_group_key(reference, &mut keys);
            }
        }
        for (_, pollster) in self.pollsters.iter() {
            if let Some(reference) = pollster.default_discovery() {
                self.insert_discovery_group_key(&reference, &mut keys);
            }
        }
        keys.iter()
            .map(|key| partition.construct_group_id(key))
            .collect()
    }

    fn insert_discovery_group_key(&self, reference: &str, keys: &mut BTreeSet<String>) {
        let (name, _) = split_reference(reference);
        if let Some(discovery) = self.discoveries.get(name) {
            if let Some(group_key) = discovery.group_id() {
                keys.insert(group_key.to_string());
            }
        }
    }

    /// Groups sources by interval into polling tasks. Public so that
    /// embedders and tests can drive cycles without the scheduler.
    pub fn build_tasks(&self) -> Vec<PollingTask> {
        let shared = Arc::new(TaskShared {
            provider: self.provider.clone(),
            dispatcher: Arc::new(DiscoveryDispatcher::new(
                self.discoveries.clone(),
                self.partition.clone(),
            )),
            notifier: self.notifier.clone(),
            instance_id: self.cfg.instance_id.clone(),
            batch_polled_samples: self.cfg.batch_polled_samples,
        });

        let mut per_interval: BTreeMap<u64, PollingTask> = BTreeMap::new();
        for source in &self.cfg.sources {
            let mut matched: Vec<Arc<dyn Pollster>> = self
                .pollsters
                .iter()
                .filter(|(name, _)| source.matches(name))
                .map(|(_, pollster)| pollster.clone())
                .collect();
            if matched.is_empty() {
                tracing::debug!(source = %source.name, "no pollsters match source");
                continue;
            }
            matched.sort_by(|a, b| a.name().cmp(b.name()));
            per_interval
                .entry(source.interval)
                .or_insert_with(|| PollingTask::new(source.interval, shared.clone()))
                .add_source(Arc::new(source.clone()), matched);
        }
        per_interval.into_values().collect()
    }

    /// One-off discovery outside the polling schedule, for control-plane
    /// callers (operator tooling, readiness probes). Runs with its own
    /// cycle-scoped caches; ownership filtering applies when partitioning
    /// is active.
    pub async fn discover_on_demand(&self, references: &[String]) -> Vec<String> {
        let session = CachedSession::new(self.provider.clone());
        let cache = CycleCache::new();
        let ctx = PollContext {
            cache: &cache,
            session: &session,
        };
        let dispatcher =
            DiscoveryDispatcher::new(self.discoveries.clone(), self.partition.clone());
        let mut discovery_cache = DiscoveryCache::new();
        dispatcher
            .discover(references, &mut discovery_cache, &ctx)
            .await
    }

    pub fn pollster_names(&self) -> Vec<&str> {
        self.pollsters.names()
    }

    pub fn partition_active(&self) -> bool {
        self.partition.is_some()
    }
}

use crate::discovery::{DiscoveryCache, DiscoveryDispatcher};
use crate::identity::{CachedSession, IdentityClientProvider};
use crate::plugin::{CycleCache, PollContext, Pollster};
use crate::resources::ResourceSet;
use crate::source::Source;
use chrono::Utc;
use meterd_notify::{wire, Notifier, SAMPLE_EVENT_TYPE};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::error::PollsterError;

/// Dependencies shared by every polling task of one agent.
pub struct TaskShared {
    pub provider: Arc<dyn IdentityClientProvider>,
    pub dispatcher: Arc<DiscoveryDispatcher>,
    pub notifier: Arc<dyn Notifier>,
    pub instance_id: String,
    pub batch_polled_samples: bool,
}

/// The scheduling unit: every (source, pollster) pair sharing one polling
/// interval, with a [`ResourceSet`] per pair. Created once per distinct
/// interval and driven by the scheduler until the agent stops.
pub struct PollingTask {
    interval_secs: u64,
    shared: Arc<TaskShared>,
    // Each task owns its identity cache: intervals poll concurrently, and
    // the cache's reset-per-cycle contract only holds if no other task
    // can reset it mid-cycle.
    session: CachedSession,
    sources: HashMap<String, Arc<Source>>,
    // BTreeMap so cycles visit sources in a stable order; the per-pollster
    // dedup history relies on sequential processing, not on this order.
    bindings: BTreeMap<String, Vec<Arc<dyn Pollster>>>,
    resources: HashMap<(String, String), ResourceSet>,
}

impl PollingTask {
    pub fn new(interval_secs: u64, shared: Arc<TaskShared>) -> Self {
        let session = CachedSession::new(shared.provider.clone());
        Self {
            interval_secs,
            shared,
            session,
            sources: HashMap::new(),
            bindings: BTreeMap::new(),
            resources: HashMap::new(),
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Binds `pollsters` to `source`, creating one resource entry per new
    /// (source, pollster) pair.
    pub fn add_source(&mut self, source: Arc<Source>, pollsters: Vec<Arc<dyn Pollster>>) {
        for pollster in &pollsters {
            let key = (source.name.clone(), pollster.name().to_string());
            self.resources
                .entry(key)
                .or_insert_with(|| ResourceSet::from_source(&source));
        }
        self.bindings
            .entry(source.name.clone())
            .or_default()
            .extend(pollsters);
        self.sources.insert(source.name.clone(), source);
    }

    pub fn pollsters_for(&self, source: &str) -> Vec<&str> {
        self.bindings
            .get(source)
            .map(|ps| ps.iter().map(|p| p.name()).collect())
            .unwrap_or_default()
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }

    /// Runs one polling cycle: resolve resources per pair, dedupe against
    /// the per-pollster history and blacklist, invoke pollsters with one
    /// shared per-cycle cache, and forward produced samples. A failing
    /// pollster or discovery never aborts the cycle.
    pub async fn poll(&mut self) {
        self.session.reset().await;
        let cache = CycleCache::new();
        let mut discovery_cache = DiscoveryCache::new();
        let mut history: HashMap<String, HashSet<String>> = HashMap::new();
        let mut batch: Vec<Value> = Vec::new();
        let mut destinations: BTreeSet<String> = BTreeSet::new();

        let pairs: Vec<(Arc<Source>, Arc<dyn Pollster>)> = self
            .bindings
            .iter()
            .filter_map(|(name, pollsters)| self.sources.get(name).map(|s| (s, pollsters)))
            .flat_map(|(source, pollsters)| {
                pollsters.iter().map(move |p| (source.clone(), p.clone()))
            })
            .collect();

        for (source, pollster) in pairs {
            let ctx = PollContext {
                cache: &cache,
                session: &self.session,
            };
            let key = (source.name.clone(), pollster.name().to_string());
            let Some(resource_set) = self.resources.get_mut(&key) else {
                continue;
            };

            let mut candidates = resource_set
                .resolve(self.shared.dispatcher.as_ref(), &mut discovery_cache, &ctx)
                .await;
            if candidates.is_empty() {
                if let Some(fallback) = pollster.default_discovery() {
                    candidates = self
                        .shared
                        .dispatcher
                        .discover(std::slice::from_ref(&fallback), &mut discovery_cache, &ctx)
                        .await;
                }
            }

            // Insert-as-we-go so a resource reachable both statically and
            // via discovery is polled once even within one candidate list.
            let seen = history.entry(pollster.name().to_string()).or_default();
            let mut polling_resources = Vec::with_capacity(candidates.len());
            for resource in candidates {
                if seen.insert(resource.clone()) && !resource_set.is_blacklisted(&resource) {
                    polling_resources.push(resource);
                }
            }
            if polling_resources.is_empty() {
                tracing::info!(
                    source = %source.name,
                    pollster = pollster.name(),
                    "no resources to poll"
                );
                continue;
            }

            // One wall-clock timestamp per pollster invocation; every
            // sample it produces shares it.
            let timestamp = Utc::now();
            match pollster.get_samples(&ctx, &polling_resources).await {
                Ok(samples) => {
                    if samples.is_empty() {
                        continue;
                    }
                    let messages: Vec<Value> = samples
                        .into_iter()
                        .map(|mut sample| {
                            sample.timestamp = timestamp;
                            sample.source = source.name.clone();
                            wire::sample_to_message(&sample)
                        })
                        .collect();
                    tracing::debug!(
                        source = %source.name,
                        pollster = pollster.name(),
                        samples = messages.len(),
                        "polled"
                    );
                    if self.shared.batch_polled_samples {
                        destinations.insert(source.destination.clone());
                        batch.extend(messages);
                    } else {
                        let dest = BTreeSet::from([source.destination.clone()]);
                        self.emit(messages, &dest).await;
                    }
                }
                Err(PollsterError::Permanent { resources }) => {
                    let added = resource_set.extend_blacklist(resources);
                    tracing::error!(
                        source = %source.name,
                        pollster = pollster.name(),
                        newly_blacklisted = added,
                        blacklist_size = resource_set.blacklist_len(),
                        "pollster declared resources permanently unpollable"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        source = %source.name,
                        pollster = pollster.name(),
                        error = %e,
                        "pollster failed; continuing with remaining pollsters"
                    );
                }
            }
        }

        if !batch.is_empty() {
            self.emit(batch, &destinations).await;
        }
    }

    async fn emit(&self, messages: Vec<Value>, destinations: &BTreeSet<String>) {
        let mut context = serde_json::Map::new();
        context.insert("instance_id".to_string(), json!(self.shared.instance_id));
        // Destination is only meaningful when the whole flush shares one.
        if destinations.len() == 1 {
            if let Some(dest) = destinations.iter().next() {
                context.insert("destination".to_string(), json!(dest));
            }
        }
        let payload = wire::batch_payload(messages);
        if let Err(e) = self
            .shared
            .notifier
            .notify(&Value::Object(context), SAMPLE_EVENT_TYPE, payload)
            .await
        {
            tracing::error!(error = %e, "failed to deliver sample notification");
        }
    }
}

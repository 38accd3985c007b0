use crate::error::PluginError;
use crate::plugin::{Discovery, Pollster};
use glob_match::glob_match;
use std::collections::HashMap;
use std::sync::Arc;

pub type PollsterFactory = fn() -> Result<Arc<dyn Pollster>, PluginError>;
pub type DiscoveryFactory = fn() -> Result<Arc<dyn Discovery>, PluginError>;

/// Registry of instantiated [`Pollster`]s, keyed by pollster name.
///
/// Built once at startup from per-namespace factory tables. A factory
/// returning [`PluginError::NotLoadable`] is skipped silently; any other
/// factory error is skipped with a warning so one broken plugin never
/// prevents the rest from loading.
pub struct PollsterRegistry {
    pollsters: HashMap<String, Arc<dyn Pollster>>,
}

impl PollsterRegistry {
    pub fn new() -> Self {
        Self {
            pollsters: HashMap::new(),
        }
    }

    pub fn register(&mut self, pollster: Arc<dyn Pollster>) {
        self.pollsters.insert(pollster.name().to_string(), pollster);
    }

    pub fn load(&mut self, namespace: &str, factories: &[(&str, PollsterFactory)]) {
        for (entry, factory) in factories {
            match factory() {
                Ok(pollster) => self.register(pollster),
                Err(PluginError::NotLoadable(reason)) => {
                    tracing::debug!(namespace, pollster = *entry, reason = %reason, "pollster declined to load");
                }
                Err(e) => {
                    tracing::warn!(namespace, pollster = *entry, error = %e, "failed to load pollster");
                }
            }
        }
    }

    /// Drops every pollster whose name matches none of `patterns`.
    pub fn retain_matching(&mut self, patterns: &[String]) {
        self.pollsters
            .retain(|name, _| patterns.iter().any(|p| glob_match(p, name)));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Pollster>> {
        self.pollsters.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Pollster>)> {
        self.pollsters.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.pollsters.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pollsters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pollsters.len()
    }
}

impl Default for PollsterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of instantiated [`Discovery`] plugins, keyed by name. Same
/// loading policy as [`PollsterRegistry`].
pub struct DiscoveryRegistry {
    discoveries: HashMap<String, Arc<dyn Discovery>>,
}

impl DiscoveryRegistry {
    pub fn new() -> Self {
        Self {
            discoveries: HashMap::new(),
        }
    }

    pub fn register(&mut self, discovery: Arc<dyn Discovery>) {
        self.discoveries
            .insert(discovery.name().to_string(), discovery);
    }

    pub fn load(&mut self, namespace: &str, factories: &[(&str, DiscoveryFactory)]) {
        for (entry, factory) in factories {
            match factory() {
                Ok(discovery) => self.register(discovery),
                Err(PluginError::NotLoadable(reason)) => {
                    tracing::debug!(namespace, discovery = *entry, reason = %reason, "discovery declined to load");
                }
                Err(e) => {
                    tracing::warn!(namespace, discovery = *entry, error = %e, "failed to load discovery");
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Discovery>> {
        self.discoveries.get(name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Discovery>)> {
        self.discoveries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.discoveries.is_empty()
    }
}

impl Default for DiscoveryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

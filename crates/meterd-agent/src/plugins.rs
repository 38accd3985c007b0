use crate::discoveries::endpoint::EndpointDiscovery;
use crate::discoveries::local::LocalNodeDiscovery;
use crate::discoveries::static_list::StaticListDiscovery;
use crate::pollsters::heartbeat::HeartbeatPollster;
use crate::pollsters::http::HttpResponseTimePollster;
use meterd_polling::config::PollingConfig;
use meterd_polling::error::PluginError;
use meterd_polling::plugin::{Discovery, Pollster};
use meterd_polling::registry::{
    DiscoveryFactory, DiscoveryRegistry, PollsterFactory, PollsterRegistry,
};
use std::sync::Arc;

/// Builds both registries from the builtin factory tables of every
/// configured namespace.
pub fn load_registries(cfg: &PollingConfig) -> (PollsterRegistry, DiscoveryRegistry) {
    let mut pollsters = PollsterRegistry::new();
    let mut discoveries = DiscoveryRegistry::new();
    for namespace in &cfg.namespaces {
        pollsters.load(namespace, builtin_pollsters(namespace));
        discoveries.load(namespace, builtin_discoveries(namespace));
    }
    tracing::info!(
        pollsters = pollsters.len(),
        namespaces = cfg.namespaces.len(),
        "plugin registries loaded"
    );
    (pollsters, discoveries)
}

fn builtin_pollsters(namespace: &str) -> &'static [(&'static str, PollsterFactory)] {
    match namespace {
        "central" => &[
            ("heartbeat", heartbeat_pollster),
            ("http.response_time", http_response_time_pollster),
        ],
        _ => &[],
    }
}

fn builtin_discoveries(namespace: &str) -> &'static [(&'static str, DiscoveryFactory)] {
    match namespace {
        "central" => &[
            ("static_list", static_list_discovery),
            ("local_node", local_node_discovery),
            ("endpoint", endpoint_discovery),
        ],
        _ => &[],
    }
}

fn heartbeat_pollster() -> Result<Arc<dyn Pollster>, PluginError> {
    Ok(Arc::new(HeartbeatPollster))
}

fn http_response_time_pollster() -> Result<Arc<dyn Pollster>, PluginError> {
    Ok(Arc::new(HttpResponseTimePollster::create()?))
}

fn static_list_discovery() -> Result<Arc<dyn Discovery>, PluginError> {
    Ok(Arc::new(StaticListDiscovery))
}

fn local_node_discovery() -> Result<Arc<dyn Discovery>, PluginError> {
    Ok(Arc::new(LocalNodeDiscovery::new()))
}

fn endpoint_discovery() -> Result<Arc<dyn Discovery>, PluginError> {
    Ok(Arc::new(EndpointDiscovery))
}

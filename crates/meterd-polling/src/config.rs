use crate::source::Source;
use serde::Deserialize;

/// Runtime configuration for the polling engine, assembled by the caller
/// (the agent binary parses its config file into this) and passed into
/// [`AgentManager::new`](crate::manager::AgentManager::new) explicitly.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Member id of this agent process in every partition group.
    pub instance_id: String,
    /// Plugin namespaces to load pollsters/discoveries from.
    pub namespaces: Vec<String>,
    /// Glob patterns restricting which pollsters run. Mutually exclusive
    /// with a coordination backend.
    pub pollster_list: Vec<String>,
    /// Buffer each cycle's samples into one notification per task
    /// invocation instead of one per pollster.
    pub batch_polled_samples: bool,
    /// Upper bound (seconds) of the random extra delay before a polling
    /// task's first run.
    pub shuffle_time_before_polling_task: u64,
    pub coordination: CoordinationConfig,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinationConfig {
    /// Backend URL (e.g. `static://agent-1,agent-2`). `None` disables
    /// partition coordination.
    #[serde(default)]
    pub backend_url: Option<String>,
    /// Operator-supplied suffix appended to the namespace-derived group
    /// prefix, separating independent agent pools sharing one backend.
    #[serde(default)]
    pub partitioning_group_prefix: Option<String>,
}

impl PollingConfig {
    /// Minimal configuration used as a base in tests and by embedders.
    pub fn for_instance(instance_id: &str) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            namespaces: vec!["central".to_string()],
            pollster_list: Vec::new(),
            batch_polled_samples: true,
            shuffle_time_before_polling_task: 0,
            coordination: CoordinationConfig::default(),
            sources: Vec::new(),
        }
    }
}

use meterd_coordination::error::CoordinationError;

/// Identity-service client failures. `Clone` so a failed acquisition can
/// be cached for the rest of the cycle and re-raised without retrying.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("Identity: client unconfigured: {0}")]
    Unconfigured(String),

    #[error("Identity: authentication failed: {0}")]
    Unauthorized(String),

    #[error("Identity: service catalog lookup failed: {0}")]
    Catalog(String),

    #[error("Identity: transport error: {0}")]
    Transport(String),
}

/// Failure of one pollster invocation.
#[derive(Debug, thiserror::Error)]
pub enum PollsterError {
    /// The named resources can never be polled by this pollster; they are
    /// blacklisted for the rest of the process lifetime.
    #[error("permanently unpollable resources: {resources:?}")]
    Permanent { resources: Vec<String> },

    /// Anything else: skipped this cycle, retried on the next tick.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of one discovery invocation.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The identity client was needed and unavailable.
    #[error("Discovery: identity client unavailable: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Outcome of constructing one plugin from its factory.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin declined to load on this host (missing hardware,
    /// unsupported platform). Skipped silently.
    #[error("plugin declined to load: {0}")]
    NotLoadable(String),

    /// Construction failed unexpectedly. Skipped with a warning; the
    /// remaining plugins still load.
    #[error(transparent)]
    Init(#[from] anyhow::Error),
}

/// Structural misconfiguration. Fatal: the agent refuses to start.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// `pollster_list` and a coordination backend are two workload-splitting
    /// mechanisms; combining them risks duplicate or lost samples.
    #[error("Agent: pollster_list and coordination.backend_url are mutually exclusive")]
    IncompatibleWorkloadSplit,

    #[error("Agent: no pollsters available after filtering; refusing to start")]
    NoPollsters,

    #[error("Agent: source '{source_name}' has invalid polling interval {interval}")]
    InvalidInterval { source_name: String, interval: u64 },

    #[error("Agent: coordination failure: {0}")]
    Coordination(#[from] CoordinationError),
}

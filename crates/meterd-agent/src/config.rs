use meterd_polling::config::{CoordinationConfig, PollingConfig};
use meterd_polling::source::Source;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub publisher: PublisherSection,
    #[serde(default)]
    pub identity: IdentitySection,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Deserialize)]
pub struct AgentSection {
    /// Member id of this process in every partition group. Defaults to
    /// the host name, so one agent per host needs no configuration.
    #[serde(default = "default_instance_id")]
    pub instance_id: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            instance_id: default_instance_id(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PollingSection {
    #[serde(default = "default_namespaces")]
    pub namespaces: Vec<String>,
    #[serde(default)]
    pub pollster_list: Vec<String>,
    #[serde(default = "default_true")]
    pub batch_polled_samples: bool,
    #[serde(default)]
    pub shuffle_time_before_polling_task: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            namespaces: default_namespaces(),
            pollster_list: Vec::new(),
            batch_polled_samples: true,
            shuffle_time_before_polling_task: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PublisherSection {
    #[serde(default = "default_publisher_url")]
    pub url: String,
}

impl Default for PublisherSection {
    fn default() -> Self {
        Self {
            url: default_publisher_url(),
        }
    }
}

/// Static identity-service catalog, stand-in for a real identity backend.
#[derive(Debug, Default, Deserialize)]
pub struct IdentitySection {
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpointConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpointConfig {
    pub service_type: String,
    pub url: String,
    #[serde(default)]
    pub region: Option<String>,
}

fn default_instance_id() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "meterd-agent".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_namespaces() -> Vec<String> {
    vec!["central".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_publisher_url() -> String {
    "log://".to_string()
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Assembles the explicit configuration struct the polling engine
    /// takes; nothing in the engine reads this file format directly.
    pub fn polling_config(&self) -> PollingConfig {
        PollingConfig {
            instance_id: self.agent.instance_id.clone(),
            namespaces: self.polling.namespaces.clone(),
            pollster_list: self.polling.pollster_list.clone(),
            batch_polled_samples: self.polling.batch_polled_samples,
            shuffle_time_before_polling_task: self.polling.shuffle_time_before_polling_task,
            coordination: self.coordination.clone(),
            sources: self.sources.clone(),
        }
    }
}

use glob_match::glob_match;
use serde::Deserialize;

/// One configured polling source: which pollsters run, how often, and
/// against which resources. Loaded once from configuration and shared as
/// `Arc<Source>`; never mutated by the polling engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub name: String,
    /// Polling interval in seconds.
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// Glob patterns matched against pollster names.
    #[serde(default = "default_meters")]
    pub meters: Vec<String>,
    /// Static resource identifiers.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Discovery references of the form `scheme[:param]`.
    #[serde(default)]
    pub discovery: Vec<String>,
    /// Destination hint forwarded to the downstream pipeline layer.
    #[serde(default = "default_destination")]
    pub destination: String,
}

impl Source {
    /// Whether this source binds the named pollster.
    pub fn matches(&self, pollster_name: &str) -> bool {
        self.meters.iter().any(|p| glob_match(p, pollster_name))
    }
}

fn default_interval() -> u64 {
    600
}

fn default_meters() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_destination() -> String {
    "samples".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meters_match_by_glob() {
        let source: Source = toml::from_str(
            r#"
            name = "disks"
            interval = 60
            meters = ["disk.*", "hardware.disk.size"]
            "#,
        )
        .unwrap();
        assert!(source.matches("disk.read.bytes"));
        assert!(source.matches("hardware.disk.size"));
        assert!(!source.matches("cpu.util"));
    }

    #[test]
    fn defaults_cover_optional_fields() {
        let source: Source = toml::from_str(r#"name = "everything""#).unwrap();
        assert_eq!(source.interval, 600);
        assert!(source.matches("anything.at.all"));
        assert!(source.resources.is_empty());
        assert!(source.discovery.is_empty());
        assert_eq!(source.destination, "samples");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Measurement semantics of a sample, ordered by how the volume is read.
///
/// # Examples
///
/// ```
/// use meterd_common::types::SampleType;
///
/// let t: SampleType = "gauge".parse().unwrap();
/// assert_eq!(t, SampleType::Gauge);
/// assert_eq!(t.to_string(), "gauge");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleType {
    /// A point-in-time reading (e.g. current CPU utilization).
    Gauge,
    /// A change since the previous reading.
    Delta,
    /// A monotonically increasing total.
    Cumulative,
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleType::Gauge => write!(f, "gauge"),
            SampleType::Delta => write!(f, "delta"),
            SampleType::Cumulative => write!(f, "cumulative"),
        }
    }
}

impl std::str::FromStr for SampleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gauge" => Ok(SampleType::Gauge),
            "delta" => Ok(SampleType::Delta),
            "cumulative" => Ok(SampleType::Cumulative),
            _ => Err(format!("unknown sample type: {s}")),
        }
    }
}

/// One telemetry measurement produced by a pollster.
///
/// `timestamp` and `source` are stamped by the polling task: every sample
/// from one pollster invocation shares the timestamp captured immediately
/// before the invocation, and `source` is the name of the configuration
/// source the pollster was bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Meter name (e.g. `"cpu.util"`, `"http.response_time"`).
    pub name: String,
    #[serde(rename = "type")]
    pub sample_type: SampleType,
    pub unit: String,
    pub volume: f64,
    pub user_id: Option<String>,
    pub project_id: Option<String>,
    pub resource_id: String,
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration the measurement covers, when meaningful.
    pub duration: Option<f64>,
    pub resource_metadata: HashMap<String, serde_json::Value>,
    pub source: String,
}

impl Sample {
    /// Builds a gauge sample for `resource_id`. Timestamp and source are
    /// placeholders until the polling task stamps them.
    pub fn gauge(name: &str, unit: &str, volume: f64, resource_id: &str) -> Self {
        Self {
            name: name.to_string(),
            sample_type: SampleType::Gauge,
            unit: unit.to_string(),
            volume,
            user_id: None,
            project_id: None,
            resource_id: resource_id.to_string(),
            timestamp: Utc::now(),
            duration: None,
            resource_metadata: HashMap::new(),
            source: String::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.resource_metadata.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_type_round_trips_through_str() {
        for t in [SampleType::Gauge, SampleType::Delta, SampleType::Cumulative] {
            let parsed: SampleType = t.to_string().parse().unwrap();
            assert_eq!(parsed, t);
        }
        assert!("bogus".parse::<SampleType>().is_err());
    }

    #[test]
    fn gauge_builder_fills_identity_fields() {
        let s = Sample::gauge("heartbeat", "beat", 1.0, "node-1")
            .with_metadata("zone", serde_json::json!("az1"));
        assert_eq!(s.name, "heartbeat");
        assert_eq!(s.sample_type, SampleType::Gauge);
        assert_eq!(s.resource_id, "node-1");
        assert_eq!(s.resource_metadata["zone"], "az1");
        assert!(s.source.is_empty());
    }
}

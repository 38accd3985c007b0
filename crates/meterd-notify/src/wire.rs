use meterd_common::id;
use meterd_common::types::Sample;
use serde_json::{json, Value};

/// Converts a sample into the canonical wire message consumed by the
/// downstream pipeline layer. Adds a process-unique `message_id`; the
/// timestamp is serialized as RFC 3339.
pub fn sample_to_message(sample: &Sample) -> Value {
    json!({
        "message_id": id::next_id(),
        "source": sample.source,
        "name": sample.name,
        "type": sample.sample_type.to_string(),
        "unit": sample.unit,
        "volume": sample.volume,
        "user_id": sample.user_id,
        "project_id": sample.project_id,
        "resource_id": sample.resource_id,
        "timestamp": sample.timestamp.to_rfc3339(),
        "duration": sample.duration,
        "resource_metadata": sample.resource_metadata,
    })
}

/// Wraps wire messages into the notification payload envelope.
pub fn batch_payload(messages: Vec<Value>) -> Value {
    json!({ "samples": messages })
}

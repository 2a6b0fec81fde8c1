//! Envelope adapter for OpenCode's SDK event stream.
//!
//! The SDK/server event bus publishes the same information as the CLI's JSON
//! output, but in a dotted, nested envelope:
//!
//! ```json
//! {"type": "message.step.finished", "properties": {"part": {"reason": "stop"}}}
//! ```
//!
//! This module rewrites those envelopes into the CLI's primary shape
//! (`{"type": "step_finish", "part": {...}}`) so the parser only has to deal
//! with one shape per concept.

use serde_json::Value;

/// Map a dotted SDK event type to its primary equivalent.
fn primary_type(event_type: &str) -> Option<&'static str> {
    match event_type {
        "message.part.updated" => Some("tool_use"),
        "message.step.started" => Some("step_start"),
        "message.step.finished" => Some("step_finish"),
        _ => None,
    }
}

/// Rewrite a known alternate envelope into primary shape.
///
/// Values that are not objects, or whose `type` is not a known alternate,
/// are returned unchanged.
pub fn normalize_shape(mut value: Value) -> Value {
    let Some(envelope) = value.as_object_mut() else {
        return value;
    };
    let Some(primary) = envelope
        .get("type")
        .and_then(Value::as_str)
        .and_then(primary_type)
    else {
        return value;
    };

    envelope.insert("type".to_string(), Value::String(primary.to_string()));
    if let Some(Value::Object(mut properties)) = envelope.remove("properties") {
        if let Some(part) = properties.remove("part") {
            envelope.insert("part".to_string(), part);
        }
    }

    value
}

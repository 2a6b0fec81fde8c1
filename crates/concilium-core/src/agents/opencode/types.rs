//! OpenCode JSON event types.
//!
//! `opencode run --format json` prints one JSON object per line. After the
//! shape adapter has run, every line looks like:
//!
//! ```json
//! {"type": "tool_use", "part": {"tool": "bash", "state": {"status": "completed", "input": {"command": "ls"}}}}
//! {"type": "step_finish", "part": {"reason": "stop", "tokens": {"input": 10, "output": 4}, "cost": 0.001}}
//! {"type": "error", "message": "API rate limit exceeded"}
//! ```
//!
//! Fields whose shape varies between OpenCode releases (token counts, cost,
//! tool input, error payloads) are kept as `serde_json::Value` and read
//! leniently.

use serde::Deserialize;
use serde_json::Value;

/// A single OpenCode event in primary envelope shape.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenCodeEvent {
    /// Event type: `step_start`, `tool_use`, `step_finish`, `reasoning`,
    /// `text`, `error`, or anything newer.
    #[serde(rename = "type")]
    pub event_type: String,

    /// The payload for part-based events.
    #[serde(default)]
    pub part: Option<OpenCodePart>,

    /// Error message for `error` events.
    #[serde(default)]
    pub message: Option<Value>,

    /// Structured error for `error` events (`{"name", "data": {"message"}}`).
    #[serde(default)]
    pub error: Option<Value>,

    /// Top-level text, used by some unknown event types.
    #[serde(default)]
    pub text: Option<String>,
}

/// The `part` payload of an event.
///
/// All fields are optional: a `step_start` part is usually `{}` while a
/// `step_finish` part carries reason, tokens and cost.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenCodePart {
    /// The part's own type tag (`"tool"`, `"text"`, `"step-finish"`, ...).
    #[serde(rename = "type", default)]
    pub part_type: Option<String>,

    /// Text for `text` and `reasoning` parts.
    #[serde(default)]
    pub text: Option<String>,

    /// Tool name for `tool_use` parts: "bash", "read", "grep", ...
    #[serde(default)]
    pub tool: Option<String>,

    /// Tool execution state for `tool_use` parts.
    #[serde(default)]
    pub state: Option<ToolState>,

    /// Why a step finished (older field name).
    #[serde(default)]
    pub finish_reason: Option<String>,

    /// Why a step finished (current field name).
    #[serde(default)]
    pub reason: Option<String>,

    /// `{"input", "output", "reasoning", "cache": {...}}` on `step_finish`.
    #[serde(default)]
    pub tokens: Option<Value>,

    /// Step cost in USD on `step_finish`.
    #[serde(default)]
    pub cost: Option<Value>,
}

/// Tool execution state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolState {
    /// `"pending"`, `"running"`, `"completed"` or `"error"`.
    #[serde(default)]
    pub status: Option<String>,

    /// Human-readable summary OpenCode computes once the tool is known,
    /// e.g. "Running npm install".
    #[serde(default)]
    pub title: Option<String>,

    /// Tool arguments. Structure varies by tool.
    #[serde(default)]
    pub input: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tool_use_event() {
        let json = r#"{
            "type": "tool_use",
            "part": {
                "tool": "bash",
                "state": {"status": "running", "title": "List files", "input": {"command": "ls"}}
            }
        }"#;

        let event: OpenCodeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "tool_use");
        let part = event.part.unwrap();
        assert_eq!(part.tool.as_deref(), Some("bash"));
        let state = part.state.unwrap();
        assert_eq!(state.status.as_deref(), Some("running"));
        assert_eq!(state.title.as_deref(), Some("List files"));
        assert_eq!(state.input.unwrap()["command"], "ls");
    }

    #[test]
    fn parse_empty_part() {
        let event: OpenCodeEvent =
            serde_json::from_str(r#"{"type":"step_start","part":{}}"#).unwrap();
        let part = event.part.unwrap();
        assert!(part.text.is_none());
        assert!(part.state.is_none());
    }

    #[test]
    fn parse_step_finish_event() {
        let json = r#"{"type":"step_finish","part":{"type":"step-finish","reason":"stop","tokens":{"input":5},"cost":0.01}}"#;
        let event: OpenCodeEvent = serde_json::from_str(json).unwrap();
        let part = event.part.unwrap();
        assert_eq!(part.part_type.as_deref(), Some("step-finish"));
        assert_eq!(part.reason.as_deref(), Some("stop"));
        assert!(part.finish_reason.is_none());
        assert!(part.tokens.is_some());
    }

    #[test]
    fn parse_error_event_without_part() {
        let event: OpenCodeEvent =
            serde_json::from_str(r#"{"type":"error","message":"boom"}"#).unwrap();
        assert!(event.part.is_none());
        assert_eq!(event.message.unwrap(), "boom");
    }

    #[test]
    fn missing_type_fails() {
        assert!(serde_json::from_str::<OpenCodeEvent>(r#"{"part":{}}"#).is_err());
    }
}

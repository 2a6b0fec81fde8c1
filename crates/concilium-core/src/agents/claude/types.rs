//! Claude-specific JSON types for stream parsing.
//!
//! # Purpose
//!
//! This module defines Rust structs that mirror the JSON Claude prints with
//! `--output-format stream-json --verbose`. Each line of output is one
//! `ClaudeStreamEvent`.
//!
//! # Example
//!
//! Claude outputs:
//! ```json
//! {"type":"assistant","message":{"content":[...],"stop_reason":"tool_use","usage":{...}}}
//! ```
//!
//! This becomes a `ClaudeStreamEvent` with:
//! - `event_type = "assistant"`
//! - `message = Some(AssistantMessage { ... })`
//!
//! Usage and cost are kept as raw `serde_json::Value`s. Claude has changed
//! the exact set of usage fields several times, and [`crate::usage`] reads
//! them leniently.

use serde::Deserialize;
use serde_json::Value;

/// A Claude stream event.
///
/// This is the top-level structure for all events from Claude.
/// Different event types populate different optional fields.
///
/// # Rust Concept: Serde Field Attributes
///
/// - `#[serde(rename = "type")]`: JSON key is "type", Rust field is `event_type`
///   (`type` is a reserved keyword in Rust)
///
/// - `#[serde(default)]`: If the JSON key is missing, use Default::default()
///   For Option<T>, default is None. Without this, a missing key would make
///   the whole line fail to parse.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaudeStreamEvent {
    /// The event type ("system", "assistant", "result", "stream_event", ...)
    #[serde(rename = "type")]
    pub event_type: String,

    /// Subtype ("init" for system, "success" / "error" for result).
    #[serde(default)]
    pub subtype: Option<String>,

    /// Assistant message with content blocks.
    #[serde(default)]
    pub message: Option<AssistantMessage>,

    /// Final answer text on `result` events.
    #[serde(default)]
    pub result: Option<String>,

    /// Run-total usage on `result` events.
    #[serde(default)]
    pub usage: Option<Value>,

    /// Run-total cost on `result` events.
    #[serde(default)]
    pub total_cost_usd: Option<Value>,

    /// Older name for `total_cost_usd`.
    #[serde(default)]
    pub cost_usd: Option<Value>,

    /// Raw API streaming event, present on `stream_event` lines
    /// (only with `--include-partial-messages`).
    #[serde(default)]
    pub event: Option<StreamEvent>,
}

/// Assistant message with content blocks.
///
/// One `assistant` line is emitted per model turn. The `content` array can
/// mix thinking, text and tool_use blocks.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    /// Content blocks in this message.
    #[serde(default)]
    pub content: Vec<ContentBlock>,

    /// Why the turn ended: "tool_use", "end_turn", "max_tokens", ...
    #[serde(default)]
    pub stop_reason: Option<String>,

    /// Per-turn usage.
    #[serde(default)]
    pub usage: Option<Value>,
}

/// A content block in a message (text, thinking, tool_use).
///
/// # Rust Concept: Optional Fields
///
/// Different block types have different fields:
/// - text block: only `text` is set
/// - thinking block: only `thinking` is set
/// - tool_use block: `id`, `name`, and `input` are set
///
/// All type-specific fields are Optional so one struct handles every case.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    /// The block type ("text", "thinking", "tool_use").
    #[serde(rename = "type")]
    pub block_type: String,

    /// Text content (for "text" blocks).
    #[serde(default)]
    pub text: Option<String>,

    /// Thinking content (for "thinking" blocks).
    #[serde(default)]
    pub thinking: Option<String>,

    /// Block ID (for "tool_use" blocks).
    #[serde(default)]
    pub id: Option<String>,

    /// Tool name (for "tool_use" blocks), e.g. "Read", "Grep", "Bash".
    #[serde(default)]
    pub name: Option<String>,

    /// Tool input (for "tool_use" blocks). Structure varies by tool.
    #[serde(default)]
    pub input: Option<Value>,
}

/// The API event wrapped by a `stream_event` line.
///
/// ```json
/// {"type":"stream_event","event":{"type":"content_block_delta","delta":{"type":"text_delta","text":"Hel"}}}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StreamEvent {
    /// "message_start", "content_block_start", "content_block_delta",
    /// "message_delta", ...
    #[serde(rename = "type")]
    pub event_type: String,

    /// The block being opened (for "content_block_start").
    #[serde(default)]
    pub content_block: Option<ContentBlock>,

    /// The incremental change (for "content_block_delta" and "message_delta").
    #[serde(default)]
    pub delta: Option<Delta>,
}

/// Delta for streaming updates.
///
/// Content block deltas carry a `type` ("text_delta", "input_json_delta",
/// "thinking_delta") and a payload. Message deltas carry no type, only a
/// `stop_reason`.
#[derive(Debug, Clone, Deserialize)]
pub struct Delta {
    #[serde(rename = "type", default)]
    pub delta_type: Option<String>,

    /// The text chunk for text deltas.
    #[serde(default)]
    pub text: Option<String>,

    /// Stop reason for message deltas.
    #[serde(default)]
    pub stop_reason: Option<String>,
}

// ============================================================================
// TESTS
// ============================================================================

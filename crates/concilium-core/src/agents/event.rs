//! Canonical event type shared by all agent parsers.

use serde::{Deserialize, Serialize};

/// Kind of a normalized transcript event.
///
/// Serialized as snake_case (`"tool_call"`, `"status"`, ...) because the
/// renderer switches on these exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Progress or lifecycle information ("Step started", "Run failed").
    Status,
    /// The agent invoked a tool.
    ToolCall,
    /// Assistant-visible text.
    Text,
    /// Extended reasoning output.
    Thinking,
    /// Unstructured output passed through as-is.
    Raw,
}

/// Token counts and cost reported alongside an event.
///
/// Counts are unsigned so they can never go negative. `total_cost` is `None`
/// when the agent did not report a cost for the line; it is still serialized
/// (as `null`) so the renderer can tell "free" from "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_cost: Option<f64>,
}

/// A single normalized event emitted for one line of agent output.
///
/// This is the core abstraction that lets the transcript view treat Claude,
/// OpenCode, Codex and any other agent the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEvent {
    pub event_type: EventType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// Set on run totals, as opposed to per-turn usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage_cumulative: Option<bool>,
}

impl ParsedEvent {
    pub fn new(event_type: EventType, text: impl Into<String>) -> Self {
        Self {
            event_type,
            text: text.into(),
            token_usage: None,
            token_usage_cumulative: None,
        }
    }

    pub fn status(text: impl Into<String>) -> Self {
        Self::new(EventType::Status, text)
    }

    pub fn tool_call(text: impl Into<String>) -> Self {
        Self::new(EventType::ToolCall, text)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(EventType::Text, text)
    }

    pub fn thinking(text: impl Into<String>) -> Self {
        Self::new(EventType::Thinking, text)
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(EventType::Raw, text)
    }

    /// Attach per-turn usage.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.token_usage = Some(usage);
        self
    }

    /// Attach run-total usage and mark it cumulative.
    pub fn with_cumulative_usage(mut self, usage: TokenUsage) -> Self {
        self.token_usage = Some(usage);
        self.token_usage_cumulative = Some(true);
        self
    }
}

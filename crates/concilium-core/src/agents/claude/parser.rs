//! Claude stream parser.
//!
//! Translates one line of Claude's stream-json output into [`ParsedEvent`]s.
//!
//! # How This Parser Works
//!
//! 1. Deserialize the line into a [`ClaudeStreamEvent`]
//! 2. Dispatch on `type`:
//!    - `system`: session setup, nothing to show
//!    - `assistant`: one complete model turn, expanded block by block
//!    - `result`: the final answer plus run-total usage
//!    - `stream_event`: partial-message deltas
//! 3. Anything that isn't valid Claude JSON goes to the raw fallback
//!
//! # Why Text Blocks Are Skipped
//!
//! With `--print`, the final answer arrives twice: once as text blocks in the
//! last `assistant` turn and again as the `result` string. Only the `result`
//! is rendered; in-progress text is covered by `text_delta` stream events.

use serde_json::Value;

use crate::agents::event::ParsedEvent;
use crate::agents::raw;
use crate::usage;

use super::types::{AssistantMessage, ClaudeStreamEvent, StreamEvent};

/// Status shown while Claude waits on tool results.
const EXECUTING_TOOLS: &str = "Executing tools...";

/// Parse a single line of Claude output.
pub fn parse_line(line: &str) -> Vec<ParsedEvent> {
    let event: ClaudeStreamEvent = match serde_json::from_str(line.trim()) {
        Ok(e) => e,
        Err(_) => return raw::parse_line(line),
    };

    match event.event_type.as_str() {
        "system" => Vec::new(),
        "assistant" => translate_assistant(event.message.as_ref()),
        "result" => vec![translate_result(&event)],
        "stream_event" => event
            .event
            .as_ref()
            .map(translate_stream_event)
            .unwrap_or_default(),
        _ => raw::parse_line(line),
    }
}

/// Expand an assistant turn into thinking / tool_call events.
///
/// Tool and thinking activity is followed by a single status event that
/// carries the turn's usage. A turn with nothing to show collapses into one
/// status event.
fn translate_assistant(message: Option<&AssistantMessage>) -> Vec<ParsedEvent> {
    let mut events = Vec::new();

    let Some(message) = message else {
        return vec![ParsedEvent::status("Processing...")];
    };

    for block in &message.content {
        match block.block_type.as_str() {
            "thinking" => {
                events.push(ParsedEvent::thinking(
                    block.thinking.clone().unwrap_or_default(),
                ));
            }
            "tool_use" => {
                let name = block.name.as_deref().unwrap_or("unknown");
                events.push(ParsedEvent::tool_call(tool_call_text(
                    name,
                    block.input.as_ref(),
                )));
            }
            // "text" is rendered from the result event instead
            _ => {}
        }
    }

    if events.is_empty() {
        let text = match message.stop_reason.as_deref() {
            Some(reason) if !reason.is_empty() => format!("Turn completed ({reason})"),
            _ => "Processing...".to_string(),
        };
        return vec![ParsedEvent::status(text)];
    }

    // Cost is only known once the run finishes.
    let turn_usage = usage::from_claude(message.usage.as_ref(), None);
    events.push(ParsedEvent::status(EXECUTING_TOOLS).with_usage(turn_usage));
    events
}

/// The final result of a run. Its usage is the authoritative run total.
fn translate_result(event: &ClaudeStreamEvent) -> ParsedEvent {
    let cost = event.total_cost_usd.as_ref().or(event.cost_usd.as_ref());
    let run_usage = usage::from_claude(event.usage.as_ref(), cost);

    let failed = event
        .subtype
        .as_deref()
        .is_some_and(|s| s == "error" || s.starts_with("error_"));

    let parsed = if failed {
        ParsedEvent::status("Run failed")
    } else {
        ParsedEvent::text(event.result.clone().unwrap_or_default())
    };
    parsed.with_cumulative_usage(run_usage)
}

fn translate_stream_event(stream: &StreamEvent) -> Vec<ParsedEvent> {
    match stream.event_type.as_str() {
        "content_block_start" => match &stream.content_block {
            Some(block) if block.block_type == "tool_use" => {
                let name = block.name.as_deref().unwrap_or("unknown");
                vec![ParsedEvent::tool_call(format!("Tool: {name}"))]
            }
            _ => Vec::new(),
        },

        "content_block_delta" => match &stream.delta {
            Some(delta) if delta.delta_type.as_deref() == Some("text_delta") => {
                vec![ParsedEvent::text(delta.text.clone().unwrap_or_default())]
            }
            _ => Vec::new(),
        },

        "message_delta" => match &stream.delta {
            Some(delta) if delta.stop_reason.as_deref() == Some("tool_use") => {
                vec![ParsedEvent::status(EXECUTING_TOOLS)]
            }
            _ => Vec::new(),
        },

        // message_start, content_block_stop, message_stop, ping, ...
        _ => Vec::new(),
    }
}

/// `Tool: <name>` followed by the compact JSON input, if any.
fn tool_call_text(name: &str, input: Option<&Value>) -> String {
    let has_input = match input {
        None | Some(Value::Null) => false,
        Some(Value::Object(map)) => !map.is_empty(),
        Some(_) => true,
    };

    match input {
        Some(value) if has_input => format!("Tool: {name} {value}"),
        _ => format!("Tool: {name}"),
    }
}

// ============================================================================
// TESTS
// ============================================================================

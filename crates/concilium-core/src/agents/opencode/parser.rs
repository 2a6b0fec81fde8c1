//! OpenCode line parser.
//!
//! Translates one line of `opencode run --format json` output into
//! [`ParsedEvent`]s. The pipeline per line is:
//!
//! 1. JSON-decode (non-JSON lines only matter if they are share links)
//! 2. [`normalize_shape`] rewrites SDK envelopes into the primary shape
//! 3. Deserialize into [`OpenCodeEvent`] and translate by `type`

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::agents::event::ParsedEvent;
use crate::agents::raw;
use crate::usage;

use super::shape::normalize_shape;
use super::types::{OpenCodeEvent, OpenCodePart};

/// OpenCode prints the session share URL on its own line, outside JSON.
static SHARE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:opncd\.ai/share|(?:www\.)?opencode\.ai/s)/[A-Za-z0-9_-]+/?$")
        .unwrap()
});

/// Tool input keys shown next to a tool call, in priority order.
const PRIMARY_INPUT_KEYS: &[&str] = &["command", "file_path", "filePath", "pattern", "path", "url"];

/// Parse a single line of OpenCode output.
pub fn parse_line(line: &str) -> Vec<ParsedEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return parse_plain_line(trimmed),
    };

    match serde_json::from_value::<OpenCodeEvent>(normalize_shape(value)) {
        Ok(event) => translate_event(&event),
        Err(_) => raw::parse_line(line),
    }
}

/// Non-JSON output: only share links are surfaced.
fn parse_plain_line(line: &str) -> Vec<ParsedEvent> {
    if SHARE_LINK_RE.is_match(line) {
        vec![ParsedEvent::status(format!("Share link: {line}"))]
    } else {
        Vec::new()
    }
}

fn translate_event(event: &OpenCodeEvent) -> Vec<ParsedEvent> {
    let default_part = OpenCodePart::default();
    let part = event.part.as_ref().unwrap_or(&default_part);

    let parsed = match event.event_type.as_str() {
        "step_start" => ParsedEvent::status("Step started"),

        "tool_use" => ParsedEvent::tool_call(tool_call_text(part)),

        "step_finish" => {
            let reason = non_empty(part.finish_reason.as_deref())
                .or_else(|| non_empty(part.reason.as_deref()));
            let text = match reason {
                Some(reason) => format!("Step completed ({reason})"),
                None => "Step completed".to_string(),
            };

            let status = ParsedEvent::status(text);
            if part.tokens.is_some() || part.cost.is_some() {
                status.with_usage(usage::from_opencode(part.tokens.as_ref(), part.cost.as_ref()))
            } else {
                status
            }
        }

        "reasoning" => ParsedEvent::thinking(part.text.clone().unwrap_or_default()),

        "text" => ParsedEvent::text(part.text.clone().unwrap_or_default()),

        "error" => ParsedEvent::raw(format!("Error: {}", error_message(event))),

        other => {
            let content = non_empty(part.text.as_deref())
                .or_else(|| non_empty(event.text.as_deref()));
            match content {
                Some(text) => ParsedEvent::text(text),
                None => ParsedEvent::status(format!("[{other}]")),
            }
        }
    };

    vec![parsed]
}

/// Build the display text for a tool call.
///
/// Title wins over everything (even while running). Without a title, a
/// settled status is shown in parentheses after the tool name.
fn tool_call_text(part: &OpenCodePart) -> String {
    let tool = non_empty(part.tool.as_deref()).unwrap_or("tool");
    let state = part.state.as_ref();
    let title = state.and_then(|s| non_empty(s.title.as_deref()));
    let status = state.and_then(|s| non_empty(s.status.as_deref()));
    let primary = state
        .and_then(|s| s.input.as_ref())
        .and_then(primary_input);

    let label = match (title, status) {
        (Some(title), _) => title.to_string(),
        (None, Some(status)) if status != "running" => format!("{tool} ({status})"),
        _ => tool.to_string(),
    };

    match primary {
        Some(value) => format!("{label}: {value}"),
        None => label,
    }
}

/// First non-empty string among [`PRIMARY_INPUT_KEYS`].
fn primary_input(input: &Value) -> Option<&str> {
    PRIMARY_INPUT_KEYS
        .iter()
        .find_map(|key| non_empty(input.get(*key).and_then(Value::as_str)))
}

fn error_message(event: &OpenCodeEvent) -> String {
    let from_message = event.message.as_ref().and_then(Value::as_str);
    let from_error = event.error.as_ref().and_then(|error| {
        error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.pointer("/data/message").and_then(Value::as_str))
            .or_else(|| error.as_str())
    });

    non_empty(from_message)
        .or_else(|| non_empty(from_error))
        .unwrap_or("unknown error")
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

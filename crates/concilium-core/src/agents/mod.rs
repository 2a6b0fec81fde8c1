//! Agent output normalization.
//!
//! Every agent CLI prints its own protocol on stdout. This module turns one
//! line of that output into zero or more [`ParsedEvent`]s:
//!
//! ```text
//! stdout line ──► parse_event_line(kind, line)
//!                   ├─ Claude   → claude::parse_line   (stream-json)
//!                   ├─ OpenCode → opencode::parse_line (JSON + SDK envelopes)
//!                   └─ others   → raw::parse_line      (plain text)
//! ```
//!
//! Parsing is pure and total: the same line always produces the same events
//! and malformed input degrades to a fallback instead of an error.

pub mod claude;
pub mod event;
pub mod opencode;
pub mod raw;
pub mod stream;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use event::{EventType, ParsedEvent, TokenUsage};
pub use stream::StreamNormalizer;

/// A line parser for one agent protocol.
pub type LineParser = fn(&str) -> Vec<ParsedEvent>;

/// Which agent produced a stream.
///
/// Known agents with a structured protocol get their own variant. Anything
/// else is an [`AgentKind::Other`] and is treated as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgentKind {
    Claude,
    OpenCode,
    Codex,
    /// An agent without a dedicated variant. Build it through `From`/`FromStr`
    /// so known names map to their variant; a known name held here still
    /// dispatches to that agent's parser.
    Other(String),
}

impl AgentKind {
    pub fn as_str(&self) -> &str {
        match self {
            AgentKind::Claude => "claude",
            AgentKind::OpenCode => "opencode",
            AgentKind::Codex => "codex",
            AgentKind::Other(name) => name,
        }
    }

    /// The parser for this agent's stdout protocol.
    pub fn line_parser(&self) -> LineParser {
        match self {
            AgentKind::Claude => claude::parse_line,
            AgentKind::OpenCode => opencode::parse_line,
            AgentKind::Codex => raw::parse_line,
            AgentKind::Other(name) => match AgentKind::from(name.as_str()) {
                AgentKind::Other(_) => raw::parse_line,
                known => known.line_parser(),
            },
        }
    }
}

impl FromStr for AgentKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Ok(match name.to_ascii_lowercase().as_str() {
            "claude" => AgentKind::Claude,
            "opencode" => AgentKind::OpenCode,
            "codex" => AgentKind::Codex,
            _ => AgentKind::Other(name.to_string()),
        })
    }
}

impl From<&str> for AgentKind {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<String> for AgentKind {
    fn from(s: String) -> Self {
        AgentKind::from(s.as_str())
    }
}

impl From<AgentKind> for String {
    fn from(kind: AgentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize one line of agent output.
///
/// Blank lines never produce events, whatever the agent.
pub fn parse_event_line(kind: &AgentKind, line: &str) -> Vec<ParsedEvent> {
    if line.trim().is_empty() {
        return Vec::new();
    }
    (kind.line_parser())(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE_LINES: &[&str] = &[
        "",
        "   ",
        "\t\r",
        "not json at all",
        "{\"type\":",
        "{}",
        "[]",
        "null",
        "42",
        r#"{"type":null}"#,
        r#"{"type":"assistant","message":{"content":"oops"}}"#,
        r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":7}]}}"#,
        r#"{"type":"step_finish","part":{"tokens":{"input":-1,"output":"x"},"cost":"free"}}"#,
        r#"{"type":"message.part.updated","properties":"nope"}"#,
        r#"{"type":"stream_event","event":{"type":"content_block_delta"}}"#,
        r#"{"type":"result","subtype":"error","usage":null}"#,
        "\u{1b}[31m\u{1b}[0m",
        "https://opncd.ai/share/abc",
    ];

    fn all_kinds() -> Vec<AgentKind> {
        vec![
            AgentKind::Claude,
            AgentKind::OpenCode,
            AgentKind::Codex,
            AgentKind::Other("gemini".to_string()),
        ]
    }

    mod agent_kind {
        use super::*;

        #[test]
        fn parses_known_names() {
            assert_eq!(AgentKind::from("claude"), AgentKind::Claude);
            assert_eq!(AgentKind::from("OpenCode"), AgentKind::OpenCode);
            assert_eq!(AgentKind::from(" codex "), AgentKind::Codex);
        }

        #[test]
        fn keeps_unknown_names() {
            assert_eq!(
                AgentKind::from("gemini"),
                AgentKind::Other("gemini".to_string())
            );
            assert_eq!(AgentKind::from("gemini").to_string(), "gemini");
        }

        #[test]
        fn serializes_as_string() {
            assert_eq!(serde_json::to_value(AgentKind::OpenCode).unwrap(), json!("opencode"));
            let kind: AgentKind = serde_json::from_value(json!("claude")).unwrap();
            assert_eq!(kind, AgentKind::Claude);
        }

        #[test]
        fn known_name_in_other_uses_its_parser() {
            let line = r#"{"type":"result","subtype":"error"}"#;
            let kind = AgentKind::Other("Claude".to_string());

            assert_eq!(kind.line_parser()(line), claude::parse_line(line));
            assert_eq!(parse_event_line(&kind, line)[0].text, "Run failed");
        }

        #[test]
        fn text_agents_share_the_raw_parser() {
            let codex = AgentKind::Codex.line_parser();
            let other = AgentKind::Other("x".to_string()).line_parser();
            assert_eq!(codex("hi"), other("hi"));
        }
    }

    mod totality {
        use super::*;

        #[test]
        fn blank_lines_yield_nothing() {
            for kind in all_kinds() {
                assert!(parse_event_line(&kind, "").is_empty());
                assert!(parse_event_line(&kind, "   ").is_empty());
                assert!(parse_event_line(&kind, "\n").is_empty());
            }
        }

        #[test]
        fn every_sample_parses_without_panicking() {
            for kind in all_kinds() {
                for line in SAMPLE_LINES {
                    let _ = parse_event_line(&kind, line);
                }
            }
        }

        #[test]
        fn parsing_is_deterministic() {
            for kind in all_kinds() {
                for line in SAMPLE_LINES {
                    assert_eq!(
                        parse_event_line(&kind, line),
                        parse_event_line(&kind, line),
                        "{kind}: {line:?}"
                    );
                }
            }
        }

        #[test]
        fn cost_only_appears_with_a_cost_source() {
            for kind in all_kinds() {
                for line in SAMPLE_LINES {
                    for event in parse_event_line(&kind, line) {
                        if let Some(usage) = event.token_usage {
                            assert!(usage.total_cost.is_none(), "{kind}: {line:?}");
                        }
                    }
                }
            }
        }
    }

    mod scenarios {
        use super::*;

        #[test]
        fn opencode_step_start() {
            let events = parse_event_line(&AgentKind::OpenCode, r#"{"type":"step_start","part":{}}"#);
            assert_eq!(events, vec![ParsedEvent::status("Step started")]);
        }

        #[test]
        fn opencode_step_finish_usage() {
            let line = r#"{"type":"step_finish","part":{"finish_reason":"tool-calls","tokens":{"input":1000,"output":500,"reasoning":200},"cost":0.05}}"#;
            let events = parse_event_line(&AgentKind::OpenCode, line);

            assert_eq!(
                events,
                vec![ParsedEvent::status("Step completed (tool-calls)").with_usage(TokenUsage {
                    input_tokens: 1000,
                    output_tokens: 700,
                    total_cost: Some(0.05),
                })]
            );
        }

        #[test]
        fn claude_two_tools_then_status() {
            let line = json!({
                "type": "assistant",
                "message": {
                    "content": [
                        {"type": "tool_use", "name": "Read", "input": {"file_path": "a"}},
                        {"type": "tool_use", "name": "Bash", "input": {"command": "ls"}}
                    ],
                    "usage": {"input_tokens": 1000, "output_tokens": 200}
                }
            })
            .to_string();
            let events = parse_event_line(&AgentKind::Claude, &line);

            assert_eq!(events.len(), 3);
            assert_eq!(events[0].event_type, EventType::ToolCall);
            assert_eq!(events[1].event_type, EventType::ToolCall);
            assert_eq!(
                events[2],
                ParsedEvent::status("Executing tools...").with_usage(TokenUsage {
                    input_tokens: 1000,
                    output_tokens: 200,
                    total_cost: None,
                })
            );
        }

        #[test]
        fn claude_run_failed() {
            let events =
                parse_event_line(&AgentKind::Claude, r#"{"type":"result","subtype":"error"}"#);
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event_type, EventType::Status);
            assert_eq!(events[0].text, "Run failed");
            assert_eq!(events[0].token_usage_cumulative, Some(true));
        }

        #[test]
        fn ansi_stripped_for_unknown_agent() {
            let kind = AgentKind::from("codex");
            let events = parse_event_line(&kind, "\u{1b}[32mGreen text\u{1b}[0m");
            assert_eq!(events, vec![ParsedEvent::raw("Green text")]);
        }

        #[test]
        fn dotted_step_finished() {
            let line = r#"{"type":"message.step.finished","properties":{"part":{"finish_reason":"stop","tokens":{"input":100,"output":50}}}}"#;
            let events = parse_event_line(&AgentKind::OpenCode, line);
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].event_type, EventType::Status);
            assert_eq!(events[0].text, "Step completed (stop)");
        }
    }
}

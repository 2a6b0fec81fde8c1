//! # concilium-core
//!
//! Core logic for Concilium, a multi-agent planning council.
//!
//! This crate is framework-agnostic and can be used by:
//! - the desktop shell (via its IPC layer)
//! - the `concilium` command-line launcher
//!
//! ## Key Concepts
//!
//! - **ParsedEvent**: Unified event type across all agent output protocols
//! - **StreamNormalizer**: Line buffering and usage tracking for one agent stream
//! - **CommandSpec**: Program, arguments and environment for an agent run
//! - **AgentProcess**: A running agent whose stdout is normalized as it arrives

pub mod agents;
pub mod command;
pub mod spawn;
pub mod usage;

// Re-export commonly used types
pub use agents::claude::{build_claude_command, ClaudePlanConfig};
pub use agents::{parse_event_line, AgentKind, EventType, ParsedEvent, StreamNormalizer, TokenUsage};
pub use command::{merged_env, wrap_prompt_for_research, CommandSpec};
pub use spawn::{AgentExit, AgentProcess, ProcessEvent, SpawnError};

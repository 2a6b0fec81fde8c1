//! Claude protocol parser and command configuration.
//!
//! Parses Claude's stream-json output format and converts it to
//! [`ParsedEvent`](crate::agents::ParsedEvent)s.

mod parser;
pub mod spawn;
mod types;

pub use parser::parse_line;
pub use spawn::{build_claude_command, ClaudePlanConfig, PLAN_MODE_FLAGS};
pub use types::*;

//! OpenCode protocol parser.
//!
//! Parses the line-delimited JSON that `opencode run --format json` prints.
//!
//! # Protocol Overview
//!
//! Each line is a JSON object with a `type` discriminator and, for most
//! types, a `part` payload:
//!
//! - `step_start` / `step_finish`: model step lifecycle, the latter with
//!   token counts and cost
//! - `tool_use`: a tool invocation with its execution state
//! - `reasoning` / `text`: model output
//! - `error`: a failure reported by OpenCode
//!
//! The SDK event bus publishes the same events with dotted types
//! (`message.step.finished`) and a nested `properties.part` payload. The
//! [`shape`] module rewrites those before dispatch.
//!
//! The share URL is the only non-JSON output that is surfaced.
//!
//! # Example Usage
//!
//! ```
//! use concilium_core::agents::opencode;
//!
//! let events = opencode::parse_line(r#"{"type":"step_start","part":{}}"#);
//! assert_eq!(events[0].text, "Step started");
//! ```

mod parser;
pub mod shape;
mod types;

pub use parser::parse_line;
pub use shape::normalize_shape;
pub use types::*;

//! Token usage extraction.
//!
//! Each agent reports usage in its own shape:
//!
//! - Claude: `{"input_tokens", "output_tokens", "cache_creation_input_tokens",
//!   "cache_read_input_tokens"}` plus a separate `total_cost_usd`
//! - OpenCode: `{"input", "output", "reasoning"}` plus a separate `cost`
//!
//! These helpers fold both into one [`TokenUsage`]. Missing or malformed counts
//! read as 0 and missing or malformed costs read as `None`.

use serde_json::Value;

use crate::agents::event::TokenUsage;

/// Read a token count, clamping anything that isn't a non-negative number to 0.
fn count(value: Option<&Value>) -> u64 {
    let Some(value) = value else {
        return 0;
    };
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        })
        .unwrap_or(0)
}

/// Read a cost in USD. Negative and non-finite values are treated as unreported.
fn cost(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite() && *c >= 0.0)
}

/// Usage from a Claude `usage` object.
///
/// Cache creation and cache read tokens are billed as input, so they are
/// summed into `input_tokens`.
pub fn from_claude(usage: Option<&Value>, total_cost: Option<&Value>) -> TokenUsage {
    let field = |name: &str| count(usage.and_then(|u| u.get(name)));

    TokenUsage {
        input_tokens: field("input_tokens")
            .saturating_add(field("cache_creation_input_tokens"))
            .saturating_add(field("cache_read_input_tokens")),
        output_tokens: field("output_tokens"),
        total_cost: cost(total_cost),
    }
}

/// Usage from an OpenCode step `tokens` object.
///
/// Reasoning tokens are billed as output.
pub fn from_opencode(tokens: Option<&Value>, step_cost: Option<&Value>) -> TokenUsage {
    let field = |name: &str| count(tokens.and_then(|t| t.get(name)));

    TokenUsage {
        input_tokens: field("input"),
        output_tokens: field("output").saturating_add(field("reasoning")),
        total_cost: cost(step_cost),
    }
}

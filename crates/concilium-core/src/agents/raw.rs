//! Plain-text fallback for agents without a structured protocol.
//!
//! Codex and unknown agents print human-oriented text, often colored. Lines
//! are passed through as `raw` events after terminal escapes are removed.
//! The structured parsers also route lines they can't claim here.

use regex::Regex;
use std::sync::LazyLock;

use super::event::ParsedEvent;

/// CSI sequences (`ESC [ ... final`), OSC sequences terminated by BEL or
/// `ESC \`, and every other escape: intermediates then one final byte, which
/// covers charset designations (`ESC ( B`) and keypad modes (`ESC =`).
static ANSI_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)?|\x1b[ -/]*[0-~]")
        .unwrap()
});

/// Remove terminal color and control escape sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE_RE.replace_all(text, "").into_owned()
}

/// Emit at most one `raw` event for a line of unstructured output.
pub fn parse_line(line: &str) -> Vec<ParsedEvent> {
    let stripped = strip_ansi(line);
    if stripped.trim().is_empty() {
        return Vec::new();
    }
    vec![ParsedEvent::raw(stripped)]
}

//! Per-stream normalization state.
//!
//! Process output arrives in arbitrary chunks, and usage only makes sense
//! within one agent's stream. A [`StreamNormalizer`] owns both concerns for
//! exactly one stream: it reassembles lines and remembers the latest usage.
//! Run one per agent process; never share one between streams.

use super::event::{ParsedEvent, TokenUsage};
use super::{parse_event_line, AgentKind};

/// Line buffer plus usage context for a single agent stream.
#[derive(Debug)]
pub struct StreamNormalizer {
    kind: AgentKind,
    /// Incomplete trailing line from the last chunk.
    buffer: String,
    turn_usage: Option<TokenUsage>,
    cumulative_usage: Option<TokenUsage>,
}

impl StreamNormalizer {
    pub fn new(kind: AgentKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
            turn_usage: None,
            cumulative_usage: None,
        }
    }

    pub fn kind(&self) -> &AgentKind {
        &self.kind
    }

    /// Latest per-turn usage seen on this stream.
    pub fn turn_usage(&self) -> Option<TokenUsage> {
        self.turn_usage
    }

    /// Latest run-total usage seen on this stream.
    pub fn cumulative_usage(&self) -> Option<TokenUsage> {
        self.cumulative_usage
    }

    /// Feed a chunk of output and collect events for every completed line.
    ///
    /// A trailing partial line stays buffered until the next chunk or
    /// [`flush`](Self::flush).
    pub fn feed(&mut self, data: &str) -> Vec<ParsedEvent> {
        self.buffer.push_str(data);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let remainder = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, remainder);

        let mut events = Vec::new();
        for line in complete.split('\n') {
            events.extend(self.parse_line(line.strip_suffix('\r').unwrap_or(line)));
        }
        events
    }

    /// Process whatever is left in the buffer at end of stream.
    pub fn flush(&mut self) -> Vec<ParsedEvent> {
        let remaining = std::mem::take(&mut self.buffer);
        self.parse_line(remaining.strip_suffix('\r').unwrap_or(&remaining))
    }

    fn parse_line(&mut self, line: &str) -> Vec<ParsedEvent> {
        let events = parse_event_line(&self.kind, line);
        for event in &events {
            if let Some(usage) = event.token_usage {
                if event.token_usage_cumulative == Some(true) {
                    self.cumulative_usage = Some(usage);
                } else {
                    self.turn_usage = Some(usage);
                }
            }
        }
        events
    }
}

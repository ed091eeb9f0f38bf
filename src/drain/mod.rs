//! Drain Module
//!
//! Consumes a cursor into a JSON array of message envelopes.
//!
//! ## Output Format
//! ```text
//! [
//!   {"key":"%…","value":{…},"timestamp":1700000000000,"ReceiveLogSeq":5},
//!   ...
//! ]
//! ```
//! - One object per non-redacted entry, in sequence order
//! - `ReceiveLogSeq` only when seq-wrap is on
//! - No entries → `[]`
//!
//! Redacted positions are skipped. They still use up the cursor's limit,
//! since the cursor counts positions and not payloads.

mod envelope;
mod json;

pub use envelope::{Envelope, Message};
pub use json::{drain, stream_log};

use crate::index::LogicalSequence;

/// What to drain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOptions {
    /// First sequence to read (inclusive)
    pub seq: LogicalSequence,

    /// Most positions to read; None = to the end of the log
    pub limit: Option<usize>,

    /// Include `ReceiveLogSeq` in each object
    pub seq_wrap: bool,
}

impl DrainOptions {
    /// Drain from `seq` with sequence numbers attached
    pub fn from_seq(seq: LogicalSequence) -> Self {
        Self {
            seq,
            ..Self::default()
        }
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn seq_wrap(mut self, wrap: bool) -> Self {
        self.seq_wrap = wrap;
        self
    }
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            seq: 0,
            limit: None,
            seq_wrap: true,
        }
    }
}

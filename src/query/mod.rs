//! Query Module
//!
//! Range cursors over a Log, with optional live tailing.
//!
//! ## Cursor Lifecycle
//! ```text
//!  builder phase          iteration                terminal
//! ┌──────────────┐      ┌──────────────────┐      ┌───────────────┐
//! │ gt/gte/lt/lte│ next │ select(next_seq) │ end  │ EndOfSequence │
//! │ limit/live   ├─────►│  hit  → emit     ├─────►│ (idempotent)  │
//! │ seq_wrap     │      │  miss → wait/end │      └───────────────┘
//! └──────────────┘      └────────┬─────────┘
//!                                │ index fault
//!                                ▼
//!                       ┌──────────────────┐
//!                       │ faulted (sticky) │
//!                       └──────────────────┘
//! ```
//! A cancelled wait leaves the cursor exactly as it was before the call.

mod cursor;
mod options;

pub use cursor::{Query, QueryIter};
pub use options::QueryOptions;

use crate::index::LogicalSequence;

/// One position emitted by a cursor
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<V> {
    /// A decoded value (seq-wrap off)
    Value(V),

    /// A decoded value paired with the sequence it was read from
    Sequenced(LogicalSequence, V),

    /// A redacted position; carries its sequence regardless of seq-wrap
    Tombstone(LogicalSequence),
}

impl<V> Entry<V> {
    /// Sequence of this entry, when known
    pub fn seq(&self) -> Option<LogicalSequence> {
        match self {
            Entry::Value(_) => None,
            Entry::Sequenced(seq, _) | Entry::Tombstone(seq) => Some(*seq),
        }
    }

    /// Borrow the value, if this is not a tombstone
    pub fn value(&self) -> Option<&V> {
        match self {
            Entry::Value(v) | Entry::Sequenced(_, v) => Some(v),
            Entry::Tombstone(_) => None,
        }
    }

    /// Take the value, if this is not a tombstone
    pub fn into_value(self) -> Option<V> {
        match self {
            Entry::Value(v) | Entry::Sequenced(_, v) => Some(v),
            Entry::Tombstone(_) => None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Entry::Tombstone(_))
    }
}

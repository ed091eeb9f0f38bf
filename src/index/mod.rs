//! Index Module
//!
//! Sparse ordered mapping from logical sequence numbers to physical handles.
//!
//! ## Responsibilities
//! - Assign the next logical sequence on append
//! - Rank lookup: "which handle sits at logical position n"
//! - Never rewrite an entry once inserted
//!
//! ## Data Structure Choice
//! Handles are strictly increasing byte offsets, so the index is a sorted
//! `Vec<u64>` addressed by rank:
//! ```text
//!   seq:     0     1     2      3
//!          ┌─────┬─────┬──────┬──────┐
//!   handle │  0  │ 41  │ 117  │ 126  │   (gaps = frame sizes)
//!          └─────┴─────┴──────┴──────┘
//! ```
//! - `select(n)` is a bounds-checked slot read, O(1)
//! - `append` is a push, O(1) amortized

mod sequence;

pub use sequence::SequenceIndex;

/// Logical position of a record in the log
pub type LogicalSequence = u64;

/// Byte offset of a record frame in the record store
pub type PhysicalHandle = u64;

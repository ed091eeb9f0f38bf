//! SequenceIndex implementation
//!
//! Append-only rank index over strictly increasing physical handles.

use crate::error::{Result, SeqLogError};

use super::{LogicalSequence, PhysicalHandle};

/// Maps logical sequence numbers to physical handles
///
/// Not internally synchronized: the owning Log keeps it under the same mutex
/// as the record store so readers see either the pre- or post-append state.
#[derive(Debug, Default)]
pub struct SequenceIndex {
    /// handles[seq] = frame offset, strictly increasing
    handles: Vec<PhysicalHandle>,
}

impl SequenceIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with room for `slots` entries
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            handles: Vec::with_capacity(slots),
        }
    }

    /// Handle stored at logical position `seq`
    ///
    /// `None` means "not yet written" and is an expected outcome.
    pub fn select(&self, seq: LogicalSequence) -> Option<PhysicalHandle> {
        let slot = usize::try_from(seq).ok()?;
        self.handles.get(slot).copied()
    }

    /// Insert a handle and return the sequence assigned to it
    ///
    /// Handles must arrive in strictly increasing order.
    pub fn append(&mut self, handle: PhysicalHandle) -> Result<LogicalSequence> {
        if let Some(&last) = self.handles.last() {
            if handle <= last {
                return Err(SeqLogError::Storage(format!(
                    "out-of-order handle {} after {}",
                    handle, last
                )));
            }
        }

        let seq = self.handles.len() as LogicalSequence;
        self.handles.push(handle);
        Ok(seq)
    }

    /// Number of indexed positions
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if nothing has been indexed yet
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Highest assigned sequence, if any
    pub fn last_seq(&self) -> Option<LogicalSequence> {
        self.handles.len().checked_sub(1).map(|s| s as LogicalSequence)
    }
}

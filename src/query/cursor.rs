//! Query cursor
//!
//! Single-reader, single-use range iterator over a Log.

use std::any::type_name;

use serde::de::DeserializeOwned;

use crate::error::{Bound, FaultKind, Result, SeqLogError};
use crate::index::LogicalSequence;
use crate::log::Log;
use crate::notify::{self, CancelToken, WaitOutcome};
use crate::store::StoredRecord;

use super::Entry;

/// Sticky record of the fault that terminated a cursor
#[derive(Debug, Clone)]
struct Fault {
    seq: LogicalSequence,
    kind: FaultKind,
    detail: String,
}

impl Fault {
    fn to_error(&self) -> SeqLogError {
        SeqLogError::IndexFault {
            seq: self.seq,
            kind: self.kind,
            detail: self.detail.clone(),
        }
    }
}

/// Range cursor over a Log
///
/// Configure with the builder methods, then call [`Query::next`] until it
/// returns `Ok(None)`. Builder methods fail once iteration has started.
pub struct Query<V> {
    log: Log<V>,

    /// Next position to read
    next_seq: LogicalSequence,
    lower_set: bool,

    /// Exclusive upper bound
    upper: Option<LogicalSequence>,

    /// Emissions left; None = unbounded
    remaining: Option<usize>,

    live: bool,
    seq_wrap: bool,

    started: bool,
    exhausted: bool,
    fault: Option<Fault>,
}

impl<V> Query<V> {
    pub(crate) fn new(log: Log<V>) -> Self {
        Self {
            log,
            next_seq: 0,
            lower_set: false,
            upper: None,
            remaining: None,
            live: false,
            seq_wrap: false,
            started: false,
            exhausted: false,
            fault: None,
        }
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Lower bound, exclusive
    pub fn gt(&mut self, seq: LogicalSequence) -> Result<&mut Self> {
        self.set_lower(seq.saturating_add(1))
    }

    /// Lower bound, inclusive
    pub fn gte(&mut self, seq: LogicalSequence) -> Result<&mut Self> {
        self.set_lower(seq)
    }

    /// Upper bound, exclusive
    pub fn lt(&mut self, seq: LogicalSequence) -> Result<&mut Self> {
        self.set_upper(seq)
    }

    /// Upper bound, inclusive
    pub fn lte(&mut self, seq: LogicalSequence) -> Result<&mut Self> {
        self.set_upper(seq.saturating_add(1))
    }

    /// Cap the number of entries emitted
    pub fn limit(&mut self, n: usize) -> Result<&mut Self> {
        self.ensure_not_started()?;
        self.remaining = Some(n);
        Ok(self)
    }

    /// Block past the end of the log instead of ending
    pub fn live(&mut self, live: bool) -> Result<&mut Self> {
        self.ensure_not_started()?;
        self.live = live;
        Ok(self)
    }

    /// Pair emitted values with their sequence
    pub fn seq_wrap(&mut self, wrap: bool) -> Result<&mut Self> {
        self.ensure_not_started()?;
        self.seq_wrap = wrap;
        Ok(self)
    }

    /// Reverse iteration is not supported; `reverse(false)` is accepted
    pub fn reverse(&mut self, reverse: bool) -> Result<&mut Self> {
        if reverse {
            return Err(SeqLogError::NotImplemented("reverse iteration"));
        }
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Position the next call to `next` reads
    pub fn next_seq(&self) -> LogicalSequence {
        self.next_seq
    }

    /// Entries left before the limit ends the query (None = unbounded)
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// True once the cursor has reported end of sequence
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// True once an index fault has terminated the cursor
    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn set_lower(&mut self, seq: LogicalSequence) -> Result<&mut Self> {
        // Once iteration starts the lower bound is implicitly fixed
        if self.lower_set || self.started {
            return Err(SeqLogError::BoundAlreadySet {
                bound: Bound::Lower,
            });
        }
        self.next_seq = seq;
        self.lower_set = true;
        Ok(self)
    }

    fn set_upper(&mut self, seq: LogicalSequence) -> Result<&mut Self> {
        if self.upper.is_some() || self.started {
            return Err(SeqLogError::BoundAlreadySet {
                bound: Bound::Upper,
            });
        }
        self.upper = Some(seq);
        Ok(self)
    }

    fn ensure_not_started(&self) -> Result<()> {
        if self.started {
            return Err(SeqLogError::QueryStarted);
        }
        Ok(())
    }

    /// Record a terminal fault and hand the error back
    fn fail(&mut self, err: SeqLogError) -> SeqLogError {
        let fault = match err {
            SeqLogError::IndexFault { seq, kind, detail } => Fault { seq, kind, detail },
            other => Fault {
                seq: self.next_seq,
                kind: FaultKind::Corruption,
                detail: other.to_string(),
            },
        };
        tracing::warn!(
            seq = fault.seq,
            kind = %fault.kind,
            "query terminated: {}",
            fault.detail
        );
        let err = fault.to_error();
        self.fault = Some(fault);
        err
    }

    fn finish(&mut self) -> Result<Option<Entry<V>>> {
        if !self.exhausted {
            tracing::trace!(next_seq = self.next_seq, "query reached end of sequence");
        }
        self.exhausted = true;
        Ok(None)
    }
}

impl<V: DeserializeOwned> Query<V> {
    /// Read the next entry
    ///
    /// - `Ok(Some(entry))`: an entry at the current position
    /// - `Ok(None)`: end of sequence; every later call returns it too
    /// - `Err(Cancelled)`: a live wait was cancelled; the cursor is unchanged
    ///   and `next` may be called again
    /// - `Err(IndexFault)`: terminal; every later call returns the same fault
    pub fn next(&mut self, cancel: &CancelToken) -> Result<Option<Entry<V>>> {
        if let Some(fault) = &self.fault {
            return Err(fault.to_error());
        }

        // Limit gates emission before any lookup
        if self.exhausted || self.remaining == Some(0) {
            return self.finish();
        }

        if !self.started {
            self.started = true;
            tracing::debug!(
                from = self.next_seq,
                upper = ?self.upper,
                limit = ?self.remaining,
                live = self.live,
                "query started"
            );
        }

        if let Some(upper) = self.upper {
            if self.next_seq >= upper {
                return self.finish();
            }
        }

        let seq = self.next_seq;

        // Lookup holds the log lock only for the duration of the call
        match self.log.lookup(seq) {
            Ok(Some(record)) => self.emit(seq, record),
            Ok(None) if !self.live => self.finish(),
            Ok(None) => self.wait_and_read(seq, cancel),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Adapt this cursor to an `Iterator` ending at end of sequence
    pub fn iter<'q>(&'q mut self, cancel: &'q CancelToken) -> QueryIter<'q, V> {
        QueryIter {
            query: self,
            cancel,
            done: false,
        }
    }

    /// Block until `seq` is written, then read it directly
    fn wait_and_read(
        &mut self,
        seq: LogicalSequence,
        cancel: &CancelToken,
    ) -> Result<Option<Entry<V>>> {
        let signal = self.log.notifier().wait_for(seq);
        tracing::debug!(seq, "live query waiting");

        if notify::wait_until(&signal, cancel) == WaitOutcome::Cancelled {
            tracing::debug!(seq, "live query wait cancelled");
            self.log.notifier().cancel_wait(signal);
            return Err(SeqLogError::Cancelled { seq });
        }

        match self.log.read_present(seq) {
            Ok(record) => self.emit(seq, record),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Decode, wrap and advance
    fn emit(&mut self, seq: LogicalSequence, record: StoredRecord) -> Result<Option<Entry<V>>> {
        let entry = match record {
            StoredRecord::Nulled => Entry::Tombstone(seq),
            StoredRecord::Data(bytes) => match bincode::deserialize::<V>(&bytes) {
                Ok(value) if self.seq_wrap => Entry::Sequenced(seq, value),
                Ok(value) => Entry::Value(value),
                Err(e) => {
                    return Err(self.fail(SeqLogError::IndexFault {
                        seq,
                        kind: FaultKind::MalformedValue,
                        detail: format!(
                            "{} byte payload is not a {}: {}",
                            bytes.len(),
                            type_name::<V>(),
                            e
                        ),
                    }))
                }
            },
        };

        self.next_seq += 1;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        tracing::trace!(seq, "query emitted entry");

        Ok(Some(entry))
    }
}

/// Iterator over a cursor's entries, ending at end of sequence or first error
pub struct QueryIter<'q, V> {
    query: &'q mut Query<V>,
    cancel: &'q CancelToken,
    done: bool,
}

impl<V: DeserializeOwned> Iterator for QueryIter<'_, V> {
    type Item = Result<Entry<V>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.query.next(self.cancel) {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

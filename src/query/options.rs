//! Query options
//!
//! Bounds and flags bundled into one value, applied to a fresh cursor in a
//! fixed order (lower bounds, upper bounds, then flags).

use crate::error::Result;
use crate::index::LogicalSequence;

use super::Query;

/// Bounds and options for a query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    gt: Option<LogicalSequence>,
    gte: Option<LogicalSequence>,
    lt: Option<LogicalSequence>,
    lte: Option<LogicalSequence>,
    limit: Option<usize>,
    live: bool,
    seq_wrap: bool,
    reverse: bool,
}

impl QueryOptions {
    /// Options for an unbounded, unlimited, non-live query
    pub fn new() -> Self {
        Self::default()
    }

    /// Start after `seq`
    pub fn gt(mut self, seq: LogicalSequence) -> Self {
        self.gt = Some(seq);
        self
    }

    /// Start at `seq`
    pub fn gte(mut self, seq: LogicalSequence) -> Self {
        self.gte = Some(seq);
        self
    }

    /// Stop before `seq`
    pub fn lt(mut self, seq: LogicalSequence) -> Self {
        self.lt = Some(seq);
        self
    }

    /// Stop after `seq`
    pub fn lte(mut self, seq: LogicalSequence) -> Self {
        self.lte = Some(seq);
        self
    }

    /// Emit at most `n` entries
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Block for new entries past the end of the log
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Pair each value with its sequence
    pub fn seq_wrap(mut self, wrap: bool) -> Self {
        self.seq_wrap = wrap;
        self
    }

    /// Request reverse iteration (rejected when applied)
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Configure `query` with these options
    ///
    /// Setting both `gt` and `gte` (or `lt` and `lte`) fails with
    /// `BoundAlreadySet`, exactly as calling both on the cursor would.
    pub fn apply<V>(&self, query: &mut Query<V>) -> Result<()> {
        query.reverse(self.reverse)?;

        if let Some(seq) = self.gt {
            query.gt(seq)?;
        }
        if let Some(seq) = self.gte {
            query.gte(seq)?;
        }
        if let Some(seq) = self.lt {
            query.lt(seq)?;
        }
        if let Some(seq) = self.lte {
            query.lte(seq)?;
        }
        if let Some(n) = self.limit {
            query.limit(n)?;
        }
        query.live(self.live)?;
        query.seq_wrap(self.seq_wrap)?;
        Ok(())
    }
}

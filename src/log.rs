//! Log Module
//!
//! The façade that ties the index, the record store and the notifier together.
//!
//! ## Responsibilities
//! - Assign sequences on append and wake live readers
//! - Redact (null) positions without moving them
//! - Hand out query cursors

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{FaultKind, Result, SeqLogError};
use crate::index::{LogicalSequence, SequenceIndex};
use crate::notify::{CancelToken, WaitNotifier};
use crate::query::{Entry, Query, QueryOptions};
use crate::store::{RecordStore, StoredRecord};

/// Index and store, always locked together
struct Tables {
    index: SequenceIndex,
    store: RecordStore,
}

struct Shared {
    config: Config,

    /// Guards select/append/read; never held across a blocking wait
    tables: Mutex<Tables>,

    /// Wakes readers blocked past the end of the log
    notifier: WaitNotifier,

    /// Serializes writers (append/null)
    write_lock: Mutex<()>,
}

/// An append-only, sequence-indexed log of `V` values
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (append/null): serialized by `write_lock`, then take the
///   tables lock only for the frame write + index insert
/// - **Reads** (cursors, get): take the tables lock for one lookup each and
///   copy the payload out; decoding happens after the lock is released
/// - **Live waits**: park on the notifier with no lock held
///
/// `Log` is a cheap handle: clones share the same underlying log.
pub struct Log<V> {
    shared: Arc<Shared>,
    _values: PhantomData<fn() -> V>,
}

impl<V> Clone for Log<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _values: PhantomData,
        }
    }
}

impl<V> fmt::Debug for Log<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Log")
            .field("len", &self.len())
            .field("highest", &self.shared.notifier.highest())
            .finish()
    }
}

impl<V> Log<V> {
    /// Create an empty log
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let tables = Tables {
            index: SequenceIndex::with_capacity(config.initial_index_capacity),
            store: RecordStore::with_capacity(config.initial_store_capacity),
        };

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                tables: Mutex::new(tables),
                notifier: WaitNotifier::new(),
                write_lock: Mutex::new(()),
            }),
            _values: PhantomData,
        })
    }

    /// Append an already encoded payload
    ///
    /// The payload is not checked against `V`; if it does not decode, readers
    /// see a `MalformedValue` fault at its position.
    pub fn append_encoded(&self, payload: &[u8]) -> Result<LogicalSequence> {
        let max = self.shared.config.max_record_size;
        if payload.len() > max {
            return Err(SeqLogError::RecordTooLarge {
                size: payload.len(),
                max,
            });
        }

        let _write_guard = self.shared.write_lock.lock();

        let seq = {
            let mut tables = self.shared.tables.lock();
            let handle = tables.store.append(payload)?;
            tables.index.append(handle)?
        };

        // Notify only after the index insert is visible
        self.shared.notifier.notify_appended(seq);
        tracing::trace!(seq, size = payload.len(), "appended record");

        Ok(seq)
    }

    /// Redact the record at `seq`
    ///
    /// The position stays in the index; readers get a tombstone for it.
    pub fn null(&self, seq: LogicalSequence) -> Result<()> {
        let _write_guard = self.shared.write_lock.lock();

        let mut tables = self.shared.tables.lock();
        let handle = tables
            .index
            .select(seq)
            .ok_or(SeqLogError::SeqNotFound(seq))?;
        tables.store.null(seq, handle)?;

        tracing::debug!(seq, "nulled record");
        Ok(())
    }

    /// A cursor with default state: no bounds, unlimited, not live, no wrap
    pub fn query(&self) -> Query<V> {
        Query::new(self.clone())
    }

    /// A cursor configured from `options`
    pub fn query_with(&self, options: &QueryOptions) -> Result<Query<V>> {
        let mut query = self.query();
        options.apply(&mut query)?;
        Ok(query)
    }

    /// Number of positions written (including nulled ones)
    pub fn len(&self) -> usize {
        self.shared.tables.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.tables.lock().index.is_empty()
    }

    /// Highest assigned sequence, if any
    pub fn last_seq(&self) -> Option<LogicalSequence> {
        self.shared.tables.lock().index.last_seq()
    }

    /// Bytes used by stored frames
    pub fn store_size(&self) -> usize {
        self.shared.tables.lock().store.size()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    // =========================================================================
    // Cursor Support
    // =========================================================================

    /// Select + read under one short critical section
    ///
    /// `Ok(None)` means "not yet written".
    pub(crate) fn lookup(&self, seq: LogicalSequence) -> Result<Option<StoredRecord>> {
        let tables = self.shared.tables.lock();
        match tables.index.select(seq) {
            Some(handle) => tables.store.read(seq, handle).map(Some),
            None => Ok(None),
        }
    }

    /// Read a position known to be written
    pub(crate) fn read_present(&self, seq: LogicalSequence) -> Result<StoredRecord> {
        self.lookup(seq)?.ok_or_else(|| SeqLogError::IndexFault {
            seq,
            kind: FaultKind::Corruption,
            detail: "signalled as written but missing from the index".to_string(),
        })
    }

    pub(crate) fn notifier(&self) -> &WaitNotifier {
        &self.shared.notifier
    }
}

impl<V: Serialize> Log<V> {
    /// Append a value and return its sequence
    pub fn append(&self, value: &V) -> Result<LogicalSequence> {
        let payload = bincode::serialize(value)?;
        self.append_encoded(&payload)
    }
}

impl<V: DeserializeOwned> Log<V> {
    /// Point read of one position
    ///
    /// Returns `Entry::Sequenced` for values and `Entry::Tombstone` for
    /// nulled positions; `None` if `seq` is not written yet.
    pub fn get(&self, seq: LogicalSequence) -> Result<Option<Entry<V>>> {
        let mut query = self.query();
        query.gte(seq)?.lte(seq)?.seq_wrap(true)?;
        query.next(&CancelToken::never())
    }
}

//! WaitNotifier implementation

use std::collections::BTreeMap;

use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::index::LogicalSequence;

/// Single-fire signal for one awaited sequence
///
/// Fires by disconnection, so it stays fired for every clone.
#[derive(Debug, Clone)]
pub struct WaitSignal {
    rx: Receiver<()>,
    seq: LogicalSequence,
}

impl WaitSignal {
    /// Sequence this signal waits for
    pub fn seq(&self) -> LogicalSequence {
        self.seq
    }

    /// Check without blocking
    pub fn is_ready(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Block until fired (no cancellation)
    pub fn wait(&self) {
        let _ = self.rx.recv();
    }

    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

#[derive(Debug, Default)]
struct NotifyState {
    /// Highest sequence appended so far
    highest: Option<LogicalSequence>,

    waiters: BTreeMap<LogicalSequence, Waiter>,
}

/// One pending threshold
#[derive(Debug)]
struct Waiter {
    /// Held only to be dropped
    _tx: Sender<()>,
    rx: Receiver<()>,

    /// Signals handed out and not yet given back via `cancel_wait`
    interest: usize,
}

impl Waiter {
    fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            _tx: tx,
            rx,
            interest: 0,
        }
    }
}

impl NotifyState {
    fn satisfies(&self, seq: LogicalSequence) -> bool {
        self.highest.is_some_and(|h| h >= seq)
    }
}

/// Tracks the highest appended sequence and wakes readers waiting on it
#[derive(Debug, Default)]
pub struct WaitNotifier {
    state: Mutex<NotifyState>,
}

impl WaitNotifier {
    /// Create a notifier with nothing appended
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that fires once `highest >= seq`
    pub fn wait_for(&self, seq: LogicalSequence) -> WaitSignal {
        let mut state = self.state.lock();

        if state.satisfies(seq) {
            // Already written: hand out a pre-fired signal
            let (_tx, rx) = unbounded();
            return WaitSignal { rx, seq };
        }

        let waiter = state.waiters.entry(seq).or_insert_with(Waiter::new);
        waiter.interest += 1;
        tracing::trace!(seq, interest = waiter.interest, "registered waiter");
        WaitSignal {
            rx: waiter.rx.clone(),
            seq,
        }
    }

    /// Give back a signal whose reader stopped waiting
    ///
    /// The threshold is dropped once every reader waiting on it gave up. A
    /// signal that already fired is a no-op.
    pub fn cancel_wait(&self, signal: WaitSignal) {
        let seq = signal.seq();
        let mut state = self.state.lock();

        if let Some(waiter) = state.waiters.get_mut(&seq) {
            waiter.interest = waiter.interest.saturating_sub(1);
            if waiter.interest == 0 {
                state.waiters.remove(&seq);
                tracing::trace!(seq, "dropped abandoned waiter");
            }
        }
    }

    /// Record that `seq` was appended and wake satisfied waiters
    pub fn notify_appended(&self, seq: LogicalSequence) {
        let ready = {
            let mut state = self.state.lock();
            if state.satisfies(seq) {
                return;
            }
            state.highest = Some(seq);

            match seq.checked_add(1) {
                Some(next) => {
                    let pending = state.waiters.split_off(&next);
                    std::mem::replace(&mut state.waiters, pending)
                }
                None => std::mem::take(&mut state.waiters),
            }
        };

        if !ready.is_empty() {
            tracing::trace!(seq, thresholds = ready.len(), "waking waiters");
        }
        // Dropping the senders disconnects every receiver clone
        drop(ready);
    }

    /// Highest appended sequence, if any
    pub fn highest(&self) -> Option<LogicalSequence> {
        self.state.lock().highest
    }

    /// Number of distinct thresholds still waiting
    pub fn pending(&self) -> usize {
        self.state.lock().waiters.len()
    }
}

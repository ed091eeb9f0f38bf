//! Cancellation tokens for blocking waits

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

/// Cancellation signal and/or deadline for a blocking call
///
/// Clones share the same trigger: cancelling one cancels all of them.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Receiver<()>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires when `cancel` is called
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            rx,
            trigger: Arc::new(Mutex::new(Some(tx))),
            deadline: None,
        }
    }

    /// A token nobody intends to cancel
    pub fn never() -> Self {
        Self::new()
    }

    /// A token that fires at `deadline` (or earlier on `cancel`)
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::new()
        }
    }

    /// A token that fires after `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Fire the token
    pub fn cancel(&self) {
        // Dropping the only sender disconnects every receiver
        self.trigger.lock().take();
    }

    /// True once cancelled or past the deadline
    pub fn is_cancelled(&self) -> bool {
        if matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected)) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

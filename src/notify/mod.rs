//! Notify Module
//!
//! Bridges the writer thread and readers blocked past the end of the log.
//!
//! ## Responsibilities
//! - Track the highest appended sequence
//! - Hand out single-fire signals keyed by the sequence a reader waits for
//! - Race those signals against caller-supplied cancellation
//!
//! ## Signalling
//! Every pending threshold owns one channel whose sender is never used for
//! sending. Satisfying the threshold drops the sender, which disconnects the
//! channel and wakes every receiver clone at once. A reader that gives up hands
//! its signal back with `cancel_wait`, which drops the threshold once no other
//! reader is waiting on it.

mod cancel;
mod notifier;

pub use cancel::CancelToken;
pub use notifier::{WaitNotifier, WaitSignal};

use crossbeam::channel::{at, never, select};

/// How a blocking wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The awaited sequence is now written
    Ready,

    /// The token was cancelled or its deadline passed
    Cancelled,
}

/// Block until `signal` fires or `cancel` does
///
/// A fired signal wins over a cancelled token: a sequence that is already
/// written is always reported `Ready`.
pub fn wait_until(signal: &WaitSignal, cancel: &CancelToken) -> WaitOutcome {
    if signal.is_ready() {
        return WaitOutcome::Ready;
    }

    let deadline = match cancel.deadline() {
        Some(when) => at(when),
        None => never(),
    };

    let outcome = select! {
        recv(signal.receiver()) -> _ => WaitOutcome::Ready,
        recv(cancel.receiver()) -> _ => WaitOutcome::Cancelled,
        recv(deadline) -> _ => WaitOutcome::Cancelled,
    };

    // select! picks arbitrarily among ready arms
    if outcome == WaitOutcome::Cancelled && signal.is_ready() {
        return WaitOutcome::Ready;
    }
    outcome
}

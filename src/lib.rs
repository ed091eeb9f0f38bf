//! # seqlog
//!
//! Range and live-tail queries over an append-only, sequence-indexed log:
//! - Sparse index from logical sequence to physical record handle
//! - Single-use query cursors with bounds, limit and sequence wrapping
//! - Live tailing with cancellable waits for records not yet written
//! - Redaction (nulling) that keeps sequence positions intact
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Drain / boundary callers                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ next(cancel)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Query cursor                          │
//! │          (bounds, limit, live tail, seq wrap)                │
//! └──────────┬───────────────────────────────────┬──────────────┘
//!            │ select (short lock)               │ wait_for (no lock)
//!            ▼                                   ▼
//!   ┌─────────────────┐                 ┌─────────────────┐
//!   │  SequenceIndex  │                 │  WaitNotifier   │
//!   │  + RecordStore  │◄──── append ────┤  (writer wakes) │
//!   └─────────────────┘                 └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod index;
pub mod store;
pub mod notify;
pub mod query;
pub mod log;
pub mod drain;
pub mod node;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Bound, FaultKind, Result, SeqLogError};
pub use config::Config;
pub use log::Log;
pub use notify::CancelToken;
pub use query::{Entry, Query, QueryOptions};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of seqlog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

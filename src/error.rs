//! Error types for seqlog
//!
//! Provides a unified error type for all operations. End of sequence is not an
//! error: cursors report it as `Ok(None)`.

use std::fmt;

use thiserror::Error;

/// Result type alias using SeqLogError
pub type Result<T> = std::result::Result<T, SeqLogError>;

/// Which side of a query range a builder call touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Lower => f.write_str("lower"),
            Bound::Upper => f.write_str("upper"),
        }
    }
}

/// What went wrong when a present index position could not be turned into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The stored payload does not decode as the log's value type
    MalformedValue,

    /// The index or record store is inconsistent (bad handle, bad checksum)
    Corruption,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::MalformedValue => f.write_str("malformed stored value"),
            FaultKind::Corruption => f.write_str("index corruption"),
        }
    }
}

/// Unified error type for seqlog operations
#[derive(Debug, Error)]
pub enum SeqLogError {
    // -------------------------------------------------------------------------
    // Query Builder Errors
    // -------------------------------------------------------------------------
    #[error("{bound} bound already set")]
    BoundAlreadySet { bound: Bound },

    #[error("query already started")]
    QueryStarted,

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    // -------------------------------------------------------------------------
    // Iteration Errors
    // -------------------------------------------------------------------------
    #[error("cancelled while waiting for seq {seq} to be written")]
    Cancelled { seq: u64 },

    #[error("{kind} at seq {seq}: {detail}")]
    IndexFault {
        seq: u64,
        kind: FaultKind,
        detail: String,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Sequence not found: {0}")]
    SeqNotFound(u64),

    #[error("Record too large: {size} bytes (max {max})")]
    RecordTooLarge { size: usize, max: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Boundary Errors
    // -------------------------------------------------------------------------
    #[error("node not initialized")]
    NotInitialized,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SeqLogError {
    /// True for errors after which the same call may be retried
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SeqLogError::Cancelled { .. })
    }
}

impl From<bincode::Error> for SeqLogError {
    fn from(e: bincode::Error) -> Self {
        SeqLogError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for SeqLogError {
    fn from(e: serde_json::Error) -> Self {
        SeqLogError::Serialization(e.to_string())
    }
}

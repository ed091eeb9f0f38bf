//! Record Store Module
//!
//! Physical side of the log: an append-only arena of checksummed frames.
//!
//! ## Frame Format
//! ```text
//! ┌───────────┬─────────┬─────────┬──────────────┐
//! │ Flags (1) │ Len (4) │ CRC (4) │   Payload    │
//! └───────────┴─────────┴─────────┴──────────────┘
//! ```
//! - Flags: 0x00 live record, 0x01 nulled (payload zeroed)
//! - Len/CRC: little endian, CRC32 over the payload
//!
//! A frame's starting offset is its physical handle. Frames never move, so a
//! handle stays valid for the life of the store.

mod arena;

pub use arena::RecordStore;

use bytes::Bytes;

/// Flags + length + checksum
pub const FRAME_HEADER_SIZE: usize = 9;

/// Flag byte for a live frame
pub(crate) const FLAG_LIVE: u8 = 0x00;

/// Flag byte for a redacted frame
pub(crate) const FLAG_NULLED: u8 = 0x01;

/// A frame read back from the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord {
    /// Payload bytes, checksum verified
    Data(Bytes),

    /// The record was redacted
    Nulled,
}

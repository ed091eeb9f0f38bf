//! RecordStore implementation
//!
//! Contiguous byte arena; reads copy the payload out so callers can decode
//! after the lock guarding the store is released.

use bytes::Bytes;

use crate::error::{FaultKind, Result, SeqLogError};
use crate::index::PhysicalHandle;

use super::{StoredRecord, FLAG_LIVE, FLAG_NULLED, FRAME_HEADER_SIZE};

/// Append-only frame arena
#[derive(Debug, Default)]
pub struct RecordStore {
    /// Concatenated frames
    buf: Vec<u8>,

    /// Number of frames written
    frame_count: u64,
}

impl RecordStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with `bytes` reserved
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            frame_count: 0,
        }
    }

    /// Append a payload and return the handle of its frame
    pub fn append(&mut self, payload: &[u8]) -> Result<PhysicalHandle> {
        let len = u32::try_from(payload.len()).map_err(|_| SeqLogError::RecordTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        })?;

        let handle = self.buf.len() as PhysicalHandle;
        let crc = crc32fast::hash(payload);

        self.buf.reserve(FRAME_HEADER_SIZE + payload.len());
        self.buf.push(FLAG_LIVE);
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(&crc.to_le_bytes());
        self.buf.extend_from_slice(payload);
        self.frame_count += 1;

        Ok(handle)
    }

    /// Read the frame at `handle`
    ///
    /// Errors are `IndexFault { kind: Corruption }`; the caller knows the
    /// logical sequence and passes it in for diagnostics.
    pub fn read(&self, seq: u64, handle: PhysicalHandle) -> Result<StoredRecord> {
        let (flags, start, end) = self.frame_bounds(seq, handle)?;
        let payload = &self.buf[start..end];

        match flags {
            FLAG_NULLED => Ok(StoredRecord::Nulled),
            FLAG_LIVE => {
                let stored_crc = u32::from_le_bytes([
                    self.buf[start - 4],
                    self.buf[start - 3],
                    self.buf[start - 2],
                    self.buf[start - 1],
                ]);
                let actual_crc = crc32fast::hash(payload);
                if stored_crc != actual_crc {
                    return Err(corruption(
                        seq,
                        format!(
                            "checksum mismatch at handle {}: stored {:08x}, computed {:08x}",
                            handle, stored_crc, actual_crc
                        ),
                    ));
                }
                Ok(StoredRecord::Data(Bytes::copy_from_slice(payload)))
            }
            other => Err(corruption(
                seq,
                format!("unknown frame flags {:#04x} at handle {}", other, handle),
            )),
        }
    }

    /// Redact the frame at `handle`: flag it nulled and zero its payload
    ///
    /// Nulling an already nulled frame is a no-op.
    pub fn null(&mut self, seq: u64, handle: PhysicalHandle) -> Result<()> {
        let (_, start, end) = self.frame_bounds(seq, handle)?;
        let at = handle as usize;

        self.buf[at] = FLAG_NULLED;
        self.buf[start..end].fill(0);
        Ok(())
    }

    /// Number of frames written
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total bytes used by frames
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Validate a handle and return (flags, payload_start, payload_end)
    fn frame_bounds(&self, seq: u64, handle: PhysicalHandle) -> Result<(u8, usize, usize)> {
        let at = usize::try_from(handle)
            .map_err(|_| corruption(seq, format!("handle {} not addressable", handle)))?;

        let header_end = at
            .checked_add(FRAME_HEADER_SIZE)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                corruption(
                    seq,
                    format!("handle {} beyond store end {}", handle, self.buf.len()),
                )
            })?;

        let header = &self.buf[at..header_end];
        let len = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;

        let payload_end = header_end
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| {
                corruption(
                    seq,
                    format!("frame at handle {} overruns store ({} byte payload)", handle, len),
                )
            })?;

        Ok((header[0], header_end, payload_end))
    }

    #[cfg(test)]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

fn corruption(seq: u64, detail: String) -> SeqLogError {
    SeqLogError::IndexFault {
        seq,
        kind: FaultKind::Corruption,
        detail,
    }
}

//! Envelope trait and the stock message type

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the drain needs from a stored value
pub trait Envelope {
    /// Stable content key
    fn key(&self) -> &str;

    /// Payload as JSON text
    fn content(&self) -> &str;

    /// Receive time (unix millis)
    fn received_ms(&self) -> u64;
}

/// A received message with a JSON payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub key: String,
    pub content: String,
    pub received_ms: u64,
}

impl Message {
    /// Wrap `content`, keyed by its checksum and stamped with the current time
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let received_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            key: Self::content_key(&content),
            content,
            received_ms,
        }
    }

    /// Key derived from content: "%" + crc32 in hex
    pub fn content_key(content: &str) -> String {
        format!("%{:08x}", crc32fast::hash(content.as_bytes()))
    }

    /// Load one message per non-blank line of a JSON-lines file
    ///
    /// Every line must be valid JSON.
    pub fn read_jsonl(path: &Path) -> Result<Vec<Message>> {
        let text = fs::read_to_string(path)?;
        let mut messages = Vec::new();

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            serde_json::from_str::<serde::de::IgnoredAny>(line)?;
            messages.push(Message::new(line));
        }

        tracing::debug!(count = messages.len(), path = %path.display(), "loaded messages");
        Ok(messages)
    }
}

impl Envelope for Message {
    fn key(&self) -> &str {
        &self.key
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn received_ms(&self) -> u64 {
        self.received_ms
    }
}

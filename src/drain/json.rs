//! JSON drain and its boundary form

use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::Result;
use crate::log::Log;
use crate::node::NodeSlot;
use crate::notify::CancelToken;
use crate::query::{Entry, QueryOptions};

use super::{DrainOptions, Envelope};

#[derive(Serialize)]
struct KeyValue<'a> {
    key: &'a str,
    value: &'a RawValue,
    timestamp: u64,
    #[serde(rename = "ReceiveLogSeq", skip_serializing_if = "Option::is_none")]
    receive_log_seq: Option<u64>,
}

/// Read `log` from `options.seq` and render the entries as a JSON array
pub fn drain<M>(log: &Log<M>, options: DrainOptions) -> Result<String>
where
    M: Envelope + DeserializeOwned,
{
    let start = Instant::now();

    let mut query_options = QueryOptions::new()
        .gte(options.seq)
        .seq_wrap(options.seq_wrap);
    if let Some(n) = options.limit {
        query_options = query_options.limit(n);
    }
    let mut query = log.query_with(&query_options)?;

    let cancel = CancelToken::never();
    let mut out = String::from("[");
    let mut count = 0usize;

    for entry in query.iter(&cancel) {
        let (receive_log_seq, msg) = match entry? {
            Entry::Sequenced(seq, msg) => (Some(seq), msg),
            Entry::Value(msg) => (None, msg),
            Entry::Tombstone(seq) => {
                tracing::trace!(seq, "drain skipped nulled entry");
                continue;
            }
        };

        let value: &RawValue = serde_json::from_str(msg.content())?;
        let kv = KeyValue {
            key: msg.key(),
            value,
            timestamp: msg.received_ms(),
            receive_log_seq,
        };

        if count > 0 {
            out.push(',');
        }
        out.push_str(&serde_json::to_string(&kv)?);
        count += 1;
    }
    out.push(']');

    if count > 0 {
        tracing::info!(msgs = count, took = ?start.elapsed(), "drained log chunk");
    }
    Ok(out)
}

/// Boundary form of [`drain`]: errors are logged and reported as `None`
pub fn stream_log<M>(slot: &NodeSlot<M>, seq: u64, limit: Option<usize>) -> Option<String>
where
    M: Envelope + DeserializeOwned,
{
    let result = slot.get().and_then(|node| {
        let mut options = DrainOptions::from_seq(seq);
        options.limit = limit;
        drain(node.log(), options)
    });

    match result {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(seq, ?limit, "stream_log: draining failed: {}", e);
            None
        }
    }
}

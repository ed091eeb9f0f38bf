//! Tests for the JSON drain
//!
//! These tests verify:
//! - Output shape and field names
//! - Tombstones skipped without breaking order
//! - Limit and start sequence handling
//! - The boundary form logs and returns None on failure
//! - Loading JSON-lines input

use std::fs;

use serde_json::Value;
use tempfile::TempDir;

use seqlog::drain::{drain, stream_log, DrainOptions, Envelope, Message};
use seqlog::node::NodeSlot;
use seqlog::{Config, Log, SeqLogError};

// =============================================================================
// Helper Functions
// =============================================================================

fn message(n: u32) -> Message {
    Message {
        key: format!("%key{}", n),
        content: format!(r#"{{"type":"post","n":{}}}"#, n),
        received_ms: 1_700_000_000_000 + n as u64,
    }
}

fn setup_log(count: u32) -> Log<Message> {
    let log = Log::new(Config::default()).unwrap();
    for n in 0..count {
        log.append(&message(n)).unwrap();
    }
    log
}

fn parse(json: &str) -> Vec<Value> {
    match serde_json::from_str(json).unwrap() {
        Value::Array(items) => items,
        other => panic!("expected array, got {}", other),
    }
}

fn receive_seqs(items: &[Value]) -> Vec<u64> {
    items
        .iter()
        .map(|v| v["ReceiveLogSeq"].as_u64().unwrap())
        .collect()
}

// =============================================================================
// Output Shape Tests
// =============================================================================

#[test]
fn test_empty_log_drains_to_empty_array() {
    let log = setup_log(0);

    assert_eq!(drain(&log, DrainOptions::default()).unwrap(), "[]");
}

#[test]
fn test_start_past_end_drains_to_empty_array() {
    let log = setup_log(3);

    assert_eq!(drain(&log, DrainOptions::from_seq(3)).unwrap(), "[]");
}

#[test]
fn test_object_fields() {
    let log = setup_log(1);

    let items = parse(&drain(&log, DrainOptions::default()).unwrap());

    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item["key"], "%key0");
    assert_eq!(item["value"]["type"], "post");
    assert_eq!(item["value"]["n"], 0);
    assert_eq!(item["timestamp"], 1_700_000_000_000u64);
    assert_eq!(item["ReceiveLogSeq"], 0);
}

#[test]
fn test_without_seq_wrap_omits_receive_seq() {
    let log = setup_log(2);

    let json = drain(&log, DrainOptions::default().seq_wrap(false)).unwrap();
    let items = parse(&json);

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|v| v.get("ReceiveLogSeq").is_none()));
}

#[test]
fn test_payload_embedded_verbatim() {
    let log: Log<Message> = Log::new(Config::default()).unwrap();
    log.append(&Message {
        key: "%raw".to_string(),
        content: r#"{"b":1,"a":[true,null]}"#.to_string(),
        received_ms: 5,
    })
    .unwrap();

    let json = drain(&log, DrainOptions::default()).unwrap();

    assert!(json.contains(r#""value":{"b":1,"a":[true,null]}"#));
}

// =============================================================================
// Range and Limit Tests
// =============================================================================

#[test]
fn test_drain_from_seq_with_limit() {
    let log = setup_log(10);

    let items = parse(&drain(&log, DrainOptions::from_seq(4).limit(3)).unwrap());

    assert_eq!(receive_seqs(&items), vec![4, 5, 6]);
}

#[test]
fn test_tombstones_skipped_in_order() {
    let log = setup_log(5);
    log.null(1).unwrap();
    log.null(3).unwrap();

    let items = parse(&drain(&log, DrainOptions::default()).unwrap());

    assert_eq!(receive_seqs(&items), vec![0, 2, 4]);
}

#[test]
fn test_tombstones_use_up_limit() {
    let log = setup_log(5);
    log.null(0).unwrap();

    let items = parse(&drain(&log, DrainOptions::default().limit(2)).unwrap());

    // Two positions read (0 and 1), one of them redacted
    assert_eq!(receive_seqs(&items), vec![1]);
}

#[test]
fn test_all_tombstones_drain_to_empty_array() {
    let log = setup_log(2);
    log.null(0).unwrap();
    log.null(1).unwrap();

    assert_eq!(drain(&log, DrainOptions::default()).unwrap(), "[]");
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_invalid_payload_json_fails() {
    let log: Log<Message> = Log::new(Config::default()).unwrap();
    log.append(&Message {
        key: "%bad".to_string(),
        content: "{not json".to_string(),
        received_ms: 0,
    })
    .unwrap();

    assert!(matches!(
        drain(&log, DrainOptions::default()),
        Err(SeqLogError::Serialization(_))
    ));
}

#[test]
fn test_malformed_record_fails() {
    let log: Log<Message> = Log::new(Config::default()).unwrap();
    log.append_encoded(&[0xFF]).unwrap();

    assert!(matches!(
        drain(&log, DrainOptions::default()),
        Err(SeqLogError::IndexFault { seq: 0, .. })
    ));
}

// =============================================================================
// Boundary Tests
// =============================================================================

#[test]
fn test_stream_log_not_started_returns_none() {
    let slot: NodeSlot<Message> = NodeSlot::new();

    assert_eq!(stream_log(&slot, 0, None), None);
}

#[test]
fn test_stream_log_started() {
    let slot: NodeSlot<Message> = NodeSlot::new();
    let node = slot.start(Config::default()).unwrap();
    for n in 0..4 {
        node.log().append(&message(n)).unwrap();
    }

    let json = stream_log(&slot, 1, Some(2)).unwrap();

    assert_eq!(receive_seqs(&parse(&json)), vec![1, 2]);
}

#[test]
fn test_stream_log_error_returns_none() {
    let slot: NodeSlot<Message> = NodeSlot::new();
    let node = slot.start(Config::default()).unwrap();
    node.log().append_encoded(b"garbage").unwrap();

    assert_eq!(stream_log(&slot, 0, None), None);
}

// =============================================================================
// Message Tests
// =============================================================================

#[test]
fn test_message_new_derives_key() {
    let msg = Message::new(r#"{"hello":"world"}"#);

    assert_eq!(msg.key(), Message::content_key(r#"{"hello":"world"}"#));
    assert!(msg.key().starts_with('%'));
    assert_eq!(msg.key().len(), 9);
    assert!(msg.received_ms() > 0);
}

#[test]
fn test_read_jsonl() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("messages.jsonl");
    fs::write(&path, "{\"n\":1}\n\n  {\"n\":2}  \n[3]\n").unwrap();

    let messages = Message::read_jsonl(&path).unwrap();

    let contents: Vec<&str> = messages.iter().map(|m| m.content()).collect();
    assert_eq!(contents, vec!["{\"n\":1}", "{\"n\":2}", "[3]"]);
}

#[test]
fn test_read_jsonl_rejects_invalid_line() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.jsonl");
    fs::write(&path, "{\"ok\":true}\nnope\n").unwrap();

    assert!(matches!(
        Message::read_jsonl(&path),
        Err(SeqLogError::Serialization(_))
    ));
}

#[test]
fn test_read_jsonl_missing_file() {
    let temp_dir = TempDir::new().unwrap();

    assert!(matches!(
        Message::read_jsonl(&temp_dir.path().join("absent.jsonl")),
        Err(SeqLogError::Io(_))
    ));
}

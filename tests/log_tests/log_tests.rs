//! Tests for Log
//!
//! These tests verify:
//! - Append sequencing and accessors
//! - Point reads and redaction
//! - Config validation and record size limits
//! - Readers running concurrently with a writer

use std::thread;

use serde::{Deserialize, Serialize};

use seqlog::store::FRAME_HEADER_SIZE;
use seqlog::{CancelToken, Config, Entry, Log, SeqLogError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Event {
    id: u32,
    body: String,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_log() -> Log<Event> {
    Log::new(Config::default()).unwrap()
}

fn event(id: u32) -> Event {
    Event {
        id,
        body: format!("event body {}", id),
    }
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_new_log_is_empty() {
    let log = setup_log();

    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
    assert_eq!(log.last_seq(), None);
    assert_eq!(log.store_size(), 0);
}

#[test]
fn test_append_assigns_sequences_from_zero() {
    let log = setup_log();

    for i in 0..10 {
        assert_eq!(log.append(&event(i)).unwrap(), i as u64);
    }

    assert_eq!(log.len(), 10);
    assert_eq!(log.last_seq(), Some(9));
}

#[test]
fn test_store_grows_by_frame() {
    let log: Log<Vec<u8>> = Log::new(Config::default()).unwrap();

    log.append_encoded(b"12345").unwrap();

    assert_eq!(log.store_size(), FRAME_HEADER_SIZE + 5);
}

#[test]
fn test_clones_share_the_log() {
    let log = setup_log();
    let other = log.clone();

    other.append(&event(1)).unwrap();

    assert_eq!(log.len(), 1);
    assert_eq!(log.get(0).unwrap(), Some(Entry::Sequenced(0, event(1))));
}

// =============================================================================
// Get Tests
// =============================================================================

#[test]
fn test_get_existing_and_missing() {
    let log = setup_log();
    log.append(&event(1)).unwrap();
    log.append(&event(2)).unwrap();

    assert_eq!(log.get(1).unwrap(), Some(Entry::Sequenced(1, event(2))));
    assert_eq!(log.get(2).unwrap(), None);
    assert_eq!(log.get(u64::MAX).unwrap(), None);
}

// =============================================================================
// Null Tests
// =============================================================================

#[test]
fn test_null_keeps_position() {
    let log = setup_log();
    for i in 0..3 {
        log.append(&event(i)).unwrap();
    }

    log.null(1).unwrap();

    assert_eq!(log.len(), 3);
    assert_eq!(log.get(1).unwrap(), Some(Entry::Tombstone(1)));
    assert_eq!(log.get(2).unwrap(), Some(Entry::Sequenced(2, event(2))));
}

#[test]
fn test_null_unknown_seq() {
    let log = setup_log();
    log.append(&event(0)).unwrap();

    assert!(matches!(log.null(5), Err(SeqLogError::SeqNotFound(5))));
}

#[test]
fn test_null_twice_is_fine() {
    let log = setup_log();
    log.append(&event(0)).unwrap();

    log.null(0).unwrap();
    log.null(0).unwrap();

    assert_eq!(log.get(0).unwrap(), Some(Entry::Tombstone(0)));
}

#[test]
fn test_append_after_null_continues_sequence() {
    let log = setup_log();
    log.append(&event(0)).unwrap();
    log.null(0).unwrap();

    assert_eq!(log.append(&event(1)).unwrap(), 1);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_zero_max_record_size_rejected() {
    let config = Config::builder().max_record_size(0).build();

    let result: seqlog::Result<Log<Event>> = Log::new(config);
    assert!(matches!(result, Err(SeqLogError::Config(_))));
}

#[test]
fn test_record_too_large_rejected() {
    let config = Config::builder().max_record_size(16).build();
    let log: Log<String> = Log::new(config).unwrap();

    let err = log.append(&"x".repeat(64)).unwrap_err();
    assert!(matches!(err, SeqLogError::RecordTooLarge { max: 16, .. }));

    // Nothing was written
    assert!(log.is_empty());
    assert_eq!(log.append(&"ok".to_string()).unwrap(), 0);
}

#[test]
fn test_builder_sets_fields() {
    let config = Config::builder()
        .initial_index_capacity(8)
        .initial_store_capacity(256)
        .max_record_size(1024)
        .build();

    assert_eq!(config.initial_index_capacity, 8);
    assert_eq!(config.initial_store_capacity, 256);
    assert_eq!(config.max_record_size, 1024);

    let log: Log<Event> = Log::new(config).unwrap();
    assert_eq!(log.config().max_record_size, 1024);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_readers_see_consistent_prefix_during_appends() {
    const RECORDS: u32 = 500;
    let log = setup_log();

    let writer_log = log.clone();
    let writer = thread::spawn(move || {
        for i in 0..RECORDS {
            writer_log.append(&event(i)).unwrap();
        }
    });

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let log = log.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    let mut query = log.query();
                    query.seq_wrap(true).unwrap();
                    let mut expected = 0u64;
                    for entry in query.iter(&CancelToken::never()) {
                        match entry.unwrap() {
                            Entry::Sequenced(seq, ev) => {
                                assert_eq!(seq, expected);
                                assert_eq!(ev, event(seq as u32));
                                expected += 1;
                            }
                            other => panic!("unexpected entry {:?}", other),
                        }
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(log.len(), RECORDS as usize);
}

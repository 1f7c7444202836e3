//! Cursor Tests
//!
//! Tests for the scan cursor state machine and its lazy stream.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt};

use common::{array, bulk, MockTransport};
use redisx::commands::{RedisValueType, ScanArgs};
use redisx::{Command, DataSource, RedisError, Reply, Result};

/// A backend holding `items`, returning `page_size` elements per call.
/// The cursor id is the index of the next element.
fn paging_backend(items: Vec<&'static str>, page_size: usize) -> Arc<MockTransport> {
    MockTransport::with_handler(move |command: &Command| -> Result<Reply> {
        let position = if command.name() == "SCAN" { 0 } else { 1 };
        let start: usize = command.arg_str(position).unwrap().parse().unwrap();
        let end = (start + page_size).min(items.len());
        let next = if end == items.len() { 0 } else { end };
        let page = items[start..end].iter().map(|s| bulk(s)).collect();
        Ok(array(vec![bulk(&next.to_string()), array(page)]))
    })
}

// =============================================================================
// State Machine Tests
// =============================================================================

#[tokio::test]
async fn test_fresh_cursor_has_next_before_any_fetch() {
    let transport = paging_backend(vec!["a"], 10);
    let ds = DataSource::new(transport.clone());
    let cursor = ds.key::<String>().unwrap().scan();

    assert!(cursor.has_next());
    assert_eq!(cursor.cursor_id(), None);
    assert_eq!(transport.command_count(), 0);
}

#[tokio::test]
async fn test_first_fetch_sends_position_zero() {
    let transport = paging_backend(vec!["a", "b"], 1);
    let ds = DataSource::new(transport.clone());
    let mut cursor = ds.key::<String>().unwrap().scan();

    cursor.next().await.unwrap();
    assert_eq!(transport.command_text(0), vec!["SCAN", "0"]);
    assert_eq!(cursor.cursor_id(), Some(1));
}

#[tokio::test]
async fn test_three_elements_one_per_page() {
    let transport = paging_backend(vec!["a", "b", "c"], 1);
    let ds = DataSource::new(transport.clone());
    let mut cursor = ds.key::<String>().unwrap().scan();

    let mut pages = Vec::new();
    while cursor.has_next() {
        pages.push(cursor.next().await.unwrap());
    }

    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|page| page.len() == 1));
    let all: HashSet<String> = pages.into_iter().flatten().collect();
    let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert_eq!(all, expected);
    assert!(!cursor.has_next());
    assert_eq!(transport.names(), vec!["SCAN", "SCAN", "SCAN"]);
}

#[tokio::test]
async fn test_next_after_exhaustion_fails_without_io() {
    let transport = paging_backend(vec!["a"], 10);
    let ds = DataSource::new(transport.clone());
    let mut cursor = ds.key::<String>().unwrap().scan();

    cursor.next().await.unwrap();
    assert!(!cursor.has_next());

    let err = cursor.next().await.unwrap_err();
    assert!(matches!(err, RedisError::IllegalState(_)));
    assert_eq!(transport.command_count(), 1);
}

#[tokio::test]
async fn test_empty_page_does_not_end_scan() {
    let transport = MockTransport::scripted(vec![
        array(vec![bulk("17"), array(vec![])]),
        array(vec![bulk("0"), array(vec![bulk("x")])]),
    ]);
    let ds = DataSource::new(transport.clone());
    let mut cursor = ds.key::<String>().unwrap().scan();

    assert!(cursor.next().await.unwrap().is_empty());
    assert!(cursor.has_next());
    assert_eq!(cursor.next().await.unwrap().len(), 1);
    assert_eq!(transport.command_text(1), vec!["SCAN", "17"]);
    assert!(!cursor.has_next());
}

#[tokio::test]
async fn test_malformed_reply_keeps_position() {
    let transport = MockTransport::scripted(vec![array(vec![bulk("5")])]);
    let ds = DataSource::new(transport.clone());
    let mut cursor = ds.key::<String>().unwrap().scan();

    let err = cursor.next().await.unwrap_err();
    assert!(matches!(err, RedisError::Decoding(_)));
    assert!(cursor.has_next());
    assert_eq!(cursor.cursor_id(), None);
}

#[tokio::test]
async fn test_server_error_surfaces() {
    let transport = MockTransport::scripted(vec![Reply::Error("ERR invalid cursor".into())]);
    let ds = DataSource::new(transport);
    let mut cursor = ds.key::<String>().unwrap().scan();

    assert!(cursor.next().await.unwrap_err().is_server_error());
}

// =============================================================================
// Stream Tests
// =============================================================================

#[tokio::test]
async fn test_stream_flattens_every_page() {
    let transport = paging_backend(vec!["a", "b", "c", "d", "e"], 2);
    let ds = DataSource::new(transport.clone());
    let cursor = ds.set::<String, String>().unwrap().sscan(&"s".to_string()).unwrap();

    let mut items: Vec<String> = cursor.into_stream().try_collect().await.unwrap();
    items.sort();

    assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(transport.command_count(), 3);
}

#[tokio::test]
async fn test_stream_is_lazy() {
    let transport = paging_backend(vec!["a", "b", "c"], 1);
    let ds = DataSource::new(transport.clone());
    let cursor = ds.key::<String>().unwrap().scan();

    let stream = cursor.into_stream();
    assert_eq!(transport.command_count(), 0);

    let first: Vec<_> = stream.take(1).collect().await;
    assert_eq!(first.len(), 1);
    assert_eq!(transport.command_count(), 1);
}

#[tokio::test]
async fn test_stream_ends_after_error() {
    let transport = MockTransport::scripted(vec![
        array(vec![bulk("3"), array(vec![bulk("a")])]),
        Reply::Error("ERR boom".into()),
    ]);
    let ds = DataSource::new(transport.clone());
    let cursor = ds.key::<String>().unwrap().scan();

    let results: Vec<_> = cursor.into_stream().collect().await;
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(transport.command_count(), 2);
}

// =============================================================================
// Family Tests
// =============================================================================

#[tokio::test]
async fn test_scan_with_args() {
    let transport = paging_backend(vec![], 1);
    let ds = DataSource::new(transport.clone());
    let args = ScanArgs::new()
        .pattern("user:*")
        .count(50)
        .value_type(RedisValueType::Hash);
    let mut cursor = ds.key::<String>().unwrap().scan_with_args(&args).unwrap();

    cursor.next().await.unwrap();
    assert_eq!(
        transport.command_text(0),
        vec!["SCAN", "0", "MATCH", "user:*", "COUNT", "50", "TYPE", "hash"]
    );
}

#[tokio::test]
async fn test_invalid_scan_args_rejected_before_io() {
    let transport = MockTransport::new();
    let ds = DataSource::new(transport.clone());

    let err = ds
        .key::<String>()
        .unwrap()
        .scan_with_args(&ScanArgs::new().count(0))
        .unwrap_err();
    assert!(matches!(err, RedisError::InvalidArgument { name: "count", .. }));
    assert_eq!(transport.command_count(), 0);
}

#[tokio::test]
async fn test_hscan_decodes_field_value_pages() {
    let transport = MockTransport::scripted(vec![array(vec![
        bulk("0"),
        array(vec![bulk("f1"), bulk("1"), bulk("f2"), bulk("2")]),
    ])]);
    let ds = DataSource::new(transport.clone());
    let hash = ds.hash::<String, String, i64>().unwrap();
    let args = ScanArgs::new().value_type(RedisValueType::Hash);
    let mut cursor = hash.hscan_with_args(&"h".to_string(), &args).unwrap();

    let page = cursor.next().await.unwrap();
    assert_eq!(page.get("f1"), Some(&1));
    assert_eq!(page.get("f2"), Some(&2));
    // TYPE only applies to SCAN
    assert_eq!(transport.command_text(0), vec!["HSCAN", "h", "0"]);
}

#[tokio::test]
async fn test_zscan_decodes_scored_members() {
    let transport = MockTransport::scripted(vec![array(vec![
        bulk("0"),
        array(vec![bulk("m1"), bulk("1.5"), bulk("m2"), bulk("inf")]),
    ])]);
    let ds = DataSource::new(transport);
    let zset = ds.sorted_set::<String, String>().unwrap();
    let mut cursor = zset.zscan(&"z".to_string()).unwrap();

    let page = cursor.next().await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].value, "m1");
    assert_eq!(page[0].score, 1.5);
    assert_eq!(page[1].score, f64::INFINITY);
}

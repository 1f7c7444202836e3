//! Blocking Facade Tests
//!
//! The facade is driven from plain test threads against an owned runtime.

#[path = "../common/mod.rs"]
mod common;

use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

use common::{array, bulk, MockTransport};
use redisx::{Config, DataSource, RedisError, Reply};

fn runtime() -> Runtime {
    Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

fn key(name: &str) -> String {
    name.to_string()
}

// =============================================================================
// Wait Tests
// =============================================================================

#[test]
fn test_wait_returns_value() {
    let rt = runtime();
    let transport = MockTransport::scripted(vec![bulk("v")]);
    let ds = DataSource::new(transport.clone());
    let blocking = ds.blocking(rt.handle().clone());

    let values = blocking.data_source().value::<String, String>().unwrap();
    let value = blocking.wait(values.get(&key("k"))).unwrap();

    assert_eq!(value.as_deref(), Some("v"));
    assert_eq!(transport.names(), vec!["GET"]);
}

#[test]
fn test_wait_surfaces_operation_errors() {
    let rt = runtime();
    let transport = MockTransport::scripted(vec![Reply::Error("ERR boom".into())]);
    let blocking = DataSource::new(transport).blocking(rt.handle().clone());

    let keys = blocking.data_source().key::<String>().unwrap();
    assert!(blocking.wait(keys.exists(&key("k"))).unwrap_err().is_server_error());
}

#[test]
fn test_slow_operation_times_out() {
    let rt = runtime();
    let transport = MockTransport::slow(Duration::from_secs(2), vec![Reply::ok()]);
    let blocking = DataSource::new(transport)
        .blocking(rt.handle().clone())
        .with_timeout(Duration::from_millis(50));

    let values = blocking.data_source().value::<String, String>().unwrap();
    let err = blocking.wait(values.set(&key("k"), &"v".to_string())).unwrap_err();

    assert!(matches!(err, RedisError::Timeout(t) if t == Duration::from_millis(50)));
}

#[test]
fn test_configured_timeout_is_used() {
    let rt = runtime();
    let config = Config::builder().blocking_timeout_ms(250).build();
    let ds = DataSource::new(MockTransport::new()).with_config(config).unwrap();

    assert_eq!(ds.blocking(rt.handle().clone()).timeout(), Duration::from_millis(250));
}

#[test]
fn test_zero_timeout_config_is_rejected() {
    let config = Config::builder().blocking_timeout_ms(0).build();
    let err = DataSource::new(MockTransport::new()).with_config(config).unwrap_err();
    assert!(matches!(err, RedisError::Config(_)));
}

#[tokio::test]
async fn test_wait_inside_runtime_is_illegal() {
    let transport = MockTransport::scripted(vec![bulk("v")]);
    let ds = DataSource::new(transport.clone());
    let blocking = ds.blocking(tokio::runtime::Handle::current());

    let values = ds.value::<String, String>().unwrap();
    let err = blocking.wait(values.get(&key("k"))).unwrap_err();

    assert!(matches!(err, RedisError::IllegalState(_)));
    assert_eq!(transport.command_count(), 0);
}

#[test]
fn test_current_thread_runtime_is_rejected() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    let transport = MockTransport::scripted(vec![bulk("v")]);
    let blocking = DataSource::new(transport.clone())
        .blocking(rt.handle().clone())
        .with_timeout(Duration::from_millis(100));

    let values = blocking.data_source().value::<String, String>().unwrap();
    let err = blocking.wait(values.get(&key("k"))).unwrap_err();

    assert!(matches!(err, RedisError::IllegalState(ref msg) if msg.contains("multi-thread")));
    assert_eq!(transport.command_count(), 0);
}

// =============================================================================
// Transaction and Cursor Tests
// =============================================================================

#[test]
fn test_blocking_transaction() {
    let rt = runtime();
    let transport = MockTransport::scripted(vec![
        Reply::ok(),
        Reply::queued(),
        array(vec![Reply::Integer(1)]),
    ]);
    let blocking = DataSource::new(transport.clone()).blocking(rt.handle().clone());

    let result = blocking
        .with_transaction(|tx| async move {
            tx.value::<String, i64>()?.incr(&key("n")).await?;
            Ok::<_, RedisError>(())
        })
        .unwrap();

    assert_eq!(result.get::<i64>(0), Some(&1));
    assert_eq!(transport.names(), vec!["MULTI", "INCR", "EXEC"]);
}

#[test]
fn test_blocking_iter_walks_every_page() {
    let rt = runtime();
    let transport = MockTransport::scripted(vec![
        array(vec![bulk("4"), array(vec![bulk("a"), bulk("b")])]),
        array(vec![bulk("0"), array(vec![bulk("c")])]),
    ]);
    let blocking = DataSource::new(transport.clone()).blocking(rt.handle().clone());

    let cursor = blocking.data_source().key::<String>().unwrap().scan();
    let mut keys: Vec<String> = blocking
        .iter(cursor)
        .collect::<redisx::Result<Vec<_>>>()
        .unwrap();
    keys.sort();

    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(transport.command_count(), 2);
}

#[test]
fn test_blocking_iter_stops_after_error() {
    let rt = runtime();
    let transport = MockTransport::scripted(vec![
        array(vec![bulk("4"), array(vec![bulk("a")])]),
        Reply::Error("ERR boom".into()),
    ]);
    let blocking = DataSource::new(transport).blocking(rt.handle().clone());

    let cursor = blocking.data_source().key::<String>().unwrap().scan();
    let results: Vec<_> = blocking.iter(cursor).collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

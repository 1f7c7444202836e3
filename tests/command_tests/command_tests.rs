//! Command Group Tests
//!
//! Tests for argument building, validation and reply decoding of every
//! command group, in direct mode.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use common::{array, bulk, MockTransport};
use redisx::codec::Codecs;
use redisx::commands::{RedisValueType, ScoredValue, SetArgs, ZAddArgs, ROOT_PATH};
use redisx::{Args, DataSource, RedisError, Reply};

fn key(name: &str) -> String {
    name.to_string()
}

// =============================================================================
// Validation Tests
// =============================================================================

#[tokio::test]
async fn test_invalid_arguments_never_reach_transport() {
    let transport = MockTransport::new();
    let ds = DataSource::new(transport.clone());

    let keys = ds.key::<String>().unwrap();
    assert!(matches!(
        keys.del(&[]).await,
        Err(RedisError::InvalidArgument { name: "keys", .. })
    ));
    assert!(keys.keys("   ").await.is_err());

    let values = ds.value::<String, String>().unwrap();
    assert!(values.mget(&[]).await.is_err());
    assert!(values.mset(&[]).await.is_err());

    let bloom = ds.bloom::<String, String>().unwrap();
    assert!(matches!(
        bloom.bf_reserve(&key("b"), 1.5, 100, &Args::new()).await,
        Err(RedisError::InvalidArgument { name: "error_rate", .. })
    ));
    assert!(bloom.bf_reserve(&key("b"), 0.01, 0, &Args::new()).await.is_err());

    let bitmap = ds.bitmap::<String>().unwrap();
    assert!(bitmap.setbit(&key("bits"), -1, true).await.is_err());

    assert!(ds.search().ft_search("idx", "", &Args::new()).await.is_err());
    assert!(ds.execute("", &Args::new()).await.is_err());

    assert_eq!(transport.command_count(), 0);
}

#[tokio::test]
async fn test_missing_codec_fails_group_construction() {
    #[derive(Debug)]
    struct Unregistered;

    let ds = DataSource::new(MockTransport::new());
    let err = ds.value::<String, Unregistered>().err().unwrap();
    assert!(matches!(err, RedisError::Encoding(_)));
}

#[tokio::test]
async fn test_server_error_in_direct_mode() {
    let transport = MockTransport::scripted(vec![Reply::Error(
        "WRONGTYPE Operation against a key holding the wrong kind of value".into(),
    )]);
    let ds = DataSource::new(transport);

    let err = ds.value::<String, String>().unwrap().get(&key("k")).await.unwrap_err();
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let transport = MockTransport::new();
    transport.push_err(RedisError::Transport("connection reset".into()));
    let ds = DataSource::new(transport);

    let err = ds.key::<String>().unwrap().exists(&key("k")).await.unwrap_err();
    assert!(matches!(err, RedisError::Transport(_)));
}

// =============================================================================
// Value Tests
// =============================================================================

#[tokio::test]
async fn test_get_integer_reply_decodes_to_i64() {
    let transport = MockTransport::scripted(vec![Reply::Integer(42)]);
    let ds = DataSource::new(transport.clone());

    let value = ds.value::<String, i64>().unwrap().get(&key("n")).await.unwrap();
    assert_eq!(value, Some(42));
    assert_eq!(transport.command_text(0), vec!["GET", "n"]);
}

#[tokio::test]
async fn test_get_missing_key_is_none() {
    let transport = MockTransport::scripted(vec![Reply::Nil]);
    let ds = DataSource::new(transport);

    let value = ds.value::<String, String>().unwrap().get(&key("k")).await.unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn test_set_with_args() {
    let transport = MockTransport::scripted(vec![Reply::ok(), Reply::Nil]);
    let ds = DataSource::new(transport.clone());
    let values = ds.value::<String, String>().unwrap();
    let args = SetArgs::new().ex(10).nx();

    assert!(values.set_with_args(&key("k"), &"v".to_string(), &args).await.unwrap());
    assert!(!values.set_with_args(&key("k"), &"v".to_string(), &args).await.unwrap());
    assert_eq!(transport.command_text(0), vec!["SET", "k", "v", "EX", "10", "NX"]);
}

#[tokio::test]
async fn test_set_get_returns_previous_value() {
    let transport = MockTransport::scripted(vec![bulk("old")]);
    let ds = DataSource::new(transport.clone());
    let values = ds.value::<String, String>().unwrap();

    let previous = values
        .set_get(&key("k"), &"new".to_string(), &SetArgs::new())
        .await
        .unwrap();
    assert_eq!(previous.as_deref(), Some("old"));
    assert_eq!(transport.command_text(0), vec!["SET", "k", "new", "GET"]);
}

#[test]
fn test_set_args_conflicts() {
    assert!(SetArgs::new().ex(1).px(1000).to_args().is_err());
    assert!(SetArgs::new().ex(1).keep_ttl().to_args().is_err());
    assert!(SetArgs::new().nx().xx().to_args().is_err());
    assert!(SetArgs::new().pxat(1).xx().get().to_args().is_ok());
}

#[test]
fn test_zadd_args_conflicts() {
    assert!(ZAddArgs::new().nx().xx().to_args().is_err());
    assert!(ZAddArgs::new().gt().lt().to_args().is_err());
    assert!(ZAddArgs::new().nx().gt().to_args().is_err());
    assert_eq!(ZAddArgs::new().xx().gt().ch().to_args().unwrap().len(), 3);
}

#[tokio::test]
async fn test_mget_keeps_positions() {
    let transport = MockTransport::scripted(vec![array(vec![bulk("1"), Reply::Nil, bulk("3")])]);
    let ds = DataSource::new(transport.clone());

    let values = ds
        .value::<String, i64>()
        .unwrap()
        .mget(&[key("a"), key("b"), key("c")])
        .await
        .unwrap();
    assert_eq!(values, vec![Some(1), None, Some(3)]);
    assert_eq!(transport.command_text(0), vec!["MGET", "a", "b", "c"]);
}

#[tokio::test]
async fn test_mset_interleaves_pairs() {
    let transport = MockTransport::scripted(vec![Reply::ok()]);
    let ds = DataSource::new(transport.clone());

    ds.value::<String, i64>()
        .unwrap()
        .mset(&[(key("a"), 1), (key("b"), 2)])
        .await
        .unwrap();
    assert_eq!(transport.command_text(0), vec!["MSET", "a", "1", "b", "2"]);
}

#[tokio::test]
async fn test_incrbyfloat() {
    let transport = MockTransport::scripted(vec![bulk("10.5")]);
    let ds = DataSource::new(transport.clone());

    let value = ds
        .value::<String, String>()
        .unwrap()
        .incrbyfloat(&key("f"), 0.5)
        .await
        .unwrap();
    assert_eq!(value, 10.5);
    assert_eq!(transport.command_text(0), vec!["INCRBYFLOAT", "f", "0.5"]);
}

// =============================================================================
// Key Tests
// =============================================================================

#[tokio::test]
async fn test_exists_integer_reply_decodes_to_bool() {
    let transport = MockTransport::scripted(vec![Reply::Integer(1), Reply::Integer(0)]);
    let ds = DataSource::new(transport);
    let keys = ds.key::<String>().unwrap();

    assert!(keys.exists(&key("a")).await.unwrap());
    assert!(!keys.exists(&key("b")).await.unwrap());
}

#[tokio::test]
async fn test_key_type() {
    let transport = MockTransport::scripted(vec![Reply::Simple("zset".into())]);
    let ds = DataSource::new(transport);

    let value_type = ds.key::<String>().unwrap().key_type(&key("z")).await.unwrap();
    assert_eq!(value_type, RedisValueType::ZSet);
}

#[tokio::test]
async fn test_del_sends_every_key() {
    let transport = MockTransport::scripted(vec![Reply::Integer(2)]);
    let ds = DataSource::new(transport.clone());

    let removed = ds.key::<String>().unwrap().del(&[key("a"), key("b")]).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(transport.command_text(0), vec!["DEL", "a", "b"]);
}

// =============================================================================
// Hash Tests
// =============================================================================

#[tokio::test]
async fn test_hgetall_flat_and_map_replies_agree() {
    let transport = MockTransport::scripted(vec![
        array(vec![bulk("name"), bulk("ada"), bulk("lang"), bulk("rust")]),
        Reply::Map(vec![
            (bulk("name"), bulk("ada")),
            (bulk("lang"), bulk("rust")),
        ]),
    ]);
    let ds = DataSource::new(transport);
    let hash = ds.hash::<String, String, String>().unwrap();

    let flat = hash.hgetall(&key("h")).await.unwrap();
    let map = hash.hgetall(&key("h")).await.unwrap();

    let expected: HashMap<String, String> = [
        ("name".to_string(), "ada".to_string()),
        ("lang".to_string(), "rust".to_string()),
    ]
    .into();
    assert_eq!(flat, expected);
    assert_eq!(map, expected);
}

#[tokio::test]
async fn test_hmget_keeps_positions() {
    let transport = MockTransport::scripted(vec![array(vec![Reply::Nil, bulk("7")])]);
    let ds = DataSource::new(transport.clone());

    let values = ds
        .hash::<String, String, i64>()
        .unwrap()
        .hmget(&key("h"), &[key("a"), key("b")])
        .await
        .unwrap();
    assert_eq!(values, vec![None, Some(7)]);
    assert_eq!(transport.command_text(0), vec!["HMGET", "h", "a", "b"]);
}

// =============================================================================
// Set / Sorted Set Tests
// =============================================================================

#[tokio::test]
async fn test_smembers_decodes_a_set() {
    let transport = MockTransport::scripted(vec![array(vec![bulk("a"), bulk("b"), bulk("a")])]);
    let ds = DataSource::new(transport);

    let members = ds.set::<String, String>().unwrap().smembers(&key("s")).await.unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.contains("a"));
}

#[tokio::test]
async fn test_zrange_with_scores_flat_and_nested() {
    let transport = MockTransport::scripted(vec![
        array(vec![bulk("a"), bulk("1"), bulk("b"), bulk("2.5")]),
        array(vec![
            array(vec![bulk("a"), Reply::Double(1.0)]),
            array(vec![bulk("b"), Reply::Double(2.5)]),
        ]),
    ]);
    let ds = DataSource::new(transport.clone());
    let zset = ds.sorted_set::<String, String>().unwrap();

    let expected = vec![
        ScoredValue::new("a".to_string(), 1.0),
        ScoredValue::new("b".to_string(), 2.5),
    ];
    assert_eq!(zset.zrange_with_scores(&key("z"), 0, -1).await.unwrap(), expected);
    assert_eq!(zset.zrange_with_scores(&key("z"), 0, -1).await.unwrap(), expected);
    assert_eq!(transport.command_text(0), vec!["ZRANGE", "z", "0", "-1", "WITHSCORES"]);
}

#[tokio::test]
async fn test_zadd_with_args_orders_score_before_member() {
    let transport = MockTransport::scripted(vec![Reply::Integer(1)]);
    let ds = DataSource::new(transport.clone());

    let added = ds
        .sorted_set::<String, String>()
        .unwrap()
        .zadd_with_args(
            &key("z"),
            &ZAddArgs::new().xx().ch(),
            &[ScoredValue::new("m".to_string(), f64::INFINITY)],
        )
        .await
        .unwrap();
    assert_eq!(added, 1);
    assert_eq!(transport.command_text(0), vec!["ZADD", "z", "XX", "CH", "+inf", "m"]);
}

#[tokio::test]
async fn test_zscore_missing_member() {
    let transport = MockTransport::scripted(vec![Reply::Nil]);
    let ds = DataSource::new(transport);

    let score = ds
        .sorted_set::<String, String>()
        .unwrap()
        .zscore(&key("z"), &"m".to_string())
        .await
        .unwrap();
    assert_eq!(score, None);
}

// =============================================================================
// List / Bitmap / HyperLogLog Tests
// =============================================================================

#[tokio::test]
async fn test_list_push_and_pop() {
    let transport = MockTransport::scripted(vec![Reply::Integer(2), bulk("x"), Reply::Nil]);
    let ds = DataSource::new(transport.clone());
    let list = ds.list::<String, String>().unwrap();

    let len = list.rpush(&key("l"), &["x".to_string(), "y".to_string()]).await.unwrap();
    assert_eq!(len, 2);
    assert_eq!(list.lpop(&key("l")).await.unwrap().as_deref(), Some("x"));
    assert_eq!(list.lpop(&key("empty")).await.unwrap(), None);
    assert_eq!(transport.command_text(0), vec!["RPUSH", "l", "x", "y"]);
}

#[tokio::test]
async fn test_bitcount_range_is_optional() {
    let transport = MockTransport::scripted(vec![Reply::Integer(4), Reply::Integer(1)]);
    let ds = DataSource::new(transport.clone());
    let bitmap = ds.bitmap::<String>().unwrap();

    assert_eq!(bitmap.bitcount(&key("b"), None).await.unwrap(), 4);
    assert_eq!(bitmap.bitcount(&key("b"), Some((0, 1))).await.unwrap(), 1);
    assert_eq!(transport.command_text(0), vec!["BITCOUNT", "b"]);
    assert_eq!(transport.command_text(1), vec!["BITCOUNT", "b", "0", "1"]);
}

#[tokio::test]
async fn test_pfadd_and_pfmerge() {
    let transport = MockTransport::scripted(vec![Reply::Integer(1), Reply::ok()]);
    let ds = DataSource::new(transport.clone());
    let hll = ds.hyperloglog::<String, String>().unwrap();

    assert!(hll.pfadd(&key("h1"), &["a".to_string(), "b".to_string()]).await.unwrap());
    hll.pfmerge(&key("dest"), &[key("h1"), key("h2")]).await.unwrap();
    assert_eq!(transport.command_text(1), vec!["PFMERGE", "dest", "h1", "h2"]);
}

// =============================================================================
// Module Command Tests
// =============================================================================

#[tokio::test]
async fn test_bloom_multi_flags() {
    let transport = MockTransport::scripted(vec![array(vec![
        Reply::Integer(1),
        Reply::Integer(0),
        Reply::Boolean(true),
    ])]);
    let ds = DataSource::new(transport.clone());

    let flags = ds
        .bloom::<String, String>()
        .unwrap()
        .bf_mexists(&key("bf"), &["a".to_string(), "b".to_string(), "c".to_string()])
        .await
        .unwrap();
    assert_eq!(flags, vec![true, false, true]);
    assert_eq!(transport.command_text(0), vec!["BF.MEXISTS", "bf", "a", "b", "c"]);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    tags: Vec<String>,
}

#[tokio::test]
async fn test_json_set_and_get() {
    let transport = MockTransport::scripted(vec![
        Reply::ok(),
        bulk(r#"{"name":"ada","tags":["math"]}"#),
        Reply::Nil,
    ]);
    let ds = DataSource::new(transport.clone());
    let json = ds.json::<String>().unwrap();
    let profile = Profile {
        name: "ada".to_string(),
        tags: vec!["math".to_string()],
    };

    json.json_set(&key("p"), ROOT_PATH, &profile).await.unwrap();
    assert_eq!(
        transport.command_text(0),
        vec!["JSON.SET", "p", "$", r#"{"name":"ada","tags":["math"]}"#]
    );

    let fetched: Option<Profile> = json.json_get(&key("p")).await.unwrap();
    assert_eq!(fetched, Some(profile));

    let missing: Option<Profile> = json.json_get(&key("nope")).await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_json_invalid_document_is_decoding_error() {
    let transport = MockTransport::scripted(vec![bulk("{not json")]);
    let ds = DataSource::new(transport);

    let err = ds
        .json::<String>()
        .unwrap()
        .json_get::<Profile>(&key("p"))
        .await
        .unwrap_err();
    assert!(matches!(err, RedisError::Decoding(_)));
}

#[tokio::test]
async fn test_json_arr_len_per_match() {
    let transport = MockTransport::scripted(vec![array(vec![Reply::Integer(3), Reply::Nil])]);
    let ds = DataSource::new(transport);

    let lengths = ds
        .json::<String>()
        .unwrap()
        .json_arr_len(&key("p"), "$..tags")
        .await
        .unwrap();
    assert_eq!(lengths, vec![Some(3), None]);
}

#[tokio::test]
async fn test_search_flat_reply() {
    let transport = MockTransport::scripted(vec![array(vec![
        Reply::Integer(2),
        bulk("doc:1"),
        array(vec![bulk("title"), bulk("hello")]),
        bulk("doc:2"),
        array(vec![bulk("title"), bulk("world")]),
    ])]);
    let ds = DataSource::new(transport.clone());

    let result = ds.search().ft_search("idx", "@title:h*", &Args::new()).await.unwrap();
    assert_eq!(result.total, 2);
    assert_eq!(result.count(), 2);
    let doc = result.document("doc:2").unwrap();
    assert_eq!(doc.properties.get("title").map(String::as_str), Some("world"));
    assert_eq!(doc.score, None);
    assert_eq!(transport.command_text(0), vec!["FT.SEARCH", "idx", "@title:h*"]);
}

#[tokio::test]
async fn test_search_with_scores_and_no_content() {
    let transport = MockTransport::scripted(vec![array(vec![
        Reply::Integer(10),
        bulk("doc:1"),
        bulk("0.75"),
        bulk("doc:2"),
        bulk("0.5"),
    ])]);
    let ds = DataSource::new(transport);
    let args = Args::new().arg("withscores").arg("NOCONTENT").arg("LIMIT").arg(0).arg(2);

    let result = ds.search().ft_search("idx", "*", &args).await.unwrap();
    // total counts every match, not just this page
    assert_eq!(result.total, 10);
    assert_eq!(result.count(), 2);
    assert_eq!(result.documents[0].score, Some(0.75));
    assert!(result.documents[1].properties.is_empty());
}

#[tokio::test]
async fn test_search_flag_spelled_operands_do_not_change_shape() {
    let transport = MockTransport::scripted(vec![
        array(vec![
            Reply::Integer(1),
            bulk("doc:1"),
            array(vec![bulk("title"), bulk("x")]),
        ]),
        array(vec![
            Reply::Integer(1),
            bulk("doc:1"),
            array(vec![bulk("withscores"), bulk("x")]),
        ]),
    ]);
    let ds = DataSource::new(transport);

    let params = Args::new().arg("PARAMS").arg(2).arg("term").arg("withscores").arg("DIALECT").arg(2);
    let result = ds.search().ft_search("idx", "$term", &params).await.unwrap();
    let doc = result.document("doc:1").unwrap();
    assert_eq!(doc.score, None);
    assert_eq!(doc.properties.get("title").map(String::as_str), Some("x"));

    let returned = Args::new().arg("RETURN").arg(1).arg("nocontent");
    let result = ds.search().ft_search("idx", "*", &returned).await.unwrap();
    assert_eq!(result.documents[0].properties.len(), 1);
}

#[tokio::test]
async fn test_search_map_reply() {
    let transport = MockTransport::scripted(vec![Reply::Map(vec![
        (bulk("total_results"), Reply::Integer(1)),
        (
            bulk("results"),
            array(vec![Reply::Map(vec![
                (bulk("id"), bulk("doc:1")),
                (bulk("score"), Reply::Double(1.5)),
                (
                    bulk("extra_attributes"),
                    Reply::Map(vec![(bulk("title"), bulk("hello"))]),
                ),
            ])]),
        ),
    ])]);
    let ds = DataSource::new(transport);

    let result = ds.search().ft_search("idx", "hello", &Args::new()).await.unwrap();
    assert_eq!(result.total, 1);
    let doc = &result.documents[0];
    assert_eq!(doc.key, "doc:1");
    assert_eq!(doc.score, Some(1.5));
    assert_eq!(doc.properties.get("title").map(String::as_str), Some("hello"));
}

#[tokio::test]
async fn test_ft_drop_index_with_documents() {
    let transport = MockTransport::scripted(vec![Reply::ok()]);
    let ds = DataSource::new(transport.clone());

    ds.search().ft_drop_index("idx", true).await.unwrap();
    assert_eq!(transport.command_text(0), vec!["FT.DROPINDEX", "idx", "DD"]);
}

#[tokio::test]
async fn test_graph_query_rows_by_column() {
    let transport = MockTransport::scripted(vec![array(vec![
        array(vec![
            array(vec![Reply::Integer(1), bulk("p.name")]),
            array(vec![Reply::Integer(1), bulk("p.age")]),
        ]),
        array(vec![
            array(vec![bulk("ada"), Reply::Integer(36)]),
            array(vec![bulk("alan"), Reply::Integer(41)]),
        ]),
        array(vec![bulk("Query internal execution time: 0.2 milliseconds")]),
    ])]);
    let ds = DataSource::new(transport.clone());

    let result = ds
        .graph::<String>()
        .unwrap()
        .graph_query(&key("social"), "MATCH (p:Person) RETURN p.name, p.age")
        .await
        .unwrap();

    assert_eq!(result.columns, vec!["p.name", "p.age"]);
    assert_eq!(result.len(), 2);
    assert_eq!(result.get(1, "p.name").unwrap().to_string_value().unwrap(), "alan");
    assert_eq!(result.get(0, "p.age").unwrap().to_i64().unwrap(), 36);
    assert_eq!(result.statistics.len(), 1);
}

#[tokio::test]
async fn test_graph_write_query_has_statistics_only() {
    let transport = MockTransport::scripted(vec![array(vec![array(vec![bulk("Nodes created: 1")])])]);
    let ds = DataSource::new(transport);

    let result = ds
        .graph::<String>()
        .unwrap()
        .graph_query(&key("social"), "CREATE (:Person {name: 'ada'})")
        .await
        .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.statistics, vec!["Nodes created: 1"]);
}

#[tokio::test]
async fn test_graph_row_width_mismatch_is_rejected() {
    let transport = MockTransport::scripted(vec![array(vec![
        array(vec![bulk("a"), bulk("b")]),
        array(vec![array(vec![Reply::Integer(1)])]),
        array(vec![]),
    ])]);
    let ds = DataSource::new(transport);

    let err = ds
        .graph::<String>()
        .unwrap()
        .graph_query(&key("g"), "RETURN 1")
        .await
        .unwrap_err();
    assert!(matches!(err, RedisError::Decoding(_)));
}

#[tokio::test]
async fn test_publish_returns_receivers() {
    let transport = MockTransport::scripted(vec![Reply::Integer(3)]);
    let ds = DataSource::new(transport.clone());

    let receivers = ds
        .pubsub::<String>()
        .unwrap()
        .publish("news", &"hello".to_string())
        .await
        .unwrap();
    assert_eq!(receivers, 3);
    assert_eq!(transport.command_text(0), vec!["PUBLISH", "news", "hello"]);
}

// =============================================================================
// Raw Execution Tests
// =============================================================================

#[tokio::test]
async fn test_execute_returns_raw_reply() {
    let transport = MockTransport::scripted(vec![Reply::Simple("PONG".into())]);
    let ds = DataSource::new(transport.clone());

    let reply = ds.execute("PING", &Args::new()).await.unwrap();
    assert_eq!(reply.to_string_value().unwrap(), "PONG");
    assert_eq!(transport.names(), vec!["PING"]);
}

#[tokio::test]
async fn test_custom_codec_registry() {
    let mut codecs = Codecs::new();
    codecs.register_json::<Profile>();
    let transport = MockTransport::scripted(vec![bulk(r#"{"name":"grace","tags":[]}"#)]);
    let ds = DataSource::with_codecs(transport, codecs);

    let profile = ds
        .value::<String, Profile>()
        .unwrap()
        .get(&key("p"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.name, "grace");
}

//! Template Tests
//!
//! Construction rules, view ownership and the end-to-end scenarios.

#[path = "../common/mod.rs"]
mod common;

use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use common::{memory_template, s, strings};
use typedkv::{
    BincodeSerializer, Connection, KvError, KvTemplate, MemoryConnection, SharedSerializer,
    StringKvTemplate, StringSerializer, TextSerializer, Ttl,
};

fn configuration_message<T>(result: typedkv::Result<T>) -> String {
    match result {
        Err(KvError::Configuration(message)) => message,
        Err(other) => panic!("Expected Configuration error, got {:?}", other),
        Ok(_) => panic!("Expected Configuration error, got a template"),
    }
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_builder_names_every_missing_dependency() {
    let message = configuration_message(KvTemplate::<String, String>::builder().build());

    for name in [
        "connection",
        "key serializer",
        "value serializer",
        "hash key serializer",
        "hash value serializer",
    ] {
        assert!(message.contains(name), "{:?} not in {:?}", name, message);
    }
}

#[test]
fn test_builder_names_only_missing_dependency() {
    let strings: SharedSerializer<String> = Arc::new(StringSerializer::new());
    let result = KvTemplate::<String, String>::builder()
        .connection(Arc::new(MemoryConnection::new()))
        .key_serializer(strings.clone())
        .value_serializer(strings.clone())
        .hash_key_serializer(strings)
        .build();

    let message = configuration_message(result);
    assert!(message.contains("hash value serializer"));
    assert!(!message.contains("connection"));
    assert!(!message.contains(" key serializer,"));
}

#[test]
fn test_builder_complete() {
    let strings: SharedSerializer<String> = Arc::new(StringSerializer::new());
    let ints: SharedSerializer<i64> = Arc::new(TextSerializer::<i64>::new());
    let template = KvTemplate::<String, i64, String, i64>::builder()
        .connection(Arc::new(MemoryConnection::new()))
        .key_serializer(strings.clone())
        .value_serializer(ints.clone())
        .hash_key_serializer(strings)
        .hash_value_serializer(ints)
        .build()
        .unwrap();

    template.ops_for_value().set(&s("n"), &41).unwrap();
    assert_eq!(template.ops_for_value().increment(&s("n"), 1).unwrap(), 42);
    assert_eq!(template.ops_for_value().get(&s("n")).unwrap(), Some(42));
}

#[test]
fn test_views_are_owned_once() {
    let (_, template) = memory_template();

    assert!(ptr::eq(template.ops_for_value(), template.ops_for_value()));
    assert!(ptr::eq(template.ops_for_hash(), template.ops_for_hash()));
    assert!(ptr::eq(template.ops_for_zset(), template.ops_for_zset()));
}

#[test]
fn test_string_template_shares_one_serializer() {
    let conn = Arc::new(MemoryConnection::new());
    let template = StringKvTemplate::with_connection(conn.clone());

    template.ops_for_hash().put(&s("h"), &s("f"), &s("v")).unwrap();
    assert_eq!(template.ops_for_hash().get(&s("h"), &s("f")).unwrap(), Some(s("v")));
    assert_eq!(format!("{:?}", template).matches("String").count(), 4);
}

#[test]
fn test_templates_share_a_connection() {
    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    let conn = Arc::new(MemoryConnection::new());
    let text = StringKvTemplate::with_connection(conn.clone());
    let keys: SharedSerializer<String> = Arc::new(StringSerializer::new());
    let points: SharedSerializer<Point> = Arc::new(BincodeSerializer::<Point>::new());
    let typed: KvTemplate<String, Point> =
        KvTemplate::from_primary(text.connection().clone(), keys, points);

    typed.ops_for_value().set(&s("origin"), &Point { x: 0, y: 0 }).unwrap();
    text.ops_for_value().set(&s("label"), &s("zero")).unwrap();

    assert_eq!(
        typed.ops_for_value().get(&s("origin")).unwrap(),
        Some(Point { x: 0, y: 0 })
    );
    assert!(text.exists(&s("origin")).unwrap());
    assert_eq!(text.delete(&strings(&["origin", "label"])).unwrap(), 2);
    assert_eq!(conn.key_count(), 0);
}

#[test]
fn test_connection_accessor() {
    let conn = Arc::new(MemoryConnection::new());
    let template = StringKvTemplate::with_connection(conn.clone());

    template.ops_for_value().set(&s("k"), &s("v")).unwrap();
    assert!(template.connection().exists(&typedkv::Buffer::from("k")).unwrap());
}

// =============================================================================
// Whole-key Commands
// =============================================================================

#[test]
fn test_facade_key_commands() {
    let (_, template) = memory_template();
    template.ops_for_value().set(&s("k"), &s("v")).unwrap();

    assert!(template.exists(&s("k")).unwrap());
    assert!(template.expire(&s("k"), Duration::from_secs(30)).unwrap());
    assert_eq!(template.ttl(&s("k")).unwrap(), Ttl::Expires(Duration::from_secs(30)));
    assert_eq!(template.delete(&strings(&["k"])).unwrap(), 1);
    assert_eq!(template.ttl(&s("k")).unwrap(), Ttl::Missing);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_set_get() {
    let (_, template) = memory_template();
    template.ops_for_value().set(&s("k"), &s("v")).unwrap();
    assert_eq!(template.ops_for_value().get(&s("k")).unwrap(), Some(s("v")));
}

#[test]
fn test_scenario_delete_counts() {
    let (_, template) = memory_template();
    template.ops_for_value().set(&s("k"), &s("v")).unwrap();
    assert_eq!(template.delete(&strings(&["k", "missing"])).unwrap(), 1);
}

#[test]
fn test_scenario_hash_delete() {
    let (_, template) = memory_template();
    let entries = vec![(s("f1"), s("a")), (s("f2"), s("b"))];
    template.ops_for_hash().put_all(&s("h"), &entries).unwrap();
    assert_eq!(
        template
            .ops_for_hash()
            .delete(&s("h"), &strings(&["f1", "f3"]))
            .unwrap(),
        1
    );
}

#[test]
fn test_scenario_set_add_duplicates() {
    let (_, template) = memory_template();
    assert_eq!(
        template
            .ops_for_set()
            .add(&s("s"), &strings(&["a", "b", "a"]))
            .unwrap(),
        2
    );
}

#[test]
fn test_scenario_zset_increment() {
    let (_, template) = memory_template();
    template.ops_for_zset().add(&s("z"), &s("m"), 1.0).unwrap();
    assert_eq!(
        template
            .ops_for_zset()
            .increment_score(&s("z"), &s("m"), 2.0)
            .unwrap(),
        3.0
    );
}

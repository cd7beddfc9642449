//! Value Operations Tests

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{memory_template, s, strings};
use typedkv::{KvError, KvTemplate, MemoryConnection, SharedSerializer, TextSerializer, Ttl};

#[test]
fn test_set_then_get() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();

    values.set(&s("k"), &s("v")).unwrap();
    assert_eq!(values.get(&s("k")).unwrap(), Some(s("v")));
}

#[test]
fn test_get_never_set_is_absent() {
    let (_, template) = memory_template();
    assert_eq!(template.ops_for_value().get(&s("never")).unwrap(), None);
}

#[test]
fn test_empty_value_is_not_absent() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();

    values.set(&s("empty"), &s("")).unwrap();
    assert_eq!(values.get(&s("empty")).unwrap(), Some(s("")));
    assert_eq!(values.size(&s("empty")).unwrap(), 0);
}

#[test]
fn test_get_and_set() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();

    assert_eq!(values.get_and_set(&s("k"), &s("one")).unwrap(), None);
    assert_eq!(values.get_and_set(&s("k"), &s("two")).unwrap(), Some(s("one")));
    assert_eq!(values.get(&s("k")).unwrap(), Some(s("two")));
}

#[test]
fn test_increment_then_decrement_restores() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();
    values.set(&s("n"), &s("10")).unwrap();

    assert_eq!(values.increment(&s("n"), 7).unwrap(), 17);
    assert_eq!(values.decrement(&s("n"), 7).unwrap(), 10);
    assert_eq!(values.get(&s("n")).unwrap(), Some(s("10")));
}

#[test]
fn test_increment_absent_starts_at_zero() {
    let (_, template) = memory_template();
    assert_eq!(template.ops_for_value().decrement(&s("fresh"), 3).unwrap(), -3);
}

#[test]
fn test_increment_non_integer_is_server_error() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();
    values.set(&s("word"), &s("hello")).unwrap();

    assert!(matches!(values.increment(&s("word"), 1), Err(KvError::Server(_))));
}

#[test]
fn test_append_returns_length() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();

    assert_eq!(values.append(&s("log"), &s("abc")).unwrap(), 3);
    assert_eq!(values.append(&s("log"), &s("de")).unwrap(), 5);
    assert_eq!(values.get(&s("log")).unwrap(), Some(s("abcde")));
}

#[test]
fn test_set_if_absent() {
    let (_, template) = memory_template();
    let values = template.ops_for_value();

    assert!(values.set_if_absent(&s("lock"), &s("owner-1")).unwrap());
    assert!(!values.set_if_absent(&s("lock"), &s("owner-2")).unwrap());
    assert_eq!(values.get(&s("lock")).unwrap(), Some(s("owner-1")));
}

#[test]
fn test_set_with_expiry() {
    let (_, template) = memory_template();
    template
        .ops_for_value()
        .set_with_expiry(&s("session"), &s("data"), Duration::from_secs(120))
        .unwrap();

    assert_eq!(
        template.ttl(&s("session")).unwrap(),
        Ttl::Expires(Duration::from_secs(120))
    );
}

#[test]
fn test_multi_get_keeps_positions() {
    let (conn, template) = memory_template();
    let values = template.ops_for_value();
    values.set(&s("a"), &s("1")).unwrap();
    values.set(&s("c"), &s("3")).unwrap();

    let before = conn.commands_executed();
    assert_eq!(
        values.multi_get(&strings(&["a", "b", "c"])).unwrap(),
        vec![Some(s("1")), None, Some(s("3"))]
    );
    assert_eq!(conn.commands_executed() - before, 1);

    assert!(values.multi_get(&[]).unwrap().is_empty());
    assert_eq!(conn.commands_executed() - before, 1);
}

#[test]
fn test_typed_values_and_decode_errors() {
    let conn = Arc::new(MemoryConnection::new());
    let keys: SharedSerializer<String> = Arc::new(TextSerializer::<String>::new());
    let numbers: SharedSerializer<u16> = Arc::new(TextSerializer::<u16>::new());
    let template: KvTemplate<String, u16> =
        KvTemplate::from_primary(conn.clone(), keys.clone(), numbers);
    let strings_view = KvTemplate::<String, String>::from_primary(conn, keys.clone(), keys);

    template.ops_for_value().set(&s("port"), &8080).unwrap();
    assert_eq!(template.ops_for_value().get(&s("port")).unwrap(), Some(8080));

    // Written through another binding, unreadable as u16
    strings_view.ops_for_value().set(&s("port"), &s("99999")).unwrap();
    assert!(matches!(
        template.ops_for_value().get(&s("port")),
        Err(KvError::Decode(_))
    ));
}

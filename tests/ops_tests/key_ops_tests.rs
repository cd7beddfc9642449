//! Key Operations Tests

#[path = "../common/mod.rs"]
mod common;

use std::thread;
use std::time::Duration;

use common::{memory_template, s, strings};
use typedkv::Ttl;

#[test]
fn test_delete_counts_existing_keys() {
    let (_, template) = memory_template();
    template.ops_for_value().set(&s("k"), &s("v")).unwrap();

    assert_eq!(template.ops_for_key().delete(&strings(&["k", "missing"])).unwrap(), 1);
    assert!(!template.ops_for_key().exists(&s("k")).unwrap());
}

#[test]
fn test_delete_counts_across_types() {
    let (_, template) = memory_template();
    template.ops_for_value().set(&s("str"), &s("v")).unwrap();
    template.ops_for_list().right_push(&s("list"), &s("x")).unwrap();
    template.ops_for_set().add(&s("set"), &strings(&["m"])).unwrap();

    let keys = strings(&["str", "list", "set", "ghost1", "ghost2"]);
    assert_eq!(template.ops_for_key().delete(&keys).unwrap(), 3);
}

#[test]
fn test_delete_is_one_command() {
    let (conn, template) = memory_template();
    let before = conn.commands_executed();

    template
        .ops_for_key()
        .delete(&strings(&["a", "b", "c", "d"]))
        .unwrap();
    assert_eq!(conn.commands_executed() - before, 1);
}

#[test]
fn test_delete_nothing_sends_nothing() {
    let (conn, template) = memory_template();

    assert_eq!(template.ops_for_key().delete(&[]).unwrap(), 0);
    assert_eq!(conn.commands_executed(), 0);
}

#[test]
fn test_ttl_lifecycle() {
    let (_, template) = memory_template();
    let keys = template.ops_for_key();

    assert_eq!(keys.ttl(&s("k")).unwrap(), Ttl::Missing);
    assert!(!keys.expire(&s("k"), Duration::from_secs(5)).unwrap());

    template.ops_for_value().set(&s("k"), &s("v")).unwrap();
    assert_eq!(keys.ttl(&s("k")).unwrap(), Ttl::Persistent);

    assert!(keys.expire(&s("k"), Duration::from_secs(60)).unwrap());
    assert_eq!(keys.ttl(&s("k")).unwrap(), Ttl::Expires(Duration::from_secs(60)));

    let remaining = keys.pttl(&s("k")).unwrap().remaining().unwrap();
    assert!(remaining > Duration::from_secs(59) && remaining <= Duration::from_secs(60));

    assert!(keys.persist(&s("k")).unwrap());
    assert_eq!(keys.ttl(&s("k")).unwrap(), Ttl::Persistent);
}

#[test]
fn test_pexpire_removes_key() {
    let (_, template) = memory_template();
    template.ops_for_value().set(&s("k"), &s("v")).unwrap();

    assert!(template
        .ops_for_key()
        .pexpire(&s("k"), Duration::from_millis(25))
        .unwrap());
    thread::sleep(Duration::from_millis(75));

    assert!(!template.exists(&s("k")).unwrap());
    assert_eq!(template.ops_for_value().get(&s("k")).unwrap(), None);
}

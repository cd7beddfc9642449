//! Hash Operations Tests

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{memory_template, s, sorted, strings};
use typedkv::{
    JsonSerializer, KvTemplate, MemoryConnection, SharedSerializer, StringSerializer,
    TextSerializer,
};

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items.iter().map(|(f, v)| (s(f), s(v))).collect()
}

#[test]
fn test_put_all_then_delete() {
    let (_, template) = memory_template();
    let hashes = template.ops_for_hash();

    assert_eq!(hashes.put_all(&s("h"), &pairs(&[("f1", "a"), ("f2", "b")])).unwrap(), 2);
    assert_eq!(hashes.delete(&s("h"), &strings(&["f1", "f3"])).unwrap(), 1);
    assert_eq!(hashes.entries(&s("h")).unwrap(), pairs(&[("f2", "b")]));
}

#[test]
fn test_put_reports_new_fields() {
    let (_, template) = memory_template();
    let hashes = template.ops_for_hash();

    assert!(hashes.put(&s("h"), &s("f"), &s("1")).unwrap());
    assert!(!hashes.put(&s("h"), &s("f"), &s("2")).unwrap());
    assert_eq!(hashes.get(&s("h"), &s("f")).unwrap(), Some(s("2")));
    assert_eq!(hashes.get(&s("h"), &s("other")).unwrap(), None);
    assert_eq!(hashes.get(&s("nohash"), &s("f")).unwrap(), None);
}

#[test]
fn test_multi_get_preserves_cardinality() {
    let (_, template) = memory_template();
    let hashes = template.ops_for_hash();
    hashes.put_all(&s("h"), &pairs(&[("a", "1"), ("c", "3")])).unwrap();

    let fields = strings(&["c", "b", "a", "zz"]);
    let values = hashes.multi_get(&s("h"), &fields).unwrap();

    assert_eq!(values.len(), fields.len());
    assert_eq!(values, vec![Some(s("3")), None, Some(s("1")), None]);
}

#[test]
fn test_multi_get_missing_hash() {
    let (_, template) = memory_template();
    assert_eq!(
        template
            .ops_for_hash()
            .multi_get(&s("none"), &strings(&["a", "b"]))
            .unwrap(),
        vec![None, None]
    );
}

#[test]
fn test_keys_values_size() {
    let (_, template) = memory_template();
    let hashes = template.ops_for_hash();
    hashes.put_all(&s("h"), &pairs(&[("x", "1"), ("y", "2")])).unwrap();

    assert_eq!(sorted(hashes.keys(&s("h")).unwrap()), strings(&["x", "y"]));
    assert_eq!(sorted(hashes.values(&s("h")).unwrap()), strings(&["1", "2"]));
    assert_eq!(hashes.size(&s("h")).unwrap(), 2);
    assert!(hashes.has_key(&s("h"), &s("x")).unwrap());
    assert!(!hashes.has_key(&s("h"), &s("z")).unwrap());
}

#[test]
fn test_deleting_last_field_removes_key() {
    let (_, template) = memory_template();
    let hashes = template.ops_for_hash();
    hashes.put(&s("h"), &s("only"), &s("1")).unwrap();

    hashes.delete(&s("h"), &strings(&["only"])).unwrap();
    assert!(!template.exists(&s("h")).unwrap());
    assert!(hashes.entries(&s("h")).unwrap().is_empty());
}

#[test]
fn test_batches_are_single_commands() {
    let (conn, template) = memory_template();
    let hashes = template.ops_for_hash();

    let before = conn.commands_executed();
    hashes
        .put_all(&s("h"), &pairs(&[("a", "1"), ("b", "2"), ("c", "3")]))
        .unwrap();
    hashes.multi_get(&s("h"), &strings(&["a", "b", "c"])).unwrap();
    hashes.delete(&s("h"), &strings(&["a", "b"])).unwrap();
    assert_eq!(conn.commands_executed() - before, 3);

    assert_eq!(hashes.put_all(&s("h"), &[]).unwrap(), 0);
    assert!(hashes.multi_get(&s("h"), &[]).unwrap().is_empty());
    assert_eq!(hashes.delete(&s("h"), &[]).unwrap(), 0);
    assert_eq!(conn.commands_executed() - before, 3);
}

#[test]
fn test_distinct_field_and_value_types() {
    let conn = Arc::new(MemoryConnection::new());
    let keys: SharedSerializer<String> = Arc::new(StringSerializer::new());
    let fields: SharedSerializer<u32> = Arc::new(TextSerializer::<u32>::new());
    let members: SharedSerializer<Vec<String>> = Arc::new(JsonSerializer::<Vec<String>>::new());
    let template: KvTemplate<String, String, u32, Vec<String>> =
        KvTemplate::new(conn, keys.clone(), keys, fields, members);
    let hashes = template.ops_for_hash();

    hashes.put(&s("teams"), &7, &strings(&["ada", "grace"])).unwrap();
    hashes.put(&s("teams"), &3, &Vec::new()).unwrap();

    assert_eq!(hashes.get(&s("teams"), &7).unwrap(), Some(strings(&["ada", "grace"])));
    let mut fields = hashes.keys(&s("teams")).unwrap();
    fields.sort_unstable();
    assert_eq!(fields, vec![3, 7]);
}

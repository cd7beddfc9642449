//! Set Operations Tests

#[path = "../common/mod.rs"]
mod common;

use common::{memory_template, s, sorted, strings};

#[test]
fn test_add_counts_unique_new_members() {
    let (_, template) = memory_template();
    let sets = template.ops_for_set();

    assert_eq!(sets.add(&s("s"), &strings(&["a", "b", "a"])).unwrap(), 2);
    assert_eq!(sets.add(&s("s"), &strings(&["b", "c"])).unwrap(), 1);
    assert_eq!(sets.size(&s("s")).unwrap(), 3);
}

#[test]
fn test_membership() {
    let (_, template) = memory_template();
    let sets = template.ops_for_set();
    sets.add(&s("s"), &strings(&["a", "b"])).unwrap();

    assert!(sets.is_member(&s("s"), &s("a")).unwrap());
    assert!(!sets.is_member(&s("s"), &s("z")).unwrap());
    assert!(!sets.is_member(&s("missing"), &s("a")).unwrap());
    assert_eq!(sorted(sets.members(&s("s")).unwrap()), strings(&["a", "b"]));
    assert!(sets.members(&s("missing")).unwrap().is_empty());
}

#[test]
fn test_remove_counts_removed() {
    let (_, template) = memory_template();
    let sets = template.ops_for_set();
    sets.add(&s("s"), &strings(&["a", "b"])).unwrap();

    assert_eq!(sets.remove(&s("s"), &strings(&["a", "x"])).unwrap(), 1);
    assert_eq!(sets.remove(&s("s"), &strings(&["b"])).unwrap(), 1);
    assert!(!template.exists(&s("s")).unwrap());
}

#[test]
fn test_pop() {
    let (_, template) = memory_template();
    let sets = template.ops_for_set();
    sets.add(&s("s"), &strings(&["only"])).unwrap();

    assert_eq!(sets.pop(&s("s")).unwrap(), Some(s("only")));
    assert_eq!(sets.pop(&s("s")).unwrap(), None);
}

#[test]
fn test_intersect_and_union() {
    let (_, template) = memory_template();
    let sets = template.ops_for_set();
    sets.add(&s("red"), &strings(&["apple", "cherry", "rose"])).unwrap();
    sets.add(&s("fruit"), &strings(&["apple", "banana", "cherry"])).unwrap();

    let keys = strings(&["red", "fruit"]);
    assert_eq!(sorted(sets.intersect(&keys).unwrap()), strings(&["apple", "cherry"]));
    assert_eq!(
        sorted(sets.union(&keys).unwrap()),
        strings(&["apple", "banana", "cherry", "rose"])
    );
}

#[test]
fn test_empty_inputs_send_nothing() {
    let (conn, template) = memory_template();
    let sets = template.ops_for_set();

    assert_eq!(sets.add(&s("s"), &[]).unwrap(), 0);
    assert_eq!(sets.remove(&s("s"), &[]).unwrap(), 0);
    assert!(sets.intersect(&[]).unwrap().is_empty());
    assert!(sets.union(&[]).unwrap().is_empty());
    assert_eq!(conn.commands_executed(), 0);
}

//! List Operations Tests

#[path = "../common/mod.rs"]
mod common;

use common::{memory_template, s, strings};

#[test]
fn test_push_pop_same_end_is_lifo() {
    let (_, template) = memory_template();
    let lists = template.ops_for_list();
    lists.right_push_all(&s("l"), &strings(&["a", "b"])).unwrap();

    lists.left_push(&s("l"), &s("head")).unwrap();
    assert_eq!(lists.left_pop(&s("l")).unwrap(), Some(s("head")));

    lists.right_push(&s("l"), &s("tail")).unwrap();
    assert_eq!(lists.right_pop(&s("l")).unwrap(), Some(s("tail")));
}

#[test]
fn test_pop_empty_list() {
    let (_, template) = memory_template();
    let lists = template.ops_for_list();

    assert_eq!(lists.left_pop(&s("empty")).unwrap(), None);
    assert_eq!(lists.right_pop(&s("empty")).unwrap(), None);
}

#[test]
fn test_push_returns_length() {
    let (_, template) = memory_template();
    let lists = template.ops_for_list();

    assert_eq!(lists.right_push(&s("l"), &s("a")).unwrap(), 1);
    assert_eq!(lists.right_push_all(&s("l"), &strings(&["b", "c"])).unwrap(), 3);
    assert_eq!(lists.left_push_all(&s("l"), &strings(&["y", "z"])).unwrap(), 5);
    assert_eq!(
        lists.range(&s("l"), 0, -1).unwrap(),
        strings(&["z", "y", "a", "b", "c"])
    );
    assert_eq!(lists.size(&s("l")).unwrap(), 5);
}

#[test]
fn test_range_negative_indexes() {
    let (_, template) = memory_template();
    let lists = template.ops_for_list();
    lists.right_push_all(&s("l"), &strings(&["a", "b", "c", "d"])).unwrap();

    assert_eq!(lists.range(&s("l"), -1, -1).unwrap(), strings(&["d"]));
    assert_eq!(lists.range(&s("l"), 1, -2).unwrap(), strings(&["b", "c"]));
    assert!(lists.range(&s("l"), 10, 20).unwrap().is_empty());
    assert!(lists.range(&s("missing"), 0, -1).unwrap().is_empty());
}

#[test]
fn test_index_and_remove() {
    let (_, template) = memory_template();
    let lists = template.ops_for_list();
    lists.right_push_all(&s("l"), &strings(&["x", "y", "x", "x"])).unwrap();

    assert_eq!(lists.index(&s("l"), 1).unwrap(), Some(s("y")));
    assert_eq!(lists.index(&s("l"), -1).unwrap(), Some(s("x")));
    assert_eq!(lists.index(&s("l"), 9).unwrap(), None);

    assert_eq!(lists.remove(&s("l"), 2, &s("x")).unwrap(), 2);
    assert_eq!(lists.range(&s("l"), 0, -1).unwrap(), strings(&["y", "x"]));
    assert_eq!(lists.remove(&s("l"), 0, &s("absent")).unwrap(), 0);
}

#[test]
fn test_batch_push_is_one_command() {
    let (conn, template) = memory_template();
    let lists = template.ops_for_list();

    let before = conn.commands_executed();
    lists
        .left_push_all(&s("l"), &strings(&["1", "2", "3", "4", "5"]))
        .unwrap();
    assert_eq!(conn.commands_executed() - before, 1);

    assert_eq!(lists.right_push_all(&s("l"), &[]).unwrap(), 0);
    assert_eq!(lists.left_push_all(&s("l"), &[]).unwrap(), 0);
    assert_eq!(conn.commands_executed() - before, 1);
}

#[test]
fn test_draining_removes_key() {
    let (_, template) = memory_template();
    let lists = template.ops_for_list();
    lists.right_push(&s("l"), &s("only")).unwrap();

    lists.left_pop(&s("l")).unwrap();
    assert!(!template.exists(&s("l")).unwrap());
}

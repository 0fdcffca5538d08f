use bintree_rust::{BinaryTreeError, Field, Key, KeyKind, PayloadKind, Record, RecordTree};
use serde_json::json;

fn people() -> RecordTree {
    let mut tree = RecordTree::new(Some("people"));
    for (key, name) in [(30, "carol"), (10, "alice"), (40, "dave"), (20, "bob")] {
        tree.insert(Record::new(key).with_field("name", name)).unwrap();
    }
    tree
}

#[test]
fn find_returns_the_whole_record() {
    let tree = people();
    let bob = tree.find(&Key::Int(20)).unwrap().unwrap();
    assert_eq!(bob.get("name"), Some(Field::Text("bob".to_string())));
    assert_eq!(bob.to_json(), json!({"key": 20, "name": "bob"}));
    assert_eq!(tree.find(&Key::Int(25)).unwrap(), None);
}

#[test]
fn records_from_json() {
    let mut tree = RecordTree::new(None);
    let record = Record::try_from(json!({"key": "k1", "tags": ["x"], "meta": {"n": 1}})).unwrap();
    tree.insert(record).unwrap();
    assert_eq!(tree.kind(), PayloadKind::Record(Some(KeyKind::Text)));

    let found = tree.find(&Key::from("k1")).unwrap().unwrap();
    assert_eq!(found.to_json(), json!({"key": "k1", "tags": ["x"], "meta": {"n": 1}}));
}

#[test]
fn record_without_key_is_rejected() {
    let err = Record::from_json(json!({"name": "nobody"})).unwrap_err();
    assert!(matches!(err, BinaryTreeError::InvalidPayload(_)));
}

#[test]
fn mixed_key_kinds_are_rejected() {
    let mut tree = people();
    let err = tree.insert(Record::new("zed")).unwrap_err();
    assert!(matches!(err, BinaryTreeError::InvalidPayload(_)));
    assert!(matches!(tree.find(&Key::from("zed")), Err(BinaryTreeError::InvalidPayload(_))));
    assert_eq!(tree.len(), 4);
}

#[test]
fn preset_key_kind_is_enforced_from_the_start() {
    let mut tree = RecordTree::with_key_kind(None, KeyKind::Text);
    assert!(matches!(tree.insert(Record::new(1)), Err(BinaryTreeError::InvalidPayload(_))));
    tree.insert(Record::new("a")).unwrap();
    assert_eq!(tree.len(), 1);
}

#[test]
fn duplicate_keys_resolve_to_the_first_inserted() {
    let mut tree = RecordTree::new(None);
    tree.insert(Record::new(1).with_field("v", "first")).unwrap();
    tree.insert(Record::new(1).with_field("v", "second")).unwrap();
    assert_eq!(tree.len(), 2);
    let found = tree.find(&Key::Int(1)).unwrap().unwrap();
    assert_eq!(found.get("v"), Some(Field::from("first")));
}

#[test]
fn eliminate_and_subtree_follow_record_keys() {
    let mut tree = people();
    let sub = tree.subtree(&Key::Int(10)).unwrap();
    assert_eq!(sub.name(), Some("sub_people"));
    let sub_keys: Vec<&Key> = sub.keys().collect();
    assert_eq!(sub_keys, vec![&Key::Int(10), &Key::Int(20)]);

    tree.eliminate(&Key::Int(10)).unwrap();
    assert_eq!(tree.find(&Key::Int(20)).unwrap(), None);
    assert!(tree.find(&Key::Int(30)).unwrap().is_some());
    assert!(sub.find(&Key::Int(20)).unwrap().is_some());
}

#[test]
fn find_many_returns_options() {
    let tree = people();
    let found = tree.find_many(&[Key::Int(40), Key::Int(41)]).unwrap().into_vec();
    assert_eq!(found.len(), 2);
    assert!(found[0].is_some());
    assert!(found[1].is_none());
}

#[test]
fn emptied_tree_behaves_like_a_fresh_one() {
    let mut tree = people();
    tree.empty();
    tree.insert(Record::new("zed")).unwrap();
    assert_eq!(tree.kind(), PayloadKind::Record(Some(KeyKind::Text)));
    assert_eq!(tree.name(), Some("people"));
}

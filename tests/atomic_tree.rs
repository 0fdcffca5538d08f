use bintree_rust::{AtomicTree, BinaryTreeError, Found, Key, KeyKind};

fn sample_tree() -> AtomicTree {
    let mut tree = AtomicTree::new(Some("numbers"), KeyKind::Int);
    tree.insert_all([5, 3, 8, 1, 4, 7, 9].map(Key::Int)).unwrap();
    tree
}

fn sorted_ints(tree: &AtomicTree) -> Vec<i64> {
    tree.in_order()
        .unwrap()
        .into_iter()
        .map(|key| match key {
            Key::Int(i) => *i,
            other => panic!("unexpected key {:?}", other),
        })
        .collect()
}

#[test]
fn finds_inserted_keys_only() {
    let tree = sample_tree();
    assert!(tree.find(&Key::Int(4)).unwrap());
    assert!(!tree.find(&Key::Int(6)).unwrap());
    assert_eq!(tree.len(), 7);
}

#[test]
fn find_on_empty_tree_is_false() {
    let tree = AtomicTree::new(None, KeyKind::Int);
    assert!(!tree.find(&Key::Int(1)).unwrap());
}

#[test]
fn find_many_keeps_order() {
    let tree = sample_tree();
    let found = tree.find_many(&[Key::Int(9), Key::Int(2), Key::Int(5)]).unwrap();
    assert_eq!(found, Found::Many(vec![true, false, true]));

    let single = tree.find_many(&[Key::Int(1)]).unwrap();
    assert_eq!(single.one(), Some(true));

    assert!(matches!(tree.find_many(&[]), Err(BinaryTreeError::OperationFailure(_))));
}

#[test]
fn wrong_key_kind_is_invalid_payload() {
    let mut tree = sample_tree();
    assert!(matches!(tree.insert(Key::from("x")), Err(BinaryTreeError::InvalidPayload(_))));
    assert!(matches!(tree.insert(Key::Float(1.5)), Err(BinaryTreeError::InvalidPayload(_))));
    assert!(matches!(tree.find(&Key::from("x")), Err(BinaryTreeError::InvalidPayload(_))));
    assert_eq!(tree.len(), 7);
}

#[test]
fn insert_all_needs_at_least_one_node() {
    let mut tree = AtomicTree::new(None, KeyKind::Text);
    let err = tree.insert_all(Vec::new()).unwrap_err();
    assert!(matches!(err, BinaryTreeError::InvalidPayload(_)));
}

#[test]
fn nan_never_enters_a_float_tree() {
    let mut tree = AtomicTree::new(None, KeyKind::Float);
    tree.insert(Key::Float(0.5)).unwrap();
    assert!(matches!(tree.insert(Key::Float(f64::NAN)), Err(BinaryTreeError::InvalidPayload(_))));
    assert!(tree.find(&Key::Float(0.5)).unwrap());
}

#[test]
fn eliminate_drops_the_whole_subtree() {
    let mut tree = sample_tree();
    tree.eliminate(&Key::Int(3)).unwrap();
    for gone in [3, 1, 4] {
        assert!(!tree.find(&Key::Int(gone)).unwrap(), "{} should be gone", gone);
    }
    assert_eq!(sorted_ints(&tree), vec![5, 7, 8, 9]);
    assert!(tree.node_store().validate().is_ok());
}

#[test]
fn eliminate_of_missing_key_leaves_tree_alone() {
    let mut tree = sample_tree();
    let err = tree.eliminate(&Key::Int(6)).unwrap_err();
    assert!(matches!(err, BinaryTreeError::NodeNotFound(_)));
    assert_eq!(tree.len(), 7);
}

#[test]
fn subtree_is_an_independent_copy() {
    let tree = sample_tree();
    let mut sub = tree.subtree(&Key::Int(8)).unwrap();
    assert_eq!(sub.name(), Some("sub_numbers"));
    assert_eq!(sorted_ints(&sub), vec![7, 8, 9]);
    assert_eq!(sub.node_store().root(), Some(0));

    sub.eliminate(&Key::Int(9)).unwrap();
    sub.insert(Key::Int(100)).unwrap();
    assert!(tree.find(&Key::Int(9)).unwrap());
    assert!(!tree.find(&Key::Int(100)).unwrap());
    assert_eq!(tree.len(), 7);
}

#[test]
fn subtree_of_unnamed_tree_is_unnamed() {
    let mut tree = AtomicTree::new(None, KeyKind::Int);
    tree.insert(Key::Int(1)).unwrap();
    assert_eq!(tree.subtree(&Key::Int(1)).unwrap().name(), None);
    assert!(matches!(tree.subtree(&Key::Int(2)), Err(BinaryTreeError::NodeNotFound(_))));
}

#[test]
fn empty_keeps_the_name() {
    let mut tree = sample_tree();
    tree.empty();
    assert!(tree.is_empty());
    assert_eq!(tree.name(), Some("numbers"));
    assert_eq!(tree.height().unwrap(), 0);
    tree.insert(Key::Int(2)).unwrap();
    assert_eq!(tree.node_store().root(), Some(0));
}

#[test]
fn text_keys_sort_lexicographically() {
    let mut tree = AtomicTree::new(None, KeyKind::Text);
    tree.insert_all(["pear", "apple", "zucchini", "fig"].map(Key::from)).unwrap();
    let keys: Vec<String> = tree.in_order().unwrap().into_iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["\"apple\"", "\"fig\"", "\"pear\"", "\"zucchini\""]);
}

#[test]
fn signed_zeros_match_each_other() {
    let mut tree = AtomicTree::new(None, KeyKind::Float);
    tree.insert(Key::Float(-0.0)).unwrap();
    tree.insert(Key::Float(2.0)).unwrap();
    assert!(tree.find(&Key::Float(0.0)).unwrap());
    let doubled = (tree.clone() + &tree).unwrap();
    let other = {
        let mut other = AtomicTree::new(None, KeyKind::Float);
        other.insert_all([0.0, 2.0].map(Key::Float)).unwrap();
        other
    };
    assert!(doubled.eq_keys(&other).unwrap());
}

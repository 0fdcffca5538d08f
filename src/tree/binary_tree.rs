use log::debug;

use crate::common::{Key, KeyKind, PayloadKind, Record};
use crate::error::{wrap_fault, BinaryTreeError, Result};
use crate::node::{NodeStore, Payload};

use super::core_logic;
use super::types::{Found, Located};

/// A binary search tree kept in a flat node arena.
///
/// The shape is whatever insertion order produces; nothing is rebalanced.
/// Ties go right, so duplicates are allowed and all of them are findable.
#[derive(Debug, Clone)]
pub struct BinaryTree<P: Payload> {
    name: Option<String>,
    store: NodeStore<P>,
    kind: PayloadKind,
    // Kind given at construction. An emptied tree falls back to it.
    declared: PayloadKind,
}

/// Tree over scalar keys of one fixed [`KeyKind`].
pub type AtomicTree = BinaryTree<Key>;

/// Tree over [`Record`]s ordered by their `key` field.
pub type RecordTree = BinaryTree<Record>;

impl BinaryTree<Key> {
    pub fn new(name: Option<&str>, key_kind: KeyKind) -> Self {
        Self::with_kind(name, PayloadKind::Atomic(key_kind))
    }

    /// Whether `key` is in the tree. An absent key is a normal `false`.
    pub fn find(&self, key: &Key) -> Result<bool> {
        Ok(self.lookup(key)?.is_some())
    }

    pub fn find_many(&self, keys: &[Key]) -> Result<Found<bool>> {
        let results = keys.iter().map(|key| self.find(key)).collect::<Result<Vec<_>>>()?;
        Found::from_results(results)
    }
}

impl BinaryTree<Record> {
    pub fn new(name: Option<&str>) -> Self {
        Self::with_kind(name, PayloadKind::Record(None))
    }

    /// A record tree that only accepts keys of `key_kind`.
    pub fn with_key_kind(name: Option<&str>, key_kind: KeyKind) -> Self {
        Self::with_kind(name, PayloadKind::Record(Some(key_kind)))
    }

    /// The first record whose key equals `key`, if any.
    pub fn find(&self, key: &Key) -> Result<Option<Record>> {
        Ok(self.lookup(key)?.cloned())
    }

    pub fn find_many(&self, keys: &[Key]) -> Result<Found<Option<Record>>> {
        let results = keys.iter().map(|key| self.find(key)).collect::<Result<Vec<_>>>()?;
        Found::from_results(results)
    }
}

impl<P: Payload> BinaryTree<P> {
    pub(crate) fn with_kind(name: Option<&str>, kind: PayloadKind) -> Self {
        BinaryTree {
            name: name.map(str::to_string),
            store: NodeStore::new(),
            kind,
            declared: kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<&str>) {
        self.name = name.map(str::to_string);
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Read access to the underlying arena.
    pub fn node_store(&self) -> &NodeStore<P> {
        &self.store
    }

    /// Adds one payload. Fails with `InvalidPayload` when it does not fit the
    /// tree's kind; any internal fault surfaces as `InsertFailure`.
    pub fn insert(&mut self, payload: P) -> Result<()> {
        let kind = payload.admit(self.kind)?;
        wrap_fault(core_logic::insert_impl(&mut self.store, payload), BinaryTreeError::InsertFailure)?;
        self.kind = kind;
        Ok(())
    }

    /// Adds payloads in order, stopping at the first failure.
    pub fn insert_all(&mut self, payloads: impl IntoIterator<Item = P>) -> Result<()> {
        let mut added = 0usize;
        for payload in payloads {
            self.insert(payload)?;
            added += 1;
        }
        if added == 0 {
            return Err(BinaryTreeError::InvalidPayload(
                "No node was passed to the function.".to_string(),
            ));
        }
        Ok(())
    }

    /// The payload of the first node on the search path whose key equals
    /// `key`.
    pub fn lookup(&self, key: &Key) -> Result<Option<&P>> {
        self.kind.check_key(key)?;
        let located = wrap_fault(core_logic::locate(&self.store, key), BinaryTreeError::OperationFailure)?;
        match located {
            Some(found) => Ok(Some(&self.store.get(found.idx)?.payload)),
            None => Ok(None),
        }
    }

    pub fn contains(&self, key: &Key) -> Result<bool> {
        Ok(self.lookup(key)?.is_some())
    }

    /// Deletes the node holding `key` together with its entire subtree.
    /// Descendants are not re-linked; re-insert them if they should survive.
    pub fn eliminate(&mut self, key: &Key) -> Result<()> {
        self.kind.check_key(key)?;
        let located = wrap_fault(core_logic::locate(&self.store, key), BinaryTreeError::OperationFailure)?
            .ok_or_else(|| BinaryTreeError::NodeNotFound(key.to_string()))?;
        let removed = wrap_fault(self.detach(located), BinaryTreeError::OperationFailure)?;
        if self.store.is_empty() {
            self.kind = self.declared;
        }
        debug!(
            "Eliminated {} from tree {:?}: {} node(s) removed.",
            key, self.name, removed
        );
        Ok(())
    }

    fn detach(&mut self, located: Located) -> Result<usize> {
        if let Some((parent, side)) = located.parent {
            self.store.set_child(parent, side, None)?;
        }
        self.store.remove_subtree(located.idx)
    }

    /// Copies the subtree rooted at `key` into a new tree named
    /// `sub_<name>`. Payloads are re-inserted in pre-order, so the copy
    /// answers lookups the same way even though its slots differ.
    pub fn subtree(&self, key: &Key) -> Result<Self> {
        self.kind.check_key(key)?;
        let located = wrap_fault(core_logic::locate(&self.store, key), BinaryTreeError::OperationFailure)?
            .ok_or_else(|| BinaryTreeError::NodeNotFound(key.to_string()))?;
        let payloads = wrap_fault(
            core_logic::preorder_payloads(&self.store, located.idx),
            BinaryTreeError::OperationFailure,
        )?;
        let name = self.name.as_ref().map(|name| format!("sub_{}", name));
        let mut sub = Self::with_kind(name.as_deref(), self.kind);
        for payload in payloads {
            sub.insert(payload)?;
        }
        Ok(sub)
    }

    /// Drops every node. The name is kept; a record tree forgets the key
    /// kind it adopted from its records.
    pub fn empty(&mut self) {
        self.store.clear();
        self.kind = self.declared;
    }

    /// Live payloads in arena slot order.
    pub fn payloads(&self) -> impl Iterator<Item = &P> + '_ {
        self.store.iter().map(|(_, node)| &node.payload)
    }

    /// Sort keys in arena slot order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.payloads().map(Payload::sort_key)
    }

    /// Payloads in ascending key order.
    pub fn in_order(&self) -> Result<Vec<&P>> {
        wrap_fault(core_logic::in_order_impl(&self.store), BinaryTreeError::OperationFailure)
    }

    /// Nodes on the longest root-to-leaf path; 0 for an empty tree.
    pub fn height(&self) -> Result<usize> {
        wrap_fault(core_logic::height_impl(&self.store), BinaryTreeError::OperationFailure)
    }

    /// Swaps in a decoded arena, e.g. after a load.
    pub(crate) fn replace_store(&mut self, store: NodeStore<P>, kind: PayloadKind) {
        self.store = store;
        self.kind = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_tree(keys: &[i64]) -> AtomicTree {
        let mut tree = AtomicTree::new(Some("t"), KeyKind::Int);
        tree.insert_all(keys.iter().map(|k| Key::Int(*k))).unwrap();
        tree
    }

    #[test]
    fn first_insert_becomes_root_at_slot_zero() {
        let tree = int_tree(&[5, 3, 8]);
        let store = tree.node_store();
        assert_eq!(store.root(), Some(0));
        assert_eq!(store.get(0).unwrap().left, Some(1));
        assert_eq!(store.get(0).unwrap().right, Some(2));
    }

    #[test]
    fn ties_go_right() {
        let tree = int_tree(&[5, 5, 5]);
        let store = tree.node_store();
        assert_eq!(store.get(0).unwrap().left, None);
        assert_eq!(store.get(0).unwrap().right, Some(1));
        assert_eq!(store.get(1).unwrap().right, Some(2));
        assert!(tree.find(&Key::Int(5)).unwrap());
    }

    #[test]
    fn eliminate_of_root_empties_the_tree() {
        let mut tree = int_tree(&[5, 3, 8]);
        tree.eliminate(&Key::Int(5)).unwrap();
        assert!(tree.is_empty());
        tree.insert(Key::Int(1)).unwrap();
        assert_eq!(tree.node_store().root(), Some(0));
    }

    #[test]
    fn eliminated_slots_are_recycled() {
        let mut tree = int_tree(&[5, 3, 8, 1]);
        tree.eliminate(&Key::Int(3)).unwrap();
        tree.insert(Key::Int(2)).unwrap();
        assert_eq!(tree.node_store().capacity(), 4);
        assert!(tree.node_store().validate().is_ok());
        assert!(tree.find(&Key::Int(2)).unwrap());
        assert!(!tree.find(&Key::Int(1)).unwrap());
    }

    #[test]
    fn in_order_and_height() {
        let tree = int_tree(&[5, 3, 8, 1, 4, 7, 9]);
        let keys: Vec<i64> = tree
            .in_order()
            .unwrap()
            .into_iter()
            .map(|k| match k {
                Key::Int(i) => *i,
                other => panic!("unexpected key {:?}", other),
            })
            .collect();
        assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(tree.height().unwrap(), 3);
    }

    #[test]
    fn record_tree_adopts_first_key_kind() {
        let mut tree = RecordTree::new(None);
        tree.insert(Record::new(1)).unwrap();
        assert_eq!(tree.kind(), PayloadKind::Record(Some(KeyKind::Int)));
        let err = tree.insert(Record::new("a")).unwrap_err();
        assert!(matches!(err, BinaryTreeError::InvalidPayload(_)));
    }

    #[test]
    fn emptied_record_tree_accepts_a_new_key_kind() {
        let mut tree = RecordTree::new(None);
        tree.insert(Record::new(1)).unwrap();
        tree.empty();
        assert_eq!(tree.kind(), PayloadKind::Record(None));
        tree.insert(Record::new("a")).unwrap();
        assert_eq!(tree.kind(), PayloadKind::Record(Some(KeyKind::Text)));

        tree.eliminate(&Key::from("a")).unwrap();
        tree.insert(Record::new(2.5)).unwrap();
        assert_eq!(tree.kind(), PayloadKind::Record(Some(KeyKind::Float)));
    }

    #[test]
    fn declared_key_kind_survives_empty() {
        let mut tree = RecordTree::with_key_kind(None, KeyKind::Int);
        tree.insert(Record::new(1)).unwrap();
        tree.empty();
        let err = tree.insert(Record::new("a")).unwrap_err();
        assert!(matches!(err, BinaryTreeError::InvalidPayload(_)));
    }
}

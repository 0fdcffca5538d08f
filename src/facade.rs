// bintree-rust/src/facade.rs
//! One handle over both tree variants, fed with loosely typed JSON payloads.

use std::ops::Add;

use serde_json::Value as JsonValue;

use crate::common::{Key, KeyKind, PayloadKind, Record};
use crate::error::{BinaryTreeError, Result};
use crate::store::{Persistence, StorageBackend};
use crate::tree::{AtomicTree, Found, RecordTree};

/// Either an atomic tree or a record tree.
#[derive(Debug, Clone)]
pub enum Tree {
    Atomic(AtomicTree),
    Record(RecordTree),
}

/// The answer to one lookup: presence for atomic trees, the matching record
/// for record trees.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Present(bool),
    Record(Option<Record>),
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        match self {
            Lookup::Present(found) => *found,
            Lookup::Record(record) => record.is_some(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Lookup::Present(found) => JsonValue::Bool(*found),
            Lookup::Record(Some(record)) => record.to_json(),
            Lookup::Record(None) => JsonValue::Null,
        }
    }
}

fn incompatible(left: &Tree, right: &Tree) -> BinaryTreeError {
    BinaryTreeError::IncompatibleTrees(format!("{} vs {}", left.kind(), right.kind()))
}

fn coerce(key: Key, kind: PayloadKind) -> Key {
    match kind.key_kind() {
        Some(key_kind) => key.coerce_to(key_kind),
        None => key,
    }
}

fn no_nodes() -> BinaryTreeError {
    BinaryTreeError::InvalidPayload("No node was passed to the function.".to_string())
}

impl Tree {
    pub fn atomic(name: Option<&str>, key_kind: KeyKind) -> Self {
        Tree::Atomic(AtomicTree::new(name, key_kind))
    }

    pub fn record(name: Option<&str>) -> Self {
        Tree::Record(RecordTree::new(name))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Tree::Atomic(tree) => tree.name(),
            Tree::Record(tree) => tree.name(),
        }
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Tree::Atomic(tree) => tree.kind(),
            Tree::Record(tree) => tree.kind(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Tree::Atomic(tree) => tree.len(),
            Tree::Record(tree) => tree.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a lookup key, widening integers for float-keyed trees.
    fn key_from(&self, value: &JsonValue) -> Result<Key> {
        Ok(coerce(Key::from_json(value)?, self.kind()))
    }

    /// Adds every node in order. Atomic trees take scalars of their key
    /// kind; record trees take objects with a `key` field.
    pub fn add_nodes(&mut self, nodes: &[JsonValue]) -> Result<()> {
        if nodes.is_empty() {
            return Err(no_nodes());
        }
        for node in nodes {
            match self {
                Tree::Atomic(tree) => {
                    let key = coerce(Key::from_json(node)?, tree.kind());
                    tree.insert(key)?;
                }
                Tree::Record(tree) => {
                    let mut record = Record::from_json(node.clone())?;
                    if let Some(kind) = tree.kind().key_kind() {
                        record = record.rekeyed(kind);
                    }
                    tree.insert(record)?;
                }
            }
        }
        Ok(())
    }

    /// Looks every key up. One key gives its result directly, several give
    /// the ordered list.
    pub fn find_nodes(&self, keys: &[JsonValue]) -> Result<Found<Lookup>> {
        if keys.is_empty() {
            return Err(no_nodes());
        }
        let keys = keys.iter().map(|value| self.key_from(value)).collect::<Result<Vec<_>>>()?;
        match self {
            Tree::Atomic(tree) => Ok(tree.find_many(&keys)?.map(Lookup::Present)),
            Tree::Record(tree) => Ok(tree.find_many(&keys)?.map(Lookup::Record)),
        }
    }

    pub fn eliminate(&mut self, key: &JsonValue) -> Result<()> {
        let key = self.key_from(key)?;
        match self {
            Tree::Atomic(tree) => tree.eliminate(&key),
            Tree::Record(tree) => tree.eliminate(&key),
        }
    }

    pub fn subtree(&self, key: &JsonValue) -> Result<Tree> {
        let key = self.key_from(key)?;
        match self {
            Tree::Atomic(tree) => Ok(Tree::Atomic(tree.subtree(&key)?)),
            Tree::Record(tree) => Ok(Tree::Record(tree.subtree(&key)?)),
        }
    }

    pub fn empty(&mut self) {
        match self {
            Tree::Atomic(tree) => tree.empty(),
            Tree::Record(tree) => tree.empty(),
        }
    }

    pub fn lt(&self, other: &Tree) -> Result<bool> {
        match (self, other) {
            (Tree::Atomic(a), Tree::Atomic(b)) => a.lt(b),
            (Tree::Record(a), Tree::Record(b)) => a.lt(b),
            _ => Err(incompatible(self, other)),
        }
    }

    pub fn gt(&self, other: &Tree) -> Result<bool> {
        match (self, other) {
            (Tree::Atomic(a), Tree::Atomic(b)) => a.gt(b),
            (Tree::Record(a), Tree::Record(b)) => a.gt(b),
            _ => Err(incompatible(self, other)),
        }
    }

    pub fn le(&self, other: &Tree) -> Result<bool> {
        match (self, other) {
            (Tree::Atomic(a), Tree::Atomic(b)) => a.le(b),
            (Tree::Record(a), Tree::Record(b)) => a.le(b),
            _ => Err(incompatible(self, other)),
        }
    }

    pub fn ge(&self, other: &Tree) -> Result<bool> {
        match (self, other) {
            (Tree::Atomic(a), Tree::Atomic(b)) => a.ge(b),
            (Tree::Record(a), Tree::Record(b)) => a.ge(b),
            _ => Err(incompatible(self, other)),
        }
    }

    pub fn eq_keys(&self, other: &Tree) -> Result<bool> {
        match (self, other) {
            (Tree::Atomic(a), Tree::Atomic(b)) => a.eq_keys(b),
            (Tree::Record(a), Tree::Record(b)) => a.eq_keys(b),
            _ => Err(incompatible(self, other)),
        }
    }

    pub fn ne_keys(&self, other: &Tree) -> Result<bool> {
        Ok(!self.eq_keys(other)?)
    }

    pub fn merge(&mut self, other: &Tree) -> Result<&mut Self> {
        match (&mut *self, other) {
            (Tree::Atomic(a), Tree::Atomic(b)) => {
                a.merge(b)?;
            }
            (Tree::Record(a), Tree::Record(b)) => {
                a.merge(b)?;
            }
            (left, right) => return Err(incompatible(left, right)),
        }
        Ok(self)
    }

    pub fn store<B: StorageBackend>(&self, persistence: &mut Persistence<B>, name: Option<&str>) -> Result<String> {
        match self {
            Tree::Atomic(tree) => persistence.store(tree, name),
            Tree::Record(tree) => persistence.store(tree, name),
        }
    }

    pub fn load<B: StorageBackend>(&mut self, persistence: &Persistence<B>, name: Option<&str>) -> Result<()> {
        match self {
            Tree::Atomic(tree) => persistence.load(tree, name),
            Tree::Record(tree) => persistence.load(tree, name),
        }
    }
}

impl From<AtomicTree> for Tree {
    fn from(tree: AtomicTree) -> Self {
        Tree::Atomic(tree)
    }
}

impl From<RecordTree> for Tree {
    fn from(tree: RecordTree) -> Self {
        Tree::Record(tree)
    }
}

impl Add for Tree {
    type Output = Result<Tree>;

    fn add(mut self, rhs: Tree) -> Self::Output {
        self.merge(&rhs)?;
        Ok(self)
    }
}

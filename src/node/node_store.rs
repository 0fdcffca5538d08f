// bintree-rust/src/node/node_store.rs

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{BinaryTreeError, Result};

use super::definition::{Node, NodeIdx, Side};

/// Arena of tree nodes addressed by slot index.
///
/// Removed slots are tombstoned and recycled through a free list, so the
/// index of a live node never changes while it is alive. Once the last live
/// node goes the arena is reset, which puts the next root back at slot 0.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeStore<P> {
    slots: Vec<Option<Node<P>>>,
    free: Vec<NodeIdx>,
    root: Option<NodeIdx>,
}

impl<P> Default for NodeStore<P> {
    fn default() -> Self {
        NodeStore {
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
        }
    }
}

impl<P> NodeStore<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeIdx> {
        self.root
    }

    pub fn set_root(&mut self, root: Option<NodeIdx>) {
        self.root = root;
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots, tombstones included.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores a childless node and returns its slot. Freed slots are reused
    /// before the arena grows.
    pub fn append(&mut self, payload: P) -> Result<NodeIdx> {
        if let Some(idx) = self.free.pop() {
            let slot = self.slots.get_mut(idx as usize).ok_or_else(|| {
                BinaryTreeError::OperationFailure(format!("free list points past the arena: {}", idx))
            })?;
            if slot.is_some() {
                return Err(BinaryTreeError::OperationFailure(format!(
                    "free list holds live slot {}",
                    idx
                )));
            }
            *slot = Some(Node::leaf(payload));
            return Ok(idx);
        }
        let idx = NodeIdx::try_from(self.slots.len()).map_err(|_| {
            BinaryTreeError::OperationFailure("node arena is full".to_string())
        })?;
        self.slots.push(Some(Node::leaf(payload)));
        Ok(idx)
    }

    pub fn get(&self, idx: NodeIdx) -> Result<&Node<P>> {
        self.slots
            .get(idx as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| BinaryTreeError::OperationFailure(format!("dangling node reference {}", idx)))
    }

    pub fn get_mut(&mut self, idx: NodeIdx) -> Result<&mut Node<P>> {
        self.slots
            .get_mut(idx as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| BinaryTreeError::OperationFailure(format!("dangling node reference {}", idx)))
    }

    pub fn set_child(&mut self, idx: NodeIdx, side: Side, child: Option<NodeIdx>) -> Result<()> {
        *self.get_mut(idx)?.child_mut(side) = child;
        Ok(())
    }

    /// Tombstones a single slot. The caller is responsible for unlinking it
    /// from its parent first.
    pub fn remove(&mut self, idx: NodeIdx) -> Result<Node<P>> {
        let node = self
            .slots
            .get_mut(idx as usize)
            .and_then(Option::take)
            .ok_or_else(|| BinaryTreeError::OperationFailure(format!("dangling node reference {}", idx)))?;
        self.free.push(idx);
        if self.root == Some(idx) {
            self.root = None;
        }
        if self.is_empty() {
            self.clear();
        }
        Ok(node)
    }

    /// Removes `idx` together with every node reachable below it. Returns the
    /// number of nodes removed.
    pub fn remove_subtree(&mut self, idx: NodeIdx) -> Result<usize> {
        let doomed = self.subtree_slots(idx)?;
        for slot in &doomed {
            self.remove(*slot)?;
        }
        trace!("Removed subtree at slot {} ({} nodes).", idx, doomed.len());
        Ok(doomed.len())
    }

    /// Slots of the subtree rooted at `idx` in pre-order (node, left, right).
    pub fn subtree_slots(&self, idx: NodeIdx) -> Result<Vec<NodeIdx>> {
        let mut order = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            if order.len() > self.len() {
                return Err(BinaryTreeError::OperationFailure(
                    "cycle detected while walking the arena".to_string(),
                ));
            }
            let node = self.get(current)?;
            order.push(current);
            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }
        Ok(order)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = None;
    }

    /// Live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Node<P>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|node| (idx as NodeIdx, node)))
    }

    /// Checks the strict-binary-tree shape: every live node is reached from
    /// the root exactly once, no child reference dangles, and the free list
    /// matches the tombstones.
    pub fn validate(&self) -> Result<()> {
        let tombstones = self.slots.iter().filter(|slot| slot.is_none()).count();
        if tombstones != self.free.len() {
            return Err(BinaryTreeError::OperationFailure(format!(
                "free list has {} entries for {} tombstones",
                self.free.len(),
                tombstones
            )));
        }
        for idx in &self.free {
            if self.slots.get(*idx as usize).is_none_or(Option::is_some) {
                return Err(BinaryTreeError::OperationFailure(format!(
                    "free list entry {} is not a tombstone",
                    idx
                )));
            }
        }

        let root = match self.root {
            Some(root) => root,
            None if self.is_empty() => return Ok(()),
            None => {
                return Err(BinaryTreeError::OperationFailure(
                    "arena holds nodes but has no root".to_string(),
                ));
            }
        };

        let mut seen = vec![false; self.slots.len()];
        let mut stack = vec![root];
        let mut reached = 0usize;
        while let Some(idx) = stack.pop() {
            let node = self.get(idx)?;
            if std::mem::replace(&mut seen[idx as usize], true) {
                return Err(BinaryTreeError::OperationFailure(format!(
                    "slot {} is reachable more than once",
                    idx
                )));
            }
            reached += 1;
            stack.extend(node.left);
            stack.extend(node.right);
        }
        if reached != self.len() {
            return Err(BinaryTreeError::OperationFailure(format!(
                "{} of {} live nodes are unreachable from the root",
                self.len() - reached,
                self.len()
            )));
        }
        Ok(())
    }
}

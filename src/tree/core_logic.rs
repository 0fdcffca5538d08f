use log::trace;

use crate::common::Key;
use crate::error::{BinaryTreeError, Result};
use crate::node::{NodeIdx, NodeStore, Payload, Side};

use super::types::Located;

fn cycle_error() -> BinaryTreeError {
    BinaryTreeError::OperationFailure("walk exceeded the node count; the arena has a cycle".to_string())
}

/// Walks from the root towards `key`. Returns the first node whose sort key
/// equals `key`, with its parent link, or `None` once an absent child is hit.
pub(super) fn locate<P: Payload>(store: &NodeStore<P>, key: &Key) -> Result<Option<Located>> {
    let mut current = match store.root() {
        Some(root) => root,
        None => return Ok(None),
    };
    let mut parent = None;
    for _ in 0..=store.len() {
        let node = store.get(current)?;
        let node_key = node.payload.sort_key();
        if node_key == key {
            return Ok(Some(Located { idx: current, parent }));
        }
        let side = Side::towards(key, node_key);
        match node.child(side) {
            Some(child) => {
                parent = Some((current, side));
                current = child;
            }
            None => return Ok(None),
        }
    }
    Err(cycle_error())
}

/// Links `payload` below the first absent child on its search path, or makes
/// it the root of an empty store.
pub(super) fn insert_impl<P: Payload>(store: &mut NodeStore<P>, payload: P) -> Result<NodeIdx> {
    let mut current = match store.root() {
        Some(root) => root,
        None => {
            let idx = store.append(payload)?;
            store.set_root(Some(idx));
            trace!("Created root at slot {}.", idx);
            return Ok(idx);
        }
    };
    for _ in 0..=store.len() {
        let node = store.get(current)?;
        let side = Side::towards(payload.sort_key(), node.payload.sort_key());
        match node.child(side) {
            Some(child) => current = child,
            None => {
                let idx = store.append(payload)?;
                store.set_child(current, side, Some(idx))?;
                return Ok(idx);
            }
        }
    }
    Err(cycle_error())
}

/// Payloads of the subtree at `start` in pre-order (node, left, right).
pub(super) fn preorder_payloads<P: Payload>(store: &NodeStore<P>, start: NodeIdx) -> Result<Vec<P>> {
    store
        .subtree_slots(start)?
        .into_iter()
        .map(|idx| store.get(idx).map(|node| node.payload.clone()))
        .collect()
}

/// Payloads in sort-key order.
pub(super) fn in_order_impl<P: Payload>(store: &NodeStore<P>) -> Result<Vec<&P>> {
    let mut out = Vec::with_capacity(store.len());
    let mut stack: Vec<NodeIdx> = Vec::new();
    let mut current = store.root();
    loop {
        while let Some(idx) = current {
            if stack.len() > store.len() {
                return Err(cycle_error());
            }
            stack.push(idx);
            current = store.get(idx)?.left;
        }
        let idx = match stack.pop() {
            Some(idx) => idx,
            None => break,
        };
        let node = store.get(idx)?;
        out.push(&node.payload);
        if out.len() > store.len() {
            return Err(cycle_error());
        }
        current = node.right;
    }
    Ok(out)
}

/// Number of nodes on the longest root-to-leaf path.
pub(super) fn height_impl<P: Payload>(store: &NodeStore<P>) -> Result<usize> {
    let mut height = 0;
    let mut stack: Vec<(NodeIdx, usize)> = store.root().map(|root| (root, 1)).into_iter().collect();
    let mut visited = 0usize;
    while let Some((idx, depth)) = stack.pop() {
        visited += 1;
        if visited > store.len() {
            return Err(cycle_error());
        }
        height = height.max(depth);
        let node = store.get(idx)?;
        stack.extend(node.left.map(|child| (child, depth + 1)));
        stack.extend(node.right.map(|child| (child, depth + 1)));
    }
    Ok(height)
}

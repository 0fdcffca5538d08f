// bintree-rust/src/node/definition.rs

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::common::{Key, PayloadKind, Record};
use crate::error::{BinaryTreeError, Result};

/// Slot index of a node inside its [`NodeStore`](super::NodeStore).
pub type NodeIdx = u32;

/// Which child slot of a parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Direction taken from a node holding `node_key` when walking towards
    /// `key`. Ties go right.
    pub fn towards(key: &Key, node_key: &Key) -> Side {
        if key < node_key {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// Anything a tree can order. The tree's traversal only ever looks at the
/// sort key, so the same code serves scalars and records.
pub trait Payload: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// The value used for ordering comparisons.
    fn sort_key(&self) -> &Key;

    /// Checks that this payload may enter a tree of `kind`, returning the
    /// tree's kind after admission (a record tree without a key kind adopts
    /// the record's).
    fn admit(&self, kind: PayloadKind) -> Result<PayloadKind>;
}

impl Payload for Key {
    fn sort_key(&self) -> &Key {
        self
    }

    fn admit(&self, kind: PayloadKind) -> Result<PayloadKind> {
        self.validate()?;
        match kind {
            PayloadKind::Atomic(expected) if expected == self.kind() => Ok(kind),
            PayloadKind::Atomic(expected) => Err(BinaryTreeError::InvalidPayload(format!(
                "expected a {} node, got {}",
                expected, self
            ))),
            PayloadKind::Record(_) => Err(BinaryTreeError::InvalidPayload(format!(
                "a record tree cannot hold the scalar {}",
                self
            ))),
        }
    }
}

impl Payload for Record {
    fn sort_key(&self) -> &Key {
        self.key()
    }

    fn admit(&self, kind: PayloadKind) -> Result<PayloadKind> {
        self.key().validate()?;
        match kind {
            PayloadKind::Record(None) => Ok(PayloadKind::Record(Some(self.key().kind()))),
            PayloadKind::Record(Some(expected)) if expected == self.key().kind() => Ok(kind),
            PayloadKind::Record(Some(expected)) => Err(BinaryTreeError::InvalidPayload(format!(
                "expected a record keyed by {}, got key {}",
                expected,
                self.key()
            ))),
            PayloadKind::Atomic(_) => Err(BinaryTreeError::InvalidPayload(
                "an atomic tree cannot hold records".to_string(),
            )),
        }
    }
}

/// One arena entry: a payload plus its two child references.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Node<P> {
    pub payload: P,
    pub left: Option<NodeIdx>,
    pub right: Option<NodeIdx>,
}

impl<P> Node<P> {
    pub fn leaf(payload: P) -> Self {
        Node {
            payload,
            left: None,
            right: None,
        }
    }

    pub fn child(&self, side: Side) -> Option<NodeIdx> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn child_mut(&mut self, side: Side) -> &mut Option<NodeIdx> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

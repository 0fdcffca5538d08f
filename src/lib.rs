// src/lib.rs

//! Unbalanced binary search trees over a flat node arena, with named
//! snapshots kept in a pluggable storage backend.
//!
//! Two variants share one implementation: [`AtomicTree`] stores bare scalar
//! keys, [`RecordTree`] stores records sorted by their `key` field. The
//! [`Tree`] facade drives either from JSON values.

// Declare all modules
pub mod common;
pub mod error;
pub mod facade;
pub mod node;
pub mod store;
pub mod tree;

pub use crate::common::{Field, Key, KeyKind, PayloadKind, Record, StoreConfig, RECORD_KEY_FIELD};
pub use crate::error::{BinaryTreeError, Result};
pub use crate::facade::{Lookup, Tree};
pub use crate::node::{Node, NodeIdx, NodeStore, Payload, Side};
pub use crate::store::{DirStore, InMemoryStore, Persistence, StorageBackend};
pub use crate::tree::{AtomicTree, BinaryTree, Found, RecordTree};

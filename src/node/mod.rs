// bintree-rust/src/node/mod.rs

pub mod definition;
pub mod node_store;

// Re-export key items for easier access from `crate::node::`
pub use definition::{Node, NodeIdx, Payload, Side};
pub use node_store::NodeStore;

// bintree-rust/src/tree/mod.rs

pub mod binary_tree;
pub mod types;
mod core_logic;
mod ops;

// Re-export the main BinaryTree struct for easier access
pub use binary_tree::{AtomicTree, BinaryTree, RecordTree};
pub use types::Found;

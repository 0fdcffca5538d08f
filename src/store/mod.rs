// bintree-rust/src/store/mod.rs

pub mod backend;
pub mod dir_store;
pub mod file_io;
pub mod format;
pub mod mem_store;
pub mod persistence;

// Re-export key items for easier access from `crate::store::`
pub use backend::StorageBackend;
pub use dir_store::DirStore;
pub use mem_store::InMemoryStore;
pub use persistence::Persistence;

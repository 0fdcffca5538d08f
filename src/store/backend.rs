// bintree-rust/src/store/backend.rs

use std::collections::BTreeSet;

use crate::error::Result; // Using our custom Result type

/// Trait for a named blob store.
/// Implementations keep opaque byte blobs under string keys inside a single
/// storage area, which may have to be created before the first write.
pub trait StorageBackend: std::fmt::Debug {
    /// Whether the storage area exists yet.
    fn area_exists(&self) -> Result<bool>;

    /// Creates the storage area if it is missing.
    fn ensure_area(&mut self) -> Result<()>;

    /// Checks if a blob with the given key exists.
    /// Optional: can be defaulted if not implemented, or implemented for efficiency.
    fn exists(&self, key: &str) -> Result<bool> {
        self.read(key).map(|opt| opt.is_some())
    }

    /// Stores a blob, replacing any previous one under the same key.
    fn write(&mut self, key: &str, bytes: Vec<u8>) -> Result<()>; // Takes ownership of bytes

    /// Retrieves a blob by its key.
    /// Returns `Ok(None)` if the blob is not found.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Deletes a blob. Fails with `FileNotFound` if there is none.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Keys of every blob in the area.
    fn list_keys(&self) -> Result<BTreeSet<String>>;
}

// bintree-rust/src/store/mem_store.rs

use std::collections::{BTreeSet, HashMap};

use super::backend::StorageBackend;
use crate::error::{BinaryTreeError, Result};

/// An in-memory `StorageBackend`. The area springs into existence on the
/// first `ensure_area`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    area: Option<HashMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose area already exists.
    pub fn with_area() -> Self {
        Self {
            area: Some(HashMap::new()),
        }
    }

    pub fn get_all_blobs_for_test(&self) -> HashMap<String, Vec<u8>> {
        self.area.clone().unwrap_or_default()
    }

    fn area_mut(&mut self) -> Result<&mut HashMap<String, Vec<u8>>> {
        self.area.as_mut().ok_or(BinaryTreeError::StorageMissing)
    }
}

impl StorageBackend for InMemoryStore {
    fn area_exists(&self) -> Result<bool> {
        Ok(self.area.is_some())
    }

    fn ensure_area(&mut self) -> Result<()> {
        self.area.get_or_insert_with(HashMap::new);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.area.as_ref().is_some_and(|area| area.contains_key(key)))
    }

    fn write(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        self.area_mut()?.insert(key.to_string(), bytes);
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.area.as_ref().and_then(|area| area.get(key).cloned()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.area_mut()?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BinaryTreeError::FileNotFound(key.to_string()))
    }

    fn list_keys(&self) -> Result<BTreeSet<String>> {
        let area = self.area.as_ref().ok_or(BinaryTreeError::StorageMissing)?;
        Ok(area.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_need_an_area() {
        let mut store = InMemoryStore::new();
        assert!(!store.area_exists().unwrap());
        assert!(matches!(store.write("a.bt", vec![1]), Err(BinaryTreeError::StorageMissing)));
        store.ensure_area().unwrap();
        store.write("a.bt", vec![1]).unwrap();
        assert!(store.exists("a.bt").unwrap());
        assert_eq!(store.read("a.bt").unwrap(), Some(vec![1]));
    }

    #[test]
    fn remove_of_missing_blob_fails() {
        let mut store = InMemoryStore::with_area();
        assert!(matches!(store.remove("x.bt"), Err(BinaryTreeError::FileNotFound(_))));
    }
}

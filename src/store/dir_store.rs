// bintree-rust/src/store/dir_store.rs

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use super::backend::StorageBackend;
use crate::error::{BinaryTreeError, Result};

/// A `StorageBackend` keeping one file per key inside a single directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // Keys are flat file names; anything that could escape the area is refused.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key == "." || key == ".." || key.contains(['/', '\\']) {
            return Err(BinaryTreeError::OperationFailure(format!("invalid storage key {:?}", key)));
        }
        Ok(self.root.join(key))
    }
}

impl StorageBackend for DirStore {
    fn area_exists(&self) -> Result<bool> {
        Ok(self.root.is_dir())
    }

    fn ensure_area(&mut self) -> Result<()> {
        if !self.root.is_dir() {
            debug!("Creating storage area {}.", self.root.display());
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.path_for(key)?.is_file())
    }

    fn write(&mut self, key: &str, bytes: Vec<u8>) -> Result<()> {
        if !self.root.is_dir() {
            return Err(BinaryTreeError::StorageMissing);
        }
        fs::write(self.path_for(key)?, bytes)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BinaryTreeError::FileNotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn list_keys(&self) -> Result<BTreeSet<String>> {
        if !self.root.is_dir() {
            return Err(BinaryTreeError::StorageMissing);
        }
        let mut keys = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.insert(name.to_string());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_is_created_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path().join("storage"));
        assert!(!store.area_exists().unwrap());
        assert!(matches!(store.list_keys(), Err(BinaryTreeError::StorageMissing)));

        store.ensure_area().unwrap();
        store.write("tree.bt", b"abc".to_vec()).unwrap();
        assert_eq!(store.read("tree.bt").unwrap(), Some(b"abc".to_vec()));
        assert_eq!(store.list_keys().unwrap().into_iter().collect::<Vec<_>>(), vec!["tree.bt"]);

        store.remove("tree.bt").unwrap();
        assert_eq!(store.read("tree.bt").unwrap(), None);
        assert!(matches!(store.remove("tree.bt"), Err(BinaryTreeError::FileNotFound(_))));
    }

    #[test]
    fn keys_cannot_leave_the_area() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::new(dir.path());
        assert!(store.write("../escape.bt", vec![0]).is_err());
        assert!(store.read("a/b.bt").is_err());
    }
}

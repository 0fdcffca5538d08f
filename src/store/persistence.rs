// bintree-rust/src/store/persistence.rs

use chrono::Utc;
use log::{debug, warn};
use rand::Rng;

use super::backend::StorageBackend;
use super::file_io::{read_snapshot, write_snapshot};
use super::format::SnapshotMetadata;
use crate::common::{PayloadKind, StoreConfig};
use crate::error::{wrap_fault, BinaryTreeError, Result};
use crate::node::Payload;
use crate::tree::BinaryTree;

/// Saves, loads and deletes trees by name through an injected backend.
///
/// A tree named `n` lives under the blob key `"n.<file_extension>"`.
#[derive(Debug)]
pub struct Persistence<B: StorageBackend> {
    backend: B,
    config: StoreConfig,
}

// Empty names count as no name at all.
fn given(name: Option<&str>) -> Option<&str> {
    name.filter(|name| !name.is_empty())
}

// Backend and codec faults surface as `OperationFailure`; errors describing a
// malformed blob pass through.
fn storage_fault<T>(result: Result<T>) -> Result<T> {
    match result {
        Err(err) if err.is_format() => Err(err),
        other => wrap_fault(other, BinaryTreeError::OperationFailure),
    }
}

impl<B: StorageBackend> Persistence<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StoreConfig::default())
    }

    pub fn with_config(backend: B, config: StoreConfig) -> Self {
        Persistence { backend, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    fn blob_key(&self, name: &str) -> String {
        format!("{}.{}", name, self.config.file_extension)
    }

    /// A random lowercase name of the configured length.
    pub fn generate_name(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.config.generated_name_len)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect()
    }

    /// Writes a snapshot of `tree`. The name is `name`, else the tree's own
    /// name, else a generated one; the name used is returned. The tree
    /// itself is not renamed.
    pub fn store<P: Payload>(&mut self, tree: &BinaryTree<P>, name: Option<&str>) -> Result<String> {
        let name = match given(name).or(given(tree.name())) {
            Some(name) => name.to_string(),
            None => self.generate_name(),
        };
        let metadata = SnapshotMetadata {
            name: Some(name.clone()),
            kind: tree.kind(),
            node_count: tree.len() as u64,
            created_at: Utc::now().to_rfc3339(),
        };
        let bytes = storage_fault(write_snapshot(tree.node_store(), &metadata, true))?;
        storage_fault(self.backend.ensure_area())?;
        let key = self.blob_key(&name);
        debug!("Storing tree {:?} under {} ({} bytes).", name, key, bytes.len());
        storage_fault(self.backend.write(&key, bytes))?;
        Ok(name)
    }

    /// Replaces the arena of `tree` with the snapshot stored under `name`
    /// (or under the tree's own name). An unnamed tree adopts the name.
    pub fn load<P: Payload>(&self, tree: &mut BinaryTree<P>, name: Option<&str>) -> Result<()> {
        let name = given(name)
            .or(given(tree.name()))
            .ok_or(BinaryTreeError::NameRequired)?
            .to_string();
        let key = self.blob_key(&name);
        let bytes = storage_fault(self.backend.read(&key))?
            .ok_or_else(|| BinaryTreeError::FileNotFound(key.clone()))?;
        let (store, metadata) =
            storage_fault(read_snapshot::<P>(&bytes, tree.kind(), self.config.verify_checksum))?;

        if metadata.name.as_deref() != Some(name.as_str()) {
            warn!(
                "Blob {} was written for tree {:?}; loading it as {:?}.",
                key, metadata.name, name
            );
        }
        // A record tree that already knows its key kind keeps it when the
        // snapshot was taken before any record arrived.
        let kind = match (tree.kind(), metadata.kind) {
            (PayloadKind::Record(Some(known)), PayloadKind::Record(None)) => PayloadKind::Record(Some(known)),
            (_, loaded) => loaded,
        };
        tree.replace_store(store, kind);
        if given(tree.name()).is_none() {
            tree.set_name(Some(&name));
        }
        debug!("Loaded tree {:?} from {} ({} node(s)).", name, key, tree.len());
        Ok(())
    }

    /// Deletes the stored tree called `name`.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let name = given(Some(name)).ok_or(BinaryTreeError::NameRequired)?;
        if !storage_fault(self.backend.area_exists())? {
            return Err(BinaryTreeError::StorageMissing);
        }
        let key = self.blob_key(name);
        if !storage_fault(self.backend.exists(&key))? {
            return Err(BinaryTreeError::FileNotFound(key));
        }
        storage_fault(self.backend.remove(&key))?;
        debug!("Deleted stored tree {:?}.", name);
        Ok(())
    }

    /// Whether a tree called `name` is stored.
    pub fn contains(&self, name: &str) -> Result<bool> {
        if !storage_fault(self.backend.area_exists())? {
            return Ok(false);
        }
        storage_fault(self.backend.exists(&self.blob_key(name)))
    }

    /// Names of all stored trees, sorted. Blobs without the configured
    /// extension are ignored.
    pub fn list(&self) -> Result<Vec<String>> {
        if !storage_fault(self.backend.area_exists())? {
            return Ok(Vec::new());
        }
        let suffix = format!(".{}", self.config.file_extension);
        Ok(storage_fault(self.backend.list_keys())?
            .into_iter()
            .filter_map(|key| key.strip_suffix(&suffix).map(str::to_string))
            .filter(|name| !name.is_empty())
            .collect())
    }
}

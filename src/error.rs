// bintree-rust/src/error.rs

use thiserror::Error;

/// Custom error type for the binary tree library.
#[derive(Error, Debug)]
pub enum BinaryTreeError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Node not found for key {0}")]
    NodeNotFound(String),

    #[error("Incompatible trees: {0}")]
    IncompatibleTrees(String),

    #[error("There was an error while adding the node: {0}")]
    InsertFailure(String),

    #[error("Tree arithmetic failed: {0}")]
    ArithmeticFailure(String),

    #[error("Operation failed: {0}")]
    OperationFailure(String),

    #[error("A file name is needed to load a tree")]
    NameRequired,

    #[error("Binary tree file not found: {0}")]
    FileNotFound(String),

    #[error("Storage area does not exist")]
    StorageMissing,

    #[error("Bincode serialization/deserialization error: {source}")]
    BincodeError {
        #[from]
        source: bincode::Error,
    },

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),
    #[error("Checksum mismatch: {context}")]
    ChecksumMismatch { context: String },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BinaryTreeError {
    /// True for the variants that describe a caller mistake rather than an
    /// internal fault. Those pass through the public boundaries unchanged.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            BinaryTreeError::InvalidPayload(_)
                | BinaryTreeError::NodeNotFound(_)
                | BinaryTreeError::IncompatibleTrees(_)
                | BinaryTreeError::NameRequired
                | BinaryTreeError::FileNotFound(_)
                | BinaryTreeError::StorageMissing
        )
    }

    /// True for errors describing a malformed snapshot blob.
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            BinaryTreeError::InvalidFileFormat(_)
                | BinaryTreeError::ChecksumMismatch { .. }
                | BinaryTreeError::Deserialization(_)
        )
    }
}

/// Result type alias for binary tree operations.
pub type Result<T> = std::result::Result<T, BinaryTreeError>;

/// Re-signals internal faults of a public operation as that operation's
/// domain error. Domain errors are returned untouched.
pub(crate) fn wrap_fault<T>(
    result: Result<T>,
    to_domain: impl FnOnce(String) -> BinaryTreeError,
) -> Result<T> {
    result.map_err(|err| if err.is_domain() { err } else { to_domain(err.to_string()) })
}

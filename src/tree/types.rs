use crate::error::{BinaryTreeError, Result};
use crate::node::{NodeIdx, Side};

// --- Internal Helper Structs ---

/// Where a lookup walk stopped on a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Located {
    pub(super) idx: NodeIdx,
    /// `None` when the match is the root.
    pub(super) parent: Option<(NodeIdx, Side)>,
}

// --- Public API Data Structs ---

/// Result of a multi-key lookup. A single key yields its result directly;
/// any other count yields the ordered list.
#[derive(Debug, Clone, PartialEq)]
pub enum Found<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Found<T> {
    pub(crate) fn from_results(mut results: Vec<T>) -> Result<Self> {
        match results.len() {
            0 => Err(BinaryTreeError::OperationFailure(
                "No node was passed to the function.".to_string(),
            )),
            1 => Ok(Found::One(results.remove(0))),
            _ => Ok(Found::Many(results)),
        }
    }

    /// The single result, if exactly one key was looked up.
    pub fn one(self) -> Option<T> {
        match self {
            Found::One(value) => Some(value),
            Found::Many(_) => None,
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Found::One(value) => vec![value],
            Found::Many(values) => values,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Found<U> {
        match self {
            Found::One(value) => Found::One(f(value)),
            Found::Many(values) => Found::Many(values.into_iter().map(f).collect()),
        }
    }
}

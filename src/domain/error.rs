//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Domain errors represent misuse of the tree structure or malformed outlines.
///
/// Uniqueness rejections are not errors: they surface as `Ok(None)` / `Ok(false)`
/// from the mutating call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("no child at index {index}, node only has {count} children")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("node not found in tree: {0}")]
    NodeNotFound(NodeId),

    #[error("outline is empty")]
    EmptyOutline,

    #[error("outline line {line}: second root node, an outline has exactly one root")]
    MultipleRoots { line: usize },

    #[error("outline line {line}: root node must not be indented")]
    IndentedRoot { line: usize },

    #[error("outline line {line}: duplicate sibling value '{value}'")]
    DuplicateSibling { line: usize, value: String },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

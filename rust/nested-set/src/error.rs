use nested_set_storage::NestedSetStoreError;
use thiserror::Error;

/// Errors that can occur when maintaining a nested set tree.
///
/// Structural problems in an existing tree are not errors: they are reported
/// by [crate::validate] as a [crate::ValidationReport].
#[derive(Error, Debug)]
pub enum NestedSetError {
    /// A move was requested for a node that has not been persisted
    #[error("You cannot move a new node: {0}")]
    NotPersisted(String),

    /// A position token was not one of `child`, `left`, `right` or `root`
    #[error("Position should be child, left, right or root ('{0}' received)")]
    UnknownPosition(String),

    /// A position that needs a target node was given none
    #[error("Position '{0}' requires a target node")]
    MissingTarget(String),

    /// The target lies inside the subtree of the node being moved
    #[error("Impossible move, target node cannot be inside moved tree: {0}")]
    ImpossibleMove(String),

    /// Two nodes that must share a scope do not
    #[error("Nodes belong to different scopes: {0}")]
    ScopeMismatch(String),

    /// A node's boundaries have never been allocated
    #[error("Node has no boundaries allocated: {0}")]
    Unallocated(String),

    /// A node that an operation refers to does not exist
    #[error("Node not found: {0}")]
    NotFound(String),

    /// A configuration could not be read
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// An error from the backing store
    #[error("{0}")]
    Storage(NestedSetStoreError),
}

impl From<NestedSetStoreError> for NestedSetError {
    fn from(value: NestedSetStoreError) -> Self {
        NestedSetError::Storage(value)
    }
}

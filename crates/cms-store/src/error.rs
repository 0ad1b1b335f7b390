use cms_types::{NodePath, TypeError};

/// Errors from node store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A node already exists at the path being created.
    #[error("item exists: {0}")]
    ItemExists(NodePath),

    /// The parent of a node being created does not exist.
    #[error("parent of {0} does not exist")]
    ParentNotFound(NodePath),

    /// The node addressed by a mutation does not exist.
    #[error("node not found: {0}")]
    NotFound(NodePath),

    /// The node or change set is structurally invalid.
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,

    /// Snapshot encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored path or identity failed validation.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

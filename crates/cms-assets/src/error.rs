use cms_store::StoreError;
use cms_types::{NodeId, NodePath, TypeError};
use thiserror::Error;

/// Errors from asset operations.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The node's classification tag matches none of the supported asset
    /// shapes. Raised when an asset view is constructed, never later.
    #[error("illegal classification at {path}: {found:?} is not a supported asset shape")]
    IllegalClassification { path: NodePath, found: String },

    /// A staged write targeted a path that already holds a node.
    #[error("path is occupied: {0}")]
    OccupiedPath(NodePath),

    /// A link's reference is absent or names a node that no longer exists.
    #[error("unresolved reference from {link} to {}", describe_target(.target))]
    UnresolvedReference {
        link: NodePath,
        target: Option<NodeId>,
    },

    /// Link resolution revisited a link or exceeded the configured hop limit.
    #[error("cyclic reference from {link} after {hops} hops")]
    CyclicReference { link: NodePath, hops: usize },

    /// No node exists at the requested path or identity.
    #[error("asset not found: {0}")]
    NotFound(String),

    /// Invalid or unreadable configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Failure propagated unchanged from the store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),
}

fn describe_target(target: &Option<NodeId>) -> String {
    match target {
        Some(id) => id.to_string(),
        None => "<absent>".to_string(),
    }
}

/// Result alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

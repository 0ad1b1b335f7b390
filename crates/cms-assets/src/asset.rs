use cms_types::{NodeId, NodePath};

use crate::error::AssetResult;
use crate::view::{AssetContent, AssetMetadata};

/// What every asset representation offers, whatever its physical shape.
///
/// Assets are live views: each call re-reads the store. Equality and
/// hashing of implementors are defined by [`identity`](Asset::identity)
/// alone, so two views of the same logical asset compare equal even when
/// they were built from different nodes.
pub trait Asset {
    /// Stable identity. Never changes for the lifetime of the asset.
    fn identity(&self) -> NodeId;

    /// Current location. After external deletion, the last known location.
    fn path(&self) -> AssetResult<NodePath>;

    /// Binary content accessor.
    fn content(&self) -> AssetResult<AssetContent>;

    /// Metadata accessor.
    fn metadata(&self) -> AssetResult<AssetMetadata>;
}

/// Implements identity-based `PartialEq`, `Eq` and `Hash` for an [`Asset`].
macro_rules! identity_equality {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::asset::Asset::identity(self) == $crate::asset::Asset::identity(other)
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&$crate::asset::Asset::identity(self), state);
            }
        }
    };
}

pub(crate) use identity_equality;

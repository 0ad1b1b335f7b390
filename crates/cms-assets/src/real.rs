use cms_store::Node;
use cms_types::{NodeId, NodePath};

use crate::asset::{identity_equality, Asset};
use crate::context::AssetContext;
use crate::error::{AssetError, AssetResult};
use crate::schema::{METADATA_CHILD, REAL_ASSET, REAL_RESOURCE};
use crate::view::{AssetContent, AssetMetadata, Locator};

/// Self-contained asset: a `cms:Asset` node owning a `file` child with the
/// binary and a `metadata` child with its properties.
///
/// Identity is the node's own identity.
#[derive(Clone)]
pub struct RealAsset {
    ctx: AssetContext,
    id: NodeId,
    path: NodePath,
}

impl RealAsset {
    /// Wrap the real asset at `path`.
    pub fn open(ctx: &AssetContext, path: &NodePath) -> AssetResult<Self> {
        let node = ctx
            .open()?
            .node(path)?
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        Self::from_node(ctx, &node)
    }

    /// Wrap an already-read node, checking its classification.
    pub fn from_node(ctx: &AssetContext, node: &Node) -> AssetResult<Self> {
        if !node.is_of_type(REAL_ASSET) {
            return Err(AssetError::IllegalClassification {
                path: node.path.clone(),
                found: node.primary_type.clone(),
            });
        }
        Ok(Self {
            ctx: ctx.clone(),
            id: node.id,
            path: node.path.clone(),
        })
    }
}

impl Asset for RealAsset {
    fn identity(&self) -> NodeId {
        self.id
    }

    fn path(&self) -> AssetResult<NodePath> {
        let live = self.ctx.open()?.node_by_id(&self.id)?;
        Ok(live.map_or_else(|| self.path.clone(), |node| node.path))
    }

    fn content(&self) -> AssetResult<AssetContent> {
        Ok(AssetContent::new(
            self.ctx.clone(),
            Locator::new(self.id, REAL_RESOURCE),
        ))
    }

    fn metadata(&self) -> AssetResult<AssetMetadata> {
        Ok(AssetMetadata::new(
            self.ctx.clone(),
            Locator::new(self.id, METADATA_CHILD).requiring(REAL_RESOURCE),
        ))
    }
}

identity_equality!(RealAsset);

impl std::fmt::Debug for RealAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealAsset")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

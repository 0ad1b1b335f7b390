use std::collections::HashSet;

use cms_store::{Node, Session};
use cms_types::{NodeId, NodePath};
use tracing::debug;

use crate::asset::{identity_equality, Asset};
use crate::context::AssetContext;
use crate::error::{AssetError, AssetResult};
use crate::schema::{LINK_ASSET, TARGET_PROPERTY};
use crate::universal::UniversalAsset;
use crate::view::{AssetContent, AssetMetadata};

/// Reference holder: a `cms:AssetLink` node whose `target` property names
/// another asset's identity.
///
/// Content and metadata come from the end of the link chain. The identity
/// is always the link's own.
#[derive(Clone)]
pub struct LinkAsset {
    ctx: AssetContext,
    id: NodeId,
    path: NodePath,
}

impl LinkAsset {
    pub fn open(ctx: &AssetContext, path: &NodePath) -> AssetResult<Self> {
        let node = ctx
            .open()?
            .node(path)?
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        Self::from_node(ctx, &node)
    }

    pub fn from_node(ctx: &AssetContext, node: &Node) -> AssetResult<Self> {
        if !node.is_of_type(LINK_ASSET) {
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

    /// The identity currently stored in the `target` property.
    pub fn target_identity(&self) -> AssetResult<Option<NodeId>> {
        let session = self.ctx.open()?;
        Ok(self
            .own_node(session.as_ref())?
            .reference_property(TARGET_PROPERTY))
    }

    /// Follow exactly one hop. The result may itself be a link.
    pub fn resolve_once(&self) -> AssetResult<UniversalAsset> {
        let session = self.ctx.open()?;
        let node = self.own_node(session.as_ref())?;
        let target = self.follow(session.as_ref(), &node)?;
        UniversalAsset::from_node(&self.ctx, session.as_ref(), &target)
    }

    /// Follow the chain until it reaches an asset that is not a link.
    ///
    /// Fails with [`AssetError::CyclicReference`] when a link is visited
    /// twice or more than `max_link_hops` links are followed, and with
    /// [`AssetError::UnresolvedReference`] when any link in the chain has no
    /// target or names a node that no longer exists.
    pub fn resolve(&self) -> AssetResult<UniversalAsset> {
        let session = self.ctx.open()?;
        let max_hops = self.ctx.config().max_link_hops;
        let mut visited = HashSet::from([self.id]);
        let mut current = self.own_node(session.as_ref())?;

        for hop in 1..=max_hops {
            let target = self.follow(session.as_ref(), &current)?;
            if !target.is_of_type(LINK_ASSET) {
                debug!(link = %self.path, hops = hop, target = %target.path, "link resolved");
                return UniversalAsset::from_node(&self.ctx, session.as_ref(), &target);
            }
            if !visited.insert(target.id) {
                return Err(AssetError::CyclicReference {
                    link: self.path.clone(),
                    hops: hop,
                });
            }
            current = target;
        }

        Err(AssetError::CyclicReference {
            link: self.path.clone(),
            hops: max_hops,
        })
    }

    fn own_node(&self, session: &dyn Session) -> AssetResult<Node> {
        session
            .node_by_id(&self.id)?
            .ok_or_else(|| AssetError::UnresolvedReference {
                link: self.path.clone(),
                target: None,
            })
    }

    fn follow(&self, session: &dyn Session, link: &Node) -> AssetResult<Node> {
        let unresolved = |target| AssetError::UnresolvedReference {
            link: link.path.clone(),
            target,
        };
        let target = link
            .reference_property(TARGET_PROPERTY)
            .ok_or_else(|| unresolved(None))?;
        session
            .node_by_id(&target)?
            .ok_or_else(|| unresolved(Some(target)))
    }
}

impl Asset for LinkAsset {
    fn identity(&self) -> NodeId {
        self.id
    }

    fn path(&self) -> AssetResult<NodePath> {
        let live = self.ctx.open()?.node_by_id(&self.id)?;
        Ok(live.map_or_else(|| self.path.clone(), |node| node.path))
    }

    fn content(&self) -> AssetResult<AssetContent> {
        self.resolve()?.content()
    }

    fn metadata(&self) -> AssetResult<AssetMetadata> {
        self.resolve()?.metadata()
    }
}

identity_equality!(LinkAsset);

impl std::fmt::Debug for LinkAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkAsset")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

use std::fmt;

use cms_store::{Node, Session};
use cms_types::{NodeId, NodePath};
use serde::Serialize;

use crate::asset::{identity_equality, Asset};
use crate::context::AssetContext;
use crate::error::{AssetError, AssetResult};
use crate::legacy::LegacyBinaryAsset;
use crate::link::LinkAsset;
use crate::real::RealAsset;
use crate::schema::{LEGACY_FILE, LINK_ASSET, REAL_ASSET};
use crate::view::{AssetContent, AssetMetadata};

/// Any supported asset, with its representation chosen once from the
/// node's classification tag.
#[derive(Clone)]
pub enum UniversalAsset {
    Real(RealAsset),
    Link(LinkAsset),
    Legacy(LegacyBinaryAsset),
}

/// Which representation a [`UniversalAsset`] wraps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Real,
    Link,
    Legacy,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Real => "real",
            AssetKind::Link => "link",
            AssetKind::Legacy => "legacy",
        };
        f.write_str(name)
    }
}

impl UniversalAsset {
    /// Wrap the asset at `path`.
    pub fn open(ctx: &AssetContext, path: &NodePath) -> AssetResult<Self> {
        let session = ctx.open()?;
        let node = session
            .node(path)?
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        Self::from_node(ctx, session.as_ref(), &node)
    }

    /// Wrap the asset whose node has identity `id`.
    pub fn open_by_id(ctx: &AssetContext, id: &NodeId) -> AssetResult<Self> {
        let session = ctx.open()?;
        let node = session
            .node_by_id(id)?
            .ok_or_else(|| AssetError::NotFound(id.to_string()))?;
        Self::from_node(ctx, session.as_ref(), &node)
    }

    /// Select the representation for `node`.
    ///
    /// Fails with [`AssetError::IllegalClassification`] if the tag names
    /// none of the supported shapes.
    pub fn from_node(ctx: &AssetContext, session: &dyn Session, node: &Node) -> AssetResult<Self> {
        match node.primary_type.as_str() {
            REAL_ASSET => Ok(Self::Real(RealAsset::from_node(ctx, node)?)),
            LINK_ASSET => Ok(Self::Link(LinkAsset::from_node(ctx, node)?)),
            LEGACY_FILE => Ok(Self::Legacy(LegacyBinaryAsset::from_node(ctx, session, node)?)),
            other => Err(AssetError::IllegalClassification {
                path: node.path.clone(),
                found: other.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Real(_) => AssetKind::Real,
            Self::Link(_) => AssetKind::Link,
            Self::Legacy(_) => AssetKind::Legacy,
        }
    }

    pub fn as_real(&self) -> Option<&RealAsset> {
        match self {
            Self::Real(real) => Some(real),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkAsset> {
        match self {
            Self::Link(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_legacy(&self) -> Option<&LegacyBinaryAsset> {
        match self {
            Self::Legacy(legacy) => Some(legacy),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Asset {
        match self {
            Self::Real(real) => real,
            Self::Link(link) => link,
            Self::Legacy(legacy) => legacy,
        }
    }
}

impl Asset for UniversalAsset {
    fn identity(&self) -> NodeId {
        self.inner().identity()
    }

    fn path(&self) -> AssetResult<NodePath> {
        self.inner().path()
    }

    fn content(&self) -> AssetResult<AssetContent> {
        self.inner().content()
    }

    fn metadata(&self) -> AssetResult<AssetMetadata> {
        self.inner().metadata()
    }
}

identity_equality!(UniversalAsset);

impl fmt::Debug for UniversalAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(real) => fmt::Debug::fmt(real, f),
            Self::Link(link) => fmt::Debug::fmt(link, f),
            Self::Legacy(legacy) => fmt::Debug::fmt(legacy, f),
        }
    }
}

impl From<RealAsset> for UniversalAsset {
    fn from(real: RealAsset) -> Self {
        Self::Real(real)
    }
}

impl From<LinkAsset> for UniversalAsset {
    fn from(link: LinkAsset) -> Self {
        Self::Link(link)
    }
}

impl From<LegacyBinaryAsset> for UniversalAsset {
    fn from(legacy: LegacyBinaryAsset) -> Self {
        Self::Legacy(legacy)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::testing::{fixture, legacy, p, save_link, save_real};

    #[test]
    fn dispatches_on_classification() {
        let (store, ctx) = fixture();
        let real = save_real(&ctx, "/r", b"r", &[]);
        save_link(&ctx, "/l", &real);
        legacy(&store, "/old", b"o", None);

        assert_eq!(UniversalAsset::open(&ctx, &p("/r")).unwrap().kind(), AssetKind::Real);
        assert_eq!(UniversalAsset::open(&ctx, &p("/l")).unwrap().kind(), AssetKind::Link);
        let old = UniversalAsset::open(&ctx, &p("/old")).unwrap();
        assert_eq!(old.kind(), AssetKind::Legacy);
        assert!(old.as_legacy().is_some());
        assert!(old.as_real().is_none());
    }

    #[test]
    fn unsupported_tag_fails_at_construction() {
        let (store, ctx) = fixture();
        crate::testing::folder(&store, "/plain");
        crate::testing::node(&store, "/meta", "nt:unstructured");
        for path in ["/plain", "/meta", "/"] {
            assert!(matches!(
                UniversalAsset::open(&ctx, &p(path)).unwrap_err(),
                AssetError::IllegalClassification { .. }
            ));
        }
    }

    #[test]
    fn missing_path_or_identity_is_not_found() {
        let (_store, ctx) = fixture();
        assert!(matches!(
            UniversalAsset::open(&ctx, &p("/ghost")).unwrap_err(),
            AssetError::NotFound(_)
        ));
        assert!(matches!(
            UniversalAsset::open_by_id(&ctx, &NodeId::new()).unwrap_err(),
            AssetError::NotFound(_)
        ));
    }

    #[test]
    fn open_by_id_matches_open() {
        let (_store, ctx) = fixture();
        let real = save_real(&ctx, "/r", b"r", &[]);
        let again = UniversalAsset::open_by_id(&ctx, &real.identity()).unwrap();
        assert_eq!(again, real);
        assert_eq!(again.path().unwrap(), p("/r"));
    }

    #[test]
    fn capped_legacy_collapses_with_its_real_in_sets() {
        let (_store, ctx) = fixture();
        let real = save_real(&ctx, "/r", b"r", &[]);
        let cape = UniversalAsset::open(&ctx, &p("/r/file")).unwrap();
        assert_eq!(cape.kind(), AssetKind::Legacy);

        let set: HashSet<UniversalAsset> = [real.clone(), cape].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn kind_display() {
        assert_eq!(AssetKind::Real.to_string(), "real");
        assert_eq!(AssetKind::Link.to_string(), "link");
        assert_eq!(AssetKind::Legacy.to_string(), "legacy");
    }
}

use cms_store::{Node, Session};
use cms_types::{NodeId, NodePath};
use tracing::trace;

use crate::asset::{identity_equality, Asset};
use crate::context::AssetContext;
use crate::error::{AssetError, AssetResult};
use crate::real::RealAsset;
use crate::schema::{CONTENT_CHILD, FILE_CHILD, LEGACY_FILE, LEGACY_RESOURCE, REAL_ASSET};
use crate::view::{AssetContent, AssetMetadata, Locator};

/// Foreign two-level binary shape: an `nt:file` node whose `content` child
/// is an `nt:resource` carrying the binary.
///
/// When the `nt:file` node is the `file` child of a real asset, the wrapper
/// is a "cape" over that real asset and every operation, equality included,
/// answers as the real asset does. Which case applies is settled once, at
/// construction.
#[derive(Clone)]
pub struct LegacyBinaryAsset {
    ctx: AssetContext,
    kind: LegacyKind,
}

#[derive(Clone)]
enum LegacyKind {
    Cape(RealAsset),
    Standalone {
        outer_id: NodeId,
        outer_path: NodePath,
        inner_id: NodeId,
    },
}

impl LegacyBinaryAsset {
    pub fn open(ctx: &AssetContext, path: &NodePath) -> AssetResult<Self> {
        let session = ctx.open()?;
        let node = session
            .node(path)?
            .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
        Self::from_node(ctx, session.as_ref(), &node)
    }

    /// Wrap `outer`, checking both levels of the shape and resolving the
    /// cape.
    pub fn from_node(ctx: &AssetContext, session: &dyn Session, outer: &Node) -> AssetResult<Self> {
        if !outer.is_of_type(LEGACY_FILE) {
            return Err(AssetError::IllegalClassification {
                path: outer.path.clone(),
                found: outer.primary_type.clone(),
            });
        }
        let inner = session.child(outer, CONTENT_CHILD)?;
        let inner = match inner {
            Some(inner) if inner.is_of_type(LEGACY_RESOURCE) => inner,
            Some(inner) => {
                return Err(AssetError::IllegalClassification {
                    path: inner.path,
                    found: inner.primary_type,
                })
            }
            None => {
                return Err(AssetError::IllegalClassification {
                    path: outer.path.join(CONTENT_CHILD)?,
                    found: String::new(),
                })
            }
        };

        let kind = match session.parent(outer)? {
            Some(parent)
                if parent.is_of_type(REAL_ASSET) && outer.path.name() == Some(FILE_CHILD) =>
            {
                trace!(path = %outer.path, real = %parent.path, "legacy node is a cape");
                LegacyKind::Cape(RealAsset::from_node(ctx, &parent)?)
            }
            _ => LegacyKind::Standalone {
                outer_id: outer.id,
                outer_path: outer.path.clone(),
                inner_id: inner.id,
            },
        };
        Ok(Self {
            ctx: ctx.clone(),
            kind,
        })
    }

    /// The real asset this node is the binary of, if any.
    pub fn cape(&self) -> Option<&RealAsset> {
        match &self.kind {
            LegacyKind::Cape(real) => Some(real),
            LegacyKind::Standalone { .. } => None,
        }
    }

    pub fn is_cape(&self) -> bool {
        self.cape().is_some()
    }
}

impl Asset for LegacyBinaryAsset {
    fn identity(&self) -> NodeId {
        match &self.kind {
            LegacyKind::Cape(real) => real.identity(),
            LegacyKind::Standalone { inner_id, .. } => *inner_id,
        }
    }

    fn path(&self) -> AssetResult<NodePath> {
        match &self.kind {
            LegacyKind::Cape(real) => real.path(),
            LegacyKind::Standalone {
                outer_id,
                outer_path,
                ..
            } => {
                let live = self.ctx.open()?.node_by_id(outer_id)?;
                Ok(live.map_or_else(|| outer_path.clone(), |node| node.path))
            }
        }
    }

    fn content(&self) -> AssetResult<AssetContent> {
        match &self.kind {
            LegacyKind::Cape(real) => real.content(),
            LegacyKind::Standalone { inner_id, .. } => {
                Ok(AssetContent::new(self.ctx.clone(), Locator::new(*inner_id, "")))
            }
        }
    }

    fn metadata(&self) -> AssetResult<AssetMetadata> {
        match &self.kind {
            LegacyKind::Cape(real) => real.metadata(),
            LegacyKind::Standalone { inner_id, .. } => {
                Ok(AssetMetadata::new(self.ctx.clone(), Locator::new(*inner_id, "")))
            }
        }
    }
}

identity_equality!(LegacyBinaryAsset);

impl std::fmt::Debug for LegacyBinaryAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            LegacyKind::Cape(real) => f.debug_tuple("LegacyBinaryAsset::Cape").field(real).finish(),
            LegacyKind::Standalone {
                outer_path,
                inner_id,
                ..
            } => f
                .debug_struct("LegacyBinaryAsset")
                .field("path", outer_path)
                .field("inner_id", inner_id)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use super::*;
    use crate::testing::{fixture, legacy, p, save_real};
    use crate::universal::UniversalAsset;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn standalone_reads_inner_child() {
        let (store, ctx) = fixture();
        let (_outer, inner) = legacy(&store, "/old.pdf", b"%PDF-1.4", Some("application/pdf"));

        let asset = LegacyBinaryAsset::open(&ctx, &p("/old.pdf")).unwrap();
        assert!(!asset.is_cape());
        assert_eq!(asset.identity(), inner);
        assert_eq!(asset.path().unwrap(), p("/old.pdf"));
        assert_eq!(asset.content().unwrap().size().unwrap().bytes(), 8);
        assert_eq!(asset.content().unwrap().mime_type().unwrap(), "application/pdf");

        let meta = asset.metadata().unwrap();
        assert_eq!(meta.mime_type().unwrap(), "application/pdf");
        assert_eq!(meta.filename_extension().unwrap(), ".pdf");
        assert_eq!(meta.get("primaryType").unwrap().as_deref(), Some("nt:resource"));
        assert!(meta.get("data").unwrap().is_none());
    }

    #[test]
    fn cape_is_equal_to_its_real_asset() {
        let (_store, ctx) = fixture();
        let real = save_real(&ctx, "/r", b"bytes", &[("mimeType", "image/png")]);

        let cape = LegacyBinaryAsset::open(&ctx, &p("/r/file")).unwrap();
        assert!(cape.is_cape());
        assert_eq!(cape.identity(), real.identity());
        assert_eq!(cape.path().unwrap(), p("/r"));
        assert_eq!(hash_of(&cape), hash_of(&real));

        let wrapped = UniversalAsset::Legacy(cape.clone());
        assert_eq!(wrapped, real);
        assert_eq!(hash_of(&wrapped), hash_of(&real));

        assert_eq!(cape.metadata().unwrap().all().unwrap(), real.metadata().unwrap().all().unwrap());
        assert_eq!(&cape.content().unwrap().bytes().unwrap()[..], b"bytes");
    }

    #[test]
    fn file_child_of_non_real_is_standalone() {
        let (store, ctx) = fixture();
        crate::testing::folder(&store, "/dir");
        let (_outer, inner) = legacy(&store, "/dir/file", b"x", None);
        let asset = LegacyBinaryAsset::open(&ctx, &p("/dir/file")).unwrap();
        assert!(!asset.is_cape());
        assert_eq!(asset.identity(), inner);
        assert_eq!(asset.content().unwrap().mime_type().unwrap(), "*/*");
    }

    #[test]
    fn rejects_wrong_outer_tag() {
        let (store, ctx) = fixture();
        crate::testing::folder(&store, "/dir");
        assert!(matches!(
            LegacyBinaryAsset::open(&ctx, &p("/dir")).unwrap_err(),
            AssetError::IllegalClassification { .. }
        ));
    }

    #[test]
    fn rejects_missing_or_wrong_inner() {
        let (store, ctx) = fixture();
        crate::testing::node(&store, "/bare", "nt:file");
        let err = LegacyBinaryAsset::open(&ctx, &p("/bare")).unwrap_err();
        assert!(matches!(err, AssetError::IllegalClassification { ref path, .. } if *path == p("/bare/content")));

        crate::testing::node(&store, "/odd", "nt:file");
        crate::testing::node(&store, "/odd/content", "nt:folder");
        let err = LegacyBinaryAsset::open(&ctx, &p("/odd")).unwrap_err();
        assert!(matches!(err, AssetError::IllegalClassification { ref found, .. } if found == "nt:folder"));
    }

    #[test]
    fn deleted_inner_reads_as_empty() {
        let (store, ctx) = fixture();
        legacy(&store, "/old", b"abc", Some("text/plain"));
        let asset = LegacyBinaryAsset::open(&ctx, &p("/old")).unwrap();
        crate::testing::remove(&store, "/old/content");
        assert!(asset.content().unwrap().size().unwrap().is_zero());
        assert!(asset.metadata().unwrap().all().unwrap().is_empty());
    }
}

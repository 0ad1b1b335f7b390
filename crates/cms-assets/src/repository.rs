use std::collections::HashSet;

use cms_store::{NodeQuery, Session};
use cms_types::{DataSize, NodeId, NodePath};
use tracing::{debug, warn};

use crate::asset::Asset;
use crate::context::AssetContext;
use crate::error::{AssetError, AssetResult};
use crate::schema::{LEGACY_FILE, LEGACY_RESOURCE, SUPPORTED_TYPES};
use crate::universal::UniversalAsset;

/// Stateless lookup façade over the store's query capability.
#[derive(Clone, Debug)]
pub struct AssetsRepository {
    ctx: AssetContext,
}

impl AssetsRepository {
    pub fn new(ctx: &AssetContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    pub fn context(&self) -> &AssetContext {
        &self.ctx
    }

    /// Find the asset with identity `id`.
    ///
    /// A node of a supported shape with that identity is returned if the
    /// asset it wraps reports `id` as its identity. The outer node of a
    /// standalone legacy asset and a real asset's `file` child do not.
    /// Failing that, the id may name the binary child of a legacy node (the
    /// identity a standalone legacy asset reports), in which case the legacy
    /// node is wrapped and returned if its identity is `id`.
    pub fn find_by_id(&self, id: &NodeId) -> AssetResult<Option<UniversalAsset>> {
        let session = self.ctx.open()?;
        let query = NodeQuery::everywhere()
            .with_identity(*id)
            .of_types(SUPPORTED_TYPES);
        if let Some(node) = session.query(&query)?.into_iter().next() {
            return Ok(self
                .verify(session.as_ref(), &node)?
                .filter(|asset| asset.identity() == *id));
        }

        let Some(resource) = session.node_by_id(id)? else {
            return Ok(None);
        };
        if !resource.is_of_type(LEGACY_RESOURCE) {
            return Ok(None);
        }
        match session.parent(&resource)? {
            Some(outer) if outer.is_of_type(LEGACY_FILE) => Ok(self
                .verify(session.as_ref(), &outer)?
                .filter(|asset| asset.identity() == *id)),
            _ => Ok(None),
        }
    }

    /// Every asset at or below `subtree`, one per identity, in path order of
    /// the first node that produced it.
    pub fn find(&self, subtree: &NodePath) -> AssetResult<Vec<UniversalAsset>> {
        let session = self.ctx.open()?;
        let nodes = session.query(&NodeQuery::under(subtree.clone()).of_types(SUPPORTED_TYPES))?;
        let mut seen = HashSet::new();
        let mut assets = Vec::with_capacity(nodes.len());
        for node in &nodes {
            if let Some(asset) = self.verify(session.as_ref(), node)? {
                if seen.insert(asset.identity()) {
                    assets.push(asset);
                }
            }
        }
        debug!(%subtree, matched = nodes.len(), assets = assets.len(), "subtree listed");
        Ok(assets)
    }

    pub fn all(&self) -> AssetResult<Vec<UniversalAsset>> {
        self.find(&NodePath::root())
    }

    /// Total content size of [`find(subtree)`](Self::find). Links count with
    /// the size of what they resolve to.
    pub fn size_of(&self, subtree: &NodePath) -> AssetResult<DataSize> {
        self.find(subtree)?
            .iter()
            .map(|asset| asset.content()?.size())
            .sum()
    }

    pub fn size(&self) -> AssetResult<DataSize> {
        self.size_of(&NodePath::root())
    }

    /// Wrap a query result, re-checking its shape. Nodes that no longer fit
    /// are skipped.
    fn verify(
        &self,
        session: &dyn Session,
        node: &cms_store::Node,
    ) -> AssetResult<Option<UniversalAsset>> {
        match UniversalAsset::from_node(&self.ctx, session, node) {
            Ok(asset) => Ok(Some(asset)),
            Err(AssetError::IllegalClassification { path, found }) => {
                warn!(%path, %found, "skipping node with unsupported shape");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::testing::{fixture, legacy, p, save_link, save_real};
    use crate::universal::AssetKind;

    fn repo(ctx: &AssetContext) -> AssetsRepository {
        AssetsRepository::new(ctx)
    }

    // --- find_by_id ---

    #[test]
    fn find_by_id_returns_each_shape() {
        let (store, ctx) = fixture();
        let real = save_real(&ctx, "/r", b"r", &[]);
        let link = save_link(&ctx, "/l", &real);
        let (_outer, inner) = legacy(&store, "/old", b"o", None);

        let repo = repo(&ctx);
        assert_eq!(repo.find_by_id(&real.identity()).unwrap(), Some(real));
        assert_eq!(repo.find_by_id(&link.identity()).unwrap(), Some(link));
        let found = repo.find_by_id(&inner).unwrap().expect("legacy by inner identity");
        assert_eq!(found.kind(), AssetKind::Legacy);
        assert_eq!(found.identity(), inner);
    }

    #[test]
    fn find_by_unknown_id_is_none() {
        let (_store, ctx) = fixture();
        save_real(&ctx, "/r", b"r", &[]);
        assert_eq!(repo(&ctx).find_by_id(&NodeId::new()).unwrap(), None);
    }

    #[test]
    fn find_by_id_of_non_asset_node_is_none() {
        let (store, ctx) = fixture();
        let folder = crate::testing::folder(&store, "/dir");
        let real = save_real(&ctx, "/r", b"r", &[]);
        let repo = repo(&ctx);
        assert_eq!(repo.find_by_id(&folder).unwrap(), None);

        let session = cms_store::NodeStore::open(&store).unwrap();
        let resource = session.node(&p("/r/file/content")).unwrap().unwrap();
        let metadata = session.node(&p("/r/metadata")).unwrap().unwrap();
        drop(session);
        assert_eq!(repo.find_by_id(&resource.id).unwrap(), None);
        assert_eq!(repo.find_by_id(&metadata.id).unwrap(), None);
        assert_eq!(repo.find_by_id(&real.identity()).unwrap(), Some(real));
    }

    #[test]
    fn find_by_id_of_container_nodes_is_none() {
        let (store, ctx) = fixture();
        let (outer, inner) = legacy(&store, "/old", b"legacy", None);
        let real = save_real(&ctx, "/r", b"r", &[]);
        let repo = repo(&ctx);

        let session = cms_store::NodeStore::open(&store).unwrap();
        let file = session.node(&p("/r/file")).unwrap().unwrap();
        drop(session);

        assert_eq!(repo.find_by_id(&outer).unwrap(), None);
        assert_eq!(repo.find_by_id(&file.id).unwrap(), None);
        let found = repo.find_by_id(&inner).unwrap().unwrap();
        assert_eq!(found.identity(), inner);
        assert_eq!(found.kind(), AssetKind::Legacy);
        assert_eq!(repo.find_by_id(&real.identity()).unwrap(), Some(real));
        assert_eq!(store.open_sessions(), 0);
    }

    // --- find(subtree) ---

    #[test]
    fn find_lists_supported_shapes_once() {
        let (store, ctx) = fixture();
        let real = save_real(&ctx, "/content/img", b"img", &[]);
        let link = save_link(&ctx, "/content/alias", &real);
        legacy(&store, "/content/old", b"o", None);
        save_real(&ctx, "/elsewhere/x", b"x", &[]);
        crate::testing::node(&store, "/content/broken", "nt:file");

        let found = repo(&ctx).find(&p("/content")).unwrap();
        assert_eq!(found.len(), 3);
        let set: HashSet<_> = found.iter().cloned().collect();
        assert!(set.contains(&real));
        assert!(set.contains(&link));
        assert_eq!(set.len(), found.len());
    }

    #[test]
    fn find_is_inclusive_of_the_subtree_root() {
        let (_store, ctx) = fixture();
        let real = save_real(&ctx, "/only", b"1", &[]);
        assert_eq!(repo(&ctx).find(&p("/only")).unwrap(), vec![real]);
        assert!(repo(&ctx).find(&p("/missing")).unwrap().is_empty());
    }

    #[test]
    fn saved_asset_is_found_exactly_once() {
        let (_store, ctx) = fixture();
        let real = save_real(&ctx, "/a/b/c", b"abc", &[]);
        let found = repo(&ctx).all().unwrap();
        assert_eq!(found.iter().filter(|a| **a == real).count(), 1);
        assert_eq!(found.len(), 1);
    }

    // --- size ---

    #[test]
    fn empty_subtree_is_zero() {
        let (_store, ctx) = fixture();
        assert!(repo(&ctx).size().unwrap().is_zero());
        assert!(repo(&ctx).size_of(&p("/nothing")).unwrap().is_zero());
    }

    #[test]
    fn size_counts_links_and_legacy() {
        let (store, ctx) = fixture();
        let real = save_real(&ctx, "/c/r", &[0u8; 100], &[]);
        save_link(&ctx, "/c/l", &real);
        legacy(&store, "/c/old", &[0u8; 7], None);
        assert_eq!(repo(&ctx).size_of(&p("/c")).unwrap().bytes(), 207);
    }

    #[test]
    fn dangling_link_fails_size() {
        let (store, ctx) = fixture();
        let real = save_real(&ctx, "/c/r", b"abc", &[]);
        save_link(&ctx, "/d/l", &real);
        crate::testing::remove(&store, "/c");
        assert!(matches!(
            repo(&ctx).size().unwrap_err(),
            AssetError::UnresolvedReference { .. }
        ));
        assert_eq!(store.open_sessions(), 0);
    }

    #[test]
    fn size_matches_sum_over_find() {
        let (_store, ctx) = fixture();
        save_real(&ctx, "/s/a", &[1u8; 10], &[]);
        save_real(&ctx, "/s/b/c", &[1u8; 25], &[]);
        let repo = repo(&ctx);
        let summed: DataSize = repo
            .find(&p("/s"))
            .unwrap()
            .iter()
            .map(|a| a.content().unwrap().size().unwrap())
            .sum();
        assert_eq!(repo.size_of(&p("/s")).unwrap(), summed);
        assert_eq!(summed.bytes(), 35);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn adding_an_asset_grows_size_by_its_length(
            existing in proptest::collection::vec(0usize..2048, 0..6),
            added in 1usize..4096,
        ) {
            let (_store, ctx) = fixture();
            for (i, len) in existing.iter().enumerate() {
                save_real(&ctx, &format!("/tree/n{i}"), &vec![7u8; *len], &[]);
            }
            let repo = repo(&ctx);
            let before = repo.size_of(&p("/tree")).unwrap();
            prop_assert_eq!(before.bytes(), existing.iter().sum::<usize>() as u64);

            save_real(&ctx, "/tree/deep/added", &vec![7u8; added], &[]);
            let after = repo.size_of(&p("/tree")).unwrap();
            prop_assert_eq!(after.bytes(), before.bytes() + added as u64);
        }
    }
}

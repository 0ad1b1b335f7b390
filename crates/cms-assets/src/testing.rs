//! Fixtures shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use cms_store::{ChangeSet, InMemoryNodeStore, NewNode, NodeStore, PropertyValue};
use cms_types::{NodeId, NodePath};

use crate::context::AssetContext;
use crate::schema::{
    CONTENT_CHILD, DATA_PROPERTY, FOLDER, LEGACY_FILE, LEGACY_RESOURCE, LINK_ASSET,
    MIME_TYPE_PROPERTY, TARGET_PROPERTY,
};
use crate::staged::{StagedAssetLink, StagedAssetReal};
use crate::universal::UniversalAsset;

pub(crate) fn p(s: &str) -> NodePath {
    NodePath::parse(s).unwrap()
}

/// A fresh store and a context over it. Both share the same tree.
pub(crate) fn fixture() -> (InMemoryNodeStore, AssetContext) {
    let store = InMemoryNodeStore::new();
    let ctx = AssetContext::new(Arc::new(store.clone()));
    (store, ctx)
}

pub(crate) fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub(crate) fn save_real(
    ctx: &AssetContext,
    path: &str,
    content: &[u8],
    metadata: &[(&str, &str)],
) -> UniversalAsset {
    StagedAssetReal::new(ctx, content.to_vec(), meta(metadata))
        .save(&p(path))
        .unwrap()
}

pub(crate) fn save_link(ctx: &AssetContext, path: &str, target: &UniversalAsset) -> UniversalAsset {
    StagedAssetLink::new(ctx, target).save(&p(path)).unwrap()
}

/// Commit a single bare node. Its parent must exist.
pub(crate) fn node(store: &InMemoryNodeStore, path: &str, primary_type: &str) -> NodeId {
    store
        .open()
        .unwrap()
        .commit(ChangeSet::new().with_node(NewNode::new(p(path), primary_type)))
        .unwrap()[0]
}

pub(crate) fn folder(store: &InMemoryNodeStore, path: &str) -> NodeId {
    node(store, path, FOLDER)
}

/// Commit a standalone legacy binary. Returns the outer and inner identities.
pub(crate) fn legacy(
    store: &InMemoryNodeStore,
    path: &str,
    content: &[u8],
    mime_type: Option<&str>,
) -> (NodeId, NodeId) {
    let outer = p(path);
    let mut resource = NewNode::new(outer.join(CONTENT_CHILD).unwrap(), LEGACY_RESOURCE)
        .with_property(DATA_PROPERTY, bytes::Bytes::copy_from_slice(content));
    if let Some(mime_type) = mime_type {
        resource = resource.with_property(MIME_TYPE_PROPERTY, mime_type);
    }
    let ids = store
        .open()
        .unwrap()
        .commit(
            ChangeSet::new()
                .with_node(NewNode::new(outer, LEGACY_FILE))
                .with_node(resource),
        )
        .unwrap();
    (ids[0], ids[1])
}

/// Commit a link node directly, bypassing the staged writer.
pub(crate) fn raw_link(store: &InMemoryNodeStore, path: &str, target: Option<NodeId>) -> NodeId {
    let mut link = NewNode::new(p(path), LINK_ASSET);
    if let Some(target) = target {
        link = link.with_property(TARGET_PROPERTY, target);
    }
    store
        .open()
        .unwrap()
        .commit(ChangeSet::new().with_node(link))
        .unwrap()[0]
}

pub(crate) fn retarget(store: &InMemoryNodeStore, path: &str, target: NodeId) {
    store
        .open()
        .unwrap()
        .set_property(&p(path), TARGET_PROPERTY, PropertyValue::Reference(target))
        .unwrap();
}

pub(crate) fn set_binary(store: &InMemoryNodeStore, path: &str, content: &[u8]) {
    store
        .open()
        .unwrap()
        .set_property(
            &p(path),
            DATA_PROPERTY,
            PropertyValue::Binary(bytes::Bytes::copy_from_slice(content)),
        )
        .unwrap();
}

pub(crate) fn remove(store: &InMemoryNodeStore, path: &str) {
    assert!(store.open().unwrap().remove(&p(path)).unwrap());
}

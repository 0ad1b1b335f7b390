//! Build-then-commit write requests.
//!
//! A staged writer is an immutable value: building one touches no store.
//! [`save`](StagedAssetReal::save) opens a session, checks the target path
//! is free, creates any missing ancestor folders and the asset nodes in one
//! atomic [`ChangeSet`], and reads the result back through the dispatcher.
//!
//! The free-path check and the commit are not one step. A concurrent writer
//! can take the path in between; the store rejects the second commit and
//! that surfaces as [`AssetError::OccupiedPath`] too.

use std::collections::BTreeMap;

use bytes::Bytes;
use cms_store::{ChangeSet, NewNode, Session, StoreError};
use cms_types::{DataSize, NodeId, NodePath};
use tracing::{debug, info};

use crate::asset::Asset;
use crate::context::AssetContext;
use crate::error::{AssetError, AssetResult};
use crate::schema::{
    CONTENT_CHILD, DATA_PROPERTY, FILE_CHILD, FOLDER, LEGACY_FILE, LEGACY_RESOURCE, LINK_ASSET,
    METADATA, METADATA_CHILD, MIME_TYPE_PROPERTY, REAL_ASSET, SIZE_AT_SAVE_PROPERTY,
    TARGET_PROPERTY,
};
use crate::universal::UniversalAsset;

/// A real asset waiting to be written.
#[derive(Clone)]
pub struct StagedAssetReal {
    ctx: AssetContext,
    content: Bytes,
    metadata: BTreeMap<String, String>,
}

impl StagedAssetReal {
    /// Stage `content` with caller metadata. A `mimeType` entry, if present,
    /// is also stored beside the binary.
    pub fn new(
        ctx: &AssetContext,
        content: impl Into<Bytes>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        Self {
            ctx: ctx.clone(),
            content: content.into(),
            metadata,
        }
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Size recorded as `sizeAtSave`.
    pub fn size(&self) -> DataSize {
        DataSize::from_bytes(self.content.len() as u64)
    }

    /// Write the asset at `path`.
    pub fn save(&self, path: &NodePath) -> AssetResult<UniversalAsset> {
        let mut session = self.ctx.open()?;
        let mut changes = prepare(session.as_ref(), path)?;

        let mime_type = self
            .metadata
            .get(MIME_TYPE_PROPERTY)
            .cloned()
            .unwrap_or_else(|| self.ctx.config().default_mime_type.clone());
        let file = path.join(FILE_CHILD)?;

        changes.push(NewNode::new(path.clone(), REAL_ASSET));
        changes.push(NewNode::new(file.clone(), LEGACY_FILE));
        changes.push(
            NewNode::new(file.join(CONTENT_CHILD)?, LEGACY_RESOURCE)
                .with_property(DATA_PROPERTY, self.content.clone())
                .with_property(MIME_TYPE_PROPERTY, mime_type),
        );
        changes.push(
            NewNode::new(path.join(METADATA_CHILD)?, METADATA)
                .with_properties(self.metadata.clone())
                .with_property(SIZE_AT_SAVE_PROPERTY, self.size().to_string()),
        );

        let asset = commit(&self.ctx, session.as_mut(), path, changes)?;
        info!(%path, id = %asset.identity(), size = %self.size(), "real asset saved");
        Ok(asset)
    }
}

impl std::fmt::Debug for StagedAssetReal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedAssetReal")
            .field("size", &self.size())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// A link waiting to be written.
#[derive(Clone, Debug)]
pub struct StagedAssetLink {
    ctx: AssetContext,
    target: UniversalAsset,
}

impl StagedAssetLink {
    pub fn new(ctx: &AssetContext, target: &UniversalAsset) -> Self {
        Self {
            ctx: ctx.clone(),
            target: target.clone(),
        }
    }

    pub fn target(&self) -> &UniversalAsset {
        &self.target
    }

    /// Write a link at `path` whose reference is the target's identity.
    pub fn save(&self, path: &NodePath) -> AssetResult<UniversalAsset> {
        let mut session = self.ctx.open()?;
        let mut changes = prepare(session.as_ref(), path)?;

        let target: NodeId = self.target.identity();
        changes.push(NewNode::new(path.clone(), LINK_ASSET).with_property(TARGET_PROPERTY, target));

        let asset = commit(&self.ctx, session.as_mut(), path, changes)?;
        info!(%path, id = %asset.identity(), %target, "link saved");
        Ok(asset)
    }
}

/// Check `path` is free and plan folders for its missing ancestors.
fn prepare(session: &dyn Session, path: &NodePath) -> AssetResult<ChangeSet> {
    if session.exists(path)? {
        return Err(AssetError::OccupiedPath(path.clone()));
    }
    let mut missing = Vec::new();
    for ancestor in path.ancestors() {
        if session.exists(&ancestor)? {
            break;
        }
        missing.push(ancestor);
    }
    let mut changes = ChangeSet::new();
    for folder in missing.into_iter().rev() {
        debug!(path = %folder, "creating missing folder");
        changes.push(NewNode::new(folder, FOLDER));
    }
    Ok(changes)
}

fn commit(
    ctx: &AssetContext,
    session: &mut dyn Session,
    path: &NodePath,
    changes: ChangeSet,
) -> AssetResult<UniversalAsset> {
    match session.commit(changes) {
        Ok(_) => {}
        Err(StoreError::ItemExists(taken)) if &taken == path => {
            return Err(AssetError::OccupiedPath(taken));
        }
        Err(e) => return Err(e.into()),
    }
    let node = session
        .node(path)?
        .ok_or_else(|| AssetError::NotFound(path.to_string()))?;
    UniversalAsset::from_node(ctx, session, &node)
}

//! Live content and metadata views.
//!
//! Neither view caches anything. Each accessor opens a session, walks from
//! an anchor identity to the node it reads, and reports what is there now.
//! When the anchor or the node below it has been deleted, the views report
//! zero-sized content and empty metadata instead of failing.

use std::collections::BTreeMap;
use std::io::Read;

use bytes::{Buf, Bytes};
use cms_store::{Node, Session};
use cms_types::{DataSize, NodeId};

use crate::context::AssetContext;
use crate::error::AssetResult;
use crate::mime::extension_for_mime_type;
use crate::schema::{DATA_PROPERTY, MIME_TYPE_PROPERTY, PRIMARY_TYPE};

/// Where a view reads from: a node identity plus a relative path below it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Locator {
    anchor: NodeId,
    relative: &'static str,
    requires: Option<&'static str>,
}

impl Locator {
    pub(crate) fn new(anchor: NodeId, relative: &'static str) -> Self {
        Self {
            anchor,
            relative,
            requires: None,
        }
    }

    /// Only resolve while `other`, relative to the anchor, also exists.
    pub(crate) fn requiring(mut self, other: &'static str) -> Self {
        self.requires = Some(other);
        self
    }

    fn resolve(&self, session: &dyn Session) -> AssetResult<Option<Node>> {
        let Some(anchor) = session.node_by_id(&self.anchor)? else {
            return Ok(None);
        };
        if let Some(other) = self.requires {
            if session.node(&anchor.path.join_relative(other)?)?.is_none() {
                return Ok(None);
            }
        }
        if self.relative.is_empty() {
            return Ok(Some(anchor));
        }
        Ok(session.node(&anchor.path.join_relative(self.relative)?)?)
    }
}

/// Binary content of an asset.
#[derive(Clone)]
pub struct AssetContent {
    ctx: AssetContext,
    locator: Locator,
}

impl AssetContent {
    pub(crate) fn new(ctx: AssetContext, locator: Locator) -> Self {
        Self { ctx, locator }
    }

    fn resource(&self) -> AssetResult<Option<Node>> {
        let session = self.ctx.open()?;
        self.locator.resolve(session.as_ref())
    }

    /// The whole payload. Empty if the binary is gone.
    pub fn bytes(&self) -> AssetResult<Bytes> {
        Ok(self
            .resource()?
            .and_then(|node| node.binary_property(DATA_PROPERTY).cloned())
            .unwrap_or_default())
    }

    /// A reader over the payload as it is now.
    pub fn reader(&self) -> AssetResult<impl Read> {
        Ok(self.bytes()?.reader())
    }

    /// Current length of the payload.
    pub fn size(&self) -> AssetResult<DataSize> {
        let len = self
            .resource()?
            .and_then(|node| node.binary_property(DATA_PROPERTY).map(Bytes::len))
            .unwrap_or(0);
        Ok(DataSize::from_bytes(len as u64))
    }

    /// Mime type stored beside the payload, or the configured default.
    pub fn mime_type(&self) -> AssetResult<String> {
        Ok(self
            .resource()?
            .and_then(|node| node.string_property(MIME_TYPE_PROPERTY).map(str::to_string))
            .unwrap_or_else(|| self.ctx.config().default_mime_type.clone()))
    }
}

impl std::fmt::Debug for AssetContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetContent")
            .field("locator", &self.locator)
            .finish()
    }
}

/// String key/value metadata of an asset.
#[derive(Clone)]
pub struct AssetMetadata {
    ctx: AssetContext,
    locator: Locator,
}

impl AssetMetadata {
    pub(crate) fn new(ctx: AssetContext, locator: Locator) -> Self {
        Self { ctx, locator }
    }

    /// Every textual property, plus the node's classification tag under
    /// [`PRIMARY_TYPE`]. Binary properties are left out. Empty if the
    /// metadata node is gone.
    pub fn all(&self) -> AssetResult<BTreeMap<String, String>> {
        let session = self.ctx.open()?;
        let Some(node) = self.locator.resolve(session.as_ref())? else {
            return Ok(BTreeMap::new());
        };
        let mut all: BTreeMap<String, String> = node
            .properties
            .iter()
            .filter_map(|(name, value)| value.to_display_string().map(|v| (name.clone(), v)))
            .collect();
        all.insert(PRIMARY_TYPE.to_string(), node.primary_type);
        Ok(all)
    }

    pub fn get(&self, key: &str) -> AssetResult<Option<String>> {
        Ok(self.all()?.remove(key))
    }

    /// The `mimeType` entry, or the configured wildcard default.
    pub fn mime_type(&self) -> AssetResult<String> {
        Ok(self
            .get(MIME_TYPE_PROPERTY)?
            .unwrap_or_else(|| self.ctx.config().default_mime_type.clone()))
    }

    /// Conventional filename extension for [`mime_type`](Self::mime_type),
    /// empty for unknown or wildcard types.
    pub fn filename_extension(&self) -> AssetResult<&'static str> {
        Ok(extension_for_mime_type(&self.mime_type()?))
    }
}

impl std::fmt::Debug for AssetMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetMetadata")
            .field("locator", &self.locator)
            .finish()
    }
}

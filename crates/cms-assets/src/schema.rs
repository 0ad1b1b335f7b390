//! Persisted node shapes understood by the asset layer.
//!
//! ```text
//! <real>            cms:Asset
//! ├── file          nt:file
//! │   └── content   nt:resource   data (binary), mimeType
//! └── metadata      nt:unstructured   caller keys + primaryType + sizeAtSave
//!
//! <link>            cms:AssetLink     target (reference)
//!
//! <legacy>          nt:file
//! └── content       nt:resource   data (binary), mimeType
//! ```
//!
//! The `file` child of a real asset has the legacy shape, which is what
//! lets a legacy view of it delegate to the enclosing real asset.

pub use cms_store::PRIMARY_TYPE;

pub const REAL_ASSET: &str = "cms:Asset";
pub const LINK_ASSET: &str = "cms:AssetLink";
pub const LEGACY_FILE: &str = "nt:file";
pub const LEGACY_RESOURCE: &str = "nt:resource";
pub const METADATA: &str = "nt:unstructured";
pub const FOLDER: &str = "nt:folder";

pub const FILE_CHILD: &str = "file";
pub const METADATA_CHILD: &str = "metadata";
pub const CONTENT_CHILD: &str = "content";

pub const DATA_PROPERTY: &str = "data";
pub const MIME_TYPE_PROPERTY: &str = "mimeType";
pub const TARGET_PROPERTY: &str = "target";
pub const SIZE_AT_SAVE_PROPERTY: &str = "sizeAtSave";

/// Relative path from a real asset to the node holding its binary.
pub(crate) const REAL_RESOURCE: &str = "file/content";

/// Tags an asset view can be built from directly.
pub const SUPPORTED_TYPES: [&str; 3] = [REAL_ASSET, LINK_ASSET, LEGACY_FILE];

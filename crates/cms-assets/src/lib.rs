//! Asset storage and reference resolution.
//!
//! Three physically different node shapes are presented as one [`Asset`]
//! capability:
//!
//! - [`RealAsset`]: a self-contained binary plus metadata.
//! - [`LinkAsset`]: a reference to another asset, followed to the end of
//!   the chain on every read.
//! - [`LegacyBinaryAsset`]: a foreign two-level binary node. When it is the
//!   binary of a real asset it answers as that real asset.
//!
//! [`UniversalAsset`] picks the right one from a node's classification tag.
//! [`StagedAssetReal`] and [`StagedAssetLink`] write new assets in one
//! atomic commit, and [`AssetsRepository`] looks assets up by identity or
//! subtree and sums their sizes.
//!
//! # Modules
//!
//! - [`asset`] — the [`Asset`] trait
//! - [`view`] — live [`AssetContent`] and [`AssetMetadata`] accessors
//! - [`real`], [`link`], [`legacy`] — the three representations
//! - [`universal`] — the [`UniversalAsset`] dispatcher
//! - [`staged`] — staged writers
//! - [`repository`] — [`AssetsRepository`]
//! - [`schema`] — persisted tags, child names and property names
//! - [`config`] — [`AssetsConfig`]
//! - [`mime`] — mime type ↔ filename extension table
//!
//! # Design Rules
//!
//! 1. Assets are live views. Nothing read from the store is cached.
//! 2. A session is opened per operation and released when it returns.
//! 3. Equality and hashing of every asset type use identity alone.
//! 4. Shape checks happen when a view is built, never on later calls.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use cms_assets::{Asset, AssetContext, AssetsRepository, StagedAssetLink, StagedAssetReal};
//! use cms_store::InMemoryNodeStore;
//! use cms_types::NodePath;
//!
//! let ctx = AssetContext::new(Arc::new(InMemoryNodeStore::new()));
//! let img = StagedAssetReal::new(&ctx, &b"\xff\xd8\xff"[..], BTreeMap::new())
//!     .save(&NodePath::parse("/content/img").unwrap())
//!     .unwrap();
//! let alias = StagedAssetLink::new(&ctx, &img)
//!     .save(&NodePath::parse("/content/img-alias").unwrap())
//!     .unwrap();
//!
//! assert_ne!(alias.identity(), img.identity());
//! assert_eq!(alias.content().unwrap().bytes().unwrap(), img.content().unwrap().bytes().unwrap());
//! assert_eq!(AssetsRepository::new(&ctx).size().unwrap().bytes(), 6);
//! ```

pub mod asset;
pub mod config;
pub mod context;
pub mod error;
pub mod legacy;
pub mod link;
pub mod mime;
pub mod real;
pub mod repository;
pub mod schema;
pub mod staged;
pub mod universal;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use asset::Asset;
pub use config::AssetsConfig;
pub use context::AssetContext;
pub use error::{AssetError, AssetResult};
pub use legacy::LegacyBinaryAsset;
pub use link::LinkAsset;
pub use real::RealAsset;
pub use repository::AssetsRepository;
pub use staged::{StagedAssetLink, StagedAssetReal};
pub use universal::{AssetKind, UniversalAsset};
pub use view::{AssetContent, AssetMetadata};

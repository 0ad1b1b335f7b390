//! Hierarchical, path-addressed node store for the asset layer.
//!
//! The store is a tree of [`Node`]s. Every node has a classification tag
//! (its primary type), typed properties, named children, and a stable
//! store-assigned [`NodeId`](cms_types::NodeId). The asset layer never holds
//! a long-lived connection: it opens a [`Session`] per logical operation
//! through the [`NodeStore`] capability and drops it when done.
//!
//! # Modules
//!
//! - [`node`] — [`Node`] snapshots and [`PropertyValue`]s
//! - [`changes`] — [`ChangeSet`], the unit of atomic multi-node commit
//! - [`query`] — [`NodeQuery`], classification + ancestor scoped lookup
//! - [`traits`] — the [`NodeStore`] and [`Session`] contracts
//! - [`memory`] — [`InMemoryNodeStore`], a `RwLock`-guarded reference backend
//! - [`snapshot`] — JSON persistence for the in-memory backend
//!
//! # Design Rules
//!
//! 1. A path holds at most one node.
//! 2. A commit either creates every node of its change set or none of them.
//! 3. Reads return owned snapshots; nothing handed out aliases store state.
//! 4. All errors are propagated, never silently ignored.

pub mod changes;
pub mod error;
pub mod memory;
pub mod node;
pub mod query;
pub mod snapshot;
pub mod traits;

pub use changes::{ChangeSet, NewNode};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryNodeStore;
pub use node::{Node, PropertyValue};
pub use query::NodeQuery;
pub use traits::{NodeStore, Session};

/// Property holding a node's classification tag.
pub const PRIMARY_TYPE: &str = "primaryType";

/// Classification tag of the store root.
pub const ROOT_TYPE: &str = "rep:root";

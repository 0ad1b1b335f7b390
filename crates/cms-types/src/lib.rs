//! Foundation types for the asset layer.
//!
//! Every other crate in the workspace depends on `cms-types`. The types here
//! carry no store I/O of their own; they are plain values that can be
//! compared, hashed, serialized, and shared across threads.
//!
//! # Key Types
//!
//! - [`NodeId`] — Store-assigned stable identity of a node, independent of its path
//! - [`NodePath`] — Normalized absolute location of a node in the store tree
//! - [`DataSize`] — Additive byte count with unit-aware display and parsing

pub mod error;
pub mod identity;
pub mod path;
pub mod size;

pub use error::TypeError;
pub use identity::NodeId;
pub use path::NodePath;
pub use size::DataSize;

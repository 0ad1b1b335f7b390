use std::sync::Arc;

use cms_types::{NodeId, NodePath};

use crate::changes::ChangeSet;
use crate::error::StoreResult;
use crate::node::{Node, PropertyValue};
use crate::query::NodeQuery;

/// Capability that hands out scoped store access.
///
/// Components of the asset layer hold an `Arc<dyn NodeStore>` and call
/// [`open`](NodeStore::open) once per logical operation. The returned
/// [`Session`] is released when dropped, on success and failure paths alike.
/// Cancellation and timeouts are the backend's concern.
pub trait NodeStore: Send + Sync {
    /// Open a fresh session.
    fn open(&self) -> StoreResult<Box<dyn Session>>;
}

impl<T: NodeStore + ?Sized> NodeStore for Arc<T> {
    fn open(&self) -> StoreResult<Box<dyn Session>> {
        (**self).open()
    }
}

/// Short-lived handle to the store.
///
/// All implementations must satisfy these invariants:
/// - A path holds at most one node.
/// - [`commit`](Session::commit) is atomic: every node of the change set is
///   created, or none is.
/// - Reads reflect the live store, including changes made through other
///   sessions since this one was opened.
pub trait Session: Send {
    /// Read the node at `path`. `Ok(None)` if there is none.
    fn node(&self, path: &NodePath) -> StoreResult<Option<Node>>;

    /// Read the node with the given stable identity. `Ok(None)` if there is none.
    fn node_by_id(&self, id: &NodeId) -> StoreResult<Option<Node>>;

    /// All nodes matching `query`, in path order.
    fn query(&self, query: &NodeQuery) -> StoreResult<Vec<Node>>;

    /// Create every node of `changes` atomically, returning their identities
    /// in change set order.
    fn commit(&mut self, changes: ChangeSet) -> StoreResult<Vec<NodeId>>;

    /// Create or replace a property on an existing node.
    fn set_property(&mut self, path: &NodePath, name: &str, value: PropertyValue) -> StoreResult<()>;

    /// Remove a property. Returns `true` if it existed.
    fn remove_property(&mut self, path: &NodePath, name: &str) -> StoreResult<bool>;

    /// Remove a node and its whole subtree. Returns `true` if it existed.
    fn remove(&mut self, path: &NodePath) -> StoreResult<bool>;

    /// Check whether a node exists at `path`.
    fn exists(&self, path: &NodePath) -> StoreResult<bool> {
        Ok(self.node(path)?.is_some())
    }

    /// Read a named child of `parent`.
    fn child(&self, parent: &Node, name: &str) -> StoreResult<Option<Node>> {
        if !parent.has_child(name) {
            return Ok(None);
        }
        self.node(&parent.path.join(name)?)
    }

    /// Read the parent of `node`. `Ok(None)` for the root.
    fn parent(&self, node: &Node) -> StoreResult<Option<Node>> {
        match node.path.parent() {
            Some(parent) => self.node(&parent),
            None => Ok(None),
        }
    }
}

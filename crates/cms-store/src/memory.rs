//! In-memory node store for tests, embedding, and the CLI.
//!
//! [`InMemoryNodeStore`] keeps the whole tree in a `BTreeMap` keyed by path,
//! plus an identity index, behind one `RwLock`. Sessions share that state;
//! a commit validates its change set and applies it under a single write
//! lock, so concurrent writers to the same path are serialized and exactly
//! one of them wins.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cms_types::{NodeId, NodePath};
use tracing::debug;

use crate::changes::{ChangeSet, NewNode};
use crate::error::{StoreError, StoreResult};
use crate::node::{Node, PropertyValue};
use crate::query::NodeQuery;
use crate::traits::{NodeStore, Session};
use crate::{PRIMARY_TYPE, ROOT_TYPE};

/// The tree itself: nodes by path plus an identity index.
#[derive(Debug, Clone)]
pub(crate) struct NodeTree {
    nodes: BTreeMap<NodePath, Node>,
    ids: HashMap<NodeId, NodePath>,
}

impl NodeTree {
    fn new() -> Self {
        let root = Node {
            id: NodeId::new(),
            path: NodePath::root(),
            primary_type: ROOT_TYPE.to_string(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        };
        let mut tree = Self {
            nodes: BTreeMap::new(),
            ids: HashMap::new(),
        };
        tree.ids.insert(root.id, root.path.clone());
        tree.nodes.insert(root.path.clone(), root);
        tree
    }

    /// Rebuild a tree from a flat node list, checking its shape.
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> StoreResult<Self> {
        let mut tree = Self {
            nodes: BTreeMap::new(),
            ids: HashMap::new(),
        };
        for node in nodes {
            if tree.ids.insert(node.id, node.path.clone()).is_some() {
                return Err(StoreError::InvalidNode(format!("duplicate identity {}", node.id)));
            }
            let path = node.path.clone();
            if tree.nodes.insert(path.clone(), node).is_some() {
                return Err(StoreError::ItemExists(path));
            }
        }
        if !tree.nodes.contains_key(&NodePath::root()) {
            return Err(StoreError::InvalidNode("snapshot has no root node".into()));
        }
        for path in tree.nodes.keys() {
            if let Some(parent) = path.parent() {
                let listed = tree
                    .nodes
                    .get(&parent)
                    .is_some_and(|p| path.name().is_some_and(|name| p.has_child(name)));
                if !listed {
                    return Err(StoreError::ParentNotFound(path.clone()));
                }
            }
        }
        Ok(tree)
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    fn get(&self, path: &NodePath) -> Option<&Node> {
        self.nodes.get(path)
    }

    fn get_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.ids.get(id).and_then(|path| self.nodes.get(path))
    }

    fn validate(&self, changes: &ChangeSet) -> StoreResult<()> {
        let mut planned: HashSet<&NodePath> = HashSet::new();
        for new in changes.nodes() {
            if new.primary_type.is_empty() {
                return Err(StoreError::InvalidNode(format!(
                    "{} has no classification tag",
                    new.path
                )));
            }
            if self.nodes.contains_key(&new.path) || !planned.insert(&new.path) {
                return Err(StoreError::ItemExists(new.path.clone()));
            }
            let parent_known = new
                .path
                .parent()
                .is_some_and(|parent| self.nodes.contains_key(&parent) || planned.contains(&parent));
            if !parent_known {
                return Err(StoreError::ParentNotFound(new.path.clone()));
            }
        }
        Ok(())
    }

    fn insert(&mut self, new: NewNode) -> NodeId {
        let NewNode {
            path,
            primary_type,
            mut properties,
        } = new;
        properties.remove(PRIMARY_TYPE);
        let id = NodeId::new();
        if let (Some(parent), Some(name)) = (path.parent(), path.name()) {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.push(name.to_string());
            }
        }
        self.ids.insert(id, path.clone());
        self.nodes.insert(
            path.clone(),
            Node {
                id,
                path,
                primary_type,
                properties,
                children: Vec::new(),
            },
        );
        id
    }

    fn remove_subtree(&mut self, path: &NodePath) -> StoreResult<bool> {
        if path.is_root() {
            return Err(StoreError::InvalidNode("the root node cannot be removed".into()));
        }
        if !self.nodes.contains_key(path) {
            return Ok(false);
        }
        let doomed: Vec<NodePath> = self
            .nodes
            .keys()
            .filter(|candidate| path.contains(candidate))
            .cloned()
            .collect();
        for victim in &doomed {
            if let Some(node) = self.nodes.remove(victim) {
                self.ids.remove(&node.id);
            }
        }
        if let (Some(parent), Some(name)) = (path.parent(), path.name()) {
            if let Some(parent) = self.nodes.get_mut(&parent) {
                parent.children.retain(|c| c != name);
            }
        }
        Ok(true)
    }
}

/// In-memory, `RwLock`-guarded node store.
///
/// Cloning the store shares the underlying tree. The root node (`/`, tagged
/// [`ROOT_TYPE`]) exists from construction.
#[derive(Clone)]
pub struct InMemoryNodeStore {
    tree: Arc<RwLock<NodeTree>>,
    open_sessions: Arc<AtomicUsize>,
}

impl InMemoryNodeStore {
    /// Create a store holding only the root node.
    pub fn new() -> Self {
        Self::from_tree(NodeTree::new())
    }

    pub(crate) fn from_tree(tree: NodeTree) -> Self {
        Self {
            tree: Arc::new(RwLock::new(tree)),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of sessions currently open against this store.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.tree.read().map(|t| t.nodes.len()).unwrap_or(0)
    }

    /// Returns `true` if only the root node exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    pub(crate) fn read_tree(&self) -> StoreResult<RwLockReadGuard<'_, NodeTree>> {
        self.tree.read().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for InMemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for InMemoryNodeStore {
    fn open(&self) -> StoreResult<Box<dyn Session>> {
        let open = self.open_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(open, "session opened");
        Ok(Box::new(InMemorySession {
            tree: Arc::clone(&self.tree),
            open_sessions: Arc::clone(&self.open_sessions),
        }))
    }
}

impl std::fmt::Debug for InMemoryNodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryNodeStore")
            .field("node_count", &self.len())
            .field("open_sessions", &self.open_sessions())
            .finish()
    }
}

/// Session over an [`InMemoryNodeStore`]. Closed on drop.
struct InMemorySession {
    tree: Arc<RwLock<NodeTree>>,
    open_sessions: Arc<AtomicUsize>,
}

impl InMemorySession {
    fn read(&self) -> StoreResult<RwLockReadGuard<'_, NodeTree>> {
        self.tree.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, NodeTree>> {
        self.tree.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Drop for InMemorySession {
    fn drop(&mut self) {
        let open = self.open_sessions.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(open, "session closed");
    }
}

impl Session for InMemorySession {
    fn node(&self, path: &NodePath) -> StoreResult<Option<Node>> {
        Ok(self.read()?.get(path).cloned())
    }

    fn node_by_id(&self, id: &NodeId) -> StoreResult<Option<Node>> {
        Ok(self.read()?.get_by_id(id).cloned())
    }

    fn query(&self, query: &NodeQuery) -> StoreResult<Vec<Node>> {
        let tree = self.read()?;
        let found = match query.identity {
            Some(id) => tree
                .get_by_id(&id)
                .filter(|n| query.matches(n))
                .cloned()
                .into_iter()
                .collect(),
            None => tree.nodes().filter(|n| query.matches(n)).cloned().collect(),
        };
        Ok(found)
    }

    fn commit(&mut self, changes: ChangeSet) -> StoreResult<Vec<NodeId>> {
        let mut tree = self.write()?;
        tree.validate(&changes)?;
        let count = changes.len();
        let ids: Vec<NodeId> = changes
            .into_nodes()
            .into_iter()
            .map(|new| tree.insert(new))
            .collect();
        debug!(nodes = count, "change set committed");
        Ok(ids)
    }

    fn set_property(&mut self, path: &NodePath, name: &str, value: PropertyValue) -> StoreResult<()> {
        let mut tree = self.write()?;
        let node = tree
            .nodes
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        if name == PRIMARY_TYPE {
            let tag = value.as_str().filter(|t| !t.is_empty()).ok_or_else(|| {
                StoreError::InvalidNode(format!("{path}: classification tag must be a non-empty string"))
            })?;
            node.primary_type = tag.to_string();
        } else {
            node.properties.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn remove_property(&mut self, path: &NodePath, name: &str) -> StoreResult<bool> {
        if name == PRIMARY_TYPE {
            return Err(StoreError::InvalidNode(format!(
                "{path}: classification tag cannot be removed"
            )));
        }
        let mut tree = self.write()?;
        let node = tree
            .nodes
            .get_mut(path)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;
        Ok(node.properties.remove(name).is_some())
    }

    fn remove(&mut self, path: &NodePath) -> StoreResult<bool> {
        let removed = self.write()?.remove_subtree(path)?;
        debug!(%path, removed, "node removed");
        Ok(removed)
    }
}

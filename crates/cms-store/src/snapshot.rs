//! JSON snapshots of an [`InMemoryNodeStore`].
//!
//! A snapshot is the flat list of nodes, root included, in path order. It is
//! written to a temporary sibling file and renamed into place, so a crash
//! mid-write leaves the previous snapshot intact.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::memory::{InMemoryNodeStore, NodeTree};
use crate::node::Node;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    nodes: Vec<Node>,
}

impl InMemoryNodeStore {
    /// Write the current tree to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let snapshot = {
            let tree = self.read_tree()?;
            Snapshot {
                version: SNAPSHOT_VERSION,
                nodes: tree.nodes().cloned().collect(),
            }
        };
        let json = serde_json::to_vec(&snapshot)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        info!(path = %path.display(), nodes = snapshot.nodes.len(), "snapshot saved");
        Ok(())
    }

    /// Load a store from a snapshot written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = fs::read(path)?;
        let snapshot: Snapshot =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Serialization(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let count = snapshot.nodes.len();
        let tree = NodeTree::from_nodes(snapshot.nodes)?;
        info!(path = %path.display(), nodes = count, "snapshot loaded");
        Ok(Self::from_tree(tree))
    }

    /// Load `path` if it exists, otherwise start from an empty store.
    pub fn load_or_new(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_snapshot(path)
        } else {
            Ok(Self::new())
        }
    }
}

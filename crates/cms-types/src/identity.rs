use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Stable identity of a referenceable node.
///
/// A `NodeId` is assigned by the store when a node is created and never
/// changes afterwards, even if the node is moved. References between nodes
/// name their target by `NodeId`, never by path. Identities are UUID v7 so
/// that they sort roughly by creation time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    /// Generate a fresh, time-ordered identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Parse the hyphenated (or simple) UUID form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| TypeError::InvalidIdentity(format!("{s}: {e}")))
    }

    /// Short representation: the last 8 hex characters.
    ///
    /// The leading characters of a v7 UUID are its timestamp, so the tail
    /// is what tells ids minted together apart.
    pub fn short_id(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[simple.len() - 8..].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for NodeId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.short_id())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = NodeId::new();
        let b = NodeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_display_roundtrip() {
        let id = NodeId::new();
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = NodeId::parse("not-a-uuid").unwrap_err();
        assert!(matches!(err, TypeError::InvalidIdentity(_)));
    }

    #[test]
    fn short_id_is_8_chars() {
        assert_eq!(NodeId::new().short_id().len(), 8);
    }

    #[test]
    fn short_id_distinguishes_ids_minted_together() {
        let ids: Vec<NodeId> = (0..64).map(|_| NodeId::new()).collect();
        let shorts: std::collections::HashSet<String> = ids.iter().map(NodeId::short_id).collect();
        assert_eq!(shorts.len(), ids.len());

        let id = NodeId::parse("01890a5d-ac96-774b-bcce-b302099a8057").unwrap();
        assert_eq!(id.short_id(), "099a8057");
        assert_eq!(format!("{id:?}"), "NodeId(099a8057)");
    }

    #[test]
    fn serde_is_plain_string() {
        let id = NodeId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn later_ids_sort_after_earlier_ones() {
        let first = NodeId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = NodeId::new();
        assert!(first < second);
    }
}

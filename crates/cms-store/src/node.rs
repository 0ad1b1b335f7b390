use std::collections::BTreeMap;

use bytes::Bytes;
use cms_types::{NodeId, NodePath};
use serde::{Deserialize, Serialize};

/// A typed property value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Plain string.
    String(String),
    /// Binary payload. `Bytes` keeps clones of large payloads cheap.
    Binary(Bytes),
    /// Stable identity of another node.
    Reference(NodeId),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<NodeId> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// String rendering for textual views. Binaries have none.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Reference(id) => Some(id.to_string()),
            Self::Binary(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Bytes> for PropertyValue {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

impl From<NodeId> for PropertyValue {
    fn from(value: NodeId) -> Self {
        Self::Reference(value)
    }
}

/// Owned snapshot of a node as it was when read.
///
/// Holding a `Node` never pins store state: later reads may observe a
/// different version of the same node, or none at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub path: NodePath,
    /// Classification tag.
    pub primary_type: String,
    pub properties: BTreeMap<String, PropertyValue>,
    /// Child names in creation order.
    pub children: Vec<String>,
}

impl Node {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn string_property(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_str)
    }

    pub fn binary_property(&self, name: &str) -> Option<&Bytes> {
        self.property(name).and_then(PropertyValue::as_binary)
    }

    pub fn reference_property(&self, name: &str) -> Option<NodeId> {
        self.property(name).and_then(PropertyValue::as_reference)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.iter().any(|c| c == name)
    }

    pub fn is_of_type(&self, primary_type: &str) -> bool {
        self.primary_type == primary_type
    }
}

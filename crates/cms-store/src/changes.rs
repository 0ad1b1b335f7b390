//! Staged multi-node creations, committed atomically.

use std::collections::BTreeMap;

use cms_types::NodePath;

use crate::node::PropertyValue;

/// A node to be created by a [`ChangeSet`] commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNode {
    pub path: NodePath,
    pub primary_type: String,
    pub properties: BTreeMap<String, PropertyValue>,
}

impl NewNode {
    pub fn new(path: NodePath, primary_type: impl Into<String>) -> Self {
        Self {
            path,
            primary_type: primary_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        self.properties
            .extend(properties.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Ordered list of node creations.
///
/// A node's parent must either exist in the store already or appear earlier
/// in the same change set. Backends apply a change set all-or-nothing: if
/// any node cannot be created, none are, and no partial state is ever
/// observable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    nodes: Vec<NewNode>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: NewNode) {
        self.nodes.push(node);
    }

    pub fn with_node(mut self, node: NewNode) -> Self {
        self.push(node);
        self
    }

    pub fn nodes(&self) -> &[NewNode] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<NewNode> {
        self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

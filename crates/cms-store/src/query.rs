use cms_types::{NodeId, NodePath};

use crate::node::Node;

/// Classification- and ancestor-scoped node query.
///
/// A node matches when it lies at or below `scope`, carries one of the
/// accepted classification tags (any tag when the list is empty), and, if an
/// identity is given, has that identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeQuery {
    pub scope: NodePath,
    pub identity: Option<NodeId>,
    pub primary_types: Vec<String>,
}

impl NodeQuery {
    /// Every node in the store.
    pub fn everywhere() -> Self {
        Self::under(NodePath::root())
    }

    /// Nodes at or below `scope`.
    pub fn under(scope: NodePath) -> Self {
        Self {
            scope,
            identity: None,
            primary_types: Vec::new(),
        }
    }

    pub fn with_identity(mut self, id: NodeId) -> Self {
        self.identity = Some(id);
        self
    }

    pub fn of_type(mut self, primary_type: impl Into<String>) -> Self {
        self.primary_types.push(primary_type.into());
        self
    }

    pub fn of_types<I, S>(mut self, primary_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_types
            .extend(primary_types.into_iter().map(Into::into));
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.scope.contains(&node.path)
            && self.identity.map_or(true, |id| id == node.id)
            && (self.primary_types.is_empty()
                || self.primary_types.iter().any(|t| node.is_of_type(t)))
    }
}

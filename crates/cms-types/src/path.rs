use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Absolute, normalized location of a node in the store tree.
///
/// Paths are `/`-separated and always start at the root. Normalization
/// collapses repeated separators and drops a trailing slash, so `//a//b/`
/// and `/a/b` are the same path. `.` and `..` segments are rejected rather
/// than interpreted: the store addresses nodes, not a working directory.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath(String);

impl NodePath {
    /// The root path (`/`).
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and normalize an absolute path.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if !s.starts_with('/') {
            return Err(TypeError::InvalidPath {
                path: s.to_string(),
                reason: "path must be absolute".into(),
            });
        }
        let mut normalized = String::with_capacity(s.len());
        for segment in s.split('/').filter(|seg| !seg.is_empty()) {
            validate_segment(s, segment)?;
            normalized.push('/');
            normalized.push_str(segment);
        }
        if normalized.is_empty() {
            normalized.push('/');
        }
        Ok(Self(normalized))
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `/`.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append a single child segment.
    pub fn join(&self, segment: &str) -> Result<NodePath, TypeError> {
        validate_segment(segment, segment)?;
        if self.is_root() {
            Ok(Self(format!("/{segment}")))
        } else {
            Ok(Self(format!("{}/{segment}", self.0)))
        }
    }

    /// Append a relative, `/`-separated path. An empty string yields `self`.
    pub fn join_relative(&self, relative: &str) -> Result<NodePath, TypeError> {
        let mut path = self.clone();
        for segment in relative.split('/').filter(|seg| !seg.is_empty()) {
            path = path.join(segment)?;
        }
        Ok(path)
    }

    /// Iterate over the segments from the root down.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|seg| !seg.is_empty())
    }

    /// Number of segments; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// All strict ancestors, nearest first, ending with the root.
    pub fn ancestors(&self) -> Vec<NodePath> {
        let mut out = Vec::with_capacity(self.depth());
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            out.push(path);
        }
        out
    }

    /// Returns `true` if `other` lies strictly below `self`.
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        if self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other
            .0
            .strip_prefix(self.0.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Returns `true` if `other` is `self` or lies below it.
    pub fn contains(&self, other: &NodePath) -> bool {
        self == other || self.is_ancestor_of(other)
    }
}

fn validate_segment(path: &str, segment: &str) -> Result<(), TypeError> {
    let reason = if segment.is_empty() {
        "empty segment"
    } else if segment == "." || segment == ".." {
        "relative segments are not allowed"
    } else if segment.contains('/') {
        "segment must not contain '/'"
    } else if segment.chars().any(char::is_control) {
        "segment must not contain control characters"
    } else {
        return Ok(());
    };
    Err(TypeError::InvalidPath {
        path: path.to_string(),
        reason: reason.into(),
    })
}

impl FromStr for NodePath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for NodePath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.0
    }
}

impl AsRef<str> for NodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePath({})", self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(s: &str) -> NodePath {
        NodePath::parse(s).unwrap()
    }

    #[test]
    fn root_properties() {
        let root = NodePath::root();
        assert!(root.is_root());
        assert_eq!(root.name(), None);
        assert_eq!(root.parent(), None);
        assert_eq!(root.depth(), 0);
        assert_eq!(root.to_string(), "/");
    }

    #[test]
    fn normalizes_separators() {
        assert_eq!(p("//content///img/"), p("/content/img"));
        assert_eq!(p("///"), NodePath::root());
    }

    #[test]
    fn rejects_relative_paths() {
        assert!(NodePath::parse("content/img").is_err());
        assert!(NodePath::parse("").is_err());
        assert!(NodePath::parse("/content/../etc").is_err());
        assert!(NodePath::parse("/./content").is_err());
    }

    #[test]
    fn parent_and_name() {
        let path = p("/content/img");
        assert_eq!(path.name(), Some("img"));
        assert_eq!(path.parent(), Some(p("/content")));
        assert_eq!(p("/content").parent(), Some(NodePath::root()));
    }

    #[test]
    fn join_builds_children() {
        assert_eq!(NodePath::root().join("content").unwrap(), p("/content"));
        assert_eq!(p("/content").join("img").unwrap(), p("/content/img"));
        assert!(p("/content").join("a/b").is_err());
        assert!(p("/content").join("..").is_err());
    }

    #[test]
    fn join_relative_walks_segments() {
        let base = p("/content/img");
        assert_eq!(base.join_relative("file/content").unwrap(), p("/content/img/file/content"));
        assert_eq!(base.join_relative("").unwrap(), base);
    }

    #[test]
    fn ancestors_nearest_first() {
        let ancestors = p("/a/b/c").ancestors();
        assert_eq!(ancestors, vec![p("/a/b"), p("/a"), NodePath::root()]);
    }

    #[test]
    fn ancestry_respects_segment_boundaries() {
        assert!(p("/content").is_ancestor_of(&p("/content/img")));
        assert!(!p("/content").is_ancestor_of(&p("/contents/img")));
        assert!(!p("/content").is_ancestor_of(&p("/content")));
        assert!(p("/content").contains(&p("/content")));
        assert!(NodePath::root().is_ancestor_of(&p("/a")));
    }

    #[test]
    fn serde_rejects_invalid_paths() {
        let ok: NodePath = serde_json::from_str("\"/a/b\"").unwrap();
        assert_eq!(ok, p("/a/b"));
        assert!(serde_json::from_str::<NodePath>("\"a/b\"").is_err());
    }

    proptest! {
        #[test]
        fn parse_is_idempotent(segments in proptest::collection::vec("[a-z0-9:_-]{1,8}", 0..6)) {
            let raw = format!("/{}", segments.join("//"));
            let once = NodePath::parse(&raw).unwrap();
            let twice = NodePath::parse(once.as_str()).unwrap();
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once.depth(), segments.len());
        }

        #[test]
        fn every_ancestor_contains_the_path(segments in proptest::collection::vec("[a-z]{1,5}", 1..6)) {
            let path = NodePath::parse(&format!("/{}", segments.join("/"))).unwrap();
            for ancestor in path.ancestors() {
                prop_assert!(ancestor.is_ancestor_of(&path));
                prop_assert!(!path.is_ancestor_of(&ancestor));
            }
        }
    }
}

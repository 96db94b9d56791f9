//! Tree node and provenance types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Title used for the root node of every manifest.
pub const ROOT_TITLE: &str = "Home";

/// A node in the document tree.
///
/// A node is a directory exactly when it carries a `children` field, even an
/// empty one. File nodes serialize without the key, which is how consumers of
/// the manifest (and the merge engine) classify entries.
///
/// Unknown JSON fields placed on a node by hand, such as ordering hints or
/// frontend flags, are preserved verbatim in `extra` across load, merge and
/// save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Display title. Derived from content on scan, but operators may edit
    /// it in the persisted manifest; the merge engine preserves such edits.
    pub title: String,

    /// Path relative to the content root, always with forward slashes.
    /// Empty string for the root node.
    pub path: String,

    /// Child nodes in display order. `Some` marks this node as a directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,

    /// Landing page of a directory. Never repeated among `children`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Box<Node>>,

    /// Revision history metadata, when a provider supplied any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,

    /// Opaque operator-added fields, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Node {
    /// Create a file node.
    #[must_use]
    pub fn file(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            children: None,
            index: None,
            provenance: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Create a directory node with no entries yet.
    #[must_use]
    pub fn directory(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            children: Some(Vec::new()),
            ..Self::file(title, path)
        }
    }

    /// Create the root directory node.
    #[must_use]
    pub fn root() -> Self {
        Self::directory(ROOT_TITLE, "")
    }

    /// Whether this node represents a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }

    /// Whether this directory node has neither an index page nor children.
    ///
    /// Always false for file nodes.
    #[must_use]
    pub fn is_empty_dir(&self) -> bool {
        self.index.is_none() && self.children.as_ref().is_some_and(Vec::is_empty)
    }

    /// Number of file nodes in this subtree, index pages included.
    #[must_use]
    pub fn file_count(&self) -> usize {
        let own = usize::from(self.index.is_some()) + usize::from(!self.is_dir());
        let nested: usize = self
            .children
            .iter()
            .flatten()
            .map(Node::file_count)
            .sum();
        own + nested
    }

    /// Number of directory nodes in this subtree, this node included.
    #[must_use]
    pub fn dir_count(&self) -> usize {
        if !self.is_dir() {
            return 0;
        }
        let nested: usize = self.children.iter().flatten().map(Node::dir_count).sum();
        1 + nested
    }

    /// Rewrite every path in the subtree to use forward slashes.
    ///
    /// Scanned paths are slash-joined already; this guards paths coming back
    /// from a manifest that was produced on a host with a different
    /// separator.
    pub fn normalize_separators(&mut self) {
        if self.path.contains('\\') {
            self.path = self.path.replace('\\', "/");
        }
        if let Some(index) = &mut self.index {
            index.normalize_separators();
        }
        for child in self.children.iter_mut().flatten() {
            child.normalize_separators();
        }
    }
}

/// Revision history metadata attached to a file node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// The most recent change to the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<LastModified>,

    /// Authors who ever touched the file, ordered by commit count
    /// descending; ties keep history order (most recent first).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributors: Vec<Contributor>,
}

/// The last commit that touched a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastModified {
    /// Commit time as seconds since the Unix epoch.
    pub timestamp: i64,
    /// Author name as recorded in the commit.
    pub author_name: String,
    /// Author email as recorded in the commit.
    pub author_email: String,
    /// Commit message, trimmed.
    pub message: String,
    /// Hosting-platform account handle, when the resolver found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_handle: Option<String>,
    /// Avatar URL for the resolved handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Aggregated per-author statistics for a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    /// Author name as recorded in their commits.
    pub name: String,
    /// Email from the author's most recent commit to the file.
    pub email: String,
    /// Number of commits by this author that touched the file.
    pub commit_count: usize,
    /// Timestamp of the author's most recent commit to the file.
    pub last_commit_timestamp: i64,
    /// Hosting-platform account handle, when the resolver found one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_handle: Option<String>,
    /// Avatar URL for the resolved handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_node_serializes_without_children_key() {
        let node = Node::file("Guide", "guide.md");
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("children").is_none());
        assert!(json.get("index").is_none());
        assert_eq!(json["title"], "Guide");
        assert_eq!(json["path"], "guide.md");
    }

    #[test]
    fn test_empty_directory_serializes_with_children_key() {
        let node = Node::directory("Section", "section");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_children_presence_classifies_node() {
        let file: Node = serde_json::from_str(r#"{"title": "A", "path": "a.md"}"#).unwrap();
        assert!(!file.is_dir());

        let dir: Node =
            serde_json::from_str(r#"{"title": "B", "path": "b", "children": []}"#).unwrap();
        assert!(dir.is_dir());
        assert!(dir.is_empty_dir());
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let json = r#"{"title": "A", "path": "a.md", "hidden": true, "weight": 3}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.extra["hidden"], serde_json::json!(true));
        assert_eq!(node.extra["weight"], serde_json::json!(3));

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["hidden"], serde_json::json!(true));
        assert_eq!(back["weight"], serde_json::json!(3));
    }

    #[test]
    fn test_normalize_separators_rewrites_subtree() {
        let mut root = Node::root();
        let mut section = Node::directory("Section", "guides\\intro");
        section.index = Some(Box::new(Node::file("Intro", "guides\\intro\\README.md")));
        section.children = Some(vec![Node::file("Setup", "guides\\intro\\setup.md")]);
        root.children = Some(vec![section]);

        root.normalize_separators();

        let section = &root.children.as_ref().unwrap()[0];
        assert_eq!(section.path, "guides/intro");
        assert_eq!(section.index.as_ref().unwrap().path, "guides/intro/README.md");
        assert_eq!(
            section.children.as_ref().unwrap()[0].path,
            "guides/intro/setup.md"
        );
    }

    #[test]
    fn test_counts() {
        let mut root = Node::root();
        root.index = Some(Box::new(Node::file("Home", "README.md")));
        let mut section = Node::directory("Section", "section");
        section.index = Some(Box::new(Node::file("Section", "section/index.md")));
        section.children = Some(vec![Node::file("Page", "section/page.md")]);
        root.children = Some(vec![Node::file("Guide", "guide.md"), section]);

        assert_eq!(root.file_count(), 4);
        assert_eq!(root.dir_count(), 2);
    }
}

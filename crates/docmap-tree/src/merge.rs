//! Reconciliation of a fresh scan against a persisted tree.
//!
//! The persisted tree is authoritative for ordering, titles and operator
//! fields; the scan is authoritative for which files exist and for
//! provenance. Merging the same scan twice yields the same tree.

use std::collections::HashMap;
use std::path::Path;

use crate::node::Node;

/// Merge a freshly scanned tree into a previously persisted one.
///
/// For every directory level:
/// - existing children keep their relative order; each is matched to the
///   scanned child with the same path,
/// - matched entries keep the existing title and extra fields and take the
///   scanned provenance,
/// - unmatched existing entries are kept only while their backing path still
///   exists under `content_root` (a scan may legitimately skip a file the
///   operator still wants listed), otherwise they are dropped,
/// - scanned entries with no existing counterpart are appended at the end,
///   in scan order.
///
/// When one side lists a path as a file and the other as a directory, the
/// result is a directory and the walk continues below it.
#[must_use]
pub fn merge(existing: Node, scanned: Node, content_root: &Path) -> Node {
    merge_directory(existing, scanned, content_root)
}

fn merge_nodes(existing: Node, scanned: Node, content_root: &Path) -> Node {
    if existing.is_dir() || scanned.is_dir() {
        merge_directory(existing, scanned, content_root)
    } else {
        merge_file(existing, scanned)
    }
}

/// Matched file entry: existing title and extra fields win, provenance is
/// refreshed from the scan.
fn merge_file(mut existing: Node, scanned: Node) -> Node {
    if existing.provenance != scanned.provenance {
        existing.provenance = scanned.provenance;
    }
    existing
}

fn merge_directory(mut existing: Node, scanned: Node, content_root: &Path) -> Node {
    let existing_children = existing.children.take().unwrap_or_default();
    let existing_index = existing.index.take();

    existing.index = merge_index(existing_index, scanned.index);

    // Scanned children stay in their slots until consumed by a matching
    // existing entry; leftovers are appended in scan order.
    let mut pending: Vec<Option<Node>> = scanned
        .children
        .unwrap_or_default()
        .into_iter()
        .map(Some)
        .collect();
    let slot_by_path: HashMap<String, usize> = pending
        .iter()
        .enumerate()
        .filter_map(|(slot, child)| child.as_ref().map(|c| (c.path.clone(), slot)))
        .collect();

    let mut merged = Vec::with_capacity(pending.len());
    for child in existing_children {
        let matched = slot_by_path
            .get(&child.path)
            .and_then(|&slot| pending[slot].take());
        match matched {
            Some(scanned_child) => {
                merged.push(merge_nodes(child, scanned_child, content_root));
            }
            None if content_root.join(&child.path).exists() => {
                // Present on disk but absent from the scan (unsupported
                // extension, hidden directory). Keep the entry untouched.
                merged.push(child);
            }
            None => {
                tracing::info!(path = %child.path, "removing stale entry");
            }
        }
    }
    merged.extend(pending.into_iter().flatten());

    existing.children = Some(merged);
    existing
}

/// Reconcile the index page of a directory level.
///
/// A scan with no index leaves the existing index untouched; stale removal
/// applies to children only.
fn merge_index(existing: Option<Box<Node>>, scanned: Option<Box<Node>>) -> Option<Box<Node>> {
    match (existing, scanned) {
        (existing, None) => existing,
        (None, scanned) => scanned,
        (Some(existing), Some(scanned)) if existing.path == scanned.path => {
            Some(Box::new(merge_file(*existing, *scanned)))
        }
        (Some(existing), Some(mut scanned)) => {
            // The index page moved, e.g. README.md replaced by index.md. The
            // scan wins, but a manually set title carries over.
            if !existing.title.is_empty() {
                scanned.title = existing.title;
            }
            Some(scanned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LastModified, Provenance};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    fn dir_with(title: &str, path: &str, children: Vec<Node>) -> Node {
        let mut node = Node::directory(title, path);
        node.children = Some(children);
        node
    }

    fn provenance(timestamp: i64) -> Provenance {
        Provenance {
            last_modified: Some(LastModified {
                timestamp,
                author_name: "Alice".to_owned(),
                author_email: "alice@example.com".to_owned(),
                message: "update".to_owned(),
                resolved_handle: None,
                avatar_url: None,
            }),
            contributors: Vec::new(),
        }
    }

    fn child_paths(node: &Node) -> Vec<&str> {
        node.children
            .as_ref()
            .unwrap()
            .iter()
            .map(|c| c.path.as_str())
            .collect()
    }

    #[test]
    fn test_existing_order_wins_new_entries_appended() {
        let root = PathBuf::from("/nonexistent");
        let existing = dir_with(
            "Home",
            "",
            vec![
                Node::file("B", "b.md"),
                Node::file("A", "a.md"),
                Node::file("C", "c.md"),
            ],
        );
        let scanned = dir_with(
            "Home",
            "",
            vec![
                Node::file("A", "a.md"),
                Node::file("B", "b.md"),
                Node::file("C", "c.md"),
                Node::file("D", "d.md"),
            ],
        );

        let merged = merge(existing, scanned, &root);
        assert_eq!(child_paths(&merged), vec!["b.md", "a.md", "c.md", "d.md"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let root = PathBuf::from("/nonexistent");
        let existing = dir_with(
            "Home",
            "",
            vec![Node::file("Renamed", "b.md"), Node::file("A", "a.md")],
        );
        let scanned = dir_with(
            "Home",
            "",
            vec![
                Node::file("A", "a.md"),
                Node::file("B", "b.md"),
                Node::file("C", "c.md"),
            ],
        );

        let once = merge(existing, scanned.clone(), &root);
        let twice = merge(once.clone(), scanned, &root);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stale_entries_removed_when_file_gone() {
        let root = tempfile::tempdir().unwrap();
        let existing = dir_with(
            "Home",
            "",
            vec![Node::file("Gone", "gone.md"), Node::file("A", "a.md")],
        );
        let scanned = dir_with("Home", "", vec![Node::file("A", "a.md")]);

        let merged = merge(existing, scanned, root.path());
        assert_eq!(child_paths(&merged), vec!["a.md"]);
    }

    #[test]
    fn test_unscanned_entry_retained_while_on_disk() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("notes.txt"), "kept").unwrap();

        let existing = dir_with(
            "Home",
            "",
            vec![Node::file("Notes", "notes.txt"), Node::file("A", "a.md")],
        );
        let scanned = dir_with("Home", "", vec![Node::file("A", "a.md")]);

        let merged = merge(existing, scanned, root.path());
        assert_eq!(child_paths(&merged), vec!["notes.txt", "a.md"]);
    }

    #[test]
    fn test_manual_title_and_extra_fields_preserved() {
        let root = PathBuf::from("/nonexistent");
        let mut custom = Node::file("My Better Title", "a.md");
        custom
            .extra
            .insert("hidden".to_owned(), serde_json::json!(true));
        let existing = dir_with("Home", "", vec![custom]);
        let mut scanned_child = Node::file("Scanned Title", "a.md");
        scanned_child.provenance = Some(provenance(100));
        let scanned = dir_with("Home", "", vec![scanned_child]);

        let merged = merge(existing, scanned, &root);
        let child = &merged.children.as_ref().unwrap()[0];
        assert_eq!(child.title, "My Better Title");
        assert_eq!(child.extra["hidden"], serde_json::json!(true));
        assert_eq!(child.provenance, Some(provenance(100)));
    }

    #[test]
    fn test_index_same_path_refreshes_provenance_keeps_title() {
        let root = PathBuf::from("/nonexistent");
        let mut existing = Node::root();
        existing.index = Some(Box::new(Node::file("Welcome", "README.md")));
        let mut scanned = Node::root();
        let mut scanned_index = Node::file("Readme", "README.md");
        scanned_index.provenance = Some(provenance(7));
        scanned.index = Some(Box::new(scanned_index));

        let merged = merge(existing, scanned, &root);
        let index = merged.index.unwrap();
        assert_eq!(index.title, "Welcome");
        assert_eq!(index.provenance, Some(provenance(7)));
    }

    #[test]
    fn test_index_path_change_transplants_title() {
        let root = PathBuf::from("/nonexistent");
        let mut existing = Node::root();
        existing.index = Some(Box::new(Node::file("Welcome", "README.md")));
        let mut scanned = Node::root();
        let mut scanned_index = Node::file("Index", "index.md");
        scanned_index.provenance = Some(provenance(9));
        scanned.index = Some(Box::new(scanned_index));

        let merged = merge(existing, scanned, &root);
        let index = merged.index.unwrap();
        assert_eq!(index.path, "index.md");
        assert_eq!(index.title, "Welcome");
        assert_eq!(index.provenance, Some(provenance(9)));
    }

    #[test]
    fn test_index_kept_when_scan_has_none() {
        // Even with the backing file gone: only children are subject to
        // stale removal.
        let root = tempfile::tempdir().unwrap();
        let mut existing = Node::root();
        existing.index = Some(Box::new(Node::file("Welcome", "README.md")));
        let scanned = Node::root();

        let merged = merge(existing, scanned, root.path());
        let index = merged.index.unwrap();
        assert_eq!(index.path, "README.md");
        assert_eq!(index.title, "Welcome");
    }

    #[test]
    fn test_type_mismatch_normalizes_to_directory() {
        let root = PathBuf::from("/nonexistent");
        // "guide" used to be a single file, now it is a directory.
        let existing = dir_with("Home", "", vec![Node::file("Guide", "guide")]);
        let scanned = dir_with(
            "Home",
            "",
            vec![dir_with(
                "guide",
                "guide",
                vec![Node::file("Intro", "guide/intro.md")],
            )],
        );

        let merged = merge(existing, scanned, &root);
        let child = &merged.children.as_ref().unwrap()[0];
        assert!(child.is_dir());
        assert_eq!(child.title, "Guide");
        assert_eq!(child_paths(child), vec!["guide/intro.md"]);
    }

    #[test]
    fn test_nested_directories_merge_recursively() {
        let root = PathBuf::from("/nonexistent");
        let existing = dir_with(
            "Home",
            "",
            vec![dir_with(
                "Guides",
                "guides",
                vec![
                    Node::file("Second", "guides/b.md"),
                    Node::file("First", "guides/a.md"),
                ],
            )],
        );
        let scanned = dir_with(
            "Home",
            "",
            vec![dir_with(
                "guides",
                "guides",
                vec![
                    Node::file("A", "guides/a.md"),
                    Node::file("B", "guides/b.md"),
                    Node::file("C", "guides/c.md"),
                ],
            )],
        );

        let merged = merge(existing, scanned, &root);
        let guides = &merged.children.as_ref().unwrap()[0];
        assert_eq!(guides.title, "Guides");
        assert_eq!(
            child_paths(guides),
            vec!["guides/b.md", "guides/a.md", "guides/c.md"]
        );
    }
}

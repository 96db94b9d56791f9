//! Fresh tree construction by filesystem walking.

use std::fs;
use std::path::Path;

use docmap_tree::Node;
use docmap_vcs::ProvenanceProvider;

use crate::extract;

/// Scan behavior knobs.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Candidate index page names, in priority order. The first name present
    /// in a directory becomes its index; every configured name is excluded
    /// from that directory's children.
    pub index_pages: Vec<String>,
    /// Allowed file extensions, each with its leading dot.
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            index_pages: vec![
                "README.md".to_owned(),
                "README.html".to_owned(),
                "index.md".to_owned(),
                "index.html".to_owned(),
            ],
            extensions: vec![".md".to_owned(), ".html".to_owned()],
        }
    }
}

impl ScanOptions {
    /// Whether a file name passes the extension allow-list.
    #[must_use]
    pub fn is_supported(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }

    /// Whether a file name is one of the configured index page names.
    #[must_use]
    pub fn is_index_page(&self, name: &str) -> bool {
        self.index_pages.iter().any(|candidate| candidate == name)
    }
}

/// Builds a document tree by walking a content directory.
///
/// Per directory: hidden entries are skipped, files are filtered through the
/// extension allow-list, the highest-priority index page is split out, and
/// the remaining files then subdirectories are listed in name order.
/// Subdirectories that end up with neither an index nor children are
/// dropped. Unreadable directories degrade to empty subtrees.
pub struct Scanner<'a> {
    root: &'a Path,
    options: &'a ScanOptions,
    provenance: &'a dyn ProvenanceProvider,
}

impl<'a> Scanner<'a> {
    /// Create a scanner over `root`.
    #[must_use]
    pub fn new(
        root: &'a Path,
        options: &'a ScanOptions,
        provenance: &'a dyn ProvenanceProvider,
    ) -> Self {
        Self {
            root,
            options,
            provenance,
        }
    }

    /// Walk the content root and build a fresh tree.
    #[must_use]
    pub fn scan(&self) -> Node {
        self.scan_directory(self.root, "")
    }

    fn scan_directory(&self, dir: &Path, rel: &str) -> Node {
        let mut node = if rel.is_empty() {
            Node::root()
        } else {
            let name = dir
                .file_name()
                .map_or_else(|| rel.to_owned(), |n| n.to_string_lossy().into_owned());
            Node::directory(name, rel)
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(path = %dir.display(), error = %err, "failed to read directory");
                return node;
            }
        };

        let mut files: Vec<String> = Vec::new();
        let mut subdirs: Vec<String> = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                subdirs.push(name);
            } else if self.options.is_supported(&name) {
                files.push(name);
            }
        }
        files.sort();
        subdirs.sort();

        let index_name = self
            .options
            .index_pages
            .iter()
            .find(|candidate| files.iter().any(|f| f == *candidate))
            .cloned();
        if let Some(name) = &index_name {
            node.index = Some(Box::new(self.build_file(dir, rel, name)));
        }

        let mut children = Vec::new();
        for name in &files {
            // Losing index candidates are reserved names, not pages.
            if !self.options.is_index_page(name) {
                children.push(self.build_file(dir, rel, name));
            }
        }
        for name in &subdirs {
            let subtree = self.scan_directory(&dir.join(name), &join_rel(rel, name));
            if subtree.is_empty_dir() {
                tracing::debug!(path = %subtree.path, "pruning empty directory");
            } else {
                children.push(subtree);
            }
        }
        node.children = Some(children);
        node
    }

    fn build_file(&self, dir: &Path, rel: &str, name: &str) -> Node {
        let file_path = dir.join(name);
        let rel_path = join_rel(rel, name);
        let title = extract::title(&file_path).unwrap_or_else(|| title_from_name(name));
        let mut node = Node::file(title, rel_path);
        node.provenance = self.provenance.lookup(&node.path);
        node
    }
}

/// Join relative path segments with forward slashes, on every host.
fn join_rel(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_owned()
    } else {
        format!("{rel}/{name}")
    }
}

/// Fallback title for files without a usable heading: the file stem.
fn title_from_name(name: &str) -> String {
    name.rsplit_once('.')
        .map_or(name, |(stem, _)| stem)
        .to_owned()
}

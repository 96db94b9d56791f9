//! Tree flattening into search documents.

use std::path::Path;

use serde::Serialize;

use docmap_scan::extract;
use docmap_tree::Node;

use crate::text;

/// One searchable page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Display title from the tree.
    pub title: String,
    /// Path relative to the content root.
    pub path: String,
    /// Leading content, ellipsized when longer than the configured cap.
    pub excerpt: String,
    /// Most frequent content words, best first.
    pub keywords: Vec<String>,
}

/// Corpus sizing knobs.
#[derive(Debug, Clone)]
pub struct CorpusOptions {
    /// Characters of content per excerpt.
    pub excerpt_chars: usize,
    /// Keywords kept per document.
    pub max_keywords: usize,
    /// Characters of content read per file.
    pub max_content_chars: usize,
}

impl Default for CorpusOptions {
    fn default() -> Self {
        Self {
            excerpt_chars: 200,
            max_keywords: 10,
            max_content_chars: 1000,
        }
    }
}

/// Flatten the tree into search documents.
///
/// Depth-first, each directory's index page before its children. Nodes
/// whose backing file no longer exists are skipped, so a corpus built from
/// a slightly stale manifest never points at missing pages.
#[must_use]
pub fn build_corpus(tree: &Node, content_root: &Path, options: &CorpusOptions) -> Vec<Document> {
    let mut documents = Vec::new();
    collect(tree, content_root, options, &mut documents);
    documents
}

fn collect(node: &Node, content_root: &Path, options: &CorpusOptions, out: &mut Vec<Document>) {
    if let Some(index) = &node.index {
        push_document(index, content_root, options, out);
    }
    for child in node.children.iter().flatten() {
        if child.is_dir() {
            collect(child, content_root, options, out);
        } else {
            push_document(child, content_root, options, out);
        }
    }
}

fn push_document(node: &Node, content_root: &Path, options: &CorpusOptions, out: &mut Vec<Document>) {
    let file = content_root.join(&node.path);
    if !file.is_file() {
        tracing::debug!(path = %node.path, "skipping entry without a backing file");
        return;
    }

    let content = extract::plain_text(&file, options.max_content_chars);
    out.push(Document {
        title: node.title.clone(),
        path: node.path.clone(),
        excerpt: text::excerpt(&content, options.excerpt_chars),
        keywords: text::keywords(&content, options.max_keywords),
    });
}

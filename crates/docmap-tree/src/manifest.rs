//! Manifest persistence.
//!
//! The manifest is the pretty-printed JSON form of the tree, intended to be
//! committed alongside the content and hand-edited by operators. A missing or
//! malformed file degrades to "no existing tree" so a broken manifest never
//! blocks a rebuild; the merge simply starts from the fresh scan.

use std::fs;
use std::path::Path;

use crate::node::Node;

/// Manifest persistence error.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// I/O error while writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a previously persisted tree.
///
/// Returns `None` when the file does not exist, cannot be read, or does not
/// parse as a tree. Parse failures are logged; they are treated the same as
/// an absent manifest.
#[must_use]
pub fn load_manifest(path: &Path) -> Option<Node> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read manifest");
            return None;
        }
    };

    match serde_json::from_str::<Node>(&content) {
        Ok(mut node) => {
            node.normalize_separators();
            Some(node)
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "malformed manifest, starting from a fresh scan"
            );
            None
        }
    }
}

/// Write the tree as pretty-printed JSON with a trailing newline.
pub fn save_manifest(path: &Path, tree: &Node) -> Result<(), ManifestError> {
    let mut json = serde_json::to_string_pretty(tree)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

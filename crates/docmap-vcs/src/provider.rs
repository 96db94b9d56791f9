//! Provenance provider abstraction.

use docmap_tree::Provenance;

/// Source of revision history metadata for scanned files.
///
/// Implementations must treat their own failures as "no provenance": the
/// scan never aborts because history is unavailable.
pub trait ProvenanceProvider {
    /// Provenance for a file, identified by its slash-separated path
    /// relative to the content root.
    fn lookup(&self, path: &str) -> Option<Provenance>;
}

/// Provider used when history collection is disabled.
pub struct NullProvenance;

impl ProvenanceProvider for NullProvenance {
    fn lookup(&self, _path: &str) -> Option<Provenance> {
        None
    }
}

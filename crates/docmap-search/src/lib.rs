//! Search corpus construction for docmap.
//!
//! Flattens the document tree into one searchable record per page: title,
//! path, a short excerpt and the page's most frequent keywords.

mod corpus;
mod text;

pub use corpus::{CorpusOptions, Document, build_corpus};
pub use text::{excerpt, keywords};

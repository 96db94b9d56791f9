//! Content directory scanning for docmap.
//!
//! [`Scanner`] walks the content root and produces a fresh document tree;
//! [`extract`] pulls display titles and searchable plain text out of
//! markdown and HTML files.

pub mod extract;
mod scanner;

pub use scanner::{ScanOptions, Scanner};

//! Document tree data model for docmap.
//!
//! A manifest is a tree of [`Node`]s describing the navigable structure of a
//! documentation site: directories with ordered children, optional index
//! pages, and per-file revision provenance. This crate owns the model, its
//! JSON persistence ([`manifest`]) and the reconciliation of a fresh scan
//! against a previously persisted tree ([`merge`]).

mod manifest;
mod merge;
mod node;

pub use manifest::{ManifestError, load_manifest, save_manifest};
pub use merge::merge;
pub use node::{Contributor, LastModified, Node, Provenance, ROOT_TITLE};

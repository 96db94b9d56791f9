//! Revision history providers for docmap.
//!
//! [`GitProvenance`] answers "who changed this file, and when" from the git
//! repository containing the content root. [`IdentityResolver`] maps commit
//! author emails to hosting-platform handles and avatars, caching every
//! answer for the duration of a run.

mod git;
mod identity;
mod provider;

pub use git::GitProvenance;
pub use identity::{IdentityResolver, Profile};
pub use provider::{NullProvenance, ProvenanceProvider};

//! Git-backed provenance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use git2::{Commit, Repository, Sort, Tree};

use docmap_tree::{Contributor, LastModified, Provenance};

use crate::identity::{self, IdentityResolver};
use crate::provider::ProvenanceProvider;

/// Provenance provider backed by the git repository containing the content
/// root.
///
/// History is read along the first-parent chain from `HEAD`. A commit counts
/// as touching a file when the blob id at the file's path differs from the
/// first parent's, so merge commits that only carry changes over do not
/// inflate contributor counts.
pub struct GitProvenance {
    repo: Repository,
    /// Content root relative to the repository workdir.
    prefix: PathBuf,
    resolver: Option<IdentityResolver>,
    collect_last_modified: bool,
    collect_contributors: bool,
}

impl GitProvenance {
    /// Open the repository containing `content_root`.
    ///
    /// # Errors
    ///
    /// Returns the underlying git error when no repository is found.
    pub fn discover(content_root: &Path) -> Result<Self, git2::Error> {
        let repo = Repository::discover(content_root)?;
        let prefix = repo
            .workdir()
            .and_then(|workdir| {
                let root = content_root.canonicalize().ok()?;
                let workdir = workdir.canonicalize().ok()?;
                root.strip_prefix(&workdir).ok().map(Path::to_path_buf)
            })
            .unwrap_or_default();
        Ok(Self {
            repo,
            prefix,
            resolver: None,
            collect_last_modified: true,
            collect_contributors: true,
        })
    }

    /// Attach an identity resolver for handles and avatars.
    #[must_use]
    pub fn with_resolver(mut self, resolver: IdentityResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Toggle collection of last-modified metadata.
    #[must_use]
    pub fn with_last_modified(mut self, enabled: bool) -> Self {
        self.collect_last_modified = enabled;
        self
    }

    /// Toggle collection of per-author contributor statistics.
    #[must_use]
    pub fn with_contributors(mut self, enabled: bool) -> Self {
        self.collect_contributors = enabled;
        self
    }

    /// Seed the identity resolver from recent history.
    ///
    /// Authors frequently commit under both a real email and a noreply
    /// address. One pass over the newest `max_commits` commits learns the
    /// handle from the noreply form and transfers it to the author's other
    /// emails, avoiding per-file API lookups later.
    pub fn preload_identities(&self, max_commits: usize) {
        let Some(resolver) = &self.resolver else {
            return;
        };
        let mut authors: Vec<(String, String)> = Vec::new();
        let mut walk = match self.repo.revwalk() {
            Ok(walk) => walk,
            Err(err) => {
                tracing::warn!(error = %err, "identity preload skipped");
                return;
            }
        };
        if walk.push_head().is_err() {
            return;
        }
        for oid in walk.take(max_commits) {
            let Ok(oid) = oid else { continue };
            let Ok(commit) = self.repo.find_commit(oid) else {
                continue;
            };
            let author = commit.author();
            if let (Some(name), Some(email)) = (author.name(), author.email()) {
                authors.push((name.to_owned(), email.to_owned()));
            }
        }

        let mut handle_by_name: HashMap<String, String> = HashMap::new();
        for (name, email) in &authors {
            if let Some(handle) = identity::handle_from_noreply(email) {
                handle_by_name.entry(name.clone()).or_insert(handle);
            }
        }
        for (name, email) in &authors {
            if let Some(handle) = handle_by_name.get(name) {
                resolver.seed(email, Some(handle.clone()));
            }
        }
    }

    fn resolve_identity(&self, email: &str) -> (Option<String>, Option<String>) {
        match &self.resolver {
            Some(resolver) => resolver.resolve(email),
            None => (None, None),
        }
    }

    fn file_history(&self, rel_path: &str) -> Result<Provenance, git2::Error> {
        let path = self.prefix.join(rel_path);

        let mut walk = self.repo.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(Sort::TIME)?;
        walk.simplify_first_parent()?;

        let mut last_modified: Option<LastModified> = None;
        let mut contributors: Vec<Contributor> = Vec::new();

        for oid in walk {
            let commit = self.repo.find_commit(oid?)?;
            if !touches_path(&commit, &path)? {
                continue;
            }

            let author = commit.author();
            let name = author.name().unwrap_or("").to_owned();
            let email = author.email().unwrap_or("").to_owned();
            let timestamp = commit.time().seconds();

            if self.collect_last_modified && last_modified.is_none() {
                let (resolved_handle, avatar_url) = self.resolve_identity(&email);
                last_modified = Some(LastModified {
                    timestamp,
                    author_name: name.clone(),
                    author_email: email.clone(),
                    message: commit.message().unwrap_or("").trim().to_owned(),
                    resolved_handle,
                    avatar_url,
                });
                if !self.collect_contributors {
                    break;
                }
            }

            if self.collect_contributors {
                if let Some(entry) = contributors.iter_mut().find(|c| c.name == name) {
                    entry.commit_count += 1;
                    if timestamp > entry.last_commit_timestamp {
                        entry.last_commit_timestamp = timestamp;
                    }
                } else {
                    let (resolved_handle, avatar_url) = self.resolve_identity(&email);
                    contributors.push(Contributor {
                        name,
                        email,
                        commit_count: 1,
                        last_commit_timestamp: timestamp,
                        resolved_handle,
                        avatar_url,
                    });
                }
            }
        }

        // Stable sort keeps history order (most recent first) for equal
        // counts.
        contributors.sort_by(|a, b| b.commit_count.cmp(&a.commit_count));

        Ok(Provenance {
            last_modified,
            contributors,
        })
    }
}

/// Blob id at `path` in the commit's tree, `None` when absent.
fn tree_entry_id(tree: &Tree<'_>, path: &Path) -> Option<git2::Oid> {
    tree.get_path(path).ok().map(|entry| entry.id())
}

/// Whether `commit` changed the file at `path` relative to its first parent.
fn touches_path(commit: &Commit<'_>, path: &Path) -> Result<bool, git2::Error> {
    let current = tree_entry_id(&commit.tree()?, path);
    if commit.parent_count() == 0 {
        return Ok(current.is_some());
    }
    let parent = commit.parent(0)?;
    Ok(current != tree_entry_id(&parent.tree()?, path))
}

impl ProvenanceProvider for GitProvenance {
    fn lookup(&self, path: &str) -> Option<Provenance> {
        match self.file_history(path) {
            Ok(provenance) => {
                if provenance.last_modified.is_none() && provenance.contributors.is_empty() {
                    None
                } else {
                    Some(provenance)
                }
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "history lookup failed");
                None
            }
        }
    }
}

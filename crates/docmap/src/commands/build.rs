//! `docmap build` command.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;

use docmap_config::{CliSettings, Config};
use docmap_scan::{ScanOptions, Scanner};
use docmap_search::{CorpusOptions, build_corpus};
use docmap_tree::{load_manifest, merge, save_manifest};
use docmap_vcs::{GitProvenance, IdentityResolver, NullProvenance, ProvenanceProvider};

use crate::error::CliError;
use crate::html;
use crate::output::Output;

/// Commits examined when pre-seeding author identities.
const IDENTITY_PRELOAD_COMMITS: usize = 500;

/// Build the document tree manifest and search corpus.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Manifest output path (overrides config)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Search corpus output path (overrides config)
    #[arg(long)]
    search_index: Option<PathBuf>,

    /// Reconcile with the existing manifest instead of replacing it
    #[arg(long)]
    merge: bool,

    /// Replace an existing manifest without merging
    #[arg(long)]
    force: bool,

    /// Skip revision history collection
    #[arg(long)]
    no_history: bool,

    /// Skip author identity resolution
    #[arg(long)]
    no_identity: bool,

    /// Skip the search corpus
    #[arg(long)]
    no_search: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    /// Map CLI flags onto config overrides.
    fn settings(&self) -> CliSettings {
        CliSettings {
            root_dir: self.root.clone(),
            manifest: self.output.clone(),
            search_index: self.search_index.clone(),
            history_enabled: self.no_history.then_some(false),
            identity_enabled: self.no_identity.then_some(false),
        }
    }

    pub(crate) fn execute(&self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.settings()))?;
        let content_root = config.require_content_root()?.to_path_buf();

        let manifest_path = config.output_resolved.manifest.clone();
        if manifest_path.exists() && !self.merge && !self.force {
            output.warning(&format!(
                "Manifest {} already exists.",
                manifest_path.display()
            ));
            output.warning("Replacing it discards manual ordering, titles and custom fields.");
            return Err(CliError::Validation(
                "pass --merge to reconcile with the existing manifest, or --force to replace it"
                    .to_owned(),
            ));
        }

        output.step(&format!("Scanning {}", content_root.display()));

        let provider = self.provenance_provider(&config, &content_root, output);
        let options = ScanOptions {
            index_pages: config.content_resolved.index_pages.clone(),
            extensions: config.content_resolved.extensions.clone(),
        };
        let scanned = Scanner::new(&content_root, &options, provider.as_ref()).scan();

        let tree = if self.merge {
            match load_manifest(&manifest_path) {
                Some(existing) => {
                    output.note("Merging with existing manifest");
                    merge(existing, scanned, &content_root)
                }
                None => scanned,
            }
        } else {
            scanned
        };

        save_manifest(&manifest_path, &tree)?;
        output.done(&format!(
            "Wrote {} ({} pages, {} directories)",
            manifest_path.display(),
            tree.file_count(),
            tree.dir_count(),
        ));

        if !self.no_search {
            let corpus = build_corpus(&tree, &content_root, &CorpusOptions::default());
            let mut json = serde_json::to_string_pretty(&corpus)?;
            json.push('\n');
            fs::write(&config.output_resolved.search_index, json)?;
            output.done(&format!(
                "Wrote {} ({} documents)",
                config.output_resolved.search_index.display(),
                corpus.len(),
            ));
        }

        if config.site.has_metadata() {
            let project_dir = config
                .config_path
                .as_deref()
                .and_then(Path::parent)
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let patched = html::patch_site_metadata(&project_dir, &config.site);
            if patched > 0 {
                output.note(&format!("Updated site metadata in {patched} HTML files"));
            }
        }

        Ok(())
    }

    /// Choose the provenance provider for this run.
    ///
    /// History collection degrades to none when no repository is found; the
    /// build itself always proceeds.
    fn provenance_provider(
        &self,
        config: &Config,
        content_root: &Path,
        output: &Output,
    ) -> Box<dyn ProvenanceProvider> {
        if !config.history.enabled {
            return Box::new(NullProvenance);
        }
        match GitProvenance::discover(content_root) {
            Ok(provider) => {
                let provider = provider
                    .with_last_modified(config.history.last_modified)
                    .with_contributors(config.history.contributors);
                if config.identity.enabled {
                    let provider = provider
                        .with_resolver(IdentityResolver::new(&config.identity.client_id));
                    provider.preload_identities(IDENTITY_PRELOAD_COMMITS);
                    Box::new(provider)
                } else {
                    Box::new(provider)
                }
            }
            Err(err) => {
                output.warning(&format!("No git history available: {err}"));
                Box::new(NullProvenance)
            }
        }
    }
}

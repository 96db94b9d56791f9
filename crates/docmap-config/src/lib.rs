//! Configuration management for docmap.
//!
//! Parses `docmap.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docmap.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the content root directory.
    pub root_dir: Option<PathBuf>,
    /// Override the manifest output path.
    pub manifest: Option<PathBuf>,
    /// Override the search corpus output path.
    pub search_index: Option<PathBuf>,
    /// Override revision history collection.
    pub history_enabled: Option<bool>,
    /// Override author identity resolution.
    pub identity_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content scanning configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Revision history configuration.
    pub history: HistoryConfig,
    /// Author identity resolution configuration.
    pub identity: IdentityConfig,
    /// Site metadata patched into HTML shells.
    pub site: SiteConfig,
    /// Output file configuration.
    output: OutputConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw content configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root_dir: Option<String>,
    index_pages: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory holding the documentation content.
    pub root_dir: PathBuf,
    /// Candidate index page names, in priority order.
    pub index_pages: Vec<String>,
    /// Allowed file extensions, each with its leading dot.
    pub extensions: Vec<String>,
}

fn default_index_pages() -> Vec<String> {
    vec![
        "README.md".to_owned(),
        "README.html".to_owned(),
        "index.md".to_owned(),
        "index.html".to_owned(),
    ]
}

fn default_extensions() -> Vec<String> {
    vec![".md".to_owned(), ".html".to_owned()]
}

/// Revision history configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Whether to collect revision history at all.
    pub enabled: bool,
    /// Whether to record the last commit per file.
    pub last_modified: bool,
    /// Whether to record per-author contributor statistics.
    pub contributors: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            last_modified: true,
            contributors: true,
        }
    }
}

/// Author identity resolution configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Whether to resolve commit emails to account handles and avatars.
    pub enabled: bool,
    /// Identifier sent as the HTTP `User-Agent` on profile lookups.
    pub client_id: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            client_id: "docmap".to_owned(),
        }
    }
}

/// Site metadata configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title patched into `<title>` elements.
    pub title: Option<String>,
    /// Site description patched into the description meta tag.
    pub description: Option<String>,
    /// Keyword list patched into the keywords meta tag.
    pub keywords: Option<String>,
    /// Favicon URL patched into icon links.
    pub favicon: Option<String>,
    /// Glob patterns, relative to the project, selecting HTML files to patch.
    pub html_globs: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            keywords: None,
            favicon: None,
            html_globs: vec!["*.html".to_owned(), "main/*.html".to_owned()],
        }
    }
}

impl SiteConfig {
    /// Whether any field is set that HTML patching would apply.
    #[must_use]
    pub fn has_metadata(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.keywords.is_some()
            || self.favicon.is_some()
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    manifest: Option<String>,
    search_index: Option<String>,
}

/// Resolved output configuration with absolute paths.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Manifest output path.
    pub manifest: PathBuf,
    /// Search corpus output path.
    pub search_index: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `docmap.toml` in the current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist, parsing
    /// fails, or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root_dir) = &settings.root_dir {
            self.content_resolved.root_dir.clone_from(root_dir);
        }
        if let Some(manifest) = &settings.manifest {
            self.output_resolved.manifest.clone_from(manifest);
        }
        if let Some(search_index) = &settings.search_index {
            self.output_resolved.search_index.clone_from(search_index);
        }
        if let Some(history_enabled) = settings.history_enabled {
            self.history.enabled = history_enabled;
        }
        if let Some(identity_enabled) = settings.identity_enabled {
            self.identity.enabled = identity_enabled;
        }
    }

    /// Get the content root after checking it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when the directory is missing.
    pub fn require_content_root(&self) -> Result<&Path, ConfigError> {
        let root = self.content_resolved.root_dir.as_path();
        if !root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "content root directory not found: {}",
                root.display()
            )));
        }
        Ok(root)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            history: HistoryConfig::default(),
            identity: IdentityConfig::default(),
            site: SiteConfig::default(),
            output: OutputConfigRaw::default(),
            content_resolved: ContentConfig {
                root_dir: base.join("docs"),
                index_pages: default_index_pages(),
                extensions: default_extensions(),
            },
            output_resolved: OutputConfig {
                manifest: base.join("path.json"),
                search_index: base.join("search.json"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            root_dir: config_dir.join(self.content.root_dir.as_deref().unwrap_or("docs")),
            index_pages: self
                .content
                .index_pages
                .clone()
                .unwrap_or_else(default_index_pages),
            extensions: self
                .content
                .extensions
                .clone()
                .unwrap_or_else(default_extensions),
        };
        self.output_resolved = OutputConfig {
            manifest: config_dir.join(self.output.manifest.as_deref().unwrap_or("path.json")),
            search_index: config_dir.join(
                self.output
                    .search_index
                    .as_deref()
                    .unwrap_or("search.json"),
            ),
        };
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_resolved.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "content.extensions cannot be empty".to_owned(),
            ));
        }
        for ext in &self.content_resolved.extensions {
            if !ext.starts_with('.') || ext.len() < 2 {
                return Err(ConfigError::Validation(format!(
                    "content.extensions entries must start with a dot: {ext:?}"
                )));
            }
        }
        if self.content_resolved.index_pages.is_empty() {
            return Err(ConfigError::Validation(
                "content.index_pages cannot be empty".to_owned(),
            ));
        }
        if self.identity.enabled && self.identity.client_id.is_empty() {
            return Err(ConfigError::Validation(
                "identity.client_id cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

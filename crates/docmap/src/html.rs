//! Site metadata patching for HTML shell files.
//!
//! The static site ships hand-written HTML shells (landing page, viewer).
//! After a build, the `[site]` config fields are stamped into their
//! `<title>`, description/keywords meta tags and favicon links, so the
//! shells never drift from the configuration.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use docmap_config::SiteConfig;

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<title[^>]*>).*?(</title>)").expect("valid regex"));
static DESCRIPTION_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(<meta[^>]+name=["']description["'][^>]*content=["'])[^"']*(["'])"#)
        .expect("valid regex")
});
static KEYWORDS_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(<meta[^>]+name=["']keywords["'][^>]*content=["'])[^"']*(["'])"#)
        .expect("valid regex")
});
static ICON_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(<link[^>]+rel=["'](?:shortcut )?icon["'][^>]*href=["'])[^"']*(["'])"#)
        .expect("valid regex")
});

/// Patch configured site metadata into every HTML file matched by the
/// config's glob patterns. Returns the number of files that changed.
///
/// Per-file failures are logged and skipped.
pub(crate) fn patch_site_metadata(project_dir: &Path, site: &SiteConfig) -> usize {
    if !site.has_metadata() {
        return 0;
    }

    let mut patched = 0;
    for pattern in &site.html_globs {
        let Some(full_pattern) = project_dir.join(pattern).to_str().map(str::to_owned) else {
            continue;
        };
        let paths = match glob::glob(&full_pattern) {
            Ok(paths) => paths,
            Err(err) => {
                tracing::warn!(pattern = %pattern, error = %err, "invalid glob pattern");
                continue;
            }
        };
        for entry in paths {
            let Ok(path) = entry else { continue };
            match patch_file(&path, site) {
                Ok(true) => {
                    tracing::info!(path = %path.display(), "updated site metadata");
                    patched += 1;
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to patch file");
                }
            }
        }
    }
    patched
}

/// Apply the configured fields to one file. Returns whether it changed.
fn patch_file(path: &Path, site: &SiteConfig) -> io::Result<bool> {
    let original = fs::read_to_string(path)?;
    let mut updated = original.clone();

    if let Some(title) = &site.title {
        updated = replace_between(&TITLE_TAG, &updated, title);
    }
    if let Some(description) = &site.description {
        updated = replace_between(&DESCRIPTION_META, &updated, description);
    }
    if let Some(keywords) = &site.keywords {
        updated = replace_between(&KEYWORDS_META, &updated, keywords);
    }
    if let Some(favicon) = &site.favicon {
        updated = replace_between(&ICON_LINK, &updated, favicon);
    }

    if updated == original {
        return Ok(false);
    }
    fs::write(path, updated)?;
    Ok(true)
}

/// Replace the text between the two capture groups with `value`, literally.
fn replace_between(pattern: &Regex, content: &str, value: &str) -> String {
    pattern
        .replace(content, |caps: &Captures<'_>| {
            format!("{}{}{}", &caps[1], value, &caps[2])
        })
        .into_owned()
}

//! Title and plain-text extraction from markdown and HTML files.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static MD_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,2}\s+(.+)$").expect("valid regex"));
static HTML_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static HTML_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid regex"));

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`]*`").expect("valid regex"));
static MD_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid regex"));
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s*").expect("valid regex"));
static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script.*?</script>").expect("valid regex"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style.*?</style>").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

fn is_html(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Extract a display title from a content file.
///
/// Markdown: the first `#` or `##` heading. HTML: the `<title>` element,
/// falling back to the first `<h1>`. Returns `None` for unreadable files and
/// files without a usable heading; callers fall back to the file name.
#[must_use]
pub fn title(path: &Path) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read file for title");
            return None;
        }
    };

    let raw = if is_html(path) {
        HTML_TITLE
            .captures(&content)
            .or_else(|| HTML_H1.captures(&content))
            .map(|c| c[1].to_owned())?
    } else {
        MD_TITLE.captures(&content).map(|c| c[1].to_owned())?
    };

    let cleaned = HTML_TAG.replace_all(&raw, "");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_owned())
    }
}

/// Extract searchable plain text from a content file, capped at `max_chars`
/// characters.
///
/// Markdown loses code blocks, link targets, images and heading markers;
/// HTML loses `<script>`/`<style>` bodies and all markup. Whitespace is
/// collapsed. Unreadable files yield an empty string.
#[must_use]
pub fn plain_text(path: &Path, max_chars: usize) -> String {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read file for text");
            return String::new();
        }
    };

    let text = if is_html(path) {
        html_text(&content)
    } else {
        markdown_text(&content)
    };
    truncate_chars(&text, max_chars)
}

fn markdown_text(content: &str) -> String {
    let text = CODE_FENCE.replace_all(content, " ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = MD_IMAGE.replace_all(&text, " ");
    let text = MD_LINK.replace_all(&text, "$1");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = HEADING_MARKER.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_owned()
}

fn html_text(content: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(content, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_owned()
}

/// Decode the handful of entities common in hand-written docs.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_owned()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_markdown_title_from_h1() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.md", "intro text\n\n# Getting Started\n\nbody");
        assert_eq!(title(&path), Some("Getting Started".to_owned()));
    }

    #[test]
    fn test_markdown_title_accepts_h2() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.md", "## Section Title\nbody");
        assert_eq!(title(&path), Some("Section Title".to_owned()));
    }

    #[test]
    fn test_markdown_title_ignores_deeper_headings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.md", "### Too Deep\nbody");
        assert_eq!(title(&path), None);
    }

    #[test]
    fn test_html_title_prefers_title_element() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "a.html",
            "<html><head><title>Page Title</title></head><body><h1>Heading</h1></body></html>",
        );
        assert_eq!(title(&path), Some("Page Title".to_owned()));
    }

    #[test]
    fn test_html_title_falls_back_to_h1() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "a.html",
            "<body><h1 class=\"big\">The <em>Real</em> Heading</h1></body>",
        );
        assert_eq!(title(&path), Some("The Real Heading".to_owned()));
    }

    #[test]
    fn test_title_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(title(&dir.path().join("missing.md")), None);
    }

    #[test]
    fn test_markdown_text_strips_markup() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "a.md",
            "# Title\n\nSee the [user guide](https://example.com/guide) and `config.toml`.\n\n```rust\nfn hidden() {}\n```\n\n![logo](logo.png)\n\nDone.",
        );
        let text = plain_text(&path, 1000);
        assert_eq!(text, "Title See the user guide and . Done.");
        assert!(!text.contains("example.com"));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_html_text_drops_script_and_style() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "a.html",
            "<style>body { color: red }</style><p>Hello &amp; welcome</p><script>alert(1)</script>",
        );
        assert_eq!(plain_text(&path, 1000), "Hello & welcome");
    }

    #[test]
    fn test_plain_text_truncates_at_char_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "a.md", "héllo wörld");
        assert_eq!(plain_text(&path, 4), "héll");
    }

    #[test]
    fn test_plain_text_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(plain_text(&dir.path().join("missing.md"), 100), "");
    }
}

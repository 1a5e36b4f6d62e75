//! Content scanning.
//!
//! Walks the project for files matching the theme's content globs and
//! extracts every string that could be a utility class. Candidates are
//! over-approximated; the stylesheet generator discards anything that does
//! not resolve to a token.

use std::{
    collections::BTreeSet,
    fs,
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Content scanning errors.
#[derive(Debug, Error)]
pub enum ScanError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Malformed content glob.
    #[error("invalid content glob '{pattern}': {message}")]
    Glob { pattern: String, message: String },
}

/// Result type for scanner operations.
pub type Result<T> = std::result::Result<T, ScanError>;

static CANDIDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_][A-Za-z0-9_\-:/.]*").expect("candidate pattern is valid")
});

/// A compiled content glob such as `src/**/*.{astro,html}`.
#[derive(Debug, Clone)]
pub struct ContentGlob {
    pattern: String,
    base: PathBuf,
    regex: Regex,
}

impl ContentGlob {
    /// Compile a glob. Supports `**`, `*`, `?` and `{a,b}` alternation.
    pub fn parse(pattern: &str) -> Result<Self> {
        let normalized = pattern.trim().trim_start_matches("./");
        if normalized.is_empty() {
            return Err(glob_error(pattern, "empty pattern"));
        }
        if normalized.starts_with('/') {
            return Err(glob_error(pattern, "patterns are relative to the project root"));
        }

        let mut re = String::from("^");
        let mut chars = normalized.chars().peekable();
        let mut in_group = false;

        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        re.push_str("(?:.*/)?");
                    } else {
                        re.push_str(".*");
                    }
                }
                '*' => re.push_str("[^/]*"),
                '?' => re.push_str("[^/]"),
                '{' if !in_group => {
                    in_group = true;
                    re.push_str("(?:");
                }
                '{' => return Err(glob_error(pattern, "nested braces are not supported")),
                '}' if in_group => {
                    in_group = false;
                    re.push(')');
                }
                ',' if in_group => re.push('|'),
                other => re.push_str(&regex::escape(&other.to_string())),
            }
        }

        if in_group {
            return Err(glob_error(pattern, "unclosed brace"));
        }
        re.push('$');

        let regex = Regex::new(&re).map_err(|e| glob_error(pattern, e.to_string()))?;

        let base: PathBuf = normalized
            .split('/')
            .take_while(|part| !part.contains(['*', '?', '{']))
            .collect();
        // A pattern without wildcards names a file, not a directory.
        let base = if base.as_os_str().len() == normalized.len() {
            base.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            base
        };

        Ok(Self {
            pattern: pattern.to_string(),
            base,
            regex,
        })
    }

    /// The literal directory prefix of the pattern.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether a root-relative path matches.
    #[must_use]
    pub fn is_match(&self, relative: &Path) -> bool {
        let joined = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        self.regex.is_match(&joined)
    }
}

fn glob_error(pattern: &str, message: impl Into<String>) -> ScanError {
    ScanError::Glob {
        pattern: pattern.to_string(),
        message: message.into(),
    }
}

/// Result of a content scan.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Files that matched at least one glob, sorted.
    pub files: Vec<PathBuf>,

    /// Distinct class candidates, sorted.
    pub candidates: BTreeSet<String>,
}

/// Scans content files for utility class candidates.
#[derive(Debug)]
pub struct ContentScanner {
    root: PathBuf,
    globs: Vec<ContentGlob>,
}

impl ContentScanner {
    /// Create a scanner rooted at `root`.
    pub fn new<S: AsRef<str>>(root: impl Into<PathBuf>, patterns: &[S]) -> Result<Self> {
        let globs = patterns
            .iter()
            .map(|p| ContentGlob::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            root: root.into(),
            globs,
        })
    }

    /// Walk the matching files and collect candidates.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut files = BTreeSet::new();

        for glob in &self.globs {
            let start = self.root.join(glob.base());
            if !start.exists() {
                debug!(pattern = glob.pattern(), "glob base does not exist, skipping");
                continue;
            }

            for entry in WalkDir::new(&start)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let relative = path.strip_prefix(&self.root).unwrap_or(path);
                if glob.is_match(relative) {
                    files.insert(path.to_path_buf());
                }
            }
        }

        let mut candidates = BTreeSet::new();
        for file in &files {
            // Content files may use any encoding.
            let bytes = fs::read(file)?;
            let text = String::from_utf8_lossy(&bytes);
            candidates.extend(extract_candidates(&text).map(str::to_string));
        }

        info!(
            files = files.len(),
            candidates = candidates.len(),
            "scanned content"
        );

        Ok(ScanResult {
            files: files.into_iter().collect(),
            candidates,
        })
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Extract class candidates from arbitrary source text.
pub fn extract_candidates(text: &str) -> impl Iterator<Item = &str> {
    CANDIDATE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ':', '/']))
        .filter(|s| s.contains('-'))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_glob_matches_extensions() {
        let glob = ContentGlob::parse("./src/**/*.{astro,html,md}").unwrap();

        assert_eq!(glob.base(), Path::new("src"));
        assert!(glob.is_match(Path::new("src/pages/index.astro")));
        assert!(glob.is_match(Path::new("src/index.html")));
        assert!(glob.is_match(Path::new("src/a/b/c/post.md")));
        assert!(!glob.is_match(Path::new("src/pages/index.rs")));
        assert!(!glob.is_match(Path::new("public/index.html")));
    }

    #[test]
    fn test_glob_single_star_stays_in_directory() {
        let glob = ContentGlob::parse("layouts/*.html").unwrap();

        assert!(glob.is_match(Path::new("layouts/base.html")));
        assert!(!glob.is_match(Path::new("layouts/nested/base.html")));
    }

    #[test]
    fn test_glob_literal_file() {
        let glob = ContentGlob::parse("index.html").unwrap();
        assert_eq!(glob.base(), Path::new(""));
        assert!(glob.is_match(Path::new("index.html")));
        assert!(!glob.is_match(Path::new("index.htm")));
    }

    #[test]
    fn test_glob_escapes_regex_characters() {
        let glob = ContentGlob::parse("src/*.(x).html").unwrap();
        assert!(glob.is_match(Path::new("src/page.(x).html")));
        assert!(!glob.is_match(Path::new("src/pagex.html")));
    }

    #[test]
    fn test_glob_errors() {
        assert!(ContentGlob::parse("").is_err());
        assert!(ContentGlob::parse("/abs/**/*.html").is_err());
        assert!(ContentGlob::parse("src/*.{html,md").is_err());
        assert!(ContentGlob::parse("src/*.{a,{b,c}}").is_err());
    }

    #[test]
    fn test_extract_candidates() {
        let html = r#"<div class="bg-accent md:hover:text-accent-dark  max-w-content">
<span class='shadow-glow-teal'>x</span>
<p :class="{ 'text-text/50': on }">hello world</p></div>"#;

        let found: BTreeSet<_> = extract_candidates(html).collect();

        assert!(found.contains("bg-accent"));
        assert!(found.contains("md:hover:text-accent-dark"));
        assert!(found.contains("max-w-content"));
        assert!(found.contains("shadow-glow-teal"));
        assert!(found.contains("text-text/50"));
        assert!(!found.contains("hello"));
    }

    #[test]
    fn test_scan_collects_matching_files_only() {
        let root = TempDir::new().unwrap();
        let pages = root.path().join("src/pages");
        fs::create_dir_all(&pages).unwrap();
        fs::create_dir_all(root.path().join("src/.cache")).unwrap();

        fs::write(
            pages.join("index.html"),
            r#"<main class="bg-background text-text">"#,
        )
        .unwrap();
        fs::write(pages.join("notes.txt"), "font-sans").unwrap();
        fs::write(root.path().join("src/.cache/x.html"), "leading-relaxed").unwrap();

        let scanner = ContentScanner::new(root.path(), &["src/**/*.html"]).unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(result.files, vec![pages.join("index.html")]);
        assert!(result.candidates.contains("bg-background"));
        assert!(result.candidates.contains("text-text"));
        assert!(!result.candidates.contains("font-sans"));
        assert!(!result.candidates.contains("leading-relaxed"));
    }

    #[test]
    fn test_scan_tolerates_non_utf8_content() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("legacy.js"), b"el.className = \"bg-accent\"; // caf\xe9 \xff").unwrap();
        fs::write(src.join("index.html"), r#"<p class="text-text">"#).unwrap();

        let scanner = ContentScanner::new(root.path(), &["src/**/*.{html,js}"]).unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(result.files.len(), 2);
        assert!(result.candidates.contains("bg-accent"));
        assert!(result.candidates.contains("text-text"));
    }

    #[test]
    fn test_scan_missing_base_is_empty() {
        let root = TempDir::new().unwrap();
        let scanner = ContentScanner::new(root.path(), &["src/**/*.html"]).unwrap();
        let result = scanner.scan().unwrap();
        assert!(result.files.is_empty());
        assert!(result.candidates.is_empty());
    }
}

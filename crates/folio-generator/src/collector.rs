//! Page collection.
//!
//! Walks the pages directory and maps every HTML file to a route and an
//! output path using directory-style URLs (`about.html` is served from
//! `/about/`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Page collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Two source files map to the same route.
    #[error("route {route} is produced by both {first} and {second}")]
    DuplicateRoute {
        route: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// A page ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Source file.
    pub source: PathBuf,

    /// Route served by the page, e.g. `/about/`.
    pub route: String,

    /// Output path relative to the output directory.
    pub output: PathBuf,

    /// Last modification time of the source.
    pub modified: Option<DateTime<Utc>>,
}

impl Page {
    /// Whether this is the not-found page.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.route == "/404"
    }
}

/// Collects pages from a directory.
#[derive(Debug)]
pub struct PageCollector {
    pages_dir: PathBuf,
}

impl PageCollector {
    /// Create a collector for `pages_dir`.
    #[must_use]
    pub fn new(pages_dir: impl Into<PathBuf>) -> Self {
        Self {
            pages_dir: pages_dir.into(),
        }
    }

    /// Collect all pages, sorted by route.
    pub fn collect(&self) -> Result<Vec<Page>> {
        if !self.pages_dir.exists() {
            debug!(dir = %self.pages_dir.display(), "pages directory does not exist");
            return Ok(Vec::new());
        }

        let mut pages: Vec<Page> = Vec::new();

        for entry in WalkDir::new(&self.pages_dir)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || !e.file_name().to_string_lossy().starts_with(['.', '_'])
            })
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || !path.extension().is_some_and(|ext| ext == "html")
            {
                continue;
            }

            let relative = path.strip_prefix(&self.pages_dir).unwrap_or(path);
            let (route, output) = route_for(relative);
            let modified = fs::metadata(path)
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Utc>::from);

            pages.push(Page {
                source: path.to_path_buf(),
                route,
                output,
                modified,
            });
        }

        pages.sort_by(|a, b| a.route.cmp(&b.route));

        for pair in pages.windows(2) {
            if pair[0].route == pair[1].route {
                return Err(CollectorError::DuplicateRoute {
                    route: pair[0].route.clone(),
                    first: pair[0].source.clone(),
                    second: pair[1].source.clone(),
                });
            }
        }

        info!(count = pages.len(), "collected pages");
        Ok(pages)
    }
}

/// Map a pages-relative HTML path to its route and output path.
fn route_for(relative: &Path) -> (String, PathBuf) {
    let stem = relative.with_extension("");
    let segments: Vec<String> = stem
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    match segments.as_slice() {
        [only] if only == "404" => ("/404".to_string(), PathBuf::from("404.html")),
        [dirs @ .., last] if last == "index" => {
            let route = if dirs.is_empty() {
                "/".to_string()
            } else {
                format!("/{}/", dirs.join("/"))
            };
            (route, relative.to_path_buf())
        }
        _ => {
            let joined = segments.join("/");
            (format!("/{joined}/"), PathBuf::from(joined).join("index.html"))
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_route_for() {
        assert_eq!(
            route_for(Path::new("index.html")),
            ("/".to_string(), PathBuf::from("index.html"))
        );
        assert_eq!(
            route_for(Path::new("about.html")),
            ("/about/".to_string(), PathBuf::from("about/index.html"))
        );
        assert_eq!(
            route_for(Path::new("blog/index.html")),
            ("/blog/".to_string(), PathBuf::from("blog/index.html"))
        );
        assert_eq!(
            route_for(Path::new("blog/first-post.html")),
            (
                "/blog/first-post/".to_string(),
                PathBuf::from("blog/first-post/index.html")
            )
        );
        assert_eq!(
            route_for(Path::new("404.html")),
            ("/404".to_string(), PathBuf::from("404.html"))
        );
    }

    #[test]
    fn test_collect_pages() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::create_dir_all(dir.path().join("_partials")).unwrap();
        fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(dir.path().join("about.html"), "<h1>about</h1>").unwrap();
        fs::write(dir.path().join("blog/index.html"), "<h1>blog</h1>").unwrap();
        fs::write(dir.path().join("notes.txt"), "skip").unwrap();
        fs::write(dir.path().join("_partials/nav.html"), "skip").unwrap();

        let pages = PageCollector::new(dir.path()).collect().unwrap();
        let routes: Vec<_> = pages.iter().map(|p| p.route.as_str()).collect();

        assert_eq!(routes, vec!["/", "/about/", "/blog/"]);
        assert!(pages.iter().all(|p| p.modified.is_some()));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("about")).unwrap();
        fs::write(dir.path().join("about.html"), "a").unwrap();
        fs::write(dir.path().join("about/index.html"), "b").unwrap();

        let err = PageCollector::new(dir.path()).collect().unwrap_err();
        assert!(matches!(err, CollectorError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_missing_pages_dir() {
        let pages = PageCollector::new("/nonexistent/pages").collect().unwrap();
        assert!(pages.is_empty());
    }
}

//! Asset processing.
//!
//! Copies the public directory verbatim and writes the linked stylesheet
//! under a content-hashed name for cache busting.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Copies public files and writes generated assets.
#[derive(Debug)]
pub struct AssetProcessor {
    dest_dir: PathBuf,
}

impl AssetProcessor {
    /// Create a processor writing into `dest_dir`.
    #[must_use]
    pub fn new(dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            dest_dir: dest_dir.into(),
        }
    }

    /// Copy every non-hidden file from `source_dir`, keeping relative paths.
    ///
    /// Returns the published URL paths, sorted.
    pub fn copy_public(&self, source_dir: &Path) -> Result<Vec<String>> {
        let mut published = Vec::new();

        if !source_dir.exists() {
            debug!(dir = %source_dir.display(), "public directory does not exist, skipping");
            return Ok(published);
        }

        info!(
            source = %source_dir.display(),
            dest = %self.dest_dir.display(),
            "copying public assets"
        );

        self.copy_dir(source_dir, source_dir, &mut published)?;
        published.sort();

        info!(count = published.len(), "public assets copied");
        Ok(published)
    }

    fn copy_dir(
        &self,
        base_dir: &Path,
        current_dir: &Path,
        published: &mut Vec<String>,
    ) -> Result<()> {
        for entry in fs::read_dir(current_dir)? {
            let entry = entry?;
            let path = entry.path();

            // Skip hidden files/directories
            if path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
            {
                continue;
            }

            if path.is_dir() {
                self.copy_dir(base_dir, &path, published)?;
            } else if path.is_file() {
                let relative = path
                    .strip_prefix(base_dir)
                    .map_err(|_| AssetError::InvalidPath(path.clone()))?;
                let dest = self.dest_dir.join(relative);
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(&path, &dest)?;

                published.push(format!("/{}", relative.display()).replace('\\', "/"));
                debug!(src = %path.display(), dest = %dest.display(), "copied asset");
            }
        }

        Ok(())
    }

    /// Write a stylesheet as `<prefix>/site.<hash>.css` and return its URL
    /// path.
    pub fn write_stylesheet(&self, css: &str, prefix: &str) -> Result<String> {
        let prefix = prefix.trim_matches('/');
        let name = format!("site.{}.css", content_hash(css.as_bytes()));
        let dir = if prefix.is_empty() {
            self.dest_dir.clone()
        } else {
            self.dest_dir.join(prefix)
        };
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(&name), css)?;

        let href = if prefix.is_empty() {
            format!("/{name}")
        } else {
            format!("/{prefix}/{name}")
        };
        debug!(href = %href, bytes = css.len(), "wrote stylesheet");
        Ok(href)
    }
}

/// Short FNV-1a hash of some bytes, as 8 hex characters.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")[..8].to_string()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_copy_public() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::create_dir_all(source.path().join("img")).unwrap();
        fs::write(source.path().join("robots.txt"), "User-agent: *").unwrap();
        fs::write(source.path().join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(source.path().join(".DS_Store"), "x").unwrap();

        let processor = AssetProcessor::new(dest.path());
        let published = processor.copy_public(source.path()).unwrap();

        assert!(dest.path().join("robots.txt").exists());
        assert!(dest.path().join("img/logo.svg").exists());
        assert!(!dest.path().join(".DS_Store").exists());
        assert_eq!(published, vec!["/img/logo.svg", "/robots.txt"]);
    }

    #[test]
    fn test_copy_public_missing_dir() {
        let dest = TempDir::new().unwrap();
        let processor = AssetProcessor::new(dest.path());
        let published = processor.copy_public(Path::new("/nonexistent")).unwrap();
        assert!(published.is_empty());
    }

    #[test]
    fn test_write_stylesheet() {
        let dest = TempDir::new().unwrap();
        let processor = AssetProcessor::new(dest.path());

        let href = processor
            .write_stylesheet(".a{color:red}", "/_assets/")
            .unwrap();

        assert!(href.starts_with("/_assets/site."));
        assert!(href.ends_with(".css"));
        let written = fs::read_to_string(dest.path().join(href.trim_start_matches('/'))).unwrap();
        assert_eq!(written, ".a{color:red}");
    }

    #[test]
    fn test_content_hash_deterministic() {
        let first = content_hash(b"test content");
        let second = content_hash(b"test content");

        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        assert_ne!(first, content_hash(b"other content"));
    }
}

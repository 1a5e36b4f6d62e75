//! Build orchestration.
//!
//! Coordinates the full site build process.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use folio_core::{Config, CoreError, DesignTokens};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    assets::{AssetError, AssetProcessor},
    collector::{CollectorError, Page, PageCollector},
    inline::{Placement, decide, inject, link_tag, style_tag},
    scanner::{ContentScanner, ScanError},
    sitemap::{SitemapError, SitemapGenerator},
    utilities::UtilityGenerator,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] CoreError),

    /// Collector error.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Content scan error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Cleaning the output directory would delete project files.
    #[error("output directory {} contains {}", .output.display(), .protected.display())]
    UnsafeOutput {
        /// The configured output directory.
        output: PathBuf,
        /// The project path found inside it.
        protected: PathBuf,
    },
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of pages written.
    pub pages: usize,

    /// Number of generated utility rules.
    pub utilities: usize,

    /// Number of scanned candidates that matched no token.
    pub unmatched: usize,

    /// Size of the generated stylesheet in bytes.
    pub stylesheet_bytes: usize,

    /// Whether the stylesheet was inlined into pages.
    pub inlined: bool,

    /// Number of URLs in the sitemap.
    pub sitemap_urls: usize,

    /// Number of public assets copied.
    pub assets: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Site builder that orchestrates the build process.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    tokens: DesignTokens,
    root: PathBuf,
}

impl Builder {
    /// Create a new builder. Relative paths in the configuration resolve
    /// against `root`.
    #[must_use]
    pub fn new(config: Config, tokens: DesignTokens, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            tokens,
            root: root.into(),
        }
    }

    /// The output directory.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.build.output_dir)
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();
        let output_dir = self.output_dir();

        // The origin is needed for every sitemap URL; fail before touching disk.
        self.config.validate()?;
        self.ensure_safe_output(&output_dir)?;

        info!(
            root = %self.root.display(),
            output = %output_dir.display(),
            "starting build"
        );

        // 1. Clean output directory
        clean_output(&output_dir)?;

        // 2. Collect pages
        let pages = PageCollector::new(self.root.join(&self.config.build.pages_dir)).collect()?;

        // 3. Generate the utility stylesheet
        let scanner = ContentScanner::new(&self.root, self.config.theme.content.as_slice())?;
        let scan = scanner.scan()?;
        let generated = UtilityGenerator::new(&self.tokens)
            .generate(scan.candidates.iter().map(String::as_str));
        stats.utilities = generated.stylesheet.len();
        stats.unmatched = generated.unmatched;
        let css = generated.stylesheet.render(self.config.build.minify);

        // 4. Place the stylesheet and write pages
        let assets = AssetProcessor::new(&output_dir);
        let tag = if css.is_empty() {
            None
        } else {
            stats.stylesheet_bytes = css.len();
            let placement = decide(
                self.config.build.inline_stylesheets,
                css.len(),
                self.config.build.inline_limit,
            );
            debug!(?placement, bytes = css.len(), "stylesheet placement");
            match placement {
                Placement::Inline => {
                    stats.inlined = true;
                    Some(style_tag(&css))
                }
                Placement::Linked => {
                    let href = assets.write_stylesheet(&css, &self.config.build.assets_prefix)?;
                    Some(link_tag(&href))
                }
            }
        };

        stats.pages = self.write_pages(&pages, &output_dir, tag.as_deref())?;

        // 5. Generate sitemap
        let generator = SitemapGenerator::new(self.config.clone())?;
        stats.sitemap_urls = generator.write_to(&pages, &output_dir)?;

        // 6. Copy public assets
        let published = assets.copy_public(&self.root.join(&self.config.build.public_dir))?;
        stats.assets = published.len();

        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            pages = stats.pages,
            utilities = stats.utilities,
            inlined = stats.inlined,
            sitemap_urls = stats.sitemap_urls,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Refuse an output directory whose removal would take the project root,
    /// the pages, the public files or a token file with it.
    fn ensure_safe_output(&self, output_dir: &Path) -> Result<()> {
        // A missing directory has nothing to remove.
        let Ok(output) = output_dir.canonicalize() else {
            return Ok(());
        };

        let build = &self.config.build;
        let theme = &self.config.theme;
        let protected = [&build.pages_dir, &build.public_dir]
            .into_iter()
            .chain(&theme.tokens)
            .chain(&theme.overlay)
            .map(|path| self.root.join(path))
            .chain([self.root.clone()]);

        for path in protected {
            if let Ok(path) = path.canonicalize()
                && path.starts_with(&output)
            {
                return Err(BuildError::UnsafeOutput {
                    output: output_dir.to_path_buf(),
                    protected: path,
                });
            }
        }

        Ok(())
    }

    /// Write every page, injecting the stylesheet tag when there is one.
    fn write_pages(&self, pages: &[Page], output_dir: &Path, tag: Option<&str>) -> Result<usize> {
        info!(count = pages.len(), "writing pages");

        pages
            .par_iter()
            .map(|page| {
                let html = fs::read_to_string(&page.source)?;
                let html = match tag {
                    Some(tag) => inject(&html, tag),
                    None => html,
                };

                let output_path = output_dir.join(&page.output);
                if let Some(parent) = output_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&output_path, html)?;

                debug!(route = %page.route, path = %output_path.display(), "wrote page");
                Ok::<_, BuildError>(())
            })
            .collect::<Result<Vec<_>>>()
            .map(|written| written.len())
    }
}

/// Clean the output directory.
fn clean_output(output_dir: &Path) -> Result<()> {
    if output_dir.exists() {
        debug!(dir = %output_dir.display(), "cleaning output directory");
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use folio_core::InlinePolicy;
    use tempfile::TempDir;

    use super::*;

    fn test_config(output: &Path) -> Config {
        let mut config = Config::canonical();
        config.site.origin = "https://example.com".to_string();
        config.build.output_dir = output.to_path_buf();
        config
    }

    fn write_page(root: &Path, relative: &str, html: &str) {
        let path = root.join("src/pages").join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, html).unwrap();
    }

    #[test]
    fn test_build_empty_site() {
        let root = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let builder = Builder::new(
            test_config(output.path()),
            DesignTokens::canonical(),
            root.path(),
        );
        let stats = builder.build().unwrap();

        assert_eq!(stats.pages, 0);
        assert_eq!(stats.utilities, 0);
        assert!(output.path().join("sitemap-0.xml").exists());
        assert!(output.path().join("sitemap-index.xml").exists());
    }

    #[test]
    fn test_build_inlines_small_stylesheet() {
        let root = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_page(
            root.path(),
            "index.html",
            r#"<html><head><title>Home</title></head><body class="text-accent">hi</body></html>"#,
        );

        let builder = Builder::new(
            test_config(output.path()),
            DesignTokens::canonical(),
            root.path(),
        );
        let stats = builder.build().unwrap();

        assert_eq!(stats.pages, 1);
        assert_eq!(stats.utilities, 1);
        assert!(stats.inlined);

        let html = fs::read_to_string(output.path().join("index.html")).unwrap();
        assert!(html.contains("<style>.text-accent{color:#0d7490}</style></head>"));
    }

    #[test]
    fn test_build_links_when_never_inlining() {
        let root = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_page(
            root.path(),
            "about.html",
            r#"<html><head></head><body class="bg-background font-sans"></body></html>"#,
        );

        let mut config = test_config(output.path());
        config.build.inline_stylesheets = InlinePolicy::Never;
        let stats = Builder::new(config, DesignTokens::canonical(), root.path())
            .build()
            .unwrap();

        assert!(!stats.inlined);
        let html = fs::read_to_string(output.path().join("about/index.html")).unwrap();
        assert!(html.contains(r#"<link rel="stylesheet" href="/_assets/site."#));
        assert!(output.path().join("_assets").is_dir());
    }

    #[test]
    fn test_build_rejects_malformed_origin() {
        let root = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let mut config = test_config(output.path());
        config.site.origin = "example.com".to_string();

        let err = Builder::new(config, DesignTokens::canonical(), root.path())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Config(CoreError::InvalidOrigin { .. })
        ));
    }

    #[test]
    fn test_build_copies_public_assets() {
        let root = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("public")).unwrap();
        fs::write(root.path().join("public/favicon.svg"), "<svg/>").unwrap();

        let stats = Builder::new(
            test_config(output.path()),
            DesignTokens::canonical(),
            root.path(),
        )
        .build()
        .unwrap();

        assert_eq!(stats.assets, 1);
        assert!(output.path().join("favicon.svg").exists());
    }

    fn assert_refused(root: &Path, output: &Path) {
        let err = Builder::new(test_config(output), DesignTokens::canonical(), root)
            .build()
            .unwrap_err();
        assert!(
            matches!(err, BuildError::UnsafeOutput { .. }),
            "expected UnsafeOutput, got {err}"
        );
    }

    fn project(root: &Path) {
        fs::write(root.join("folio.toml"), "[site]\norigin = \"https://example.com\"\n").unwrap();
        write_page(root, "index.html", "<html><head></head><body></body></html>");
        fs::create_dir_all(root.join("public")).unwrap();
        fs::write(root.join("public/robots.txt"), "User-agent: *").unwrap();
    }

    #[test]
    fn test_build_refuses_output_at_project_root() {
        let root = TempDir::new().unwrap();
        project(root.path());

        assert_refused(root.path(), root.path());

        assert!(root.path().join("folio.toml").exists());
        assert!(root.path().join("src/pages/index.html").exists());
    }

    #[test]
    fn test_build_refuses_output_above_project_root() {
        let parent = TempDir::new().unwrap();
        let root = parent.path().join("site");
        fs::create_dir_all(&root).unwrap();
        project(&root);

        assert_refused(&root, parent.path());

        assert!(root.join("folio.toml").exists());
    }

    #[test]
    fn test_build_refuses_output_containing_pages_or_public() {
        let root = TempDir::new().unwrap();
        project(root.path());

        assert_refused(root.path(), &root.path().join("src"));
        assert_refused(root.path(), &root.path().join("src/pages"));
        assert_refused(root.path(), &root.path().join("public"));

        assert!(root.path().join("src/pages/index.html").exists());
        assert!(root.path().join("public/robots.txt").exists());
    }

    #[test]
    fn test_build_refuses_output_containing_token_files() {
        let root = TempDir::new().unwrap();
        project(root.path());
        fs::create_dir_all(root.path().join("theme")).unwrap();
        fs::write(root.path().join("theme/tokens.toml"), "").unwrap();

        let output = root.path().join("theme");
        let mut config = test_config(&output);
        config.theme.tokens = vec![PathBuf::from("theme/tokens.toml")];
        let err = Builder::new(config, DesignTokens::canonical(), root.path())
            .build()
            .unwrap_err();

        assert!(matches!(err, BuildError::UnsafeOutput { .. }));
        assert!(root.path().join("theme/tokens.toml").exists());
    }

    #[test]
    fn test_build_rejects_relative_dot_outputs() {
        let root = TempDir::new().unwrap();
        project(root.path());

        for bad in ["", ".", ".."] {
            let err = Builder::new(
                test_config(Path::new(bad)),
                DesignTokens::canonical(),
                root.path(),
            )
            .build()
            .unwrap_err();
            assert!(matches!(err, BuildError::Config(_)), "'{bad}': {err}");
        }

        assert!(root.path().join("folio.toml").exists());
        assert!(root.path().join("src/pages/index.html").exists());
    }

    #[test]
    fn test_build_into_fresh_subdirectory_is_allowed() {
        let root = TempDir::new().unwrap();
        project(root.path());

        let stats = Builder::new(
            test_config(&root.path().join("dist")),
            DesignTokens::canonical(),
            root.path(),
        )
        .build()
        .unwrap();

        assert_eq!(stats.pages, 1);
        assert!(root.path().join("dist/index.html").exists());
        assert!(root.path().join("folio.toml").exists());
    }

    #[test]
    fn test_build_stats() {
        let stats = BuildStats::default();
        assert_eq!(stats.pages, 0);
        assert_eq!(stats.duration_ms, 0);
        assert!(!stats.inlined);
    }
}

//! Site build configuration.

use std::{
    fmt,
    path::{Component, Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::{CoreError, Result},
    tokens::{DesignTokens, TokenDiff},
};

/// Main configuration structure for folio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Build extensions, in the order they run.
    #[serde(default = "default_integrations")]
    pub integrations: Vec<Integration>,

    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Sitemap settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Design token sources and content globs.
    #[serde(default)]
    pub theme: ThemeConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Canonical origin of the deployed site (e.g., "https://example.com").
    pub origin: String,
}

/// A build-time extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Integration {
    /// Emits the sitemap files.
    Sitemap,

    /// Wires the token-driven utility stylesheet into the page pipeline.
    UtilityCss,
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sitemap => "sitemap",
            Self::UtilityCss => "utility-css",
        })
    }
}

/// Output mode of the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Every page is produced ahead of time.
    #[default]
    Static,

    /// Every page is rendered on request.
    Server,

    /// Static by default with opt-in request rendering.
    Hybrid,
}

/// Policy for placing the generated stylesheet into pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlinePolicy {
    /// Inline when the stylesheet fits under `build.inline_limit`.
    #[default]
    Auto,

    /// Always inline into a `<style>` element.
    Always,

    /// Always link an external file.
    Never,
}

/// Build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Output mode. Only `static` is buildable.
    #[serde(default)]
    pub output: OutputMode,

    /// Stylesheet placement policy.
    #[serde(default)]
    pub inline_stylesheets: InlinePolicy,

    /// Largest stylesheet (bytes) that `auto` inlines.
    #[serde(default = "default_inline_limit")]
    pub inline_limit: usize,

    /// Directory holding the HTML pages, relative to the project root.
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    /// Directory copied verbatim into the output.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Output directory for the generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Output subdirectory for linked stylesheets.
    #[serde(default = "default_assets_prefix")]
    pub assets_prefix: String,

    /// Whether to minify the generated stylesheet.
    #[serde(default = "default_true")]
    pub minify: bool,
}

/// Sitemap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapConfig {
    /// Maximum number of URLs per sitemap file.
    #[serde(default = "default_entry_limit")]
    pub entry_limit: usize,

    /// Route prefixes left out of the sitemap.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Whether to emit `<lastmod>` from page modification times.
    #[serde(default)]
    pub lastmod: bool,
}

/// Theme configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Globs selecting the files scanned for utility classes.
    #[serde(default = "default_content_globs")]
    pub content: Vec<String>,

    /// Token files, each a complete token set. Empty selects the built-in set.
    #[serde(default)]
    pub tokens: Vec<PathBuf>,

    /// Token file layered over the resolved base set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<PathBuf>,
}

// Default value functions
fn default_integrations() -> Vec<Integration> {
    vec![Integration::Sitemap, Integration::UtilityCss]
}

fn default_inline_limit() -> usize {
    4096
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("src/pages")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_assets_prefix() -> String {
    "_assets".to_string()
}

fn default_true() -> bool {
    true
}

fn default_entry_limit() -> usize {
    45000
}

fn default_content_globs() -> Vec<String> {
    vec!["src/**/*.{astro,html,js,jsx,md,mdx,svelte,ts,tsx,vue}".to_string()]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: OutputMode::Static,
            inline_stylesheets: InlinePolicy::Auto,
            inline_limit: default_inline_limit(),
            pages_dir: default_pages_dir(),
            public_dir: default_public_dir(),
            output_dir: default_output_dir(),
            assets_prefix: default_assets_prefix(),
            minify: true,
        }
    }
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            entry_limit: default_entry_limit(),
            exclude: Vec::new(),
            lastmod: false,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            content: default_content_globs(),
            tokens: Vec::new(),
            overlay: None,
        }
    }
}

impl Config {
    /// The site's own configuration, used when no file is given.
    #[must_use]
    pub fn canonical() -> Self {
        Self {
            integrations: default_integrations(),
            site: SiteConfig {
                origin: "https://akpandeya.com".to_string(),
            },
            build: BuildConfig::default(),
            sitemap: SitemapConfig::default(),
            theme: ThemeConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FOLIO__`-prefixed environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CoreError::config_with_source("Failed to serialize configuration", e))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.origin_url()?;

        if self.site.origin.ends_with('/') {
            tracing::warn!("site.origin should not have a trailing slash");
        }

        for integration in [Integration::Sitemap, Integration::UtilityCss] {
            let count = self
                .integrations
                .iter()
                .filter(|i| **i == integration)
                .count();
            if count != 1 {
                return Err(CoreError::config(format!(
                    "expected exactly one '{integration}' integration, found {count}"
                )));
            }
        }

        if self.build.output != OutputMode::Static {
            return Err(CoreError::config(format!(
                "build.output must be 'static', found '{}'",
                match self.build.output {
                    OutputMode::Static => "static",
                    OutputMode::Server => "server",
                    OutputMode::Hybrid => "hybrid",
                }
            )));
        }

        let output_dir = &self.build.output_dir;
        if output_dir.as_os_str().is_empty() {
            return Err(CoreError::config("build.output_dir must not be empty"));
        }
        if output_dir
            .components()
            .any(|c| matches!(c, Component::CurDir | Component::ParentDir))
        {
            return Err(CoreError::config(format!(
                "build.output_dir must not contain '.' or '..' components, found '{}'",
                output_dir.display()
            )));
        }

        if self.sitemap.entry_limit == 0 {
            return Err(CoreError::config("sitemap.entry_limit must be positive"));
        }

        if self.theme.content.is_empty() {
            tracing::warn!("theme.content is empty; no utility classes will be generated");
        }

        Ok(())
    }

    /// Parse the site origin.
    ///
    /// Fails unless the origin is an absolute http(s) URL with a host and
    /// without query or fragment.
    pub fn origin_url(&self) -> Result<Url> {
        let origin = &self.site.origin;
        let url =
            Url::parse(origin).map_err(|e| CoreError::invalid_origin(origin, e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::invalid_origin(
                origin,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(CoreError::invalid_origin(origin, "missing host"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(CoreError::invalid_origin(
                origin,
                "query and fragment are not allowed",
            ));
        }

        Ok(url)
    }

    /// Get the full URL for a route, percent-encoding its path.
    ///
    /// A path on the origin is kept as a prefix of every route.
    pub fn url_for(&self, route: &str) -> Result<String> {
        let mut base = self.origin_url()?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        // The `./` prefix keeps a route such as `a:b/` from parsing as a scheme.
        let relative = format!("./{}", route.trim_start_matches('/'));
        let url = base
            .join(&relative)
            .map_err(|e| CoreError::invalid_origin(&self.site.origin, e.to_string()))?;
        Ok(url.into())
    }
}

impl ThemeConfig {
    /// Resolve the effective design tokens.
    ///
    /// Every file in `tokens` is loaded independently; if any two disagree the
    /// theme is rejected. The overlay, when present, is layered on top.
    /// Relative paths resolve against `root`.
    pub fn resolve_tokens(&self, root: &Path) -> Result<DesignTokens> {
        let mut sources = Vec::with_capacity(self.tokens.len());
        for path in &self.tokens {
            let path = root.join(path);
            let tokens = DesignTokens::load(&path)?;
            sources.push((path, tokens));
        }

        let mut base = match sources.split_first() {
            None => DesignTokens::canonical(),
            Some(((first_path, first), rest)) => {
                for (path, other) in rest {
                    let diff = TokenDiff::between(first, other);
                    if !diff.is_empty() {
                        return Err(CoreError::TokenConflict {
                            left: first_path.clone(),
                            right: path.clone(),
                            report: diff.to_string(),
                        });
                    }
                    tracing::warn!(
                        left = %first_path.display(),
                        right = %path.display(),
                        "token files are identical; keep a single source"
                    );
                }
                first.clone()
            }
        };

        if let Some(overlay_path) = &self.overlay {
            let overlay = DesignTokens::load(&root.join(overlay_path))?;
            let overridden = base.extend(&overlay);
            tracing::debug!(
                overlay = %overlay_path.display(),
                overridden = overridden.len(),
                "applied token overlay"
            );
        }

        for warning in base.validate()? {
            tracing::warn!("{warning}");
        }

        Ok(base)
    }
}

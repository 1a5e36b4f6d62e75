//! Sitemap generation.
//!
//! Generates chunked XML sitemaps plus a sitemap index. Every location is
//! the configured origin followed by the percent-encoded page route.

use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use folio_core::Config;
use thiserror::Error;
use tracing::{debug, info};

use crate::collector::Page;

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(#[from] folio_core::CoreError),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Name of the sitemap index file.
pub const INDEX_FILE: &str = "sitemap-index.xml";

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapUrl {
    /// URL location.
    pub loc: String,

    /// Last modification date.
    pub lastmod: Option<DateTime<Utc>>,
}

/// A generated sitemap file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapFile {
    /// File name relative to the output root.
    pub name: String,

    /// XML content.
    pub xml: String,
}

/// Sitemap generator.
#[derive(Debug)]
pub struct SitemapGenerator {
    config: Config,
}

impl SitemapGenerator {
    /// Create a new sitemap generator. Fails if the origin is not an
    /// absolute URL, since no location could be computed.
    pub fn new(config: Config) -> Result<Self> {
        config.origin_url()?;
        Ok(Self { config })
    }

    /// Sitemap entries for the given pages, in page order.
    ///
    /// The not-found page and routes under an excluded prefix are skipped.
    pub fn entries(&self, pages: &[Page]) -> Result<Vec<SitemapUrl>> {
        let mut entries = Vec::with_capacity(pages.len());
        for page in pages {
            if page.is_not_found() || self.is_excluded(&page.route) {
                continue;
            }
            entries.push(SitemapUrl {
                loc: self.config.url_for(&page.route)?,
                lastmod: if self.config.sitemap.lastmod {
                    page.modified
                } else {
                    None
                },
            });
        }
        Ok(entries)
    }

    fn is_excluded(&self, route: &str) -> bool {
        self.config
            .sitemap
            .exclude
            .iter()
            .any(|prefix| route.starts_with(prefix.as_str()))
    }

    /// Generate the sitemap chunks followed by the index.
    pub fn generate(&self, pages: &[Page]) -> Result<Vec<SitemapFile>> {
        let entries = self.entries(pages)?;
        debug!(count = entries.len(), "generating sitemap");

        let mut files: Vec<SitemapFile> = entries
            .chunks(self.config.sitemap.entry_limit.max(1))
            .enumerate()
            .map(|(i, chunk)| SitemapFile {
                name: format!("sitemap-{i}.xml"),
                xml: urlset_xml(chunk),
            })
            .collect();

        // An empty site still gets one (empty) urlset so the index is valid.
        if files.is_empty() {
            files.push(SitemapFile {
                name: "sitemap-0.xml".to_string(),
                xml: urlset_xml(&[]),
            });
        }

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        let index = SitemapFile {
            name: INDEX_FILE.to_string(),
            xml: self.generate_index(&names)?,
        };
        files.push(index);
        Ok(files)
    }

    /// Generate the sitemap index referencing each chunk.
    pub fn generate_index(&self, sitemaps: &[&str]) -> Result<String> {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for sitemap in sitemaps {
            xml.push_str("  <sitemap>\n");
            xml.push_str(&format!(
                "    <loc>{}</loc>\n",
                escape_xml(&self.config.url_for(sitemap)?)
            ));
            xml.push_str("  </sitemap>\n");
        }

        xml.push_str("</sitemapindex>\n");
        Ok(xml)
    }

    /// Generate and write all sitemap files into `output_dir`.
    ///
    /// Returns the number of URLs written.
    pub fn write_to(&self, pages: &[Page], output_dir: &Path) -> Result<usize> {
        let files = self.generate(pages)?;
        for file in &files {
            fs::write(output_dir.join(&file.name), &file.xml)?;
        }

        let count = self.entries(pages)?.len();
        info!(urls = count, files = files.len() - 1, "generated sitemap");
        Ok(count)
    }
}

fn urlset_xml(urls: &[SitemapUrl]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for url in urls {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&url.loc)));
        if let Some(lastmod) = &url.lastmod {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.format("%Y-%m-%d")
            ));
        }
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

//! Folio Generator Library
//!
//! Static build pipeline for the folio site.
//!
//! # Modules
//!
//! - [`collector`] - Page discovery and directory-style routing
//! - [`scanner`] - Content globs and utility class candidate extraction
//! - [`utilities`] - Utility rule generation from design tokens
//! - [`css`] - Stylesheet model and rendering
//! - [`inline`] - Stylesheet inlining policy and tag injection
//! - [`sitemap`] - Chunked XML sitemap and sitemap index
//! - [`assets`] - Public file copying and hashed stylesheet output
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod collector;
pub mod css;
pub mod inline;
pub mod scanner;
pub mod sitemap;
pub mod utilities;

pub use assets::AssetProcessor;
pub use build::{BuildError, BuildStats, Builder};
pub use collector::{Page, PageCollector};
pub use css::{Rule, Stylesheet};
pub use inline::Placement;
pub use scanner::{ContentGlob, ContentScanner, ScanResult};
pub use sitemap::SitemapGenerator;
pub use utilities::{GeneratedCss, UtilityGenerator};

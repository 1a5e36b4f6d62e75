//! Folio Core Library
//!
//! Site build configuration, design tokens and error handling for folio.

pub mod color;
pub mod config;
pub mod error;
pub mod tokens;

pub use color::Color;
pub use config::{
    BuildConfig, Config, InlinePolicy, Integration, OutputMode, SiteConfig, SitemapConfig,
    ThemeConfig,
};
pub use error::{CoreError, Result};
pub use tokens::{DarkMode, DesignTokens, TokenCategory, TokenDiff};

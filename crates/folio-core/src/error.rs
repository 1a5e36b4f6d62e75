//! Error types for the folio core library.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for folio.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration loading or validation error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The site origin is not an absolute http(s) URL.
    #[error("Invalid site origin '{origin}': {reason}")]
    InvalidOrigin { origin: String, reason: String },

    /// A design token carries a value its category cannot accept.
    #[error("Invalid {category} token '{name}': {reason}")]
    InvalidToken {
        category: &'static str,
        name: String,
        reason: String,
    },

    /// Two independently loaded token files disagree.
    #[error("Conflicting design tokens between {left} and {right}:\n{report}")]
    TokenConflict {
        left: PathBuf,
        right: PathBuf,
        report: String,
    },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic configuration crate error.
    #[error("Config crate error: {0}")]
    ConfigCrate(#[from] config::ConfigError),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new invalid origin error.
    pub fn invalid_origin(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOrigin {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid token error.
    pub fn invalid_token(
        category: &'static str,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidToken {
            category,
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CoreError::config("missing field");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("missing field"));
    }

    #[test]
    fn test_invalid_origin_error() {
        let err = CoreError::invalid_origin("example", "relative URL without a base");
        assert!(err.to_string().contains("Invalid site origin 'example'"));
        assert!(err.to_string().contains("relative URL"));
    }

    #[test]
    fn test_invalid_token_error() {
        let err = CoreError::invalid_token("color", "accent", "not a color");
        assert_eq!(err.to_string(), "Invalid color token 'accent': not a color");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CoreError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }
}

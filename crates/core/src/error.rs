//! Error types for sitecarve operations.
//!
//! Extraction itself never fails: a missing region, an unterminated region and
//! malformed markup are all reported as data by [`crate::extract_region`].
//! [`SitecarveError`] covers the plumbing around it: fetching, sitemap
//! parsing, configuration and filesystem work.
//!
//! # Example
//!
//! ```rust
//! use sitecarve_core::{Result, SitecarveError};
//!
//! fn require_base(base: &str) -> Result<&str> {
//!     if base.is_empty() {
//!         return Err(SitecarveError::ConfigError("base_url is empty".to_string()));
//!     }
//!     Ok(base)
//! }
//!
//! assert!(require_base("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fetch, sitemap, configuration and file operations.
#[derive(Error, Debug)]
pub enum SitecarveError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-success status code.
    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Filesystem and stdin errors.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The sitemap could not be parsed or queried.
    #[error("Sitemap error: {0}")]
    SitemapError(String),

    /// Site configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A TOML site configuration file could not be deserialized.
    #[error("Invalid configuration file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    /// A trigger specification is not of the form `name=value`.
    #[error("Invalid trigger '{0}': expected name=value")]
    InvalidTrigger(String),

    /// A page discovery glob pattern is invalid.
    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),
}

impl From<glob::GlobError> for SitecarveError {
    fn from(err: glob::GlobError) -> Self {
        SitecarveError::IoError(err.into_error())
    }
}

/// Result type alias for SitecarveError.
pub type Result<T> = std::result::Result<T, SitecarveError>;

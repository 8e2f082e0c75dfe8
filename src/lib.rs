//! Pen-Finder: an on-demand product scraper for fountain pen resellers
//!
//! This crate exposes a small HTTP control plane that launches crawl runs against
//! a set of reseller sites, records every product page it discovers, and lets
//! clients poll each run for completion.

pub mod config;
pub mod crawler;
pub mod recorder;
pub mod scraper;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Pen-Finder operations
#[derive(Debug, Error)]
pub enum PenFinderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),
}

// Re-export commonly used types
pub use config::Config;
pub use recorder::{Product, Recorder};
pub use scraper::{ScrapeError, Scraper};
pub use state::RunStatus;

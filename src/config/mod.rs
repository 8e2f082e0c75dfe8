//! Configuration module for Pen-Finder
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so the binary also runs without a file.
//!
//! # Example
//!
//! ```no_run
//! use pen_finder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pen-finder.toml")).unwrap();
//! println!("Requests per scrape: {}", config.crawler.max_concurrent_requests);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, ServerConfig, TargetConfig};

pub use parser::{load_config, parse_config};
pub use validation::validate;

use crate::scraper::{ScrapeTarget, ScraperKind};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Pen-Finder
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// HTTP control plane configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    /// Socket address the API listens on
    pub bind_addr: String,

    /// Deadline for a whole run (seconds); absent means runs are unbounded
    pub run_timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            run_timeout_secs: None,
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight per scrape
    pub max_concurrent_requests: usize,

    /// Timeout of a single page request (seconds)
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            request_timeout_secs: 30,
            user_agent: format!("pen-finder/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Replacement for one built-in source
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Which built-in source this entry replaces
    pub kind: ScraperKind,

    #[serde(flatten)]
    pub target: ScrapeTarget,
}

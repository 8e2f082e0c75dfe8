//! Crawler module - the crawling engine scrapers drive
//!
//! This module contains:
//! - HTTP fetching behind the [`PageFetcher`] capability
//! - HTML parsing and hyperlink discovery
//! - The [`Collector`]: visit queue, allow-list, visited-set and drain

mod collector;
mod fetcher;
mod parser;

pub use collector::{Collector, CrawlEvent, VisitError};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use parser::extract_hrefs;

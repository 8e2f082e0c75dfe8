//! URL handling module for Pen-Finder
//!
//! This module provides the allow-list filter that fences a crawl, resolution of
//! discovered hrefs against a scraper's base URL, and the normalization used to
//! decide whether two links point at the same page.

mod filter;
mod normalize;
mod resolve;

// Re-export main functions
pub use filter::UrlFilter;
pub use normalize::visit_key;
pub use resolve::resolve_href;

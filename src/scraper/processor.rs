//! Href processing - the per-link rule of a scraper
//!
//! For every hyperlink the collector discovers, the processor:
//! 1. Resolves it against the scraper's base URL if it is relative
//! 2. Submits the resolved URL to the collector's visit queue
//! 3. Extracts a product slug if the URL path starts with the product prefix
//!
//! A link the collector declines (already visited, outside the allow-list)
//! yields a benign [`ProcessError`] and no product, so each product page is
//! reported at most once per crawl.

use crate::crawler::{Collector, VisitError};
use crate::url::resolve_href;
use crate::UrlError;
use thiserror::Error;
use url::Url;

/// Errors raised while processing one href
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("visiting {url}: {source}")]
    Visit { url: String, source: VisitError },

    #[error("resolving {href}: {source}")]
    Resolve { href: String, source: UrlError },
}

impl ProcessError {
    /// Returns true for declines the crawl should silently ignore
    pub fn is_benign(&self) -> bool {
        match self {
            Self::Visit { source, .. } => source.is_benign(),
            Self::Resolve { .. } => false,
        }
    }
}

/// A hyperlink accepted into the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// The href as written in the page
    pub raw_href: String,

    /// The absolute URL that was queued
    pub url: Url,

    /// Product slug, if the URL is a product page
    pub product: Option<String>,
}

/// Per-scraper rule mapping a discovered href to a visit and an optional product
pub trait HrefProcessor: Send + Sync {
    /// Processes one href
    ///
    /// # Returns
    ///
    /// * `Ok(Some(link))` - The link was queued; `link.product` is set for product pages
    /// * `Ok(None)` - The href can never lead to a page (anchor, `mailto:`, ...)
    /// * `Err(ProcessError)` - The link was declined or could not be resolved
    fn process_href(
        &self,
        collector: &Collector,
        href: &str,
    ) -> Result<Option<DiscoveredLink>, ProcessError>;
}

/// Processor resolving against a fixed base URL and matching a path prefix
#[derive(Debug, Clone)]
pub struct SimpleProcessor {
    base_url: Url,
    product_path_prefix: String,
}

impl SimpleProcessor {
    pub fn new(base_url: Url, product_path_prefix: impl Into<String>) -> Self {
        Self {
            base_url,
            product_path_prefix: product_path_prefix.into(),
        }
    }

    /// Extracts the product slug from a URL
    ///
    /// The slug is the path remainder after the product prefix, with one
    /// trailing slash removed. An empty remainder is not a product.
    ///
    /// # Example
    ///
    /// ```
    /// use pen_finder::scraper::SimpleProcessor;
    /// use url::Url;
    ///
    /// let processor = SimpleProcessor::new(
    ///     Url::parse("https://chatterleyluxuries.com").unwrap(),
    ///     "/product/",
    /// );
    /// let url = Url::parse("https://chatterleyluxuries.com/product/acme-141/").unwrap();
    /// assert_eq!(processor.product_slug(&url), Some("acme-141".to_string()));
    /// ```
    pub fn product_slug(&self, url: &Url) -> Option<String> {
        let rest = url.path().strip_prefix(self.product_path_prefix.as_str())?;
        let slug = rest.strip_suffix('/').unwrap_or(rest);

        if slug.is_empty() {
            None
        } else {
            Some(slug.to_string())
        }
    }
}

impl HrefProcessor for SimpleProcessor {
    fn process_href(
        &self,
        collector: &Collector,
        href: &str,
    ) -> Result<Option<DiscoveredLink>, ProcessError> {
        let resolved = resolve_href(href, &self.base_url).map_err(|source| {
            ProcessError::Resolve {
                href: href.to_string(),
                source,
            }
        })?;

        let Some(url) = resolved else {
            return Ok(None);
        };

        collector
            .visit(&url)
            .map_err(|source| ProcessError::Visit {
                url: url.to_string(),
                source,
            })?;

        let product = self.product_slug(&url);

        Ok(Some(DiscoveredLink {
            raw_href: href.to_string(),
            url,
            product,
        }))
    }
}

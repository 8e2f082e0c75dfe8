//! Simple scraper - a crawl configured entirely by a [`ScrapeTarget`]
//!
//! The crawl is breadth-first and open-ended: every page inside the
//! allow-list is visited and its links followed, and every followed link
//! whose path carries the product prefix is reported as a product.

use crate::crawler::{Collector, CrawlEvent, PageFetcher};
use crate::recorder::Product;
use crate::scraper::processor::{HrefProcessor, SimpleProcessor};
use crate::scraper::target::ScrapeTarget;
use crate::scraper::{ScrapeError, ScrapeOptions, Scraper};
use crate::url::UrlFilter;
use crate::ConfigError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What the crawl loop does next
enum Step {
    Event(CrawlEvent),
    Drained,
    Cancelled,
}

/// Scraper driving one [`Collector`] per scrape
pub struct SimpleScraper {
    source_name: String,
    base_url: Url,
    filter: UrlFilter,
    processor: Arc<dyn HrefProcessor>,
    fetcher: Arc<dyn PageFetcher>,
    max_concurrency: usize,
}

impl SimpleScraper {
    /// Builds a scraper from a target
    ///
    /// # Arguments
    ///
    /// * `target` - Source configuration
    /// * `fetcher` - Capability used for every request of every scrape
    /// * `max_concurrency` - Requests in flight per scrape
    ///
    /// # Returns
    ///
    /// * `Ok(SimpleScraper)` - The target's URLs and patterns are valid
    /// * `Err(ConfigError)` - A URL failed to parse or a pattern failed to compile
    pub fn new(
        target: &ScrapeTarget,
        fetcher: Arc<dyn PageFetcher>,
        max_concurrency: usize,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_url(&target.base_url)?;
        let product_base_url = parse_url(&target.product_base_url)?;
        let filter = UrlFilter::new(&target.allow)?;

        Ok(Self {
            source_name: target.source_name.clone(),
            base_url,
            filter,
            processor: Arc::new(SimpleProcessor::new(
                product_base_url,
                target.product_path_prefix.clone(),
            )),
            fetcher,
            max_concurrency,
        })
    }

    /// Replaces the href processor
    pub fn with_processor(mut self, processor: Arc<dyn HrefProcessor>) -> Self {
        self.processor = processor;
        self
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Runs every href of one page through the processor
    ///
    /// Stops early once `token` fires; the crawl loop then observes the
    /// cancellation on its next step.
    fn process_page(
        &self,
        collector: &Collector,
        token: &CancellationToken,
        options: &ScrapeOptions,
        hrefs: &[String],
        errors: &mut Vec<ScrapeError>,
    ) {
        for href in hrefs {
            if token.is_cancelled() {
                return;
            }

            let link = match self.processor.process_href(collector, href) {
                Ok(Some(link)) => link,
                Ok(None) => continue,
                Err(e) if e.is_benign() => {
                    tracing::trace!(source = %self.source_name, "Skipping link: {}", e);
                    continue;
                }
                Err(e) => {
                    tracing::warn!(source = %self.source_name, "Failed to process link: {}", e);
                    errors.push(e.into());
                    continue;
                }
            };

            let Some(name) = link.product else {
                continue;
            };

            let product = Product {
                source: self.source_name.clone(),
                name,
                url: link.url.to_string(),
            };

            if let Err(e) = options.recorder.record_product(&product) {
                tracing::warn!(
                    source = %self.source_name,
                    product = %product.name,
                    "Failed to record product: {}",
                    e
                );
                errors.push(e.into());
            }
        }
    }
}

#[async_trait]
impl Scraper for SimpleScraper {
    async fn scrape(
        &self,
        token: &CancellationToken,
        options: &ScrapeOptions,
    ) -> Result<(), ScrapeError> {
        if token.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let mut collector = Collector::new(
            Arc::clone(&self.fetcher),
            self.filter.clone(),
            self.max_concurrency,
        );

        collector
            .visit(&self.base_url)
            .map_err(|source| ScrapeError::BaseVisit {
                url: self.base_url.to_string(),
                source,
            })?;

        tracing::info!(source = %self.source_name, "Starting crawl at {}", self.base_url);

        let mut errors = Vec::new();
        let mut pages = 0usize;

        loop {
            let step = tokio::select! {
                biased;
                _ = token.cancelled() => Step::Cancelled,
                event = collector.next_event() => match event {
                    Some(event) => Step::Event(event),
                    None => Step::Drained,
                },
            };

            match step {
                Step::Drained => break,
                Step::Cancelled => {
                    tracing::warn!(
                        source = %self.source_name,
                        "Crawl cancelled with {} URLs still queued",
                        collector.queued_count()
                    );
                    collector.shutdown().await;
                    errors.push(ScrapeError::Cancelled);
                    break;
                }
                Step::Event(CrawlEvent::Failed { error }) => {
                    tracing::warn!(source = %self.source_name, "Fetch failed: {}", error);
                    errors.push(error.into());
                }
                Step::Event(CrawlEvent::Page { url, hrefs }) => {
                    pages += 1;
                    tracing::debug!(
                        source = %self.source_name,
                        "Visited {} ({} links)",
                        url,
                        hrefs.len()
                    );
                    self.process_page(&collector, token, options, &hrefs, &mut errors);
                }
            }
        }

        tracing::info!(
            source = %self.source_name,
            pages,
            errors = errors.len(),
            "Crawl finished"
        );

        ScrapeError::combine(errors)
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))
}

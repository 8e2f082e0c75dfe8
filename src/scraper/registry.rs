//! Scraper registry - the configured sources keyed by [`ScraperKind`]

use crate::crawler::PageFetcher;
use crate::scraper::simple::SimpleScraper;
use crate::scraper::target::{ScrapeTarget, ScraperKind};
use crate::scraper::Scraper;
use crate::ConfigError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Prebuilt scrapers for every configured kind
///
/// Scrapers are built once at startup; selecting them per run only clones
/// `Arc`s. Every scrape starts its own crawl, so the same scraper can serve
/// overlapping runs.
pub struct ScraperRegistry {
    scrapers: BTreeMap<ScraperKind, Arc<SimpleScraper>>,
}

impl ScraperRegistry {
    /// Builds a registry from explicit targets
    ///
    /// A later target for the same kind replaces an earlier one. Targets of
    /// kind [`ScraperKind::Unknown`] are rejected.
    pub fn new(
        targets: Vec<(ScraperKind, ScrapeTarget)>,
        fetcher: Arc<dyn PageFetcher>,
        max_concurrency: usize,
    ) -> Result<Self, ConfigError> {
        let mut scrapers = BTreeMap::new();

        for (kind, target) in targets {
            if !kind.is_known() {
                return Err(ConfigError::Validation(format!(
                    "target '{}' has no known scraper kind",
                    target.source_name
                )));
            }

            let scraper = SimpleScraper::new(&target, Arc::clone(&fetcher), max_concurrency)?;
            scrapers.insert(kind, Arc::new(scraper));
        }

        Ok(Self { scrapers })
    }

    /// Builds a registry holding every built-in target
    pub fn builtin(
        fetcher: Arc<dyn PageFetcher>,
        max_concurrency: usize,
    ) -> Result<Self, ConfigError> {
        Self::with_overrides(Vec::new(), fetcher, max_concurrency)
    }

    /// Builds the built-in registry with some targets replaced
    pub fn with_overrides(
        overrides: Vec<(ScraperKind, ScrapeTarget)>,
        fetcher: Arc<dyn PageFetcher>,
        max_concurrency: usize,
    ) -> Result<Self, ConfigError> {
        let targets = ScraperKind::BUILTIN
            .iter()
            .filter_map(|kind| ScrapeTarget::builtin(*kind).map(|t| (*kind, t)))
            .chain(overrides)
            .collect();

        Self::new(targets, fetcher, max_concurrency)
    }

    /// Returns the kinds a run request resolves to
    ///
    /// Unknown and unconfigured kinds are dropped and duplicates removed,
    /// keeping first-seen order. A request that reduces to nothing selects
    /// every configured kind.
    pub fn select(&self, requested: &[ScraperKind]) -> Vec<ScraperKind> {
        let mut selected = Vec::new();
        for kind in requested {
            if self.scrapers.contains_key(kind) && !selected.contains(kind) {
                selected.push(*kind);
            }
        }

        if selected.is_empty() {
            return self.kinds();
        }
        selected
    }

    /// Returns the scrapers a run request resolves to
    pub fn scrapers_for(&self, requested: &[ScraperKind]) -> Vec<Arc<dyn Scraper>> {
        self.select(requested)
            .into_iter()
            .filter_map(|kind| self.scrapers.get(&kind))
            .map(|scraper| Arc::clone(scraper) as Arc<dyn Scraper>)
            .collect()
    }

    pub fn get(&self, kind: ScraperKind) -> Option<Arc<SimpleScraper>> {
        self.scrapers.get(&kind).cloned()
    }

    /// Returns every configured kind in default run order
    pub fn kinds(&self) -> Vec<ScraperKind> {
        self.scrapers.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.scrapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scrapers.is_empty()
    }
}

//! Scraper module - per-site crawl units and their orchestration
//!
//! This module contains:
//! - The [`Scraper`] capability and the options every scrape receives
//! - [`HrefProcessor`]: turning a discovered href into a visit plus an optional product
//! - [`SimpleScraper`]: a scraper configured entirely by a [`ScrapeTarget`]
//! - [`ScraperRegistry`]: built-in targets keyed by [`ScraperKind`]
//! - [`ParallelRunner`]: runs many scrapers concurrently and aggregates their errors

mod processor;
mod registry;
mod runner;
mod simple;
mod target;

pub use processor::{DiscoveredLink, HrefProcessor, ProcessError, SimpleProcessor};
pub use registry::ScraperRegistry;
pub use runner::{ParallelRunner, Runner};
pub use simple::SimpleScraper;
pub use target::{ScrapeTarget, ScraperKind};

use crate::crawler::{FetchError, VisitError};
use crate::recorder::{DebugRecorder, RecordError, Recorder};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors surfaced by a scrape
///
/// Benign crawl declines (already visited, no filter match) never become a
/// `ScrapeError`. Everything else is kept, and a scrape or run that hits
/// several problems reports all of them through [`ScrapeError::Multiple`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("visiting base URL {url}: {source}")]
    BaseVisit { url: String, source: VisitError },

    #[error("processing link: {0}")]
    Process(#[from] ProcessError),

    #[error("fetching page: {0}")]
    Fetch(#[from] FetchError),

    #[error("recording product: {0}")]
    Record(#[from] RecordError),

    #[error("scrape cancelled")]
    Cancelled,

    #[error("scraper task failed: {0}")]
    Task(String),

    #[error("{}", join_errors(.0))]
    Multiple(Vec<ScrapeError>),
}

impl ScrapeError {
    /// Folds a batch of errors into one result
    ///
    /// Nested aggregates are flattened. No errors yields `Ok(())`, a single
    /// error is returned as-is, several become [`ScrapeError::Multiple`].
    pub fn combine<I>(errors: I) -> Result<(), ScrapeError>
    where
        I: IntoIterator<Item = ScrapeError>,
    {
        let mut flat = Vec::new();
        for error in errors {
            match error {
                Self::Multiple(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        match flat.len() {
            0 => Ok(()),
            1 => Err(flat.remove(0)),
            _ => Err(Self::Multiple(flat)),
        }
    }

    /// Returns every individual cause carried by this error
    pub fn causes(&self) -> Vec<&ScrapeError> {
        match self {
            Self::Multiple(inner) => inner.iter().flat_map(|e| e.causes()).collect(),
            other => vec![other],
        }
    }

    /// Returns true if any cause is a cancellation
    pub fn is_cancelled(&self) -> bool {
        self.causes()
            .iter()
            .any(|e| matches!(e, ScrapeError::Cancelled))
    }
}

fn join_errors(errors: &[ScrapeError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Options handed to every scrape of a run
#[derive(Clone)]
pub struct ScrapeOptions {
    /// Receives one call per discovered product
    pub recorder: Arc<dyn Recorder>,
}

impl ScrapeOptions {
    pub fn new(recorder: Arc<dyn Recorder>) -> Self {
        Self { recorder }
    }
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self::new(Arc::new(DebugRecorder::new()))
    }
}

impl std::fmt::Debug for ScrapeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeOptions").finish_non_exhaustive()
    }
}

/// A crawl unit for one external source
///
/// Implementations must check `token` before submitting each new visit and
/// return [`ScrapeError::Cancelled`] promptly once it fires. `scrape` returns
/// only after its crawl has fully drained or been aborted.
#[async_trait]
pub trait Scraper: Send + Sync {
    async fn scrape(
        &self,
        token: &CancellationToken,
        options: &ScrapeOptions,
    ) -> Result<(), ScrapeError>;
}

//! Runners - executing a set of scrapers as one run

use crate::scraper::{ScrapeError, ScrapeOptions, Scraper};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Executes a set of scrapers under one cancellation token
#[async_trait]
pub trait Runner: Send + Sync {
    /// Runs every scraper and waits for all of them
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every scraper succeeded
    /// * `Err(ScrapeError)` - One error per failed scraper, aggregated
    async fn run(
        &self,
        token: &CancellationToken,
        scrapers: Vec<Arc<dyn Scraper>>,
        options: &ScrapeOptions,
    ) -> Result<(), ScrapeError>;
}

/// Runner launching every scraper concurrently
///
/// One failing scraper never stops the others; the run returns only after
/// the last scraper has finished.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelRunner;

impl ParallelRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Runner for ParallelRunner {
    async fn run(
        &self,
        token: &CancellationToken,
        scrapers: Vec<Arc<dyn Scraper>>,
        options: &ScrapeOptions,
    ) -> Result<(), ScrapeError> {
        let total = scrapers.len();
        let mut tasks = JoinSet::new();

        for scraper in scrapers {
            let token = token.clone();
            let options = options.clone();
            tasks.spawn(async move { scraper.scrape(&token, &options).await });
        }

        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(e) => errors.push(ScrapeError::Task(e.to_string())),
            }
        }

        tracing::debug!("{} of {} scrapers failed", errors.len(), total);
        ScrapeError::combine(errors)
    }
}

//! Run lifecycle - submitting runs and driving them to a terminal status
//!
//! A submitted run is seeded as `in progress` before the caller gets its id,
//! then a detached task executes the selected scrapers and finalizes the run
//! as `success` or `failed`. Callers learn the outcome only by polling the
//! cache.

use crate::scraper::{Runner, ScrapeOptions, ScraperKind, ScraperRegistry};
use crate::server::cache::{RunCache, RunRecord};
use crate::state::RunStatus;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A run that was just submitted
#[derive(Debug)]
pub struct SubmittedRun {
    pub id: Uuid,

    /// Resolves to the final status once the run task finishes
    pub task: JoinHandle<RunStatus>,
}

/// Launches runs and answers status lookups
pub struct RunLauncher {
    cache: Arc<dyn RunCache>,
    registry: Arc<ScraperRegistry>,
    runner: Arc<dyn Runner>,
    options: ScrapeOptions,
    run_timeout: Option<Duration>,
    shutdown: CancellationToken,
}

impl RunLauncher {
    pub fn new(
        cache: Arc<dyn RunCache>,
        registry: Arc<ScraperRegistry>,
        runner: Arc<dyn Runner>,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            cache,
            registry,
            runner,
            options,
            run_timeout: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Bounds every run by a deadline; expiry cancels the run's scrapers
    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    /// Ties every run to a parent token, so cancelling it cancels all runs
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Submits a run for the requested scraper kinds
    ///
    /// The run is recorded as `in progress` before this returns. Must be
    /// called from within a tokio runtime.
    pub fn submit(&self, requested: &[ScraperKind]) -> SubmittedRun {
        let id = Uuid::new_v4();
        let kinds = self.registry.select(requested);
        let scrapers = self.registry.scrapers_for(&kinds);

        self.cache.upsert(id, RunStatus::InProgress);
        tracing::info!(run_id = %id, scrapers = ?kinds, "Run submitted");

        let cache = Arc::clone(&self.cache);
        let runner = Arc::clone(&self.runner);
        let options = self.options.clone();
        let token = self.shutdown.child_token();
        let run_timeout = self.run_timeout;

        let task = tokio::spawn(async move {
            let deadline = run_timeout.map(|timeout| {
                let token = token.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(timeout).await;
                    tracing::warn!(run_id = %id, "Run deadline of {:?} reached, cancelling", timeout);
                    token.cancel();
                })
            });

            let result = runner.run(&token, scrapers, &options).await;

            if let Some(deadline) = deadline {
                deadline.abort();
            }

            let status = match result {
                Ok(()) => {
                    tracing::info!(run_id = %id, "Run succeeded");
                    RunStatus::Success
                }
                Err(e) => {
                    tracing::error!(run_id = %id, error = %e, "Run failed");
                    RunStatus::Failed
                }
            };

            if let Err(e) = cache.finalize(id, status) {
                tracing::warn!(run_id = %id, "Could not finalize run: {}", e);
            }

            status
        });

        SubmittedRun { id, task }
    }

    /// Returns the current record of a run
    pub fn status(&self, id: Uuid) -> Option<RunRecord> {
        self.cache.get(id)
    }
}

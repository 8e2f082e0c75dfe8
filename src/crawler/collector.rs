//! Collector - the crawling engine driven by each scraper
//!
//! A collector owns one crawl's visit queue. Callers submit URLs with
//! [`Collector::visit`]; the collector fetches them concurrently and hands
//! back one [`CrawlEvent`] per finished request from
//! [`Collector::next_event`]. When the queue is empty and nothing is in
//! flight, `next_event` returns `None`: the crawl has drained.

use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::crawler::parser::extract_hrefs;
use crate::url::{visit_key, UrlFilter};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinSet;
use url::Url;

/// Reasons a collector declines a visit
///
/// Both are expected during any crawl and are not failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VisitError {
    #[error("URL already visited: {0}")]
    AlreadyVisited(String),

    #[error("No URL filters match: {0}")]
    NoFilterMatch(String),
}

impl VisitError {
    /// Returns true for the declines a crawl should silently ignore
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::AlreadyVisited(_) | Self::NoFilterMatch(_))
    }
}

/// Outcome of one finished request
#[derive(Debug)]
pub enum CrawlEvent {
    /// A page was fetched; `hrefs` holds its raw hyperlinks
    Page { url: Url, hrefs: Vec<String> },

    /// A request failed
    Failed { error: FetchError },
}

/// A fetched page reduced to what the crawl needs
struct VisitedPage {
    url: Url,
    hrefs: Vec<String>,
}

/// Visit queue, allow-list and visited-set for one crawl
pub struct Collector {
    fetcher: Arc<dyn PageFetcher>,
    filter: UrlFilter,
    max_concurrency: usize,
    visited: Mutex<HashSet<String>>,
    queue: Mutex<VecDeque<Url>>,
    in_flight: JoinSet<Result<VisitedPage, FetchError>>,
}

impl Collector {
    /// Creates a collector
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Capability used for every request
    /// * `filter` - Allow-list every visited URL must match
    /// * `max_concurrency` - Maximum number of requests in flight (at least 1)
    pub fn new(fetcher: Arc<dyn PageFetcher>, filter: UrlFilter, max_concurrency: usize) -> Self {
        Self {
            fetcher,
            filter,
            max_concurrency: max_concurrency.max(1),
            visited: Mutex::new(HashSet::new()),
            queue: Mutex::new(VecDeque::new()),
            in_flight: JoinSet::new(),
        }
    }

    /// Submits a URL to the visit queue
    ///
    /// The URL is marked visited on acceptance, so a second submission of the
    /// same page is declined even if the first request has not finished yet.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The URL was queued
    /// * `Err(VisitError::NoFilterMatch)` - No allow pattern matches the URL
    /// * `Err(VisitError::AlreadyVisited)` - The page was already submitted
    pub fn visit(&self, url: &Url) -> Result<(), VisitError> {
        if !self.filter.allows(url) {
            return Err(VisitError::NoFilterMatch(url.to_string()));
        }

        let key = visit_key(url);
        {
            let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
            if !visited.insert(key) {
                return Err(VisitError::AlreadyVisited(url.to_string()));
            }
        }

        tracing::trace!("Queued {}", url);
        self.queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(url.clone());

        Ok(())
    }

    /// Waits for the next finished request
    ///
    /// Returns `None` once the queue is empty and no request is in flight.
    /// Cancel-safe: dropping the future loses no queued or finished work.
    pub async fn next_event(&mut self) -> Option<CrawlEvent> {
        loop {
            self.spawn_queued();

            match self.in_flight.join_next().await? {
                Ok(Ok(page)) => {
                    return Some(CrawlEvent::Page {
                        url: page.url,
                        hrefs: page.hrefs,
                    })
                }
                Ok(Err(error)) => return Some(CrawlEvent::Failed { error }),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => {
                    return Some(CrawlEvent::Failed {
                        error: FetchError::Task(e.to_string()),
                    })
                }
            }
        }
    }

    /// Drops every queued URL and aborts requests in flight
    pub async fn shutdown(&mut self) {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).clear();
        self.in_flight.shutdown().await;
    }

    /// Returns the number of distinct pages accepted so far
    pub fn visited_count(&self) -> usize {
        self.visited.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// Returns the number of URLs waiting for a free request slot
    pub fn queued_count(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Moves queued URLs into flight until the concurrency limit is reached
    fn spawn_queued(&mut self) {
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());

        while self.in_flight.len() < self.max_concurrency {
            let Some(url) = queue.pop_front() else {
                break;
            };

            let fetcher = Arc::clone(&self.fetcher);
            self.in_flight.spawn(async move {
                tracing::debug!("Fetching {}", url);
                let page = fetcher.fetch(&url).await?;

                let hrefs = if page.is_html() {
                    extract_hrefs(&page.body)
                } else {
                    tracing::debug!("Skipping link extraction for non-HTML {}", page.url);
                    Vec::new()
                };

                Ok(VisitedPage {
                    url: page.url,
                    hrefs,
                })
            });
        }
    }
}

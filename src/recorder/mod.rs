//! Product recording
//!
//! Every product a scraper discovers is handed to a [`Recorder`]. The recorder
//! decides what to do with it: [`DebugRecorder`] logs it, [`MatchCounter`]
//! counts it for the metrics endpoint.

mod counter;

pub use counter::MatchCounter;

use serde::Serialize;
use thiserror::Error;

/// Errors a recorder can surface back to the scraper
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Recorder rejected product: {0}")]
    Rejected(String),

    #[error("Recorder state is poisoned")]
    Poisoned,
}

/// A discovered catalog item
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Product {
    /// Tag of the source site (e.g. `truphae`)
    pub source: String,

    /// Product slug extracted from the URL path
    pub name: String,

    /// Resolved absolute URL of the product page
    pub url: String,
}

/// Capability receiving one event per discovered product
pub trait Recorder: Send + Sync {
    fn record_product(&self, product: &Product) -> Result<(), RecordError>;
}

/// Recorder that only logs what it receives
///
/// Used when a scrape is started without an explicit recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugRecorder;

impl DebugRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl Recorder for DebugRecorder {
    fn record_product(&self, product: &Product) -> Result<(), RecordError> {
        tracing::info!(
            source = %product.source,
            name = %product.name,
            url = %product.url,
            "Discovered product"
        );
        Ok(())
    }
}

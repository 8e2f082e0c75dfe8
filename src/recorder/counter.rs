use crate::recorder::{Product, RecordError, Recorder};
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Mutex;

/// Name of the exported counter
const METRIC_NAME: &str = "pen_finder_matches";

/// Metrics sink counting product matches keyed by (source, name, url)
///
/// The same product seen again by a later run bumps the existing counter.
#[derive(Debug, Default)]
pub struct MatchCounter {
    matches: Mutex<HashMap<Product, u64>>,
}

impl MatchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times a product has been recorded
    pub fn count(&self, source: &str, name: &str, url: &str) -> u64 {
        let key = Product {
            source: source.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        };

        self.matches
            .lock()
            .map(|m| m.get(&key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Returns the total number of recorded matches across all products
    pub fn total(&self) -> u64 {
        self.matches
            .lock()
            .map(|m| m.values().sum())
            .unwrap_or(0)
    }

    /// Renders every counter in the Prometheus text exposition format
    ///
    /// Series are sorted so the output is stable between scrapes.
    pub fn render(&self) -> String {
        let mut series: Vec<(Product, u64)> = match self.matches.lock() {
            Ok(m) => m.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            Err(_) => Vec::new(),
        };
        series.sort();

        let mut out = String::new();
        let _ = writeln!(out, "# HELP {} Products discovered by scrapers.", METRIC_NAME);
        let _ = writeln!(out, "# TYPE {} counter", METRIC_NAME);
        for (product, count) in series {
            let _ = writeln!(
                out,
                "{}{{source=\"{}\",name=\"{}\",url=\"{}\"}} {}",
                METRIC_NAME,
                escape_label(&product.source),
                escape_label(&product.name),
                escape_label(&product.url),
                count
            );
        }

        out
    }
}

impl Recorder for MatchCounter {
    fn record_product(&self, product: &Product) -> Result<(), RecordError> {
        let mut matches = self.matches.lock().map_err(|_| RecordError::Poisoned)?;
        *matches.entry(product.clone()).or_insert(0) += 1;
        Ok(())
    }
}

/// Escapes a label value for the text exposition format
fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Allow-list of URL patterns bounding which links a crawl may visit
///
/// A URL is allowed when at least one pattern matches it. An empty filter
/// allows everything.
///
/// # Examples
///
/// ```
/// use pen_finder::url::UrlFilter;
/// use url::Url;
///
/// let filter = UrlFilter::new(&[r"https://example\.com/pens/.*"]).unwrap();
/// assert!(filter.allows(&Url::parse("https://example.com/pens/page/2").unwrap()));
/// assert!(!filter.allows(&Url::parse("https://example.com/inks/").unwrap()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    patterns: Vec<Regex>,
}

impl UrlFilter {
    /// Compiles a filter from regex patterns
    ///
    /// # Returns
    ///
    /// * `Ok(UrlFilter)` - Every pattern compiled
    /// * `Err(ConfigError::InvalidPattern)` - The first pattern that failed to compile
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|e| {
                    ConfigError::InvalidPattern(format!("'{}': {}", p.as_ref(), e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Returns a filter that allows every URL
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks whether a URL matches the allow-list
    pub fn allows(&self, url: &Url) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.is_match(url.as_str()))
    }

    /// Returns the number of patterns in the filter
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the filter has no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

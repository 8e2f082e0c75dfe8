use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Selector token naming one built-in scraper
///
/// Unrecognized tokens decode to [`ScraperKind::Unknown`] instead of failing,
/// so a request naming a scraper this build does not know still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScraperKind {
    ChatterlyLuxuries,
    FountainPenHospital,
    Truphae,
    Unknown,
}

impl ScraperKind {
    /// Every kind backed by a built-in target, in default run order
    pub const BUILTIN: [ScraperKind; 3] = [
        Self::ChatterlyLuxuries,
        Self::FountainPenHospital,
        Self::Truphae,
    ];

    /// Returns the wire token for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatterlyLuxuries => "chatterly luxuries",
            Self::FountainPenHospital => "fountain pen hospital",
            Self::Truphae => "truphae",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a wire token to a kind
    pub fn from_token(token: &str) -> Self {
        match token {
            "chatterly luxuries" => Self::ChatterlyLuxuries,
            "fountain pen hospital" => Self::FountainPenHospital,
            "truphae" => Self::Truphae,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ScraperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ScraperKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScraperKind {
    /// Accepts any value: strings map to their kind, everything else is `Unknown`
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::from_token).unwrap_or(Self::Unknown))
    }
}

/// Configuration of one crawlable source
///
/// Immutable data; a [`SimpleScraper`](crate::scraper::SimpleScraper) is
/// built from it once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScrapeTarget {
    /// Tag attached to every product from this source
    pub source_name: String,

    /// Page the crawl starts from
    pub base_url: String,

    /// Regex patterns bounding which links the crawl may visit
    pub allow: Vec<String>,

    /// Base URL relative hrefs are resolved against
    pub product_base_url: String,

    /// Path prefix identifying product pages
    pub product_path_prefix: String,
}

impl ScrapeTarget {
    /// Returns the built-in target for a kind
    pub fn builtin(kind: ScraperKind) -> Option<Self> {
        match kind {
            ScraperKind::ChatterlyLuxuries => Some(Self {
                source_name: "chatterly_luxuries".to_string(),
                base_url: "https://chatterleyluxuries.com/product-category/pens/consignments"
                    .to_string(),
                allow: vec![
                    r"https://chatterleyluxuries\.com/product-category/pens/consignments.*"
                        .to_string(),
                    r"https://chatterleyluxuries\.com/product/.*".to_string(),
                ],
                product_base_url: "https://chatterleyluxuries.com".to_string(),
                product_path_prefix: "/product/".to_string(),
            }),
            ScraperKind::FountainPenHospital => Some(Self {
                source_name: "fountain_pen_hospital".to_string(),
                base_url: "https://fountainpenhospital.com/collections/back-room-1".to_string(),
                allow: vec![
                    r"https://fountainpenhospital\.com/collections/back-room-1.*".to_string(),
                ],
                product_base_url: "https://fountainpenhospital.com".to_string(),
                product_path_prefix: "/collections/back-room-1/products/".to_string(),
            }),
            ScraperKind::Truphae => Some(Self {
                source_name: "truphae".to_string(),
                base_url: "https://truphaeinc.com/collections/pre-owned-pens".to_string(),
                allow: vec![r"https://truphaeinc\.com/collections/pre-owned-pens.*".to_string()],
                product_base_url: "https://truphaeinc.com/".to_string(),
                product_path_prefix: "/collections/pre-owned-pens/products/".to_string(),
            }),
            ScraperKind::Unknown => None,
        }
    }
}

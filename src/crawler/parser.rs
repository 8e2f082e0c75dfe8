//! HTML parser for discovering hyperlinks
//!
//! Hrefs are returned raw, exactly as written in the page. Resolving them is
//! the job of the scraper's href processor, which knows the base URL to
//! resolve against.

use scraper::{Html, Selector};

/// Extracts the `href` of every `<a>` element in an HTML document
///
/// Links carrying a `download` attribute are skipped; everything else is
/// returned in document order, duplicates included.
///
/// # Example
///
/// ```
/// use pen_finder::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/product/acme-141/">Acme</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/product/acme-141/".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| element.value().attr("download").is_none())
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

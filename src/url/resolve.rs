use crate::UrlError;
use url::Url;

/// Resolves a discovered href against a base URL
///
/// Relative hrefs are joined onto `base`; absolute hrefs are kept as they are.
///
/// Returns `Ok(None)` for hrefs that can never lead to a page:
/// - empty hrefs and same-page anchors (`#...`)
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - anything that resolves to a non-HTTP(S) scheme
///
/// # Examples
///
/// ```
/// use pen_finder::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://chatterleyluxuries.com").unwrap();
/// let link = resolve_href("/product/acme-141/", &base).unwrap().unwrap();
/// assert_eq!(link.as_str(), "https://chatterleyluxuries.com/product/acme-141/");
/// ```
pub fn resolve_href(href: &str, base: &Url) -> Result<Option<Url>, UrlError> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return Ok(None);
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return Ok(None);
    }

    let resolved = base
        .join(href)
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;

    match resolved.scheme() {
        "http" | "https" => Ok(Some(resolved)),
        _ => Ok(None),
    }
}

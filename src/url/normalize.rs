use url::{form_urlencoded, Url};

/// List of tracking query parameters ignored when comparing links
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "_pos",
    "_sid",
    "_ss",
];

/// Computes the key under which a URL is remembered as visited
///
/// Two links with the same key are the same page as far as a crawl is
/// concerned, so the second one is declined as already visited.
///
/// # Normalization Steps
///
/// 1. Remove fragment (everything after #)
/// 2. Normalize path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
/// 3. Remove tracking query parameters
/// 4. Sort remaining query parameters alphabetically
///
/// The scheme and host are kept; the `url` crate already lower-cases hosts.
///
/// # Examples
///
/// ```
/// use pen_finder::url::visit_key;
/// use url::Url;
///
/// let a = Url::parse("https://example.com/products/acme/#reviews").unwrap();
/// let b = Url::parse("https://EXAMPLE.com/products/acme").unwrap();
/// assert_eq!(visit_key(&a), visit_key(&b));
/// ```
pub fn visit_key(url: &Url) -> String {
    let mut url = url.clone();

    url.set_fragment(None);

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            let query_string = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&params)
                .finish();
            url.set_query(Some(&query_string));
        }
    }

    url.into()
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

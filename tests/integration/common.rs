use pen_finder::config::CrawlerConfig;
use pen_finder::crawler::{HttpFetcher, PageFetcher};
use pen_finder::scraper::ScrapeTarget;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Listing path every mock shop serves its catalog under
pub const LISTING: &str = "/collections/pens";

/// Product prefix of every mock shop
pub const PRODUCTS: &str = "/collections/pens/products/";

/// Builds a target crawling the mock shop behind `server`
pub fn shop_target(server: &MockServer, source_name: &str) -> ScrapeTarget {
    let uri = server.uri();
    ScrapeTarget {
        source_name: source_name.to_string(),
        base_url: format!("{}{}", uri, LISTING),
        allow: vec![format!("{}{}.*", regex::escape(&uri), LISTING)],
        product_base_url: uri,
        product_path_prefix: PRODUCTS.to_string(),
    }
}

pub fn http_fetcher() -> Arc<dyn PageFetcher> {
    let config = CrawlerConfig {
        request_timeout_secs: 5,
        ..CrawlerConfig::default()
    };
    Arc::new(HttpFetcher::new(&config).expect("Failed to build HTTP client"))
}

/// Mounts an HTML page
pub async fn mount_html(server: &MockServer, page_path: &str, body: &str) {
    mount_html_delayed(server, page_path, body, Duration::ZERO).await;
}

/// Mounts an HTML page answered after `delay`
pub async fn mount_html_delayed(server: &MockServer, page_path: &str, body: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    format!("<html><body>{}</body></html>", body),
                    "text/html; charset=utf-8",
                )
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Mounts a one-listing shop offering a single product
pub async fn mount_single_product_shop(server: &MockServer, product: &str) {
    mount_html(
        server,
        LISTING,
        &format!(r#"<a href="{}{}">{}</a>"#, PRODUCTS, product, product),
    )
    .await;
    mount_html(server, &format!("{}{}", PRODUCTS, product), "<h1>pen</h1>").await;
}

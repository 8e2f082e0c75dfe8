//! Scrape and runner tests against mock shops

use crate::common::{
    http_fetcher, mount_html, mount_single_product_shop, shop_target, LISTING, PRODUCTS,
};
use pen_finder::crawler::FetchError;
use pen_finder::recorder::MatchCounter;
use pen_finder::scraper::{
    ParallelRunner, Runner, ScrapeError, ScrapeOptions, Scraper, SimpleScraper,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_scrape_follows_listing_pages() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        LISTING,
        &format!(
            r##"<a href="{listing}/page/2">Next</a>
               <a href="{products}acme-141">Acme 141</a>
               <a href="/pages/about">About</a>
               <a href="mailto:shop@example.com">Mail</a>
               <a href="#top">Top</a>"##,
            listing = LISTING,
            products = PRODUCTS
        ),
    )
    .await;

    mount_html(
        &server,
        &format!("{}/page/2", LISTING),
        &format!(
            r#"<a href="{listing}">Back</a>
               <a href="{products}acme-141/">Acme 141 again</a>
               <a href="{uri}{products}sailor-kop">Sailor</a>"#,
            listing = LISTING,
            products = PRODUCTS,
            uri = uri
        ),
    )
    .await;

    mount_html(&server, &format!("{}acme-141", PRODUCTS), "<h1>Acme</h1>").await;
    mount_html(&server, &format!("{}sailor-kop", PRODUCTS), "<h1>Sailor</h1>").await;

    // outside the allow-list, must never be fetched
    Mock::given(method("GET"))
        .and(path("/pages/about"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let scraper = SimpleScraper::new(&shop_target(&server, "shop"), http_fetcher(), 2)
        .expect("Failed to build scraper");
    let counter = Arc::new(MatchCounter::new());

    scraper
        .scrape(&CancellationToken::new(), &ScrapeOptions::new(counter.clone()))
        .await
        .expect("Scrape failed");

    assert_eq!(counter.total(), 2);
    assert_eq!(
        counter.count("shop", "acme-141", &format!("{}{}acme-141", uri, PRODUCTS)),
        1
    );
    assert_eq!(
        counter.count("shop", "sailor-kop", &format!("{}{}sailor-kop", uri, PRODUCTS)),
        1
    );
}

#[tokio::test]
async fn test_non_product_links_are_not_recorded() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        LISTING,
        &format!(r#"<a href="{}/page/2">Next</a>"#, LISTING),
    )
    .await;
    mount_html(&server, &format!("{}/page/2", LISTING), "no links").await;

    let scraper = SimpleScraper::new(&shop_target(&server, "shop"), http_fetcher(), 2).unwrap();
    let counter = Arc::new(MatchCounter::new());

    scraper
        .scrape(&CancellationToken::new(), &ScrapeOptions::new(counter.clone()))
        .await
        .unwrap();

    assert_eq!(counter.total(), 0);
}

#[tokio::test]
async fn test_content_type_handling() {
    let server = MockServer::start().await;

    // links inside a JSON body are never followed
    Mock::given(method("GET"))
        .and(path(LISTING))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    format!(r#"{{"html": "<a href=\"{}acme-141\">x</a>"}}"#, PRODUCTS),
                    "application/json",
                ),
        )
        .mount(&server)
        .await;

    let scraper = SimpleScraper::new(&shop_target(&server, "shop"), http_fetcher(), 2).unwrap();
    let counter = Arc::new(MatchCounter::new());

    scraper
        .scrape(&CancellationToken::new(), &ScrapeOptions::new(counter.clone()))
        .await
        .unwrap();

    assert_eq!(counter.total(), 0);
}

#[tokio::test]
async fn test_server_error_surfaces_without_stopping_crawl() {
    let server = MockServer::start().await;

    mount_html(
        &server,
        LISTING,
        &format!(
            r#"<a href="{p}broken">Broken</a><a href="{p}working">Working</a>"#,
            p = PRODUCTS
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(format!("{}broken", PRODUCTS)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(&server, &format!("{}working", PRODUCTS), "<h1>ok</h1>").await;

    let scraper = SimpleScraper::new(&shop_target(&server, "shop"), http_fetcher(), 2).unwrap();
    let counter = Arc::new(MatchCounter::new());

    let err = scraper
        .scrape(&CancellationToken::new(), &ScrapeOptions::new(counter.clone()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::Fetch(FetchError::Status {
            status_code: 500,
            ..
        })
    ));
    // a product is recorded when its link is discovered, not when it is fetched
    assert_eq!(counter.total(), 2);
}

#[tokio::test]
async fn test_runner_all_succeed() {
    let mut servers = Vec::new();
    let mut scrapers: Vec<Arc<dyn Scraper>> = Vec::new();

    for (i, product) in ["acme-141", "sailor-kop", "pilot-743"].iter().enumerate() {
        let server = MockServer::start().await;
        mount_single_product_shop(&server, product).await;
        let target = shop_target(&server, &format!("shop_{}", i));
        scrapers.push(Arc::new(SimpleScraper::new(&target, http_fetcher(), 2).unwrap()));
        servers.push(server);
    }

    let counter = Arc::new(MatchCounter::new());
    ParallelRunner::new()
        .run(
            &CancellationToken::new(),
            scrapers,
            &ScrapeOptions::new(counter.clone()),
        )
        .await
        .expect("Run failed");

    assert_eq!(counter.total(), 3);
}

#[tokio::test]
async fn test_runner_one_failing_scraper() {
    let good_a = MockServer::start().await;
    let good_b = MockServer::start().await;
    let broken = MockServer::start().await;

    mount_single_product_shop(&good_a, "acme-141").await;
    mount_single_product_shop(&good_b, "sailor-kop").await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&broken)
        .await;

    let scrapers: Vec<Arc<dyn Scraper>> = vec![
        Arc::new(SimpleScraper::new(&shop_target(&good_a, "a"), http_fetcher(), 2).unwrap()),
        Arc::new(SimpleScraper::new(&shop_target(&broken, "broken"), http_fetcher(), 2).unwrap()),
        Arc::new(SimpleScraper::new(&shop_target(&good_b, "b"), http_fetcher(), 2).unwrap()),
    ];

    let counter = Arc::new(MatchCounter::new());
    let err = ParallelRunner::new()
        .run(
            &CancellationToken::new(),
            scrapers,
            &ScrapeOptions::new(counter.clone()),
        )
        .await
        .unwrap_err();

    assert_eq!(err.causes().len(), 1);
    assert!(err.to_string().contains("503"));

    // the other scrapers' products were still recorded
    assert_eq!(counter.total(), 2);
    let metrics = counter.render();
    assert!(metrics.contains(r#"source="a",name="acme-141""#));
    assert!(metrics.contains(r#"source="b",name="sailor-kop""#));
}

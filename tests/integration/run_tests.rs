//! Run lifecycle tests driving the HTTP API in-process

use crate::common::{
    http_fetcher, mount_html_delayed, mount_single_product_shop, shop_target, LISTING, PRODUCTS,
};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use pen_finder::recorder::MatchCounter;
use pen_finder::scraper::{ParallelRunner, ScrapeOptions, ScraperKind, ScraperRegistry};
use pen_finder::server::{router, AppState, RunLauncher, RunStatusCache};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::MockServer;

/// One mock shop standing in for every built-in source
struct Shops {
    servers: Vec<(ScraperKind, MockServer)>,
}

impl Shops {
    /// Starts a shop per built-in kind, each offering one product
    async fn start() -> Self {
        let mut servers = Vec::new();
        for kind in ScraperKind::BUILTIN {
            let server = MockServer::start().await;
            mount_single_product_shop(&server, "acme-141").await;
            servers.push((kind, server));
        }
        Self { servers }
    }

    fn registry(&self) -> ScraperRegistry {
        let overrides = self
            .servers
            .iter()
            .map(|(kind, server)| (*kind, shop_target(server, kind.as_str())))
            .collect();
        ScraperRegistry::with_overrides(overrides, http_fetcher(), 2)
            .expect("Failed to build registry")
    }

    async fn requests_to(&self, kind: ScraperKind) -> usize {
        let (_, server) = self
            .servers
            .iter()
            .find(|(k, _)| *k == kind)
            .expect("No shop for kind");
        server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}

fn build_app(registry: ScraperRegistry, run_timeout: Option<Duration>) -> (Router, Arc<MatchCounter>) {
    let metrics = Arc::new(MatchCounter::new());
    let launcher = RunLauncher::new(
        Arc::new(RunStatusCache::new()),
        Arc::new(registry),
        Arc::new(ParallelRunner::new()),
        ScrapeOptions::new(metrics.clone()),
    )
    .with_run_timeout(run_timeout);

    let state = Arc::new(AppState::new(launcher, metrics.clone()));
    (router(state), metrics)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router failed");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, body.to_vec())
}

async fn post_run(app: &Router, body: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/run/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    json["runID"].as_str().expect("runID missing").to_string()
}

async fn get_run(app: &Router, id: &str) -> (StatusCode, Option<Value>) {
    let request = Request::builder()
        .uri(format!("/run/{}", id))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    let json = serde_json::from_slice(&body).ok();
    (status, json)
}

/// Polls a run until it leaves `in progress`
async fn wait_for_terminal(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let (status, json) = get_run(app, id).await;
        assert_eq!(status, StatusCode::OK);
        let json = json.unwrap();
        if json["status"] != "in progress" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("run {} never finished", id);
}

fn last_updated(json: &Value) -> DateTime<Utc> {
    json["lastUpdated"]
        .as_str()
        .unwrap()
        .parse()
        .expect("lastUpdated is not a timestamp")
}

#[tokio::test]
async fn test_run_lifecycle_success() {
    let server = MockServer::start().await;
    mount_html_delayed(
        &server,
        LISTING,
        &format!(r#"<a href="{}acme-141">Acme</a>"#, PRODUCTS),
        Duration::from_millis(200),
    )
    .await;
    mount_html_delayed(
        &server,
        &format!("{}acme-141", PRODUCTS),
        "<h1>Acme</h1>",
        Duration::ZERO,
    )
    .await;

    let registry = ScraperRegistry::with_overrides(
        vec![(
            ScraperKind::FountainPenHospital,
            shop_target(&server, "fountain_pen_hospital"),
        )],
        http_fetcher(),
        2,
    )
    .unwrap();
    let (app, metrics) = build_app(registry, None);

    let id = post_run(&app, r#"{"scrapers": ["fountain pen hospital"]}"#).await;

    let (status, json) = get_run(&app, &id).await;
    assert_eq!(status, StatusCode::OK);
    let seeded = json.unwrap();
    assert_eq!(seeded["id"], id.as_str());
    assert_eq!(seeded["status"], "in progress");

    let done = wait_for_terminal(&app, &id).await;
    assert_eq!(done["status"], "success");
    assert!(last_updated(&done) > last_updated(&seeded));

    assert_eq!(metrics.total(), 1);
}

#[tokio::test]
async fn test_run_lifecycle_failure() {
    let server = MockServer::start().await;
    // listing exists but its only product 404s
    mount_html_delayed(
        &server,
        LISTING,
        &format!(r#"<a href="{}gone">Gone</a>"#, PRODUCTS),
        Duration::ZERO,
    )
    .await;

    let registry = ScraperRegistry::with_overrides(
        vec![(ScraperKind::Truphae, shop_target(&server, "truphae"))],
        http_fetcher(),
        2,
    )
    .unwrap();
    let (app, _) = build_app(registry, None);

    let id = post_run(&app, r#"{"scrapers": ["truphae"]}"#).await;

    let done = wait_for_terminal(&app, &id).await;
    assert_eq!(done["status"], "failed");
}

#[tokio::test]
async fn test_run_deadline_fails_run() {
    let server = MockServer::start().await;
    mount_html_delayed(&server, LISTING, "slow", Duration::from_secs(30)).await;

    let registry = ScraperRegistry::with_overrides(
        vec![(ScraperKind::Truphae, shop_target(&server, "truphae"))],
        http_fetcher(),
        1,
    )
    .unwrap();
    let (app, _) = build_app(registry, Some(Duration::from_millis(200)));

    let id = post_run(&app, r#"{"scrapers": ["truphae"]}"#).await;

    let done = wait_for_terminal(&app, &id).await;
    assert_eq!(done["status"], "failed");
}

#[tokio::test]
async fn test_bogus_token_selects_default_scrapers() {
    for body in [r#"{"scrapers": ["bogus-token"]}"#, r#"{"scrapers": []}"#, "{}"] {
        let shops = Shops::start().await;
        let (app, metrics) = build_app(shops.registry(), None);

        let id = post_run(&app, body).await;
        let done = wait_for_terminal(&app, &id).await;
        assert_eq!(done["status"], "success", "body {}", body);

        for kind in ScraperKind::BUILTIN {
            assert_eq!(shops.requests_to(kind).await, 2, "{} for body {}", kind, body);
        }
        assert_eq!(metrics.total(), 3);
    }
}

#[tokio::test]
async fn test_duplicate_tokens_run_once() {
    let shops = Shops::start().await;
    let (app, metrics) = build_app(shops.registry(), None);

    let id = post_run(&app, r#"{"scrapers": ["truphae", "bogus-token", "truphae"]}"#).await;
    let done = wait_for_terminal(&app, &id).await;
    assert_eq!(done["status"], "success");

    assert_eq!(shops.requests_to(ScraperKind::Truphae).await, 2);
    assert_eq!(shops.requests_to(ScraperKind::ChatterlyLuxuries).await, 0);
    assert_eq!(shops.requests_to(ScraperKind::FountainPenHospital).await, 0);
    assert_eq!(metrics.total(), 1);
}

#[tokio::test]
async fn test_malformed_post_rejected() {
    let shops = Shops::start().await;
    let (app, _) = build_app(shops.registry(), None);

    let request = Request::builder()
        .method("POST")
        .uri("/run/")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // no run was started
    for kind in ScraperKind::BUILTIN {
        assert_eq!(shops.requests_to(kind).await, 0);
    }
}

#[tokio::test]
async fn test_get_unparseable_id() {
    let shops = Shops::start().await;
    let (app, _) = build_app(shops.registry(), None);

    let (status, _) = get_run(&app, "not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_id() {
    let shops = Shops::start().await;
    let (app, _) = build_app(shops.registry(), None);

    let (status, _) = get_run(&app, &uuid::Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_and_health() {
    let shops = Shops::start().await;
    let (app, _) = build_app(shops.registry(), None);

    let id = post_run(&app, r#"{"scrapers": ["chatterly luxuries"]}"#).await;
    wait_for_terminal(&app, &id).await;

    let (status, body) = send(
        &app,
        Request::builder().uri("/metrics").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("# TYPE pen_finder_matches counter"));
    assert!(text.contains(r#"source="chatterly luxuries",name="acme-141""#));

    let (status, body) = send(
        &app,
        Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

//! Integration tests for pagecheck-browser
//!
//! These tests need a real browser and are marked #[ignore] by default.
//! CDP tests require Chrome/Chromium; WebDriver tests require a WebDriver
//! server on localhost:4444. Run with:
//! cargo test --package pagecheck-browser -- --ignored

use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use pagecheck_browser::{
    Backend, BrowserConfig, BrowserLauncher, Driver, Launcher, NavigationOutcome, RawSignal,
    ReadyCondition, ResourceKind, SignalLevel, SignalSource,
};
use std::time::Duration;

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(10);

const FIXTURE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Fixture</title></head>
<body>
    <img src="/missing.png">
    <script>
        console.log("fixture loaded");
        console.warn("deprecated API");
        console.error("something broke");
    </script>
</body>
</html>"#;

/// Starts a fixture server on an ephemeral port and returns its base URL.
async fn serve_fixture() -> String {
    let app = Router::new()
        .route("/", get(|| async { Html(FIXTURE_PAGE) }))
        .route(
            "/gone",
            get(|| async { (StatusCode::GONE, Html("<p>gone</p>")) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fixture server");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fixture server failed");
    });

    format!("http://{addr}")
}

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

async fn launch(backend: Backend) -> Box<dyn Driver> {
    BrowserLauncher::new(BrowserConfig::default())
        .launch(backend)
        .await
        .expect("failed to launch backend")
}

async fn wait_ready(driver: &mut dyn Driver) {
    let deadline = tokio::time::Instant::now() + NAVIGATION_TIMEOUT;
    while !driver.is_ready(&ReadyCondition::Load).await.unwrap_or(false) {
        assert!(tokio::time::Instant::now() < deadline, "page never became ready");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Drains both queues for a short settle period.
async fn collect(driver: &mut dyn Driver) -> Vec<RawSignal> {
    let mut signals = Vec::new();
    for _ in 0..5 {
        signals.extend(driver.drain_console().await.expect("console drain"));
        signals.extend(driver.drain_network().await.expect("network drain"));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    signals
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn cdp_captures_console_and_page_errors() {
    let mut driver = launch(Backend::Cdp).await;

    let html = r#"<script>
        console.warn("careful");
        setTimeout(() => { null.boom(); }, 0);
    </script>"#;
    let outcome = driver
        .navigate(&data_url(html), NAVIGATION_TIMEOUT)
        .await
        .expect("navigation failed");
    assert_eq!(outcome, NavigationOutcome::Loaded { status: None });

    wait_ready(driver.as_mut()).await;
    let signals = collect(driver.as_mut()).await;

    assert!(signals
        .iter()
        .any(|s| s.level == SignalLevel::Warning && s.message == "careful"));
    assert!(signals
        .iter()
        .any(|s| s.source == SignalSource::PageError && s.message.starts_with("Uncaught TypeError")));

    driver.shutdown().await.expect("shutdown");
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn cdp_reports_missing_markup_image() {
    let base = serve_fixture().await;
    let mut driver = launch(Backend::Cdp).await;

    let outcome = driver
        .navigate(&format!("{base}/"), NAVIGATION_TIMEOUT)
        .await
        .expect("navigation failed");
    assert_eq!(outcome, NavigationOutcome::Loaded { status: Some(200) });

    wait_ready(driver.as_mut()).await;
    let signals = collect(driver.as_mut()).await;

    let image = signals
        .iter()
        .find_map(|s| s.network.as_ref().filter(|n| n.url.ends_with("/missing.png")))
        .expect("missing image was not reported");
    assert_eq!(image.status, 404);
    assert_eq!(image.resource, ResourceKind::Image);
    assert!(image.from_markup);

    assert!(signals
        .iter()
        .any(|s| s.level == SignalLevel::Error && s.message == "something broke"));

    driver.shutdown().await.expect("shutdown");
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn cdp_distinguishes_http_and_network_errors() {
    let base = serve_fixture().await;
    let mut driver = launch(Backend::Cdp).await;

    let gone = driver
        .navigate(&format!("{base}/gone"), NAVIGATION_TIMEOUT)
        .await
        .expect("navigation failed");
    assert_eq!(gone, NavigationOutcome::HttpError { status: 410 });

    // Port 9 (discard) is essentially never listening
    let refused = driver
        .navigate("http://127.0.0.1:9/", NAVIGATION_TIMEOUT)
        .await
        .expect("navigation failed");
    assert!(matches!(refused, NavigationOutcome::NetworkError { .. }));

    driver.shutdown().await.expect("shutdown");
}

#[tokio::test]
#[ignore] // Requires Chrome to be installed
async fn cdp_drains_each_signal_once() {
    let mut driver = launch(Backend::Cdp).await;

    driver
        .navigate(&data_url("<script>console.log('once')</script>"), NAVIGATION_TIMEOUT)
        .await
        .expect("navigation failed");
    wait_ready(driver.as_mut()).await;

    let first = collect(driver.as_mut()).await;
    let second = collect(driver.as_mut()).await;
    assert_eq!(first.iter().filter(|s| s.message == "once").count(), 1);
    assert!(second.iter().all(|s| s.message != "once"));

    driver.shutdown().await.expect("shutdown");
}

#[tokio::test]
#[ignore] // Requires a WebDriver server on localhost:4444
async fn webdriver_reports_missing_markup_image() {
    let base = serve_fixture().await;
    let mut driver = launch(Backend::WebDriver).await;

    driver
        .navigate(&format!("{base}/"), NAVIGATION_TIMEOUT)
        .await
        .expect("navigation failed");
    wait_ready(driver.as_mut()).await;
    let signals = collect(driver.as_mut()).await;

    assert!(signals.iter().any(|s| s
        .network
        .as_ref()
        .is_some_and(|n| n.url.ends_with("/missing.png"))));

    driver.shutdown().await.expect("shutdown");
}

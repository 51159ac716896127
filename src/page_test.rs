use super::*;
use crate::fixture::{FIXTURE_PNG, FixtureElement, FixturePage, LoadBehavior};
use pretty_assertions::assert_eq;

fn config(timeout_ms: u64) -> SuiteConfig {
    SuiteConfig {
        base_url: "https://site.test/".to_string(),
        timeout_ms,
        ..SuiteConfig::default()
    }
}

fn driver(page: &FixturePage, timeout_ms: u64) -> PageDriver {
    PageDriver::new(Box::new(page.clone()), &config(timeout_ms))
}

#[tokio::test(start_paused = true)]
async fn test_navigate_defaults_to_base_url() {
    let page = FixturePage::new();
    let driver = driver(&page, 30_000);

    driver.navigate(None).await.unwrap();
    assert_eq!(page.visits(), vec!["https://site.test/".to_string()]);

    driver.navigate(Some("https://site.test/blog/")).await.unwrap();
    assert_eq!(driver.current_url().await.unwrap(), "https://site.test/blog/");
}

#[tokio::test(start_paused = true)]
async fn test_network_idle_waits_for_quiet_window() {
    let page = FixturePage::new();
    let driver = driver(&page, 30_000);

    let start = Instant::now();
    driver
        .wait_for_load_state(LoadState::NetworkIdle, None)
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(NETWORK_IDLE_WINDOW_MS));
}

#[tokio::test(start_paused = true)]
async fn test_busy_network_times_out() {
    let page = FixturePage::new().with_load(LoadBehavior::Busy);
    let driver = driver(&page, 2_000);

    let err = driver.navigate(None).await.unwrap_err();
    match err {
        NavError::NavigationTimeout { url, state, timeout_ms } => {
            assert_eq!(url, "https://site.test/");
            assert_eq!(state, "networkidle");
            assert_eq!(timeout_ms, 2_000);
        }
        other => panic!("expected NavigationTimeout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_load_state_only_needs_ready_document() {
    let page = FixturePage::new().with_load(LoadBehavior::Busy);
    let driver = driver(&page, 2_000);

    driver
        .wait_for_load_state(LoadState::DomContentLoaded, None)
        .await
        .unwrap();
    driver.wait_for_load_state(LoadState::Load, None).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stuck_document_times_out_with_override() {
    let page = FixturePage::new().with_load(LoadBehavior::Stuck);
    let driver = driver(&page, 30_000);

    let start = Instant::now();
    let err = driver
        .wait_for_load_state(LoadState::Load, Some(Duration::from_millis(800)))
        .await
        .unwrap_err();
    assert!(matches!(err, NavError::NavigationTimeout { timeout_ms: 800, .. }));
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_is_visible_is_stable_without_mutation() {
    let page = FixturePage::new()
        .with_element("#root", FixtureElement::visible(""))
        .with_element(".banner", FixtureElement::hidden("promo"));
    let driver = driver(&page, 1_000);

    let root = Selector::css("#root");
    let banner = Selector::css(".banner");
    assert!(driver.is_visible(&root, None).await.unwrap());
    assert!(driver.is_visible(&root, None).await.unwrap());
    assert!(!driver.is_visible(&banner, None).await.unwrap());
    assert!(!driver.is_visible(&banner, None).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_is_visible_propagates_faults() {
    let page = FixturePage::new().with_faulty_selector("#root");
    let driver = driver(&page, 1_000);

    let err = driver.is_visible(&Selector::css("#root"), None).await.unwrap_err();
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_click_waits_then_acts() {
    let page = FixturePage::new().with_element(
        "a.late",
        FixtureElement::link("Later", "/later/").appearing_after(Duration::from_millis(700)),
    );
    let driver = driver(&page, 30_000);
    driver.navigate(Some("https://site.test/")).await.unwrap();

    driver.click(&Selector::css("a.late"), None).await.unwrap();
    assert_eq!(page.clicks(), vec!["a.late".to_string()]);
    assert_eq!(page.url(), "https://site.test/later/");
}

#[tokio::test(start_paused = true)]
async fn test_click_missing_element_is_not_found() {
    let page = FixturePage::new();
    let driver = driver(&page, 30_000);

    let err = driver
        .click(&Selector::css("#nope"), Some(Duration::from_millis(300)))
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(page.clicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_read_text() {
    let page = FixturePage::new().with_element("h1", FixtureElement::visible("Effective Mobile"));
    let driver = driver(&page, 1_000);

    let text = driver.read_text(&Selector::css("h1"), None).await.unwrap();
    assert_eq!(text, "Effective Mobile");
}

#[tokio::test(start_paused = true)]
async fn test_verify_url() {
    let page = FixturePage::new();
    let driver = driver(&page, 1_000);
    page.goto("https://site.test/uslugi/").await.unwrap();

    driver.verify_url("/uslugi").await.unwrap();
    let err = driver.verify_url("/blog").await.unwrap_err();
    assert!(matches!(err, NavError::AssertionFailed(_)));
    assert!(err.to_string().contains("https://site.test/uslugi/"));
}

#[tokio::test]
async fn test_screenshot_to_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let page = FixturePage::new();
    let driver = driver(&page, 1_000);

    let path = dir.path().join("nested").join("shot.png");
    let saved = driver.screenshot_to(&path, true).await.unwrap();
    assert_eq!(saved, path);
    assert_eq!(std::fs::read(&path).unwrap(), FIXTURE_PNG);
}

#[tokio::test]
async fn test_close_ends_session() {
    let page = FixturePage::new();
    let driver = driver(&page, 1_000);
    driver.close().await.unwrap();

    assert_eq!(page.close_count(), 1);
    assert!(page.current_url().await.is_err());
}

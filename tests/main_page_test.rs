// Page object behavior inside a real test lifecycle

mod common;

use common::{BASE_URL, attachment_names, bare_site, marketing_site, suite, test_config};
use futures::FutureExt;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

use navprobe::fixture::{FixtureElement, FixturePage, FixtureSessions};
use navprobe::main_page::{APP_ROOT_SELECTOR, LOGO_SELECTOR, MAIN_NAVIGATION_SELECTOR};
use navprobe::report::TestMeta;
use navprobe::{NavError, NavLink, NavTarget, Selector, Severity, TestContext, TestOutcome};

const META: TestMeta = TestMeta {
    name: "test_page_object",
    title: "Page object",
    description: "",
    severity: Severity::Minor,
    feature: "Main Page Navigation",
    story: "Navigation Links",
};

async fn navigation_links(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    let links = main_page.get_navigation_links().await?;
    assert_eq!(links.len(), 5);
    assert_eq!(
        links[2],
        NavLink {
            text: "Услуги".to_string(),
            href: "/uslugi/".to_string(),
        }
    );
    Ok(())
}

async fn links_fall_back_to_later_container(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    let links = main_page.get_navigation_links().await?;
    assert_eq!(
        links,
        vec![NavLink {
            text: "Блог".to_string(),
            href: "/blog/".to_string(),
        }]
    );
    Ok(())
}

async fn click_returns_selector(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    let used = main_page.click_careers().await?;
    assert_eq!(used, Selector::text("Карьера"));
    assert_eq!(
        ctx.driver().current_url().await?,
        format!("{}/career/", BASE_URL)
    );
    Ok(())
}

async fn every_target_reports_its_candidates(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    for target in NavTarget::ALL {
        let result = match target {
            NavTarget::AboutUs => main_page.click_about_us().await,
            NavTarget::Contacts => main_page.click_contacts().await,
            NavTarget::Services => main_page.click_services().await,
            NavTarget::Careers => main_page.click_careers().await,
            NavTarget::Blog => main_page.click_blog().await,
        };
        let declared: Vec<String> = ctx
            .config()
            .navigation
            .get(target)
            .candidates
            .iter()
            .map(|c| c.to_string())
            .collect();
        match result {
            Err(NavError::ElementNotFound { target: name, candidates }) => {
                assert_eq!(name, format!("{} link", target.label()));
                assert_eq!(candidates, declared, "{target}");
            }
            other => panic!("expected ElementNotFound for {target}, got {:?}", other),
        }
    }
    Ok(())
}

async fn missing_elements_listed(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    let missing = main_page.verify_main_page_elements().await?;
    assert_eq!(missing, vec![LOGO_SELECTOR.to_string()]);
    Ok(())
}

async fn wrong_landing_url(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    ctx.driver()
        .navigate(Some(&format!("{}/promo", BASE_URL)))
        .await?;
    main_page.verify_main_page_elements().await?;
    Ok(())
}

async fn page_info_and_screenshot(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    main_page.log_page_info().await?;
    let path = main_page.take_screenshot("main_page").await?;
    assert!(path.ends_with("screenshots/main_page.png"));
    assert!(path.exists());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_get_navigation_links_reads_header_nav() {
    let dir = TempDir::new().unwrap();
    let (suite, _sink) = suite(
        test_config(&dir),
        Arc::new(FixtureSessions::new(marketing_site)),
    );
    let record = suite
        .run_test(&META, |ctx| navigation_links(ctx).boxed())
        .await;
    assert_eq!(record.outcome, TestOutcome::Passed);
}

#[tokio::test(start_paused = true)]
async fn test_get_navigation_links_falls_back_to_menu() {
    let dir = TempDir::new().unwrap();
    let build = || bare_site().with_element(".menu a", FixtureElement::link("Блог", "/blog/"));
    let (suite, _sink) = suite(test_config(&dir), Arc::new(FixtureSessions::new(build)));
    let record = suite
        .run_test(&META, |ctx| links_fall_back_to_later_container(ctx).boxed())
        .await;
    assert_eq!(record.outcome, TestOutcome::Passed);
}

#[tokio::test(start_paused = true)]
async fn test_click_returns_the_selector_used() {
    let dir = TempDir::new().unwrap();
    let (suite, _sink) = suite(
        test_config(&dir),
        Arc::new(FixtureSessions::new(marketing_site)),
    );
    let record = suite
        .run_test(&META, |ctx| click_returns_selector(ctx).boxed())
        .await;
    assert_eq!(record.outcome, TestOutcome::Passed);
}

#[tokio::test(start_paused = true)]
async fn test_click_without_links_lists_declared_candidates() {
    let dir = TempDir::new().unwrap();
    let sessions = Arc::new(FixtureSessions::new(bare_site));
    let (suite, _sink) = suite(test_config(&dir), sessions.clone());
    let record = suite
        .run_test(&META, |ctx| every_target_reports_its_candidates(ctx).boxed())
        .await;
    assert_eq!(record.outcome, TestOutcome::Passed);
    assert!(sessions.opened()[0].clicks().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_verify_main_page_elements_lists_missing() {
    let dir = TempDir::new().unwrap();
    let build = || {
        FixturePage::new()
            .with_element(LOGO_SELECTOR, FixtureElement::hidden(""))
            .with_element(MAIN_NAVIGATION_SELECTOR, FixtureElement::visible(""))
            .with_element(APP_ROOT_SELECTOR, FixtureElement::visible(""))
    };
    let (suite, sink) = suite(test_config(&dir), Arc::new(FixtureSessions::new(build)));
    let record = suite
        .run_test(&META, |ctx| missing_elements_listed(ctx).boxed())
        .await;
    assert_eq!(record.outcome, TestOutcome::Passed);
    assert!(attachment_names(&sink.results()[0]).contains(&"Missing Element".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_verify_main_page_elements_checks_url_first() {
    let dir = TempDir::new().unwrap();
    let (suite, _sink) = suite(
        test_config(&dir),
        Arc::new(FixtureSessions::new(marketing_site)),
    );
    let record = suite
        .run_test(&META, |ctx| wrong_landing_url(ctx).boxed())
        .await;
    assert_eq!(
        record.outcome,
        TestOutcome::Failed(format!(
            "Assertion failed: Expected page URL '{}', but got '{}/promo'",
            BASE_URL, BASE_URL
        ))
    );
}

#[tokio::test(start_paused = true)]
async fn test_log_page_info_truncates_content() {
    let dir = TempDir::new().unwrap();
    let long_html = format!("<html><body>{}</body></html>", "x".repeat(3000));
    let build = move || marketing_site().with_content(&long_html);
    let (suite, sink) = suite(test_config(&dir), Arc::new(FixtureSessions::new(build)));
    let record = suite
        .run_test(&META, |ctx| page_info_and_screenshot(ctx).boxed())
        .await;
    assert_eq!(record.outcome, TestOutcome::Passed);
    assert!(
        attachment_names(&sink.results()[0])
            .contains(&"Page Info: test_page_object".to_string())
    );

    let info: serde_json::Value = sink
        .attachment_texts()
        .iter()
        .find_map(|text| serde_json::from_str(text).ok())
        .expect("page info attachment");
    let content = info["content"].as_str().unwrap();
    assert_eq!(content.chars().count(), 1003);
    assert!(content.ends_with("..."));
    assert_eq!(info["url"], BASE_URL);
    assert_eq!(info["title"], "Effective Mobile");
}

//! The main page navigation checks.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::json;
use tracing::info;

use crate::errors::NavError;
use crate::lifecycle::TestContext;
use crate::navigation::{NavTarget, matching_pattern};
use crate::report::TestMeta;
use crate::types::{LoadState, NavLink, Severity};

pub type ScenarioFn = for<'a> fn(&'a TestContext) -> BoxFuture<'a, Result<(), NavError>>;

const FEATURE: &str = "Main Page Navigation";
const STORY: &str = "Navigation Links";

/// A named check and its report metadata
#[derive(Clone, Copy)]
pub struct Scenario {
    pub meta: TestMeta,
    pub run: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario").field("meta", &self.meta).finish()
    }
}

const fn meta(
    name: &'static str,
    title: &'static str,
    description: &'static str,
    severity: Severity,
) -> TestMeta {
    TestMeta {
        name,
        title,
        description,
        severity,
        feature: FEATURE,
        story: STORY,
    }
}

/// Every scenario, in run order
pub fn catalogue() -> Vec<Scenario> {
    vec![
        Scenario {
            meta: meta(
                "test_main_page_load",
                "Verify main page loads correctly",
                "Test that the main page loads and basic elements are present",
                Severity::Critical,
            ),
            run: |ctx| main_page_load(ctx).boxed(),
        },
        Scenario {
            meta: meta(
                "test_navigate_to_about_us",
                "Navigate to About Us page",
                "Test navigation to About Us section and verify URL",
                Severity::High,
            ),
            run: |ctx| navigate_to_section(ctx, NavTarget::AboutUs).boxed(),
        },
        Scenario {
            meta: meta(
                "test_navigate_to_contacts",
                "Navigate to Contacts page",
                "Test navigation to Contacts section and verify URL",
                Severity::High,
            ),
            run: |ctx| navigate_to_section(ctx, NavTarget::Contacts).boxed(),
        },
        Scenario {
            meta: meta(
                "test_navigate_to_services",
                "Navigate to Services page",
                "Test navigation to Services section and verify URL",
                Severity::High,
            ),
            run: |ctx| navigate_to_section(ctx, NavTarget::Services).boxed(),
        },
        Scenario {
            meta: meta(
                "test_navigate_to_careers",
                "Navigate to Careers page",
                "Test navigation to Careers section and verify URL",
                Severity::Medium,
            ),
            run: |ctx| navigate_to_section(ctx, NavTarget::Careers).boxed(),
        },
        Scenario {
            meta: meta(
                "test_navigate_to_blog",
                "Navigate to Blog page",
                "Test navigation to Blog section and verify URL",
                Severity::Medium,
            ),
            run: |ctx| navigate_to_section(ctx, NavTarget::Blog).boxed(),
        },
        Scenario {
            meta: meta(
                "test_analyze_navigation_links",
                "Analyze available navigation links",
                "Test to analyze and document all available navigation links",
                Severity::Minor,
            ),
            run: |ctx| analyze_navigation_links(ctx).boxed(),
        },
    ]
}

/// Look up scenarios by name, keeping catalogue order
pub fn select(names: &[String]) -> Result<Vec<Scenario>, NavError> {
    let all = catalogue();
    if names.is_empty() {
        return Ok(all);
    }
    if let Some(unknown) = names
        .iter()
        .find(|n| !all.iter().any(|s| s.meta.name == n.as_str()))
    {
        return Err(NavError::Config(format!("Unknown test: {}", unknown)));
    }
    Ok(all
        .into_iter()
        .filter(|s| names.iter().any(|n| n == s.meta.name))
        .collect())
}

async fn open_main_page(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    ctx.report()
        .step("Navigate to main page", async {
            main_page.navigate_to_main_page().await?;
            main_page.wait_for_page_load().await
        })
        .await
}

pub async fn main_page_load(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    main_page.navigate_to_main_page().await?;
    main_page.wait_for_page_load().await?;
    main_page.verify_main_page_elements().await?;
    ctx.report()
        .step("Attach HTML content for analysis", async {
            main_page.attach_html_content("Main Page HTML").await
        })
        .await
}

/// Click into `target` and check the resulting URL.
///
/// A link that cannot be found skips the test after attaching what the
/// navigation does contain.
pub async fn navigate_to_section(ctx: &TestContext, target: NavTarget) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    let report = ctx.report();
    open_main_page(ctx).await?;

    if let Err(err) = main_page.click(target).await {
        if !matches!(err, NavError::ElementNotFound { .. }) {
            return Err(err);
        }
        let links = main_page.get_navigation_links().await.unwrap_or_default();
        let texts: Vec<&str> = links
            .iter()
            .map(|l| l.text.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        report.attach_text(
            "Navigation Analysis",
            &format!("Available navigation links: {:?}\nError: {}", texts, err),
        );
        report.attach_json("Navigation Links", &link_table(&links));
        return Err(NavError::skip(format!(
            "{} link not found. Available links: {:?}",
            target.label(),
            texts
        )));
    }

    let driver = ctx.driver();
    report
        .step("Wait for navigation", async {
            driver
                .wait_for_load_state(
                    LoadState::NetworkIdle,
                    Some(ctx.config().section_load_timeout()),
                )
                .await
        })
        .await?;

    let current_url = report
        .step(
            format!("Verify URL contains {} section", target.section()),
            async {
                let current_url = driver.current_url().await?;
                let patterns = &ctx.config().navigation.get(target).url_patterns;
                match matching_pattern(&current_url, patterns) {
                    Some(pattern) => {
                        info!("{} matched {}", current_url, pattern);
                        Ok(current_url)
                    }
                    None => Err(NavError::AssertionFailed(format!(
                        "URL '{}' does not contain expected {} page patterns",
                        current_url,
                        target.section()
                    ))),
                }
            },
        )
        .await?;

    report.attach_text("Final URL", &current_url);
    Ok(())
}

pub async fn analyze_navigation_links(ctx: &TestContext) -> Result<(), NavError> {
    let main_page = ctx.main_page();
    let report = ctx.report();
    open_main_page(ctx).await?;

    let links = main_page.get_navigation_links().await?;
    let table = report
        .step("Extract link information", async { Ok(link_table(&links)) })
        .await?;
    report
        .step("Attach navigation analysis", async {
            report.attach_json("Navigation Links Analysis", &table);
            Ok(())
        })
        .await?;

    if links.is_empty() {
        return Err(NavError::AssertionFailed(
            "No navigation links found on the page".to_string(),
        ));
    }
    Ok(())
}

fn link_table(links: &[NavLink]) -> serde_json::Value {
    links
        .iter()
        .enumerate()
        .map(|(index, link)| json!({"index": index, "text": link.text, "href": link.href}))
        .collect()
}

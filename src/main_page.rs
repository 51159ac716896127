//! Page object for the site's main page and its primary navigation.

use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::errors::NavError;
use crate::lifecycle::TestContext;
use crate::navigation::NavTarget;
use crate::page::PageDriver;
use crate::resolver::LocatorResolver;
use crate::selector::Selector;
use crate::types::{LoadState, NavLink};

pub const LOGO_SELECTOR: &str = "header img[alt*='logo'], .logo";
pub const MAIN_NAVIGATION_SELECTOR: &str = "header nav, .main-nav, .navigation";
pub const APP_ROOT_SELECTOR: &str = "#root";

/// Containers searched in order for navigation links
pub const NAV_LINK_SELECTORS: [&str; 5] = [
    "header nav a",
    ".main-nav a",
    ".navigation a",
    "nav a",
    ".menu a",
];

/// Characters of page HTML kept in the page info attachment
const PAGE_INFO_CONTENT_CHARS: usize = 1000;

pub struct MainPage<'a> {
    ctx: &'a TestContext,
    resolver: LocatorResolver,
}

impl<'a> MainPage<'a> {
    pub fn new(ctx: &'a TestContext) -> Self {
        MainPage {
            ctx,
            resolver: LocatorResolver::new(ctx.config().probe_timeout()),
        }
    }

    fn driver(&self) -> &'a PageDriver {
        self.ctx.driver()
    }

    pub async fn navigate_to_main_page(&self) -> Result<(), NavError> {
        let driver = self.driver();
        self.ctx
            .report()
            .step("Navigate to main page", async {
                driver.navigate(None).await?;
                driver
                    .wait_for_load_state(LoadState::DomContentLoaded, None)
                    .await
            })
            .await
    }

    /// Wait for the app root to render and the network to settle
    pub async fn wait_for_page_load(&self) -> Result<(), NavError> {
        let driver = self.driver();
        self.ctx
            .report()
            .step("Wait for page to load completely", async {
                driver
                    .wait_visible(&Selector::css(APP_ROOT_SELECTOR), None)
                    .await?;
                driver
                    .wait_for_load_state(LoadState::NetworkIdle, None)
                    .await
            })
            .await
    }

    /// Click the first visible candidate for `target`, returning the selector used
    pub async fn click(&self, target: NavTarget) -> Result<Selector, NavError> {
        let driver = self.driver();
        let spec = self.ctx.config().navigation.get(target);
        let target_name = format!("{} link", target.label());

        self.ctx
            .report()
            .step(format!("Click {} link", target.label()), async {
                self.resolver
                    .resolve_and_act(driver.backend(), &target_name, &spec.candidates, |selector| {
                        async move {
                            driver.click(&selector, None).await?;
                            Ok::<_, NavError>(selector)
                        }
                    })
                    .await
            })
            .await
    }

    pub async fn click_about_us(&self) -> Result<Selector, NavError> {
        self.click(NavTarget::AboutUs).await
    }

    pub async fn click_contacts(&self) -> Result<Selector, NavError> {
        self.click(NavTarget::Contacts).await
    }

    pub async fn click_services(&self) -> Result<Selector, NavError> {
        self.click(NavTarget::Services).await
    }

    pub async fn click_careers(&self) -> Result<Selector, NavError> {
        self.click(NavTarget::Careers).await
    }

    pub async fn click_blog(&self) -> Result<Selector, NavError> {
        self.click(NavTarget::Blog).await
    }

    /// Links of the first navigation container that has any
    pub async fn get_navigation_links(&self) -> Result<Vec<NavLink>, NavError> {
        let backend = self.driver().backend();
        self.ctx
            .report()
            .step("Get all navigation links", async {
                for expr in NAV_LINK_SELECTORS {
                    let selector = Selector::css(expr);
                    if backend.count(&selector).await? > 0 {
                        let links = backend.links(&selector).await?;
                        debug!("Found {} navigation links via {}", links.len(), expr);
                        return Ok(links);
                    }
                }
                Ok(Vec::new())
            })
            .await
    }

    /// Check the page URL, then logo, navigation and app root.
    ///
    /// A missing element is attached as a `Missing Element` note and the
    /// remaining checks still run. Returns the selectors that were missing.
    pub async fn verify_main_page_elements(&self) -> Result<Vec<String>, NavError> {
        let driver = self.driver();
        let report = self.ctx.report();
        let timeout = self.ctx.config().element_check_timeout();

        report
            .step("Verify main page elements", async {
                let current = driver.current_url().await?;
                if normalize_url(&current) != normalize_url(driver.base_url()) {
                    return Err(NavError::AssertionFailed(format!(
                        "Expected page URL '{}', but got '{}'",
                        driver.base_url(),
                        current
                    )));
                }

                let mut missing = Vec::new();
                for expr in [LOGO_SELECTOR, MAIN_NAVIGATION_SELECTOR, APP_ROOT_SELECTOR] {
                    if !driver.is_visible(&Selector::css(expr), Some(timeout)).await? {
                        info!("Element {} not found on page", expr);
                        report.attach_text(
                            "Missing Element",
                            &format!("Element {} not found on page", expr),
                        );
                        missing.push(expr.to_string());
                    }
                }
                Ok(missing)
            })
            .await
    }

    pub async fn attach_html_content(&self, name: &str) -> Result<(), NavError> {
        let html = self.driver().content().await?;
        self.ctx.report().attach_html(name, &html);
        Ok(())
    }

    /// Attach URL, title and the start of the page HTML
    pub async fn log_page_info(&self) -> Result<(), NavError> {
        let driver = self.driver();
        let content = driver.content().await?;
        let content = if content.chars().count() > PAGE_INFO_CONTENT_CHARS {
            let head: String = content.chars().take(PAGE_INFO_CONTENT_CHARS).collect();
            format!("{}...", head)
        } else {
            content
        };
        let info = json!({
            "url": driver.current_url().await?,
            "title": driver.title().await?,
            "content": content,
        });
        self.ctx.report().attach_text(
            &format!("Page Info: {}", self.ctx.name()),
            &serde_json::to_string_pretty(&info).unwrap_or_else(|_| info.to_string()),
        );
        Ok(())
    }

    /// Save a viewport screenshot as `<screenshots_dir>/<name>.png`
    pub async fn take_screenshot(&self, name: &str) -> Result<PathBuf, NavError> {
        let path = self
            .ctx
            .config()
            .screenshots_dir
            .join(format!("{}.png", name));
        self.driver().screenshot_to(&path, false).await
    }
}

/// URLs compare equal regardless of a trailing slash
fn normalize_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

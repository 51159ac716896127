use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::PageBackend;
use crate::errors::{DriverError, NavError};
use crate::selector::Selector;
use crate::types::{LoadSnapshot, NavLink, ViewportSize};
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// Records uncaught errors and unhandled rejections into a page-global array
const PAGE_ERROR_OBSERVER: &str = r#"
    (function() {
        if (window.__navprobe_error_observer) return;
        window.__navprobe_error_observer = true;
        window.__navprobe_page_errors = window.__navprobe_page_errors || [];

        function record(message) {
            window.__navprobe_page_errors.push(message);
            // Keep only last 1000 errors
            if (window.__navprobe_page_errors.length > 1000) {
                window.__navprobe_page_errors.shift();
            }
        }

        window.addEventListener('error', function(event) {
            record(`Uncaught ${event.error || event.message} at ${event.filename}:${event.lineno}:${event.colno}`);
        });

        window.addEventListener('unhandledrejection', function(event) {
            record(`Unhandled Promise Rejection: ${event.reason}`);
        });
    })();
"#;

const DRAIN_PAGE_ERRORS: &str = r#"
    var errors = window.__navprobe_page_errors || [];
    window.__navprobe_page_errors = [];
    return errors;
"#;

const LOAD_SNAPSHOT: &str = r#"
    return {
        ready_state: document.readyState,
        resource_count: performance.getEntriesByType('resource').length
    };
"#;

const DOCUMENT_SIZE: &str = r#"
    const doc = document.documentElement;
    const body = document.body || doc;
    return [
        Math.max(doc.scrollWidth, body.scrollWidth, doc.clientWidth),
        Math.max(doc.scrollHeight, body.scrollHeight, doc.clientHeight)
    ];
"#;

/// Browser instance for WebDriver automation
pub struct Browser {
    client: Client,
    observing_errors: AtomicBool,
    page_errors: Arc<Mutex<Vec<String>>>,
    _profile_dir: Option<TempDir>,
}

/// Supported browser types
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BrowserType {
    /// Mozilla Firefox
    Firefox,
    /// Google Chrome/Chromium
    Chrome,
}

impl std::str::FromStr for BrowserType {
    type Err = NavError;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => Err(NavError::Config(format!("Unsupported browser: {}", s))),
        }
    }
}

impl std::fmt::Display for BrowserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl BrowserType {
    pub fn name(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "firefox",
            BrowserType::Chrome => "chrome",
        }
    }

    /// WebDriver binary that drives this browser
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserType::Firefox => "geckodriver",
            BrowserType::Chrome => "chromedriver",
        }
    }

    /// Port an externally started driver listens on by default
    pub fn standard_port(&self) -> u16 {
        match self {
            BrowserType::Firefox => 4444,
            BrowserType::Chrome => 9515,
        }
    }
}

impl Browser {
    /// Create a new browser session
    ///
    /// # Arguments
    /// * `browser_type` - Firefox or Chrome
    /// * `viewport` - Optional viewport dimensions
    /// * `headless` - Whether to run in headless mode
    pub async fn new(
        browser_type: BrowserType,
        viewport: Option<ViewportSize>,
        headless: bool,
    ) -> Result<Self, DriverError> {
        info!("Connecting to {:?} WebDriver", browser_type);

        // Ensure WebDriver is running (will auto-start if needed)
        let webdriver_url = GLOBAL_WEBDRIVER_MANAGER.ensure_driver(&browser_type).await?;

        let mut caps = serde_json::Map::new();
        // HTTPS certificate errors are ignored for every engine
        caps.insert("acceptInsecureCerts".to_string(), json!(true));

        let profile_dir = match &browser_type {
            BrowserType::Firefox => {
                let mut args = Vec::new();
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = &viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }

                caps.insert(
                    "moz:firefoxOptions".to_string(),
                    json!({
                        "args": args,
                        "prefs": { "javascript.enabled": true }
                    }),
                );
                None
            }
            BrowserType::Chrome => {
                // Chrome refuses to share a user-data dir between sessions
                let profile_dir = tempfile::Builder::new()
                    .prefix("navprobe-chrome-")
                    .tempdir()
                    .map_err(|e| DriverError::Session(format!("Cannot create profile dir: {}", e)))?;

                let mut args = vec![
                    "--no-sandbox".to_string(),
                    "--ignore-certificate-errors".to_string(),
                ];
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                if let Some(vp) = &viewport {
                    args.push(format!("--window-size={},{}", vp.width, vp.height));
                }
                args.push(format!("--user-data-dir={}", profile_dir.path().display()));

                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
                Some(profile_dir)
            }
        };

        debug!("Connecting to WebDriver at {}", webdriver_url);

        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("Session is already started")
                    || error_str.contains("session not created")
                {
                    info!("WebDriver appears to be in a bad state, attempting recovery...");
                    GLOBAL_WEBDRIVER_MANAGER.kill_driver(&browser_type);
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;

                    let new_url = GLOBAL_WEBDRIVER_MANAGER.ensure_driver(&browser_type).await?;
                    ClientBuilder::rustls()
                        .capabilities(caps)
                        .connect(&new_url)
                        .await?
                } else {
                    return Err(e.into());
                }
            }
        };

        // Viewport setting is best-effort; the lifecycle sets it again
        if let Some(vp) = viewport {
            debug!("Setting viewport to {}x{}", vp.width, vp.height);
            if let Err(e) = client.set_window_size(vp.width, vp.height).await {
                debug!("Note: Could not set window size: {}", e);
            }
        }

        Ok(Browser {
            client,
            observing_errors: AtomicBool::new(false),
            page_errors: Arc::new(Mutex::new(Vec::new())),
            _profile_dir: profile_dir,
        })
    }

    async fn install_error_observer(&self) {
        // Ignore errors: some pages (about:blank, data URLs) refuse scripts
        let _ = self.client.execute(PAGE_ERROR_OBSERVER, vec![]).await;
    }

    /// Move errors recorded by the current document into the local stash
    async fn harvest_page_errors(&self) -> Result<(), DriverError> {
        let value = self.client.execute(DRAIN_PAGE_ERRORS, vec![]).await?;
        let errors: Vec<String> = serde_json::from_value(value).unwrap_or_default();
        if !errors.is_empty() {
            self.page_errors.lock().await.extend(errors);
        }
        Ok(())
    }

    async fn find_matches(&self, selector: &Selector) -> Result<Vec<Element>, DriverError> {
        let elements = match selector {
            Selector::Css(css) => self.client.find_all(Locator::Css(css)).await?,
            Selector::XPath(xpath) => self.client.find_all(Locator::XPath(xpath)).await?,
            Selector::Text(text) => {
                let xpath = Selector::text_xpath(text);
                self.client.find_all(Locator::XPath(&xpath)).await?
            }
            Selector::HasText { css, text } => {
                let needle = text.to_lowercase();
                let mut matching = Vec::new();
                for element in self.client.find_all(Locator::Css(css)).await? {
                    // Stale elements simply drop out of the match set
                    let content = element.text().await.unwrap_or_default();
                    if content.to_lowercase().contains(&needle) {
                        matching.push(element);
                    }
                }
                matching
            }
        };
        Ok(elements)
    }

    async fn first_visible(&self, selector: &Selector) -> Result<Option<Element>, DriverError> {
        for element in self.find_matches(selector).await? {
            if element.is_displayed().await.unwrap_or(false) {
                return Ok(Some(element));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl PageBackend for Browser {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        info!("Navigating to {}", url);

        let observing = self.observing_errors.load(Ordering::SeqCst);
        if observing {
            let _ = self.harvest_page_errors().await;
        }

        self.client.goto(url).await?;

        if observing {
            self.install_error_observer().await;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> Result<String, DriverError> {
        Ok(self.client.title().await?)
    }

    async fn content(&self) -> Result<String, DriverError> {
        Ok(self.client.source().await?)
    }

    async fn load_snapshot(&self) -> Result<LoadSnapshot, DriverError> {
        let value = self.client.execute(LOAD_SNAPSHOT, vec![]).await?;
        serde_json::from_value(value)
            .map_err(|e| DriverError::Command(format!("Unexpected load snapshot: {}", e)))
    }

    async fn is_displayed(&self, selector: &Selector) -> Result<bool, DriverError> {
        Ok(self.first_visible(selector).await?.is_some())
    }

    async fn count(&self, selector: &Selector) -> Result<usize, DriverError> {
        Ok(self.find_matches(selector).await?.len())
    }

    async fn click(&self, selector: &Selector) -> Result<(), DriverError> {
        let element = self
            .first_visible(selector)
            .await?
            .ok_or_else(|| DriverError::NotInteractable(selector.to_string()))?;
        debug!("Clicking {}", selector);
        element.click().await?;
        Ok(())
    }

    async fn text(&self, selector: &Selector) -> Result<Option<String>, DriverError> {
        match self.first_visible(selector).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    async fn links(&self, selector: &Selector) -> Result<Vec<NavLink>, DriverError> {
        let mut links = Vec::new();
        for element in self.find_matches(selector).await? {
            let text = element.text().await.unwrap_or_default();
            let href = element.attr("href").await.ok().flatten().unwrap_or_default();
            links.push(NavLink {
                text: text.trim().to_string(),
                href,
            });
        }
        Ok(links)
    }

    async fn set_viewport(&self, viewport: &ViewportSize) -> Result<(), DriverError> {
        Ok(self
            .client
            .set_window_size(viewport.width, viewport.height)
            .await?)
    }

    async fn observe_page_errors(&self) -> Result<(), DriverError> {
        self.observing_errors.store(true, Ordering::SeqCst);
        self.install_error_observer().await;
        Ok(())
    }

    async fn take_page_errors(&self) -> Result<Vec<String>, DriverError> {
        if self.observing_errors.load(Ordering::SeqCst) {
            self.harvest_page_errors().await?;
        }
        Ok(std::mem::take(&mut *self.page_errors.lock().await))
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, DriverError> {
        if !full_page {
            return Ok(self.client.screenshot().await?);
        }

        // WebDriver only captures the viewport; grow the window to the document first
        let (width, height) = self.client.get_window_size().await?;
        let size = self.client.execute(DOCUMENT_SIZE, vec![]).await?;
        let (doc_width, doc_height): (u64, u64) = serde_json::from_value::<[u64; 2]>(size)
            .map(|[w, h]| (w, h))
            .unwrap_or((width, height));

        let resized = doc_width > width || doc_height > height;
        if resized {
            self.client
                .set_window_size(doc_width.max(width) as u32, doc_height.max(height) as u32)
                .await?;
        }
        let png = self.client.screenshot().await;
        if resized {
            let _ = self
                .client
                .set_window_size(width as u32, height as u32)
                .await;
        }
        Ok(png?)
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.client.clone().close().await?;
        Ok(())
    }
}

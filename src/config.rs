//! Suite configuration.
//!
//! Built once at process start (defaults, then environment, then CLI flags)
//! and shared read-only as `Arc<SuiteConfig>`.

use std::path::PathBuf;
use std::time::Duration;

use crate::errors::NavError;
use crate::navigation::NavigationMap;
use crate::types::ViewportSize;
use crate::webdriver::BrowserType;

pub const DEFAULT_BASE_URL: &str = "https://www.effective-mobile.ru";

/// Immutable run configuration
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub base_url: String,
    pub browser: BrowserType,
    pub headed: bool,
    /// Default timeout for page operations, also bounds navigation
    pub timeout_ms: u64,
    /// Per-candidate visibility probe
    pub probe_timeout_ms: u64,
    /// Budget for each structural element check on the main page
    pub element_check_timeout_ms: u64,
    /// Network-idle wait after clicking into a section
    pub section_load_timeout_ms: u64,
    pub viewport: ViewportSize,
    pub screenshots_dir: PathBuf,
    pub results_dir: PathBuf,
    pub navigation: NavigationMap,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserType::Chrome,
            headed: false,
            timeout_ms: 30_000,
            probe_timeout_ms: 5_000,
            element_check_timeout_ms: 10_000,
            section_load_timeout_ms: 10_000,
            viewport: ViewportSize::default(),
            screenshots_dir: PathBuf::from("screenshots"),
            results_dir: PathBuf::from("allure-results"),
            navigation: NavigationMap::default(),
        }
    }
}

impl SuiteConfig {
    /// Defaults overridden by `BASE_URL`, `BROWSER`, `HEADED` and `TIMEOUT`
    pub fn from_env() -> Result<Self, NavError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SuiteConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NavError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SuiteConfig::default();

        if let Some(base_url) = lookup("BASE_URL").filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(browser) = lookup("BROWSER").filter(|v| !v.trim().is_empty()) {
            config.browser = browser.trim().parse()?;
        }
        if let Some(headed) = lookup("HEADED") {
            config.headed = headed.trim().eq_ignore_ascii_case("true");
        }
        if let Some(timeout) = lookup("TIMEOUT").filter(|v| !v.trim().is_empty()) {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                NavError::Config(format!("TIMEOUT must be milliseconds, got '{}'", timeout))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NavError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| NavError::Config(format!("Invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NavError::Config(format!(
                "Base URL must be http or https, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(NavError::Config("Timeout must be greater than zero".to_string()));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(NavError::Config("Viewport must not be empty".to_string()));
        }
        self.navigation.validate()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn element_check_timeout(&self) -> Duration {
        Duration::from_millis(self.element_check_timeout_ms)
    }

    pub fn section_load_timeout(&self) -> Duration {
        Duration::from_millis(self.section_load_timeout_ms)
    }

    /// Contents of `environment.properties`, in a fixed key order
    pub fn environment(&self) -> Vec<(String, String)> {
        vec![
            ("Browser".to_string(), self.browser.name().to_string()),
            ("BaseURL".to_string(), self.base_url.clone()),
            ("Headed".to_string(), self.headed.to_string()),
            ("Timeout".to_string(), self.timeout_ms.to_string()),
            (
                "Viewport".to_string(),
                format!("{}x{}", self.viewport.width, self.viewport.height),
            ),
            (
                "Runner".to_string(),
                format!("navprobe {}", env!("CARGO_PKG_VERSION")),
            ),
        ]
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

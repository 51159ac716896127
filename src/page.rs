//! Page driver: timed primitives over one page session.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::backend::PageBackend;
use crate::config::SuiteConfig;
use crate::errors::NavError;
use crate::resolver::{DEFAULT_POLL_INTERVAL_MS, probe_visible};
use crate::selector::Selector;
use crate::types::{ElementState, LoadState};

/// Network is considered idle after this long without new resources
pub const NETWORK_IDLE_WINDOW_MS: u64 = 500;

/// Owns one page session for the duration of a test
pub struct PageDriver {
    backend: Box<dyn PageBackend>,
    base_url: String,
    default_timeout: Duration,
    poll_interval: Duration,
}

impl PageDriver {
    pub fn new(backend: Box<dyn PageBackend>, config: &SuiteConfig) -> Self {
        PageDriver {
            backend,
            base_url: config.base_url.clone(),
            default_timeout: config.timeout(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn backend(&self) -> &dyn PageBackend {
        self.backend.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Navigate to `url` (the base URL when `None`) and wait for network idle
    pub async fn navigate(&self, url: Option<&str>) -> Result<(), NavError> {
        let url = url.unwrap_or(&self.base_url);
        info!("Navigating to {}", url);

        let started = Instant::now();
        match tokio::time::timeout(self.default_timeout, self.backend.goto(url)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(NavError::NavigationTimeout {
                    url: url.to_string(),
                    state: "commit".to_string(),
                    timeout_ms: self.default_timeout.as_millis() as u64,
                });
            }
        }

        let remaining = self.default_timeout.saturating_sub(started.elapsed());
        self.wait_for_load_state(LoadState::NetworkIdle, Some(remaining))
            .await
            .map_err(|e| match e {
                NavError::NavigationTimeout { state, .. } => NavError::NavigationTimeout {
                    url: url.to_string(),
                    state,
                    timeout_ms: self.default_timeout.as_millis() as u64,
                },
                other => other,
            })
    }

    /// Poll the page until it reaches `state`.
    ///
    /// Network idle means `document.readyState == "complete"` and an unchanged
    /// resource count for [`NETWORK_IDLE_WINDOW_MS`].
    pub async fn wait_for_load_state(
        &self,
        state: LoadState,
        timeout: Option<Duration>,
    ) -> Result<(), NavError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let deadline = Instant::now() + timeout;
        let idle_window = Duration::from_millis(NETWORK_IDLE_WINDOW_MS);
        let mut quiet_since: Option<(Instant, u64)> = None;

        loop {
            let snapshot = self.backend.load_snapshot().await?;
            let now = Instant::now();

            if state.document_ready(&snapshot) {
                if state != LoadState::NetworkIdle {
                    debug!("Page reached {}", state);
                    return Ok(());
                }
                match quiet_since {
                    Some((since, count)) if count == snapshot.resource_count => {
                        if now.duration_since(since) >= idle_window {
                            debug!("Network idle with {} resources", count);
                            return Ok(());
                        }
                    }
                    _ => quiet_since = Some((now, snapshot.resource_count)),
                }
            } else {
                quiet_since = None;
            }

            if now >= deadline {
                let url = self.backend.current_url().await.unwrap_or_default();
                return Err(NavError::NavigationTimeout {
                    url,
                    state: state.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Non-failing visibility probe; driver faults still propagate
    pub async fn is_visible(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> Result<bool, NavError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        Ok(probe_visible(self.backend(), selector, timeout, self.poll_interval).await?)
    }

    /// Wait until `selector` is visible, or fail with `ElementNotFound`
    pub async fn wait_visible(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> Result<(), NavError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        debug!("{} -> {:?}", selector, ElementState::NotPresent);
        if probe_visible(self.backend(), selector, timeout, self.poll_interval).await? {
            debug!("{} -> {:?}", selector, ElementState::Visible);
            Ok(())
        } else {
            Err(NavError::ElementNotFound {
                target: selector.to_string(),
                candidates: vec![selector.to_string()],
            })
        }
    }

    pub async fn click(&self, selector: &Selector, timeout: Option<Duration>) -> Result<(), NavError> {
        self.wait_visible(selector, timeout).await?;
        self.backend.click(selector).await?;
        debug!("{} -> {:?}", selector, ElementState::Acted);
        Ok(())
    }

    pub async fn read_text(
        &self,
        selector: &Selector,
        timeout: Option<Duration>,
    ) -> Result<String, NavError> {
        self.wait_visible(selector, timeout).await?;
        let text = self.backend.text(selector).await?;
        debug!("{} -> {:?}", selector, ElementState::Acted);
        text.ok_or_else(|| NavError::ElementNotFound {
            target: selector.to_string(),
            candidates: vec![selector.to_string()],
        })
    }

    pub async fn current_url(&self) -> Result<String, NavError> {
        Ok(self.backend.current_url().await?)
    }

    pub async fn title(&self) -> Result<String, NavError> {
        Ok(self.backend.title().await?)
    }

    pub async fn content(&self) -> Result<String, NavError> {
        Ok(self.backend.content().await?)
    }

    /// Fail with `AssertionFailed` unless the current URL contains `expected`
    pub async fn verify_url(&self, expected: &str) -> Result<(), NavError> {
        let current = self.current_url().await?;
        if current.contains(expected) {
            Ok(())
        } else {
            Err(NavError::AssertionFailed(format!(
                "Expected URL to contain '{}', but got '{}'",
                expected, current
            )))
        }
    }

    /// Save a PNG screenshot to `path`, creating parent directories
    pub async fn screenshot_to(&self, path: &Path, full_page: bool) -> Result<PathBuf, NavError> {
        let png = self.backend.screenshot(full_page).await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &png).await?;
        info!("Screenshot saved to: {}", path.display());
        Ok(path.to_path_buf())
    }

    /// End the session; consumes the driver so it cannot be closed twice
    pub async fn close(self) -> Result<(), NavError> {
        Ok(self.backend.close().await?)
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

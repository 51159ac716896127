use async_trait::async_trait;

use crate::errors::DriverError;
use crate::selector::Selector;
use crate::types::{LoadSnapshot, NavLink, ViewportSize};

/// Capability set a page session needs from a browser automation driver.
///
/// Implementations:
/// - [`crate::webdriver::Browser`] - real browser over WebDriver (fantoccini)
/// - [`crate::fixture::FixturePage`] - in-memory page for tests
///
/// Lookups never fail just because nothing matches: an absent element is
/// `Ok(false)` / `Ok(0)` / `Ok(None)`. Errors are reserved for faults of the
/// session itself.
#[async_trait]
pub trait PageBackend: Send + Sync {
    /// Navigate to URL
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Get current URL
    async fn current_url(&self) -> Result<String, DriverError>;

    /// Get document title
    async fn title(&self) -> Result<String, DriverError>;

    /// Get serialized page HTML
    async fn content(&self) -> Result<String, DriverError>;

    /// Snapshot of document readiness and network activity
    async fn load_snapshot(&self) -> Result<LoadSnapshot, DriverError>;

    /// Whether at least one match is rendered and visible right now
    async fn is_displayed(&self, selector: &Selector) -> Result<bool, DriverError>;

    /// Number of matching elements, visible or not
    async fn count(&self, selector: &Selector) -> Result<usize, DriverError>;

    /// Click the first visible match
    async fn click(&self, selector: &Selector) -> Result<(), DriverError>;

    /// Text content of the first visible match
    async fn text(&self, selector: &Selector) -> Result<Option<String>, DriverError>;

    /// Text and href of every match
    async fn links(&self, selector: &Selector) -> Result<Vec<NavLink>, DriverError>;

    /// Resize the page to the given viewport
    async fn set_viewport(&self, viewport: &ViewportSize) -> Result<(), DriverError>;

    /// Start recording uncaught page errors
    async fn observe_page_errors(&self) -> Result<(), DriverError>;

    /// Drain page errors recorded since the last call
    async fn take_page_errors(&self) -> Result<Vec<String>, DriverError>;

    /// PNG screenshot of the viewport, or of the whole document when `full_page`
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, DriverError>;

    /// End the session
    async fn close(&self) -> Result<(), DriverError>;
}

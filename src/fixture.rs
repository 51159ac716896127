//! In-memory page used by the test suite.
//!
//! Elements are registered under the selector expression that should find
//! them, so a fixture describes exactly which candidate selectors a page
//! answers to. Time is measured with `tokio::time::Instant`, which lets tests
//! run delayed-appearance scenarios on a paused clock.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::backend::PageBackend;
use crate::config::SuiteConfig;
use crate::errors::{DriverError, NavError};
use crate::lifecycle::SessionFactory;
use crate::selector::Selector;
use crate::types::{LoadSnapshot, NavLink, ViewportSize};

/// An element on a fixture page
#[derive(Debug, Clone)]
pub struct FixtureElement {
    pub text: String,
    pub href: Option<String>,
    pub visible: bool,
    /// Becomes visible this long after the last navigation
    pub appears_after: Option<Duration>,
    /// URL the page moves to when this element is clicked
    pub navigates_to: Option<String>,
}

impl FixtureElement {
    pub fn visible(text: impl Into<String>) -> Self {
        FixtureElement {
            text: text.into(),
            href: None,
            visible: true,
            appears_after: None,
            navigates_to: None,
        }
    }

    pub fn hidden(text: impl Into<String>) -> Self {
        FixtureElement {
            visible: false,
            ..FixtureElement::visible(text)
        }
    }

    /// A visible link that navigates to `href` when clicked
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        let href = href.into();
        FixtureElement {
            href: Some(href.clone()),
            navigates_to: Some(href),
            ..FixtureElement::visible(text)
        }
    }

    pub fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }
}

/// How the page reports its loading progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    /// Complete, with no further network activity
    Idle,
    /// Complete, but a new resource is fetched on every poll
    Busy,
    /// Never leaves `loading`
    Stuck,
}

#[derive(Debug)]
struct FixtureState {
    url: String,
    title: String,
    content: String,
    elements: HashMap<String, Vec<FixtureElement>>,
    faulty: HashSet<String>,
    load: LoadBehavior,
    resource_count: u64,
    navigated_at: Instant,
    observing_errors: bool,
    page_errors: Vec<String>,
    screenshot: Result<Vec<u8>, String>,
    viewport: Option<ViewportSize>,
    visits: Vec<String>,
    clicks: Vec<String>,
    closes: usize,
}

/// Cloneable handle to a shared in-memory page
#[derive(Debug, Clone)]
pub struct FixturePage {
    state: Arc<Mutex<FixtureState>>,
}

impl Default for FixturePage {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal PNG signature used as the default screenshot payload
pub const FIXTURE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

impl FixturePage {
    pub fn new() -> Self {
        FixturePage {
            state: Arc::new(Mutex::new(FixtureState {
                url: "about:blank".to_string(),
                title: String::new(),
                content: "<html><head></head><body></body></html>".to_string(),
                elements: HashMap::new(),
                faulty: HashSet::new(),
                load: LoadBehavior::Idle,
                resource_count: 0,
                navigated_at: Instant::now(),
                observing_errors: false,
                page_errors: Vec::new(),
                screenshot: Ok(FIXTURE_PNG.to_vec()),
                viewport: None,
                visits: Vec::new(),
                clicks: Vec::new(),
                closes: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FixtureState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an element under a selector expression
    pub fn with_element(self, selector: &str, element: FixtureElement) -> Self {
        let key = key_for(selector);
        self.lock().elements.entry(key).or_default().push(element);
        self
    }

    pub fn with_title(self, title: &str) -> Self {
        self.lock().title = title.to_string();
        self
    }

    pub fn with_content(self, html: &str) -> Self {
        self.lock().content = html.to_string();
        self
    }

    pub fn with_load(self, load: LoadBehavior) -> Self {
        self.lock().load = load;
        self
    }

    /// Make every probe of `selector` fail with a driver fault
    pub fn with_faulty_selector(self, selector: &str) -> Self {
        let key = key_for(selector);
        self.lock().faulty.insert(key);
        self
    }

    pub fn with_failing_screenshot(self, message: &str) -> Self {
        self.lock().screenshot = Err(message.to_string());
        self
    }

    /// Simulate an uncaught error raised by page scripts
    pub fn raise_page_error(&self, message: &str) {
        let mut state = self.lock();
        if state.observing_errors {
            state.page_errors.push(message.to_string());
        }
    }

    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    /// URLs passed to `goto`, in order
    pub fn visits(&self) -> Vec<String> {
        self.lock().visits.clone()
    }

    /// Selectors clicked, in order
    pub fn clicks(&self) -> Vec<String> {
        self.lock().clicks.clone()
    }

    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    pub fn viewport(&self) -> Option<ViewportSize> {
        self.lock().viewport.clone()
    }

    pub fn is_observing_errors(&self) -> bool {
        self.lock().observing_errors
    }
}

fn key_for(selector: &str) -> String {
    Selector::parse(selector)
        .map(|s| s.to_string())
        .unwrap_or_else(|_| selector.to_string())
}

impl FixtureState {
    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closes > 0 {
            return Err(DriverError::Session("page is closed".to_string()));
        }
        Ok(())
    }

    fn lookup(&self, selector: &Selector) -> Result<&[FixtureElement], DriverError> {
        self.ensure_open()?;
        let key = selector.to_string();
        if self.faulty.contains(&key) {
            return Err(DriverError::Command(format!(
                "probe of '{}' failed: session crashed",
                key
            )));
        }
        Ok(self.elements.get(&key).map(Vec::as_slice).unwrap_or(&[]))
    }

    fn first_visible(&self, selector: &Selector) -> Result<Option<FixtureElement>, DriverError> {
        let elapsed = self.navigated_at.elapsed();
        Ok(self
            .lookup(selector)?
            .iter()
            .find(|el| el.visible && el.appears_after.is_none_or(|delay| elapsed >= delay))
            .cloned())
    }

    fn navigate(&mut self, url: &str) {
        let resolved = url::Url::parse(&self.url)
            .and_then(|base| base.join(url))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        self.url = resolved;
        self.navigated_at = Instant::now();
    }
}

#[async_trait]
impl PageBackend for FixturePage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.visits.push(url.to_string());
        state.url = url.to_string();
        state.navigated_at = Instant::now();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let state = self.lock();
        state.ensure_open()?;
        Ok(state.url.clone())
    }

    async fn title(&self) -> Result<String, DriverError> {
        let state = self.lock();
        state.ensure_open()?;
        Ok(state.title.clone())
    }

    async fn content(&self) -> Result<String, DriverError> {
        let state = self.lock();
        state.ensure_open()?;
        Ok(state.content.clone())
    }

    async fn load_snapshot(&self) -> Result<LoadSnapshot, DriverError> {
        let mut state = self.lock();
        state.ensure_open()?;
        let ready_state = match state.load {
            LoadBehavior::Stuck => "loading",
            LoadBehavior::Idle | LoadBehavior::Busy => "complete",
        };
        if state.load == LoadBehavior::Busy {
            state.resource_count += 1;
        }
        Ok(LoadSnapshot {
            ready_state: ready_state.to_string(),
            resource_count: state.resource_count,
        })
    }

    async fn is_displayed(&self, selector: &Selector) -> Result<bool, DriverError> {
        Ok(self.lock().first_visible(selector)?.is_some())
    }

    async fn count(&self, selector: &Selector) -> Result<usize, DriverError> {
        Ok(self.lock().lookup(selector)?.len())
    }

    async fn click(&self, selector: &Selector) -> Result<(), DriverError> {
        let mut state = self.lock();
        let element = state
            .first_visible(selector)?
            .ok_or_else(|| DriverError::NotInteractable(selector.to_string()))?;
        state.clicks.push(selector.to_string());
        if let Some(target) = element.navigates_to {
            state.navigate(&target);
        }
        Ok(())
    }

    async fn text(&self, selector: &Selector) -> Result<Option<String>, DriverError> {
        Ok(self.lock().first_visible(selector)?.map(|el| el.text))
    }

    async fn links(&self, selector: &Selector) -> Result<Vec<NavLink>, DriverError> {
        Ok(self
            .lock()
            .lookup(selector)?
            .iter()
            .map(|el| NavLink {
                text: el.text.trim().to_string(),
                href: el.href.clone().unwrap_or_default(),
            })
            .collect())
    }

    async fn set_viewport(&self, viewport: &ViewportSize) -> Result<(), DriverError> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.viewport = Some(viewport.clone());
        Ok(())
    }

    async fn observe_page_errors(&self) -> Result<(), DriverError> {
        let mut state = self.lock();
        state.ensure_open()?;
        state.observing_errors = true;
        Ok(())
    }

    async fn take_page_errors(&self) -> Result<Vec<String>, DriverError> {
        let mut state = self.lock();
        state.ensure_open()?;
        Ok(std::mem::take(&mut state.page_errors))
    }

    async fn screenshot(&self, _full_page: bool) -> Result<Vec<u8>, DriverError> {
        let state = self.lock();
        state.ensure_open()?;
        state.screenshot.clone().map_err(DriverError::Command)
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.lock().closes += 1;
        Ok(())
    }
}

type PageBuilder = Box<dyn Fn() -> FixturePage + Send + Sync>;

/// Session source that builds a fresh fixture page for every test
pub struct FixtureSessions {
    build: PageBuilder,
    setup_error: Option<String>,
    opened: Mutex<Vec<FixturePage>>,
}

impl FixtureSessions {
    pub fn new(build: impl Fn() -> FixturePage + Send + Sync + 'static) -> Self {
        FixtureSessions {
            build: Box::new(build),
            setup_error: None,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Every `open` fails as if the browser could not be started
    pub fn failing(message: &str) -> Self {
        FixtureSessions {
            setup_error: Some(message.to_string()),
            ..FixtureSessions::new(FixturePage::new)
        }
    }

    /// Pages handed out so far, in order
    pub fn opened(&self) -> Vec<FixturePage> {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SessionFactory for FixtureSessions {
    async fn open(&self, _config: &SuiteConfig) -> Result<Box<dyn PageBackend>, NavError> {
        if let Some(message) = &self.setup_error {
            return Err(DriverError::Session(message.clone()).into());
        }
        let page = (self.build)();
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(page.clone());
        Ok(Box::new(page))
    }
}

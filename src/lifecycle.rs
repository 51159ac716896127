//! Per-test lifecycle: session setup, guaranteed teardown, failure
//! screenshots and the once-per-run environment artifact.

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backend::PageBackend;
use crate::config::SuiteConfig;
use crate::errors::NavError;
use crate::main_page::MainPage;
use crate::page::PageDriver;
use crate::report::{AllureSink, AttachmentKind, ReportSink, TestMeta, TestReport};
use crate::types::TestOutcome;
use crate::webdriver::Browser;

/// Opens one fresh page session per test
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, config: &SuiteConfig) -> Result<Box<dyn PageBackend>, NavError>;
}

/// Real browser sessions over WebDriver
#[derive(Debug, Clone, Copy, Default)]
pub struct WebDriverSessions;

#[async_trait]
impl SessionFactory for WebDriverSessions {
    async fn open(&self, config: &SuiteConfig) -> Result<Box<dyn PageBackend>, NavError> {
        let browser =
            Browser::new(config.browser, Some(config.viewport.clone()), !config.headed).await?;
        Ok(Box::new(browser))
    }
}

/// Everything a test body can touch
pub struct TestContext {
    config: Arc<SuiteConfig>,
    driver: PageDriver,
    report: TestReport,
    name: String,
}

impl TestContext {
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn driver(&self) -> &PageDriver {
        &self.driver
    }

    pub fn report(&self) -> &TestReport {
        &self.report
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn main_page(&self) -> MainPage<'_> {
        MainPage::new(self)
    }
}

/// What happened to one test attempt
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub name: String,
    pub outcome: TestOutcome,
    pub screenshot: Option<PathBuf>,
    pub page_errors: Vec<String>,
    pub attempts: u32,
    pub duration: Duration,
}

/// One test run: shared configuration, report sink and session source
pub struct Suite {
    config: Arc<SuiteConfig>,
    sink: Arc<dyn ReportSink>,
    sessions: Arc<dyn SessionFactory>,
}

impl Suite {
    /// Create output directories and write `environment.properties` once
    pub fn start(
        config: Arc<SuiteConfig>,
        sink: Arc<dyn ReportSink>,
        sessions: Arc<dyn SessionFactory>,
    ) -> Result<Self, NavError> {
        std::fs::create_dir_all(&config.screenshots_dir)?;
        std::fs::create_dir_all(&config.results_dir)?;

        if let Err(e) = sink.write_environment(&config.environment()) {
            warn!("Failed to write environment properties: {}", e);
        }

        info!(
            "Suite started against {} ({})",
            config.base_url,
            config.browser.name()
        );
        Ok(Suite {
            config,
            sink,
            sessions,
        })
    }

    /// Suite reporting into `config.results_dir` in the Allure format
    pub fn with_allure(
        config: Arc<SuiteConfig>,
        sessions: Arc<dyn SessionFactory>,
    ) -> Result<Self, NavError> {
        let sink = Arc::new(AllureSink::new(config.results_dir.clone()));
        Self::start(config, sink, sessions)
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run `body` in a fresh page session.
    ///
    /// The session is closed exactly once on every exit path, including a
    /// panicking body. Only a failed body triggers the screenshot hook.
    pub async fn run_test<F>(&self, meta: &TestMeta, body: F) -> TestRecord
    where
        F: for<'a> FnOnce(&'a TestContext) -> BoxFuture<'a, Result<(), NavError>>,
    {
        let started = Instant::now();
        let report = TestReport::begin(self.sink.clone(), meta);
        info!("Running {}", meta.name);

        let backend = match self.sessions.open(&self.config).await {
            Ok(backend) => backend,
            Err(e) => {
                warn!("Setup failed for {}: {}", meta.name, e);
                let outcome = TestOutcome::Broken(e.to_string());
                report.finish(&outcome);
                return TestRecord {
                    name: meta.name.to_string(),
                    outcome,
                    screenshot: None,
                    page_errors: Vec::new(),
                    attempts: 1,
                    duration: started.elapsed(),
                };
            }
        };

        let driver = PageDriver::new(backend, &self.config);
        if let Err(e) = driver.backend().set_viewport(&self.config.viewport).await {
            debug!("Could not set viewport: {}", e);
        }
        if let Err(e) = driver.backend().observe_page_errors().await {
            debug!("Could not observe page errors: {}", e);
        }

        let ctx = TestContext {
            config: self.config.clone(),
            driver,
            report,
            name: meta.name.to_string(),
        };

        let outcome = classify(AssertUnwindSafe(body(&ctx)).catch_unwind().await);

        let page_errors = match ctx.driver.backend().take_page_errors().await {
            Ok(errors) => errors,
            Err(e) => {
                debug!("Could not read page errors: {}", e);
                Vec::new()
            }
        };
        for error in &page_errors {
            warn!("Page error: {}", error);
        }

        let screenshot = if outcome.is_failed() {
            self.capture_failure(&ctx).await
        } else {
            None
        };

        let TestContext { driver, report, .. } = ctx;
        if let Err(e) = driver.close().await {
            warn!("Failed to close page for {}: {}", meta.name, e);
        }
        report.finish(&outcome);

        TestRecord {
            name: meta.name.to_string(),
            outcome,
            screenshot,
            page_errors,
            attempts: 1,
            duration: started.elapsed(),
        }
    }

    async fn capture_failure(&self, ctx: &TestContext) -> Option<PathBuf> {
        let path = self
            .config
            .screenshots_dir
            .join(format!("{}_failure.png", ctx.name));
        match ctx.driver.screenshot_to(&path, true).await {
            Ok(path) => {
                ctx.report.attach_file(
                    &format!("Failure Screenshot: {}", ctx.name),
                    &path,
                    AttachmentKind::Png,
                );
                Some(path)
            }
            Err(e) => {
                warn!("Failed to take screenshot: {}", e);
                None
            }
        }
    }
}

fn classify(result: Result<Result<(), NavError>, Box<dyn Any + Send>>) -> TestOutcome {
    match result {
        Ok(Ok(())) => TestOutcome::Passed,
        Ok(Err(NavError::Skipped(reason))) => TestOutcome::Skipped(reason),
        Ok(Err(e)) => TestOutcome::Failed(e.to_string()),
        Err(panic) => TestOutcome::Failed(format!("panicked: {}", panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

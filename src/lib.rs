//! # navprobe
#![allow(clippy::uninlined_format_args)]
//!
//! End-to-end navigation checks for a marketing website, driven over
//! WebDriver.
//!
//! Each check opens a fresh browser page, loads the main page, clicks one of
//! the primary navigation links and asserts on the resulting URL. Links are
//! located through ordered candidate selector lists: the first candidate that
//! becomes visible within its probe timeout is clicked, and a target with no
//! visible candidate skips its check instead of failing it. Failed checks
//! leave a full-page screenshot and Allure report attachments behind.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Run every check against the default site
//! navprobe run
//!
//! # Run two checks against a staging site in a visible Firefox window
//! navprobe run --base-url https://staging.example.com --browser firefox --headed \
//!     --test test_navigate_to_blog --test test_navigate_to_contacts
//!
//! # Rerun failed checks up to twice
//! navprobe run --reruns 2
//!
//! # Override candidate selectors for some targets
//! navprobe run --selectors selectors.json
//!
//! # List checks, verify drivers
//! navprobe list
//! navprobe check
//! ```
//!
//! `BASE_URL`, `BROWSER`, `HEADED` and `TIMEOUT` are read from the
//! environment; command line flags win.
//!
//! ## Library Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use navprobe::{Suite, SuiteConfig, WebDriverSessions, run_scenarios, scenarios};
//!
//! # async fn example() -> Result<(), navprobe::NavError> {
//! let config = Arc::new(SuiteConfig::from_env()?);
//! let suite = Suite::with_allure(config, Arc::new(WebDriverSessions))?;
//! let summary = run_scenarios(&suite, &scenarios::catalogue(), 0).await;
//! println!("{}", summary.summary());
//! # Ok(())
//! # }
//! ```

/// Page backend seam between page logic and browser automation
pub mod backend;

/// Suite configuration
pub mod config;

/// Error types and exit codes
pub mod errors;

/// In-memory page backend for tests
pub mod fixture;

/// Per-test setup, teardown and failure hooks
pub mod lifecycle;

/// Main page object
pub mod main_page;

/// Navigation targets and candidate selector lists
pub mod navigation;

/// Timed page primitives
pub mod page;

/// Allure report output
pub mod report;

/// Selector-fallback resolution
pub mod resolver;

/// Scenario runner and run summary
pub mod runner;

/// The navigation checks
pub mod scenarios;

/// Selector expressions
pub mod selector;

/// Shared value types
pub mod types;

/// WebDriver browser control
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use backend::PageBackend;
pub use config::SuiteConfig;
pub use errors::{DriverError, NavError};
pub use fixture::{FixtureElement, FixturePage, FixtureSessions, LoadBehavior};
pub use lifecycle::{SessionFactory, Suite, TestContext, TestRecord, WebDriverSessions};
pub use main_page::MainPage;
pub use navigation::{NavTarget, NavigationMap, TargetSpec};
pub use page::PageDriver;
pub use report::{AllureSink, ReportSink, TestMeta, TestReport};
pub use resolver::LocatorResolver;
pub use runner::{RunSummary, run_scenarios};
pub use selector::Selector;
pub use types::{LoadState, NavLink, Severity, TestOutcome, ViewportSize};
pub use webdriver::{Browser, BrowserType};

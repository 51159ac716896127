use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::NavError;

/// Browser viewport dimensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        ViewportSize {
            width: 1920,
            height: 1080,
        }
    }
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self, NavError> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(NavError::Config(
                "Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)".to_string(),
            ));
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| NavError::Config("Invalid width in viewport size".to_string()))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| NavError::Config("Invalid height in viewport size".to_string()))?;

        Ok(ViewportSize { width, height })
    }
}

/// Page load milestones a test can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// `document.readyState` is `interactive` or `complete`
    DomContentLoaded,
    /// `document.readyState` is `complete`
    Load,
    /// Load reached and no new network resources for the idle window
    NetworkIdle,
}

impl LoadState {
    /// Whether the document readiness part of this state is satisfied
    pub fn document_ready(&self, snapshot: &LoadSnapshot) -> bool {
        match self {
            LoadState::DomContentLoaded => {
                matches!(snapshot.ready_state.as_str(), "interactive" | "complete")
            }
            LoadState::Load | LoadState::NetworkIdle => snapshot.ready_state == "complete",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::DomContentLoaded => write!(f, "domcontentloaded"),
            LoadState::Load => write!(f, "load"),
            LoadState::NetworkIdle => write!(f, "networkidle"),
        }
    }
}

/// Point-in-time view of page loading, polled while waiting for a load state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    /// Value of `document.readyState`
    pub ready_state: String,
    /// Number of resource timing entries recorded so far
    pub resource_count: u64,
}

/// A rendered navigation link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    /// Trimmed text content
    pub text: String,
    /// Raw `href` attribute, empty when absent
    pub href: String,
}

/// Lifecycle of a single element interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    NotPresent,
    Visible,
    Acted,
}

/// Report severity of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Minor => "minor",
        };
        f.pad(label)
    }
}

/// Final verdict of one test run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// Failed in the test body
    Failed(String),
    /// Skipped by the test body
    Skipped(String),
    /// Setup failed before the body ran
    Broken(String),
}

impl TestOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed(_))
    }

    /// Whether this outcome makes the run exit non-zero
    pub fn counts_as_failure(&self) -> bool {
        matches!(self, TestOutcome::Failed(_) | TestOutcome::Broken(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            TestOutcome::Passed => None,
            TestOutcome::Failed(r) | TestOutcome::Skipped(r) | TestOutcome::Broken(r) => Some(r),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "PASSED",
            TestOutcome::Failed(_) => "FAILED",
            TestOutcome::Skipped(_) => "SKIPPED",
            TestOutcome::Broken(_) => "BROKEN",
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

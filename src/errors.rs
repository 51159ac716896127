use thiserror::Error;

/// Fault reported by a page backend (WebDriver session, protocol, selector)
#[derive(Debug, Error)]
pub enum DriverError {
    /// A WebDriver command was rejected or failed in transit
    #[error("WebDriver command failed: {0}")]
    Command(String),
    /// The session could not be created or is already gone
    #[error("WebDriver session unavailable: {0}")]
    Session(String),
    /// A selector expression could not be parsed
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// The element exists but no visible match could be acted on
    #[error("No visible element matching selector: {0}")]
    NotInteractable(String),
}

impl From<fantoccini::error::CmdError> for DriverError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        DriverError::Command(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for DriverError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        DriverError::Session(err.to_string())
    }
}

/// Error type for navigation checks, carrying the runner's exit codes
#[derive(Debug, Error)]
pub enum NavError {
    /// No candidate selector became visible in time (exit code 2)
    #[error("{target} not found. Tried selectors: [{}]", .candidates.join(", "))]
    ElementNotFound {
        target: String,
        candidates: Vec<String>,
    },
    /// URL or content expectation violated (exit code 3)
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),
    /// Unexpected WebDriver fault (exit code 4)
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// Page never reached the requested load state (exit code 5)
    #[error("Navigation to {url} did not reach {state} within {timeout_ms}ms")]
    NavigationTimeout {
        url: String,
        state: String,
        timeout_ms: u64,
    },
    /// Screenshot or attachment machinery failed
    #[error("Reporting failed: {0}")]
    ReportingFailure(String),
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// The test asked to be skipped
    #[error("Skipped: {0}")]
    Skipped(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NavError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            NavError::ElementNotFound { .. } => 2,
            NavError::AssertionFailed(_) => 3,
            NavError::Driver(_) => 4,
            NavError::NavigationTimeout { .. } => 5,
            NavError::ReportingFailure(_)
            | NavError::Config(_)
            | NavError::Skipped(_)
            | NavError::Io(_) => 1,
        }
    }

    /// Convenience constructor for skip requests from a test body
    pub fn skip(reason: impl Into<String>) -> Self {
        NavError::Skipped(reason.into())
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;

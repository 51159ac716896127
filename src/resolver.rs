//! Selector-fallback resolution.
//!
//! A logical target (e.g. the "Contacts" link) is described by an ordered
//! list of candidate selectors. Each candidate gets its own bounded
//! visibility probe; the first one that becomes visible is the only one acted
//! on.

use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::backend::PageBackend;
use crate::errors::{DriverError, NavError};
use crate::selector::Selector;

/// Default per-candidate visibility timeout (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for visibility probes (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Poll `selector` until it is visible or `timeout` elapses.
///
/// Returns `Ok(false)` on timeout. Driver faults are returned as errors, not
/// folded into "not visible".
pub async fn probe_visible(
    backend: &dyn PageBackend,
    selector: &Selector,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, DriverError> {
    let deadline = Instant::now() + timeout;
    loop {
        if backend.is_displayed(selector).await? {
            return Ok(true);
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(false);
        }
        sleep(poll_interval.min(deadline - now)).await;
    }
}

/// Tries candidate selectors in priority order
#[derive(Debug, Clone)]
pub struct LocatorResolver {
    probe_timeout: Duration,
    poll_interval: Duration,
}

impl Default for LocatorResolver {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS))
    }
}

impl LocatorResolver {
    pub fn new(probe_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Return the first candidate that becomes visible within its own probe
    /// timeout, or `ElementNotFound` listing every candidate tried.
    pub async fn resolve(
        &self,
        backend: &dyn PageBackend,
        target: &str,
        candidates: &[Selector],
    ) -> Result<Selector, NavError> {
        for candidate in candidates {
            debug!("Probing {} candidate: {}", target, candidate);
            if probe_visible(backend, candidate, self.probe_timeout, self.poll_interval).await? {
                info!("Resolved {} via {}", target, candidate);
                return Ok(candidate.clone());
            }
        }

        Err(NavError::ElementNotFound {
            target: target.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Resolve `candidates` and run `action` against the winning selector only
    pub async fn resolve_and_act<T, F, Fut>(
        &self,
        backend: &dyn PageBackend,
        target: &str,
        candidates: &[Selector],
        action: F,
    ) -> Result<T, NavError>
    where
        F: FnOnce(Selector) -> Fut,
        Fut: Future<Output = Result<T, NavError>>,
    {
        let selector = self.resolve(backend, target, candidates).await?;
        action(selector).await
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;

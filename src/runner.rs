//! Sequential scenario runner with whole-test reruns.

use std::time::Duration;
use tracing::info;

use crate::lifecycle::{Suite, TestRecord};
use crate::scenarios::Scenario;
use crate::types::TestOutcome;

/// Final records of a run, one per scenario
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    records: Vec<TestRecord>,
}

impl RunSummary {
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn passed_count(&self) -> usize {
        self.count(|o| matches!(o, TestOutcome::Passed))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, TestOutcome::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, TestOutcome::Skipped(_)))
    }

    pub fn broken_count(&self) -> usize {
        self.count(|o| matches!(o, TestOutcome::Broken(_)))
    }

    fn count(&self, pred: impl Fn(&TestOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }

    /// Skips do not count against the run
    pub fn all_passed(&self) -> bool {
        !self.records.iter().any(|r| r.outcome.counts_as_failure())
    }

    pub fn exit_code(&self) -> i32 {
        if self.all_passed() { 0 } else { 1 }
    }

    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.duration).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} skipped, {} broken in {:.1}s",
            self.passed_count(),
            self.failed_count(),
            self.skipped_count(),
            self.broken_count(),
            self.total_duration().as_secs_f64()
        )
    }
}

/// One printable line per test
pub fn format_record(record: &TestRecord) -> String {
    let mut line = format!("{:<8} {}", record.outcome.label(), record.name);
    if record.attempts > 1 {
        line.push_str(&format!(" (attempt {})", record.attempts));
    }
    if let Some(reason) = record.outcome.reason() {
        line.push_str(&format!(": {}", reason));
    }
    if let Some(path) = &record.screenshot {
        line.push_str(&format!("\n         screenshot: {}", path.display()));
    }
    line
}

/// Run `scenarios` in order, rerunning a failed or broken test up to `reruns` times
pub async fn run_scenarios(suite: &Suite, scenarios: &[Scenario], reruns: u32) -> RunSummary {
    let mut summary = RunSummary::default();

    for scenario in scenarios {
        let mut attempt = 1;
        let record = loop {
            let mut record = suite.run_test(&scenario.meta, scenario.run).await;
            record.attempts = attempt;
            if !record.outcome.counts_as_failure() || attempt > reruns {
                break record;
            }
            info!(
                "Rerunning {} after {} ({} of {})",
                scenario.meta.name,
                record.outcome.label(),
                attempt,
                reruns
            );
            attempt += 1;
        };
        info!("{} {}", record.outcome.label(), record.name);
        summary.records.push(record);
    }

    summary
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;

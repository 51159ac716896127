//! Test reporting in the Allure results format.
//!
//! A [`TestReport`] collects steps and attachments for one test and hands
//! them to a [`ReportSink`]. Reporting never fails a test: sink errors are
//! logged and dropped.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::errors::NavError;
use crate::types::{Severity, TestOutcome};

/// Media type of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Text,
    Json,
    Html,
    Png,
}

impl AttachmentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            AttachmentKind::Text => "text/plain",
            AttachmentKind::Json => "application/json",
            AttachmentKind::Html => "text/html",
            AttachmentKind::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AttachmentKind::Text => "txt",
            AttachmentKind::Json => "json",
            AttachmentKind::Html => "html",
            AttachmentKind::Png => "png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    Broken,
}

impl From<&TestOutcome> for Status {
    fn from(outcome: &TestOutcome) -> Self {
        match outcome {
            TestOutcome::Passed => Status::Passed,
            TestOutcome::Failed(_) => Status::Failed,
            TestOutcome::Skipped(_) => Status::Skipped,
            TestOutcome::Broken(_) => Status::Broken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    /// File name inside the results directory
    pub source: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    pub status: Status,
    pub stage: String,
    pub start: i64,
    pub stop: i64,
    #[serde(default)]
    pub steps: Vec<StepResult>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Label {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// One `<uuid>-result.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub uuid: String,
    pub history_id: String,
    pub name: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: Status,
    pub status_details: StatusDetails,
    pub stage: String,
    pub start: i64,
    pub stop: i64,
    pub steps: Vec<StepResult>,
    pub attachments: Vec<Attachment>,
    pub labels: Vec<Label>,
}

/// Static description of a test, as shown in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestMeta {
    /// Function-style identifier, also used for screenshot file names
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub feature: &'static str,
    pub story: &'static str,
}

/// Destination for report artifacts
pub trait ReportSink: Send + Sync {
    /// Store attachment bytes, returning the source name to reference them by
    fn write_attachment(&self, kind: AttachmentKind, bytes: &[u8]) -> Result<String, NavError>;

    fn write_result(&self, result: &TestResult) -> Result<(), NavError>;

    /// Write `environment.properties`
    fn write_environment(&self, properties: &[(String, String)]) -> Result<(), NavError>;
}

/// Writes Allure result files into a directory
#[derive(Debug, Clone)]
pub struct AllureSink {
    dir: PathBuf,
}

impl AllureSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        AllureSink { dir: dir.into() }
    }

    fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), NavError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            NavError::ReportingFailure(format!("Cannot create {}: {}", self.dir.display(), e))
        })?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|e| {
            NavError::ReportingFailure(format!("Cannot write {}: {}", path.display(), e))
        })
    }
}

impl ReportSink for AllureSink {
    fn write_attachment(&self, kind: AttachmentKind, bytes: &[u8]) -> Result<String, NavError> {
        let source = format!("{}-attachment.{}", uuid::Uuid::new_v4(), kind.extension());
        self.write(&source, bytes)?;
        Ok(source)
    }

    fn write_result(&self, result: &TestResult) -> Result<(), NavError> {
        let json = serde_json::to_vec_pretty(result)
            .map_err(|e| NavError::ReportingFailure(e.to_string()))?;
        self.write(&format!("{}-result.json", result.uuid), &json)
    }

    fn write_environment(&self, properties: &[(String, String)]) -> Result<(), NavError> {
        let body: String = properties
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, value))
            .collect();
        self.write("environment.properties", body.as_bytes())
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

struct ReportState {
    result: TestResult,
    open_steps: Vec<StepResult>,
}

impl ReportState {
    fn push_attachment(&mut self, attachment: Attachment) {
        match self.open_steps.last_mut() {
            Some(step) => step.attachments.push(attachment),
            None => self.result.attachments.push(attachment),
        }
    }

    fn close_step(&mut self, status: Status) {
        if let Some(mut step) = self.open_steps.pop() {
            step.status = status;
            step.stop = now_millis();
            match self.open_steps.last_mut() {
                Some(parent) => parent.steps.push(step),
                None => self.result.steps.push(step),
            }
        }
    }
}

/// Report builder for a single test run
pub struct TestReport {
    sink: Arc<dyn ReportSink>,
    state: Mutex<ReportState>,
}

impl TestReport {
    pub fn begin(sink: Arc<dyn ReportSink>, meta: &TestMeta) -> Self {
        let full_name = format!("main_page_navigation::{}", meta.name);
        let result = TestResult {
            uuid: uuid::Uuid::new_v4().to_string(),
            history_id: full_name.clone(),
            name: meta.title.to_string(),
            full_name,
            description: Some(meta.description.to_string()).filter(|d| !d.is_empty()),
            status: Status::Broken,
            status_details: StatusDetails::default(),
            stage: "running".to_string(),
            start: now_millis(),
            stop: 0,
            steps: Vec::new(),
            attachments: Vec::new(),
            labels: vec![
                Label::new("severity", meta.severity.to_string()),
                Label::new("feature", meta.feature),
                Label::new("story", meta.story),
                Label::new("suite", "main_page_navigation"),
                Label::new("testMethod", meta.name),
                Label::new("framework", "navprobe"),
                Label::new("language", "rust"),
            ],
        };
        TestReport {
            sink,
            state: Mutex::new(ReportState {
                result,
                open_steps: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReportState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn start_step(&self, name: impl Into<String>) {
        let name = name.into();
        debug!("Step: {}", name);
        let now = now_millis();
        self.lock().open_steps.push(StepResult {
            name,
            status: Status::Passed,
            stage: "finished".to_string(),
            start: now,
            stop: now,
            steps: Vec::new(),
            attachments: Vec::new(),
        });
    }

    pub fn stop_step(&self, status: Status) {
        self.lock().close_step(status);
    }

    /// Run `fut` bracketed by a named step
    pub async fn step<T, Fut>(&self, name: impl Into<String>, fut: Fut) -> Result<T, NavError>
    where
        Fut: Future<Output = Result<T, NavError>>,
    {
        self.start_step(name);
        let result = fut.await;
        let status = match &result {
            Ok(_) => Status::Passed,
            Err(NavError::Skipped(_)) => Status::Skipped,
            Err(NavError::Driver(_)) | Err(NavError::Io(_)) => Status::Broken,
            Err(_) => Status::Failed,
        };
        self.stop_step(status);
        result
    }

    /// Store `bytes` through the sink and link them under `name`
    pub fn attach(&self, name: &str, kind: AttachmentKind, bytes: &[u8]) {
        match self.sink.write_attachment(kind, bytes) {
            Ok(source) => self.lock().push_attachment(Attachment {
                name: name.to_string(),
                source,
                mime_type: kind.mime().to_string(),
            }),
            Err(e) => warn!("Failed to attach '{}': {}", name, e),
        }
    }

    pub fn attach_text(&self, name: &str, text: &str) {
        self.attach(name, AttachmentKind::Text, text.as_bytes());
    }

    pub fn attach_html(&self, name: &str, html: &str) {
        self.attach(name, AttachmentKind::Html, html.as_bytes());
    }

    pub fn attach_json<T: Serialize>(&self, name: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => self.attach(name, AttachmentKind::Json, json.as_bytes()),
            Err(e) => warn!("Failed to serialize attachment '{}': {}", name, e),
        }
    }

    /// Attach the contents of a file already on disk
    pub fn attach_file(&self, name: &str, path: &Path, kind: AttachmentKind) {
        match std::fs::read(path) {
            Ok(bytes) => self.attach(name, kind, &bytes),
            Err(e) => warn!("Failed to read attachment {}: {}", path.display(), e),
        }
    }

    /// Names of every attachment recorded so far, steps included
    pub fn attachment_names(&self) -> Vec<String> {
        fn collect(steps: &[StepResult], out: &mut Vec<String>) {
            for step in steps {
                out.extend(step.attachments.iter().map(|a| a.name.clone()));
                collect(&step.steps, out);
            }
        }

        let state = self.lock();
        let mut names: Vec<String> = state
            .result
            .attachments
            .iter()
            .map(|a| a.name.clone())
            .collect();
        collect(&state.result.steps, &mut names);
        collect(&state.open_steps, &mut names);
        names
    }

    /// Close any dangling steps, stamp the outcome and write the result
    pub fn finish(self, outcome: &TestOutcome) -> TestResult {
        let status = Status::from(outcome);
        let mut state = self.state.into_inner().unwrap_or_else(|e| e.into_inner());
        while !state.open_steps.is_empty() {
            state.close_step(Status::Broken);
        }

        let mut result = state.result;
        result.status = status;
        result.status_details.message = outcome.reason().map(str::to_string);
        result.stage = "finished".to_string();
        result.stop = now_millis();

        if let Err(e) = self.sink.write_result(&result) {
            warn!("Failed to write result for '{}': {}", result.name, e);
        }
        result
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;

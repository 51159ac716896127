// Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use navprobe::errors::NavError;
use navprobe::fixture::{FixtureElement, FixturePage};
use navprobe::main_page::{APP_ROOT_SELECTOR, LOGO_SELECTOR, MAIN_NAVIGATION_SELECTOR};
use navprobe::report::{AttachmentKind, ReportSink, StepResult, TestResult};
use navprobe::{Suite, SuiteConfig, SessionFactory};

pub const BASE_URL: &str = "https://site.test";

/// Primary navigation of the fixture site as (label, href)
pub const NAV_LINKS: [(&str, &str); 5] = [
    ("О нас", "/about/"),
    ("Контакты", "/contacts/"),
    ("Услуги", "/uslugi/"),
    ("Карьера", "/career/"),
    ("Блог", "/blog/"),
];

/// Report sink that keeps everything in memory
#[derive(Default)]
pub struct MemorySink {
    results: Mutex<Vec<TestResult>>,
    attachments: Mutex<Vec<(AttachmentKind, Vec<u8>)>>,
    environment: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn results(&self) -> Vec<TestResult> {
        self.results.lock().unwrap().clone()
    }

    pub fn environment(&self) -> Vec<(String, String)> {
        self.environment.lock().unwrap().clone()
    }

    /// Text and JSON attachment bodies, in write order
    pub fn attachment_texts(&self) -> Vec<String> {
        self.attachments
            .lock()
            .unwrap()
            .iter()
            .filter(|(kind, _)| matches!(kind, AttachmentKind::Text | AttachmentKind::Json))
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.lock().unwrap().len()
    }
}

impl ReportSink for MemorySink {
    fn write_attachment(&self, kind: AttachmentKind, bytes: &[u8]) -> Result<String, NavError> {
        let mut attachments = self.attachments.lock().unwrap();
        attachments.push((kind, bytes.to_vec()));
        Ok(format!("attachment-{}.{}", attachments.len(), kind.extension()))
    }

    fn write_result(&self, result: &TestResult) -> Result<(), NavError> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    fn write_environment(&self, properties: &[(String, String)]) -> Result<(), NavError> {
        *self.environment.lock().unwrap() = properties.to_vec();
        Ok(())
    }
}

/// Names of every attachment in a result, steps included
pub fn attachment_names(result: &TestResult) -> Vec<String> {
    fn collect(steps: &[StepResult], out: &mut Vec<String>) {
        for step in steps {
            out.extend(step.attachments.iter().map(|a| a.name.clone()));
            collect(&step.steps, out);
        }
    }
    let mut names: Vec<String> = result.attachments.iter().map(|a| a.name.clone()).collect();
    collect(&result.steps, &mut names);
    names
}

/// Names of every step in a result, depth first
pub fn step_names(result: &TestResult) -> Vec<String> {
    fn collect(steps: &[StepResult], out: &mut Vec<String>) {
        for step in steps {
            out.push(step.name.clone());
            collect(&step.steps, out);
        }
    }
    let mut names = Vec::new();
    collect(&result.steps, &mut names);
    names
}

pub fn test_config(dir: &TempDir) -> SuiteConfig {
    SuiteConfig {
        base_url: BASE_URL.to_string(),
        screenshots_dir: dir.path().join("screenshots"),
        results_dir: dir.path().join("allure-results"),
        ..SuiteConfig::default()
    }
}

/// Main page with its structural elements but no navigation links
pub fn bare_site() -> FixturePage {
    FixturePage::new()
        .with_title("Effective Mobile")
        .with_content("<html><body><div id=\"root\">Effective Mobile</div></body></html>")
        .with_element(LOGO_SELECTOR, FixtureElement::visible(""))
        .with_element(MAIN_NAVIGATION_SELECTOR, FixtureElement::visible(""))
        .with_element(APP_ROOT_SELECTOR, FixtureElement::visible("Effective Mobile"))
}

/// Main page whose navigation answers to the first text candidate of every target
pub fn marketing_site() -> FixturePage {
    site_with_links(&NAV_LINKS)
}

pub fn site_with_links(links: &[(&str, &str)]) -> FixturePage {
    let mut page = bare_site();
    for (label, href) in links {
        page = page
            .with_element(&format!("text={}", label), FixtureElement::link(*label, *href))
            .with_element("header nav a", FixtureElement::link(*label, *href));
    }
    page
}

pub fn suite(
    config: SuiteConfig,
    sessions: Arc<dyn SessionFactory>,
) -> (Suite, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let suite = Suite::start(Arc::new(config), sink.clone(), sessions).expect("suite starts");
    (suite, sink)
}

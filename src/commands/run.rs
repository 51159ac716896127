use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use navprobe::config::SuiteConfig;
use navprobe::lifecycle::{Suite, WebDriverSessions};
use navprobe::navigation::NavigationMap;
use navprobe::runner::{format_record, run_scenarios};
use navprobe::scenarios;
use navprobe::types::ViewportSize;
use navprobe::webdriver::BrowserType;

pub struct RunArgs {
    pub base_url: Option<String>,
    pub browser: Option<BrowserType>,
    pub headed: bool,
    pub timeout: Option<u64>,
    pub reruns: u32,
    pub tests: Vec<String>,
    pub viewport: Option<String>,
    pub screenshots_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub selectors: Option<PathBuf>,
}

/// Flags win over the environment; a variable is only read when its flag is absent
pub fn build_config(args: &RunArgs) -> Result<SuiteConfig> {
    build_config_with(args, |key| std::env::var(key).ok())
}

fn build_config_with<F>(args: &RunArgs, env: F) -> Result<SuiteConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SuiteConfig::from_lookup(|key| {
        let flag = match key {
            "BASE_URL" => args.base_url.clone(),
            "BROWSER" => args.browser.map(|b| b.to_string()),
            "HEADED" => args.headed.then(|| "true".to_string()),
            "TIMEOUT" => args.timeout.map(|t| t.to_string()),
            _ => None,
        };
        flag.or_else(|| env(key))
    })?;

    if let Some(viewport) = &args.viewport {
        config.viewport = ViewportSize::parse(viewport)?;
    }
    if let Some(dir) = &args.screenshots_dir {
        config.screenshots_dir = dir.clone();
    }
    if let Some(dir) = &args.results_dir {
        config.results_dir = dir.clone();
    }
    if let Some(path) = &args.selectors {
        config.navigation = NavigationMap::from_file(path)
            .with_context(|| format!("Loading selectors from {}", path.display()))?;
    }

    config.validate()?;
    Ok(config)
}

pub async fn handle_run(args: RunArgs) -> Result<i32> {
    let selected = scenarios::select(&args.tests)?;
    let config = Arc::new(build_config(&args)?);

    info!(
        "Running {} check(s) in {}{}",
        selected.len(),
        config.browser,
        if config.headed { " (headed)" } else { "" }
    );

    let suite = Suite::with_allure(config.clone(), Arc::new(WebDriverSessions))?;
    let summary = run_scenarios(&suite, &selected, args.reruns).await;

    for record in summary.records() {
        println!("{}", format_record(record));
    }
    println!();
    println!("{}", summary.summary());
    println!("Allure results: {}", config.results_dir.display());

    Ok(summary.exit_code())
}

#[cfg(test)]
#[path = "run_test.rs"]
mod run_test;

use anyhow::Result;

use navprobe::config::SuiteConfig;
use navprobe::webdriver::BrowserType;
use navprobe::webdriver_manager::WebDriverManager;

/// Report configuration and driver readiness; exit 1 when either is unusable
pub async fn handle_check(browser: Option<BrowserType>) -> Result<i32> {
    let mut healthy = true;

    let config = match SuiteConfig::from_env() {
        Ok(config) => {
            println!("Configuration: ok");
            println!("  base URL: {}", config.base_url);
            println!("  browser:  {}", config.browser);
            println!("  timeout:  {}ms", config.timeout_ms);
            Some(config)
        }
        Err(e) => {
            println!("Configuration: {}", e);
            healthy = false;
            None
        }
    };

    let browser = browser
        .or(config.as_ref().map(|c| c.browser))
        .unwrap_or(BrowserType::Chrome);
    let status = WebDriverManager::driver_status(browser).await;

    println!("{}:", status.browser);
    println!(
        "  {} in PATH: {}",
        browser.driver_binary(),
        if status.installed { "yes" } else { "no" }
    );
    match &status.running_at {
        Some(url) => println!("  running at: {}", url),
        None => println!("  running at: not detected"),
    }
    if !status.usable() {
        println!(
            "  install {} or start it on port {}",
            browser.driver_binary(),
            browser.standard_port()
        );
        healthy = false;
    }

    Ok(if healthy { 0 } else { 1 })
}

#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use navprobe::errors::NavError;
use navprobe::webdriver::BrowserType;
use navprobe::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

mod commands;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_COMMAND_ERROR: i32 = 1;

#[derive(Parser)]
#[command(name = "navprobe")]
#[command(about = "End-to-end navigation checks for a marketing website", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the navigation checks
    Run {
        /// Site under test (overrides BASE_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Browser to use (chrome, chromium, firefox)
        #[arg(short, long)]
        browser: Option<BrowserType>,

        /// Run browser in visible mode (disables headless)
        #[arg(long)]
        headed: bool,

        /// Default timeout for page operations in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Rerun a failed check up to N times
        #[arg(long, default_value = "0")]
        reruns: u32,

        /// Only run the named check (repeatable)
        #[arg(long = "test")]
        tests: Vec<String>,

        /// Viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
        #[arg(long)]
        viewport: Option<String>,

        /// Where failure screenshots are written
        #[arg(long)]
        screenshots_dir: Option<PathBuf>,

        /// Where Allure results are written
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// JSON file overriding candidate selectors and URL patterns
        #[arg(long)]
        selectors: Option<PathBuf>,
    },

    /// List the available checks
    List,

    /// Verify WebDriver binaries and configuration
    Check {
        /// Browser to check (defaults to the configured one)
        #[arg(short, long)]
        browser: Option<BrowserType>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            let exit_code = err
                .downcast_ref::<NavError>()
                .map(NavError::exit_code)
                .unwrap_or(EXIT_COMMAND_ERROR);

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": format!("{:#}", err),
                "exit_code": exit_code
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {:#}", err);
            std::process::exit(exit_code);
        }
    }
}

async fn run() -> Result<i32> {
    // Initialize tracing to stderr (so the run summary on stdout stays clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navprobe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            base_url,
            browser,
            headed,
            timeout,
            reruns,
            tests,
            viewport,
            screenshots_dir,
            results_dir,
            selectors,
        } => {
            commands::run::handle_run(commands::run::RunArgs {
                base_url,
                browser,
                headed,
                timeout,
                reruns,
                tests,
                viewport,
                screenshots_dir,
                results_dir,
                selectors,
            })
            .await
        }

        Commands::List => {
            commands::list::handle_list()?;
            Ok(EXIT_SUCCESS)
        }

        Commands::Check { browser } => commands::check::handle_check(browser).await,

        Commands::Version => {
            commands::version::handle_version()?;
            Ok(EXIT_SUCCESS)
        }
    }
}

use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::errors::DriverError;
use crate::webdriver::BrowserType;

/// Readiness of a browser's WebDriver on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStatus {
    pub browser: BrowserType,
    /// Driver binary found in PATH
    pub installed: bool,
    /// URL of a driver that answered `/status` with `ready: true`
    pub running_at: Option<String>,
}

impl DriverStatus {
    pub fn usable(&self) -> bool {
        self.installed || self.running_at.is_some()
    }
}

/// Manages WebDriver processes (geckodriver, chromedriver)
pub struct WebDriverManager {
    processes: Mutex<Vec<WebDriverProcess>>,
}

struct WebDriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
    #[cfg(unix)]
    process_group_id: Option<i32>,
}

impl Default for WebDriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<WebDriverProcess>> {
        self.processes.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Ensure a WebDriver is running for the given browser type
    /// Returns the URL to connect to
    pub async fn ensure_driver(&self, browser_type: &BrowserType) -> Result<String, DriverError> {
        let managed_urls: Vec<String> = self
            .lock()
            .iter()
            .filter(|p| p.browser_type == *browser_type)
            .map(|p| p.url.clone())
            .collect();

        for url in managed_urls {
            if Self::verify_driver_working(&url).await {
                debug!("Using existing managed WebDriver at {}", url);
                return Ok(url);
            }
        }

        // Externally managed driver on the standard port
        let standard_url = format!("http://localhost:{}", browser_type.standard_port());
        if Self::verify_driver_working(&standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url);
        }

        info!("WebDriver not detected, attempting to start automatically...");
        self.start_driver(browser_type).await
    }

    /// Report whether `browser_type` can be driven, without starting anything
    pub async fn driver_status(browser_type: BrowserType) -> DriverStatus {
        let standard_url = format!("http://localhost:{}", browser_type.standard_port());
        let running_at = if Self::verify_driver_working(&standard_url).await {
            Some(standard_url)
        } else {
            None
        };
        DriverStatus {
            browser: browser_type,
            installed: Self::command_exists(browser_type.driver_binary()),
            running_at,
        }
    }

    /// Start a WebDriver process
    async fn start_driver(&self, browser_type: &BrowserType) -> Result<String, DriverError> {
        let command = browser_type.driver_binary();
        let port = Self::find_free_port_for_browser(browser_type)?;
        let args = match browser_type {
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
            BrowserType::Chrome => vec![format!("--port={}", port)],
        };
        info!("Starting {} on port {}", command, port);

        if !Self::command_exists(command) {
            return Err(DriverError::Session(format!(
                "{} not found in PATH. Please install it:\n\
                  macOS: brew install {}\n\
                  Linux: Download from official releases\n\
                  Or see: https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/",
                command, command
            )));
        }

        let mut cmd = Command::new(command);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::null());

        // On Unix, create a new process group so we can kill the entire tree
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .map_err(|e| DriverError::Session(format!("Failed to start {}: {}", command, e)))?;

        #[cfg(unix)]
        let process_group_id = Some(child.id() as i32);

        let url = format!("http://localhost:{}", port);
        self.lock().push(WebDriverProcess {
            browser_type: *browser_type,
            child,
            port,
            url: url.clone(),
            #[cfg(unix)]
            process_group_id,
        });

        // 3 seconds total
        let max_attempts = 30;
        for attempt in 1..=max_attempts {
            if Self::is_driver_running(&url).await {
                info!("WebDriver started successfully on port {}", port);
                return Ok(url);
            }
            if attempt < max_attempts {
                sleep(Duration::from_millis(100)).await;
            }
        }

        self.stop_where(|p| p.port == port);
        Err(DriverError::Session(format!(
            "{} failed to start within timeout",
            command
        )))
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let finder = "which";
        #[cfg(windows)]
        let finder = "where";

        Command::new(finder)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Find a free port to use
    pub fn find_free_port_for_browser(browser_type: &BrowserType) -> Result<u16, DriverError> {
        let first = browser_type.standard_port();
        for port in first..first + 3 {
            if !Self::is_port_in_use(port) {
                debug!("Found free port {} for {:?}", port, browser_type);
                return Ok(port);
            }
            debug!("Port {} is in use for {:?}", port, browser_type);
        }

        // Fall back to letting OS assign a port
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .map(|addr| addr.port())
            .map_err(|e| DriverError::Session(format!("No free port for WebDriver: {}", e)))?;
        Ok(port)
    }

    /// Check if a port is in use
    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// Check if WebDriver is running at the given URL
    pub async fn is_driver_running(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Verify that WebDriver is actually working (not just running)
    async fn verify_driver_working(url: &str) -> bool {
        let status_url = format!("{}/status", url);

        match reqwest::Client::new()
            .get(&status_url)
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => match response.json::<serde_json::Value>().await {
                Ok(body) => body
                    .get("value")
                    .and_then(|v| v.get("ready"))
                    .and_then(|r| r.as_bool())
                    .unwrap_or(false),
                Err(_) => false,
            },
            Err(_) => false,
        }
    }

    /// Kill managed WebDriver processes for a browser type
    pub fn kill_driver(&self, browser_type: &BrowserType) {
        self.stop_where(|p| p.browser_type == *browser_type);
    }

    fn stop_where(&self, pred: impl Fn(&WebDriverProcess) -> bool) {
        let mut processes = self.lock();
        let (doomed, kept): (Vec<_>, Vec<_>) = processes.drain(..).partition(|p| pred(p));
        *processes = kept;
        drop(processes);

        for process in doomed {
            Self::terminate(process);
        }
    }

    fn terminate(mut process: WebDriverProcess) {
        debug!("Stopping WebDriver on port {}", process.port);

        #[cfg(unix)]
        if let Some(pgid) = process.process_group_id {
            info!(
                "Killing process group {} for WebDriver on port {}",
                pgid, process.port
            );
            Self::kill_process_group(pgid);
        }

        let _ = process.child.kill();
        let _ = process.child.wait();
    }

    /// Kill a process group on Unix systems
    #[cfg(unix)]
    fn kill_process_group(pgid: i32) {
        // First try SIGTERM for graceful shutdown
        if let Err(e) = Command::new("kill")
            .args(["-TERM", &format!("-{}", pgid)])
            .output()
        {
            debug!("Failed to send SIGTERM to process group {}: {}", pgid, e);
        }

        std::thread::sleep(Duration::from_millis(100));

        if let Err(e) = Command::new("kill")
            .args(["-KILL", &format!("-{}", pgid)])
            .output()
        {
            debug!("Failed to send SIGKILL to process group {}: {}", pgid, e);
        }
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        self.stop_where(|_| true);
    }

    pub fn managed_count(&self) -> usize {
        self.lock().len()
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

// Global WebDriver manager instance
lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;

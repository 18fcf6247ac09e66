use crate::launcher::ChromeLauncher;
use crate::profile::ProfileDir;
use crate::{ChromeFinder, Error, Result};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_ATTEMPTS: u32 = 10;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// How to start the browser
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub debugging_port: u16,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            debugging_port: crate::launcher::DEFAULT_DEBUGGING_PORT,
        }
    }
}

/// A running Chrome process with a live DevTools connection
pub struct CdpSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    process: Child,
    _profile: ProfileDir,
}

impl CdpSession {
    /// Locate Chrome, start it on a fresh profile, and connect over CDP
    pub async fn start(options: &LaunchOptions) -> Result<Self> {
        let chrome_binary = ChromeFinder::new(options.chrome_path.clone()).find()?;
        let profile = ProfileDir::temporary()?;

        let launcher = ChromeLauncher::new(chrome_binary, profile.path().to_path_buf())
            .headless(options.headless)
            .debugging_port(options.debugging_port);
        let mut process = launcher.launch()?;
        tracing::info!("Chrome started (pid {})", process.id());

        let endpoint = launcher.endpoint();
        let (browser, mut handler) = match connect_with_retries(&endpoint).await {
            Ok(connected) => connected,
            Err(e) => {
                let _ = process.kill();
                return Err(e);
            }
        };

        // The handler must be polled for any browser command to make progress
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            process,
            _profile: profile,
        })
    }

    /// Open a blank tab
    pub async fn new_page(&self) -> Result<Page> {
        Ok(self.browser.new_page("about:blank").await?)
    }

    /// Close the browser and wait for the process to exit
    pub async fn shutdown(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed, killing process: {}", e);
            let _ = self.process.kill();
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        let _ = self.process.wait();

        tracing::info!("Chrome stopped");
        Ok(())
    }
}

impl Drop for CdpSession {
    fn drop(&mut self) {
        self.handler_task.abort();
        if let Ok(None) = self.process.try_wait() {
            let _ = self.process.kill();
        }
    }
}

async fn connect_with_retries(
    endpoint: &str,
) -> Result<(Browser, chromiumoxide::handler::Handler)> {
    let mut attempts_left = CONNECT_ATTEMPTS;
    loop {
        tracing::debug!("Attempting CDP connection to {}...", endpoint);
        match Browser::connect(endpoint).await {
            Ok(connected) => {
                tracing::info!("CDP connection established");
                return Ok(connected);
            }
            Err(e) => {
                attempts_left -= 1;
                if attempts_left == 0 {
                    return Err(Error::Cdp(format!(
                        "Failed to connect to Chrome after {} attempts: {}",
                        CONNECT_ATTEMPTS, e
                    )));
                }
                tracing::debug!(
                    "CDP connection attempt failed, retrying... ({} left)",
                    attempts_left
                );
                tokio::time::sleep(CONNECT_RETRY_DELAY).await;
            }
        }
    }
}

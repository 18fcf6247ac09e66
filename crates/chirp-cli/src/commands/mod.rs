pub mod completion;
pub mod login;
pub mod output;
pub mod progress;
pub mod reply;
pub mod run;
pub mod scrape;
pub mod status;

use crate::options::BrowserArgs;
use anyhow::Result;
use chirp_browser::{BrowserAuthenticator, BrowserResponder, BrowserScraper, ChromeBrowser};
use chirp_core::config::AppConfig;
use chirp_core::storage::{FsStorage, Storage};
use std::path::Path;
use std::sync::Arc;

/// Build the runtime the async commands block on
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Open the data directory as a storage backend
pub(crate) fn open_storage(data_dir: &Path) -> Result<Arc<dyn Storage>> {
    let storage = FsStorage::open(data_dir)?;
    tracing::debug!("Using data directory {}", storage.root().display());
    Ok(Arc::new(storage))
}

/// The browser collaborators for one command, sharing a single Chrome
pub(crate) struct Collaborators {
    browser: Arc<ChromeBrowser>,
    pub authenticator: BrowserAuthenticator,
    pub scraper: BrowserScraper,
    pub responder: BrowserResponder,
}

impl Collaborators {
    pub fn new(config: &AppConfig, args: &BrowserArgs) -> Result<Self> {
        let browser = Arc::new(ChromeBrowser::new(args.browser_config()?));
        Ok(Self {
            authenticator: BrowserAuthenticator::new(browser.clone(), config.credentials.clone()),
            scraper: BrowserScraper::new(browser.clone()),
            responder: BrowserResponder::new(browser.clone()),
            browser,
        })
    }

    /// Stop Chrome if any collaborator started it
    pub async fn shutdown(&self) {
        if let Err(e) = self.browser.shutdown().await {
            tracing::warn!("Failed to stop Chrome cleanly: {}", e);
        }
    }
}

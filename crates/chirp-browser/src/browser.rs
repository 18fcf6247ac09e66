use crate::cdp_session::{CdpSession, LaunchOptions};
use crate::{Error, Result, cookies, locators};
use chirp_core::config::Timeouts;
use chirp_core::session::Session;
use chromiumoxide::Page;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://x.com/";

/// Settings shared by the browser collaborators
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub launch: LaunchOptions,
    pub timeouts: Timeouts,
    /// Site root; login, search and reply addresses are resolved against it
    pub base_url: Url,
}

impl BrowserConfig {
    pub fn new(launch: LaunchOptions, timeouts: Timeouts) -> Result<Self> {
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|e| Error::Browser(format!("invalid base url: {}", e)))?;
        Ok(Self {
            launch,
            timeouts,
            base_url,
        })
    }
}

/// A lazily started Chrome instance shared by the collaborators.
///
/// Chrome is only launched by the first operation that needs a page, so runs
/// that abort early never start a browser.
pub struct ChromeBrowser {
    config: BrowserConfig,
    session: Mutex<Option<CdpSession>>,
}

impl ChromeBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.config.timeouts
    }

    /// Open a fresh tab, starting Chrome if needed
    pub async fn open_page(&self) -> Result<Page> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            *guard = Some(CdpSession::start(&self.config.launch).await?);
        }

        match guard.as_ref() {
            Some(session) => session.new_page().await,
            None => Err(Error::Browser("browser not running".to_string())),
        }
    }

    /// Open a fresh tab carrying the cookies of `session`
    pub async fn open_authenticated_page(&self, session: &Session) -> Result<Page> {
        if session.is_empty() {
            return Err(Error::SessionRejected("stored session has no cookies".to_string()));
        }

        let page = self.open_page().await?;
        page.set_cookies(cookies::to_params(session, self.config.base_url.as_str()))
            .await?;
        tracing::debug!(cookies = session.cookies.len(), "Installed session cookies");
        Ok(page)
    }

    /// Resolve a site-relative path against the base URL
    pub fn site_url(&self, path: &str) -> Result<Url> {
        self.config.base_url.join(path).map_err(|e| Error::Navigation {
            url: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Navigate and wait for the load to finish within the navigation timeout
    pub async fn navigate(&self, page: &Page, url: &str) -> Result<()> {
        let after = self.config.timeouts.navigation;
        tracing::debug!("Navigating to {}", url);

        match tokio::time::timeout(after, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Error::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::Timeout {
                step: format!("navigation to {}", url),
                after,
            }),
        }
    }

    /// Navigate with an authenticated page, failing if the site asks to log in
    pub async fn navigate_authenticated(&self, page: &Page, url: &str) -> Result<()> {
        self.navigate(page, url).await?;

        let landed = current_url(page).await?;
        if locators::is_login_redirect(&landed) {
            tracing::warn!("Redirected to login while opening {}", url);
            return Err(Error::SessionRejected(format!(
                "redirected to {} while opening {}",
                landed, url
            )));
        }
        Ok(())
    }

    /// Stop Chrome if it was started
    pub async fn shutdown(&self) -> Result<()> {
        let session = self.session.lock().await.take();
        match session {
            Some(session) => session.shutdown().await,
            None => Ok(()),
        }
    }
}

/// Current address of `page`, empty when not yet known
pub async fn current_url(page: &Page) -> Result<String> {
    Ok(page.url().await?.unwrap_or_default())
}

/// Close a tab, logging rather than failing
pub async fn close_page(page: Page) {
    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close tab: {}", e);
    }
}

/// Pause between UI interactions the site needs to settle
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

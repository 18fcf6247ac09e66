//! Chrome-backed implementations of the chirp collaborators.
//!
//! One [`ChromeBrowser`] is shared by the authenticator, scraper and
//! responder; Chrome starts on first use and every operation runs in its own
//! tab.

mod browser;
mod cdp_session;
mod chrome_finder;
mod cookies;
mod error;
mod launcher;
pub mod locators;
mod login;
mod profile;
mod responder;
mod scraper;
mod search;
mod wait;

pub use browser::{BrowserConfig, ChromeBrowser, DEFAULT_BASE_URL};
pub use cdp_session::{CdpSession, LaunchOptions};
pub use chrome_finder::{CHROME_PATH_ENV, ChromeFinder};
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, DEFAULT_DEBUGGING_PORT};
pub use login::BrowserAuthenticator;
pub use profile::ProfileDir;
pub use responder::BrowserResponder;
pub use scraper::{BrowserScraper, DEFAULT_MAX_SCROLLS};
pub use search::search_url;
pub use wait::{POLL_INTERVAL, wait_for_element, wait_until};

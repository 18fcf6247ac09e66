use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt record '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Login failed: {0}")]
    Login(#[source] CollaboratorError),

    #[error("Scrape failed: {0}")]
    Scrape(#[source] CollaboratorError),

    #[error("Storage backend poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a login, scrape or reply collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("timed out after {after:?} waiting for {step}")]
    Timeout { step: String, after: Duration },

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("credentials rejected: {0}")]
    Credentials(String),

    #[error("session is no longer valid: {0}")]
    SessionInvalid(String),

    #[error("browser error: {0}")]
    Browser(String),
}

impl CollaboratorError {
    /// True when every further action with the same session would fail too.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, CollaboratorError::SessionInvalid(_))
    }
}

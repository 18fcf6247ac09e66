use chirp_core::CollaboratorError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {after:?} waiting for {step}")]
    Timeout { step: String, after: Duration },

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Login rejected: {0}")]
    Credentials(String),

    #[error("Session rejected: {0}")]
    SessionRejected(String),

    #[error("Unexpected page data: {0}")]
    Extraction(String),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

impl From<Error> for CollaboratorError {
    fn from(err: Error) -> Self {
        match err {
            Error::Timeout { step, after } => CollaboratorError::Timeout { step, after },
            Error::Navigation { url, reason } => {
                CollaboratorError::Navigation(format!("{}: {}", url, reason))
            }
            Error::ElementNotFound(selector) => CollaboratorError::ElementNotFound(selector),
            Error::Credentials(reason) => CollaboratorError::Credentials(reason),
            Error::SessionRejected(reason) => CollaboratorError::SessionInvalid(reason),
            other => CollaboratorError::Browser(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

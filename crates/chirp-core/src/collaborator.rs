//! Contracts for the browser-driving side of the system.
//!
//! The orchestrator only sees these traits. Implementations own every UI
//! detail (locators, typing, waits) and report failures as
//! [`CollaboratorError`] so the caller can tell a dead session from a
//! one-off glitch.

use crate::CollaboratorError;
use crate::config::SearchQuery;
use crate::post::Post;
use crate::session::Session;
use async_trait::async_trait;

pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Performs an interactive login
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self) -> CollaboratorResult<Session>;
}

/// Searches for posts matching a query
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Posts in the order the platform listed them
    async fn scrape(&self, session: &Session, query: &SearchQuery) -> CollaboratorResult<Vec<Post>>;
}

/// Submits a reply to a single post
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, session: &Session, address: &str, text: &str) -> CollaboratorResult<()>;
}

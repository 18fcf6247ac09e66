pub mod collaborator;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod post;
pub mod session;
pub mod storage;
pub mod store;

pub use error::{CollaboratorError, Error, Result};

use super::encode;
use crate::Result;
use crate::session::Session;
use crate::storage::Storage;
use std::sync::Arc;

pub const SESSION_KEY: &str = "session.json";

/// Persists the login session between runs
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load the stored session.
    ///
    /// A record that no longer parses is reported and treated as absent, since
    /// logging in again is always safe.
    pub fn load(&self) -> Result<Option<Session>> {
        let Some(bytes) = self.storage.read(SESSION_KEY)? else {
            tracing::debug!("No stored session");
            return Ok(None);
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) if session.is_empty() => {
                tracing::warn!("Stored session has no cookies, ignoring it");
                Ok(None)
            }
            Ok(session) => {
                tracing::debug!("Loaded session with {} cookies", session.cookies.len());
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable session record: {}", e);
                Ok(None)
            }
        }
    }

    /// Replace the stored session
    pub fn save(&self, session: &Session) -> Result<()> {
        let bytes = encode(SESSION_KEY, session)?;
        self.storage.write_atomic(SESSION_KEY, &bytes)?;
        tracing::info!("Saved session with {} cookies", session.cookies.len());
        Ok(())
    }

    /// Forget the stored session so the next run logs in again
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)
    }
}

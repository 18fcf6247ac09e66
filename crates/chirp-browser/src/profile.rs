use crate::Result;
use std::path::{Path, PathBuf};

/// Throwaway Chrome user-data directory, deleted on drop
///
/// Every run starts from a clean profile; authentication comes solely from the
/// stored session cookies.
pub struct ProfileDir {
    path: PathBuf,
}

impl ProfileDir {
    pub fn temporary() -> Result<Self> {
        let temp_dir = tempfile::Builder::new().prefix("chirp-profile-").tempdir()?;
        let path = temp_dir.keep();
        tracing::debug!("Created browser profile at {}", path.display());

        Ok(Self { path })
    }

    /// Get the profile directory path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

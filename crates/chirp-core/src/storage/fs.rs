use super::Storage;
use crate::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Stores each record as a file inside one data directory
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Use `root` as the data directory, creating it if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            tracing::debug!("Creating data directory: {}", root.display());
            fs::create_dir_all(&root).map_err(|e| io_error(&root.display().to_string(), e))?;
        }

        Ok(Self { root })
    }

    /// Get the data directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(Error::Config(format!("invalid storage key '{}'", key)));
        }
        Ok(self.root.join(key))
    }
}

fn io_error(key: &str, source: std::io::Error) -> Error {
    Error::Io {
        key: key.to_string(),
        source,
    }
}

impl Storage for FsStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;

        // Same directory as the target so the rename never crosses filesystems
        let mut temp = tempfile::Builder::new()
            .prefix(".chirp-")
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .map_err(|e| io_error(key, e))?;

        temp.write_all(bytes).map_err(|e| io_error(key, e))?;
        temp.as_file().sync_all().map_err(|e| io_error(key, e))?;
        temp.persist(&path).map_err(|e| io_error(key, e.error))?;

        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(prefix, e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(prefix, e))?;
            if !entry.path().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) {
                    keys.push(name.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Removed {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable consulted before the platform default locations
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Locates a Chrome or Chromium binary
pub struct ChromeFinder {
    custom_path: Option<PathBuf>,
}

impl ChromeFinder {
    /// Create a new ChromeFinder with optional custom path
    pub fn new(custom_path: Option<PathBuf>) -> Self {
        Self { custom_path }
    }

    /// Find Chrome: explicit path, then `CHROME_PATH`, then platform defaults
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.custom_path {
            return validate_chrome_path(path);
        }

        if let Some(path) = std::env::var_os(CHROME_PATH_ENV).filter(|p| !p.is_empty()) {
            tracing::debug!("Using Chrome from {}", CHROME_PATH_ENV);
            return validate_chrome_path(Path::new(&path));
        }

        let candidates = default_paths();
        if let Some(found) = candidates
            .iter()
            .find_map(|path| validate_chrome_path(path).ok())
        {
            tracing::debug!("Found Chrome at {}", found.display());
            return Ok(found);
        }

        Err(Error::Browser(format!(
            "Chrome not found. Checked: {}. Set --chrome-path or {}.",
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            CHROME_PATH_ENV
        )))
    }
}

/// Platform-specific install locations
fn default_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "macos")]
    return vec![
        PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
        PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
    ];

    #[cfg(target_os = "linux")]
    return vec![
        PathBuf::from("/usr/bin/google-chrome"),
        PathBuf::from("/usr/bin/google-chrome-stable"),
        PathBuf::from("/usr/bin/chromium"),
        PathBuf::from("/usr/bin/chromium-browser"),
        PathBuf::from("/snap/bin/chromium"),
    ];

    #[cfg(target_os = "windows")]
    return vec![
        PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
        PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
    ];

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    return vec![];
}

/// Validate that a path exists and is executable
fn validate_chrome_path(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(Error::Browser(format!(
            "Chrome not found at: {}",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path)?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(Error::Browser(format!(
                "Chrome binary not executable: {}",
                path.display()
            )));
        }
    }

    Ok(path.to_path_buf())
}

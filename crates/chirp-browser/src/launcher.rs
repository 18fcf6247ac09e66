use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

pub const DEFAULT_DEBUGGING_PORT: u16 = 9333;

/// Starts a Chrome process exposing the DevTools protocol
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    headless: bool,
    debugging_port: u16,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf) -> Self {
        Self {
            chrome_path,
            profile_path,
            headless: true,
            debugging_port: DEFAULT_DEBUGGING_PORT,
        }
    }

    /// Show the browser window instead of running headless
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn debugging_port(mut self, port: u16) -> Self {
        self.debugging_port = port;
        self
    }

    /// Launch Chrome process
    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args();
        tracing::debug!("Launching {} {}", self.chrome_path.display(), args.join(" "));

        Command::new(&self.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    /// DevTools endpoint the launched process listens on
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debugging_port)
    }

    fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            format!("--user-data-dir={}", self.profile_path.display()),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-background-networking".to_string(),
            "--disable-popup-blocking".to_string(),
            "--window-size=1280,1024".to_string(),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        args.push("about:blank".to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher() -> ChromeLauncher {
        ChromeLauncher::new(
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/tmp/profile"),
        )
    }

    #[test]
    fn test_chrome_launcher_builds_args() {
        let args = launcher().debugging_port(9444).build_args();

        assert!(args.contains(&"--remote-debugging-port=9444".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.contains(&"--headless=new".to_string()));
        assert_eq!(args.last().unwrap(), "about:blank");
    }

    #[test]
    fn test_headful_omits_headless_flag() {
        let args = launcher().headless(false).build_args();
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn test_endpoint_uses_port() {
        assert_eq!(launcher().endpoint(), "http://127.0.0.1:9333");
    }

    #[test]
    fn test_launch_missing_binary_fails() {
        let launcher = ChromeLauncher::new(
            PathBuf::from("/nonexistent/chrome"),
            PathBuf::from("/tmp/profile"),
        );
        let err = launcher.launch().unwrap_err();
        assert!(err.to_string().contains("Failed to launch Chrome"));
    }
}

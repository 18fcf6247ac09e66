use anyhow::{Result, anyhow};
use chirp_browser::{BrowserConfig, DEFAULT_DEBUGGING_PORT, LaunchOptions};
use chirp_core::config::{
    AppConfig, Credentials, DEFAULT_REPLY_TEXT, DateFilter, RunConfig, SearchQuery, Timeouts,
};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fallback variables for credentials, checked after the CHIRP_* ones
pub const LEGACY_USERNAME_ENV: &str = "TWITTER_USERNAME";
pub const LEGACY_PASSWORD_ENV: &str = "TWITTER_PASSWORD";

/// What to search for
#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Handle whose mentions are searched (with or without '@')
    #[arg(short, long, env = "CHIRP_MENTION")]
    pub mention: String,

    /// Only posts since: 'today', 'any', or a date (YYYY-MM-DD)
    #[arg(long, env = "CHIRP_SINCE", default_value = "today")]
    pub since: DateFilter,
}

impl SearchArgs {
    pub fn query(&self) -> Result<SearchQuery> {
        Ok(SearchQuery::new(&self.mention, self.since)?)
    }
}

/// How to reply
#[derive(Args, Debug, Clone)]
pub struct ReplyArgs {
    /// Text posted as the reply
    #[arg(long, env = "CHIRP_REPLY_TEXT", default_value = DEFAULT_REPLY_TEXT)]
    pub reply_text: String,

    /// Seconds to wait between replies
    #[arg(long, env = "CHIRP_REPLY_INTERVAL_SECS", default_value_t = 5)]
    pub reply_interval_secs: u64,
}

impl ReplyArgs {
    pub fn apply(&self, config: RunConfig) -> Result<RunConfig> {
        Ok(config
            .with_reply_text(self.reply_text.clone())?
            .with_reply_interval(Duration::from_secs(self.reply_interval_secs)))
    }
}

/// Browser and login settings
#[derive(Args, Debug, Clone)]
pub struct BrowserArgs {
    /// Path to the Chrome binary (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Port for the DevTools connection
    #[arg(long, default_value_t = DEFAULT_DEBUGGING_PORT)]
    pub debugging_port: u16,

    /// Seconds allowed for a page to load
    #[arg(long, default_value_t = 30)]
    pub navigation_timeout_secs: u64,

    /// Seconds allowed for an element to appear
    #[arg(long, default_value_t = 15)]
    pub element_timeout_secs: u64,

    /// Seconds allowed for a submitted reply to be accepted
    #[arg(long, default_value_t = 10)]
    pub submit_timeout_secs: u64,

    /// Account used for interactive login
    #[arg(long, env = "CHIRP_USERNAME")]
    pub username: Option<String>,

    /// Password used for interactive login
    #[arg(long, env = "CHIRP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl BrowserArgs {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            navigation: Duration::from_secs(self.navigation_timeout_secs),
            element: Duration::from_secs(self.element_timeout_secs),
            submit: Duration::from_secs(self.submit_timeout_secs),
        }
    }

    /// Credentials from flags or CHIRP_* variables, then the legacy variables
    pub fn credentials(&self) -> Option<Credentials> {
        let username = self
            .username
            .clone()
            .or_else(|| non_empty_env(LEGACY_USERNAME_ENV))?;
        let password = self
            .password
            .clone()
            .or_else(|| non_empty_env(LEGACY_PASSWORD_ENV))?;

        Some(Credentials { username, password })
    }

    pub fn browser_config(&self) -> Result<BrowserConfig> {
        let launch = LaunchOptions {
            chrome_path: self.chrome_path.clone(),
            headless: !self.headful,
            debugging_port: self.debugging_port,
        };
        Ok(BrowserConfig::new(launch, self.timeouts())?)
    }
}

/// Resolve the data directory: explicit flag, else `~/.chirp`
pub fn resolve_data_dir(data_dir: Option<&Path>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not determine home directory; pass --data-dir"))?
            .join(".chirp")),
    }
}

/// Assemble the configuration for a command that drives the browser
pub fn app_config(data_dir: Option<&Path>, run: RunConfig, browser: &BrowserArgs) -> Result<AppConfig> {
    let config = AppConfig {
        data_dir: resolve_data_dir(data_dir)?,
        run,
        timeouts: browser.timeouts(),
        credentials: browser.credentials(),
    };
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browser_args() -> BrowserArgs {
        BrowserArgs {
            chrome_path: None,
            headful: false,
            debugging_port: DEFAULT_DEBUGGING_PORT,
            navigation_timeout_secs: 30,
            element_timeout_secs: 15,
            submit_timeout_secs: 10,
            username: Some("bot".to_string()),
            password: Some("secret".to_string()),
        }
    }

    #[test]
    fn test_timeouts_from_args() {
        let timeouts = browser_args().timeouts();
        assert_eq!(timeouts, Timeouts::default());
    }

    #[test]
    fn test_explicit_credentials_win() {
        let creds = browser_args().credentials().unwrap();
        assert_eq!(creds.username, "bot");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_headful_disables_headless() {
        let mut args = browser_args();
        args.headful = true;
        assert!(!args.browser_config().unwrap().launch.headless);
    }

    #[test]
    fn test_explicit_data_dir_is_used() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/chirp-test"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/chirp-test"));
    }

    #[test]
    fn test_search_args_build_query() {
        let args = SearchArgs {
            mention: "TicodeVinci".to_string(),
            since: "any".parse().unwrap(),
        };
        let query = args.query().unwrap();
        assert_eq!(query.mention, "@TicodeVinci");
        assert_eq!(query.date_filter, DateFilter::Any);
    }

    #[test]
    fn test_reply_args_reject_blank_text() {
        let args = ReplyArgs {
            reply_text: " ".to_string(),
            reply_interval_secs: 5,
        };
        assert!(args.apply(RunConfig::default()).is_err());
    }
}

use crate::{Error, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_REPLY_TEXT: &str = "Let's goo";
pub const DEFAULT_REPLY_INTERVAL: Duration = Duration::from_secs(5);

/// Restricts search results by posting date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFilter {
    /// No date restriction
    Any,
    /// Posts from the current (local) day onwards
    #[default]
    Today,
    /// Posts from the given day onwards
    Since(NaiveDate),
}

impl DateFilter {
    /// Resolve to a concrete start date relative to `today`
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateFilter::Any => None,
            DateFilter::Today => Some(today),
            DateFilter::Since(date) => Some(*date),
        }
    }
}

impl FromStr for DateFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "any" | "all" => Ok(DateFilter::Any),
            "today" => Ok(DateFilter::Today),
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map(DateFilter::Since)
                .map_err(|_| {
                    Error::Config(format!(
                        "invalid date filter '{}': expected 'any', 'today' or YYYY-MM-DD",
                        s
                    ))
                }),
        }
    }
}

/// What the scraper searches for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Handle being mentioned, always starting with '@'
    pub mention: String,
    pub date_filter: DateFilter,
}

impl SearchQuery {
    pub fn new(mention: &str, date_filter: DateFilter) -> Result<Self> {
        let handle = mention.trim().trim_start_matches('@');
        if handle.is_empty() || handle.contains(char::is_whitespace) {
            return Err(Error::Config(format!("invalid handle '{}'", mention)));
        }

        Ok(Self {
            mention: format!("@{}", handle),
            date_filter,
        })
    }
}

/// Upper bounds for each kind of browser wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Page navigation and load
    pub navigation: Duration,
    /// Waiting for an element to appear
    pub element: Duration,
    /// Waiting for a submitted reply to be accepted
    pub submit: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            element: Duration::from_secs(15),
            submit: Duration::from_secs(10),
        }
    }
}

/// Account credentials for interactive login
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Settings for one orchestrated run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Required by any operation that scrapes
    pub query: Option<SearchQuery>,
    pub reply_text: String,
    /// Pause between consecutive reply attempts
    pub reply_interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            query: None,
            reply_text: DEFAULT_REPLY_TEXT.to_string(),
            reply_interval: DEFAULT_REPLY_INTERVAL,
        }
    }
}

impl RunConfig {
    pub fn new(query: SearchQuery) -> Self {
        Self {
            query: Some(query),
            ..Self::default()
        }
    }

    /// The search query, or a configuration error when none was given
    pub fn query(&self) -> Result<&SearchQuery> {
        self.query
            .as_ref()
            .ok_or_else(|| Error::Config("no mention to search for".to_string()))
    }

    pub fn with_reply_text(mut self, text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::Config("reply text must not be empty".to_string()));
        }
        self.reply_text = text;
        Ok(self)
    }

    pub fn with_reply_interval(mut self, interval: Duration) -> Self {
        self.reply_interval = interval;
        self
    }
}

/// Everything a run needs, resolved from flags, environment and defaults
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the session, seen-set and snapshot records
    pub data_dir: PathBuf,
    pub run: RunConfig,
    pub timeouts: Timeouts,
    pub credentials: Option<Credentials>,
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authentication state captured after login
///
/// Treated as opaque: the core only checks presence and hands it to the
/// browser collaborators, which attach the cookies before navigating.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    pub cookies: Vec<Cookie>,
}

impl Session {
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Browser cookie as reported by the DevTools protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Seconds since the Unix epoch, negative or absent for session cookies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    /// Fields this crate does not interpret, kept for round-tripping
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: false,
            secure: false,
            same_site: None,
            extra: Map::new(),
        }
    }
}

use super::address::post_id_from_address;
use super::count;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "tweetId")]
    pub id: String,
    #[serde(alias = "username")]
    pub author: String,
    #[serde(alias = "tweetText")]
    pub text: String,
    #[serde(alias = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Canonical locator, used to navigate back to the post when replying
    #[serde(alias = "tweetUrl")]
    pub address: String,
    #[serde(default)]
    pub metrics: Metrics,
}

impl Post {
    /// Build a post, deriving its id from the address.
    ///
    /// Returns `None` when no id can be extracted.
    pub fn from_address(
        address: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        metrics: Metrics,
    ) -> Option<Self> {
        let address = address.into();
        let id = post_id_from_address(&address)?;

        Some(Self {
            id,
            author: author.into(),
            text: text.into(),
            created_at,
            address,
            metrics,
        })
    }
}

/// Engagement counters shown under a post
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(alias = "replies", default, deserialize_with = "count::deserialize")]
    pub reply_count: u64,
    #[serde(alias = "retweets", default, deserialize_with = "count::deserialize")]
    pub share_count: u64,
    #[serde(alias = "likes", default, deserialize_with = "count::deserialize")]
    pub like_count: u64,
}

impl Metrics {
    /// Parse the compact labels rendered by the platform ("12", "1.2K", "")
    pub fn from_labels(replies: &str, shares: &str, likes: &str) -> Self {
        Self {
            reply_count: count::parse_count(replies).unwrap_or_default(),
            share_count: count::parse_count(shares).unwrap_or_default(),
            like_count: count::parse_count(likes).unwrap_or_default(),
        }
    }
}

/// One batch of posts captured by a single scraping run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub created_at: DateTime<Utc>,
    /// Tie-break for snapshots sharing a timestamp
    #[serde(default)]
    pub sequence: u64,
    pub posts: Vec<Post>,
}

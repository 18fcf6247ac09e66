use crate::browser::{ChromeBrowser, SETTLE_DELAY, close_page};
use crate::search::search_url;
use crate::wait::wait_until;
use crate::{Error, Result, locators};
use async_trait::async_trait;
use chirp_core::collaborator::{CollaboratorResult, Scraper};
use chirp_core::config::SearchQuery;
use chirp_core::post::{Metrics, Post};
use chirp_core::session::Session;
use chrono::{DateTime, Local, Utc};
use chromiumoxide::Page;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// How many times the results timeline is scrolled for more posts
pub const DEFAULT_MAX_SCROLLS: usize = 3;

/// Post fields as read from the page, before parsing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPost {
    address: String,
    author: String,
    text: String,
    timestamp: Option<String>,
    replies: String,
    shares: String,
    likes: String,
}

impl RawPost {
    fn into_post(self, scraped_at: DateTime<Utc>) -> Option<Post> {
        let created_at = self
            .timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or(scraped_at);
        let metrics = Metrics::from_labels(&self.replies, &self.shares, &self.likes);

        Post::from_address(self.address, self.author, self.text, created_at, metrics)
    }
}

/// Searches live results for mentions and reads the visible posts
pub struct BrowserScraper {
    browser: Arc<ChromeBrowser>,
    max_scrolls: usize,
}

impl BrowserScraper {
    pub fn new(browser: Arc<ChromeBrowser>) -> Self {
        Self {
            browser,
            max_scrolls: DEFAULT_MAX_SCROLLS,
        }
    }

    pub fn with_max_scrolls(mut self, max_scrolls: usize) -> Self {
        self.max_scrolls = max_scrolls;
        self
    }

    async fn search(&self, session: &Session, query: &SearchQuery) -> Result<Vec<Post>> {
        let page = self.browser.open_authenticated_page(session).await?;
        let result = self.collect(&page, query).await;
        close_page(page).await;
        result
    }

    async fn collect(&self, page: &Page, query: &SearchQuery) -> Result<Vec<Post>> {
        let today = Local::now().date_naive();
        let url = search_url(&self.browser.config().base_url, query, today)?;
        self.browser.navigate_authenticated(page, url.as_str()).await?;

        let has_results = wait_until("search results", self.browser.timeouts().element, move || async move {
            if page.find_element(locators::POST_ARTICLE).await.is_ok() {
                Some(true)
            } else if page.find_element(locators::EMPTY_RESULTS).await.is_ok() {
                Some(false)
            } else {
                None
            }
        })
        .await?;

        if !has_results {
            tracing::info!("No posts mention {}", query.mention);
            return Ok(Vec::new());
        }

        let mut ids = HashSet::new();
        let mut posts = Vec::new();
        for round in 0..=self.max_scrolls {
            let before = posts.len();
            for post in extract_posts(page).await? {
                if ids.insert(post.id.clone()) {
                    posts.push(post);
                }
            }
            tracing::debug!(round, found = posts.len() - before, "Read visible posts");

            if round == self.max_scrolls || (round > 0 && posts.len() == before) {
                break;
            }
            page.evaluate(locators::SCROLL_JS).await?;
            tokio::time::sleep(SETTLE_DELAY * 2).await;
        }

        tracing::info!(mention = %query.mention, count = posts.len(), "Scraped posts");
        Ok(posts)
    }
}

async fn extract_posts(page: &Page) -> Result<Vec<Post>> {
    let raw: Vec<RawPost> = page
        .evaluate(locators::EXTRACT_POSTS_JS)
        .await?
        .into_value()
        .map_err(|e| Error::Extraction(format!("post list: {}", e)))?;

    Ok(into_posts(raw, Utc::now()))
}

fn into_posts(raw: Vec<RawPost>, scraped_at: DateTime<Utc>) -> Vec<Post> {
    raw.into_iter()
        .filter_map(|raw| {
            let address = raw.address.clone();
            let post = raw.into_post(scraped_at);
            if post.is_none() {
                tracing::debug!("Skipping post without an id (address '{}')", address);
            }
            post
        })
        .collect()
}

#[async_trait]
impl Scraper for BrowserScraper {
    async fn scrape(&self, session: &Session, query: &SearchQuery) -> CollaboratorResult<Vec<Post>> {
        self.search(session, query).await.map_err(Into::into)
    }
}

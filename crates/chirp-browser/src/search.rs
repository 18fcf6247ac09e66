use crate::{Error, Result};
use chirp_core::config::SearchQuery;
use chrono::NaiveDate;
use url::Url;

/// Build the live-results search address for `query`.
///
/// The date filter is expressed with the `since:` operator, resolved against
/// `today`.
pub fn search_url(base: &Url, query: &SearchQuery, today: NaiveDate) -> Result<Url> {
    let mut terms = query.mention.clone();
    if let Some(since) = query.date_filter.since(today) {
        terms.push_str(&format!(" since:{}", since.format("%Y-%m-%d")));
    }

    let mut url = base.join("search").map_err(|e| Error::Navigation {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("q", &terms)
        .append_pair("src", "typed_query")
        .append_pair("f", "live");

    Ok(url)
}

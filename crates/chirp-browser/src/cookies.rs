use crate::{Error, Result};
use chirp_core::session::{Cookie, Session};
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie as CdpCookie, CookieParam, CookieSameSite, TimeSinceEpoch,
};

/// Cookie parameters to install a stored session into a page.
///
/// Cookies without a domain are scoped to `fallback_url`.
pub fn to_params(session: &Session, fallback_url: &str) -> Vec<CookieParam> {
    session
        .cookies
        .iter()
        .map(|cookie| to_param(cookie, fallback_url))
        .collect()
}

fn to_param(cookie: &Cookie, fallback_url: &str) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = cookie.domain.clone();
    if param.domain.is_none() {
        param.url = Some(fallback_url.to_string());
    }
    param.path = cookie.path.clone();
    param.secure = Some(cookie.secure);
    param.http_only = Some(cookie.http_only);
    param.same_site = cookie
        .same_site
        .as_deref()
        .and_then(|s| s.parse::<CookieSameSite>().ok());
    // Session cookies carry a negative expiry; leaving it unset keeps them session-scoped
    param.expires = cookie
        .expires
        .filter(|e| *e > 0.0)
        .map(TimeSinceEpoch::new);
    param
}

/// Capture the browser's cookies as a storable session
pub fn from_cdp(cookies: Vec<CdpCookie>) -> Result<Session> {
    let cookies = cookies
        .into_iter()
        .map(|cookie| {
            serde_json::to_value(&cookie)
                .and_then(serde_json::from_value::<Cookie>)
                .map_err(|e| Error::Extraction(format!("cookie '{}': {}", cookie.name, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Session::new(cookies))
}

//! Page structure the collaborators depend on.
//!
//! Everything here tracks the live site markup and is the first place to look
//! when a step starts timing out.

pub const LOGIN_PATH: &str = "i/flow/login";
pub const HOME_PATH: &str = "home";

pub const USERNAME_INPUT: &str = r#"input[autocomplete="username"]"#;
pub const PASSWORD_INPUT: &str = r#"input[name="password"]"#;

pub const POST_ARTICLE: &str = r#"[data-testid="tweet"]"#;
pub const EMPTY_RESULTS: &str = r#"[data-testid="emptyState"]"#;

pub const REPLY_EDITOR: &str = r#"[data-testid="tweetTextarea_0"]"#;
pub const REPLY_SUBMIT: &str = r#"[data-testid="tweetButtonInline"]"#;

/// URL fragments that mean the site bounced us to the login flow
pub const LOGIN_REDIRECT_MARKERS: &[&str] = &["/i/flow/login", "/login", "/account/access"];

/// Collects the visible posts as an array of raw records
pub const EXTRACT_POSTS_JS: &str = r#"
(() => {
  const text = (root, sel) => root.querySelector(sel)?.textContent?.trim() ?? '';
  return Array.from(document.querySelectorAll('[data-testid="tweet"]')).map(article => {
    const time = article.querySelector('time');
    const link = time?.closest('a') ?? article.querySelector('a[href*="/status/"]');
    return {
      address: link?.href ?? '',
      author: text(article, '[data-testid="User-Name"]'),
      text: text(article, '[data-testid="tweetText"]'),
      timestamp: time?.getAttribute('datetime') ?? null,
      replies: text(article, '[data-testid="reply"]'),
      shares: text(article, '[data-testid="retweet"]'),
      likes: text(article, '[data-testid="like"]'),
    };
  });
})()
"#;

/// True once the inline reply button is gone or disabled
pub const REPLY_ACCEPTED_JS: &str = r#"
(() => {
  const button = document.querySelector('[data-testid="tweetButtonInline"]');
  return !button || button.disabled || button.getAttribute('aria-disabled') === 'true';
})()
"#;

/// Scrolls the timeline by one viewport to load further results
pub const SCROLL_JS: &str = "window.scrollBy(0, window.innerHeight); true";

pub fn is_login_redirect(url: &str) -> bool {
    LOGIN_REDIRECT_MARKERS.iter().any(|marker| url.contains(marker))
}

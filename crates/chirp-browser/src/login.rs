use crate::browser::{ChromeBrowser, close_page, current_url};
use crate::wait::{wait_for_element, wait_until};
use crate::{Error, Result, cookies, locators};
use async_trait::async_trait;
use chirp_core::collaborator::{Authenticator, CollaboratorResult};
use chirp_core::config::Credentials;
use chirp_core::session::Session;
use chromiumoxide::Page;
use std::sync::Arc;

/// Logs in through the site's login flow and captures the resulting cookies
pub struct BrowserAuthenticator {
    browser: Arc<ChromeBrowser>,
    credentials: Option<Credentials>,
}

impl BrowserAuthenticator {
    pub fn new(browser: Arc<ChromeBrowser>, credentials: Option<Credentials>) -> Self {
        Self {
            browser,
            credentials,
        }
    }

    async fn perform_login(&self) -> Result<Session> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            Error::Credentials("no username and password configured".to_string())
        })?;

        let page = self.browser.open_page().await?;
        let result = self.drive_login_flow(&page, credentials).await;
        close_page(page).await;
        result
    }

    async fn drive_login_flow(&self, page: &Page, credentials: &Credentials) -> Result<Session> {
        let timeouts = *self.browser.timeouts();
        let login_url = self.browser.site_url(locators::LOGIN_PATH)?;
        self.browser.navigate(page, login_url.as_str()).await?;

        let username = wait_for_element(page, locators::USERNAME_INPUT, timeouts.element).await?;
        username.click().await?;
        username.type_str(&credentials.username).await?;
        username.press_key("Enter").await?;
        tracing::debug!("Submitted username");

        // A missing password prompt usually means the account needs extra verification
        let password = wait_for_element(page, locators::PASSWORD_INPUT, timeouts.element)
            .await
            .map_err(|e| match e {
                Error::ElementNotFound(_) => Error::Credentials(format!(
                    "no password prompt after submitting username '{}'",
                    credentials.username
                )),
                other => other,
            })?;
        password.click().await?;
        password.type_str(&credentials.password).await?;
        password.press_key("Enter").await?;
        tracing::debug!("Submitted password");

        let home_marker = format!("/{}", locators::HOME_PATH);
        let home_marker = home_marker.as_str();
        wait_until("home timeline", timeouts.navigation, move || async move {
            current_url(page)
                .await
                .ok()
                .filter(|url| url.contains(home_marker))
        })
        .await
        .map_err(|e| match e {
            Error::Timeout { .. } => {
                Error::Credentials("login did not reach the home timeline".to_string())
            }
            other => other,
        })?;

        let session = cookies::from_cdp(page.get_cookies().await?)?;
        if session.is_empty() {
            return Err(Error::Credentials(
                "login finished without any cookies".to_string(),
            ));
        }

        tracing::info!(cookies = session.cookies.len(), "Logged in as {}", credentials.username);
        Ok(session)
    }
}

#[async_trait]
impl Authenticator for BrowserAuthenticator {
    async fn login(&self) -> CollaboratorResult<Session> {
        self.perform_login().await.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserConfig;
    use crate::cdp_session::LaunchOptions;
    use chirp_core::CollaboratorError;
    use chirp_core::config::Timeouts;

    #[tokio::test]
    async fn test_login_without_credentials_fails_before_launch() {
        let browser = Arc::new(ChromeBrowser::new(
            BrowserConfig::new(LaunchOptions::default(), Timeouts::default()).unwrap(),
        ));
        let authenticator = BrowserAuthenticator::new(browser, None);

        let err = authenticator.login().await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Credentials(_)));
    }
}

use crate::browser::{ChromeBrowser, SETTLE_DELAY, close_page};
use crate::wait::{wait_for_element, wait_until};
use crate::{Result, locators};
use async_trait::async_trait;
use chirp_core::collaborator::{CollaboratorResult, Responder};
use chirp_core::session::Session;
use chromiumoxide::Page;
use std::sync::Arc;

/// Types and submits a reply on a post's page
pub struct BrowserResponder {
    browser: Arc<ChromeBrowser>,
}

impl BrowserResponder {
    pub fn new(browser: Arc<ChromeBrowser>) -> Self {
        Self { browser }
    }

    async fn send(&self, session: &Session, address: &str, text: &str) -> Result<()> {
        let page = self.browser.open_authenticated_page(session).await?;
        let result = self.submit(&page, address, text).await;
        close_page(page).await;
        result
    }

    async fn submit(&self, page: &Page, address: &str, text: &str) -> Result<()> {
        let timeouts = *self.browser.timeouts();
        let url = self.browser.site_url(address)?;
        self.browser.navigate_authenticated(page, url.as_str()).await?;

        let editor = wait_for_element(page, locators::REPLY_EDITOR, timeouts.element).await?;
        editor.click().await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        editor.type_str(text).await?;

        let submit = wait_for_element(page, locators::REPLY_SUBMIT, timeouts.element).await?;
        submit.click().await?;

        wait_until("reply submission", timeouts.submit, move || async move {
            page.evaluate(locators::REPLY_ACCEPTED_JS)
                .await
                .ok()?
                .into_value::<bool>()
                .ok()
                .filter(|accepted| *accepted)
        })
        .await?;

        tracing::debug!("Reply accepted on {}", url);
        Ok(())
    }
}

#[async_trait]
impl Responder for BrowserResponder {
    async fn reply(&self, session: &Session, address: &str, text: &str) -> CollaboratorResult<()> {
        self.send(session, address, text).await.map_err(Into::into)
    }
}

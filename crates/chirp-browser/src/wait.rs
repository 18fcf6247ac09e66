use crate::{Error, Result};
use chromiumoxide::{Element, Page};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Interval between condition probes
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `probe` until it yields a value or `timeout` elapses.
///
/// The probe runs at least once. On expiry the error names `step`.
pub async fn wait_until<T, F, Fut>(step: &str, timeout: Duration, mut probe: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            tracing::debug!("Gave up waiting for {} after {:?}", step, timeout);
            return Err(Error::Timeout {
                step: step.to_string(),
                after: timeout,
            });
        }

        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Wait for `selector` to match an element on `page`
pub async fn wait_for_element(page: &Page, selector: &str, timeout: Duration) -> Result<Element> {
    wait_until(selector, timeout, move || async move {
        page.find_element(selector).await.ok()
    })
    .await
    .map_err(|e| match e {
        Error::Timeout { after, .. } => {
            Error::ElementNotFound(format!("{} (waited {:?})", selector, after))
        }
        other => other,
    })
}

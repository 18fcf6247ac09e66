//! One pass of session acquisition, scraping and replying.
//!
//! A run is strictly sequential: the snapshot is durably written before any
//! reply is attempted, replies go out one at a time, and each success is
//! recorded in the seen-set before the next attempt. Re-running after a crash
//! is therefore safe; at worst a reply that went out right before the crash
//! is not yet recorded.

mod report;
mod select;

pub use report::{ReplyFailure, RunOutcome, RunReport};
pub use select::select_targets;

use crate::collaborator::{Authenticator, CollaboratorResult, Responder, Scraper};
use crate::config::RunConfig;
use crate::post::Post;
use crate::session::Session;
use crate::storage::Storage;
use crate::store::{ResultStore, SeenSetStore, SessionStore, SnapshotHandle};
use crate::{CollaboratorError, Error, Result};
use std::sync::Arc;

/// Receives progress notifications while a reply batch runs
pub trait RunObserver: Send + Sync {
    fn batch_started(&self, _targets: usize) {}

    fn reply_finished(&self, _post: &Post, _result: &CollaboratorResult<()>) {}
}

/// Wires the stores to the browser collaborators
pub struct Orchestrator<'a> {
    config: &'a RunConfig,
    storage: Arc<dyn Storage>,
    sessions: SessionStore,
    results: ResultStore,
    authenticator: &'a dyn Authenticator,
    scraper: &'a dyn Scraper,
    responder: &'a dyn Responder,
    observer: Option<&'a dyn RunObserver>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a RunConfig,
        storage: Arc<dyn Storage>,
        authenticator: &'a dyn Authenticator,
        scraper: &'a dyn Scraper,
        responder: &'a dyn Responder,
    ) -> Self {
        Self {
            config,
            sessions: SessionStore::new(storage.clone()),
            results: ResultStore::new(storage.clone()),
            storage,
            authenticator,
            scraper,
            responder,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn RunObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Full pass: session, scrape, select, reply
    pub async fn run(&self) -> Result<RunReport> {
        self.config.query()?;
        // Opened first so a corrupt record aborts before any browser work
        let mut seen = SeenSetStore::load(self.storage.clone())?;

        let session = self.acquire_session().await?;
        let snapshot = self.scrape(&session).await?;

        self.reply_batch(&session, &mut seen, Some(snapshot.post_count))
            .await
    }

    /// Acquire a session, scrape, and store the snapshot without replying
    pub async fn scrape_only(&self) -> Result<SnapshotHandle> {
        self.config.query()?;
        let session = self.acquire_session().await?;
        self.scrape(&session).await
    }

    /// Reply to pending posts of the latest stored snapshot without scraping
    pub async fn reply_pending(&self) -> Result<RunReport> {
        let mut seen = SeenSetStore::load(self.storage.clone())?;
        let session = self.acquire_session().await?;

        self.reply_batch(&session, &mut seen, None).await
    }

    /// Log in interactively and replace the stored session
    pub async fn refresh_session(&self) -> Result<Session> {
        let session = self.authenticator.login().await.map_err(Error::Login)?;
        self.sessions.save(&session)?;
        Ok(session)
    }

    async fn acquire_session(&self) -> Result<Session> {
        if let Some(session) = self.sessions.load()? {
            tracing::info!("Reusing stored session");
            return Ok(session);
        }

        tracing::info!("No stored session, performing fresh login");
        self.refresh_session().await
    }

    async fn scrape(&self, session: &Session) -> Result<SnapshotHandle> {
        let query = self.config.query()?;
        tracing::info!("Searching for posts mentioning {}", query.mention);

        let posts = match self.scraper.scrape(session, query).await {
            Ok(posts) => posts,
            Err(e) => {
                self.forget_session_if_invalid(&e);
                return Err(Error::Scrape(e));
            }
        };
        tracing::info!("Found {} posts", posts.len());

        let handle = self.results.write_snapshot(posts)?;
        let pruned = self.results.prune_older_than_latest()?;
        if pruned > 0 {
            tracing::debug!("Pruned {} old snapshots", pruned);
        }

        Ok(handle)
    }

    async fn reply_batch(
        &self,
        session: &Session,
        seen: &mut SeenSetStore,
        scraped: Option<usize>,
    ) -> Result<RunReport> {
        let posts = match self.results.latest()? {
            Some(snapshot) => snapshot.posts,
            None => {
                tracing::info!("No snapshot found, nothing to reply to");
                Vec::new()
            }
        };

        let targets = select_targets(&posts, seen);
        let mut report = RunReport::new(scraped, targets.len());
        tracing::info!("{} new posts to reply to", targets.len());
        if let Some(observer) = self.observer {
            observer.batch_started(targets.len());
        }

        for (idx, post) in targets.iter().enumerate() {
            if idx > 0 && !self.config.reply_interval.is_zero() {
                tokio::time::sleep(self.config.reply_interval).await;
            }

            tracing::info!(post_id = %post.id, "Replying to {}", post.address);
            report.attempted += 1;
            let result = self
                .responder
                .reply(session, &post.address, &self.config.reply_text)
                .await;

            if let Some(observer) = self.observer {
                observer.reply_finished(post, &result);
            }

            match result {
                Ok(()) => {
                    // Recorded before the next attempt so a restart never replies twice
                    seen.mark_done(&post.id)?;
                    report.succeeded += 1;
                    tracing::info!(post_id = %post.id, "Reply posted");
                }
                Err(e) if e.is_session_invalid() => {
                    report.failed += 1;
                    report.skipped = targets.len() - idx - 1;
                    report.failures.push(failure(post, &e));
                    report.outcome = RunOutcome::BatchAborted {
                        post_id: post.id.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!(
                        post_id = %post.id,
                        "Session rejected ({}), skipping {} remaining posts",
                        e,
                        report.skipped
                    );
                    self.forget_session_if_invalid(&e);
                    break;
                }
                Err(e) => {
                    report.failed += 1;
                    report.failures.push(failure(post, &e));
                    tracing::warn!(post_id = %post.id, "Reply failed: {}", e);
                }
            }
        }

        tracing::info!(
            "Run finished: {} attempted, {} succeeded, {} failed, {} skipped",
            report.attempted,
            report.succeeded,
            report.failed,
            report.skipped
        );
        Ok(report)
    }

    /// Drop a stored session the platform no longer accepts so the next run logs in
    fn forget_session_if_invalid(&self, err: &CollaboratorError) {
        if !err.is_session_invalid() {
            return;
        }
        match self.sessions.clear() {
            Ok(()) => tracing::info!("Cleared stored session; next run will log in again"),
            Err(e) => tracing::warn!("Failed to clear stored session: {}", e),
        }
    }
}

fn failure(post: &Post, err: &CollaboratorError) -> ReplyFailure {
    ReplyFailure {
        post_id: post.id.clone(),
        address: post.address.clone(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DateFilter, SearchQuery};
    use crate::post::{Metrics, Snapshot};
    use crate::session::Cookie;
    use crate::storage::MemoryStorage;
    use crate::store::{SEEN_SET_KEY, SESSION_KEY};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeAuthenticator {
        logins: AtomicUsize,
        fail: bool,
    }

    impl FakeAuthenticator {
        fn ok() -> Self {
            Self {
                logins: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                logins: AtomicUsize::new(0),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Authenticator for FakeAuthenticator {
        async fn login(&self) -> CollaboratorResult<Session> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CollaboratorError::Credentials("wrong password".into()));
            }
            Ok(Session::new(vec![Cookie::new("auth_token", "fresh")]))
        }
    }

    struct FakeScraper {
        result: CollaboratorResult<Vec<Post>>,
        calls: AtomicUsize,
    }

    impl FakeScraper {
        fn returning(ids: &[&str]) -> Self {
            Self {
                result: Ok(ids.iter().map(|id| post(id)).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(err: CollaboratorError) -> Self {
            Self {
                result: Err(err),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Scraper for FakeScraper {
        async fn scrape(
            &self,
            _session: &Session,
            _query: &SearchQuery,
        ) -> CollaboratorResult<Vec<Post>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// Succeeds unless a failure is scripted for the post id
    #[derive(Default)]
    struct FakeResponder {
        failures: HashMap<String, CollaboratorError>,
        attempts: Mutex<Vec<String>>,
    }

    impl FakeResponder {
        fn failing_on(id: &str, err: CollaboratorError) -> Self {
            let mut failures = HashMap::new();
            failures.insert(id.to_string(), err);
            Self {
                failures,
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Responder for FakeResponder {
        async fn reply(
            &self,
            _session: &Session,
            address: &str,
            _text: &str,
        ) -> CollaboratorResult<()> {
            let id = crate::post::post_id_from_address(address).unwrap();
            self.attempts.lock().unwrap().push(id.clone());
            match self.failures.get(&id) {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            author: format!("user{}", id),
            text: "@handle hi".to_string(),
            created_at: Utc::now(),
            address: format!("https://x.com/user{}/status/{}", id, id),
            metrics: Metrics::default(),
        }
    }

    fn config() -> RunConfig {
        RunConfig::new(SearchQuery::new("handle", DateFilter::Today).unwrap())
            .with_reply_interval(Duration::ZERO)
    }

    fn storage_with(seen: &[&str], session: bool) -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        if !seen.is_empty() {
            let mut store = SeenSetStore::load(storage.clone()).unwrap();
            for id in seen {
                store.mark_done(id).unwrap();
            }
        }
        if session {
            SessionStore::new(storage.clone())
                .save(&Session::new(vec![Cookie::new("auth_token", "stored")]))
                .unwrap();
        }
        storage
    }

    fn seen_ids(storage: &Arc<MemoryStorage>) -> Vec<String> {
        SeenSetStore::load(storage.clone())
            .unwrap()
            .ids()
            .map(String::from)
            .collect()
    }

    #[tokio::test]
    async fn test_replies_only_to_unseen_posts() {
        let storage = storage_with(&["101"], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["101", "202", "303"]);
        let responder = FakeResponder::default();

        let report = Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(responder.attempts(), vec!["202", "303"]);
        assert_eq!(seen_ids(&storage), vec!["101", "202", "303"]);
        assert_eq!(report.scraped, Some(3));
        assert_eq!(report.targets, 2);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_transient_failure_continues_batch() {
        let storage = storage_with(&["101"], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["101", "202", "303"]);
        let responder = FakeResponder::failing_on(
            "202",
            CollaboratorError::Timeout {
                step: "reply box".into(),
                after: Duration::from_secs(15),
            },
        );

        let report = Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(responder.attempts(), vec!["202", "303"]);
        assert_eq!(seen_ids(&storage), vec!["101", "303"]);
        assert_eq!(report.attempted, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.failures[0].post_id, "202");
        assert!(report.is_partial());
    }

    #[tokio::test]
    async fn test_session_invalid_aborts_remaining_batch() {
        let storage = storage_with(&["101"], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["101", "202", "303"]);
        let responder = FakeResponder::failing_on(
            "202",
            CollaboratorError::SessionInvalid("redirected to login".into()),
        );

        let report = Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(responder.attempts(), vec!["202"]);
        assert_eq!(seen_ids(&storage), vec!["101"]);
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert!(report.batch_aborted());
        assert!(matches!(
            report.outcome,
            RunOutcome::BatchAborted { ref post_id, .. } if post_id == "202"
        ));
        // Rejected session is dropped so the next run logs in again
        assert!(storage.read(SESSION_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logs_in_and_saves_session_when_none_stored() {
        let storage = storage_with(&[], false);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&[]);
        let responder = FakeResponder::default();

        Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(auth.logins.load(Ordering::SeqCst), 1);
        let saved = SessionStore::new(storage).load().unwrap().unwrap();
        assert_eq!(saved.cookies[0].value, "fresh");
    }

    #[tokio::test]
    async fn test_stored_session_skips_login() {
        let storage = storage_with(&[], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["1"]);
        let responder = FakeResponder::default();

        Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(auth.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_failure_aborts_run() {
        let storage = storage_with(&[], false);
        let config = config();
        let auth = FakeAuthenticator::failing();
        let scraper = FakeScraper::returning(&["1"]);
        let responder = FakeResponder::default();

        let result = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .run()
            .await;

        assert!(matches!(result, Err(Error::Login(_))));
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
        assert!(responder.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_scrape_failure_leaves_state_untouched() {
        let storage = storage_with(&["101"], true);
        let results = ResultStore::new(storage.clone());
        results
            .write_snapshot(vec![post("101"), post("202")])
            .unwrap();

        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper =
            FakeScraper::failing(CollaboratorError::ElementNotFound("search results".into()));
        let responder = FakeResponder::default();

        let result = Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder)
            .run()
            .await;

        assert!(matches!(result, Err(Error::Scrape(_))));
        assert!(responder.attempts().is_empty());
        assert_eq!(seen_ids(&storage), vec!["101"]);
        assert_eq!(results.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_seen_set_aborts_before_login() {
        let storage = storage_with(&[], false);
        storage.write_atomic(SEEN_SET_KEY, b"not json").unwrap();

        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["1"]);
        let responder = FakeResponder::default();

        let result = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .run()
            .await;

        assert!(matches!(result, Err(Error::Corrupt { .. })));
        assert_eq!(auth.logins.load(Ordering::SeqCst), 0);
        assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rerun_does_not_reply_twice() {
        let storage = storage_with(&[], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["1", "2"]);
        let responder = FakeResponder::default();
        let orchestrator =
            Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder);

        orchestrator.run().await.unwrap();
        let second = orchestrator.run().await.unwrap();

        assert_eq!(responder.attempts(), vec!["1", "2"]);
        assert_eq!(second.targets, 0);
        assert_eq!(ResultStore::new(storage).list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_ids_in_snapshot_get_one_reply() {
        let storage = storage_with(&[], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["7", "8", "7"]);
        let responder = FakeResponder::default();

        let report = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(responder.attempts(), vec!["7", "8"]);
        assert_eq!(report.targets, 2);
    }

    #[tokio::test]
    async fn test_fresh_scrape_wins_over_future_dated_snapshot() {
        let storage = storage_with(&[], true);
        let stale = Snapshot {
            created_at: Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap(),
            sequence: 1,
            posts: vec![post("old")],
        };
        storage
            .write_atomic(
                "snapshot-20990101T000000000000Z-00000001.json",
                &serde_json::to_vec(&stale).unwrap(),
            )
            .unwrap();

        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["new1", "new2"]);
        let responder = FakeResponder::default();

        let report = Orchestrator::new(&config, storage.clone(), &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(report.scraped, Some(2));
        assert_eq!(responder.attempts(), vec!["new1", "new2"]);

        let remaining = ResultStore::new(storage).list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].post_count, 2);
    }

    #[tokio::test]
    async fn test_stray_snapshot_file_does_not_block_run() {
        let storage = storage_with(&[], true);
        storage.write_atomic("snapshot-notes.json", b"[]").unwrap();

        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["1"]);
        let responder = FakeResponder::default();

        let report = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .run()
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(responder.attempts(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_run_without_query_fails_before_login() {
        let storage = storage_with(&[], false);
        let config = RunConfig::default();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["1"]);
        let responder = FakeResponder::default();

        let result = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .run()
            .await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(auth.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reply_pending_uses_stored_snapshot() {
        let storage = storage_with(&["1"], true);
        ResultStore::new(storage.clone())
            .write_snapshot(vec![post("1"), post("2")])
            .unwrap();

        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["99"]);
        let responder = FakeResponder::default();

        let report = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .reply_pending()
            .await
            .unwrap();

        assert_eq!(scraper.calls.load(Ordering::SeqCst), 0);
        assert_eq!(responder.attempts(), vec!["2"]);
        assert_eq!(report.scraped, None);
    }

    #[tokio::test]
    async fn test_reply_pending_without_snapshot_is_empty_run() {
        let storage = storage_with(&[], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&[]);
        let responder = FakeResponder::default();

        let report = Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .reply_pending()
            .await
            .unwrap();

        assert_eq!(report.targets, 0);
        assert_eq!(report.outcome, RunOutcome::Completed);
    }

    #[tokio::test]
    async fn test_observer_sees_every_attempt() {
        #[derive(Default)]
        struct Recorder {
            started: AtomicUsize,
            finished: Mutex<Vec<(String, bool)>>,
        }

        impl RunObserver for Recorder {
            fn batch_started(&self, targets: usize) {
                self.started.store(targets, Ordering::SeqCst);
            }

            fn reply_finished(&self, post: &Post, result: &CollaboratorResult<()>) {
                self.finished
                    .lock()
                    .unwrap()
                    .push((post.id.clone(), result.is_ok()));
            }
        }

        let storage = storage_with(&[], true);
        let config = config();
        let auth = FakeAuthenticator::ok();
        let scraper = FakeScraper::returning(&["1", "2"]);
        let responder =
            FakeResponder::failing_on("1", CollaboratorError::Navigation("net error".into()));
        let recorder = Recorder::default();

        Orchestrator::new(&config, storage, &auth, &scraper, &responder)
            .with_observer(&recorder)
            .run()
            .await
            .unwrap();

        assert_eq!(recorder.started.load(Ordering::SeqCst), 2);
        assert_eq!(
            *recorder.finished.lock().unwrap(),
            vec![("1".to_string(), false), ("2".to_string(), true)]
        );
    }
}

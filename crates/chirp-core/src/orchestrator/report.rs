use serde::Serialize;

/// How the reply batch of a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every selected post was attempted
    Completed,
    /// The session stopped working; the rest of the batch was skipped
    BatchAborted { post_id: String, reason: String },
}

/// End-of-run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Posts returned by the scraper, `None` when scraping was not part of the run
    pub scraped: Option<usize>,
    /// Posts selected for reply
    pub targets: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Selected posts never attempted because the batch was aborted
    pub skipped: usize,
    pub outcome: RunOutcome,
    pub failures: Vec<ReplyFailure>,
}

/// A reply attempt that did not go through
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyFailure {
    pub post_id: String,
    pub address: String,
    pub reason: String,
}

impl RunReport {
    pub(crate) fn new(scraped: Option<usize>, targets: usize) -> Self {
        Self {
            scraped,
            targets,
            attempted: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            outcome: RunOutcome::Completed,
            failures: Vec::new(),
        }
    }

    /// True when at least one attempted reply failed or the batch was cut short
    pub fn is_partial(&self) -> bool {
        self.failed > 0 || self.skipped > 0
    }

    pub fn batch_aborted(&self) -> bool {
        matches!(self.outcome, RunOutcome::BatchAborted { .. })
    }
}

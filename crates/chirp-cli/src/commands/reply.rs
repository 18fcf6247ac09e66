use super::output::print_report;
use super::progress::ReplyProgress;
use super::{Collaborators, open_storage, runtime};
use crate::OutputFormat;
use crate::options::{BrowserArgs, ReplyArgs, app_config};
use anyhow::Result;
use chirp_core::config::RunConfig;
use chirp_core::orchestrator::Orchestrator;
use std::path::Path;

/// Reply to the pending posts of the latest snapshot without scraping
pub fn execute(
    data_dir: Option<&Path>,
    reply: &ReplyArgs,
    browser: &BrowserArgs,
    format: OutputFormat,
) -> Result<()> {
    let run = reply.apply(RunConfig::default())?;
    let config = app_config(data_dir, run, browser)?;
    let storage = open_storage(&config.data_dir)?;

    runtime()?.block_on(async {
        let collaborators = Collaborators::new(&config, browser)?;
        let progress = ReplyProgress::new(format == OutputFormat::Pretty);

        let result = Orchestrator::new(
            &config.run,
            storage,
            &collaborators.authenticator,
            &collaborators.scraper,
            &collaborators.responder,
        )
        .with_observer(&progress)
        .reply_pending()
        .await;

        progress.finish();
        collaborators.shutdown().await;

        print_report(&result?, format)
    })
}

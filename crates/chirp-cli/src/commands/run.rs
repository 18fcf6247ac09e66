use super::output::print_report;
use super::progress::ReplyProgress;
use super::{Collaborators, open_storage, runtime};
use crate::OutputFormat;
use crate::options::{BrowserArgs, ReplyArgs, SearchArgs, app_config};
use anyhow::Result;
use chirp_core::config::RunConfig;
use chirp_core::orchestrator::Orchestrator;
use std::path::Path;

/// Full pass: session, scrape, reply to everything not yet replied to
pub fn execute(
    data_dir: Option<&Path>,
    search: &SearchArgs,
    reply: &ReplyArgs,
    browser: &BrowserArgs,
    format: OutputFormat,
) -> Result<()> {
    let run = reply.apply(RunConfig::new(search.query()?))?;
    let config = app_config(data_dir, run, browser)?;
    let storage = open_storage(&config.data_dir)?;

    tracing::info!(
        mention = %search.mention,
        reply_text = %config.run.reply_text,
        "Starting run"
    );

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
        .run()
        .await;

        progress.finish();
        collaborators.shutdown().await;

        print_report(&result?, format)
    })
}

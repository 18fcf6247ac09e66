use super::output::print_snapshot;
use super::{Collaborators, open_storage, runtime};
use crate::OutputFormat;
use crate::options::{BrowserArgs, SearchArgs, app_config};
use anyhow::Result;
use chirp_core::config::RunConfig;
use chirp_core::orchestrator::Orchestrator;
use std::path::Path;

/// Scrape and store a snapshot without replying
pub fn execute(
    data_dir: Option<&Path>,
    search: &SearchArgs,
    browser: &BrowserArgs,
    format: OutputFormat,
) -> Result<()> {
    let config = app_config(data_dir, RunConfig::new(search.query()?), browser)?;
    let storage = open_storage(&config.data_dir)?;

    runtime()?.block_on(async {
        let collaborators = Collaborators::new(&config, browser)?;

        let result = Orchestrator::new(
            &config.run,
            storage,
            &collaborators.authenticator,
            &collaborators.scraper,
            &collaborators.responder,
        )
        .scrape_only()
        .await;

        collaborators.shutdown().await;

        print_snapshot(&result?, format)
    })
}

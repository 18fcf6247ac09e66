use super::{Collaborators, open_storage, runtime};
use crate::OutputFormat;
use crate::options::{BrowserArgs, app_config};
use anyhow::{Result, bail};
use chirp_core::config::RunConfig;
use chirp_core::orchestrator::Orchestrator;
use chirp_core::store::SessionStore;
use console::style;
use std::path::Path;

/// Log in interactively and store the session
pub fn execute(
    data_dir: Option<&Path>,
    force: bool,
    browser: &BrowserArgs,
    format: OutputFormat,
) -> Result<()> {
    let config = app_config(data_dir, RunConfig::default(), browser)?;
    let storage = open_storage(&config.data_dir)?;

    if !force && SessionStore::new(storage.clone()).load()?.is_some() {
        report(format, false, None)?;
        return Ok(());
    }

    if config.credentials.is_none() {
        bail!("No credentials: set CHIRP_USERNAME and CHIRP_PASSWORD (or pass --username/--password)");
    }

    let cookies = runtime()?.block_on(async {
        let collaborators = Collaborators::new(&config, browser)?;

        let result = Orchestrator::new(
            &config.run,
            storage,
            &collaborators.authenticator,
            &collaborators.scraper,
            &collaborators.responder,
        )
        .refresh_session()
        .await;

        collaborators.shutdown().await;
        anyhow::Ok(result?.cookies.len())
    })?;

    report(format, true, Some(cookies))
}

fn report(format: OutputFormat, logged_in: bool, cookies: Option<usize>) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({ "loggedIn": logged_in, "cookies": cookies });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Pretty if logged_in => {
            println!(
                "{} Logged in, session saved ({} cookies)",
                style("✓").green(),
                cookies.unwrap_or_default()
            );
        }
        OutputFormat::Pretty => {
            println!(
                "{} A session is already stored. Use --force to log in again.",
                style("•").cyan()
            );
        }
    }
    Ok(())
}

use super::open_storage;
use crate::OutputFormat;
use anyhow::Result;
use chirp_core::orchestrator::select_targets;
use chirp_core::store::{ResultStore, SeenSetStore, SessionStore, SnapshotHandle};
use console::style;
use serde_json::json;
use std::path::Path;

/// State of the data directory at a glance
struct Status {
    session_stored: bool,
    replied: usize,
    snapshots: Vec<SnapshotHandle>,
    pending: Option<usize>,
}

pub fn execute(data_dir: &Path, format: OutputFormat) -> Result<()> {
    let storage = open_storage(data_dir)?;

    let seen = SeenSetStore::load(storage.clone())?;
    let results = ResultStore::new(storage.clone());
    let pending = results
        .latest()?
        .map(|snapshot| select_targets(&snapshot.posts, &seen).len());

    let status = Status {
        session_stored: SessionStore::new(storage).load()?.is_some(),
        replied: seen.len(),
        snapshots: results.list()?,
        pending,
    };

    match format {
        OutputFormat::Json => output_json(data_dir, &status)?,
        OutputFormat::Pretty => output_pretty(data_dir, &status),
    }

    Ok(())
}

fn output_json(data_dir: &Path, status: &Status) -> Result<()> {
    let snapshots: Vec<_> = status
        .snapshots
        .iter()
        .map(|s| {
            json!({
                "key": s.key,
                "createdAt": s.created_at,
                "sequence": s.sequence,
                "posts": s.post_count,
            })
        })
        .collect();

    let value = json!({
        "dataDir": data_dir.display().to_string(),
        "sessionStored": status.session_stored,
        "replied": status.replied,
        "snapshots": snapshots,
        "pending": status.pending,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn output_pretty(data_dir: &Path, status: &Status) {
    println!("\n{}", style("chirp status").bold().cyan());
    println!("  Data dir:  {}", style(data_dir.display()).dim());

    let session = if status.session_stored {
        style("stored").green()
    } else {
        style("none (login on next run)").yellow()
    };
    println!("  Session:   {}", session);
    println!("  Replied:   {} posts", status.replied);
    println!("  Snapshots: {}", status.snapshots.len());

    if let Some(latest) = status.snapshots.last() {
        println!(
            "  Latest:    {} ({} posts, {})",
            latest.key,
            latest.post_count,
            latest.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    match status.pending {
        Some(pending) => println!("  Pending:   {}", pending),
        None => println!("  Pending:   {}", style("no snapshot yet").dim()),
    }
}

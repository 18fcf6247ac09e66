use crate::OutputFormat;
use anyhow::Result;
use chirp_core::orchestrator::{RunOutcome, RunReport};
use chirp_core::store::SnapshotHandle;
use console::style;

/// Print the end-of-run summary
pub fn print_report(report: &RunReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Pretty => print_report_pretty(report),
    }
    Ok(())
}

fn print_report_pretty(report: &RunReport) {
    println!("\n{}", style("Run Summary").bold().cyan());
    println!("{}", style("===========").cyan());

    if let Some(scraped) = report.scraped {
        println!("  Scraped:   {}", scraped);
    }
    println!("  Targets:   {}", report.targets);
    println!("  Attempted: {}", report.attempted);
    println!("  Succeeded: {}", style(report.succeeded).green());
    if report.failed > 0 {
        println!("  Failed:    {}", style(report.failed).red());
    } else {
        println!("  Failed:    0");
    }
    if report.skipped > 0 {
        println!("  Skipped:   {}", style(report.skipped).yellow());
    }

    if let RunOutcome::BatchAborted { post_id, reason } = &report.outcome {
        println!(
            "\n{} session stopped working at post {}: {}",
            style("Batch aborted:").yellow().bold(),
            post_id,
            reason
        );
        println!("  {}", style("Run `chirp login` to sign in again.").dim());
    }

    if !report.failures.is_empty() {
        println!("\n{}", style("Failures:").bold());
        for failure in &report.failures {
            println!(
                "  {} {}",
                style(&failure.post_id).yellow(),
                style(&failure.reason).dim()
            );
        }
    }
}

/// Print where a freshly scraped snapshot was stored
pub fn print_snapshot(handle: &SnapshotHandle, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "key": handle.key,
                "createdAt": handle.created_at,
                "sequence": handle.sequence,
                "posts": handle.post_count,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} posts saved to {}",
                style("✓").green(),
                handle.post_count,
                style(&handle.key).bold()
            );
        }
    }
    Ok(())
}

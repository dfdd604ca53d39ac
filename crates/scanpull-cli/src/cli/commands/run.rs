//! `scanpull run`: one pipeline run.

use anyhow::Result;
use scanpull_core::config::ScanpullConfig;
use scanpull_core::transport::CurlTransport;
use scanpull_core::{run_once, RunContext, RunOutcome, RunSettings};
use tracing::error;

pub fn run_pipeline(cfg: &ScanpullConfig) -> Result<()> {
    let settings = RunSettings::from_config(cfg)?;
    let transport = CurlTransport::new(&cfg.http);
    let outcome = run_logged(&settings, &transport)?;
    print_outcome(&outcome);
    Ok(())
}

/// One run dated today. A failure is logged inside the run span before it
/// is returned.
pub(super) fn run_logged(
    settings: &RunSettings,
    transport: &CurlTransport,
) -> Result<RunOutcome> {
    let ctx = RunContext::now();
    run_once(&ctx, settings, transport).map_err(|e| {
        let _enter = ctx.span().enter();
        error!(error = %e, "run aborted");
        e.into()
    })
}

pub(super) fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed(report) => {
            println!(
                "{}: {} addresses from {} rows -> {}",
                report.date,
                report.addresses,
                report.rows,
                report.paths.output.display()
            );
            println!(
                "archive {} ({} bytes, sha256 {})",
                report.paths.archive.display(),
                report.archive_bytes,
                report.archive_sha256
            );
        }
        RunOutcome::AlreadyDownloaded { date, archive } => {
            println!(
                "{}: already downloaded ({}), nothing to do",
                date,
                archive.display()
            );
        }
    }
}

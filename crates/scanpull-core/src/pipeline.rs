//! One run: locate → download → decompress → normalize → write.
//!
//! Single-shot and sequential. Periodic invocation belongs to the caller.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ScanpullConfig;
use crate::context::RunContext;
use crate::decompress::decompress_file;
use crate::download::{fetch_archive, DownloadOutcome};
use crate::error::PipelineError;
use crate::locator::{self, HttpListing, ResolvedDataset};
use crate::normalize::normalize;
use crate::paths::DatasetPaths;
use crate::transport::Transport;

/// Directories and root URL a run works with.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub root_url: String,
    pub download_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl RunSettings {
    /// Settings from config; `ConfigMissing` if no root URL is configured.
    pub fn from_config(cfg: &ScanpullConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            root_url: cfg.root_url()?.to_string(),
            download_dir: cfg.download_dir.clone(),
            output_dir: cfg.output_dir.clone(),
        })
    }
}

/// What a successful run did.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Dataset downloaded and the address list written.
    Completed(RunReport),
    /// Archive for the resolved date was already on disk; nothing fetched.
    AlreadyDownloaded { date: String, archive: PathBuf },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub dataset: ResolvedDataset,
    pub date: String,
    pub paths: DatasetPaths,
    pub archive_bytes: u64,
    pub archive_sha256: String,
    pub rows: usize,
    pub addresses: usize,
}

/// Resolve the dataset for this run without downloading anything.
pub fn resolve<T: Transport + ?Sized>(
    ctx: &RunContext,
    settings: &RunSettings,
    transport: &T,
) -> Result<(ResolvedDataset, String), PipelineError> {
    let listing = HttpListing::new(transport, &settings.root_url);
    let dataset = locator::locate(ctx, &listing)?;
    Ok((dataset.clone(), listing.file_url(&dataset)))
}

/// Run the whole pipeline once.
pub fn run_once<T: Transport + ?Sized>(
    ctx: &RunContext,
    settings: &RunSettings,
    transport: &T,
) -> Result<RunOutcome, PipelineError> {
    let (dataset, url) = resolve(ctx, settings, transport)?;
    let _enter = ctx.span().enter();

    let date = match &dataset.date {
        Some(d) => d.clone(),
        None => {
            let today = ctx.today_label();
            info!("date not found in file name, using {}", today);
            today
        }
    };
    let paths = DatasetPaths::new(&settings.download_dir, &settings.output_dir, &date);

    ensure_dir(&settings.download_dir)?;
    ensure_dir(&settings.output_dir)?;

    info!(file = %dataset.file_label, url = %url, "downloading dataset");
    let (archive_bytes, archive_sha256) = match fetch_archive(transport, &url, &paths.archive)? {
        DownloadOutcome::AlreadyPresent => {
            warn!(path = %paths.archive.display(), "file already downloaded, skipping");
            return Ok(RunOutcome::AlreadyDownloaded {
                date,
                archive: paths.archive,
            });
        }
        DownloadOutcome::Downloaded { bytes, sha256 } => (bytes, sha256),
    };
    info!(
        path = %paths.archive.display(),
        bytes = archive_bytes,
        sha256 = %archive_sha256,
        "archive written"
    );

    let extracted = match decompress_file(&paths.archive, &paths.table) {
        Ok(n) => n,
        Err(e) => {
            // An unreadable archive would otherwise satisfy the skip check forever.
            if let Err(rm) = fs::remove_file(&paths.archive) {
                warn!(path = %paths.archive.display(), "could not remove bad archive: {}", rm);
            }
            return Err(e);
        }
    };
    info!(path = %paths.table.display(), bytes = extracted, "archive extracted");

    let table = File::open(&paths.table)
        .map_err(|e| PipelineError::io(format!("open {}", paths.table.display()), e))?;
    let normalized = normalize(ctx, BufReader::new(table))?;

    info!(
        count = normalized.addresses.len(),
        path = %paths.output.display(),
        "writing addresses"
    );
    normalized.addresses.write_to(&paths.output)?;
    info!("done");

    Ok(RunOutcome::Completed(RunReport {
        dataset,
        date,
        paths,
        archive_bytes,
        archive_sha256,
        rows: normalized.rows,
        addresses: normalized.addresses.len(),
    }))
}

fn ensure_dir(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir)
        .map_err(|e| PipelineError::io(format!("create {}", dir.display()), e))
}

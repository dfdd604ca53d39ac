//! Deterministic artifact paths keyed by dataset date.

use std::path::{Path, PathBuf};

/// Common stem of every artifact: `ipv6-udp-{date}`.
const STEM: &str = "ipv6-udp";

/// Where one dataset's artifacts live. Derived only from the two directories
/// and the date, so the skip-if-exists check is reliable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Downloaded archive: `{download_dir}/ipv6-udp-{date}.xz`.
    pub archive: PathBuf,
    /// Extracted table: `{download_dir}/ipv6-udp-{date}.csv`.
    pub table: PathBuf,
    /// Address list: `{output_dir}/ipv6-udp-{date}.txt`.
    pub output: PathBuf,
}

impl DatasetPaths {
    pub fn new(download_dir: &Path, output_dir: &Path, date: &str) -> Self {
        Self {
            archive: download_dir.join(format!("{}-{}.xz", STEM, date)),
            table: download_dir.join(format!("{}-{}.csv", STEM, date)),
            output: output_dir.join(format!("{}-{}.txt", STEM, date)),
        }
    }
}

//! `scanpull normalize`: offline normalization of a local table.

use anyhow::{bail, Context, Result};
use scanpull_core::normalize::normalize;
use scanpull_core::RunContext;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// `input` with its extension replaced by `.txt`.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("txt")
}

pub fn run_normalize(input: &Path, output: Option<&Path>) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    if output == input {
        bail!(
            "output would overwrite input {}; pass -o",
            input.display()
        );
    }

    let file = File::open(input).with_context(|| format!("open {}", input.display()))?;
    let ctx = RunContext::now();
    let n = normalize(&ctx, BufReader::new(file))?;
    n.addresses.write_to(&output)?;

    println!(
        "{} rows ({} dropped, {} successful), {} unique addresses -> {}",
        n.rows,
        n.dropped,
        n.successful,
        n.addresses.len(),
        output.display()
    );
    Ok(())
}

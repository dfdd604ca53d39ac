use anyhow::Result;
use scanpull_core::download::sha256_file;
use std::path::Path;

/// Print `sha256  path`, the same layout `sha256sum` uses.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = sha256_file(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}

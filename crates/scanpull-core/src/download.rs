//! Archive download with skip-if-present and SHA-256 of the received bytes.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::PipelineError;
use crate::storage;
use crate::transport::Transport;

/// Result of [`fetch_archive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Archive written; `sha256` is the lowercase hex digest of its bytes.
    Downloaded { bytes: u64, sha256: String },
    /// A finished archive was already at the destination; nothing fetched.
    AlreadyPresent,
}

/// Writer that hashes everything passing through it.
struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Download `url` to `dest` unless `dest` already exists.
///
/// Published archives are immutable, so an existing file is final. The body
/// goes to `{dest}.part` first; a failed transfer leaves no file at `dest`.
pub fn fetch_archive<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    dest: &Path,
) -> Result<DownloadOutcome, PipelineError> {
    if dest.exists() {
        return Ok(DownloadOutcome::AlreadyPresent);
    }

    storage::write_atomically(dest, |w| {
        let mut hw = HashingWriter {
            inner: w,
            hasher: Sha256::new(),
        };
        let bytes = transport
            .get_into(url, &mut hw)
            .map_err(|source| PipelineError::FetchFailed {
                url: url.to_string(),
                source,
            })?;
        Ok(DownloadOutcome::Downloaded {
            bytes,
            sha256: hex::encode(hw.hasher.finalize()),
        })
    })
}

/// Lowercase hex SHA-256 of a file already on disk.
pub fn sha256_file(path: &Path) -> Result<String, PipelineError> {
    let mut file =
        File::open(path).map_err(|e| PipelineError::io(format!("open {}", path.display()), e))?;
    let mut hw = HashingWriter {
        inner: io::sink(),
        hasher: Sha256::new(),
    };
    io::copy(&mut file, &mut hw)
        .map_err(|e| PipelineError::io(format!("read {}", path.display()), e))?;
    Ok(hex::encode(hw.hasher.finalize()))
}

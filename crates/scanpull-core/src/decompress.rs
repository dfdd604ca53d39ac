//! xz archive extraction.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use xz2::read::XzDecoder;

use crate::error::PipelineError;
use crate::storage;

/// Decompress the single-stream xz file at `src` into `dest`. Returns the
/// number of decompressed bytes.
///
/// Failure is fatal for the run: a half-extracted table is never left at
/// `dest` for the normalizer to pick up.
pub fn decompress_file(src: &Path, dest: &Path) -> Result<u64, PipelineError> {
    let decompress_failed = |source: io::Error| PipelineError::DecompressFailed {
        path: src.display().to_string(),
        source,
    };

    let input = File::open(src).map_err(decompress_failed)?;
    let mut decoder = XzDecoder::new(BufReader::new(input));
    storage::write_atomically(dest, |w| io::copy(&mut decoder, w)).map_err(decompress_failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use xz2::write::XzEncoder;

    fn xz(data: &[u8]) -> Vec<u8> {
        let mut enc = XzEncoder::new(Vec::new(), 6);
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn extracts_table() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.xz");
        let dest = dir.path().join("a.csv");
        let table = b"saddr,success\n2001:db8::1,1\n";
        std::fs::write(&src, xz(table)).unwrap();

        let n = decompress_file(&src, &dest).unwrap();
        assert_eq!(n, table.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), table);
    }

    #[test]
    fn corrupt_archive_is_fatal_and_leaves_no_table() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.xz");
        let dest = dir.path().join("a.csv");
        std::fs::write(&src, b"<html>404 not found</html>").unwrap();

        let err = decompress_file(&src, &dest).unwrap_err();
        assert!(matches!(err, PipelineError::DecompressFailed { .. }));
        assert!(!dest.exists());
        assert!(!storage::temp_path(&dest).exists());
    }

    #[test]
    fn missing_archive_is_decompress_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = decompress_file(&dir.path().join("nope.xz"), &dir.path().join("x.csv"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::DecompressFailed { .. }));
    }
}

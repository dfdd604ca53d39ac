//! File lifecycle for pipeline artifacts.
//!
//! Every artifact is written to `{final}.part` and renamed into place only
//! once complete, so an existing final path always means a finished file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.xz` → `a.xz.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `final_path` through a buffered temp file.
///
/// `fill` writes the content. On success the temp file is flushed, synced and
/// renamed over `final_path`; on any error it is removed and `final_path` is
/// left untouched.
pub fn write_atomically<T, E, F>(final_path: &Path, fill: F) -> Result<T, E>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T, E>,
    E: From<io::Error>,
{
    let tp = temp_path(final_path);
    let result = fill_and_rename(&tp, final_path, fill);
    if result.is_err() {
        let _ = std::fs::remove_file(&tp);
    }
    result
}

fn fill_and_rename<T, E, F>(tp: &Path, final_path: &Path, fill: F) -> Result<T, E>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T, E>,
    E: From<io::Error>,
{
    let file = File::create(tp)?;
    let mut w = BufWriter::new(file);
    let value = fill(&mut w)?;
    w.flush()?;
    w.get_ref().sync_all()?;
    drop(w);
    std::fs::rename(tp, final_path)?;
    Ok(value)
}

//! The deduplicated address list and its on-disk form.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::PipelineError;
use crate::storage;

/// Set of unique addresses. Iteration order is sorted, which keeps output
/// files reproducible; consumers must not rely on any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSet {
    addresses: BTreeSet<String>,
}

impl OutputSet {
    /// Returns false when the address was already present.
    pub fn insert(&mut self, address: String) -> bool {
        self.addresses.insert(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }

    /// Write one address per line, each newline-terminated, no header.
    /// An empty set produces an empty file.
    pub fn write_to(&self, path: &Path) -> Result<(), PipelineError> {
        storage::write_atomically(path, |w| {
            for addr in self.iter() {
                w.write_all(addr.as_bytes())?;
                w.write_all(b"\n")?;
            }
            Ok::<(), std::io::Error>(())
        })
        .map_err(|e| PipelineError::io(format!("write {}", path.display()), e))
    }

    /// Read a file written by [`OutputSet::write_to`].
    pub fn read_from(path: &Path) -> Result<Self, PipelineError> {
        let data = fs::read_to_string(path)
            .map_err(|e| PipelineError::io(format!("read {}", path.display()), e))?;
        Ok(data.lines().map(str::to_string).collect())
    }
}

impl FromIterator<String> for OutputSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            addresses: iter.into_iter().collect(),
        }
    }
}

//! Two-level dataset resolution: newest folder, then its udp53 file.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::RunContext;
use crate::error::{NotFoundReason, PipelineError};
use crate::listing::{parse_listing, DirectoryEntry};
use crate::transport::Transport;

/// Substring (case-insensitive) that marks the dataset file within a folder.
pub const DATASET_MARKER: &str = "udp53";

/// How many root folders are tried, newest first, before giving up.
const FOLDER_ATTEMPTS: usize = 2;

/// The remote file picked for this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDataset {
    pub folder_label: String,
    pub folder_href: String,
    pub file_label: String,
    pub file_href: String,
    /// `YYYY-MM-DD` found in the file href, if any.
    pub date: Option<String>,
}

impl ResolvedDataset {
    /// Dataset date, falling back to `today` when the href carried none.
    pub fn date_or(&self, today: &str) -> String {
        self.date.clone().unwrap_or_else(|| today.to_string())
    }
}

/// Source of the two listing levels. Implemented over HTTP by [`HttpListing`];
/// tests can serve canned pages.
pub trait ListingSource {
    /// HTML of the root listing (dataset folders).
    fn root_listing(&self) -> Result<String, PipelineError>;

    /// HTML of one folder's listing (dataset files).
    fn folder_listing(&self, folder: &DirectoryEntry) -> Result<String, PipelineError>;
}

/// Listings fetched from `{root}` and `{root}/{folder}`.
pub struct HttpListing<'a, T: Transport + ?Sized> {
    transport: &'a T,
    root: &'a str,
}

impl<'a, T: Transport + ?Sized> HttpListing<'a, T> {
    pub fn new(transport: &'a T, root: &'a str) -> Self {
        Self { transport, root }
    }

    pub fn folder_url(&self, folder_href: &str) -> String {
        join_href(self.root, folder_href)
    }

    /// Download URL of the resolved file.
    pub fn file_url(&self, dataset: &ResolvedDataset) -> String {
        join_href(&self.folder_url(&dataset.folder_href), &dataset.file_href)
    }

    fn fetch_page(&self, url: &str) -> Result<String, PipelineError> {
        debug!(url, "fetching listing");
        let body = self
            .transport
            .get(url)
            .map_err(|source| PipelineError::FetchFailed {
                url: url.to_string(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl<T: Transport + ?Sized> ListingSource for HttpListing<'_, T> {
    fn root_listing(&self) -> Result<String, PipelineError> {
        self.fetch_page(self.root)
    }

    fn folder_listing(&self, folder: &DirectoryEntry) -> Result<String, PipelineError> {
        self.fetch_page(&self.folder_url(&folder.href))
    }
}

/// Join a listing href onto the URL of the page it came from.
///
/// Absolute URLs are used verbatim and host-relative paths (`/x/y`) replace
/// the base path. Anything else is appended with exactly one `/`.
pub fn join_href(base: &str, href: &str) -> String {
    if url::Url::parse(href).is_ok() {
        return href.to_string();
    }
    if href.starts_with('/') {
        if let Ok(joined) = url::Url::parse(base).and_then(|b| b.join(href)) {
            return joined.into();
        }
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        href.trim_start_matches("./")
    )
}

/// First `YYYY-MM-DD` in `s`.
pub fn extract_date(s: &str) -> Option<String> {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE
        .get_or_init(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date pattern"));
    re.find(s).map(|m| m.as_str().to_string())
}

/// Resolve the newest dataset file.
///
/// Takes the newest root folder; if its listing is empty, tries the next
/// older one once. Within the chosen folder the first entry (in descending
/// label order) whose label contains `udp53` wins.
pub fn locate<S: ListingSource + ?Sized>(
    ctx: &RunContext,
    source: &S,
) -> Result<ResolvedDataset, PipelineError> {
    let _enter = ctx.span().enter();

    let folders = parse_listing(&source.root_listing()?);
    if folders.is_empty() {
        warn!("root listing has no dataset folders");
        return Err(PipelineError::NotFound(NotFoundReason::NoFolders));
    }

    let mut chosen = None;
    for folder in folders.iter().take(FOLDER_ATTEMPTS) {
        let files = parse_listing(&source.folder_listing(folder)?);
        if files.is_empty() {
            info!(folder = %folder.label, "folder listing is empty");
            continue;
        }
        chosen = Some((folder, files));
        break;
    }
    let Some((folder, files)) = chosen else {
        warn!("no files in the newest dataset folders");
        return Err(PipelineError::NotFound(NotFoundReason::NoFiles));
    };

    let Some(file) = files
        .into_iter()
        .find(|e| e.label.to_lowercase().contains(DATASET_MARKER))
    else {
        warn!(folder = %folder.label, "no {} link in folder", DATASET_MARKER);
        return Err(PipelineError::NotFound(NotFoundReason::NoUdp53Link));
    };

    let date = extract_date(&file.href);
    if date.is_none() {
        warn!(href = %file.href, "no date found in file name");
    }
    info!(folder = %folder.label, file = %file.label, "resolved dataset");

    Ok(ResolvedDataset {
        folder_label: folder.label.clone(),
        folder_href: folder.href.clone(),
        file_label: file.label,
        file_href: file.href,
        date,
    })
}

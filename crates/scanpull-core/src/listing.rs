//! Directory listing parsing.
//!
//! Turns an HTML index page (Apache/nginx autoindex style) into entries
//! sorted by label, newest-looking first.

use scraper::{Html, Selector};

/// Labels that only navigate within the tree and never name a dataset.
const SYNTHETIC_LABELS: [&str; 4] = [".", "..", "./", "../"];

/// One anchor of a directory listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub href: String,
    pub label: String,
}

/// Extract every `<a href>` from `html`, drop the self/parent links, and sort
/// by label descending (plain string order; labels are date-prefixed so this
/// puts the most recent first).
///
/// Never fails: a page without anchors yields an empty list.
pub fn parse_listing(html: &str) -> Vec<DirectoryEntry> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut entries: Vec<DirectoryEntry> = document
        .select(&selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let label: String = a.text().collect();
            if SYNTHETIC_LABELS.contains(&label.as_str()) {
                return None;
            }
            Some(DirectoryEntry {
                href: href.to_string(),
                label,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.label.cmp(&a.label));
    entries
}

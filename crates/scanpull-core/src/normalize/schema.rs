//! Column layout detection for scan result tables.

use std::net::Ipv6Addr;

use std::str;

use csv::ByteRecord;

use super::success::SuccessFlag;

pub const SADDR: &str = "saddr";
pub const SUCCESS: &str = "success";

/// Column names of the 13-field legacy writer, in order.
pub const LEGACY_COLUMNS: [&str; 13] = [
    "saddr",
    "daddr",
    "ipid",
    "ttl",
    "sport",
    "dport",
    "classification",
    "repeat",
    "cooldown",
    "timestamp_ts",
    "timestamp_us",
    "data",
    "success",
];

/// Layout of a table, decided from its first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// First row is a real header naming both `saddr` and `success`.
    Named { columns: Vec<String> },
    /// Headerless 13-column legacy layout.
    Legacy13,
    /// Headerless layout of any other width: only the first (`saddr`) and
    /// last (`success`) columns have known meaning.
    GenericFirstLast { width: usize },
}

/// Outcome of inspecting the first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detected {
    pub schema: Schema,
    /// The first row was a data row read as a header and must be kept as data.
    pub first_row_is_data: bool,
}

/// One row reduced to the two columns the filter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub saddr: String,
    pub success: bool,
}

impl Schema {
    /// Decide the layout from the first row of the table.
    /// Header cells are compared after lossy decoding, so a stray
    /// non-UTF-8 byte in a header never fails detection.
    pub fn detect(first: &ByteRecord) -> Detected {
        let header: Vec<String> = first
            .iter()
            .map(|f| String::from_utf8_lossy(f).trim().to_string())
            .collect();
        let has = |name: &str| header.iter().any(|f| f == name);
        if has(SADDR) && has(SUCCESS) {
            return Detected {
                schema: Schema::Named { columns: header },
                first_row_is_data: false,
            };
        }

        let first_row_is_data = looks_like_data_row(first);
        let schema = match first.len() {
            13 => Schema::Legacy13,
            width => Schema::GenericFirstLast { width },
        };
        Detected {
            schema,
            first_row_is_data,
        }
    }

    /// Column names after header repair.
    pub fn column_names(&self) -> Vec<String> {
        match self {
            Schema::Named { columns } => columns.clone(),
            Schema::Legacy13 => LEGACY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            Schema::GenericFirstLast { width } => {
                let mut names: Vec<String> = (0..*width).map(|i| format!("col{}", i)).collect();
                if let Some(first) = names.first_mut() {
                    *first = SADDR.to_string();
                }
                if *width > 1 {
                    if let Some(last) = names.last_mut() {
                        *last = SUCCESS.to_string();
                    }
                }
                names
            }
        }
    }

    pub fn saddr_index(&self) -> usize {
        match self {
            Schema::Named { columns } => position(columns, SADDR),
            Schema::Legacy13 | Schema::GenericFirstLast { .. } => 0,
        }
    }

    pub fn success_index(&self) -> usize {
        match self {
            Schema::Named { columns } => position(columns, SUCCESS),
            Schema::Legacy13 => LEGACY_COLUMNS.len() - 1,
            Schema::GenericFirstLast { width } => width.saturating_sub(1),
        }
    }

    /// Map a raw row onto `(saddr, success)`. Rows missing either column,
    /// with an empty address, or with either of the two fields not valid
    /// UTF-8 are dropped. Other columns are never decoded.
    pub fn project(&self, row: &ByteRecord) -> Option<NormalizedRecord> {
        let saddr = str::from_utf8(row.get(self.saddr_index())?).ok()?;
        let success = str::from_utf8(row.get(self.success_index())?).ok()?;
        if saddr.is_empty() {
            return None;
        }
        Some(NormalizedRecord {
            saddr: saddr.to_string(),
            success: SuccessFlag::parse(success).is_success(),
        })
    }
}

fn position(columns: &[String], name: &str) -> usize {
    columns.iter().position(|c| c == name).unwrap_or(0)
}

/// A headerless file's first row: an IPv6 literal first and a literal `1` last.
fn looks_like_data_row(first: &ByteRecord) -> bool {
    let Some(head) = first.get(0).and_then(|f| str::from_utf8(f).ok()) else {
        return false;
    };
    let tail = first.get(first.len().saturating_sub(1)).unwrap_or(b"");
    head.parse::<Ipv6Addr>().is_ok() && tail == b"1"
}

//! Schema normalization and success filtering of scan result tables.
//!
//! Historical files come with a header, without one, or with the first data
//! row misplaced as header; widths vary from 9 to 13+ columns. Every layout is
//! reduced to `(saddr, success)` and only successful, distinct addresses are
//! kept.

mod schema;
mod success;

pub use schema::{Detected, NormalizedRecord, Schema, LEGACY_COLUMNS};
pub use success::SuccessFlag;

use std::io::Read;

use tracing::{debug, info};

use crate::context::RunContext;
use crate::error::PipelineError;
use crate::output::OutputSet;

/// Result of normalizing one table.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub schema: Schema,
    /// Data rows seen (including a recovered first row).
    pub rows: usize,
    /// Rows dropped for a missing column or an unusable address or flag.
    pub dropped: usize,
    /// Rows whose success flag was set.
    pub successful: usize,
    pub addresses: OutputSet,
}

/// Normalize a comma-delimited table read from `reader`.
///
/// An empty input yields an empty set. Column counts outside the known
/// layouts fall back to [`Schema::GenericFirstLast`] and never fail.
pub fn normalize<R: Read>(ctx: &RunContext, reader: R) -> Result<Normalized, PipelineError> {
    let _enter = ctx.span().enter();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.byte_records();

    let first = match records.next() {
        Some(first) => first?,
        None => {
            info!("table is empty");
            return Ok(Normalized {
                schema: Schema::GenericFirstLast { width: 0 },
                rows: 0,
                dropped: 0,
                successful: 0,
                addresses: OutputSet::default(),
            });
        }
    };

    let Detected {
        schema,
        first_row_is_data,
    } = Schema::detect(&first);
    debug!(
        columns = ?schema.column_names(),
        first_row_is_data,
        "detected table layout"
    );

    let mut out = Normalized {
        schema,
        rows: 0,
        dropped: 0,
        successful: 0,
        addresses: OutputSet::default(),
    };

    for record in records {
        out.absorb(&record?);
    }
    // A header that was really data goes back in as the last row.
    if first_row_is_data {
        out.absorb(&first);
    }

    info!(
        rows = out.rows,
        dropped = out.dropped,
        successful = out.successful,
        unique = out.addresses.len(),
        "normalized table"
    );
    Ok(out)
}

impl Normalized {
    fn absorb(&mut self, row: &csv::ByteRecord) {
        self.rows += 1;
        match self.schema.project(row) {
            Some(rec) if rec.success => {
                self.successful += 1;
                self.addresses.insert(rec.saddr);
            }
            Some(_) => {}
            None => self.dropped += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RunContext {
        RunContext::for_date(chrono::NaiveDate::from_ymd_opt(2024, 5, 29).unwrap())
    }

    fn run(table: &str) -> Normalized {
        normalize(&ctx(), table.as_bytes()).unwrap()
    }

    fn sorted(n: &Normalized) -> Vec<&str> {
        n.addresses.iter().collect()
    }

    #[test]
    fn named_header_filters_and_dedups() {
        let n = run("saddr,daddr,success\n\
                     2001:db8::1,2001:db8::53,1\n\
                     2001:db8::2,2001:db8::53,0\n\
                     2001:db8::1,2001:db8::53,1\n\
                     2001:db8::3,2001:db8::53,\"1\"\n");
        assert!(matches!(n.schema, Schema::Named { .. }));
        assert_eq!(n.rows, 4);
        assert_eq!(n.successful, 3);
        assert_eq!(sorted(&n), vec!["2001:db8::1", "2001:db8::3"]);
    }

    #[test]
    fn int_and_string_one_pass_zero_forms_do_not() {
        let n = run("saddr,success\n\
                     2001:db8::a,1\n\
                     2001:db8::b,\"1\"\n\
                     2001:db8::c,0\n\
                     2001:db8::d,\"0\"\n");
        assert_eq!(sorted(&n), vec!["2001:db8::a", "2001:db8::b"]);
    }

    #[test]
    fn headerless_legacy_table_keeps_first_row() {
        let row = |addr: &str, ok: &str| {
            format!(
                "{},2001:db8::53,4242,57,53,40000,udp,0,0,1716940800,123,deadbeef,{}\n",
                addr, ok
            )
        };
        let table = [
            row("2001:db8::1", "1"),
            row("2001:db8::2", "0"),
            row("2001:db8::3", "1"),
        ]
        .concat();
        let n = run(&table);
        assert_eq!(n.schema, Schema::Legacy13);
        assert_eq!(n.rows, 3);
        assert_eq!(sorted(&n), vec!["2001:db8::1", "2001:db8::3"]);
    }

    #[test]
    fn headerless_first_row_with_failure_is_consumed_as_header() {
        // Not recognisable as data (last field is 0), so it is the header guess.
        let n = run("2001:db8::1,x,y,0\n2001:db8::2,x,y,1\n");
        assert_eq!(n.schema, Schema::GenericFirstLast { width: 4 });
        assert_eq!(n.rows, 1);
        assert_eq!(sorted(&n), vec!["2001:db8::2"]);
    }

    #[test]
    fn nine_column_table_with_unknown_header() {
        let n = run("ip,a,b,c,d,e,f,g,ok\n\
                     2001:db8::9,a,b,c,d,e,f,g,1\n\
                     2001:db8::8,a,b,c,d,e,f,g,0\n");
        assert_eq!(n.schema, Schema::GenericFirstLast { width: 9 });
        assert_eq!(n.schema.success_index(), 8);
        assert_eq!(sorted(&n), vec!["2001:db8::9"]);
    }

    #[test]
    fn short_rows_are_dropped_not_fatal() {
        let n = run("saddr,x,success\n2001:db8::1,x\n2001:db8::2,x,1\n");
        assert_eq!(n.dropped, 1);
        assert_eq!(sorted(&n), vec!["2001:db8::2"]);
    }

    #[test]
    fn no_successful_rows_gives_empty_set() {
        let n = run("saddr,success\n2001:db8::1,0\n");
        assert!(n.addresses.is_empty());
        let n = run("");
        assert!(n.addresses.is_empty());
        assert_eq!(n.rows, 0);
    }

    #[test]
    fn addresses_kept_verbatim() {
        let n = run("saddr,success\n2001:DB8:0:0::1,1\n2001:db8::1,1\n");
        assert_eq!(n.addresses.len(), 2);
    }

    #[test]
    fn invalid_utf8_in_unread_column_keeps_the_table() {
        let table: &[u8] = b"saddr,data,success\n\
                             2001:db8::1,\xff\xfe,1\n\
                             2001:db8::2,x,1\n\
                             2001:db8::\xff,x,1\n";
        let n = normalize(&ctx(), table).unwrap();
        assert_eq!(n.rows, 3);
        assert_eq!(n.dropped, 1);
        assert_eq!(sorted(&n), vec!["2001:db8::1", "2001:db8::2"]);
    }
}

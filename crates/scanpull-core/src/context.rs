//! Per-run context handed to every pipeline component.

use chrono::{Local, NaiveDate};
use tracing::Span;

/// Date format used in remote file names and local artifact names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Explicit run context: the date the run treats as "today" and the span all
/// components log into.
#[derive(Debug, Clone)]
pub struct RunContext {
    today: NaiveDate,
    span: Span,
}

impl RunContext {
    /// Context for a run happening now (local time).
    pub fn now() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn for_date(today: NaiveDate) -> Self {
        let span = tracing::info_span!("run", date = %today.format(DATE_FORMAT));
        Self { today, span }
    }

    /// Today's date formatted like remote file names (`YYYY-MM-DD`).
    pub fn today_label(&self) -> String {
        self.today.format(DATE_FORMAT).to_string()
    }

    /// Span for this run; enter it around component work.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

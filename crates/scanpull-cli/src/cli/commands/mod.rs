//! CLI command handlers, one per file.

mod checksum;
mod daily;
mod locate;
mod normalize;
mod run;

pub use checksum::run_checksum;
pub use daily::run_daily;
pub use locate::run_locate;
pub use normalize::run_normalize;
pub use run::run_pipeline;

#[cfg(test)]
pub(crate) use daily::{next_run_after, parse_time_of_day};
#[cfg(test)]
pub(crate) use normalize::default_output;

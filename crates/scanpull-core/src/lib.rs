pub mod config;
pub mod logging;

pub mod context;
pub mod decompress;
pub mod download;
pub mod error;
pub mod listing;
pub mod locator;
pub mod normalize;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod storage;
pub mod transport;

pub use context::RunContext;
pub use error::{FetchError, NotFoundReason, PipelineError};
pub use pipeline::{run_once, RunOutcome, RunSettings};

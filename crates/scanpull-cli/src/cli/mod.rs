//! CLI for the scanpull dataset pipeline.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use scanpull_core::config::{self, ScanpullConfig};
use scanpull_core::logging;
use std::path::PathBuf;

use commands::{run_checksum, run_daily, run_locate, run_normalize, run_pipeline};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "scanpull")]
#[command(
    about = "scanpull: fetch the newest IPv6 UDP/53 scan and keep the responsive addresses",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Flags that take precedence over the environment and config.toml.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Root URL of the remote dataset tree.
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Directory for the downloaded archive and extracted table.
    #[arg(long, global = true, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Directory for the address list.
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory for dated log files.
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut ScanpullConfig) {
        if let Some(url) = &self.url {
            cfg.url = Some(url.clone());
        }
        if let Some(dir) = &self.download_dir {
            cfg.download_dir = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(dir) = &self.log_dir {
            cfg.log_dir = Some(dir.clone());
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the newest dataset once and write its address list.
    Run,

    /// Run the pipeline every day at a fixed local time.
    Daily {
        /// Local time of day, `HH:MM` (falls back to `daily_at` in config).
        #[arg(long, value_name = "HH:MM")]
        at: Option<String>,
    },

    /// Resolve the newest dataset file without downloading it.
    Locate {
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Normalize a local scan table into an address list.
    Normalize {
        /// Comma-separated scan table.
        input: PathBuf,

        /// Output file (default: input with a `.txt` extension).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. a downloaded archive).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    /// Run a command that works on local files only. These never read
    /// config.toml and log to stderr so stdout carries only their output.
    /// Returns None for the commands that need configuration.
    fn run_offline(&self) -> Option<Result<()>> {
        match self {
            CliCommand::Normalize { input, output } => {
                logging::init_logging_stderr();
                Some(run_normalize(input, output.as_deref()))
            }
            CliCommand::Checksum { path } => {
                logging::init_logging_stderr();
                Some(run_checksum(path))
            }
            CliCommand::Run | CliCommand::Daily { .. } | CliCommand::Locate { .. } => None,
        }
    }

    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let Some(result) = cli.command.run_offline() {
            return result;
        }

        let mut cfg = config::load_or_init()?;
        cli.overrides.apply(&mut cfg);

        match cli.command {
            CliCommand::Run => {
                init_file_logging(&cfg);
                tracing::debug!("loaded config: {:?}", cfg);
                run_pipeline(&cfg)?;
            }
            CliCommand::Daily { at } => {
                init_file_logging(&cfg);
                tracing::debug!("loaded config: {:?}", cfg);
                run_daily(&cfg, at.as_deref())?;
            }
            CliCommand::Locate { json } => {
                logging::init_logging_stderr();
                run_locate(&cfg, json)?;
            }
            CliCommand::Normalize { .. } | CliCommand::Checksum { .. } => {}
        }

        Ok(())
    }
}

fn init_file_logging(cfg: &ScanpullConfig) {
    let result = cfg
        .resolved_log_dir()
        .and_then(|dir| logging::init_logging(&dir));
    if let Err(e) = result {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable ({:#}), logging to stderr", e);
    }
}

#[cfg(test)]
mod tests;

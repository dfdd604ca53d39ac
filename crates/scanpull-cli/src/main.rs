mod cli;

use crate::cli::CliCommand;

fn main() {
    // Logging is set up inside once the config (and its log dir) is known.
    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("scanpull error: {:#}", err);
        std::process::exit(1);
    }
}

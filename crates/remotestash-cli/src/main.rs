use remotestash_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --verbose goes to the terminal; otherwise the log file, or stderr if it can't be opened.
    let destination = logging::init(cli.opts.verbose);
    tracing::debug!(?destination, "logging initialized");

    if let Err(err) = cli.run().await {
        eprintln!("remotestash error: {:#}", err);
        std::process::exit(1);
    }
}

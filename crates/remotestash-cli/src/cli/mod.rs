//! CLI for the remote stash.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use remotestash_core::config;
use std::path::PathBuf;

use commands::{
    run_last, run_list, run_listen, run_pull, run_push, run_serve, run_status, Context,
};

/// Top-level CLI for the remote stash.
#[derive(Debug, Parser)]
#[command(name = "remotestash")]
#[command(about = "Push and pull clipboard-like items to a stash on the local network", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,

    #[command(flatten)]
    pub opts: GlobalOpts,
}

/// Options shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOpts {
    /// Content type of pushed data (default: guessed from FILE, else text/plain; charset=utf-8).
    #[arg(short = 'c', long, global = true, value_name = "TYPE")]
    pub content_type: Option<String>,

    /// Use the stash directory on this machine instead of a remote stash.
    #[arg(short = 'l', long, global = true)]
    pub local: bool,

    /// Service name to advertise (serve) or to look for (remote commands).
    #[arg(short = 'n', long, global = true)]
    pub name: Option<String>,

    /// Log debug output to stderr.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Port for `serve` (default: from config, else any free port).
    #[arg(short = 'p', long, global = true)]
    pub port: Option<u16>,

    /// Write pulled content to FILE instead of stdout.
    #[arg(short = 'o', long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Stash directory (default: from config, else ~/.local/share/remotestash).
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// How long to browse for a stash, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the local stash and advertise it on the network.
    Serve,

    /// Push FILE (or stdin) onto the stash.
    Push {
        /// File to push; stdin when omitted.
        file: Option<PathBuf>,
    },

    /// Remove the last item from the stash and print it.
    Pull,

    /// Print the last item without removing it.
    Last,

    /// List the items in the local stash.
    List,

    /// Show the number of items and the last item as JSON.
    Status,

    /// Print every stash advertised on the network.
    Listen,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let ctx = Context::new(cfg, self.opts);

        match self.command {
            CliCommand::Serve => run_serve(&ctx).await?,
            CliCommand::Push { file } => run_push(&ctx, file.as_deref()).await?,
            CliCommand::Pull => run_pull(&ctx).await?,
            CliCommand::Last => run_last(&ctx).await?,
            CliCommand::List => run_list(&ctx)?,
            CliCommand::Status => run_status(&ctx).await?,
            CliCommand::Listen => run_listen(&ctx).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;

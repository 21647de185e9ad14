mod cli;
mod commands;
mod config;
mod terminal_reporter;

use std::process;

use clap::Parser;
use toolpack::{
    config::loader::{ApplyToConfig, ConfigLoader, YamlLoader},
    fs::RealFileSystem,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{cli::ClapCli, commands::dispatch_command, terminal_reporter::TerminalReporter};

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ClapCli::parse();

    let fs = RealFileSystem;

    // 1. Load config.yaml, then let CLI args override it
    let config = args.apply_to_config(YamlLoader::new(&fs).load_config()?);

    init_tracing(config.verbose());
    debug!(?config, "Final config");

    let reporter = TerminalReporter::new(config.use_colors());

    // 2. Dispatch and execute the requested command
    let exit_code = dispatch_command(&args.command, config, reporter).await;

    process::exit(exit_code)
}

//! fxchain CLI
//!
//! Drive the effects chain against a persisted state file.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::debug;

use fxchain::cli::{commands, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();

    debug!("fxchain v{}", env!("CARGO_PKG_VERSION"));

    let Some(command) = cli.command else {
        println!("fxchain v{}", env!("CARGO_PKG_VERSION"));
        println!("Use --help for available commands");
        return Ok(());
    };

    if let Err(e) = commands::execute(&cli.state, command) {
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
        return Err(e).with_context(|| format!("state file {}", cli.state.display()));
    }

    Ok(())
}

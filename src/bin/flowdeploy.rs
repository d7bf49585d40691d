//! flowdeploy CLI binary

use anyhow::Context;
use clap::Parser;
use flowdeploy::logging::init_logging;
use flowdeploy::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let context = CliContext::new(cli.workspace.clone(), cli.config.clone())
        .context("Error loading configuration")?;

    let mut logging = context.config().logging.clone();
    cli.apply_log_overrides(&mut logging);
    init_logging(Some(&logging)).context("Error initializing logging")?;

    let output = context.execute(&cli.command)?;
    println!("{}", output);
    Ok(())
}

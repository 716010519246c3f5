mod commands;
mod ops;
mod reports;

use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    cli.run()
}

/// `RUST_LOG` wins over `-v`. Logs go to stderr so piped output stays clean.
fn init_tracing(verbose: u8) -> Result<()> {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::try_new(directives).wrap_err("could not parse RUST_LOG")?,
        Err(_) => EnvFilter::new(default),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

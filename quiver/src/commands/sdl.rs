use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use quiver_manifest::QuiverToml;

use super::UnwrapOrExit;
use crate::ops;

#[derive(Args)]
pub struct SdlCommand {
    /// Path to quiver.toml (defaults to ./quiver.toml)
    #[arg(short, long, default_value = "quiver.toml")]
    pub config: PathBuf,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 2)]
    pub indent: usize,
}

impl SdlCommand {
    /// Print the merged schema; converts an introspection result to SDL.
    pub fn run(&self) -> Result<()> {
        let config = QuiverToml::open(&self.config)
            .map_err(|e| miette::Report::new(*e))
            .unwrap_or_exit();
        let schema = ops::open_schema(&config).unwrap_or_exit();
        print!("{}", schema.to_sdl(self.indent));
        Ok(())
    }
}

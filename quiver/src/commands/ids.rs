use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, Project},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct IdsCommand {
    /// Path to quiver.toml (defaults to ./quiver.toml)
    #[arg(short, long, default_value = "quiver.toml")]
    pub config: PathBuf,
}

impl IdsCommand {
    pub fn run(&self) -> Result<()> {
        let project = Project::open(&self.config).unwrap_or_exit();
        ops::ids(project)?.render(&mut TerminalOutput::new());
        Ok(())
    }
}

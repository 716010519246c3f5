use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, Project},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to quiver.toml (defaults to ./quiver.toml)
    #[arg(short, long, default_value = "quiver.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let project = Project::open(&self.config).unwrap_or_exit();
        let report = ops::check(project, &self.config)?;

        report.render(&mut TerminalOutput::new());
        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}

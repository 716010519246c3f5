use std::path::PathBuf;

use clap::Args;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, CompileOptions, Project},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CompileCommand {
    /// Path to quiver.toml (defaults to ./quiver.toml)
    #[arg(short, long, default_value = "quiver.toml")]
    pub config: PathBuf,

    /// Output directory (overrides the [codegen] output setting)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Preview the artifacts without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON snapshot of the pipeline state after every phase
    #[arg(long)]
    pub visualize: bool,
}

impl CompileCommand {
    /// Run the compile command
    pub fn run(&self) -> Result<()> {
        let project = Project::open(&self.config).unwrap_or_exit();
        let report = ops::compile(
            project,
            CompileOptions {
                output_dir: self.output.as_deref(),
                dry_run: self.dry_run,
                visualize: self.visualize,
            },
        )?;

        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}

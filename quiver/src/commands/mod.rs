mod check;
mod compile;
mod completions;
mod ids;
mod sdl;

use check::CheckCommand;
use clap::{Parser, Subcommand};
use compile::CompileCommand;
use completions::CompletionsCommand;
use eyre::Result;
use ids::IdsCommand;
use sdl::SdlCommand;

/// Extension trait for exiting on source-located errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for miette::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(report) => {
                eprintln!("{:?}", report);
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "quiver")]
#[command(version)]
#[command(about = "Compile GraphQL operations against a schema")]
pub(crate) struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Check(cmd) => cmd.run(),
            Commands::Compile(cmd) => cmd.run(),
            Commands::Ids(cmd) => cmd.run(),
            Commands::Sdl(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate operations against the schema
    Check(CheckCommand),

    /// Compile operations and write the IR, persisted operations and resolver
    Compile(CompileCommand),

    /// Print the id of every operation
    Ids(IdsCommand),

    /// Print the schema as SDL
    Sdl(SdlCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

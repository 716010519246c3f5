//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod check;
mod compile;
mod ids;
mod output;

pub use check::CheckReport;
pub use compile::{ArtifactFile, CompileReport, CompileResult, PreviewResult, WrittenResult};
pub use ids::{IdRow, IdsReport};
#[cfg(test)]
pub use output::BufferOutput;
pub use output::{Report, TerminalOutput};

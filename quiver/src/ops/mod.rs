//! Core operations.
//!
//! This module contains the business logic for quiver commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod compile;
pub mod ids;
mod project;

pub use check::check;
pub use compile::{CompileOptions, compile};
pub use ids::ids;
pub use project::{Project, open_schema};
use quiver_compiler::pipeline::Diagnostic;

/// One diagnostic as printed by the commands: message, lint name, location.
pub(crate) fn describe(diagnostic: &Diagnostic) -> String {
    let mut text = diagnostic.message.clone();
    if let Some(code) = &diagnostic.code {
        text.push_str(&format!(" [{}]", code));
    }
    if let Some(location) = &diagnostic.location {
        text.push_str(&format!("\n  --> {}", location));
    }
    text
}

//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`ValidatePhase`] - runs the lints and collects diagnostics
//! - [`LowerPhase`] - inserts `__typename` and builds the IR
//! - [`FlattenPhase`] - hoists nested model groups and deduplicates them
//! - [`AnalyzePhase`] - computes selections, operation ids and resolver entries

mod analyze;
mod flatten;
mod lower;
mod validate;

pub use analyze::AnalyzePhase;
pub use flatten::FlattenPhase;
pub use lower::LowerPhase;
pub use validate::{Lint, LintContext, LintInfo, Owner, Scope, ValidatePhase, Visitor, lints};

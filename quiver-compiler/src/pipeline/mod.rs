//! Compilation pipeline.
//!
//! This module provides a [`Pipeline`] orchestrator that takes a schema and a
//! set of executable documents to an IR, a persisted operation manifest and
//! resolver entries. The pipeline provides:
//!
//! - Explicit phase boundaries (validate → lower → flatten → analyze)
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection
//! - Shared state via [`CompilationContext`]
//!
//! # Example
//!
//! ```ignore
//! use quiver_compiler::pipeline::Pipeline;
//!
//! let ctx = Pipeline::new().run(schema, documents, options)?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("{diag}");
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};

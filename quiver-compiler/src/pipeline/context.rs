//! Compilation context passed through pipeline phases.

use quiver_ir::{IrDocument, OperationManifest, Resolver};
use quiver_schema::Schema;

use super::diagnostic::{Diagnostic, Severity};
use crate::{CompilerOptions, DocumentSet};

/// Context passed through all pipeline phases.
///
/// This struct carries the state of compilation through each phase,
/// accumulating results and diagnostics along the way.
#[derive(Debug)]
pub struct CompilationContext {
    pub schema: Schema,
    /// The executable documents. `LowerPhase` rewrites them in place when
    /// it inserts `__typename`.
    pub documents: DocumentSet,
    pub options: CompilerOptions,
    /// The IR (populated by LowerPhase, rewritten by FlattenPhase).
    pub ir: Option<IrDocument>,
    /// Persisted operations (populated by AnalyzePhase).
    pub manifest: Option<OperationManifest>,
    /// Resolver entries of this unit (populated by AnalyzePhase).
    pub resolver: Option<Resolver>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new(schema: Schema, documents: DocumentSet, options: CompilerOptions) -> Self {
        Self {
            schema,
            documents,
            options,
            ir: None,
            manifest: None,
            resolver: None,
            diagnostics: Vec::new(),
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    /// Add an info diagnostic.
    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// The IR, or an error naming the phase that should have produced it.
    pub fn ir(&self) -> eyre::Result<&IrDocument> {
        self.ir
            .as_ref()
            .ok_or_else(|| eyre::eyre!("IR not set - did LowerPhase run?"))
    }

    pub fn ir_mut(&mut self) -> eyre::Result<&mut IrDocument> {
        self.ir
            .as_mut()
            .ok_or_else(|| eyre::eyre!("IR not set - did LowerPhase run?"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{documents, star_wars_schema};

    fn make_context() -> CompilationContext {
        CompilationContext::new(
            star_wars_schema(),
            documents("query Hero { hero { name } }"),
            CompilerOptions::default(),
        )
    }

    #[test]
    fn test_context_creation() {
        let ctx = make_context();

        assert!(ctx.ir.is_none());
        assert!(ctx.manifest.is_none());
        assert!(ctx.diagnostics.is_empty());
        assert!(ctx.ir().is_err());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = make_context();

        ctx.add_error("test", "test error");
        ctx.add_warning("test", "test warning");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(ctx.errors().count(), 1);
    }

    #[test]
    fn test_context_no_errors() {
        let mut ctx = make_context();

        ctx.add_warning("test", "just a warning");
        ctx.add_info("test", "just info");

        assert!(!ctx.has_errors());
        assert!(ctx.has_warnings());
    }
}

//! Validate phase - runs lints on the executable documents.

mod lint;
pub mod lints;

use eyre::{Result, bail};
pub use lint::{Lint, LintContext, LintInfo, Owner, Scope, Visitor};
pub use lints::{
    AnonymousOperationLint, ArgumentsLint, ConflictingFieldsLint, DeprecatedUsageLint,
    DuplicateOperationLint, FieldNotFoundLint, FragmentCycleLint, FragmentTypeConditionLint,
    SelectionShapeLint, TypeMismatchLint, UnknownDirectiveLint, UnknownFragmentLint,
    UnusedFragmentLint, UnusedVariableLint, VariablesLint,
};

use crate::pipeline::{CompilationContext, Phase, Severity};

/// Phase that validates the documents using configurable lints.
///
/// Every lint runs, so one pass reports every issue. Each finding takes
/// the level configured under `[validation]` (or the lint's default);
/// ignored findings are dropped and any error fails the phase.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Create a new validate phase with default lints.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(AnonymousOperationLint),
                Box::new(DuplicateOperationLint),
                Box::new(FieldNotFoundLint),
                Box::new(SelectionShapeLint),
                Box::new(ArgumentsLint),
                Box::new(TypeMismatchLint),
                Box::new(VariablesLint),
                Box::new(UnusedVariableLint),
                Box::new(UnknownFragmentLint),
                Box::new(FragmentTypeConditionLint),
                Box::new(FragmentCycleLint),
                Box::new(UnusedFragmentLint),
                Box::new(UnknownDirectiveLint),
                Box::new(ConflictingFieldsLint),
                Box::new(DeprecatedUsageLint),
            ],
        }
    }

    /// Create a validate phase with no lints.
    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    /// Add a custom lint to the validation phase.
    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }

    /// Get the names of all lints that will be run.
    pub fn lint_names(&self) -> Vec<&'static str> {
        self.lints.iter().map(|l| l.name()).collect()
    }

    /// Get information about all lints that will be run.
    pub fn lint_info(&self) -> Vec<LintInfo> {
        self.lints.iter().map(|l| l.info()).collect()
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check documents against the schema and collect diagnostics"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let lint_ctx = LintContext::new(&ctx.schema, &ctx.documents);
        let mut found = Vec::new();

        for lint in &self.lints {
            let level = ctx.options.validation.level_or(lint.name(), lint.default_level());
            let Some(severity) = Severity::from_level(level) else {
                tracing::trace!(lint = lint.name(), "lint ignored");
                continue;
            };

            let mut diagnostics = Vec::new();
            lint.check(&lint_ctx, &mut diagnostics);
            tracing::debug!(lint = lint.name(), count = diagnostics.len(), "lint finished");

            found.extend(diagnostics.into_iter().map(|mut diagnostic| {
                diagnostic.severity = severity;
                diagnostic.with_code(lint.name())
            }));
        }
        ctx.diagnostics.extend(found);

        // Fail if there are any errors (warnings are allowed)
        if ctx.has_errors() {
            bail!("Validation failed with {} error(s)", ctx.error_count());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quiver_manifest::{IssueLevel, KNOWN_LINTS};

    use super::*;
    use crate::{
        CompilerOptions,
        pipeline::Diagnostic,
        testing::{documents, star_wars_schema},
    };

    fn context(src: &str) -> CompilationContext {
        CompilationContext::new(star_wars_schema(), documents(src), CompilerOptions::default())
    }

    #[test]
    fn test_with_errors() {
        struct AlwaysErrorLint;
        impl Lint for AlwaysErrorLint {
            fn name(&self) -> &'static str {
                "always-error"
            }
            fn description(&self) -> &'static str {
                "Always produces an error"
            }
            fn check(&self, _ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
                diagnostics.push(Diagnostic::error("validate", "forced error"));
            }
        }

        let mut ctx = context("query Q { hero { name } }");

        let phase = ValidatePhase::empty().with_lint(AlwaysErrorLint);
        let result = phase.run(&mut ctx);

        assert!(result.is_err());
        assert!(ctx.has_errors());
        assert_eq!(ctx.diagnostics[0].code.as_deref(), Some("always-error"));
    }

    #[test]
    fn test_warnings_allowed() {
        let mut ctx = context("query Q { droid(id: 1) { nickname } }");

        let result = ValidatePhase::new().run(&mut ctx);

        // Warnings don't cause failure
        assert!(result.is_ok());
        assert!(ctx.has_warnings());
        assert!(!ctx.has_errors());
        let warning = ctx.warnings().next().unwrap();
        assert_eq!(warning.code.as_deref(), Some("deprecated-usage"));
        assert_eq!(warning.location.as_deref(), Some("test.graphql:1:26"));
    }

    #[test]
    fn test_collects_every_error() {
        let mut ctx = context("query Q { hero { bogus } human { name } ...Missing }");

        let err = ValidatePhase::new().run(&mut ctx).unwrap_err();

        assert_eq!(err.to_string(), "Validation failed with 3 error(s)");
        let codes: Vec<_> = ctx.errors().filter_map(|d| d.code.as_deref()).collect();
        assert_eq!(codes, ["field-not-found", "arguments", "unknown-fragment"]);
    }

    #[test]
    fn test_configured_levels() {
        let src = "query Q { droid(id: 1) { nickname } }\nfragment Unused on Droid { id }";

        let mut options = CompilerOptions::default();
        options.validation.set("deprecated-usage", IssueLevel::Ignore);
        options.validation.set("unused-fragment", IssueLevel::Error);
        let mut ctx = CompilationContext::new(star_wars_schema(), documents(src), options);

        let result = ValidatePhase::new().run(&mut ctx);

        assert!(result.is_err());
        assert_eq!(ctx.diagnostics.len(), 1);
        assert_eq!(ctx.diagnostics[0].message, "Fragment 'Unused' is never used");
        assert_eq!(ctx.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_clean_document() {
        let mut ctx = context(
            "query Hero($ep: Episode) { hero(episode: $ep) { ...HeroFields } }\n\
             fragment HeroFields on Character { name ... on Droid { primaryFunction } }",
        );
        ValidatePhase::new().run(&mut ctx).unwrap();
        assert!(ctx.diagnostics.is_empty(), "{:?}", ctx.diagnostics);
    }

    #[test]
    fn test_builtin_lints_are_configurable() {
        for name in ValidatePhase::new().lint_names() {
            assert!(KNOWN_LINTS.contains(&name), "{name} missing from KNOWN_LINTS");
        }
        let info = ValidatePhase::new().lint_info();
        let unused = info.iter().find(|i| i.name == "unused-variable").unwrap();
        assert_eq!(unused.default_level, IssueLevel::Warn);
    }
}

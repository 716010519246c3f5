//! Lints on operation definitions.

use std::collections::HashSet;

use super::super::{Lint, LintContext};
use crate::{location, pipeline::Diagnostic};

/// Lint that errors on operation names used more than once across the
/// documents of a compilation unit.
pub struct DuplicateOperationLint;

impl Lint for DuplicateOperationLint {
    fn name(&self) -> &'static str {
        "duplicate-operation"
    }

    fn description(&self) -> &'static str {
        "Operation names must be unique"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        let mut seen = HashSet::new();
        for (file, op) in ctx.operations() {
            let Some(name) = &op.name else {
                continue;
            };
            if !seen.insert(name.as_str()) {
                diagnostics.push(
                    Diagnostic::error(
                        "validate",
                        format!("There can be only one operation named '{}'", name),
                    )
                    .at(location(file, op.pos)),
                );
            }
        }
    }
}

/// Lint that errors on operations without a name. Every operation needs a
/// name for its models and its persisted id.
pub struct AnonymousOperationLint;

impl Lint for AnonymousOperationLint {
    fn name(&self) -> &'static str {
        "anonymous-operation"
    }

    fn description(&self) -> &'static str {
        "Operations must be named"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for (file, op) in ctx.operations() {
            if op.name.is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        "validate",
                        format!("Anonymous {} operations are not supported, add a name", op.kind),
                    )
                    .at(location(file, op.pos)),
                );
            }
        }
    }
}

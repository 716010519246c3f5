//! Lints on operation variables.

use std::collections::BTreeSet;

use quiver_manifest::IssueLevel;
use quiver_syntax::ast::OperationDefinition;

use super::super::{Lint, LintContext};
use crate::{ir::referenced_variables, location, pipeline::Diagnostic};

/// Lint that errors on repeated or non-input variable declarations and on
/// variables an operation uses without declaring.
pub struct VariablesLint;

impl Lint for VariablesLint {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn description(&self) -> &'static str {
        "Variables must be declared once, with an input type, before use"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for (file, op) in ctx.operations() {
            let op_name = op.name.as_deref().unwrap_or("<anonymous>");

            for (i, variable) in op.variables.iter().enumerate() {
                let at = location(file, variable.pos);
                if op.variables[..i].iter().any(|v| v.name == variable.name) {
                    diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!("Variable '${}' is declared more than once", variable.name),
                        )
                        .at(at.clone()),
                    );
                }
                if !ctx.schema.is_input_type(variable.ty.name()) {
                    diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "Variable '${}' cannot be non-input type '{}'",
                                variable.name, variable.ty
                            ),
                        )
                        .at(at),
                    );
                }
            }

            for name in used_variables(ctx, op) {
                if !op.variables.iter().any(|v| v.name == name) {
                    diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "Variable '${}' is not defined by operation '{}'",
                                name, op_name
                            ),
                        )
                        .at(location(file, op.pos)),
                    );
                }
            }
        }
    }
}

/// Lint that warns about declared variables nothing references.
pub struct UnusedVariableLint;

impl Lint for UnusedVariableLint {
    fn name(&self) -> &'static str {
        "unused-variable"
    }

    fn description(&self) -> &'static str {
        "Declared variables should be used"
    }

    fn default_level(&self) -> IssueLevel {
        IssueLevel::Warn
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for (file, op) in ctx.operations() {
            let used = used_variables(ctx, op);
            for variable in &op.variables {
                if !used.contains(variable.name.as_str()) {
                    diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "Variable '${}' is never used in operation '{}'",
                                variable.name,
                                op.name.as_deref().unwrap_or("<anonymous>")
                            ),
                        )
                        .at(location(file, variable.pos)),
                    );
                }
            }
        }
    }
}

/// Variables referenced by the selection, spread fragments and the
/// operation's own directives.
fn used_variables<'a>(ctx: &LintContext<'a>, op: &'a OperationDefinition) -> BTreeSet<&'a str> {
    let mut used = referenced_variables(ctx.documents, &op.selection_set);
    let mut in_directives = Vec::new();
    for directive in &op.directives {
        for argument in &directive.arguments {
            argument.value.variables(&mut in_directives);
        }
    }
    used.extend(in_directives);
    used
}

#[cfg(test)]
mod tests {
    use super::{super::test_support::messages, *};

    #[test]
    fn test_declared_variables() {
        let src = "query Q($id: ID!, $id: ID!, $c: Character) { human(id: $id) { name } }";
        assert_eq!(
            messages(&VariablesLint, src),
            [
                "Variable '$id' is declared more than once",
                "Variable '$c' cannot be non-input type 'Character'",
            ]
        );
    }

    #[test]
    fn test_undefined_variable_through_fragment() {
        let src = "query Q { ...Human }\n\
                   fragment Human on Query { human(id: $id) { name @include(if: $withName) } }";
        assert_eq!(
            messages(&VariablesLint, src),
            [
                "Variable '$id' is not defined by operation 'Q'",
                "Variable '$withName' is not defined by operation 'Q'",
            ]
        );
    }

    #[test]
    fn test_unused_variable() {
        let src = "query Q($ep: Episode, $unused: Int) { hero(episode: $ep) { name } }";
        assert_eq!(
            messages(&UnusedVariableLint, src),
            ["Variable '$unused' is never used in operation 'Q'"]
        );
    }

    #[test]
    fn test_variable_used_only_in_skip() {
        let src = "query Q($skip: Boolean!) { hero { name @skip(if: $skip) } }";
        assert!(messages(&UnusedVariableLint, src).is_empty());
        assert!(messages(&VariablesLint, src).is_empty());
    }
}

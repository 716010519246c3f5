//! Lint on directive usage.

use quiver_syntax::{
    Position,
    ast::{Directive, DirectiveLocation},
};

use super::super::{Lint, LintContext, Scope, Visitor};
use crate::pipeline::Diagnostic;

/// Lint that errors on unknown directives, directives used where their
/// definition does not allow them, and non-repeatable directives repeated.
pub struct UnknownDirectiveLint;

impl Lint for UnknownDirectiveLint {
    fn name(&self) -> &'static str {
        "unknown-directive"
    }

    fn description(&self) -> &'static str {
        "Directives must be defined and allowed at their location"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn directives(
                &mut self,
                scope: Scope<'a>,
                at: DirectiveLocation,
                directives: &'a [Directive],
                _pos: Position,
            ) {
                for (i, directive) in directives.iter().enumerate() {
                    let message = match self.ctx.schema.directive(&directive.name) {
                        None => format!("Unknown directive '@{}'", directive.name),
                        Some(definition) if !definition.locations.contains(&at) => format!(
                            "Directive '@{}' may not be used on {}",
                            directive.name, at
                        ),
                        Some(definition)
                            if !definition.repeatable
                                && directives[..i].iter().any(|d| d.name == directive.name) =>
                        {
                            format!(
                                "The directive '@{}' can only be used once at this location",
                                directive.name
                            )
                        }
                        Some(_) => continue,
                    };
                    self.diagnostics
                        .push(Diagnostic::error("validate", message).at(scope.location(directive.pos)));
                }
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{super::test_support::messages, *};

    #[test]
    fn test_directive_usage() {
        let src = "query Q @include(if: true) {\n\
                   hero @defer { name @skip(if: true) @skip(if: false) }\n\
                   }";
        assert_eq!(
            messages(&UnknownDirectiveLint, src),
            [
                "Directive '@include' may not be used on QUERY",
                "Unknown directive '@defer'",
                "The directive '@skip' can only be used once at this location",
            ]
        );
    }

    #[test]
    fn test_allowed_directives() {
        let src = "query Q($v: Boolean!) { hero { ... on Droid @include(if: $v) { id } ...F @skip(if: $v) } }\n\
                   fragment F on Character { id }";
        assert!(messages(&UnknownDirectiveLint, src).is_empty());
    }
}

//! Lints on fragment definitions and spreads.

use std::collections::{BTreeSet, HashSet};

use quiver_manifest::IssueLevel;
use quiver_syntax::{
    Position,
    ast::{FragmentDefinition, FragmentSpread, InlineFragment, Selection, SelectionSet},
};

use super::super::{Lint, LintContext, Scope, Visitor};
use crate::{ir::used_fragments, location, pipeline::Diagnostic};

/// Lint that errors on type conditions naming unknown or non-composite types,
/// and on fragments that can never match where they are spread.
pub struct FragmentTypeConditionLint;

impl Lint for FragmentTypeConditionLint {
    fn name(&self) -> &'static str {
        "fragment-type-condition"
    }

    fn description(&self) -> &'static str {
        "Type conditions must name composite types that can apply"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl Check<'_> {
            fn condition(&mut self, condition: &str, at: String) -> bool {
                let schema = self.ctx.schema;
                let message = if schema.get_type(condition).is_none() {
                    format!("Unknown type '{}'", condition)
                } else if !schema.is_composite(condition) {
                    format!("Fragment cannot condition on non composite type '{}'", condition)
                } else {
                    return true;
                };
                self.diagnostics
                    .push(Diagnostic::error("validate", message).at(at));
                false
            }

            fn spread(&mut self, scope: &Scope<'_>, name: Option<&str>, condition: &str, pos: Position) {
                let schema = self.ctx.schema;
                let parent = schema.possible_types(scope.parent_type);
                let matched = schema.possible_types(condition);
                if parent.is_disjoint(&matched) {
                    let fragment = match name {
                        Some(name) => format!("Fragment '{}'", name),
                        None => "Fragment".to_string(),
                    };
                    self.diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "{} cannot be spread here as objects of type '{}' can never be of type '{}'",
                                fragment, scope.parent_type, condition
                            ),
                        )
                        .at(scope.location(pos)),
                    );
                }
            }
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn enter_fragment(&mut self, file: &'a str, fragment: &'a FragmentDefinition) {
                self.condition(&fragment.type_condition, location(file, fragment.pos));
            }

            fn inline_fragment(&mut self, scope: Scope<'a>, fragment: &'a InlineFragment) {
                if let Some(condition) = &fragment.type_condition
                    && self.condition(condition, scope.location(fragment.pos))
                {
                    self.spread(&scope, None, condition, fragment.pos);
                }
            }

            fn fragment_spread(&mut self, scope: Scope<'a>, spread: &'a FragmentSpread) {
                if let Some(fragment) = self.ctx.documents.fragment(&spread.name)
                    && self.ctx.schema.is_composite(&fragment.type_condition)
                {
                    self.spread(&scope, Some(&spread.name), &fragment.type_condition, spread.pos);
                }
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

/// Lint that errors on spreads of fragments no document defines, and on
/// fragment names defined twice.
pub struct UnknownFragmentLint;

impl Lint for UnknownFragmentLint {
    fn name(&self) -> &'static str {
        "unknown-fragment"
    }

    fn description(&self) -> &'static str {
        "Spread fragments must be defined exactly once"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn fragment_spread(&mut self, scope: Scope<'a>, spread: &'a FragmentSpread) {
                if self.ctx.documents.fragment(&spread.name).is_none() {
                    self.diagnostics.push(
                        Diagnostic::error("validate", format!("Unknown fragment '{}'", spread.name))
                            .at(scope.location(spread.pos)),
                    );
                }
            }
        }

        let mut seen = HashSet::new();
        for (file, fragment) in ctx.fragments() {
            if !seen.insert(fragment.name.as_str()) {
                diagnostics.push(
                    Diagnostic::error(
                        "validate",
                        format!("There can be only one fragment named '{}'", fragment.name),
                    )
                    .at(location(file, fragment.pos)),
                );
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

/// Lint that errors on fragments that spread themselves, directly or
/// through other fragments.
pub struct FragmentCycleLint;

impl Lint for FragmentCycleLint {
    fn name(&self) -> &'static str {
        "fragment-cycle"
    }

    fn description(&self) -> &'static str {
        "Fragments must not spread themselves"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        for (file, fragment) in ctx.fragments() {
            let mut path = Vec::new();
            let mut visited = HashSet::new();
            if spreads_into(ctx, &fragment.selection_set, &fragment.name, &mut path, &mut visited) {
                let via = path
                    .iter()
                    .map(|name| format!("'{}'", name))
                    .collect::<Vec<_>>()
                    .join(", ");
                diagnostics.push(
                    Diagnostic::error(
                        "validate",
                        format!(
                            "Cannot spread fragment '{}' within itself via {}",
                            fragment.name, via
                        ),
                    )
                    .at(location(file, fragment.pos)),
                );
            }
        }
    }
}

/// Depth-first search for a spread of `target`; on success `path` holds the
/// chain of spread names ending in `target`.
fn spreads_into<'a>(
    ctx: &LintContext<'a>,
    set: &'a SelectionSet,
    target: &str,
    path: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) -> bool {
    for selection in &set.selections {
        let found = match selection {
            Selection::Field(field) => field
                .selection_set
                .as_ref()
                .is_some_and(|nested| spreads_into(ctx, nested, target, path, visited)),
            Selection::InlineFragment(inline) => {
                spreads_into(ctx, &inline.selection_set, target, path, visited)
            }
            Selection::FragmentSpread(spread) => {
                path.push(&spread.name);
                if spread.name == target {
                    return true;
                }
                let found = visited.insert(&spread.name)
                    && ctx.documents.fragment(&spread.name).is_some_and(|fragment| {
                        spreads_into(ctx, &fragment.selection_set, target, path, visited)
                    });
                if !found {
                    path.pop();
                }
                found
            }
        };
        if found {
            return true;
        }
    }
    false
}

/// Lint that warns about fragments no operation uses.
pub struct UnusedFragmentLint;

impl Lint for UnusedFragmentLint {
    fn name(&self) -> &'static str {
        "unused-fragment"
    }

    fn description(&self) -> &'static str {
        "Defined fragments should be spread by some operation"
    }

    fn default_level(&self) -> IssueLevel {
        IssueLevel::Warn
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        let used: BTreeSet<&str> = ctx
            .operations()
            .flat_map(|(_, op)| used_fragments(ctx.documents, &op.selection_set))
            .collect();
        for (file, fragment) in ctx.fragments() {
            if !used.contains(fragment.name.as_str()) {
                diagnostics.push(
                    Diagnostic::error(
                        "validate",
                        format!("Fragment '{}' is never used", fragment.name),
                    )
                    .at(location(file, fragment.pos)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{super::test_support::messages, *};

    #[test]
    fn test_condition_on_unknown_and_leaf_types() {
        let src = "fragment A on Planet { name }\n\
                   fragment B on Episode { name }\n\
                   query Q { hero { ... on Jedi { name } } }";
        assert_eq!(
            messages(&FragmentTypeConditionLint, src),
            [
                "Unknown type 'Planet'",
                "Fragment cannot condition on non composite type 'Episode'",
                "Unknown type 'Jedi'",
            ]
        );
    }

    #[test]
    fn test_impossible_spreads() {
        let src = "query Q { hero { ... on Starship { name } ...Ship } }\n\
                   fragment Ship on Starship { id }";
        assert_eq!(
            messages(&FragmentTypeConditionLint, src),
            [
                "Fragment cannot be spread here as objects of type 'Character' can never be of type 'Starship'",
                "Fragment 'Ship' cannot be spread here as objects of type 'Character' can never be of type 'Starship'",
            ]
        );
    }

    #[test]
    fn test_possible_spreads() {
        let src = "query Q {\n\
                   hero { ... on Human { id } ... on Character { id } }\n\
                   search(text: \"x\") { ... on Character { id } }\n\
                   }";
        assert!(messages(&FragmentTypeConditionLint, src).is_empty());
    }

    #[test]
    fn test_unknown_and_duplicate_fragments() {
        let src = "query Q { hero { ...Missing ...F } }\n\
                   fragment F on Character { id }\n\
                   fragment F on Character { name }";
        assert_eq!(
            messages(&UnknownFragmentLint, src),
            [
                "There can be only one fragment named 'F'",
                "Unknown fragment 'Missing'",
            ]
        );
    }

    #[test]
    fn test_fragment_cycles() {
        let src = "fragment A on Character { friends { ...B } }\n\
                   fragment B on Character { ...A }\n\
                   fragment C on Character { ...A }";
        assert_eq!(
            messages(&FragmentCycleLint, src),
            [
                "Cannot spread fragment 'A' within itself via 'B', 'A'",
                "Cannot spread fragment 'B' within itself via 'A', 'B'",
            ]
        );
    }

    #[test]
    fn test_unused_fragments() {
        let src = "query Q { hero { ...Outer } }\n\
                   fragment Outer on Character { ...Inner }\n\
                   fragment Inner on Character { id }\n\
                   fragment Orphan on Character { id }";
        assert_eq!(
            messages(&UnusedFragmentLint, src),
            ["Fragment 'Orphan' is never used"]
        );
    }
}

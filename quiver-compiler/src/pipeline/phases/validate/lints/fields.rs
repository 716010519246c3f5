//! Lints on field selections.

use std::collections::BTreeMap;

use quiver_syntax::ast::{Argument, Field, FieldDefinition, OperationDefinition, SelectionSet};

use super::super::{Lint, LintContext, Scope, Visitor};
use crate::{
    ir::{Reached, collect},
    location,
    pipeline::Diagnostic,
};

/// Lint that errors on fields the parent type does not define, and on
/// operations whose root type the schema lacks.
pub struct FieldNotFoundLint;

impl Lint for FieldNotFoundLint {
    fn name(&self) -> &'static str {
        "field-not-found"
    }

    fn description(&self) -> &'static str {
        "Selected fields must exist on the parent type"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn enter_operation(&mut self, file: &'a str, op: &'a OperationDefinition) {
                if self.ctx.schema.root_type(op.kind).is_none() {
                    self.diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!("Schema does not define a {} root type", op.kind),
                        )
                        .at(location(file, op.pos)),
                    );
                }
            }

            fn field(&mut self, scope: Scope<'a>, field: &'a Field, definition: Option<&'a FieldDefinition>) {
                if definition.is_none() {
                    self.diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "Cannot query field '{}' on type '{}'",
                                field.name, scope.parent_type
                            ),
                        )
                        .at(scope.location(field.pos)),
                    );
                }
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

/// Lint that errors when leaf fields have a selection set or composite
/// fields lack one.
pub struct SelectionShapeLint;

impl Lint for SelectionShapeLint {
    fn name(&self) -> &'static str {
        "selection-shape"
    }

    fn description(&self) -> &'static str {
        "Composite fields need a selection set, leaf fields must not have one"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn field(&mut self, scope: Scope<'a>, field: &'a Field, definition: Option<&'a FieldDefinition>) {
                let Some(definition) = definition else {
                    return;
                };
                let schema = self.ctx.schema;
                let named = definition.ty.name();
                let message = match &field.selection_set {
                    Some(_) if schema.is_leaf(named) => format!(
                        "Field '{}' must not have a selection since type '{}' has no subfields",
                        field.name, definition.ty
                    ),
                    None if schema.is_composite(named) => format!(
                        "Field '{}' of type '{}' must have a selection of subfields",
                        field.name, definition.ty
                    ),
                    _ => return,
                };
                self.diagnostics
                    .push(Diagnostic::error("validate", message).at(scope.location(field.pos)));
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

/// Lint that errors when two selections of one response name cannot be
/// merged: different fields, different arguments or conflicting types.
///
/// Selections made on two distinct object types never apply to the same
/// object, so only their types have to agree.
pub struct ConflictingFieldsLint;

impl Lint for ConflictingFieldsLint {
    fn name(&self) -> &'static str {
        "conflicting-fields"
    }

    fn description(&self) -> &'static str {
        "Selections sharing a response name must be mergeable"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        let mut reported = Vec::new();
        for (file, op) in ctx.operations() {
            if let Some(root) = ctx.schema.root_type(op.kind) {
                check_sets(ctx, file, root, &[&op.selection_set], &mut reported);
            }
        }
        for (file, fragment) in ctx.fragments() {
            if ctx.schema.is_composite(&fragment.type_condition) {
                check_sets(
                    ctx,
                    file,
                    &fragment.type_condition,
                    &[&fragment.selection_set],
                    &mut reported,
                );
            }
        }
        // The same conflict is found from every operation spreading a fragment.
        let mut seen = Vec::new();
        for diagnostic in reported {
            if !seen.contains(&diagnostic) {
                seen.push(diagnostic);
            }
        }
        diagnostics.extend(seen);
    }
}

fn check_sets<'a>(
    ctx: &LintContext<'a>,
    file: &str,
    parent_type: &'a str,
    sets: &[&'a SelectionSet],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let collected = collect(ctx.documents, parent_type, sets);
    let mut by_name: BTreeMap<&str, Vec<(&Reached<'a>, &'a FieldDefinition)>> = BTreeMap::new();
    for reached in &collected.fields {
        if let Some(definition) = ctx.schema.field(reached.parent_type, &reached.field.name) {
            by_name
                .entry(reached.field.response_name())
                .or_default()
                .push((reached, definition));
        }
    }

    for (response_name, fields) in by_name {
        let (first, first_definition) = fields[0];
        let mut mergeable = true;
        for &(other, other_definition) in &fields[1..] {
            if let Some(reason) = conflict(ctx, (first, first_definition), (other, other_definition)) {
                mergeable = false;
                diagnostics.push(
                    Diagnostic::error(
                        "validate",
                        format!("Fields '{}' conflict because {}", response_name, reason),
                    )
                    .at(location(file, other.field.pos)),
                );
            }
        }
        if !mergeable {
            continue;
        }

        let ty = first_definition.ty.name();
        if !ctx.schema.is_composite(ty) {
            continue;
        }
        let nested: Vec<&'a SelectionSet> = fields
            .iter()
            .filter_map(|(reached, _)| reached.field.selection_set.as_ref())
            .collect();
        if !nested.is_empty() {
            check_sets(ctx, file, ty, &nested, diagnostics);
        }
    }
}

fn conflict(
    ctx: &LintContext<'_>,
    (a, a_def): (&Reached<'_>, &FieldDefinition),
    (b, b_def): (&Reached<'_>, &FieldDefinition),
) -> Option<String> {
    if a_def.ty != b_def.ty {
        return Some(format!(
            "they return conflicting types '{}' and '{}'",
            a_def.ty, b_def.ty
        ));
    }

    let exclusive = a.parent_type != b.parent_type
        && ctx.schema.is_object(a.parent_type)
        && ctx.schema.is_object(b.parent_type);
    if exclusive {
        return None;
    }

    if a.field.name != b.field.name {
        return Some(format!(
            "'{}' and '{}' are different fields",
            a.field.name, b.field.name
        ));
    }
    if !same_arguments(&a.field.arguments, &b.field.arguments) {
        return Some("they have differing arguments".to_string());
    }
    None
}

fn same_arguments(a: &[Argument], b: &[Argument]) -> bool {
    let key = |arguments: &[Argument]| {
        let mut pairs: Vec<(String, String)> = arguments
            .iter()
            .map(|arg| (arg.name.clone(), arg.value.to_string()))
            .collect();
        pairs.sort();
        pairs
    };
    key(a) == key(b)
}

#[cfg(test)]
mod tests {
    use super::{super::test_support::messages, *};

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            messages(&FieldNotFoundLint, "query Q { hero { name bogus } }"),
            ["Cannot query field 'bogus' on type 'Character'"]
        );
    }

    #[test]
    fn test_field_on_type_condition() {
        let src = "query Q { hero { ... on Droid { primaryFunction homePlanet } } }";
        assert_eq!(
            messages(&FieldNotFoundLint, src),
            ["Cannot query field 'homePlanet' on type 'Droid'"]
        );
    }

    #[test]
    fn test_meta_fields_resolve() {
        let src = "query Q { __typename hero { __typename } __schema { __typename } }";
        assert!(messages(&FieldNotFoundLint, src).is_empty());
    }

    #[test]
    fn test_location() {
        let diagnostics = super::super::test_support::diagnostics(
            &FieldNotFoundLint,
            "query Q {\n  hero {\n    bogus\n  }\n}",
        );
        assert_eq!(diagnostics[0].location.as_deref(), Some("test.graphql:3:5"));
    }

    #[test]
    fn test_selection_shape() {
        let src = "query Q { hero { name { length } } human(id: 1) }";
        assert_eq!(
            messages(&SelectionShapeLint, src),
            [
                "Field 'name' must not have a selection since type 'String!' has no subfields",
                "Field 'human' of type 'Human' must have a selection of subfields",
            ]
        );
    }

    #[test]
    fn test_same_field_twice_merges() {
        let src = "query Q { hero { name } hero { id name } }";
        assert!(messages(&ConflictingFieldsLint, src).is_empty());
    }

    #[test]
    fn test_alias_to_different_fields() {
        let src = "query Q { hero { label: name label: id } }";
        assert_eq!(
            messages(&ConflictingFieldsLint, src),
            ["Fields 'label' conflict because they return conflicting types 'String!' and 'ID!'"]
        );
    }

    #[test]
    fn test_different_fields_same_type() {
        let src = "query Q { droid(id: 1) { label: name label: primaryFunction } }";
        assert_eq!(
            messages(&ConflictingFieldsLint, src),
            ["Fields 'label' conflict because they return conflicting types 'String!' and 'String'"]
        );
        let src = "query Q { droid(id: 1) { x: primaryFunction x: nickname } }";
        assert_eq!(
            messages(&ConflictingFieldsLint, src),
            ["Fields 'x' conflict because 'primaryFunction' and 'nickname' are different fields"]
        );
        let src = "query Q { human(id: 1) { x: homePlanet x: birthDate } }";
        assert_eq!(
            messages(&ConflictingFieldsLint, src),
            ["Fields 'x' conflict because they return conflicting types 'String' and 'Date'"]
        );
    }

    #[test]
    fn test_differing_arguments() {
        let src = "query Q { hero(episode: JEDI) { name } hero(episode: EMPIRE) { id } }";
        assert_eq!(
            messages(&ConflictingFieldsLint, src),
            ["Fields 'hero' conflict because they have differing arguments"]
        );
    }

    #[test]
    fn test_exclusive_object_types_may_differ() {
        let src = "query Q { search(text: \"x\") {\n\
                   ... on Human { size: height(unit: FOOT) }\n\
                   ... on Starship { size: length }\n\
                   } }";
        assert!(messages(&ConflictingFieldsLint, src).is_empty());
    }

    #[test]
    fn test_conflict_in_merged_subselection() {
        let src = "query Q { hero { friends { n: name } } hero { friends { n: id } } }";
        assert_eq!(
            messages(&ConflictingFieldsLint, src),
            ["Fields 'n' conflict because they return conflicting types 'String!' and 'ID!'"]
        );
    }

    #[test]
    fn test_conflict_through_fragment_reported_once() {
        let src = "query A { hero { ...F } }\nquery B { hero { ...F } }\n\
                   fragment F on Character { x: name x: id }";
        assert_eq!(messages(&ConflictingFieldsLint, src).len(), 1);
    }
}

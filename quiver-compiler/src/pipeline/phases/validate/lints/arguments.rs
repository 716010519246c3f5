//! Lints on argument lists and input values.

use std::collections::HashMap;

use quiver_schema::Schema;
use quiver_syntax::{
    Position,
    ast::{
        Argument, Directive, DirectiveLocation, Field, FieldDefinition, InputValueDefinition,
        OperationDefinition, Type, TypeDefinition, Value,
    },
};

use super::super::{Lint, LintContext, Scope, Visitor};
use crate::{location, pipeline::Diagnostic};

/// Lint that errors on unknown, repeated or missing required arguments of
/// fields and directives.
pub struct ArgumentsLint;

impl Lint for ArgumentsLint {
    fn name(&self) -> &'static str {
        "arguments"
    }

    fn description(&self) -> &'static str {
        "Arguments must be defined, given once, and required ones provided"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl Check<'_> {
            fn arguments(
                &mut self,
                at: &str,
                owner: &str,
                given: &[Argument],
                defined: &[InputValueDefinition],
                pos: Position,
                scope: &Scope<'_>,
            ) {
                for (i, argument) in given.iter().enumerate() {
                    let message = if !defined.iter().any(|d| d.name == argument.name) {
                        format!("Unknown argument '{}' on {} '{}'", argument.name, at, owner)
                    } else if given[..i].iter().any(|a| a.name == argument.name) {
                        format!("Argument '{}' is given more than once", argument.name)
                    } else {
                        continue;
                    };
                    self.diagnostics
                        .push(Diagnostic::error("validate", message).at(scope.location(argument.pos)));
                }

                for definition in defined {
                    let provided = given
                        .iter()
                        .find(|a| a.name == definition.name)
                        .is_some_and(|a| !a.value.is_null());
                    if definition.is_required() && !provided {
                        self.diagnostics.push(
                            Diagnostic::error(
                                "validate",
                                format!(
                                    "{} '{}' argument '{}' of type '{}' is required",
                                    capitalize(at),
                                    owner,
                                    definition.name,
                                    definition.ty
                                ),
                            )
                            .at(scope.location(pos)),
                        );
                    }
                }
            }
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn field(&mut self, scope: Scope<'a>, field: &'a Field, definition: Option<&'a FieldDefinition>) {
                if let Some(definition) = definition {
                    let owner = format!("{}.{}", scope.parent_type, field.name);
                    self.arguments(
                        "field",
                        &owner,
                        &field.arguments,
                        &definition.arguments,
                        field.pos,
                        &scope,
                    );
                }
            }

            fn directives(
                &mut self,
                scope: Scope<'a>,
                _location: DirectiveLocation,
                directives: &'a [Directive],
                _pos: Position,
            ) {
                for directive in directives {
                    if let Some(definition) = self.ctx.schema.directive(&directive.name) {
                        let owner = format!("@{}", directive.name);
                        self.arguments(
                            "directive",
                            &owner,
                            &directive.arguments,
                            &definition.arguments,
                            directive.pos,
                            &scope,
                        );
                    }
                }
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lint that errors when a literal does not fit its input type, or a
/// variable is used where its declared type is not allowed.
pub struct TypeMismatchLint;

impl Lint for TypeMismatchLint {
    fn name(&self) -> &'static str {
        "type-mismatch"
    }

    fn description(&self) -> &'static str {
        "Argument values and variables must match the expected input type"
    }

    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>) {
        struct Check<'d> {
            ctx: LintContext<'d>,
            diagnostics: &'d mut Vec<Diagnostic>,
        }

        impl Check<'_> {
            fn arguments(&mut self, scope: &Scope<'_>, given: &[Argument], defined: &[InputValueDefinition]) {
                let variables = scope.owner.operation().map(variable_types);
                for argument in given {
                    let Some(definition) = defined.iter().find(|d| d.name == argument.name) else {
                        continue;
                    };
                    let checker = ValueChecker {
                        schema: self.ctx.schema,
                        variables: variables.as_ref(),
                    };
                    let has_default = definition.default_value.is_some();
                    if let Some(message) = checker.check(&argument.value, &definition.ty, has_default) {
                        self.diagnostics
                            .push(Diagnostic::error("validate", message).at(scope.location(argument.pos)));
                    }
                }
            }
        }

        impl<'a> Visitor<'a> for Check<'_> {
            fn enter_operation(&mut self, file: &'a str, op: &'a OperationDefinition) {
                let checker = ValueChecker {
                    schema: self.ctx.schema,
                    variables: None,
                };
                for variable in &op.variables {
                    if let Some(default) = &variable.default_value
                        && let Some(message) = checker.check(default, &variable.ty, false)
                    {
                        self.diagnostics
                            .push(Diagnostic::error("validate", message).at(location(file, variable.pos)));
                    }
                }
            }

            fn field(&mut self, scope: Scope<'a>, field: &'a Field, definition: Option<&'a FieldDefinition>) {
                if let Some(definition) = definition {
                    self.arguments(&scope, &field.arguments, &definition.arguments);
                }
            }

            fn directives(
                &mut self,
                scope: Scope<'a>,
                _location: DirectiveLocation,
                directives: &'a [Directive],
                _pos: Position,
            ) {
                for directive in directives {
                    if let Some(definition) = self.ctx.schema.directive(&directive.name) {
                        self.arguments(&scope, &directive.arguments, &definition.arguments);
                    }
                }
            }
        }

        ctx.walk(&mut Check {
            ctx: *ctx,
            diagnostics,
        });
    }
}

/// Declared variable types and whether each has a default.
type VariableTypes<'a> = HashMap<&'a str, (&'a Type, bool)>;

fn variable_types(op: &OperationDefinition) -> VariableTypes<'_> {
    op.variables
        .iter()
        .map(|v| (v.name.as_str(), (&v.ty, v.default_value.is_some())))
        .collect()
}

struct ValueChecker<'s, 'v> {
    schema: &'s Schema,
    /// `None` outside operations, where variables are not checked.
    variables: Option<&'v VariableTypes<'v>>,
}

impl ValueChecker<'_, '_> {
    /// Check `value` against `ty`. `has_default` is whether the location
    /// provides a default, which lets a nullable variable flow into a
    /// non-null location.
    fn check(&self, value: &Value, ty: &Type, has_default: bool) -> Option<String> {
        if let Value::Variable(name) = value {
            let (declared, declared_default) = self.variables?.get(name.as_str())?;
            let allowed = if ty.is_non_null() && !declared.is_non_null() {
                (*declared_default || has_default) && is_compatible(declared, ty.nullable())
            } else {
                is_compatible(declared, ty)
            };
            return (!allowed).then(|| {
                format!(
                    "Variable '${}' of type '{}' used in position expecting type '{}'",
                    name, declared, ty
                )
            });
        }

        let mismatch = || format!("Expected value of type '{}', found {}", ty, value);
        match ty {
            Type::NonNull(inner) => {
                if value.is_null() {
                    Some(mismatch())
                } else {
                    self.check(value, inner, false)
                }
            }
            _ if value.is_null() => None,
            Type::List(inner) => match value {
                Value::List(items) => items.iter().find_map(|item| self.check(item, inner, false)),
                single => self.check(single, inner, false),
            },
            Type::Named(name) => self.check_named(value, name).then(mismatch).or_else(|| {
                self.check_input_object(value, name)
            }),
        }
    }

    /// Whether a non-null, non-variable `value` is the wrong kind of literal
    /// for the named type.
    fn check_named(&self, value: &Value, name: &str) -> bool {
        let fits = match self.schema.get_type(name) {
            Some(TypeDefinition::Scalar(_)) => match name {
                "Int" => matches!(value, Value::Int(n) if n.parse::<i32>().is_ok()),
                "Float" => matches!(value, Value::Int(_) | Value::Float(_)),
                "String" => matches!(value, Value::String(_)),
                "Boolean" => matches!(value, Value::Boolean(_)),
                "ID" => matches!(value, Value::String(_) | Value::Int(_)),
                _ => true,
            },
            Some(TypeDefinition::Enum(en)) => {
                matches!(value, Value::Enum(v) if en.values.iter().any(|d| &d.name == v))
            }
            Some(TypeDefinition::InputObject(_)) => matches!(value, Value::Object(_)),
            _ => true,
        };
        !fits
    }

    fn check_input_object(&self, value: &Value, name: &str) -> Option<String> {
        let (Some(TypeDefinition::InputObject(input)), Value::Object(fields)) =
            (self.schema.get_type(name), value)
        else {
            return None;
        };
        for (field, field_value) in fields {
            let Some(definition) = input.fields.iter().find(|d| &d.name == field) else {
                return Some(format!(
                    "Field '{}' is not defined by input type '{}'",
                    field, name
                ));
            };
            let has_default = definition.default_value.is_some();
            if let Some(message) = self.check(field_value, &definition.ty, has_default) {
                return Some(message);
            }
        }
        input
            .fields
            .iter()
            .find(|d| d.is_required() && !fields.iter().any(|(f, v)| f == &d.name && !v.is_null()))
            .map(|d| {
                format!(
                    "Field '{}.{}' of required type '{}' was not provided",
                    name, d.name, d.ty
                )
            })
    }
}

/// Whether a variable of type `declared` may be used where `expected` is.
fn is_compatible(declared: &Type, expected: &Type) -> bool {
    match (declared, expected) {
        (Type::NonNull(d), Type::NonNull(e)) => is_compatible(d, e),
        (_, Type::NonNull(_)) => false,
        (Type::NonNull(d), e) => is_compatible(d, e),
        (Type::List(d), Type::List(e)) => is_compatible(d, e),
        (Type::List(_), _) | (_, Type::List(_)) => false,
        (Type::Named(d), Type::Named(e)) => d == e,
    }
}

#[cfg(test)]
mod tests {
    use super::{super::test_support::messages, *};

    #[test]
    fn test_unknown_and_duplicate_arguments() {
        let src = "query Q { hero(episode: JEDI, episode: EMPIRE, planet: \"x\") { name } }";
        assert_eq!(
            messages(&ArgumentsLint, src),
            [
                "Argument 'episode' is given more than once",
                "Unknown argument 'planet' on field 'Query.hero'",
            ]
        );
    }

    #[test]
    fn test_missing_required_argument() {
        assert_eq!(
            messages(&ArgumentsLint, "query Q { human { name } }"),
            ["Field 'Query.human' argument 'id' of type 'ID!' is required"]
        );
    }

    #[test]
    fn test_directive_arguments() {
        assert_eq!(
            messages(&ArgumentsLint, "query Q { hero @include { name } }"),
            ["Directive '@include' argument 'if' of type 'Boolean!' is required"]
        );
    }

    #[test]
    fn test_argument_with_default_is_optional() {
        let src = "query Q { human(id: 1) { height } }";
        assert!(messages(&ArgumentsLint, src).is_empty());
    }

    #[test]
    fn test_literal_mismatches() {
        let src = "query Q {\n\
                   hero(episode: CLONES) { name }\n\
                   human(id: 1.5) { height(unit: \"FOOT\") }\n\
                   }";
        assert_eq!(
            messages(&TypeMismatchLint, src),
            [
                "Expected value of type 'Episode', found CLONES",
                "Expected value of type 'ID', found 1.5",
                "Expected value of type 'LengthUnit', found \"FOOT\"",
            ]
        );
    }

    #[test]
    fn test_null_for_non_null() {
        assert_eq!(
            messages(&TypeMismatchLint, "query Q { search(text: null) { __typename } }"),
            ["Expected value of type 'String!', found null"]
        );
    }

    #[test]
    fn test_input_objects() {
        let src = "mutation M {\n\
                   a: createReview(review: {stars: 5, commentary: \"ok\"}) { stars }\n\
                   b: createReview(review: {commentary: \"ok\"}) { stars }\n\
                   c: createReview(review: {stars: 5, extra: 1}) { stars }\n\
                   }";
        assert_eq!(
            messages(&TypeMismatchLint, src),
            [
                "Field 'ReviewInput.stars' of required type 'Int!' was not provided",
                "Field 'extra' is not defined by input type 'ReviewInput'",
            ]
        );
    }

    #[test]
    fn test_list_coercion() {
        let src = "query Q { search(text: [\"a\"]) { __typename } }";
        assert_eq!(
            messages(&TypeMismatchLint, src),
            ["Expected value of type 'String', found [\"a\"]"]
        );
    }

    #[test]
    fn test_variable_usage() {
        let src = "query Q($ep: Episode, $id: ID, $text: String = \"r2\", $n: Int) {\n\
                   hero(episode: $ep) { name }\n\
                   human(id: $id) { name }\n\
                   search(text: $text) { __typename }\n\
                   reviews(episode: $n) { stars }\n\
                   }";
        assert_eq!(
            messages(&TypeMismatchLint, src),
            [
                "Variable '$id' of type 'ID' used in position expecting type 'ID!'",
                "Variable '$n' of type 'Int' used in position expecting type 'Episode!'",
            ]
        );
    }

    #[test]
    fn test_variable_default_value() {
        let src = "query Q($ep: Episode = SITH) { hero(episode: $ep) { name } }";
        assert_eq!(
            messages(&TypeMismatchLint, src),
            ["Expected value of type 'Episode', found SITH"]
        );
    }

    #[test]
    fn test_variables_in_fragments_are_not_checked() {
        let src = "fragment F on Query { human(id: $id) { name } }";
        assert!(messages(&TypeMismatchLint, src).is_empty());
    }
}

//! Lint on deprecated schema elements.

use quiver_manifest::IssueLevel;
use quiver_schema::Schema;
use quiver_syntax::ast::{Field, FieldDefinition, Type, TypeDefinition, Value};

use super::super::{Lint, LintContext, Scope, Visitor};
use crate::pipeline::Diagnostic;

/// Lint that warns when a selection uses a deprecated field or passes a
/// deprecated enum value.
pub struct DeprecatedUsageLint;

impl Lint for DeprecatedUsageLint {
    fn name(&self) -> &'static str {
        "deprecated-usage"
    }

    fn description(&self) -> &'static str {
        "Report use of deprecated fields and enum values"
    }

    fn default_level(&self) -> IssueLevel {
        IssueLevel::Warn
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
                if let Some(reason) = definition.deprecation_reason() {
                    self.diagnostics.push(
                        Diagnostic::error(
                            "validate",
                            format!(
                                "Field '{}.{}' is deprecated: {}",
                                scope.parent_type, field.name, reason
                            ),
                        )
                        .at(scope.location(field.pos)),
                    );
                }
                for argument in &field.arguments {
                    let Some(argument_definition) = definition.argument(&argument.name) else {
                        continue;
                    };
                    let mut found = Vec::new();
                    deprecated_values(
                        self.ctx.schema,
                        &argument.value,
                        &argument_definition.ty,
                        &mut found,
                    );
                    for message in found {
                        self.diagnostics
                            .push(Diagnostic::error("validate", message).at(scope.location(argument.pos)));
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

fn deprecated_values(schema: &Schema, value: &Value, ty: &Type, out: &mut Vec<String>) {
    match (value, ty) {
        (_, Type::NonNull(inner)) => deprecated_values(schema, value, inner, out),
        (Value::List(items), Type::List(inner)) => {
            for item in items {
                deprecated_values(schema, item, inner, out);
            }
        }
        (_, Type::List(inner)) => deprecated_values(schema, value, inner, out),
        (Value::Enum(name), Type::Named(type_name)) => {
            if let Some(TypeDefinition::Enum(en)) = schema.get_type(type_name)
                && let Some(reason) = en
                    .values
                    .iter()
                    .find(|v| &v.name == name)
                    .and_then(|v| v.deprecation_reason())
            {
                out.push(format!(
                    "Enum value '{}.{}' is deprecated: {}",
                    type_name, name, reason
                ));
            }
        }
        (Value::Object(fields), Type::Named(type_name)) => {
            if let Some(TypeDefinition::InputObject(input)) = schema.get_type(type_name) {
                for (field, field_value) in fields {
                    if let Some(definition) = input.fields.iter().find(|d| &d.name == field) {
                        deprecated_values(schema, field_value, &definition.ty, out);
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{super::test_support::messages, *};

    #[test]
    fn test_deprecated_field() {
        let src = "query Q { droid(id: 1) { name nickname } }";
        assert_eq!(
            messages(&DeprecatedUsageLint, src),
            ["Field 'Droid.nickname' is deprecated: Use name"]
        );
    }

    #[test]
    fn test_deprecated_enum_value() {
        let schema = Schema::from_sdl(
            "type Query { a(e: [Color!]): Int }\n\
             enum Color { RED BLUE @deprecated }",
            "colors.graphqls",
        )
        .unwrap();
        let ty = Type::List(Box::new(Type::NonNull(Box::new(Type::named("Color")))));
        let value = Value::List(vec![Value::Enum("RED".into()), Value::Enum("BLUE".into())]);

        let mut found = Vec::new();
        deprecated_values(&schema, &value, &ty, &mut found);
        assert_eq!(found, ["Enum value 'Color.BLUE' is deprecated: No longer supported"]);
    }
}

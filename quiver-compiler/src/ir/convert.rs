//! AST to IR conversions for types and input values.

use indexmap::IndexMap;
use quiver_ir::{IrType, IrValue};
use quiver_schema::Schema;
use quiver_syntax::ast::{Argument, Type, TypeDefinition, Value};

/// Convert a schema type reference. `model_id` replaces the innermost named
/// type when the field is composite.
pub(crate) fn ir_type(schema: &Schema, ty: &Type, model_id: Option<&str>) -> IrType {
    match ty {
        Type::NonNull(inner) => ir_type(schema, inner, model_id).non_null(),
        Type::List(inner) => ir_type(schema, inner, model_id).list(),
        Type::Named(name) => match model_id {
            Some(id) => IrType::model(id),
            None => named_type(schema, name),
        },
    }
}

fn named_type(schema: &Schema, name: &str) -> IrType {
    match schema.get_type(name) {
        Some(TypeDefinition::Enum(_)) => IrType::Enum {
            name: name.to_string(),
        },
        Some(TypeDefinition::InputObject(_)) => IrType::InputObject {
            name: name.to_string(),
        },
        _ => IrType::scalar(name),
    }
}

pub(crate) fn ir_value(value: &Value) -> IrValue {
    match value {
        Value::Variable(name) => IrValue::Variable(name.clone()),
        Value::Int(raw) => match raw.parse() {
            Ok(int) => IrValue::Int(int),
            // Out of i64 range: keep the magnitude as a float.
            Err(_) => IrValue::Float(raw.parse().unwrap_or_default()),
        },
        Value::Float(raw) => IrValue::Float(raw.parse().unwrap_or_default()),
        Value::String(s) => IrValue::String(s.clone()),
        Value::Boolean(b) => IrValue::Boolean(*b),
        Value::Null => IrValue::Null,
        Value::Enum(name) => IrValue::Enum(name.clone()),
        Value::List(items) => IrValue::List(items.iter().map(ir_value).collect()),
        Value::Object(fields) => IrValue::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), ir_value(value)))
                .collect(),
        ),
    }
}

pub(crate) fn ir_arguments(arguments: &[Argument]) -> IndexMap<String, IrValue> {
    arguments
        .iter()
        .map(|argument| (argument.name.clone(), ir_value(&argument.value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::star_wars_schema;

    #[test]
    fn test_ir_type_wrappers() {
        let schema = star_wars_schema();
        let ty = Type::NonNull(Box::new(Type::List(Box::new(Type::named("Episode")))));
        assert_eq!(ir_type(&schema, &ty, None).to_string(), "[Episode]!");
        assert!(matches!(
            ir_type(&schema, &Type::named("Episode"), None),
            IrType::Enum { .. }
        ));
        assert!(matches!(
            ir_type(&schema, &Type::named("ReviewInput"), None),
            IrType::InputObject { .. }
        ));

        let hero = Type::List(Box::new(Type::named("Character")));
        assert_eq!(
            ir_type(&schema, &hero, Some("Q.Data.Hero")).to_string(),
            "[<Q.Data.Hero>]"
        );
    }

    #[test]
    fn test_ir_values() {
        let value = quiver_syntax::parse_const_value("{a: [1, 2.5, \"x\", RED, null, 99999999999999999999]}")
            .unwrap();
        let IrValue::Object(fields) = ir_value(&value) else {
            panic!("expected object");
        };
        let IrValue::List(items) = &fields["a"] else {
            panic!("expected list");
        };
        assert_eq!(items[0], IrValue::Int(1));
        assert_eq!(items[1], IrValue::Float(2.5));
        assert_eq!(items[2], IrValue::String("x".into()));
        assert_eq!(items[3], IrValue::Enum("RED".into()));
        assert_eq!(items[4], IrValue::Null);
        assert_eq!(items[5], IrValue::Float(1e20));
    }
}

//! Core type definitions.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Type of a field, variable or property in the IR.
///
/// Nullability is structural: a type is nullable unless wrapped in
/// [`IrType::NonNull`]. Composite types do not name a schema type but the
/// model group generated for the selection (`Model { id }` holds the group's
/// base model id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrType {
    NonNull { inner: Box<IrType> },
    List { inner: Box<IrType> },
    Scalar { name: String },
    Enum { name: String },
    InputObject { name: String },
    Model { id: String },
}

impl IrType {
    pub fn scalar(name: impl Into<String>) -> Self {
        IrType::Scalar { name: name.into() }
    }

    pub fn model(id: impl Into<String>) -> Self {
        IrType::Model { id: id.into() }
    }

    /// Wrap in `NonNull`, unless already non-null.
    pub fn non_null(self) -> Self {
        match self {
            IrType::NonNull { .. } => self,
            other => IrType::NonNull {
                inner: Box::new(other),
            },
        }
    }

    pub fn list(self) -> Self {
        IrType::List {
            inner: Box::new(self),
        }
    }

    /// Strip one `NonNull` wrapper if present.
    pub fn nullable(&self) -> &IrType {
        match self {
            IrType::NonNull { inner } => inner,
            other => other,
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, IrType::NonNull { .. })
    }

    /// The innermost named type.
    pub fn leaf(&self) -> &IrType {
        match self {
            IrType::NonNull { inner } | IrType::List { inner } => inner.leaf(),
            other => other,
        }
    }

    /// Model group id of the innermost type, if it is composite.
    pub fn model_id(&self) -> Option<&str> {
        match self.leaf() {
            IrType::Model { id } => Some(id),
            _ => None,
        }
    }

    /// Rewrite the model id of the innermost type in place.
    pub fn set_model_id(&mut self, new_id: impl Into<String>) {
        match self {
            IrType::NonNull { inner } | IrType::List { inner } => inner.set_model_id(new_id),
            IrType::Model { id } => *id = new_id.into(),
            _ => {}
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::NonNull { inner } => write!(f, "{}!", inner),
            IrType::List { inner } => write!(f, "[{}]", inner),
            IrType::Scalar { name } | IrType::Enum { name } | IrType::InputObject { name } => {
                f.write_str(name)
            }
            IrType::Model { id } => write!(f, "<{}>", id),
        }
    }
}

/// A GraphQL input value (argument or variable default) in the IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum IrValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    Variable(String),
    List(Vec<IrValue>),
    Object(IndexMap<String, IrValue>),
}

impl IrValue {
    /// Collect the names of variables referenced anywhere in this value.
    pub fn variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            IrValue::Variable(name) => out.push(name),
            IrValue::List(items) => items.iter().for_each(|v| v.variables(out)),
            IrValue::Object(fields) => fields.values().for_each(|v| v.variables(out)),
            _ => {}
        }
    }
}

/// Condition under which a field is part of the response, built from
/// `@skip(if:)` and `@include(if:)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum BooleanExpression {
    #[default]
    True,
    False,
    Variable(String),
    Not(Box<BooleanExpression>),
    And(Vec<BooleanExpression>),
    Or(Vec<BooleanExpression>),
}

impl BooleanExpression {
    pub fn variable(name: impl Into<String>) -> Self {
        BooleanExpression::Variable(name.into())
    }

    pub fn negate(self) -> Self {
        BooleanExpression::Not(Box::new(self)).simplify()
    }

    pub fn and(self, other: BooleanExpression) -> Self {
        BooleanExpression::And(vec![self, other]).simplify()
    }

    pub fn or(self, other: BooleanExpression) -> Self {
        BooleanExpression::Or(vec![self, other]).simplify()
    }

    pub fn is_true(&self) -> bool {
        matches!(self, BooleanExpression::True)
    }

    /// Evaluate with `lookup` giving the value of each variable.
    pub fn evaluate(&self, lookup: &impl Fn(&str) -> bool) -> bool {
        match self {
            BooleanExpression::True => true,
            BooleanExpression::False => false,
            BooleanExpression::Variable(name) => lookup(name),
            BooleanExpression::Not(inner) => !inner.evaluate(lookup),
            BooleanExpression::And(ops) => ops.iter().all(|op| op.evaluate(lookup)),
            BooleanExpression::Or(ops) => ops.iter().any(|op| op.evaluate(lookup)),
        }
    }

    /// Normalize constants, nested operators of the same kind, and duplicate operands.
    pub fn simplify(self) -> Self {
        match self {
            BooleanExpression::Not(inner) => match inner.simplify() {
                BooleanExpression::True => BooleanExpression::False,
                BooleanExpression::False => BooleanExpression::True,
                BooleanExpression::Not(again) => *again,
                other => BooleanExpression::Not(Box::new(other)),
            },
            BooleanExpression::And(ops) => {
                let mut flat = Vec::with_capacity(ops.len());
                for op in ops.into_iter().map(BooleanExpression::simplify) {
                    match op {
                        BooleanExpression::True => {}
                        BooleanExpression::False => return BooleanExpression::False,
                        BooleanExpression::And(nested) => push_unique(&mut flat, nested),
                        other => push_unique(&mut flat, vec![other]),
                    }
                }
                collapse(flat, BooleanExpression::True, BooleanExpression::And)
            }
            BooleanExpression::Or(ops) => {
                let mut flat = Vec::with_capacity(ops.len());
                for op in ops.into_iter().map(BooleanExpression::simplify) {
                    match op {
                        BooleanExpression::False => {}
                        BooleanExpression::True => return BooleanExpression::True,
                        BooleanExpression::Or(nested) => push_unique(&mut flat, nested),
                        other => push_unique(&mut flat, vec![other]),
                    }
                }
                collapse(flat, BooleanExpression::False, BooleanExpression::Or)
            }
            other => other,
        }
    }
}

fn push_unique(out: &mut Vec<BooleanExpression>, ops: Vec<BooleanExpression>) {
    for op in ops {
        if !out.contains(&op) {
            out.push(op);
        }
    }
}

fn collapse(
    mut ops: Vec<BooleanExpression>,
    empty: BooleanExpression,
    wrap: fn(Vec<BooleanExpression>) -> BooleanExpression,
) -> BooleanExpression {
    match ops.len() {
        0 => empty,
        1 => ops.remove(0),
        _ => wrap(ops),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        let ty = IrType::scalar("String").non_null().list().non_null();
        assert_eq!(ty.to_string(), "[String!]!");
        assert_eq!(IrType::model("Q.Data.Hero").to_string(), "<Q.Data.Hero>");
    }

    #[test]
    fn test_non_null_is_idempotent() {
        let ty = IrType::scalar("Int").non_null().non_null();
        assert_eq!(ty, IrType::scalar("Int").non_null());
    }

    #[test]
    fn test_model_id_through_wrappers() {
        let mut ty = IrType::model("Q.Data.Hero").non_null().list();
        assert_eq!(ty.model_id(), Some("Q.Data.Hero"));

        ty.set_model_id("Q.Data.Villain");
        assert_eq!(ty.model_id(), Some("Q.Data.Villain"));
        assert_eq!(IrType::scalar("ID").model_id(), None);
    }

    #[test]
    fn test_type_serialization() {
        let ty = IrType::scalar("ID").non_null();
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"nonNull","inner":{"kind":"scalar","name":"ID"}}"#
        );
    }

    #[test]
    fn test_simplify_constants() {
        let expr = BooleanExpression::True.and(BooleanExpression::variable("a"));
        assert_eq!(expr, BooleanExpression::variable("a"));

        let expr = BooleanExpression::False.or(BooleanExpression::variable("a"));
        assert_eq!(expr, BooleanExpression::variable("a"));

        let expr = BooleanExpression::True.or(BooleanExpression::variable("a"));
        assert_eq!(expr, BooleanExpression::True);

        assert_eq!(BooleanExpression::True.negate(), BooleanExpression::False);
    }

    #[test]
    fn test_simplify_flattens_and_dedups() {
        let expr = BooleanExpression::variable("a")
            .and(BooleanExpression::variable("b"))
            .and(BooleanExpression::variable("a"));
        assert_eq!(
            expr,
            BooleanExpression::And(vec![
                BooleanExpression::variable("a"),
                BooleanExpression::variable("b"),
            ])
        );
    }

    #[test]
    fn test_double_negation() {
        let expr = BooleanExpression::variable("skip").negate().negate();
        assert_eq!(expr, BooleanExpression::variable("skip"));
    }

    #[test]
    fn test_evaluate() {
        let expr = BooleanExpression::variable("withFriends").and(BooleanExpression::variable("skip").negate());
        assert!(expr.evaluate(&|name| name == "withFriends"));
        assert!(!expr.evaluate(&|_| true));
    }

    #[test]
    fn test_value_variables() {
        let mut fields = IndexMap::new();
        fields.insert("first".to_string(), IrValue::Variable("count".to_string()));
        fields.insert("after".to_string(), IrValue::Null);
        let value = IrValue::List(vec![IrValue::Object(fields), IrValue::Variable("id".into())]);

        let mut out = Vec::new();
        value.variables(&mut out);
        assert_eq!(out, vec!["count", "id"]);
    }
}

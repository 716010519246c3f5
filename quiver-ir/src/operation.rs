use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{IrModelGroup, IrType, IrValue, ResponseField};

/// The three GraphQL operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
            OperationType::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable declared by an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IrType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<IrValue>,
}

/// A compiled executable operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperation {
    pub name: String,
    pub operation_type: OperationType,
    /// Schema root type the selection applies to.
    pub root_type: String,
    pub variables: Vec<IrVariable>,
    /// Canonical text sent to the server: the operation followed by every
    /// fragment it uses, sorted by name.
    pub source: String,
    /// Names of the fragments used, transitively, sorted.
    pub fragments: Vec<String>,
    /// Operation id, set once the ids are computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Root selection descriptors, filled after flattening.
    #[serde(default)]
    pub selections: Vec<ResponseField>,
    /// Model groups, the `Data` root first followed by any hoisted groups.
    pub data_model_groups: Vec<IrModelGroup>,
}

/// A compiled named fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrFragment {
    pub name: String,
    pub type_condition: String,
    /// Variables the fragment body references.
    pub variables: Vec<String>,
    pub source: String,
    #[serde(default)]
    pub selections: Vec<ResponseField>,
    pub data_model_groups: Vec<IrModelGroup>,
}

impl IrOperation {
    /// The `Data` root group.
    pub fn data_group(&self) -> Option<&IrModelGroup> {
        self.data_model_groups.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_serialization() {
        assert_eq!(
            serde_json::to_string(&OperationType::Subscription).unwrap(),
            r#""subscription""#
        );
        let parsed: OperationType = serde_json::from_str(r#""mutation""#).unwrap();
        assert_eq!(parsed, OperationType::Mutation);
    }

    #[test]
    fn test_operation_type_display() {
        assert_eq!(OperationType::Query.to_string(), "query");
    }
}

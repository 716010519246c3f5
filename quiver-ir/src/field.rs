//! Selection descriptors consumed at decode time.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{BooleanExpression, IrError, IrType, IrValue};

/// One selected field as the response runtime sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseField {
    pub response_name: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub ty: IrType,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, IrValue>,
    #[serde(default, skip_serializing_if = "BooleanExpression::is_true")]
    pub condition: BooleanExpression,
    /// Nested selections per branch. Empty for leaf fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_sets: Vec<FieldSet>,
}

/// The nested selection of one branch of a composite field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSet {
    /// Type conditions selecting this branch; `None` for the default branch.
    pub type_conditions: Option<Vec<String>>,
    /// Concrete typenames routed to this branch.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub possible_types: BTreeSet<String>,
    /// Id of the model the branch decodes into.
    pub model_id: String,
    pub fields: Vec<ResponseField>,
}

impl ResponseField {
    pub fn is_composite(&self) -> bool {
        !self.field_sets.is_empty()
    }

    /// Whether decoding this field dispatches on `__typename`.
    pub fn is_polymorphic(&self) -> bool {
        self.field_sets.len() > 1
    }

    /// Check that at most one field set is the default branch and that it is last,
    /// recursively.
    pub fn check_field_sets(&self) -> Result<(), IrError> {
        let defaults = self
            .field_sets
            .iter()
            .filter(|set| set.type_conditions.is_none())
            .count();
        let last_is_default = self
            .field_sets
            .last()
            .is_none_or(|set| set.type_conditions.is_none());
        if defaults > 1 || (defaults == 1 && !last_is_default) {
            return Err(IrError::MisplacedDefaultFieldSet {
                field: self.response_name.clone(),
            });
        }
        for set in &self.field_sets {
            for field in &set.fields {
                field.check_field_sets()?;
            }
        }
        Ok(())
    }
}

impl FieldSet {
    pub fn is_default(&self) -> bool {
        self.type_conditions.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> ResponseField {
        ResponseField {
            response_name: name.to_string(),
            field_name: name.to_string(),
            ty: IrType::scalar("String"),
            arguments: IndexMap::new(),
            condition: BooleanExpression::True,
            field_sets: Vec::new(),
        }
    }

    fn set(conditions: Option<&[&str]>, model_id: &str) -> FieldSet {
        FieldSet {
            type_conditions: conditions.map(|c| c.iter().map(|s| s.to_string()).collect()),
            possible_types: BTreeSet::new(),
            model_id: model_id.to_string(),
            fields: vec![leaf("name")],
        }
    }

    #[test]
    fn test_default_last_is_valid() {
        let mut hero = leaf("hero");
        hero.ty = IrType::model("Q.Data.Hero");
        hero.field_sets = vec![
            set(Some(&["Human"]), "Q.Data.Hero.HumanHero"),
            set(None, "Q.Data.Hero.OtherHero"),
        ];

        assert!(hero.is_polymorphic());
        assert!(hero.check_field_sets().is_ok());
    }

    #[test]
    fn test_default_first_is_rejected() {
        let mut hero = leaf("hero");
        hero.field_sets = vec![
            set(None, "Q.Data.Hero.OtherHero"),
            set(Some(&["Human"]), "Q.Data.Hero.HumanHero"),
        ];

        let err = hero.check_field_sets().unwrap_err();
        assert!(matches!(err, IrError::MisplacedDefaultFieldSet { field } if field == "hero"));
    }

    #[test]
    fn test_leaf_field_serialization_is_compact() {
        let json = serde_json::to_string(&leaf("name")).unwrap();
        assert_eq!(
            json,
            r#"{"responseName":"name","fieldName":"name","type":{"kind":"scalar","name":"String"}}"#
        );
    }
}

//! Selection descriptors emitted from the flattened models.

use std::collections::HashMap;

use eyre::{Result, eyre};
use quiver_ir::{FieldSet, IrModel, IrModelGroup, ResponseField};

/// Every model group reachable from `roots`, keyed by base id.
pub(crate) fn group_index(roots: &[IrModelGroup]) -> HashMap<&str, &IrModelGroup> {
    let mut index = HashMap::new();
    for root in roots {
        root.index(&mut index);
    }
    index
}

/// The fields of `model` as the response runtime walks them.
///
/// Composite properties carry one field set per branch of their group,
/// default branch last.
pub(crate) fn response_fields(
    model: &IrModel,
    index: &HashMap<&str, &IrModelGroup>,
) -> Result<Vec<ResponseField>> {
    model
        .properties
        .iter()
        .map(|property| {
            let field_sets = match property.ty.model_id() {
                Some(id) => {
                    let group = index
                        .get(id)
                        .ok_or_else(|| eyre!("model '{}' references unknown model '{}'", model.id, id))?;
                    field_sets(group, index)?
                }
                None => Vec::new(),
            };
            Ok(ResponseField {
                response_name: property.response_name.clone(),
                field_name: property.field_name.clone(),
                ty: property.ty.clone(),
                arguments: property.arguments.clone(),
                condition: property.condition.clone(),
                field_sets,
            })
        })
        .collect()
}

fn field_sets(group: &IrModelGroup, index: &HashMap<&str, &IrModelGroup>) -> Result<Vec<FieldSet>> {
    // A branch's conditions are its type set minus the selection's own type,
    // which is all the fallback holds.
    let fallback = group.fallback();
    group
        .models
        .iter()
        .map(|model| {
            let type_conditions = fallback.filter(|_| !model.is_fallback).map(|fallback| {
                model
                    .type_set
                    .difference(&fallback.type_set)
                    .cloned()
                    .collect()
            });
            Ok(FieldSet {
                type_conditions,
                possible_types: model.possible_types.clone(),
                model_id: model.id.clone(),
                fields: response_fields(model, index)?,
            })
        })
        .collect()
}

/// Root selections of an operation or fragment: the fields of the first
/// group's fallback model, or of its only model.
pub(crate) fn root_selections(roots: &[IrModelGroup]) -> Result<Vec<ResponseField>> {
    let Some(root) = roots.first() else {
        return Ok(Vec::new());
    };
    let model = root
        .fallback()
        .or_else(|| root.models.first())
        .ok_or_else(|| eyre!("model group '{}' has no models", root.base_model_id))?;
    let index = group_index(roots);
    let fields = response_fields(model, &index)?;
    for field in &fields {
        field.check_field_sets()?;
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use quiver_ir::IrType;

    use super::*;
    use crate::testing::lower;

    #[test]
    fn test_leaf_and_nested_fields() {
        let ir = lower("query HeroName { hero { name } }");
        let selections = root_selections(&ir.operations[0].data_model_groups).unwrap();

        assert_eq!(selections.len(), 1);
        let hero = &selections[0];
        assert_eq!(hero.response_name, "hero");
        assert_eq!(hero.ty, IrType::model("HeroName.Data.Hero"));
        assert_eq!(hero.field_sets.len(), 1);
        assert!(hero.field_sets[0].type_conditions.is_none());
        assert_eq!(hero.field_sets[0].model_id, "HeroName.Data.Hero");
        assert_eq!(hero.field_sets[0].fields[0].response_name, "name");
        assert!(!hero.field_sets[0].fields[0].is_composite());
    }

    #[test]
    fn test_polymorphic_branches_default_last() {
        let ir = lower(
            "query Q { hero { name ... on Human { homePlanet } ... on Droid { primaryFunction } } }",
        );
        let selections = root_selections(&ir.operations[0].data_model_groups).unwrap();
        let hero = &selections[0];

        let conditions: Vec<_> = hero
            .field_sets
            .iter()
            .map(|set| set.type_conditions.clone())
            .collect();
        assert_eq!(
            conditions,
            [
                Some(vec!["Human".to_string()]),
                Some(vec!["Droid".to_string()]),
                None,
            ]
        );
        let droid = &hero.field_sets[1];
        let names: Vec<_> = droid.fields.iter().map(|f| f.response_name.as_str()).collect();
        assert_eq!(names, ["name", "primaryFunction"]);
        assert!(hero.check_field_sets().is_ok());
    }
}

//! Lowering validated documents to the IR.
//!
//! Every selected composite field becomes a model group. A selection whose
//! type conditions split the possible concrete types becomes a polymorphic
//! group: one branch model per distinct combination of satisfied conditions,
//! plus a fallback model for the concrete types no condition narrows to.
//! Fields selected several times under the same response name are merged,
//! with their `@skip`/`@include` conditions combined.

mod collect;
mod convert;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use eyre::{Result, bail, eyre};
use indexmap::IndexMap;
use quiver_core::{decapitalize, to_pascal_case};
use quiver_ir::{
    AccessorKind, BooleanExpression, IrAccessor, IrDocument, IrFragment, IrModel, IrModelGroup,
    IrOperation, IrProperty, IrVariable, OperationType,
};
use quiver_schema::Schema;
use quiver_syntax::{
    Printer,
    ast::{
        Definition, Document, Field, FieldDefinition, FragmentDefinition, OperationDefinition,
        OperationKind, SelectionSet,
    },
};

use crate::{DocumentSet, typename::is_synthetic};

pub(crate) use collect::{Reached, collect, directive_condition, referenced_variables, used_fragments};
pub(crate) use convert::{ir_type, ir_value};

use collect::Collected;
use convert::ir_arguments;

/// How a type condition relates to the possible types of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    /// Every possible type satisfies it.
    Universal,
    /// Some possible types satisfy it.
    Narrowing,
    /// No possible type satisfies it.
    Impossible,
}

/// All selections of one response name inside a model.
#[derive(Debug)]
pub(crate) struct MergedField<'a> {
    pub first: &'a Field,
    pub definition: &'a FieldDefinition,
    /// OR of the conditions of every selection.
    pub condition: BooleanExpression,
    pub selection_sets: Vec<&'a SelectionSet>,
    pub is_synthetic: bool,
}

struct ModelSpec<'a> {
    id: String,
    name: String,
    type_set: BTreeSet<String>,
    possible_types: BTreeSet<&'a str>,
    is_interface: bool,
    is_fallback: bool,
}

/// Builds the IR of the operations and fragments of a document set.
pub struct IrBuilder<'a> {
    schema: &'a Schema,
    documents: &'a DocumentSet,
}

impl<'a> IrBuilder<'a> {
    pub fn new(schema: &'a Schema, documents: &'a DocumentSet) -> Self {
        Self { schema, documents }
    }

    /// Operations in document order, fragments sorted by name.
    pub fn build(&self) -> Result<IrDocument> {
        let operations = self
            .documents
            .operations()
            .map(|(_, op)| self.operation(op))
            .collect::<Result<Vec<_>>>()?;
        let mut fragments = self
            .documents
            .fragments()
            .map(|(_, fragment)| self.fragment(fragment))
            .collect::<Result<Vec<_>>>()?;
        fragments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(IrDocument::new(operations, fragments))
    }

    pub fn operation(&self, op: &'a OperationDefinition) -> Result<IrOperation> {
        let Some(name) = &op.name else {
            bail!("anonymous operations cannot be compiled");
        };
        let Some(root_type) = self.schema.root_type(op.kind) else {
            bail!("schema does not define a {} root type", op.kind);
        };
        let _span = tracing::debug_span!("build_operation", operation = %name).entered();

        let fragments = used_fragments(self.documents, &op.selection_set);
        let source = self.source(Definition::Operation(op.clone()), &fragments);

        let base_id = format!("{}.Data", name);
        let data = self.group(&base_id, "Data", root_type, &[&op.selection_set])?;

        let variables = op
            .variables
            .iter()
            .map(|variable| IrVariable {
                name: variable.name.clone(),
                ty: ir_type(self.schema, &variable.ty, None),
                default_value: variable.default_value.as_ref().map(ir_value),
            })
            .collect();

        Ok(IrOperation {
            name: name.clone(),
            operation_type: operation_type(op.kind),
            root_type: root_type.to_string(),
            variables,
            source,
            fragments: fragments.into_iter().map(String::from).collect(),
            id: None,
            selections: Vec::new(),
            data_model_groups: vec![data],
        })
    }

    pub fn fragment(&self, fragment: &'a FragmentDefinition) -> Result<IrFragment> {
        if self.schema.get_type(&fragment.type_condition).is_none() {
            bail!(
                "fragment '{}' has unknown type condition '{}'",
                fragment.name,
                fragment.type_condition
            );
        }
        let _span = tracing::debug_span!("build_fragment", fragment = %fragment.name).entered();

        let mut used = used_fragments(self.documents, &fragment.selection_set);
        used.remove(fragment.name.as_str());
        let source = self.source(Definition::Fragment(fragment.clone()), &used);

        let root = self.group(
            &fragment.name,
            &fragment.name,
            &fragment.type_condition,
            &[&fragment.selection_set],
        )?;

        Ok(IrFragment {
            name: fragment.name.clone(),
            type_condition: fragment.type_condition.clone(),
            variables: referenced_variables(self.documents, &fragment.selection_set)
                .into_iter()
                .map(String::from)
                .collect(),
            source,
            selections: Vec::new(),
            data_model_groups: vec![root],
        })
    }

    fn source(&self, head: Definition, fragments: &BTreeSet<&str>) -> String {
        let mut definitions = vec![head];
        definitions.extend(
            fragments
                .iter()
                .filter_map(|name| self.documents.fragment(name))
                .map(|fragment| Definition::Fragment(fragment.clone())),
        );
        Printer::default().print(&Document { definitions })
    }

    /// Build the model group for `sets`, all selected on `ty`.
    fn group(
        &self,
        base_id: &str,
        base_name: &str,
        ty: &'a str,
        sets: &[&'a SelectionSet],
    ) -> Result<IrModelGroup> {
        let collected = collect(self.documents, ty, sets);
        let possible = self.schema.possible_types(ty);

        let coverage: HashMap<&str, Coverage> = collected
            .conditions()
            .into_iter()
            .map(|condition| {
                let satisfied = possible
                    .iter()
                    .filter(|concrete| self.schema.satisfies(concrete, condition))
                    .count();
                let coverage = if satisfied == possible.len() {
                    Coverage::Universal
                } else if satisfied == 0 {
                    Coverage::Impossible
                } else {
                    Coverage::Narrowing
                };
                (condition, coverage)
            })
            .collect();
        let narrowing: Vec<&str> = collected
            .conditions()
            .into_iter()
            .filter(|condition| coverage.get(condition) == Some(&Coverage::Narrowing))
            .collect();

        if narrowing.is_empty() {
            let spec = ModelSpec {
                id: base_id.to_string(),
                name: base_name.to_string(),
                type_set: BTreeSet::from([ty.to_string()]),
                possible_types: possible.clone(),
                is_interface: self.schema.is_abstract(ty),
                is_fallback: false,
            };
            let model = self.model(spec, &collected, &coverage, &[])?;
            return Ok(IrModelGroup {
                base_model_id: base_id.to_string(),
                models: vec![model],
            });
        }

        // Concrete types grouped by the narrowing conditions they satisfy.
        let mut shapes: BTreeMap<Vec<usize>, BTreeSet<&str>> = BTreeMap::new();
        let mut unmatched = BTreeSet::new();
        for concrete in &possible {
            let shape: Vec<usize> = narrowing
                .iter()
                .enumerate()
                .filter(|(_, condition)| self.schema.satisfies(concrete, condition))
                .map(|(i, _)| i)
                .collect();
            if shape.is_empty() {
                unmatched.insert(*concrete);
            } else {
                shapes.entry(shape).or_default().insert(*concrete);
            }
        }

        let mut models = Vec::with_capacity(shapes.len() + 1);
        for (shape, possible_types) in shapes {
            let satisfied: Vec<&str> = shape.iter().map(|&i| narrowing[i]).collect();
            let name = format!("{}{}", satisfied.concat(), base_name);
            let mut type_set: BTreeSet<String> = satisfied.iter().map(|s| s.to_string()).collect();
            type_set.insert(ty.to_string());
            let spec = ModelSpec {
                id: format!("{}.{}", base_id, name),
                name,
                type_set,
                is_interface: possible_types.len() > 1,
                possible_types,
                is_fallback: false,
            };
            models.push(self.model(spec, &collected, &coverage, &satisfied)?);
        }

        let name = format!("Other{}", base_name);
        let spec = ModelSpec {
            id: format!("{}.{}", base_id, name),
            name,
            type_set: BTreeSet::from([ty.to_string()]),
            possible_types: unmatched,
            is_interface: true,
            is_fallback: true,
        };
        models.push(self.model(spec, &collected, &coverage, &[])?);

        Ok(IrModelGroup {
            base_model_id: base_id.to_string(),
            models,
        })
    }

    fn model(
        &self,
        spec: ModelSpec<'_>,
        collected: &Collected<'a>,
        coverage: &HashMap<&str, Coverage>,
        satisfied: &[&str],
    ) -> Result<IrModel> {
        let applies = |conditions: &[&str]| {
            conditions
                .iter()
                .all(|condition| match coverage.get(condition) {
                    Some(Coverage::Universal) => true,
                    Some(Coverage::Narrowing) => satisfied.contains(condition),
                    _ => false,
                })
        };

        let mut model = IrModel {
            model_name: spec.name,
            id: spec.id,
            type_set: spec.type_set,
            possible_types: spec.possible_types.iter().map(|s| s.to_string()).collect(),
            is_interface: spec.is_interface,
            is_fallback: spec.is_fallback,
            implements: Vec::new(),
            properties: Vec::new(),
            accessors: Vec::new(),
            model_groups: Vec::new(),
        };

        let mut by_name: IndexMap<&str, Vec<&Reached<'a>>> = IndexMap::new();
        for reached in collected.fields.iter().filter(|r| applies(&r.conditions)) {
            by_name
                .entry(reached.field.response_name())
                .or_default()
                .push(reached);
        }
        for selections in by_name.values() {
            let merged = self.merge(selections)?;
            if merged.condition == BooleanExpression::False {
                continue;
            }
            self.add_property(&mut model, merged)?;
        }

        for spread in collected.spreads.iter().filter(|s| applies(&s.conditions)) {
            let name = &spread.fragment.name;
            if model.implements.contains(name) {
                continue;
            }
            model.implements.push(name.clone());
            model.accessors.push(IrAccessor {
                name: decapitalize(name),
                kind: AccessorKind::Fragment { name: name.clone() },
                return_model_id: name.clone(),
            });
        }

        Ok(model)
    }

    fn merge(&self, selections: &[&Reached<'a>]) -> Result<MergedField<'a>> {
        let Some(first) = selections.first() else {
            bail!("no selections to merge");
        };
        let definition = self
            .schema
            .field(first.parent_type, &first.field.name)
            .ok_or_else(|| {
                eyre!(
                    "field '{}' is not defined on type '{}'",
                    first.field.name,
                    first.parent_type
                )
            })?;
        let condition = selections
            .iter()
            .fold(BooleanExpression::False, |acc, r| acc.or(r.condition.clone()));

        Ok(MergedField {
            first: first.field,
            definition,
            condition,
            selection_sets: selections
                .iter()
                .filter_map(|r| r.field.selection_set.as_ref())
                .collect(),
            is_synthetic: selections.iter().all(|r| is_synthetic(r.field)),
        })
    }

    fn add_property(&self, model: &mut IrModel, merged: MergedField<'a>) -> Result<()> {
        let response_name = merged.first.response_name();
        let named = merged.definition.ty.name();

        let (ty, group) = if self.schema.is_composite(named) {
            let child_name = to_pascal_case(response_name);
            let child_id = format!("{}.{}", model.id, child_name);
            let group = self.group(&child_id, &child_name, named, &merged.selection_sets)?;
            (
                ir_type(self.schema, &merged.definition.ty, Some(&child_id)),
                Some(group),
            )
        } else {
            (ir_type(self.schema, &merged.definition.ty, None), None)
        };

        model.properties.push(IrProperty {
            response_name: response_name.to_string(),
            field_name: merged.first.name.clone(),
            ty,
            arguments: ir_arguments(&merged.first.arguments),
            condition: merged.condition,
            description: merged.definition.description.clone(),
            deprecation_reason: merged.definition.deprecation_reason(),
            is_synthetic: merged.is_synthetic,
        });

        if let Some(group) = group {
            if group.is_polymorphic() {
                for branch in group.models.iter().filter(|m| !m.is_fallback) {
                    model.accessors.push(IrAccessor {
                        name: format!("as{}", branch.model_name),
                        kind: AccessorKind::Type {
                            type_set: branch.type_set.clone(),
                        },
                        return_model_id: branch.id.clone(),
                    });
                }
            }
            model.model_groups.push(group);
        }
        Ok(())
    }
}

pub(crate) fn operation_type(kind: OperationKind) -> OperationType {
    match kind {
        OperationKind::Query => OperationType::Query,
        OperationKind::Mutation => OperationType::Mutation,
        OperationKind::Subscription => OperationType::Subscription,
    }
}

#[cfg(test)]
mod tests {
    use quiver_ir::{IrType, IrValue};

    use super::*;
    use crate::testing::{documents, star_wars_schema};

    fn build(src: &str) -> IrDocument {
        let schema = star_wars_schema();
        let docs = documents(src);
        IrBuilder::new(&schema, &docs).build().unwrap()
    }

    fn model_names(group: &IrModelGroup) -> Vec<&str> {
        group.models.iter().map(|m| m.model_name.as_str()).collect()
    }

    fn property_names(model: &IrModel) -> Vec<&str> {
        model
            .properties
            .iter()
            .map(|p| p.response_name.as_str())
            .collect()
    }

    #[test]
    fn test_simple_query() {
        let ir = build("query HeroName($episode: Episode = JEDI) { hero(episode: $episode) { name } }");
        let op = ir.operation("HeroName").unwrap();
        assert_eq!(op.operation_type, OperationType::Query);
        assert_eq!(op.root_type, "Query");
        assert_eq!(
            op.source,
            "query HeroName($episode: Episode = JEDI) {\n  hero(episode: $episode) {\n    name\n  }\n}\n"
        );
        assert_eq!(op.variables[0].ty, IrType::Enum { name: "Episode".into() });
        assert_eq!(op.variables[0].default_value, Some(IrValue::Enum("JEDI".into())));

        let data = op.data_group().unwrap();
        assert_eq!(data.base_model_id, "HeroName.Data");
        let hero = data.models[0].property("hero").unwrap();
        assert_eq!(hero.ty, IrType::model("HeroName.Data.Hero"));
        assert_eq!(
            hero.arguments["episode"],
            IrValue::Variable("episode".into())
        );

        let group = data.models[0].group_for(hero).unwrap();
        assert!(!group.is_polymorphic());
        let model = &group.models[0];
        assert_eq!(model.id, "HeroName.Data.Hero");
        assert!(model.is_interface);
        assert_eq!(
            model.possible_types,
            BTreeSet::from(["Droid".to_string(), "Human".to_string()])
        );
        assert_eq!(
            model.property("name").unwrap().ty,
            IrType::scalar("String").non_null()
        );
    }

    #[test]
    fn test_polymorphic_branches() {
        let ir = build(
            "query Q { hero { name ... on Human { homePlanet } ... on Droid { primaryFunction } } }",
        );
        let data = ir.operation("Q").unwrap().data_group().unwrap();
        let group = &data.models[0].model_groups[0];
        assert!(group.is_polymorphic());
        assert_eq!(model_names(group), vec!["HumanHero", "DroidHero", "OtherHero"]);

        let human = &group.models[0];
        assert_eq!(human.id, "Q.Data.Hero.HumanHero");
        assert_eq!(property_names(human), vec!["name", "homePlanet"]);
        assert!(!human.is_interface);
        assert_eq!(
            human.type_set,
            BTreeSet::from(["Character".to_string(), "Human".to_string()])
        );

        let other = group.fallback().unwrap();
        assert!(other.is_interface);
        assert!(other.possible_types.is_empty());
        assert_eq!(property_names(other), vec!["name"]);

        let accessors: Vec<_> = data.models[0]
            .accessors
            .iter()
            .map(|a| (a.name.as_str(), a.return_model_id.as_str()))
            .collect();
        assert_eq!(
            accessors,
            vec![
                ("asHumanHero", "Q.Data.Hero.HumanHero"),
                ("asDroidHero", "Q.Data.Hero.DroidHero"),
            ]
        );
    }

    #[test]
    fn test_union_branches() {
        let ir = build(
            "query S { search(text: \"a\") { ... on Human { name } ... on Starship { name length } } }",
        );
        let data = ir.operation("S").unwrap().data_group().unwrap();
        let group = &data.models[0].model_groups[0];
        assert_eq!(
            model_names(group),
            vec!["HumanSearch", "StarshipSearch", "OtherSearch"]
        );
        assert_eq!(
            group.fallback().unwrap().possible_types,
            BTreeSet::from(["Droid".to_string()])
        );
        assert!(group.fallback().unwrap().properties.is_empty());
        assert_eq!(
            data.models[0].property("search").unwrap().ty.to_string(),
            "[<S.Data.Search>!]!"
        );
    }

    #[test]
    fn test_universal_condition_is_not_polymorphic() {
        let ir = build("query Q { hero { ... on Character { name } } }");
        let group = &ir.operation("Q").unwrap().data_group().unwrap().models[0].model_groups[0];
        assert_eq!(model_names(group), vec!["Hero"]);
        assert_eq!(property_names(&group.models[0]), vec!["name"]);
    }

    #[test]
    fn test_impossible_condition_is_dropped() {
        let ir = build("query Q { human(id: 1) { name ... on Droid { primaryFunction } } }");
        let group = &ir.operation("Q").unwrap().data_group().unwrap().models[0].model_groups[0];
        assert_eq!(model_names(group), vec!["Human"]);
        assert_eq!(property_names(&group.models[0]), vec!["name"]);
        assert!(!group.models[0].is_interface);
    }

    #[test]
    fn test_merged_conditions() {
        let ir = build(
            "query Q($a: Boolean!, $b: Boolean!) { hero { name @include(if: $a) name @skip(if: $b) id @skip(if: true) } }",
        );
        let hero = &ir.operation("Q").unwrap().data_group().unwrap().models[0].model_groups[0].models[0];
        assert_eq!(property_names(hero), vec!["name"]);
        assert_eq!(
            hero.properties[0].condition,
            BooleanExpression::Or(vec![
                BooleanExpression::variable("a"),
                BooleanExpression::variable("b").negate(),
            ])
        );
    }

    #[test]
    fn test_merged_sub_selections() {
        let ir = build("query Q { hero { friends { name } } hero { friends { id } } }");
        let data = &ir.operation("Q").unwrap().data_group().unwrap().models[0];
        assert_eq!(property_names(data), vec!["hero"]);
        let friends = &data.model_groups[0].models[0].model_groups[0].models[0];
        assert_eq!(friends.id, "Q.Data.Hero.Friends");
        assert_eq!(property_names(friends), vec!["name", "id"]);
    }

    #[test]
    fn test_fragment_spreads() {
        let ir = build(
            "query Q { hero { ...HeroDetails } }\n\
             fragment HeroDetails on Character { name ... on Human { homePlanet } }",
        );
        let op = ir.operation("Q").unwrap();
        assert_eq!(op.fragments, vec!["HeroDetails"]);
        assert!(op.source.ends_with(
            "fragment HeroDetails on Character {\n  name\n  ... on Human {\n    homePlanet\n  }\n}\n"
        ));

        let group = &op.data_group().unwrap().models[0].model_groups[0];
        assert_eq!(model_names(group), vec!["HumanHero", "OtherHero"]);
        for model in &group.models {
            assert_eq!(model.implements, vec!["HeroDetails"]);
            assert_eq!(model.accessors[0].name, "heroDetails");
            assert_eq!(model.accessors[0].return_model_id, "HeroDetails");
        }

        let fragment = ir.fragment("HeroDetails").unwrap();
        let root = &fragment.data_model_groups[0];
        assert_eq!(root.base_model_id, "HeroDetails");
        assert_eq!(model_names(root), vec!["HumanHeroDetails", "OtherHeroDetails"]);
    }

    #[test]
    fn test_narrowing_spread_only_on_matching_branch() {
        let ir = build(
            "query Q { hero { name ...HumanDetails } }\n\
             fragment HumanDetails on Human { homePlanet }",
        );
        let group = &ir.operation("Q").unwrap().data_group().unwrap().models[0].model_groups[0];
        assert_eq!(group.models[0].implements, vec!["HumanDetails"]);
        assert!(group.fallback().unwrap().implements.is_empty());
    }

    #[test]
    fn test_fragment_variables() {
        let ir = build(
            "fragment ShipLength on Starship { length(unit: $unit) ...Named @include(if: $named) }\n\
             fragment Named on Starship { name }",
        );
        let fragment = ir.fragment("ShipLength").unwrap();
        assert_eq!(fragment.variables, vec!["named", "unit"]);
        assert_eq!(ir.fragments.len(), 2);
        assert_eq!(ir.fragments[0].name, "Named");
    }

    #[test]
    fn test_deprecated_field_metadata() {
        let ir = build("query Q { droid(id: 1) { nickname } }");
        let droid = &ir.operation("Q").unwrap().data_group().unwrap().models[0].model_groups[0].models[0];
        assert_eq!(
            droid.properties[0].deprecation_reason.as_deref(),
            Some("Use name")
        );
    }

    #[test]
    fn test_anonymous_operation_fails() {
        let schema = star_wars_schema();
        let docs = documents("{ hero { name } }");
        let err = IrBuilder::new(&schema, &docs).build().unwrap_err();
        assert!(err.to_string().contains("anonymous"));
    }
}

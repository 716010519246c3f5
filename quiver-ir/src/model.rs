//! Model blueprints produced by the IR builder.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{BooleanExpression, IrType, IrValue};

/// The sibling models generated for one selected field.
///
/// A non-polymorphic selection yields a single model whose id equals
/// `base_model_id`. A polymorphic selection yields one model per distinct
/// combination of satisfied type conditions followed by a fallback model.
/// Branch `possible_types` never overlap and the fallback is always last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrModelGroup {
    /// Id shared by every reference to this group.
    pub base_model_id: String,
    /// Branch models, fallback last.
    pub models: Vec<IrModel>,
}

/// A generated-type blueprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrModel {
    /// Name of the generated type (e.g. `HumanHero`).
    pub model_name: String,
    /// Stable path from the operation root (e.g. `HeroQuery.Data.Hero.HumanHero`).
    pub id: String,
    /// Type conditions this model satisfies, the parent type included.
    pub type_set: BTreeSet<String>,
    /// Concrete object types decoded into this model.
    pub possible_types: BTreeSet<String>,
    /// The model stands for an abstract type whose concrete type is not pinned.
    pub is_interface: bool,
    /// Catch-all branch for concrete types no type condition handles.
    pub is_fallback: bool,
    /// Names of shared shapes this model implements.
    pub implements: Vec<String>,
    /// Fields, in selection order.
    pub properties: Vec<IrProperty>,
    /// Typed accessors into nested groups and fragment models.
    pub accessors: Vec<IrAccessor>,
    /// Child groups, one per composite property.
    pub model_groups: Vec<IrModelGroup>,
}

/// A field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrProperty {
    pub response_name: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub ty: IrType,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, IrValue>,
    #[serde(default, skip_serializing_if = "BooleanExpression::is_true")]
    pub condition: BooleanExpression,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
    /// Added by the compiler (`__typename`) rather than selected by the user.
    #[serde(default)]
    pub is_synthetic: bool,
}

/// A typed view from one model onto another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrAccessor {
    pub name: String,
    pub kind: AccessorKind,
    pub return_model_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AccessorKind {
    /// Narrow a polymorphic child to the branch for `type_set`.
    Type { type_set: BTreeSet<String> },
    /// View the model through a named fragment it spreads.
    Fragment { name: String },
}

impl IrModelGroup {
    /// Whether decoding needs `__typename` to pick a branch.
    pub fn is_polymorphic(&self) -> bool {
        self.models.iter().any(|m| m.is_fallback)
    }

    pub fn fallback(&self) -> Option<&IrModel> {
        self.models.last().filter(|m| m.is_fallback)
    }

    /// The model a concrete `typename` decodes into.
    pub fn model_for(&self, typename: &str) -> Option<&IrModel> {
        self.models
            .iter()
            .find(|m| !m.is_fallback && m.possible_types.contains(typename))
            .or_else(|| self.fallback())
            .or_else(|| self.models.first())
    }

    /// Depth-first walk over every model in this group and its descendants.
    ///
    /// `depth` is 0 for the models of `self`.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a IrModelGroup, &'a IrModel, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(
        &'a self,
        depth: usize,
        visit: &mut impl FnMut(&'a IrModelGroup, &'a IrModel, usize),
    ) {
        for model in &self.models {
            visit(self, model, depth);
            for child in &model.model_groups {
                child.walk_at(depth + 1, visit);
            }
        }
    }

    /// Every group reachable from here, `self` first, keyed by base model id.
    ///
    /// When two groups share an id (after deduplication), the first one wins.
    pub fn index<'a>(&'a self, out: &mut HashMap<&'a str, &'a IrModelGroup>) {
        out.entry(self.base_model_id.as_str()).or_insert(self);
        for model in &self.models {
            for child in &model.model_groups {
                child.index(out);
            }
        }
    }

    /// Rewrite model ids according to `renames`, in this group and below.
    pub fn rename_ids(&mut self, renames: &HashMap<String, String>) {
        if let Some(new_id) = renames.get(&self.base_model_id) {
            self.base_model_id = new_id.clone();
        }
        for model in &mut self.models {
            model.rename_ids(renames);
        }
    }
}

impl IrModel {
    pub fn property(&self, response_name: &str) -> Option<&IrProperty> {
        self.properties
            .iter()
            .find(|p| p.response_name == response_name)
    }

    /// The child group a composite property points at.
    pub fn group_for(&self, property: &IrProperty) -> Option<&IrModelGroup> {
        let id = property.ty.model_id()?;
        self.model_groups.iter().find(|g| g.base_model_id == id)
    }

    fn rename_ids(&mut self, renames: &HashMap<String, String>) {
        if let Some(new_id) = renames.get(&self.id) {
            self.id = new_id.clone();
        }
        for property in &mut self.properties {
            if let Some(new_id) = property.ty.model_id().and_then(|id| renames.get(id)) {
                let new_id = new_id.clone();
                property.ty.set_model_id(new_id);
            }
        }
        for accessor in &mut self.accessors {
            if let Some(new_id) = renames.get(&accessor.return_model_id) {
                accessor.return_model_id = new_id.clone();
            }
        }
        for group in &mut self.model_groups {
            group.rename_ids(renames);
        }
    }
}

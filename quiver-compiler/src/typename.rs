//! `__typename` insertion.
//!
//! Runs before the IR is built so that the text sent to the server asks for
//! `__typename` first in every selection set whose response the decoder has
//! to dispatch on.

use std::collections::{HashMap, HashSet};

use quiver_manifest::TypenameMode;
use quiver_schema::Schema;
use quiver_syntax::{
    Position,
    ast::{Definition, Field, FragmentDefinition, Selection, SelectionSet},
};

use crate::DocumentSet;

pub(crate) const TYPENAME: &str = "__typename";

/// Whether `field` is a `__typename` the compiler added.
pub(crate) fn is_synthetic(field: &Field) -> bool {
    field.name == TYPENAME && field.pos == Position::default()
}

/// Add `__typename` to the selection sets `mode` asks for.
///
/// The root selection set of an operation is left alone. A plain
/// `__typename` the user already selected is moved to the front rather than
/// duplicated.
pub fn add_typename(documents: &mut DocumentSet, schema: &Schema, mode: TypenameMode) {
    let fragments: HashMap<String, FragmentDefinition> = documents
        .fragments()
        .map(|(_, f)| (f.name.clone(), f.clone()))
        .collect();
    let inserter = Inserter {
        schema,
        mode,
        fragments: &fragments,
    };

    for source in documents.sources_mut() {
        for definition in &mut source.document.definitions {
            match definition {
                Definition::Operation(op) => {
                    if let Some(root) = schema.root_type(op.kind) {
                        let root = root.to_string();
                        inserter.children(&mut op.selection_set, &root);
                    }
                }
                Definition::Fragment(fragment) => {
                    let ty = fragment.type_condition.clone();
                    inserter.selection_set(&mut fragment.selection_set, &ty, false);
                }
                _ => {}
            }
        }
    }
}

struct Inserter<'a> {
    schema: &'a Schema,
    mode: TypenameMode,
    fragments: &'a HashMap<String, FragmentDefinition>,
}

impl Inserter<'_> {
    fn selection_set(&self, set: &mut SelectionSet, ty: &str, force: bool) {
        let insert = force || self.needs_typename(set, ty);
        self.children(set, ty);
        if insert {
            move_typename_first(set);
        }
    }

    /// Process nested selection sets. Every selection of a response name
    /// gets `__typename` when any selection of that name needs it, since the
    /// server merges them into one object.
    fn children(&self, set: &mut SelectionSet, ty: &str) {
        let mut forced = HashSet::new();
        self.collect_forced(set, ty, &mut forced, &mut HashSet::new());
        self.visit_fields(set, ty, &forced);
    }

    fn visit_fields(&self, set: &mut SelectionSet, ty: &str, forced: &HashSet<String>) {
        for selection in &mut set.selections {
            match selection {
                Selection::Field(field) => {
                    let Some(field_type) = self.field_type(ty, &field.name) else {
                        continue;
                    };
                    let force = forced.contains(field.response_name());
                    if let Some(nested) = &mut field.selection_set {
                        self.selection_set(nested, &field_type, force);
                    }
                }
                Selection::InlineFragment(inline) => {
                    let inner = inline.type_condition.clone().unwrap_or_else(|| ty.to_string());
                    self.visit_fields(&mut inline.selection_set, &inner, forced);
                }
                Selection::FragmentSpread(_) => {}
            }
        }
    }

    /// Response names at this level with at least one selection that needs
    /// `__typename`, looking through fragments.
    fn collect_forced<'f>(
        &'f self,
        set: &'f SelectionSet,
        ty: &str,
        out: &mut HashSet<String>,
        visited: &mut HashSet<&'f str>,
    ) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    if let (Some(nested), Some(field_type)) =
                        (&field.selection_set, self.field_type(ty, &field.name))
                        && self.needs_typename(nested, &field_type)
                    {
                        out.insert(field.response_name().to_string());
                    }
                }
                Selection::InlineFragment(inline) => {
                    let inner = inline.type_condition.as_deref().unwrap_or(ty);
                    self.collect_forced(&inline.selection_set, inner, out, visited);
                }
                Selection::FragmentSpread(spread) => {
                    if let Some(fragment) = self.fragments.get(&spread.name)
                        && visited.insert(&fragment.name)
                    {
                        self.collect_forced(
                            &fragment.selection_set,
                            &fragment.type_condition,
                            out,
                            visited,
                        );
                    }
                }
            }
        }
    }

    fn needs_typename(&self, set: &SelectionSet, ty: &str) -> bool {
        match self.mode {
            TypenameMode::Always => true,
            TypenameMode::IfFragments => set.selections.iter().any(|s| {
                matches!(
                    s,
                    Selection::InlineFragment(_) | Selection::FragmentSpread(_)
                )
            }),
            TypenameMode::IfAbstract => self.schema.is_abstract(ty),
            TypenameMode::IfPolymorphic => {
                self.schema.is_abstract(ty) && self.has_narrowing(set, ty, &mut HashSet::new())
            }
        }
    }

    /// Whether a fragment under `set` applies to only some of the possible
    /// types of `ty`.
    fn has_narrowing<'f>(
        &'f self,
        set: &'f SelectionSet,
        ty: &str,
        visited: &mut HashSet<&'f str>,
    ) -> bool {
        set.selections.iter().any(|selection| match selection {
            Selection::Field(_) => false,
            Selection::InlineFragment(inline) => {
                inline
                    .type_condition
                    .as_deref()
                    .is_some_and(|c| !self.schema.is_subtype(ty, c))
                    || self.has_narrowing(&inline.selection_set, ty, visited)
            }
            Selection::FragmentSpread(spread) => match self.fragments.get(&spread.name) {
                Some(fragment) if visited.insert(&fragment.name) => {
                    !self.schema.is_subtype(ty, &fragment.type_condition)
                        || self.has_narrowing(&fragment.selection_set, ty, visited)
                }
                _ => false,
            },
        })
    }

    fn field_type(&self, ty: &str, field: &str) -> Option<String> {
        self.schema
            .field(ty, field)
            .map(|def| def.ty.name().to_string())
            .filter(|name| self.schema.is_composite(name))
    }
}

fn is_plain_typename(selection: &Selection) -> bool {
    matches!(
        selection,
        Selection::Field(field)
            if field.name == TYPENAME && field.alias.is_none() && field.directives.is_empty()
    )
}

fn move_typename_first(set: &mut SelectionSet) {
    match set.selections.iter().position(is_plain_typename) {
        Some(0) => {}
        Some(index) => {
            let existing = set.selections.remove(index);
            set.selections.insert(0, existing);
        }
        None => set
            .selections
            .insert(0, Selection::Field(Field::new(TYPENAME))),
    }
}

#[cfg(test)]
mod tests {
    use quiver_syntax::Printer;

    use super::*;
    use crate::testing::star_wars_schema;

    fn transform(src: &str, mode: TypenameMode) -> String {
        let mut documents = DocumentSet::new();
        documents.add_source("test.graphql", src).unwrap();
        add_typename(&mut documents, &star_wars_schema(), mode);
        Printer::default().print(&documents.sources()[0].document)
    }

    #[test]
    fn test_if_polymorphic_only_where_branching() {
        let out = transform(
            "query Q { hero { name ... on Human { homePlanet } } human(id: 1) { name } }",
            TypenameMode::IfPolymorphic,
        );
        insta::assert_snapshot!(out, @r"
        query Q {
          hero {
            __typename
            name
            ... on Human {
              homePlanet
            }
          }
          human(id: 1) {
            name
          }
        }
        ");
    }

    #[test]
    fn test_if_polymorphic_ignores_universal_conditions() {
        let out = transform(
            "query Q { hero { ... on Character { name } } }",
            TypenameMode::IfPolymorphic,
        );
        assert_eq!(out, "query Q {\n  hero {\n    ... on Character {\n      name\n    }\n  }\n}\n");
    }

    #[test]
    fn test_narrowing_through_fragment_spread() {
        let out = transform(
            "query Q { hero { ...HumanDetails } }\nfragment HumanDetails on Human { homePlanet }",
            TypenameMode::IfPolymorphic,
        );
        assert!(out.starts_with("query Q {\n  hero {\n    __typename\n    ...HumanDetails\n"));
    }

    #[test]
    fn test_merged_selections_are_all_tagged() {
        let out = transform(
            "query Q { hero { name } hero { ... on Droid { primaryFunction } } }",
            TypenameMode::IfPolymorphic,
        );
        assert_eq!(out.matches("__typename").count(), 2);
    }

    #[test]
    fn test_always_skips_operation_root() {
        let out = transform("query Q { hero { name } }", TypenameMode::Always);
        assert_eq!(out, "query Q {\n  hero {\n    __typename\n    name\n  }\n}\n");
    }

    #[test]
    fn test_if_abstract() {
        let out = transform(
            "query Q { hero { name friends { name } } starship(id: 1) { name } }",
            TypenameMode::IfAbstract,
        );
        assert_eq!(out.matches("__typename").count(), 2);
        assert!(out.contains("starship(id: 1) {\n    name\n  }"));
    }

    #[test]
    fn test_if_fragments() {
        let out = transform(
            "query Q { hero { name } starship(id: 1) { ... on Starship { name } } }",
            TypenameMode::IfFragments,
        );
        assert_eq!(out.matches("__typename").count(), 1);
        assert!(out.contains("starship(id: 1) {\n    __typename\n"));
    }

    #[test]
    fn test_existing_typename_moves_first() {
        let out = transform(
            "query Q { hero { name __typename ... on Droid { primaryFunction } } }",
            TypenameMode::IfPolymorphic,
        );
        assert!(out.contains("hero {\n    __typename\n    name\n"));
        assert_eq!(out.matches("__typename").count(), 1);

        let mut documents = DocumentSet::new();
        documents
            .add_source("t.graphql", "query Q { hero { name __typename ... on Droid { primaryFunction } } }")
            .unwrap();
        add_typename(&mut documents, &star_wars_schema(), TypenameMode::IfPolymorphic);
        let (_, op) = documents.operations().next().unwrap();
        let Selection::Field(hero) = &op.selection_set.selections[0] else {
            panic!("expected field");
        };
        let Selection::Field(first) = &hero.selection_set.as_ref().unwrap().selections[0] else {
            panic!("expected field");
        };
        assert!(!is_synthetic(first));
    }

    #[test]
    fn test_fragment_root() {
        let out = transform(
            "fragment F on Character { name ... on Human { homePlanet } }",
            TypenameMode::IfPolymorphic,
        );
        assert!(out.starts_with("fragment F on Character {\n  __typename\n"));
    }
}

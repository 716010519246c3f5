//! Walking selection sets through fragments.

use std::collections::{BTreeSet, HashSet};

use quiver_ir::BooleanExpression;
use quiver_syntax::ast::{Directive, Field, FragmentDefinition, Selection, SelectionSet, Value};

use crate::DocumentSet;

/// A field selection reached from a selection set.
#[derive(Debug, Clone)]
pub(crate) struct Reached<'a> {
    pub field: &'a Field,
    /// Type the field is selected on: the innermost fragment type condition,
    /// or the type of the selection set.
    pub parent_type: &'a str,
    /// Type conditions of the enclosing fragments, outermost first.
    pub conditions: Vec<&'a str>,
    /// `@skip`/`@include` of the field and every enclosing fragment.
    pub condition: BooleanExpression,
}

/// A named fragment spread reached from a selection set.
#[derive(Debug, Clone)]
pub(crate) struct ReachedSpread<'a> {
    pub fragment: &'a FragmentDefinition,
    /// Enclosing type conditions followed by the fragment's own.
    pub conditions: Vec<&'a str>,
}

#[derive(Debug, Default)]
pub(crate) struct Collected<'a> {
    pub fields: Vec<Reached<'a>>,
    pub spreads: Vec<ReachedSpread<'a>>,
}

impl<'a> Collected<'a> {
    /// Every type condition in order of first appearance.
    pub fn conditions(&self) -> Vec<&'a str> {
        let mut out: Vec<&'a str> = Vec::new();
        let chains = self
            .fields
            .iter()
            .map(|f| &f.conditions)
            .chain(self.spreads.iter().map(|s| &s.conditions));
        for chain in chains {
            for condition in chain {
                if !out.contains(condition) {
                    out.push(condition);
                }
            }
        }
        out
    }
}

/// Collect the fields of `sets`, all selected on `parent_type`, looking
/// through inline fragments and fragment spreads. Spreads of unknown
/// fragments and spreads that would recurse are skipped.
pub(crate) fn collect<'a>(
    documents: &'a DocumentSet,
    parent_type: &'a str,
    sets: &[&'a SelectionSet],
) -> Collected<'a> {
    let mut collector = Collector {
        documents,
        out: Collected::default(),
        stack: Vec::new(),
    };
    for set in sets {
        collector.selection_set(set, parent_type, &[], &BooleanExpression::True);
    }
    collector.out
}

struct Collector<'a> {
    documents: &'a DocumentSet,
    out: Collected<'a>,
    stack: Vec<&'a str>,
}

impl<'a> Collector<'a> {
    fn selection_set(
        &mut self,
        set: &'a SelectionSet,
        parent_type: &'a str,
        conditions: &[&'a str],
        condition: &BooleanExpression,
    ) {
        for selection in &set.selections {
            let condition = condition
                .clone()
                .and(directive_condition(selection.directives()));
            if condition == BooleanExpression::False {
                continue;
            }
            match selection {
                Selection::Field(field) => self.out.fields.push(Reached {
                    field,
                    parent_type,
                    conditions: conditions.to_vec(),
                    condition,
                }),
                Selection::InlineFragment(inline) => {
                    let mut inner = conditions.to_vec();
                    let inner_type = match &inline.type_condition {
                        Some(ty) => {
                            inner.push(ty.as_str());
                            ty.as_str()
                        }
                        None => parent_type,
                    };
                    self.selection_set(&inline.selection_set, inner_type, &inner, &condition);
                }
                Selection::FragmentSpread(spread) => {
                    let Some(fragment) = self.documents.fragment(&spread.name) else {
                        continue;
                    };
                    if self.stack.contains(&fragment.name.as_str()) {
                        continue;
                    }
                    let mut inner = conditions.to_vec();
                    inner.push(fragment.type_condition.as_str());
                    self.out.spreads.push(ReachedSpread {
                        fragment,
                        conditions: inner.clone(),
                    });

                    self.stack.push(&fragment.name);
                    self.selection_set(
                        &fragment.selection_set,
                        &fragment.type_condition,
                        &inner,
                        &condition,
                    );
                    self.stack.pop();
                }
            }
        }
    }
}

/// Condition contributed by `@skip(if:)` and `@include(if:)`.
pub(crate) fn directive_condition(directives: &[Directive]) -> BooleanExpression {
    let mut condition = BooleanExpression::True;
    for directive in directives {
        let positive = match directive.name.as_str() {
            "include" => true,
            "skip" => false,
            _ => continue,
        };
        let value = match directive.argument("if") {
            Some(Value::Boolean(b)) => {
                if *b == positive {
                    BooleanExpression::True
                } else {
                    BooleanExpression::False
                }
            }
            Some(Value::Variable(name)) => {
                let variable = BooleanExpression::variable(name.clone());
                if positive {
                    variable
                } else {
                    variable.negate()
                }
            }
            _ => continue,
        };
        condition = condition.and(value);
    }
    condition
}

/// Names of the fragments `set` spreads, transitively.
pub(crate) fn used_fragments<'a>(
    documents: &'a DocumentSet,
    set: &'a SelectionSet,
) -> BTreeSet<&'a str> {
    let mut out = BTreeSet::new();
    visit_spreads(documents, set, &mut out);
    out
}

fn visit_spreads<'a>(documents: &'a DocumentSet, set: &'a SelectionSet, out: &mut BTreeSet<&'a str>) {
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => {
                if let Some(nested) = &field.selection_set {
                    visit_spreads(documents, nested, out);
                }
            }
            Selection::InlineFragment(inline) => visit_spreads(documents, &inline.selection_set, out),
            Selection::FragmentSpread(spread) => {
                if let Some(fragment) = documents.fragment(&spread.name)
                    && out.insert(fragment.name.as_str())
                {
                    visit_spreads(documents, &fragment.selection_set, out);
                }
            }
        }
    }
}

/// Variables referenced in arguments and directives under `set`, including
/// inside spread fragments.
pub(crate) fn referenced_variables<'a>(
    documents: &'a DocumentSet,
    set: &'a SelectionSet,
) -> BTreeSet<&'a str> {
    let mut variables = Vec::new();
    let mut visited = HashSet::new();
    visit_variables(documents, set, &mut variables, &mut visited);
    variables.into_iter().collect()
}

fn visit_variables<'a>(
    documents: &'a DocumentSet,
    set: &'a SelectionSet,
    out: &mut Vec<&'a str>,
    visited: &mut HashSet<&'a str>,
) {
    for selection in &set.selections {
        for directive in selection.directives() {
            for argument in &directive.arguments {
                argument.value.variables(out);
            }
        }
        match selection {
            Selection::Field(field) => {
                for argument in &field.arguments {
                    argument.value.variables(out);
                }
                if let Some(nested) = &field.selection_set {
                    visit_variables(documents, nested, out, visited);
                }
            }
            Selection::InlineFragment(inline) => {
                visit_variables(documents, &inline.selection_set, out, visited)
            }
            Selection::FragmentSpread(spread) => {
                if let Some(fragment) = documents.fragment(&spread.name)
                    && visited.insert(fragment.name.as_str())
                {
                    visit_variables(documents, &fragment.selection_set, out, visited);
                }
            }
        }
    }
}

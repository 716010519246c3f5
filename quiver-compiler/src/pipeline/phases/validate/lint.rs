//! Lint trait and the document walker lints are written against.

use quiver_manifest::IssueLevel;
use quiver_schema::Schema;
use quiver_syntax::{
    Position,
    ast::{
        Definition, Directive, DirectiveLocation, Field, FieldDefinition, FragmentDefinition,
        FragmentSpread, InlineFragment, OperationDefinition, OperationKind, Selection,
        SelectionSet,
    },
};

use crate::{DocumentSet, location, pipeline::Diagnostic};

/// Information about a lint.
#[derive(Debug, Clone)]
pub struct LintInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub default_level: IssueLevel,
}

/// A lint that checks the executable documents for issues.
///
/// Lints report through [`Diagnostic::error`]; the validate phase rewrites
/// the severity to the level configured for the lint and tags the diagnostic
/// with the lint name.
pub trait Lint: Send + Sync {
    /// The name of this lint, as used in `[validation]`.
    fn name(&self) -> &'static str;

    /// A human-readable description of what this lint checks.
    fn description(&self) -> &'static str;

    /// Level used when `quiver.toml` does not override it.
    fn default_level(&self) -> IssueLevel {
        IssueLevel::Error
    }

    /// Check the documents and add any diagnostics.
    fn check(&self, ctx: &LintContext<'_>, diagnostics: &mut Vec<Diagnostic>);

    fn info(&self) -> LintInfo {
        LintInfo {
            name: self.name(),
            description: self.description(),
            default_level: self.default_level(),
        }
    }
}

/// What a lint gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct LintContext<'a> {
    pub schema: &'a Schema,
    pub documents: &'a DocumentSet,
}

/// The definition a selection belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Owner<'a> {
    Operation(&'a OperationDefinition),
    Fragment(&'a FragmentDefinition),
}

impl<'a> Owner<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Owner::Operation(op) => op.name.as_deref().unwrap_or("<anonymous>"),
            Owner::Fragment(fragment) => &fragment.name,
        }
    }

    pub fn operation(&self) -> Option<&'a OperationDefinition> {
        match self {
            Owner::Operation(op) => Some(op),
            Owner::Fragment(_) => None,
        }
    }
}

/// Where the walker currently is.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub file: &'a str,
    pub owner: Owner<'a>,
    /// Type the current selection set is selected on.
    pub parent_type: &'a str,
}

impl Scope<'_> {
    pub fn location(&self, pos: Position) -> String {
        location(self.file, pos)
    }
}

/// Callbacks for [`LintContext::walk`]. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait Visitor<'a> {
    fn enter_operation(&mut self, file: &'a str, op: &'a OperationDefinition) {}

    fn enter_fragment(&mut self, file: &'a str, fragment: &'a FragmentDefinition) {}

    /// A field, with its schema definition when the parent type has one.
    fn field(&mut self, scope: Scope<'a>, field: &'a Field, definition: Option<&'a FieldDefinition>) {}

    fn inline_fragment(&mut self, scope: Scope<'a>, fragment: &'a InlineFragment) {}

    fn fragment_spread(&mut self, scope: Scope<'a>, spread: &'a FragmentSpread) {}

    fn directives(
        &mut self,
        scope: Scope<'a>,
        location: DirectiveLocation,
        directives: &'a [Directive],
        pos: Position,
    ) {
    }
}

impl<'a> LintContext<'a> {
    pub fn new(schema: &'a Schema, documents: &'a DocumentSet) -> Self {
        Self { schema, documents }
    }

    /// Walk every definition. Selection sets are entered only below
    /// composite types the schema knows, and fragment spreads are reported
    /// but not followed, so each selection is visited once.
    pub fn walk(&self, visitor: &mut impl Visitor<'a>) {
        for (file, definition) in self.documents.definitions() {
            match definition {
                Definition::Operation(op) => {
                    visitor.enter_operation(file, op);
                    let root = self.schema.root_type(op.kind);
                    let scope = Scope {
                        file,
                        owner: Owner::Operation(op),
                        parent_type: root.unwrap_or_default(),
                    };
                    visitor.directives(scope, operation_location(op.kind), &op.directives, op.pos);
                    for variable in &op.variables {
                        visitor.directives(
                            scope,
                            DirectiveLocation::VariableDefinition,
                            &variable.directives,
                            variable.pos,
                        );
                    }
                    if root.is_some() {
                        self.walk_selection_set(visitor, scope, &op.selection_set);
                    }
                }
                Definition::Fragment(fragment) => {
                    visitor.enter_fragment(file, fragment);
                    let scope = Scope {
                        file,
                        owner: Owner::Fragment(fragment),
                        parent_type: &fragment.type_condition,
                    };
                    visitor.directives(
                        scope,
                        DirectiveLocation::FragmentDefinition,
                        &fragment.directives,
                        fragment.pos,
                    );
                    if self.schema.is_composite(&fragment.type_condition) {
                        self.walk_selection_set(visitor, scope, &fragment.selection_set);
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_selection_set(
        &self,
        visitor: &mut impl Visitor<'a>,
        scope: Scope<'a>,
        set: &'a SelectionSet,
    ) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    let definition = self.schema.field(scope.parent_type, &field.name);
                    visitor.field(scope, field, definition);
                    visitor.directives(scope, DirectiveLocation::Field, &field.directives, field.pos);
                    if let (Some(definition), Some(nested)) = (definition, &field.selection_set) {
                        let ty = definition.ty.name();
                        if self.schema.is_composite(ty) {
                            let inner = Scope {
                                parent_type: ty,
                                ..scope
                            };
                            self.walk_selection_set(visitor, inner, nested);
                        }
                    }
                }
                Selection::InlineFragment(inline) => {
                    visitor.inline_fragment(scope, inline);
                    visitor.directives(
                        scope,
                        DirectiveLocation::InlineFragment,
                        &inline.directives,
                        inline.pos,
                    );
                    let ty = inline.type_condition.as_deref().unwrap_or(scope.parent_type);
                    if self.schema.is_composite(ty) {
                        let inner = Scope {
                            parent_type: ty,
                            ..scope
                        };
                        self.walk_selection_set(visitor, inner, &inline.selection_set);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    visitor.fragment_spread(scope, spread);
                    visitor.directives(
                        scope,
                        DirectiveLocation::FragmentSpread,
                        &spread.directives,
                        spread.pos,
                    );
                }
            }
        }
    }

    /// Every operation with the file it was loaded from.
    pub fn operations(&self) -> impl Iterator<Item = (&'a str, &'a OperationDefinition)> + 'a {
        self.documents.operations()
    }

    pub fn fragments(&self) -> impl Iterator<Item = (&'a str, &'a FragmentDefinition)> + 'a {
        self.documents.fragments()
    }
}

fn operation_location(kind: OperationKind) -> DirectiveLocation {
    match kind {
        OperationKind::Query => DirectiveLocation::Query,
        OperationKind::Mutation => DirectiveLocation::Mutation,
        OperationKind::Subscription => DirectiveLocation::Subscription,
    }
}

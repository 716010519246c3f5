//! Abstract syntax tree for executable and type-system documents.

mod executable;
mod schema;
mod types;
mod value;

pub use executable::{
    Argument, Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, OperationKind, Selection, SelectionSet, VariableDefinition,
};
pub use schema::{
    DEFAULT_DEPRECATION_REASON, DirectiveDefinition, DirectiveLocation, EnumType,
    EnumValueDefinition, FieldDefinition, InputObjectType, InputValueDefinition, InterfaceType,
    ObjectType, RootOperation, ScalarType, SchemaDefinition, TypeDefinition, UnionType,
};
pub use types::Type;
pub use value::{Value, write_quoted};

use crate::position::Position;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Operation(OperationDefinition),
    Fragment(FragmentDefinition),
    Schema(SchemaDefinition),
    SchemaExtension(SchemaDefinition),
    Type(TypeDefinition),
    TypeExtension(TypeDefinition),
    Directive(DirectiveDefinition),
}

impl Definition {
    pub fn is_executable(&self) -> bool {
        matches!(self, Definition::Operation(_) | Definition::Fragment(_))
    }

    pub fn pos(&self) -> Position {
        match self {
            Definition::Operation(op) => op.pos,
            Definition::Fragment(fragment) => fragment.pos,
            Definition::Schema(schema) | Definition::SchemaExtension(schema) => schema.pos,
            Definition::Type(ty) | Definition::TypeExtension(ty) => ty.pos(),
            Definition::Directive(directive) => directive.pos,
        }
    }
}

impl Document {
    pub fn operations(&self) -> impl Iterator<Item = &OperationDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            _ => None,
        })
    }

    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDefinition> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Fragment(fragment) => Some(fragment),
            _ => None,
        })
    }

    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments().find(|f| f.name == name)
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations().find(|op| op.name.as_deref() == Some(name))
    }
}

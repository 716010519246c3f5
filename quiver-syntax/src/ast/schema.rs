use std::{fmt, str::FromStr};

use crate::{
    ast::{Directive, OperationKind, Type, Value},
    position::Position,
};

/// Reason reported for `@deprecated` without an explicit `reason`.
pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

fn deprecation_reason(directives: &[Directive]) -> Option<String> {
    let directive = directives.iter().find(|d| d.name == "deprecated")?;
    Some(
        directive
            .argument("reason")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_DEPRECATION_REASON)
            .to_string(),
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    pub description: Option<String>,
    pub directives: Vec<Directive>,
    pub root_operations: Vec<RootOperation>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootOperation {
    pub kind: OperationKind,
    pub named_type: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

macro_rules! each_type {
    ($self:ident, $ty:ident => $e:expr) => {
        match $self {
            TypeDefinition::Scalar($ty) => $e,
            TypeDefinition::Object($ty) => $e,
            TypeDefinition::Interface($ty) => $e,
            TypeDefinition::Union($ty) => $e,
            TypeDefinition::Enum($ty) => $e,
            TypeDefinition::InputObject($ty) => $e,
        }
    };
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        each_type!(self, ty => &ty.name)
    }

    pub fn description(&self) -> Option<&str> {
        each_type!(self, ty => ty.description.as_deref())
    }

    pub fn directives(&self) -> &[Directive] {
        each_type!(self, ty => &ty.directives)
    }

    pub fn directives_mut(&mut self) -> &mut Vec<Directive> {
        each_type!(self, ty => &mut ty.directives)
    }

    pub fn pos(&self) -> Position {
        each_type!(self, ty => ty.pos)
    }

    /// The SDL keyword introducing this definition.
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeDefinition::Scalar(_) => "scalar",
            TypeDefinition::Object(_) => "type",
            TypeDefinition::Interface(_) => "interface",
            TypeDefinition::Union(_) => "union",
            TypeDefinition::Enum(_) => "enum",
            TypeDefinition::InputObject(_) => "input",
        }
    }

    /// Output fields of objects and interfaces.
    pub fn fields(&self) -> &[FieldDefinition] {
        match self {
            TypeDefinition::Object(ty) => &ty.fields,
            TypeDefinition::Interface(ty) => &ty.fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Interfaces implemented by an object or interface.
    pub fn implements(&self) -> &[String] {
        match self {
            TypeDefinition::Object(ty) => &ty.implements,
            TypeDefinition::Interface(ty) => &ty.implements,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarType {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectType {
    pub description: Option<String>,
    pub name: String,
    pub implements: Vec<String>,
    pub directives: Vec<Directive>,
    pub fields: Vec<FieldDefinition>,
    pub pos: Position,
}

pub type InterfaceType = ObjectType;

#[derive(Debug, Clone, PartialEq)]
pub struct UnionType {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub members: Vec<String>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub values: Vec<EnumValueDefinition>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputObjectType {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub fields: Vec<InputValueDefinition>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub description: Option<String>,
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: Type,
    pub directives: Vec<Directive>,
    pub pos: Position,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            description: None,
            name: name.into(),
            arguments: Vec::new(),
            ty,
            directives: Vec::new(),
            pos: Position::default(),
        }
    }

    pub fn argument(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn deprecation_reason(&self) -> Option<String> {
        deprecation_reason(&self.directives)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub description: Option<String>,
    pub name: String,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
    pub pos: Position,
}

impl InputValueDefinition {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            description: None,
            name: name.into(),
            ty,
            default_value: None,
            directives: Vec::new(),
            pos: Position::default(),
        }
    }

    /// Required arguments are non-null and have no default.
    pub fn is_required(&self) -> bool {
        self.ty.is_non_null() && self.default_value.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub description: Option<String>,
    pub name: String,
    pub directives: Vec<Directive>,
    pub pos: Position,
}

impl EnumValueDefinition {
    pub fn deprecation_reason(&self) -> Option<String> {
        deprecation_reason(&self.directives)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub description: Option<String>,
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
    pub repeatable: bool,
    pub locations: Vec<DirectiveLocation>,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    pub const ALL: [DirectiveLocation; 19] = [
        DirectiveLocation::Query,
        DirectiveLocation::Mutation,
        DirectiveLocation::Subscription,
        DirectiveLocation::Field,
        DirectiveLocation::FragmentDefinition,
        DirectiveLocation::FragmentSpread,
        DirectiveLocation::InlineFragment,
        DirectiveLocation::VariableDefinition,
        DirectiveLocation::Schema,
        DirectiveLocation::Scalar,
        DirectiveLocation::Object,
        DirectiveLocation::FieldDefinition,
        DirectiveLocation::ArgumentDefinition,
        DirectiveLocation::Interface,
        DirectiveLocation::Union,
        DirectiveLocation::Enum,
        DirectiveLocation::EnumValue,
        DirectiveLocation::InputObject,
        DirectiveLocation::InputFieldDefinition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectiveLocation::Query => "QUERY",
            DirectiveLocation::Mutation => "MUTATION",
            DirectiveLocation::Subscription => "SUBSCRIPTION",
            DirectiveLocation::Field => "FIELD",
            DirectiveLocation::FragmentDefinition => "FRAGMENT_DEFINITION",
            DirectiveLocation::FragmentSpread => "FRAGMENT_SPREAD",
            DirectiveLocation::InlineFragment => "INLINE_FRAGMENT",
            DirectiveLocation::VariableDefinition => "VARIABLE_DEFINITION",
            DirectiveLocation::Schema => "SCHEMA",
            DirectiveLocation::Scalar => "SCALAR",
            DirectiveLocation::Object => "OBJECT",
            DirectiveLocation::FieldDefinition => "FIELD_DEFINITION",
            DirectiveLocation::ArgumentDefinition => "ARGUMENT_DEFINITION",
            DirectiveLocation::Interface => "INTERFACE",
            DirectiveLocation::Union => "UNION",
            DirectiveLocation::Enum => "ENUM",
            DirectiveLocation::EnumValue => "ENUM_VALUE",
            DirectiveLocation::InputObject => "INPUT_OBJECT",
            DirectiveLocation::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl FromStr for DirectiveLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DirectiveLocation::ALL
            .into_iter()
            .find(|location| location.as_str() == s)
            .ok_or_else(|| format!("Unknown directive location '{}'", s))
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

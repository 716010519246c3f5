//! Conversion of introspection query results into a [`Schema`].

use quiver_syntax::{
    Document,
    ast::{
        Argument, Definition, Directive, DirectiveDefinition, EnumType, EnumValueDefinition,
        FieldDefinition, InputObjectType, InputValueDefinition, ObjectType, OperationKind,
        RootOperation, ScalarType, SchemaDefinition, Type, TypeDefinition, UnionType, Value,
    },
    parse_const_value,
};
use serde::Deserialize;

use crate::{
    Schema,
    error::{Error, Result},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionSchema {
    query_type: NamedRef,
    mutation_type: Option<NamedRef>,
    subscription_type: Option<NamedRef>,
    types: Vec<FullType>,
    #[serde(default)]
    directives: Vec<IntrospectionDirective>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: TypeKind,
    name: String,
    description: Option<String>,
    fields: Option<Vec<IntrospectionField>>,
    input_fields: Option<Vec<IntrospectionInputValue>>,
    interfaces: Option<Vec<TypeRef>>,
    enum_values: Option<Vec<IntrospectionEnumValue>>,
    possible_types: Option<Vec<TypeRef>>,
    #[serde(rename = "specifiedByURL", alias = "specifiedByUrl", default)]
    specified_by_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionField {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionInputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    ty: TypeRef,
    default_value: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionEnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntrospectionDirective {
    name: String,
    description: Option<String>,
    locations: Vec<String>,
    #[serde(default)]
    args: Vec<IntrospectionInputValue>,
    #[serde(default)]
    is_repeatable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRef {
    kind: TypeKind,
    name: Option<String>,
    of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    fn to_type(&self) -> Result<Type> {
        let inner = || {
            self.of_type
                .as_deref()
                .ok_or_else(|| Error::introspection("wrapping type without ofType"))
        };
        match self.kind {
            TypeKind::NonNull => Ok(Type::NonNull(Box::new(inner()?.to_type()?))),
            TypeKind::List => Ok(Type::List(Box::new(inner()?.to_type()?))),
            _ => self
                .name
                .clone()
                .map(Type::Named)
                .ok_or_else(|| Error::introspection("named type without a name")),
        }
    }

    fn name(&self) -> Result<String> {
        Ok(self.to_type()?.name().to_string())
    }
}

fn deprecated(is_deprecated: bool, reason: Option<&str>) -> Vec<Directive> {
    if !is_deprecated {
        return Vec::new();
    }
    let arguments = reason
        .map(|reason| {
            vec![Argument {
                name: "reason".to_string(),
                value: Value::String(reason.to_string()),
                pos: Default::default(),
            }]
        })
        .unwrap_or_default();
    vec![Directive {
        name: "deprecated".to_string(),
        arguments,
        pos: Default::default(),
    }]
}

fn input_value(value: &IntrospectionInputValue) -> Result<InputValueDefinition> {
    let default_value = value
        .default_value
        .as_deref()
        .map(|raw| {
            parse_const_value(raw).map_err(|e| {
                Error::introspection(format!(
                    "invalid default value for '{}': {}",
                    value.name, e.message
                ))
            })
        })
        .transpose()?;
    Ok(InputValueDefinition {
        description: value.description.clone(),
        name: value.name.clone(),
        ty: value.ty.to_type()?,
        default_value,
        directives: deprecated(value.is_deprecated, value.deprecation_reason.as_deref()),
        pos: Default::default(),
    })
}

fn field(field: &IntrospectionField) -> Result<FieldDefinition> {
    Ok(FieldDefinition {
        description: field.description.clone(),
        name: field.name.clone(),
        arguments: field.args.iter().map(input_value).collect::<Result<_>>()?,
        ty: field.ty.to_type()?,
        directives: deprecated(field.is_deprecated, field.deprecation_reason.as_deref()),
        pos: Default::default(),
    })
}

fn type_definition(ty: &FullType) -> Result<TypeDefinition> {
    let object = |ty: &FullType| -> Result<ObjectType> {
        Ok(ObjectType {
            description: ty.description.clone(),
            name: ty.name.clone(),
            implements: ty
                .interfaces
                .iter()
                .flatten()
                .map(TypeRef::name)
                .collect::<Result<_>>()?,
            directives: Vec::new(),
            fields: ty.fields.iter().flatten().map(field).collect::<Result<_>>()?,
            pos: Default::default(),
        })
    };

    Ok(match ty.kind {
        TypeKind::Scalar => {
            let directives = ty
                .specified_by_url
                .as_ref()
                .map(|url| {
                    vec![Directive {
                        name: "specifiedBy".to_string(),
                        arguments: vec![Argument {
                            name: "url".to_string(),
                            value: Value::String(url.clone()),
                            pos: Default::default(),
                        }],
                        pos: Default::default(),
                    }]
                })
                .unwrap_or_default();
            TypeDefinition::Scalar(ScalarType {
                description: ty.description.clone(),
                name: ty.name.clone(),
                directives,
                pos: Default::default(),
            })
        }
        TypeKind::Object => TypeDefinition::Object(object(ty)?),
        TypeKind::Interface => TypeDefinition::Interface(object(ty)?),
        TypeKind::Union => TypeDefinition::Union(UnionType {
            description: ty.description.clone(),
            name: ty.name.clone(),
            directives: Vec::new(),
            members: ty
                .possible_types
                .iter()
                .flatten()
                .map(TypeRef::name)
                .collect::<Result<_>>()?,
            pos: Default::default(),
        }),
        TypeKind::Enum => TypeDefinition::Enum(EnumType {
            description: ty.description.clone(),
            name: ty.name.clone(),
            directives: Vec::new(),
            values: ty
                .enum_values
                .iter()
                .flatten()
                .map(|value| EnumValueDefinition {
                    description: value.description.clone(),
                    name: value.name.clone(),
                    directives: deprecated(value.is_deprecated, value.deprecation_reason.as_deref()),
                    pos: Default::default(),
                })
                .collect(),
            pos: Default::default(),
        }),
        TypeKind::InputObject => TypeDefinition::InputObject(InputObjectType {
            description: ty.description.clone(),
            name: ty.name.clone(),
            directives: Vec::new(),
            fields: ty
                .input_fields
                .iter()
                .flatten()
                .map(input_value)
                .collect::<Result<_>>()?,
            pos: Default::default(),
        }),
        TypeKind::List | TypeKind::NonNull => {
            return Err(Error::introspection(format!(
                "type '{}' has a wrapping kind",
                ty.name
            )));
        }
    })
}

fn directive(directive: &IntrospectionDirective) -> Result<DirectiveDefinition> {
    Ok(DirectiveDefinition {
        description: directive.description.clone(),
        name: directive.name.clone(),
        arguments: directive.args.iter().map(input_value).collect::<Result<_>>()?,
        repeatable: directive.is_repeatable,
        locations: directive
            .locations
            .iter()
            .map(|location| location.parse().map_err(Error::introspection))
            .collect::<Result<_>>()?,
        pos: Default::default(),
    })
}

fn root(kind: OperationKind, named: &NamedRef) -> RootOperation {
    RootOperation {
        kind,
        named_type: named.name.clone(),
        pos: Default::default(),
    }
}

impl Schema {
    /// Build a schema from an introspection result.
    ///
    /// Accepts the full response (`{"data": {"__schema": ...}}`) or only the
    /// `{"__schema": ...}` object. Introspection types (`__Type` etc.) are
    /// skipped.
    pub fn from_introspection_json(json: &str) -> Result<Schema> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| Box::new(Error::from(e)))?;
        let schema = value
            .get("data")
            .unwrap_or(&value)
            .get("__schema")
            .ok_or_else(|| Error::introspection("missing '__schema' object"))?;
        let schema: IntrospectionSchema =
            serde_json::from_value(schema.clone()).map_err(|e| Box::new(Error::from(e)))?;

        let mut root_operations = vec![root(OperationKind::Query, &schema.query_type)];
        if let Some(mutation) = &schema.mutation_type {
            root_operations.push(root(OperationKind::Mutation, mutation));
        }
        if let Some(subscription) = &schema.subscription_type {
            root_operations.push(root(OperationKind::Subscription, subscription));
        }

        let mut definitions = vec![Definition::Schema(SchemaDefinition {
            description: schema.description.clone(),
            directives: Vec::new(),
            root_operations,
            pos: Default::default(),
        })];
        for ty in schema.types.iter().filter(|ty| !ty.name.starts_with("__")) {
            definitions.push(Definition::Type(type_definition(ty)?));
        }
        for d in &schema.directives {
            definitions.push(Definition::Directive(directive(d)?));
        }

        tracing::debug!(types = schema.types.len(), "converted introspection result");
        Schema::from_document(&Document { definitions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTROSPECTION: &str = r#"{
      "data": {
        "__schema": {
          "queryType": { "name": "Query" },
          "mutationType": null,
          "subscriptionType": null,
          "types": [
            {
              "kind": "OBJECT", "name": "Query", "description": null,
              "fields": [
                {
                  "name": "hero", "description": null,
                  "args": [
                    { "name": "episode", "description": null, "defaultValue": "JEDI",
                      "type": { "kind": "ENUM", "name": "Episode", "ofType": null } }
                  ],
                  "type": { "kind": "INTERFACE", "name": "Character", "ofType": null },
                  "isDeprecated": false, "deprecationReason": null
                }
              ],
              "inputFields": null, "interfaces": [], "enumValues": null, "possibleTypes": null
            },
            {
              "kind": "INTERFACE", "name": "Character", "description": null,
              "fields": [
                { "name": "name", "description": null, "args": [],
                  "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "String", "ofType": null } },
                  "isDeprecated": false, "deprecationReason": null }
              ],
              "inputFields": null, "interfaces": [], "enumValues": null,
              "possibleTypes": [{ "kind": "OBJECT", "name": "Droid", "ofType": null }]
            },
            {
              "kind": "OBJECT", "name": "Droid", "description": "A robot",
              "fields": [
                { "name": "name", "description": null, "args": [],
                  "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "String", "ofType": null } },
                  "isDeprecated": true, "deprecationReason": "gone" }
              ],
              "inputFields": null,
              "interfaces": [{ "kind": "INTERFACE", "name": "Character", "ofType": null }],
              "enumValues": null, "possibleTypes": null
            },
            {
              "kind": "ENUM", "name": "Episode", "description": null, "fields": null,
              "inputFields": null, "interfaces": null, "possibleTypes": null,
              "enumValues": [
                { "name": "NEWHOPE", "description": null, "isDeprecated": false, "deprecationReason": null },
                { "name": "JEDI", "description": null, "isDeprecated": false, "deprecationReason": null }
              ]
            },
            { "kind": "SCALAR", "name": "String", "description": null, "fields": null,
              "inputFields": null, "interfaces": null, "enumValues": null, "possibleTypes": null },
            { "kind": "OBJECT", "name": "__Type", "description": null, "fields": [],
              "inputFields": null, "interfaces": [], "enumValues": null, "possibleTypes": null }
          ],
          "directives": [
            { "name": "include", "description": null, "locations": ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
              "args": [{ "name": "if", "description": null, "defaultValue": null,
                         "type": { "kind": "NON_NULL", "name": null, "ofType": { "kind": "SCALAR", "name": "Boolean", "ofType": null } } }] }
          ]
        }
      }
    }"#;

    #[test]
    fn test_from_introspection() {
        let schema = Schema::from_introspection_json(INTROSPECTION).unwrap();
        assert_eq!(schema.query_type(), "Query");
        assert!(schema.satisfies("Droid", "Character"));
        assert!(schema.get_type("__Type").is_none());
        assert_eq!(
            schema
                .field("Droid", "name")
                .and_then(|f| f.deprecation_reason()),
            Some("gone".to_string())
        );
        let hero = schema.field("Query", "hero").unwrap();
        assert_eq!(
            hero.argument("episode").unwrap().default_value,
            Some(Value::Enum("JEDI".to_string()))
        );
    }

    #[test]
    fn test_introspection_to_sdl() {
        let schema = Schema::from_introspection_json(INTROSPECTION).unwrap();
        assert_eq!(
            schema.to_sdl(2),
            r#"schema {
  query: Query
}

type Query {
  hero(episode: Episode = JEDI): Character
}

interface Character {
  name: String!
}

"A robot"
type Droid implements Character {
  name: String! @deprecated(reason: "gone")
}

enum Episode {
  NEWHOPE
  JEDI
}
"#
        );
    }

    #[test]
    fn test_missing_schema_object() {
        let err = Schema::from_introspection_json(r#"{"data": {}}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid introspection result: missing '__schema' object"
        );
    }
}

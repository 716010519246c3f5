use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use indexmap::IndexMap;
use quiver_syntax::{
    Document, Printer,
    ast::{
        Definition, Directive, DirectiveDefinition, FieldDefinition, OperationKind, RootOperation,
        SchemaDefinition, Type, TypeDefinition,
    },
    parse_schema,
};

use crate::{
    builtins::{BUILTIN_SDL, META_SDL, is_builtin_directive, is_builtin_scalar},
    error::{Error, Result},
};

/// A validated type registry built from one or more SDL documents or an
/// introspection result.
#[derive(Debug, Clone)]
pub struct Schema {
    description: Option<String>,
    schema_directives: Vec<Directive>,
    explicit_schema_definition: bool,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    types: IndexMap<String, TypeDefinition>,
    directives: IndexMap<String, DirectiveDefinition>,
    /// Abstract type name → concrete object type names.
    possible_types: HashMap<String, BTreeSet<String>>,
    meta_fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn from_sdl(src: &str, filename: &str) -> Result<Schema> {
        let document = parse_schema(src, filename)?;
        Self::from_document(&document)
    }

    /// Load a schema file: `.json` files are introspection results,
    /// everything else is SDL.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Schema> {
        Self::from_files(&[path.as_ref()])
    }

    /// Merge several schema files into one registry.
    ///
    /// SDL files are parsed into a single document so extensions may live
    /// in a different file than the type they extend.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Schema> {
        let mut merged = Document::default();
        let mut introspection = None;

        for path in paths {
            let path = path.as_ref();
            let src = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            tracing::debug!(path = %path.display(), "loading schema file");

            if path.extension().is_some_and(|ext| ext == "json") {
                if introspection.is_some() || paths.len() > 1 {
                    return Err(Error::introspection(
                        "an introspection result cannot be combined with other schema files",
                    ));
                }
                introspection = Some(src);
                continue;
            }
            let document = parse_schema(&src, &path.display().to_string())?;
            merged.definitions.extend(document.definitions);
        }

        match introspection {
            Some(json) => Self::from_introspection_json(&json),
            None => Self::from_document(&merged),
        }
    }

    pub fn from_document(document: &Document) -> Result<Schema> {
        let builtins = parse_schema(BUILTIN_SDL, "<builtins>")?;
        let meta = parse_schema(META_SDL, "<meta>")?;

        let mut types: IndexMap<String, TypeDefinition> = IndexMap::new();
        let mut directives: IndexMap<String, DirectiveDefinition> = IndexMap::new();
        let mut schema_definition: Option<SchemaDefinition> = None;
        let mut type_extensions = Vec::new();
        let mut schema_extensions = Vec::new();

        for definition in &document.definitions {
            match definition {
                Definition::Type(ty) => {
                    if types.contains_key(ty.name()) {
                        return Err(Box::new(Error::DuplicateType {
                            name: ty.name().to_string(),
                            pos: ty.pos(),
                        }));
                    }
                    types.insert(ty.name().to_string(), ty.clone());
                }
                Definition::Directive(directive) => {
                    if directives.contains_key(&directive.name) {
                        return Err(Box::new(Error::DuplicateDirective {
                            name: directive.name.clone(),
                            pos: directive.pos,
                        }));
                    }
                    directives.insert(directive.name.clone(), directive.clone());
                }
                Definition::Schema(schema) => {
                    if schema_definition.is_some() {
                        return Err(Box::new(Error::DuplicateType {
                            name: "schema".to_string(),
                            pos: schema.pos,
                        }));
                    }
                    schema_definition = Some(schema.clone());
                }
                Definition::TypeExtension(ty) => type_extensions.push(ty),
                Definition::SchemaExtension(schema) => schema_extensions.push(schema),
                // rejected by parse_schema; a mixed document simply ignores them
                Definition::Operation(_) | Definition::Fragment(_) => {}
            }
        }

        for definition in builtins.definitions {
            match definition {
                Definition::Type(ty) if !types.contains_key(ty.name()) => {
                    types.insert(ty.name().to_string(), ty);
                }
                Definition::Directive(directive) if !directives.contains_key(&directive.name) => {
                    directives.insert(directive.name.clone(), directive);
                }
                _ => {}
            }
        }

        for extension in type_extensions {
            apply_type_extension(&mut types, extension)?;
        }

        let explicit_schema_definition = schema_definition.is_some();
        let mut schema_definition = schema_definition.unwrap_or_else(|| SchemaDefinition {
            description: None,
            directives: Vec::new(),
            root_operations: default_root_operations(&types),
            pos: Default::default(),
        });
        for extension in schema_extensions {
            schema_definition
                .directives
                .extend(extension.directives.iter().cloned());
            schema_definition
                .root_operations
                .extend(extension.root_operations.iter().cloned());
        }

        let root = |kind: OperationKind| {
            schema_definition
                .root_operations
                .iter()
                .find(|r| r.kind == kind)
                .map(|r| r.named_type.clone())
        };
        let query_type = root(OperationKind::Query).ok_or_else(|| Box::new(Error::MissingQueryRoot))?;
        let mutation_type = root(OperationKind::Mutation);
        let subscription_type = root(OperationKind::Subscription);

        for (kind, name) in [
            (OperationKind::Query, Some(&query_type)),
            (OperationKind::Mutation, mutation_type.as_ref()),
            (OperationKind::Subscription, subscription_type.as_ref()),
        ] {
            let Some(name) = name else { continue };
            match types.get(name) {
                None => {
                    return Err(Box::new(Error::MissingRootType {
                        kind: kind.as_str(),
                        name: name.clone(),
                    }));
                }
                Some(TypeDefinition::Object(_)) => {}
                Some(_) => {
                    return Err(Box::new(Error::RootTypeNotObject {
                        kind: kind.as_str(),
                        name: name.clone(),
                    }));
                }
            }
        }

        check_references(&types)?;
        let possible_types = index_possible_types(&types);

        let meta_fields = meta
            .definitions
            .into_iter()
            .find_map(|definition| match definition {
                Definition::Type(TypeDefinition::Object(object)) => Some(object.fields),
                _ => None,
            })
            .unwrap_or_default();

        tracing::debug!(
            types = types.len(),
            directives = directives.len(),
            query = %query_type,
            "built schema"
        );

        Ok(Schema {
            description: schema_definition.description,
            schema_directives: schema_definition.directives,
            explicit_schema_definition,
            query_type,
            mutation_type,
            subscription_type,
            types,
            directives,
            possible_types,
            meta_fields,
        })
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn root_type(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => Some(&self.query_type),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDefinition> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDefinition> {
        self.directives.values()
    }

    /// Look up a field on an object or interface, including the meta fields
    /// `__typename` (any composite type) and `__schema`/`__type` (query root).
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        if field_name.starts_with("__") {
            let available = match field_name {
                "__typename" => self.is_composite(type_name),
                "__schema" | "__type" => type_name == self.query_type,
                _ => false,
            };
            if available {
                return self.meta_fields.iter().find(|f| f.name == field_name);
            }
        }
        self.types.get(type_name)?.field(field_name)
    }

    /// Concrete object types a value of `name` can have at runtime.
    pub fn possible_types(&self, name: &str) -> BTreeSet<&str> {
        match self.types.get_key_value(name) {
            Some((key, TypeDefinition::Object(_))) => BTreeSet::from([key.as_str()]),
            Some((_, TypeDefinition::Interface(_))) | Some((_, TypeDefinition::Union(_))) => self
                .possible_types
                .get(name)
                .map(|set| set.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            _ => BTreeSet::new(),
        }
    }

    /// Whether a value of concrete type `concrete` matches a fragment on
    /// `condition`.
    pub fn satisfies(&self, concrete: &str, condition: &str) -> bool {
        concrete == condition
            || self
                .possible_types
                .get(condition)
                .is_some_and(|set| set.contains(concrete))
    }

    /// Whether every possible type of `name` also satisfies `condition`.
    pub fn is_subtype(&self, name: &str, condition: &str) -> bool {
        if name == condition {
            return true;
        }
        let possible = self.possible_types(name);
        !possible.is_empty()
            && possible
                .iter()
                .all(|concrete| self.satisfies(concrete, condition))
    }

    pub fn implements(&self, type_name: &str, interface: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|ty| ty.implements().iter().any(|i| i == interface))
    }

    pub fn is_object(&self, name: &str) -> bool {
        matches!(self.types.get(name), Some(TypeDefinition::Object(_)))
    }

    pub fn is_abstract(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDefinition::Interface(_)) | Some(TypeDefinition::Union(_))
        )
    }

    pub fn is_composite(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDefinition::Object(_))
                | Some(TypeDefinition::Interface(_))
                | Some(TypeDefinition::Union(_))
        )
    }

    pub fn is_leaf(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDefinition::Scalar(_)) | Some(TypeDefinition::Enum(_))
        )
    }

    pub fn is_input_type(&self, name: &str) -> bool {
        matches!(
            self.types.get(name),
            Some(TypeDefinition::Scalar(_))
                | Some(TypeDefinition::Enum(_))
                | Some(TypeDefinition::InputObject(_))
        )
    }

    /// Scalars declared by the schema itself, excluding the built-ins.
    pub fn custom_scalars(&self) -> impl Iterator<Item = &str> {
        self.types.values().filter_map(|ty| match ty {
            TypeDefinition::Scalar(scalar) if !is_builtin_scalar(&scalar.name) => {
                Some(scalar.name.as_str())
            }
            _ => None,
        })
    }

    /// Render the registry back to a type-system document, extensions merged.
    pub fn to_document(&self) -> Document {
        let mut definitions = Vec::new();

        let default_roots = self.query_type == "Query"
            && self.mutation_type.as_deref().is_none_or(|m| m == "Mutation")
            && self
                .subscription_type
                .as_deref()
                .is_none_or(|s| s == "Subscription");
        if self.explicit_schema_definition
            || !default_roots
            || self.description.is_some()
            || !self.schema_directives.is_empty()
        {
            let mut root_operations = vec![root_operation(OperationKind::Query, &self.query_type)];
            if let Some(mutation) = &self.mutation_type {
                root_operations.push(root_operation(OperationKind::Mutation, mutation));
            }
            if let Some(subscription) = &self.subscription_type {
                root_operations.push(root_operation(OperationKind::Subscription, subscription));
            }
            definitions.push(Definition::Schema(SchemaDefinition {
                description: self.description.clone(),
                directives: self.schema_directives.clone(),
                root_operations,
                pos: Default::default(),
            }));
        }

        definitions.extend(
            self.types
                .values()
                .filter(|ty| !(is_builtin_scalar(ty.name()) && matches!(ty, TypeDefinition::Scalar(_))))
                .cloned()
                .map(Definition::Type),
        );
        definitions.extend(
            self.directives
                .values()
                .filter(|d| !is_builtin_directive(&d.name))
                .cloned()
                .map(Definition::Directive),
        );

        Document { definitions }
    }

    pub fn to_sdl(&self, indent: usize) -> String {
        Printer::with_indent(indent).print(&self.to_document())
    }
}

fn root_operation(kind: OperationKind, name: &str) -> RootOperation {
    RootOperation {
        kind,
        named_type: name.to_string(),
        pos: Default::default(),
    }
}

fn default_root_operations(types: &IndexMap<String, TypeDefinition>) -> Vec<RootOperation> {
    [
        (OperationKind::Query, "Query"),
        (OperationKind::Mutation, "Mutation"),
        (OperationKind::Subscription, "Subscription"),
    ]
    .into_iter()
    .filter(|(_, name)| types.contains_key(*name))
    .map(|(kind, name)| root_operation(kind, name))
    .collect()
}

fn apply_type_extension(
    types: &mut IndexMap<String, TypeDefinition>,
    extension: &TypeDefinition,
) -> Result<()> {
    let Some(target) = types.get_mut(extension.name()) else {
        return Err(Box::new(Error::MissingExtensionTarget {
            name: extension.name().to_string(),
            pos: extension.pos(),
        }));
    };

    let mismatch = |target: &TypeDefinition| {
        Box::new(Error::ExtensionKindMismatch {
            name: extension.name().to_string(),
            expected: extension.keyword(),
            found: target.keyword(),
            pos: extension.pos(),
        })
    };

    match (&mut *target, extension) {
        (TypeDefinition::Scalar(target), TypeDefinition::Scalar(ext)) => {
            target.directives.extend(ext.directives.iter().cloned());
        }
        (TypeDefinition::Object(target), TypeDefinition::Object(ext))
        | (TypeDefinition::Interface(target), TypeDefinition::Interface(ext)) => {
            target.implements.extend(ext.implements.iter().cloned());
            target.directives.extend(ext.directives.iter().cloned());
            target.fields.extend(ext.fields.iter().cloned());
        }
        (TypeDefinition::Union(target), TypeDefinition::Union(ext)) => {
            target.directives.extend(ext.directives.iter().cloned());
            target.members.extend(ext.members.iter().cloned());
        }
        (TypeDefinition::Enum(target), TypeDefinition::Enum(ext)) => {
            target.directives.extend(ext.directives.iter().cloned());
            target.values.extend(ext.values.iter().cloned());
        }
        (TypeDefinition::InputObject(target), TypeDefinition::InputObject(ext)) => {
            target.directives.extend(ext.directives.iter().cloned());
            target.fields.extend(ext.fields.iter().cloned());
        }
        (target, _) => return Err(mismatch(&*target)),
    }
    Ok(())
}

fn check_references(types: &IndexMap<String, TypeDefinition>) -> Result<()> {
    let check = |ty: &Type, referenced_by: String| -> Result<()> {
        if types.contains_key(ty.name()) {
            Ok(())
        } else {
            Err(Box::new(Error::UnknownType {
                name: ty.name().to_string(),
                referenced_by,
            }))
        }
    };

    for ty in types.values() {
        match ty {
            TypeDefinition::Object(object) | TypeDefinition::Interface(object) => {
                for interface in &object.implements {
                    check(&Type::named(interface.as_str()), format!("'{}'", object.name))?;
                }
                for field in &object.fields {
                    check(&field.ty, format!("'{}.{}'", object.name, field.name))?;
                    for arg in &field.arguments {
                        check(
                            &arg.ty,
                            format!("'{}.{}({}:)'", object.name, field.name, arg.name),
                        )?;
                    }
                }
            }
            TypeDefinition::Union(union) => {
                for member in &union.members {
                    check(&Type::named(member.as_str()), format!("union '{}'", union.name))?;
                }
            }
            TypeDefinition::InputObject(input) => {
                for field in &input.fields {
                    check(&field.ty, format!("'{}.{}'", input.name, field.name))?;
                }
            }
            TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
        }
    }
    Ok(())
}

fn index_possible_types(types: &IndexMap<String, TypeDefinition>) -> HashMap<String, BTreeSet<String>> {
    let mut possible: HashMap<String, BTreeSet<String>> = HashMap::new();

    for ty in types.values() {
        if let TypeDefinition::Object(object) = ty {
            for interface in &object.implements {
                possible
                    .entry(interface.clone())
                    .or_default()
                    .insert(object.name.clone());
            }
        }
    }
    for ty in types.values() {
        if let TypeDefinition::Union(union) = ty {
            let entry = possible.entry(union.name.clone()).or_default();
            for member in &union.members {
                if matches!(types.get(member), Some(TypeDefinition::Object(_))) {
                    entry.insert(member.clone());
                }
            }
        }
    }
    possible
}

#[cfg(test)]
mod tests {
    use super::*;

    const STARWARS: &str = r#"
        type Query {
          hero(episode: Episode): Character
          search(text: String!): [SearchResult]
        }
        enum Episode { NEWHOPE EMPIRE JEDI }
        interface Character { id: ID! name: String! friends: [Character] }
        type Human implements Character { id: ID! name: String! friends: [Character] height: Float }
        type Droid implements Character { id: ID! name: String! friends: [Character] primaryFunction: String }
        type Starship { id: ID! name: String! }
        union SearchResult = Human | Droid | Starship
        scalar Date
    "#;

    fn starwars() -> Schema {
        Schema::from_sdl(STARWARS, "starwars.graphqls").unwrap()
    }

    #[test]
    fn test_possible_types() {
        let schema = starwars();
        assert_eq!(
            schema.possible_types("Character").into_iter().collect::<Vec<_>>(),
            vec!["Droid", "Human"]
        );
        assert_eq!(schema.possible_types("SearchResult").len(), 3);
        assert_eq!(
            schema.possible_types("Human").into_iter().collect::<Vec<_>>(),
            vec!["Human"]
        );
        assert!(schema.possible_types("Episode").is_empty());
    }

    #[test]
    fn test_satisfies() {
        let schema = starwars();
        assert!(schema.satisfies("Droid", "Character"));
        assert!(schema.satisfies("Droid", "Droid"));
        assert!(!schema.satisfies("Starship", "Character"));
        assert!(schema.is_subtype("Human", "Character"));
        assert!(!schema.is_subtype("SearchResult", "Character"));
    }

    #[test]
    fn test_meta_fields() {
        let schema = starwars();
        assert_eq!(
            schema.field("Character", "__typename").map(|f| f.ty.to_string()),
            Some("String!".to_string())
        );
        assert!(schema.field("Query", "__schema").is_some());
        assert!(schema.field("Human", "__schema").is_none());
        assert!(schema.field("Episode", "__typename").is_none());
    }

    #[test]
    fn test_builtins_are_present() {
        let schema = starwars();
        assert!(schema.is_leaf("Boolean"));
        assert!(schema.directive("include").is_some());
        assert_eq!(schema.custom_scalars().collect::<Vec<_>>(), vec!["Date"]);
    }

    #[test]
    fn test_duplicate_type() {
        let err = Schema::from_sdl("type Query { a: Int } type Query { b: Int }", "s").unwrap_err();
        assert_eq!(err.to_string(), "type 'Query' is defined more than once (1:23)");
    }

    #[test]
    fn test_missing_query_root() {
        let err = Schema::from_sdl("type Foo { a: Int }", "s").unwrap_err();
        assert!(matches!(*err, Error::MissingQueryRoot));
    }

    #[test]
    fn test_root_must_exist() {
        let err = Schema::from_sdl("schema { query: Root } type Query { a: Int }", "s").unwrap_err();
        assert_eq!(err.to_string(), "query root type 'Root' is not defined");
    }

    #[test]
    fn test_extension_requires_target() {
        let err = Schema::from_sdl("type Query { a: Int } extend type Missing { b: Int }", "s")
            .unwrap_err();
        assert!(matches!(*err, Error::MissingExtensionTarget { .. }));
    }

    #[test]
    fn test_extension_kind_mismatch() {
        let err = Schema::from_sdl("type Query { a: Int } extend interface Query { b: Int }", "s")
            .unwrap_err();
        assert!(matches!(*err, Error::ExtensionKindMismatch { .. }));
    }

    #[test]
    fn test_unknown_field_type() {
        let err = Schema::from_sdl("type Query { a: Missing }", "s").unwrap_err();
        assert_eq!(err.to_string(), "unknown type 'Missing' referenced by 'Query.a'");
    }

    #[test]
    fn test_extensions_merge_before_indexing() {
        let schema = Schema::from_sdl(
            r#"
            extend type Query { extra: Int }
            type Query { a: Node }
            interface Node { id: ID! }
            type Thing { id: ID! }
            extend type Thing implements Node
            "#,
            "s",
        )
        .unwrap();
        assert!(schema.field("Query", "extra").is_some());
        assert!(schema.satisfies("Thing", "Node"));
    }
}

//! Adapters built from the IR's selection descriptors.

use std::collections::{BTreeSet, HashMap};

use quiver_ir::{BooleanExpression, FieldSet, IrType, ResponseField};
use serde_json::Number;

use crate::{
    AdapterError, ResponseObject, ResponsePath, ResponseValue, Result,
    adapter::{
        Adapter, AdapterContext, AnyAdapter, BooleanAdapter, FloatAdapter, IntAdapter,
        StringAdapter, expect_non_null,
    },
    json::{JsonReader, JsonWriter, Token},
};

/// Discriminant key of polymorphic objects.
pub const TYPENAME: &str = "__typename";

/// Decodes the objects of one composite field into [`ResponseObject`]s.
///
/// A field with several field sets is polymorphic: its objects must start
/// with `__typename`, which picks the branch whose possible types contain it,
/// or the default branch when none does. Each branch looks incoming keys up
/// in a name → index table built once here; unknown keys are skipped.
#[derive(Debug, Clone)]
pub struct ModelAdapter {
    polymorphic: bool,
    branches: Vec<Branch>,
}

#[derive(Debug, Clone)]
struct Branch {
    model_id: String,
    possible_types: BTreeSet<String>,
    is_default: bool,
    fields: Vec<FieldAdapter>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
struct FieldAdapter {
    response_name: String,
    condition: BooleanExpression,
    ty: TypeAdapter,
}

#[derive(Debug, Clone)]
enum TypeAdapter {
    NonNull(Box<TypeAdapter>),
    List(Box<TypeAdapter>),
    Scalar(String),
    Enum,
    Object(ModelAdapter),
}

impl ModelAdapter {
    pub fn new(field_sets: &[FieldSet]) -> Self {
        Self {
            polymorphic: field_sets.len() > 1,
            branches: field_sets.iter().map(Branch::new).collect(),
        }
    }

    /// Adapter for the objects of a composite `field`.
    pub fn for_field(field: &ResponseField) -> Self {
        Self::new(&field.field_sets)
    }

    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic
    }

    fn branch(&self, typename: &str) -> Option<&Branch> {
        self.branches
            .iter()
            .find(|branch| branch.possible_types.contains(typename))
            .or_else(|| self.branches.iter().find(|branch| branch.is_default))
    }

    fn read_typename(&self, reader: &mut dyn JsonReader, path: &ResponsePath) -> Result<String> {
        let found = match reader.peek()? {
            Token::Name => {
                let name = reader.next_name()?;
                if name == TYPENAME {
                    return reader.next_string();
                }
                format!("'{}'", name)
            }
            token => token.to_string(),
        };
        Err(AdapterError::malformed(
            path.clone(),
            format!("expected '{}' as the first key, found {}", TYPENAME, found),
        ))
    }
}

impl Adapter for ModelAdapter {
    type Value = ResponseObject;

    fn from_response(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<ResponseObject> {
        expect_non_null(reader)?;
        let path = reader.path();
        reader.begin_object()?;

        let typename = match self.polymorphic {
            true => Some(self.read_typename(reader, &path)?),
            false => None,
        };
        let branch = match &typename {
            Some(typename) => self.branch(typename),
            None => self.branches.first(),
        }
        .ok_or_else(|| AdapterError::malformed(path.clone(), "no model can hold this object"))?;

        let mut values: Vec<Option<ResponseValue>> = vec![None; branch.fields.len()];
        if let (Some(typename), Some(&i)) = (&typename, branch.index.get(TYPENAME)) {
            values[i] = Some(ResponseValue::String(typename.clone()));
        }
        while reader.has_next()? {
            let name = reader.next_name()?;
            match branch.index.get(&name) {
                Some(&i) => values[i] = Some(branch.fields[i].ty.from_response(reader, ctx)?),
                None => {
                    tracing::trace!(key = %name, model = %branch.model_id, "skipping unknown key");
                    reader.skip_value()?;
                }
            }
        }
        reader.end_object()?;

        let mut object = ResponseObject::new(&branch.model_id);
        for (field, value) in branch.fields.iter().zip(values) {
            match value {
                Some(value) => object.insert(&field.response_name, value),
                None if !ctx.evaluate(&field.condition) => {}
                None if field.ty.is_non_null() => {
                    return Err(AdapterError::unexpected_null(path.key(&field.response_name)));
                }
                None => object.insert(&field.response_name, ResponseValue::Null),
            }
        }
        let typename = typename.or_else(|| object.get(TYPENAME)?.as_str().map(str::to_string));
        Ok(match typename {
            Some(typename) => object.with_typename(typename),
            None => object,
        })
    }

    fn to_response(
        &self,
        writer: &mut dyn JsonWriter,
        ctx: &AdapterContext,
        object: &ResponseObject,
    ) -> Result<()> {
        let branch = if self.polymorphic {
            let typename = object.typename().ok_or_else(|| {
                AdapterError::malformed(writer.path(), "polymorphic object has no typename")
            })?;
            self.branch(typename)
        } else {
            self.branches.first()
        }
        .ok_or_else(|| AdapterError::malformed(writer.path(), "no model can hold this object"))?;

        writer.begin_object()?;
        if let (true, Some(typename)) = (self.polymorphic, object.typename()) {
            writer.name(TYPENAME)?;
            writer.string_value(typename)?;
        }
        for field in &branch.fields {
            if self.polymorphic && field.response_name == TYPENAME {
                continue;
            }
            match object.get(&field.response_name) {
                Some(value) => {
                    writer.name(&field.response_name)?;
                    field.ty.to_response(writer, ctx, value)?;
                }
                None if !ctx.evaluate(&field.condition) => {}
                None if field.ty.is_non_null() => {
                    return Err(AdapterError::unexpected_null(
                        writer.path().key(&field.response_name),
                    ));
                }
                None => {
                    writer.name(&field.response_name)?;
                    writer.null_value()?;
                }
            }
        }
        writer.end_object()
    }
}

impl Branch {
    fn new(set: &FieldSet) -> Self {
        let fields: Vec<FieldAdapter> = set.fields.iter().map(FieldAdapter::new).collect();
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.response_name.clone(), i))
            .collect();
        Self {
            model_id: set.model_id.clone(),
            possible_types: set.possible_types.clone(),
            is_default: set.is_default(),
            fields,
            index,
        }
    }
}

impl FieldAdapter {
    fn new(field: &ResponseField) -> Self {
        Self {
            response_name: field.response_name.clone(),
            condition: field.condition.clone(),
            ty: TypeAdapter::new(&field.ty, &field.field_sets),
        }
    }
}

impl TypeAdapter {
    fn new(ty: &IrType, field_sets: &[FieldSet]) -> Self {
        match ty {
            IrType::NonNull { inner } => TypeAdapter::NonNull(Box::new(Self::new(inner, field_sets))),
            IrType::List { inner } => TypeAdapter::List(Box::new(Self::new(inner, field_sets))),
            IrType::Scalar { name } => TypeAdapter::Scalar(name.clone()),
            IrType::Enum { .. } => TypeAdapter::Enum,
            // Input objects never appear in a selection; pass them through.
            IrType::InputObject { name } => TypeAdapter::Scalar(name.clone()),
            IrType::Model { .. } => TypeAdapter::Object(ModelAdapter::new(field_sets)),
        }
    }

    fn is_non_null(&self) -> bool {
        matches!(self, TypeAdapter::NonNull(_))
    }

    fn from_response(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<ResponseValue> {
        match self {
            TypeAdapter::NonNull(inner) => {
                expect_non_null(reader)?;
                inner.from_response(reader, ctx)
            }
            _ if reader.peek()? == Token::Null => {
                reader.next_null()?;
                Ok(ResponseValue::Null)
            }
            TypeAdapter::List(inner) => {
                reader.begin_array()?;
                let mut items = Vec::new();
                while reader.has_next()? {
                    items.push(inner.from_response(reader, ctx)?);
                }
                reader.end_array()?;
                Ok(ResponseValue::List(items))
            }
            TypeAdapter::Scalar(name) => read_scalar(name, reader, ctx),
            TypeAdapter::Enum => reader.next_string().map(ResponseValue::Enum),
            TypeAdapter::Object(model) => model.from_response(reader, ctx).map(ResponseValue::Object),
        }
    }

    fn to_response(
        &self,
        writer: &mut dyn JsonWriter,
        ctx: &AdapterContext,
        value: &ResponseValue,
    ) -> Result<()> {
        if let TypeAdapter::NonNull(inner) = self {
            if value.is_null() {
                return Err(AdapterError::unexpected_null(writer.path()));
            }
            return inner.to_response(writer, ctx, value);
        }
        if value.is_null() {
            return writer.null_value();
        }
        match (self, value) {
            (TypeAdapter::List(inner), ResponseValue::List(items)) => {
                writer.begin_array()?;
                for item in items {
                    inner.to_response(writer, ctx, item)?;
                }
                writer.end_array()
            }
            (TypeAdapter::Scalar(name), value) => write_scalar(name, writer, ctx, value),
            (TypeAdapter::Enum, ResponseValue::Enum(s) | ResponseValue::String(s)) => {
                writer.string_value(s)
            }
            (TypeAdapter::Object(model), ResponseValue::Object(object)) => {
                model.to_response(writer, ctx, object)
            }
            (adapter, value) => Err(AdapterError::malformed(
                writer.path(),
                format!("cannot encode {} as {}", value.kind(), adapter.kind()),
            )),
        }
    }

    fn kind(&self) -> &str {
        match self {
            TypeAdapter::NonNull(inner) => inner.kind(),
            TypeAdapter::List(_) => "a list",
            TypeAdapter::Scalar(name) => name,
            TypeAdapter::Enum => "an enum value",
            TypeAdapter::Object(_) => "an object",
        }
    }
}

fn read_scalar(name: &str, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<ResponseValue> {
    Ok(match name {
        "String" => ResponseValue::String(StringAdapter.from_response(reader, ctx)?),
        // Some servers send numeric ids.
        "ID" if reader.peek()? == Token::Number => ResponseValue::String(reader.next_number()?.to_string()),
        "ID" => ResponseValue::String(StringAdapter.from_response(reader, ctx)?),
        "Int" => ResponseValue::Int(IntAdapter.from_response(reader, ctx)?),
        "Float" => ResponseValue::Float(FloatAdapter.from_response(reader, ctx)?),
        "Boolean" => ResponseValue::Boolean(BooleanAdapter.from_response(reader, ctx)?),
        custom => ResponseValue::Custom(match ctx.scalars().get(custom) {
            Some(adapter) => adapter.from_response(reader, ctx)?,
            None => AnyAdapter.from_response(reader, ctx)?,
        }),
    })
}

fn write_scalar(
    name: &str,
    writer: &mut dyn JsonWriter,
    ctx: &AdapterContext,
    value: &ResponseValue,
) -> Result<()> {
    match (name, value) {
        ("String" | "ID", ResponseValue::String(s)) => writer.string_value(s),
        ("Int", ResponseValue::Int(n)) => IntAdapter.to_response(writer, ctx, n),
        ("Float", ResponseValue::Float(f)) => FloatAdapter.to_response(writer, ctx, f),
        ("Float", ResponseValue::Int(n)) => writer.number_value(Number::from(*n)),
        ("Boolean", ResponseValue::Boolean(b)) => BooleanAdapter.to_response(writer, ctx, b),
        (custom, ResponseValue::Custom(value)) => match ctx.scalars().get(custom) {
            Some(adapter) => adapter.to_response(writer, ctx, value),
            None => AnyAdapter.to_response(writer, ctx, value),
        },
        (name, value) => Err(AdapterError::malformed(
            writer.path(),
            format!("cannot encode {} as {}", value.kind(), name),
        )),
    }
}

//! Whole-response decoding for one compiled operation.

use std::collections::BTreeSet;

use quiver_ir::{FieldSet, IrOperation, IrValue, OperationType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{
    AdapterError, ResponseObject, Result,
    adapter::{Adapter, AdapterContext},
    json::{JsonReader, JsonWriter, TextReader, Token, ValueReader},
    model::ModelAdapter,
};

/// A GraphQL response: `{"data": ..., "errors": [...], "extensions": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub data: Option<ResponseObject>,
    pub errors: Vec<GraphQLError>,
    pub extensions: Map<String, Value>,
}

impl Response {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// An entry of the response's `errors` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Decodes and encodes the responses of one operation.
#[derive(Debug, Clone)]
pub struct OperationAdapter {
    name: String,
    operation_type: OperationType,
    data: ModelAdapter,
    defaults: Map<String, Value>,
}

impl OperationAdapter {
    pub fn new(operation: &IrOperation) -> Self {
        let model_id = operation
            .data_model_groups
            .first()
            .map(|group| group.base_model_id.clone())
            .unwrap_or_else(|| format!("{}.Data", operation.name));
        let root = FieldSet {
            type_conditions: None,
            possible_types: BTreeSet::new(),
            model_id,
            fields: operation.selections.clone(),
        };
        let defaults = operation
            .variables
            .iter()
            .filter_map(|variable| {
                let value = variable.default_value.as_ref()?;
                Some((variable.name.clone(), json_value(value)))
            })
            .collect();
        Self {
            name: operation.name.clone(),
            operation_type: operation.operation_type,
            data: ModelAdapter::new(&[root]),
            defaults,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// `variables` completed with the operation's declared defaults.
    pub fn variables(&self, mut variables: Map<String, Value>) -> Map<String, Value> {
        for (name, value) in &self.defaults {
            if !variables.contains_key(name) {
                variables.insert(name.clone(), value.clone());
            }
        }
        variables
    }

    /// Decode the `data` object under the cursor.
    pub fn decode_data(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<ResponseObject> {
        self.data.from_response(reader, ctx)
    }

    pub fn encode_data(
        &self,
        writer: &mut dyn JsonWriter,
        ctx: &AdapterContext,
        data: &ResponseObject,
    ) -> Result<()> {
        self.data.to_response(writer, ctx, data)
    }

    /// Decode a full response. Unknown top-level keys are skipped.
    pub fn parse_response(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<Response> {
        let path = reader.path();
        let mut response = Response {
            data: None,
            errors: Vec::new(),
            extensions: Map::new(),
        };
        let mut seen_data = false;
        let mut seen_errors = false;

        reader.begin_object()?;
        while reader.has_next()? {
            match reader.next_name()?.as_str() {
                "data" => {
                    seen_data = true;
                    if reader.peek()? == Token::Null {
                        reader.next_null()?;
                    } else {
                        response.data = Some(self.decode_data(reader, ctx)?);
                    }
                }
                "errors" => {
                    seen_errors = true;
                    match reader.read_value()? {
                        Value::Null => {}
                        errors => response.errors = serde_json::from_value(errors)?,
                    }
                }
                "extensions" => match reader.read_value()? {
                    Value::Object(extensions) => response.extensions = extensions,
                    Value::Null => {}
                    _ => {
                        return Err(AdapterError::malformed(
                            path.key("extensions"),
                            "expected an object",
                        ));
                    }
                },
                _ => reader.skip_value()?,
            }
        }
        reader.end_object()?;

        if !seen_data && !seen_errors {
            return Err(AdapterError::malformed(
                path,
                "response has neither 'data' nor 'errors'",
            ));
        }
        tracing::debug!(
            operation = %self.name,
            errors = response.errors.len(),
            "decoded response"
        );
        Ok(response)
    }

    pub fn parse_response_str(&self, text: &str, ctx: &AdapterContext) -> Result<Response> {
        self.parse_response(&mut TextReader::new(text), ctx)
    }

    pub fn parse_response_value(&self, value: Value, ctx: &AdapterContext) -> Result<Response> {
        self.parse_response(&mut ValueReader::new(value), ctx)
    }
}

fn json_value(value: &IrValue) -> Value {
    match value {
        IrValue::Null | IrValue::Variable(_) => Value::Null,
        IrValue::Boolean(b) => Value::Bool(*b),
        IrValue::Int(n) => Value::Number(Number::from(*n)),
        IrValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        IrValue::String(s) | IrValue::Enum(s) => Value::String(s.clone()),
        IrValue::List(items) => Value::Array(items.iter().map(json_value).collect()),
        IrValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), json_value(value)))
                .collect(),
        ),
    }
}

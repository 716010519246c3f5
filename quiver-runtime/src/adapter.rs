//! The adapter contract and its built-in implementations.

use std::{collections::HashMap, fmt, sync::Arc};

use quiver_ir::BooleanExpression;
use serde_json::{Map, Number, Value};

use crate::{
    AdapterError, Result,
    json::{JsonReader, JsonWriter, Token},
};

/// Decodes values of one type from a response and encodes them back.
///
/// Adapters are non-null: reading `null` fails with
/// [`AdapterError::UnexpectedNullValue`]. Wrap an adapter with
/// [`nullable`](Adapter::nullable) to accept it.
pub trait Adapter {
    type Value;

    fn from_response(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext)
    -> Result<Self::Value>;

    fn to_response(
        &self,
        writer: &mut dyn JsonWriter,
        ctx: &AdapterContext,
        value: &Self::Value,
    ) -> Result<()>;

    fn list(self) -> ListAdapter<Self>
    where
        Self: Sized,
    {
        ListAdapter(self)
    }

    fn nullable(self) -> NullableAdapter<Self>
    where
        Self: Sized,
    {
        NullableAdapter(self)
    }
}

/// Adapter for a custom scalar, shared between every field of that scalar.
pub type ScalarAdapter = Arc<dyn Adapter<Value = Value> + Send + Sync>;

/// Custom scalar adapters keyed by GraphQL scalar name.
///
/// Scalars without an adapter pass through as raw JSON.
#[derive(Clone, Default)]
pub struct CustomScalarAdapters {
    adapters: HashMap<String, ScalarAdapter>,
}

impl CustomScalarAdapters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        scalar: impl Into<String>,
        adapter: impl Adapter<Value = Value> + Send + Sync + 'static,
    ) {
        self.adapters.insert(scalar.into(), Arc::new(adapter));
    }

    pub fn with(
        mut self,
        scalar: impl Into<String>,
        adapter: impl Adapter<Value = Value> + Send + Sync + 'static,
    ) -> Self {
        self.register(scalar, adapter);
        self
    }

    pub fn get(&self, scalar: &str) -> Option<&ScalarAdapter> {
        self.adapters.get(scalar)
    }
}

impl fmt::Debug for CustomScalarAdapters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.adapters.keys().collect();
        names.sort();
        f.debug_struct("CustomScalarAdapters")
            .field("scalars", &names)
            .finish()
    }
}

/// State shared by every adapter of one decode or encode call.
#[derive(Debug, Clone, Default)]
pub struct AdapterContext {
    variables: Map<String, Value>,
    scalars: CustomScalarAdapters,
}

impl AdapterContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation variables, used to evaluate `@skip` and `@include`.
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_scalars(mut self, scalars: CustomScalarAdapters) -> Self {
        self.scalars = scalars;
        self
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    pub fn scalars(&self) -> &CustomScalarAdapters {
        &self.scalars
    }

    /// Whether a field with `condition` was requested. Missing or
    /// non-boolean variables count as false.
    pub fn evaluate(&self, condition: &BooleanExpression) -> bool {
        condition.evaluate(&|name| {
            self.variables
                .get(name)
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
    }
}

/// Fail with `UnexpectedNullValue` if the next value is null.
pub(crate) fn expect_non_null(reader: &mut dyn JsonReader) -> Result<()> {
    if reader.peek()? == Token::Null {
        return Err(AdapterError::unexpected_null(reader.path()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringAdapter;

impl Adapter for StringAdapter {
    type Value = String;

    fn from_response(&self, reader: &mut dyn JsonReader, _ctx: &AdapterContext) -> Result<String> {
        expect_non_null(reader)?;
        reader.next_string()
    }

    fn to_response(&self, writer: &mut dyn JsonWriter, _ctx: &AdapterContext, value: &String) -> Result<()> {
        writer.string_value(value)
    }
}

/// GraphQL `Int`: a signed 32-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntAdapter;

impl Adapter for IntAdapter {
    type Value = i32;

    fn from_response(&self, reader: &mut dyn JsonReader, _ctx: &AdapterContext) -> Result<i32> {
        expect_non_null(reader)?;
        let path = reader.path();
        let number = reader.next_number()?;
        number
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| {
                AdapterError::malformed(path, format!("expected a 32-bit integer, found {}", number))
            })
    }

    fn to_response(&self, writer: &mut dyn JsonWriter, _ctx: &AdapterContext, value: &i32) -> Result<()> {
        writer.number_value(Number::from(*value))
    }
}

/// GraphQL `Float`. Integers are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatAdapter;

impl Adapter for FloatAdapter {
    type Value = f64;

    fn from_response(&self, reader: &mut dyn JsonReader, _ctx: &AdapterContext) -> Result<f64> {
        expect_non_null(reader)?;
        let path = reader.path();
        let number = reader.next_number()?;
        number
            .as_f64()
            .ok_or_else(|| AdapterError::malformed(path, format!("expected a float, found {}", number)))
    }

    fn to_response(&self, writer: &mut dyn JsonWriter, _ctx: &AdapterContext, value: &f64) -> Result<()> {
        let number = Number::from_f64(*value).ok_or_else(|| {
            AdapterError::malformed(writer.path(), format!("cannot encode {} as a float", value))
        })?;
        writer.number_value(number)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanAdapter;

impl Adapter for BooleanAdapter {
    type Value = bool;

    fn from_response(&self, reader: &mut dyn JsonReader, _ctx: &AdapterContext) -> Result<bool> {
        expect_non_null(reader)?;
        reader.next_boolean()
    }

    fn to_response(&self, writer: &mut dyn JsonWriter, _ctx: &AdapterContext, value: &bool) -> Result<()> {
        writer.boolean_value(*value)
    }
}

/// Any JSON value, kept as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyAdapter;

impl Adapter for AnyAdapter {
    type Value = Value;

    fn from_response(&self, reader: &mut dyn JsonReader, _ctx: &AdapterContext) -> Result<Value> {
        expect_non_null(reader)?;
        reader.read_value()
    }

    fn to_response(&self, writer: &mut dyn JsonWriter, _ctx: &AdapterContext, value: &Value) -> Result<()> {
        if value.is_null() {
            return Err(AdapterError::unexpected_null(writer.path()));
        }
        writer.write_value(value)
    }
}

/// Lists of the inner adapter's values.
#[derive(Debug, Clone, Copy)]
pub struct ListAdapter<A>(pub A);

impl<A: Adapter> Adapter for ListAdapter<A> {
    type Value = Vec<A::Value>;

    fn from_response(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<Self::Value> {
        expect_non_null(reader)?;
        reader.begin_array()?;
        let mut items = Vec::new();
        while reader.has_next()? {
            items.push(self.0.from_response(reader, ctx)?);
        }
        reader.end_array()?;
        Ok(items)
    }

    fn to_response(
        &self,
        writer: &mut dyn JsonWriter,
        ctx: &AdapterContext,
        value: &Self::Value,
    ) -> Result<()> {
        writer.begin_array()?;
        for item in value {
            self.0.to_response(writer, ctx, item)?;
        }
        writer.end_array()
    }
}

/// Maps JSON `null` to `None` and back.
#[derive(Debug, Clone, Copy)]
pub struct NullableAdapter<A>(pub A);

impl<A: Adapter> Adapter for NullableAdapter<A> {
    type Value = Option<A::Value>;

    fn from_response(&self, reader: &mut dyn JsonReader, ctx: &AdapterContext) -> Result<Self::Value> {
        if reader.peek()? == Token::Null {
            reader.next_null()?;
            return Ok(None);
        }
        self.0.from_response(reader, ctx).map(Some)
    }

    fn to_response(
        &self,
        writer: &mut dyn JsonWriter,
        ctx: &AdapterContext,
        value: &Self::Value,
    ) -> Result<()> {
        match value {
            Some(value) => self.0.to_response(writer, ctx, value),
            None => writer.null_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::json::{TextReader, ValueReader, ValueWriter};

    /// Accepts `YYYY-MM-DD` strings only.
    struct DateAdapter;

    impl Adapter for DateAdapter {
        type Value = Value;

        fn from_response(&self, reader: &mut dyn JsonReader, _ctx: &AdapterContext) -> Result<Value> {
            expect_non_null(reader)?;
            let path = reader.path();
            let date = reader.next_string()?;
            let valid = date.len() == 10
                && date
                    .char_indices()
                    .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
            if !valid {
                return Err(AdapterError::malformed(path, format!("'{}' is not a date", date)));
            }
            Ok(Value::String(date))
        }

        fn to_response(&self, writer: &mut dyn JsonWriter, _ctx: &AdapterContext, value: &Value) -> Result<()> {
            writer.write_value(value)
        }
    }

    #[test]
    fn test_nullable_list_of_ints() {
        let adapter = IntAdapter.nullable().list();
        let ctx = AdapterContext::new();
        let mut reader = TextReader::new("[1, null, 3]");
        let values = adapter.from_response(&mut reader, &ctx).unwrap();
        assert_eq!(values, [Some(1), None, Some(3)]);

        let mut writer = ValueWriter::new();
        adapter.to_response(&mut writer, &ctx, &values).unwrap();
        assert_eq!(writer.into_value().unwrap(), json!([1, null, 3]));
    }

    #[test]
    fn test_null_in_non_null_list() {
        let adapter = StringAdapter.list();
        let mut reader = ValueReader::new(json!(["a", null]));
        let err = adapter.from_response(&mut reader, &AdapterContext::new()).unwrap_err();
        assert_eq!(err.to_string(), "unexpected null value at '[1]'");
    }

    #[test]
    fn test_int_out_of_range() {
        let mut reader = ValueReader::new(json!(4294967296u64));
        let err = IntAdapter.from_response(&mut reader, &AdapterContext::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed response at '$': expected a 32-bit integer, found 4294967296"
        );
    }

    #[test]
    fn test_float_accepts_integers() {
        let mut reader = ValueReader::new(json!(3));
        assert_eq!(FloatAdapter.from_response(&mut reader, &AdapterContext::new()).unwrap(), 3.0);
    }

    #[test]
    fn test_non_finite_float() {
        let mut writer = ValueWriter::new();
        assert!(
            FloatAdapter
                .to_response(&mut writer, &AdapterContext::new(), &f64::NAN)
                .is_err()
        );
    }

    #[test]
    fn test_custom_scalar_registry() {
        let scalars = CustomScalarAdapters::new().with("Date", DateAdapter);
        let adapter = scalars.get("Date").unwrap();
        let ctx = AdapterContext::new();

        let mut reader = ValueReader::new(json!("2024-05-04"));
        assert_eq!(adapter.from_response(&mut reader, &ctx).unwrap(), json!("2024-05-04"));

        let mut reader = ValueReader::new(json!("May 4th"));
        assert!(adapter.from_response(&mut reader, &ctx).is_err());
        assert!(scalars.get("Url").is_none());
    }

    #[test]
    fn test_evaluate_conditions() {
        let mut variables = Map::new();
        variables.insert("withFriends".to_string(), json!(true));
        let ctx = AdapterContext::new().with_variables(variables);

        assert!(ctx.evaluate(&BooleanExpression::True));
        assert!(ctx.evaluate(&BooleanExpression::variable("withFriends")));
        assert!(!ctx.evaluate(&BooleanExpression::variable("missing")));
        assert!(!ctx.evaluate(&BooleanExpression::variable("withFriends").negate()));
    }
}

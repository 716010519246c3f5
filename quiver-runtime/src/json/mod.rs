//! Streaming JSON cursors the adapters read from and write to.
//!
//! [`JsonReader`] and [`JsonWriter`] describe a pull-style cursor over one
//! JSON document. Both track the [`ResponsePath`] of the value under the
//! cursor so adapters can point errors at the offending field.

mod text;
mod value;
mod writer;

use std::fmt;

use serde_json::{Map, Number, Value};

pub use text::TextReader;
pub use value::ValueReader;
pub use writer::ValueWriter;

use crate::{AdapterError, ResponsePath, Result};

/// Kind of the next token under a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Name,
    String,
    Number,
    Boolean,
    Null,
    EndDocument,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::BeginObject => "an object",
            Token::EndObject => "the end of an object",
            Token::BeginArray => "an array",
            Token::EndArray => "the end of an array",
            Token::Name => "a name",
            Token::String => "a string",
            Token::Number => "a number",
            Token::Boolean => "a boolean",
            Token::Null => "null",
            Token::EndDocument => "the end of the document",
        };
        f.write_str(name)
    }
}

/// Pull cursor over a JSON document.
///
/// Reading a value of the wrong kind fails with
/// [`AdapterError::MalformedResponse`] and leaves the cursor where it was.
pub trait JsonReader {
    fn peek(&mut self) -> Result<Token>;

    fn begin_object(&mut self) -> Result<()>;

    fn end_object(&mut self) -> Result<()>;

    fn begin_array(&mut self) -> Result<()>;

    fn end_array(&mut self) -> Result<()>;

    fn next_name(&mut self) -> Result<String>;

    fn next_string(&mut self) -> Result<String>;

    fn next_number(&mut self) -> Result<Number>;

    fn next_boolean(&mut self) -> Result<bool>;

    fn next_null(&mut self) -> Result<()>;

    /// Skip the next value, nested content included.
    fn skip_value(&mut self) -> Result<()>;

    /// Path of the value under the cursor.
    fn path(&self) -> ResponsePath;

    /// Whether the current object or array has more elements.
    fn has_next(&mut self) -> Result<bool> {
        Ok(!matches!(
            self.peek()?,
            Token::EndObject | Token::EndArray | Token::EndDocument
        ))
    }

    /// Read the next value, nested content included.
    fn read_value(&mut self) -> Result<Value> {
        match self.peek()? {
            Token::BeginObject => {
                self.begin_object()?;
                let mut map = Map::new();
                while self.has_next()? {
                    let name = self.next_name()?;
                    map.insert(name, self.read_value()?);
                }
                self.end_object()?;
                Ok(Value::Object(map))
            }
            Token::BeginArray => {
                self.begin_array()?;
                let mut items = Vec::new();
                while self.has_next()? {
                    items.push(self.read_value()?);
                }
                self.end_array()?;
                Ok(Value::Array(items))
            }
            Token::String => self.next_string().map(Value::String),
            Token::Number => self.next_number().map(Value::Number),
            Token::Boolean => self.next_boolean().map(Value::Bool),
            Token::Null => self.next_null().map(|()| Value::Null),
            token => Err(self.unexpected("a value", token)),
        }
    }

    /// Error for finding `found` where `expected` was required.
    fn unexpected(&self, expected: &str, found: Token) -> AdapterError {
        AdapterError::malformed(self.path(), format!("expected {}, found {}", expected, found))
    }
}

/// Push cursor building a JSON document.
pub trait JsonWriter {
    fn begin_object(&mut self) -> Result<()>;

    fn end_object(&mut self) -> Result<()>;

    fn begin_array(&mut self) -> Result<()>;

    fn end_array(&mut self) -> Result<()>;

    /// Name of the next member of the current object.
    fn name(&mut self, name: &str) -> Result<()>;

    fn string_value(&mut self, value: &str) -> Result<()>;

    fn number_value(&mut self, value: Number) -> Result<()>;

    fn boolean_value(&mut self, value: bool) -> Result<()>;

    fn null_value(&mut self) -> Result<()>;

    /// Path of the value about to be written.
    fn path(&self) -> ResponsePath;

    /// Write `value`, nested content included.
    fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Null => self.null_value(),
            Value::Bool(b) => self.boolean_value(*b),
            Value::Number(n) => self.number_value(n.clone()),
            Value::String(s) => self.string_value(s),
            Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.write_value(item)?;
                }
                self.end_array()
            }
            Value::Object(map) => {
                self.begin_object()?;
                for (name, value) in map {
                    self.name(name)?;
                    self.write_value(value)?;
                }
                self.end_object()
            }
        }
    }
}

fn token_of(value: &Value) -> Token {
    match value {
        Value::Null => Token::Null,
        Value::Bool(_) => Token::Boolean,
        Value::Number(_) => Token::Number,
        Value::String(_) => Token::String,
        Value::Array(_) => Token::BeginArray,
        Value::Object(_) => Token::BeginObject,
    }
}

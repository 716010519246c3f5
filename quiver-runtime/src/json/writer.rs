//! Writer building a `serde_json::Value`.

use serde_json::{Map, Number, Value};

use super::JsonWriter;
use crate::{AdapterError, PathElement, ResponsePath, Result};

#[derive(Debug)]
enum Frame {
    Object { members: Map<String, Value>, name: Option<String> },
    Array(Vec<Value>),
}

/// [`JsonWriter`] that assembles the document in memory.
#[derive(Debug, Default)]
pub struct ValueWriter {
    frames: Vec<Frame>,
    root: Option<Value>,
}

impl ValueWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The written document. Fails if an object or array is still open or
    /// nothing was written.
    pub fn into_value(self) -> Result<Value> {
        if !self.frames.is_empty() {
            return Err(AdapterError::malformed(self.path(), "unclosed object or array"));
        }
        self.root
            .ok_or_else(|| AdapterError::malformed(ResponsePath::new(), "nothing was written"))
    }

    fn push(&mut self, value: Value) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Object { members, name }) => match name.take() {
                Some(name) => {
                    members.insert(name, value);
                    Ok(())
                }
                None => Err(AdapterError::malformed(self.path(), "value written without a name")),
            },
            Some(Frame::Array(items)) => {
                items.push(value);
                Ok(())
            }
            None if self.root.is_some() => Err(AdapterError::malformed(
                ResponsePath::new(),
                "document already has a root value",
            )),
            None => {
                self.root = Some(value);
                Ok(())
            }
        }
    }
}

impl JsonWriter for ValueWriter {
    fn begin_object(&mut self) -> Result<()> {
        self.frames.push(Frame::Object {
            members: Map::new(),
            name: None,
        });
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        match self.frames.pop() {
            Some(Frame::Object {
                members,
                name: None,
            }) => self.push(Value::Object(members)),
            Some(frame) => {
                let message = match &frame {
                    Frame::Object { name: Some(name), .. } => format!("no value written for '{}'", name),
                    _ => "end_object called inside an array".to_string(),
                };
                self.frames.push(frame);
                Err(AdapterError::malformed(self.path(), message))
            }
            None => Err(AdapterError::malformed(self.path(), "no object to end")),
        }
    }

    fn begin_array(&mut self) -> Result<()> {
        self.frames.push(Frame::Array(Vec::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        match self.frames.pop() {
            Some(Frame::Array(items)) => self.push(Value::Array(items)),
            Some(frame) => {
                self.frames.push(frame);
                Err(AdapterError::malformed(self.path(), "end_array called inside an object"))
            }
            None => Err(AdapterError::malformed(self.path(), "no array to end")),
        }
    }

    fn name(&mut self, name: &str) -> Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Object { name: slot @ None, .. }) => {
                *slot = Some(name.to_string());
                Ok(())
            }
            _ => Err(AdapterError::malformed(
                self.path(),
                format!("cannot write name '{}' here", name),
            )),
        }
    }

    fn string_value(&mut self, value: &str) -> Result<()> {
        self.push(Value::String(value.to_string()))
    }

    fn number_value(&mut self, value: Number) -> Result<()> {
        self.push(Value::Number(value))
    }

    fn boolean_value(&mut self, value: bool) -> Result<()> {
        self.push(Value::Bool(value))
    }

    fn null_value(&mut self) -> Result<()> {
        self.push(Value::Null)
    }

    fn path(&self) -> ResponsePath {
        self.frames
            .iter()
            .filter_map(|frame| match frame {
                Frame::Object { name, .. } => name.clone().map(PathElement::Key),
                Frame::Array(items) => Some(PathElement::Index(items.len())),
            })
            .collect()
    }
}

//! Reader over an in-memory `serde_json::Value`.

use std::iter::Peekable;

use serde_json::{Number, Value, map};

use super::{JsonReader, Token, token_of};
use crate::{AdapterError, PathElement, ResponsePath, Result};

/// [`JsonReader`] over an already parsed document.
///
/// Values are moved out of the document as they are read, so nothing is
/// cloned.
#[derive(Debug)]
pub struct ValueReader {
    /// The value the next read consumes: the root, or the value of the
    /// member whose name was just read.
    pending: Option<Value>,
    frames: Vec<Frame>,
}

#[derive(Debug)]
struct Frame {
    members: Members,
    element: Option<PathElement>,
}

#[derive(Debug)]
enum Members {
    Object(Peekable<map::IntoIter>),
    Array(Peekable<std::vec::IntoIter<Value>>),
}

impl ValueReader {
    pub fn new(value: Value) -> Self {
        Self {
            pending: Some(value),
            frames: Vec::new(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let found = self.peek()?;
        if found != expected {
            return Err(self.unexpected(&expected.to_string(), found));
        }
        Ok(())
    }

    /// Move the next value out of the document. Callers peek first.
    fn take(&mut self) -> Result<Value> {
        if let Some(value) = self.pending.take() {
            return Ok(value);
        }
        match self.frames.last_mut() {
            Some(Frame {
                members: Members::Array(items),
                ..
            }) => items.next(),
            _ => None,
        }
        .ok_or_else(|| AdapterError::malformed(self.path(), "no value to read"))
    }

    fn value_done(&mut self) {
        if let Some(Frame {
            element: Some(PathElement::Index(index)),
            ..
        }) = self.frames.last_mut()
        {
            *index += 1;
        }
    }
}

impl JsonReader for ValueReader {
    fn peek(&mut self) -> Result<Token> {
        if let Some(value) = &self.pending {
            return Ok(token_of(value));
        }
        Ok(match self.frames.last_mut() {
            Some(Frame {
                members: Members::Object(members),
                ..
            }) => match members.peek() {
                Some(_) => Token::Name,
                None => Token::EndObject,
            },
            Some(Frame {
                members: Members::Array(items),
                ..
            }) => items.peek().map_or(Token::EndArray, token_of),
            None => Token::EndDocument,
        })
    }

    fn begin_object(&mut self) -> Result<()> {
        self.expect(Token::BeginObject)?;
        if let Value::Object(members) = self.take()? {
            self.frames.push(Frame {
                members: Members::Object(members.into_iter().peekable()),
                element: None,
            });
        }
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.expect(Token::EndObject)?;
        self.frames.pop();
        self.value_done();
        Ok(())
    }

    fn begin_array(&mut self) -> Result<()> {
        self.expect(Token::BeginArray)?;
        if let Value::Array(items) = self.take()? {
            self.frames.push(Frame {
                members: Members::Array(items.into_iter().peekable()),
                element: Some(PathElement::Index(0)),
            });
        }
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        self.expect(Token::EndArray)?;
        self.frames.pop();
        self.value_done();
        Ok(())
    }

    fn next_name(&mut self) -> Result<String> {
        self.expect(Token::Name)?;
        let Some(frame) = self.frames.last_mut() else {
            return Err(AdapterError::malformed(self.path(), "no object to read"));
        };
        let Members::Object(members) = &mut frame.members else {
            return Err(AdapterError::malformed(self.path(), "no object to read"));
        };
        let Some((name, value)) = members.next() else {
            return Err(AdapterError::malformed(self.path(), "no member to read"));
        };
        frame.element = Some(PathElement::Key(name.clone()));
        self.pending = Some(value);
        Ok(name)
    }

    fn next_string(&mut self) -> Result<String> {
        self.expect(Token::String)?;
        let value = self.take()?;
        self.value_done();
        match value {
            Value::String(s) => Ok(s),
            _ => Err(AdapterError::malformed(self.path(), "expected a string")),
        }
    }

    fn next_number(&mut self) -> Result<Number> {
        self.expect(Token::Number)?;
        let value = self.take()?;
        self.value_done();
        match value {
            Value::Number(n) => Ok(n),
            _ => Err(AdapterError::malformed(self.path(), "expected a number")),
        }
    }

    fn next_boolean(&mut self) -> Result<bool> {
        self.expect(Token::Boolean)?;
        let value = self.take()?;
        self.value_done();
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(AdapterError::malformed(self.path(), "expected a boolean")),
        }
    }

    fn next_null(&mut self) -> Result<()> {
        self.expect(Token::Null)?;
        self.take()?;
        self.value_done();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<()> {
        match self.peek()? {
            Token::Name => {
                self.next_name()?;
                self.skip_value()
            }
            token @ (Token::EndObject | Token::EndArray | Token::EndDocument) => {
                Err(self.unexpected("a value", token))
            }
            _ => {
                self.take()?;
                self.value_done();
                Ok(())
            }
        }
    }

    fn path(&self) -> ResponsePath {
        self.frames
            .iter()
            .filter_map(|frame| frame.element.clone())
            .collect()
    }
}

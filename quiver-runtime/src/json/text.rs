//! Incremental reader over JSON text.

use serde_json::Number;

use super::{JsonReader, Token};
use crate::{AdapterError, PathElement, ResponsePath, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// A name was read, its value was not.
    DanglingName,
    NonEmptyObject,
}

/// [`JsonReader`] that tokenizes JSON text as it is read.
///
/// Nothing is parsed ahead of the cursor, so a response can be decoded
/// without building a `serde_json::Value` first.
#[derive(Debug)]
pub struct TextReader<'a> {
    src: &'a str,
    pos: usize,
    scopes: Vec<(Scope, Option<PathElement>)>,
    /// Whether the root value was started.
    started: bool,
    peeked: Option<Token>,
}

impl<'a> TextReader<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            scopes: Vec::new(),
            started: false,
            peeked: None,
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> AdapterError {
        let before = &self.src[..self.pos.min(self.src.len())];
        let line = before.matches('\n').count() + 1;
        let column = before.rfind('\n').map_or(before.len(), |nl| before.len() - nl - 1) + 1;
        AdapterError::malformed(
            self.path(),
            format!("{} at line {} column {}", message, line, column),
        )
    }

    fn byte(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> Option<u8> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.byte() {
            self.pos += 1;
        }
        self.byte()
    }

    fn set_scope(&mut self, scope: Scope) {
        if let Some(top) = self.scopes.last_mut() {
            top.0 = scope;
        }
    }

    fn do_peek(&mut self) -> Result<Token> {
        match self.scopes.last().map(|(scope, _)| *scope) {
            Some(Scope::EmptyArray) => {
                self.set_scope(Scope::NonEmptyArray);
                if self.skip_whitespace() == Some(b']') {
                    return Ok(Token::EndArray);
                }
            }
            Some(Scope::NonEmptyArray) => match self.skip_whitespace() {
                Some(b']') => return Ok(Token::EndArray),
                Some(b',') => self.pos += 1,
                _ => return Err(self.error("expected ',' or ']'")),
            },
            Some(scope @ (Scope::EmptyObject | Scope::NonEmptyObject)) => {
                let mut next = self.skip_whitespace();
                if next == Some(b'}') {
                    return Ok(Token::EndObject);
                }
                if scope == Scope::NonEmptyObject {
                    if next != Some(b',') {
                        return Err(self.error("expected ',' or '}'"));
                    }
                    self.pos += 1;
                    next = self.skip_whitespace();
                }
                if next != Some(b'"') {
                    return Err(self.error("expected a name"));
                }
                self.set_scope(Scope::DanglingName);
                return Ok(Token::Name);
            }
            Some(Scope::DanglingName) => {
                if self.skip_whitespace() != Some(b':') {
                    return Err(self.error("expected ':'"));
                }
                self.pos += 1;
                self.set_scope(Scope::NonEmptyObject);
            }
            None if self.started => {
                return match self.skip_whitespace() {
                    None => Ok(Token::EndDocument),
                    Some(_) => Err(self.error("unexpected trailing characters")),
                };
            }
            None => self.started = true,
        }

        match self.skip_whitespace() {
            Some(b'{') => Ok(Token::BeginObject),
            Some(b'[') => Ok(Token::BeginArray),
            Some(b'"') => Ok(Token::String),
            Some(b't' | b'f') => Ok(Token::Boolean),
            Some(b'n') => Ok(Token::Null),
            Some(b'-' | b'0'..=b'9') => Ok(Token::Number),
            Some(_) => {
                let c = self.src[self.pos..].chars().next().unwrap_or_default();
                Err(self.error(format!("unexpected character '{}'", c)))
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        let found = self.peek()?;
        if found != expected {
            return Err(self.unexpected(&expected.to_string(), found));
        }
        self.peeked = None;
        Ok(())
    }

    fn value_done(&mut self) {
        if let Some((_, Some(PathElement::Index(index)))) = self.scopes.last_mut() {
            *index += 1;
        }
    }

    /// Read the string starting at the opening quote under the cursor.
    fn read_string(&mut self) -> Result<String> {
        let src = self.src;
        let bytes = src.as_bytes();
        self.pos += 1;
        let mut out = String::new();
        loop {
            let start = self.pos;
            while let Some(&b) = bytes.get(self.pos) {
                if b == b'"' || b == b'\\' || b < 0x20 {
                    break;
                }
                self.pos += 1;
            }
            out.push_str(&src[start..self.pos]);
            match bytes.get(self.pos) {
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.pos += 1;
                    out.push(self.read_escape()?);
                }
                Some(_) => return Err(self.error("unescaped control character in string")),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn read_escape(&mut self) -> Result<char> {
        let Some(b) = self.byte() else {
            return Err(self.error("unterminated string"));
        };
        self.pos += 1;
        Ok(match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let high = self.read_hex()?;
                let code = match high {
                    0xD800..=0xDBFF => {
                        if !self.src[self.pos..].starts_with("\\u") {
                            return Err(self.error("unpaired surrogate in unicode escape"));
                        }
                        self.pos += 2;
                        let low = self.read_hex()?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(self.error("unpaired surrogate in unicode escape"));
                        }
                        0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => {
                        return Err(self.error("unpaired surrogate in unicode escape"));
                    }
                    code => code,
                };
                char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))?
            }
            _ => {
                self.pos -= 1;
                return Err(self.error("invalid escape sequence"));
            }
        })
    }

    fn read_hex(&mut self) -> Result<u32> {
        let src = self.src;
        let digits = src
            .get(self.pos..self.pos + 4)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("invalid unicode escape"))?;
        let code = u32::from_str_radix(digits, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos += 4;
        Ok(code)
    }

    fn read_literal(&mut self, literal: &str) -> Result<()> {
        if !self.src[self.pos..].starts_with(literal) {
            return Err(self.error(format!("expected '{}'", literal)));
        }
        self.pos += literal.len();
        Ok(())
    }
}

impl JsonReader for TextReader<'_> {
    fn peek(&mut self) -> Result<Token> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.do_peek()?;
        self.peeked = Some(token);
        Ok(token)
    }

    fn begin_object(&mut self) -> Result<()> {
        self.expect(Token::BeginObject)?;
        self.pos += 1;
        self.scopes.push((Scope::EmptyObject, None));
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.expect(Token::EndObject)?;
        self.pos += 1;
        self.scopes.pop();
        self.value_done();
        Ok(())
    }

    fn begin_array(&mut self) -> Result<()> {
        self.expect(Token::BeginArray)?;
        self.pos += 1;
        self.scopes.push((Scope::EmptyArray, Some(PathElement::Index(0))));
        Ok(())
    }

    fn end_array(&mut self) -> Result<()> {
        self.expect(Token::EndArray)?;
        self.pos += 1;
        self.scopes.pop();
        self.value_done();
        Ok(())
    }

    fn next_name(&mut self) -> Result<String> {
        self.expect(Token::Name)?;
        let name = self.read_string()?;
        if let Some(top) = self.scopes.last_mut() {
            top.1 = Some(PathElement::Key(name.clone()));
        }
        Ok(name)
    }

    fn next_string(&mut self) -> Result<String> {
        self.expect(Token::String)?;
        let value = self.read_string()?;
        self.value_done();
        Ok(value)
    }

    fn next_number(&mut self) -> Result<Number> {
        self.expect(Token::Number)?;
        let src = self.src;
        let start = self.pos;
        while let Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9') = self.byte() {
            self.pos += 1;
        }
        let literal = &src[start..self.pos];
        let number = literal.parse::<Number>().map_err(|_| {
            self.pos = start;
            self.error(format!("invalid number '{}'", literal))
        })?;
        self.value_done();
        Ok(number)
    }

    fn next_boolean(&mut self) -> Result<bool> {
        self.expect(Token::Boolean)?;
        let value = self.byte() == Some(b't');
        self.read_literal(if value { "true" } else { "false" })?;
        self.value_done();
        Ok(value)
    }

    fn next_null(&mut self) -> Result<()> {
        self.expect(Token::Null)?;
        self.read_literal("null")?;
        self.value_done();
        Ok(())
    }

    fn skip_value(&mut self) -> Result<()> {
        if self.peek()? == Token::Name {
            self.next_name()?;
        }
        self.read_value().map(drop)
    }

    fn path(&self) -> ResponsePath {
        self.scopes
            .iter()
            .filter_map(|(_, element)| element.clone())
            .collect()
    }
}

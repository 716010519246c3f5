//! Recursive descent parser.
//!
//! Syntax errors are collected per definition: after an error the parser
//! skips to the next top-level definition and keeps going, so a single run
//! reports every broken definition. A lexer error ends parsing.

mod executable;
mod schema;
mod value;

use crate::{
    ast::{Definition, Document, Value},
    error::SyntaxError,
    lexer::{LexError, Lexer, Punctuator, Token},
    position::{Position, Spanned},
};

const DEFINITION_KEYWORDS: &[&str] = &[
    "query",
    "mutation",
    "subscription",
    "fragment",
    "schema",
    "scalar",
    "type",
    "interface",
    "union",
    "enum",
    "input",
    "directive",
    "extend",
];

pub(crate) enum Failure {
    Syntax(SyntaxError),
    Lex(LexError),
}

impl From<LexError> for Failure {
    fn from(err: LexError) -> Self {
        Failure::Lex(err)
    }
}

impl From<Failure> for SyntaxError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::Syntax(err) => err,
            Failure::Lex(err) => err.into(),
        }
    }
}

pub(crate) type PResult<T> = Result<T, Failure>;

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Spanned<Token>,
    /// Nesting of `{`, `(` and `[` around the current token.
    depth: usize,
    after_brace_r: bool,
}

/// Parse a document containing any mix of executable and type-system
/// definitions.
pub fn parse_document(src: &str) -> Result<Document, Vec<SyntaxError>> {
    let mut parser = Parser::new(src).map_err(|e| vec![SyntaxError::from(e)])?;
    let mut definitions = Vec::new();
    let mut errors = Vec::new();

    while parser.peek() != &Token::EndOfFile {
        let start = parser.pos().offset;
        match parser.parse_definition() {
            Ok(definition) => definitions.push(definition),
            Err(Failure::Lex(e)) => {
                errors.push(e.into());
                break;
            }
            Err(Failure::Syntax(e)) => {
                errors.push(e);
                if let Err(e) = parser.synchronize(start) {
                    errors.push(e.into());
                    break;
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(Document { definitions })
    } else {
        Err(errors)
    }
}

/// Parse a standalone constant value, such as an introspection default.
pub fn parse_const_value(src: &str) -> Result<Value, SyntaxError> {
    let mut parser = Parser::new(src)?;
    let value = parser.parse_value(true).map_err(SyntaxError::from)?;
    if parser.peek() != &Token::EndOfFile {
        return Err(SyntaxError::from(parser.unexpected("<EOF>")));
    }
    Ok(value)
}

impl<'a> Parser<'a> {
    pub(crate) fn new(src: &'a str) -> Result<Self, LexError> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
            after_brace_r: false,
        })
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.current.item
    }

    pub(crate) fn pos(&self) -> Position {
        self.current.pos
    }

    pub(crate) fn at(&self, p: Punctuator) -> bool {
        self.current.item.is_punctuator(p)
    }

    pub(crate) fn at_name(&self) -> bool {
        matches!(self.current.item, Token::Name(_))
    }

    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.current.item.is_name(keyword)
    }

    pub(crate) fn bump(&mut self) -> Result<Spanned<Token>, LexError> {
        let next = self.lexer.next_token()?;
        let token = std::mem::replace(&mut self.current, next);
        if let Token::Punctuator(p) = &token.item {
            match p {
                Punctuator::BraceL | Punctuator::ParenL | Punctuator::BracketL => self.depth += 1,
                Punctuator::BraceR | Punctuator::ParenR | Punctuator::BracketR => {
                    self.depth = self.depth.saturating_sub(1)
                }
                _ => {}
            }
        }
        self.after_brace_r = token.item.is_punctuator(Punctuator::BraceR);
        Ok(token)
    }

    pub(crate) fn eat(&mut self, p: Punctuator) -> PResult<bool> {
        if self.at(p) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, p: Punctuator) -> PResult<()> {
        if self.at(p) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", p)))
        }
    }

    pub(crate) fn expect_name(&mut self) -> PResult<String> {
        if self.at_name()
            && let Token::Name(name) = self.bump()?.item
        {
            return Ok(name);
        }
        Err(self.unexpected("Name"))
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> PResult<()> {
        if self.at_keyword(keyword) {
            self.bump()?;
            Ok(())
        } else {
            Err(self.unexpected(&format!("\"{}\"", keyword)))
        }
    }

    pub(crate) fn unexpected(&self, expected: &str) -> Failure {
        self.error(format!("Expected {}, found {}", expected, self.current.item))
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> Failure {
        Failure::Syntax(SyntaxError::new(
            message,
            self.current.pos,
            self.current.len,
        ))
    }

    fn parse_definition(&mut self) -> PResult<Definition> {
        let description = self.parse_description()?;

        if description.is_some()
            && (self.at(Punctuator::BraceL)
                || self.at_keyword("query")
                || self.at_keyword("mutation")
                || self.at_keyword("subscription")
                || self.at_keyword("fragment")
                || self.at_keyword("extend"))
        {
            return Err(self.error(format!(
                "Unexpected description before {}",
                self.current.item
            )));
        }

        let keyword = match self.peek() {
            Token::Punctuator(Punctuator::BraceL) => {
                return Ok(Definition::Operation(self.parse_operation()?));
            }
            Token::Name(keyword) => keyword.clone(),
            _ => return Err(self.unexpected("a definition")),
        };

        match keyword.as_str() {
            "query" | "mutation" | "subscription" => {
                Ok(Definition::Operation(self.parse_operation()?))
            }
            "fragment" => Ok(Definition::Fragment(self.parse_fragment_definition()?)),
            "schema" => Ok(Definition::Schema(
                self.parse_schema_definition(description, false)?,
            )),
            "scalar" | "type" | "interface" | "union" | "enum" | "input" => Ok(Definition::Type(
                self.parse_type_definition(description, false)?,
            )),
            "directive" => Ok(Definition::Directive(
                self.parse_directive_definition(description)?,
            )),
            "extend" => self.parse_extension(),
            _ => Err(self.unexpected("a definition")),
        }
    }

    /// Skip to the next top-level definition after an error.
    fn synchronize(&mut self, start: usize) -> Result<(), LexError> {
        if self.current.pos.offset == start && self.current.item != Token::EndOfFile {
            self.bump()?;
        }
        loop {
            if self.current.item == Token::EndOfFile {
                return Ok(());
            }
            if self.depth == 0 && self.at_definition_start() {
                return Ok(());
            }
            self.bump()?;
        }
    }

    fn at_definition_start(&self) -> bool {
        match &self.current.item {
            Token::Name(name) => DEFINITION_KEYWORDS.contains(&name.as_str()),
            Token::String(_) | Token::BlockString(_) => true,
            Token::Punctuator(Punctuator::BraceL) => self.after_brace_r,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_collected_per_definition() {
        let errors = parse_document(
            "query A { hero { } }\nquery B { hero { name } }\nquery C { ... }\n",
        )
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Expected Name, found '}'");
        assert_eq!((errors[0].line, errors[0].column), (1, 18));
        assert_eq!(errors[1].line, 3);
    }

    #[test]
    fn test_lexer_error_stops_parsing() {
        let errors = parse_document("query A { a ^ }\nquery B { b( }").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Unexpected symbol '^'");
    }

    #[test]
    fn test_description_on_operation_is_rejected() {
        let errors = parse_document("\"doc\" query A { a }").unwrap_err();
        assert!(errors[0].message.starts_with("Unexpected description"));
    }

    #[test]
    fn test_empty_document() {
        let document = parse_document("  # nothing here\n").unwrap();
        assert!(document.definitions.is_empty());
    }
}

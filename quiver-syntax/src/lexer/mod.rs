//! Lexer shared by executable documents and schema documents (SDL).

mod number;
mod string;

use std::fmt;

use thiserror::Error;

pub(crate) use string::block_string_value;

use crate::position::{Position, Spanned};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punctuator {
    // !
    Bang,
    // $
    Dollar,
    // &
    Amp,
    // (
    ParenL,
    // )
    ParenR,
    // ...
    Spread,
    // :
    Colon,
    // =
    Equals,
    // @
    At,
    // [
    BracketL,
    // ]
    BracketR,
    // {
    BraceL,
    // |
    Pipe,
    // }
    BraceR,
}

impl Punctuator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punctuator::Bang => "!",
            Punctuator::Dollar => "$",
            Punctuator::Amp => "&",
            Punctuator::ParenL => "(",
            Punctuator::ParenR => ")",
            Punctuator::Spread => "...",
            Punctuator::Colon => ":",
            Punctuator::Equals => "=",
            Punctuator::At => "@",
            Punctuator::BracketL => "[",
            Punctuator::BracketR => "]",
            Punctuator::BraceL => "{",
            Punctuator::Pipe => "|",
            Punctuator::BraceR => "}",
        }
    }
}

impl fmt::Display for Punctuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexical token. Numbers keep their source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Name(String),
    Int(String),
    Float(String),
    String(String),
    BlockString(String),
    Punctuator(Punctuator),
    EndOfFile,
}

impl Token {
    pub fn is_punctuator(&self, expected: Punctuator) -> bool {
        matches!(self, Token::Punctuator(p) if *p == expected)
    }

    pub fn is_name(&self, expected: &str) -> bool {
        matches!(self, Token::Name(name) if name == expected)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "Name \"{}\"", name),
            Token::Int(raw) => write!(f, "Int \"{}\"", raw),
            Token::Float(raw) => write!(f, "Float \"{}\"", raw),
            Token::String(value) => write!(f, "String {:?}", value),
            Token::BlockString(value) => write!(f, "BlockString {:?}", value),
            Token::Punctuator(p) => write!(f, "'{}'", p),
            Token::EndOfFile => f.write_str("<EOF>"),
        }
    }
}

/// Error when tokenizing the input source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({line}:{column})")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl LexError {
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }
}

/// Produces tokens one at a time from GraphQL source text.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    ix: usize,
    line: usize,
    column: usize,
}

const BOM: char = '\u{feff}';

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            ix: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column, self.ix)
    }

    /// Read the next token, skipping whitespace, commas, comments and BOMs.
    ///
    /// Returns `Token::EndOfFile` (repeatedly) once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Spanned<Token>, LexError> {
        self.skip_ignored();
        let start = self.position();

        let Some(&byte) = self.bytes.get(self.ix) else {
            return Ok(Spanned::new(Token::EndOfFile, start, 0));
        };

        let token = match byte {
            b'!' => self.punctuator(Punctuator::Bang),
            b'$' => self.punctuator(Punctuator::Dollar),
            b'&' => self.punctuator(Punctuator::Amp),
            b'(' => self.punctuator(Punctuator::ParenL),
            b')' => self.punctuator(Punctuator::ParenR),
            b':' => self.punctuator(Punctuator::Colon),
            b'=' => self.punctuator(Punctuator::Equals),
            b'@' => self.punctuator(Punctuator::At),
            b'[' => self.punctuator(Punctuator::BracketL),
            b']' => self.punctuator(Punctuator::BracketR),
            b'{' => self.punctuator(Punctuator::BraceL),
            b'|' => self.punctuator(Punctuator::Pipe),
            b'}' => self.punctuator(Punctuator::BraceR),
            b'.' => self.spread()?,
            b'"' if self.bytes[self.ix..].starts_with(b"\"\"\"") => self.block_string()?,
            b'"' => self.string()?,
            b'-' | b'0'..=b'9' => self.number()?,
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.name(),
            _ => {
                let c = self.peek_char().unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(self.error(format!("Unexpected symbol '{}'", c)));
            }
        };

        Ok(Spanned::new(token, start, self.ix - start.offset))
    }

    fn skip_ignored(&mut self) {
        while let Some(&byte) = self.bytes.get(self.ix) {
            match byte {
                b' ' | b'\t' | b',' => self.advance_ascii(1),
                b'\n' => self.newline(1),
                // \r\n is a single line break
                b'\r' if self.bytes.get(self.ix + 1) == Some(&b'\n') => self.newline(2),
                b'\r' => self.newline(1),
                b'#' => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.advance_char(c);
                    }
                }
                _ if self.src[self.ix..].starts_with(BOM) => self.ix += BOM.len_utf8(),
                _ => break,
            }
        }
    }

    fn punctuator(&mut self, p: Punctuator) -> Token {
        self.advance_ascii(1);
        Token::Punctuator(p)
    }

    fn spread(&mut self) -> Result<Token, LexError> {
        if self.bytes[self.ix..].starts_with(b"...") {
            self.advance_ascii(3);
            return Ok(Token::Punctuator(Punctuator::Spread));
        }
        Err(self.error("Unexpected symbol '.', did you mean '...'?"))
    }

    // invariant: called after checking the first character
    fn name(&mut self) -> Token {
        let start = self.ix;
        let len = self.bytes[self.ix..]
            .iter()
            .take_while(|&&c| matches!(c, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_'))
            .count();
        self.advance_ascii(len);
        Token::Name(self.src[start..self.ix].to_string())
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.ix).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.ix..].chars().next()
    }

    fn advance_ascii(&mut self, count: usize) {
        self.ix += count;
        self.column += count;
    }

    fn advance_char(&mut self, c: char) {
        self.ix += c.len_utf8();
        self.column += 1;
    }

    fn newline(&mut self, bytes: usize) {
        self.ix += bytes;
        self.line += 1;
        self.column = 1;
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        self.error_at(self.position(), message)
    }

    fn error_at(&self, pos: Position, message: impl Into<String>) -> LexError {
        LexError {
            message: message.into(),
            line: pos.line,
            column: pos.column,
            offset: pos.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(src: &str) -> Vec<Spanned<Token>> {
        let mut lexer = Lexer::new(src);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.item == Token::EndOfFile {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    fn first_error(src: &str) -> LexError {
        let mut lexer = Lexer::new(src);
        loop {
            match lexer.next_token() {
                Ok(token) if token.item == Token::EndOfFile => panic!("expected an error"),
                Ok(_) => continue,
                Err(e) => return e,
            }
        }
    }

    #[test]
    fn test_bom_is_skipped() {
        let tokens = lex_all("\u{feff} foo");
        assert_eq!(tokens[0].item, Token::Name("foo".to_string()));
        assert_eq!((tokens[0].pos.line, tokens[0].pos.column), (1, 2));
    }

    #[test]
    fn test_newline_then_carriage_return_counts_twice() {
        let tokens = lex_all("\n\rfoo");
        assert_eq!(tokens[0].item, Token::Name("foo".to_string()));
        assert_eq!((tokens[0].pos.line, tokens[0].pos.column), (3, 1));
    }

    #[test]
    fn test_crlf_counts_once() {
        let tokens = lex_all("a\r\nb\rc");
        let lines: Vec<_> = tokens.iter().map(|t| t.pos.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = first_error("\"");
        assert_eq!(err.message, "Unterminated string");
        assert_eq!((err.line, err.column), (1, 2));
    }

    #[test]
    fn test_control_character_in_string() {
        let err = first_error("\"a\u{0007}b\"");
        assert_eq!(err.message, "Invalid character within String: U+0007");
        assert_eq!((err.line, err.column), (1, 3));

        let err = first_error("\"\"\"a\u{0000}\"\"\"");
        assert_eq!(err.message, "Invalid character within String: U+0000");
    }

    #[test]
    fn test_tab_in_string_is_kept() {
        let tokens = lex_all("\"a\tb\"");
        assert_eq!(tokens[0].item, Token::String("a\tb".to_string()));
    }

    #[test]
    fn test_single_quote() {
        let err = first_error("'single'");
        assert_eq!(err.message, "Unexpected symbol '''");
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_punctuators_and_comments() {
        let tokens = lex_all("query($id: ID!) { # trailing comment\n  ...on, @skip }");
        let items: Vec<_> = tokens.into_iter().map(|t| t.item).collect();
        assert_eq!(
            items,
            vec![
                Token::Name("query".into()),
                Token::Punctuator(Punctuator::ParenL),
                Token::Punctuator(Punctuator::Dollar),
                Token::Name("id".into()),
                Token::Punctuator(Punctuator::Colon),
                Token::Name("ID".into()),
                Token::Punctuator(Punctuator::Bang),
                Token::Punctuator(Punctuator::ParenR),
                Token::Punctuator(Punctuator::BraceL),
                Token::Punctuator(Punctuator::Spread),
                Token::Name("on".into()),
                Token::Punctuator(Punctuator::At),
                Token::Name("skip".into()),
                Token::Punctuator(Punctuator::BraceR),
            ]
        );
    }

    #[test]
    fn test_token_columns_after_unicode_comment() {
        let tokens = lex_all("# héllo\n  name");
        assert_eq!((tokens[0].pos.line, tokens[0].pos.column), (2, 3));
    }

    #[test]
    fn test_lone_dot() {
        let err = first_error("..");
        assert!(err.message.starts_with("Unexpected symbol '.'"));
    }

    #[test]
    fn test_eof_is_repeated() {
        let mut lexer = Lexer::new("  ");
        assert_eq!(lexer.next_token().unwrap().item, Token::EndOfFile);
        assert_eq!(lexer.next_token().unwrap().item, Token::EndOfFile);
    }
}

use super::{LexError, Lexer, Token};

impl Lexer<'_> {
    pub(super) fn string(&mut self) -> Result<Token, LexError> {
        // opening quote
        self.advance_ascii(1);
        let mut value = String::new();

        loop {
            let Some(c) = self.peek_char() else {
                return Err(self.error("Unterminated string"));
            };
            match c {
                '"' => {
                    self.advance_ascii(1);
                    return Ok(Token::String(value));
                }
                '\n' | '\r' => return Err(self.error("Unterminated string")),
                '\\' => value.push(self.escape()?),
                c if is_control(c) => return Err(self.invalid_character(c)),
                c => {
                    self.advance_char(c);
                    value.push(c);
                }
            }
        }
    }

    fn escape(&mut self) -> Result<char, LexError> {
        let start = self.position();
        // backslash
        self.advance_ascii(1);
        let Some(c) = self.peek_char() else {
            return Err(self.error("Unterminated string"));
        };
        let simple = match c {
            '"' => Some('"'),
            '\\' => Some('\\'),
            '/' => Some('/'),
            'b' => Some('\u{0008}'),
            'f' => Some('\u{000c}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'u' => None,
            _ => {
                return Err(self.error_at(start, format!("Invalid escape sequence '\\{}'", c)));
            }
        };
        if let Some(c) = simple {
            self.advance_ascii(1);
            return Ok(c);
        }

        // 'u'
        self.advance_ascii(1);
        let code = if self.peek_byte() == Some(b'{') {
            self.braced_code_point(start)?
        } else {
            let high = self.fixed_code_unit(start)?;
            if (0xD800..=0xDBFF).contains(&high) && self.bytes[self.ix..].starts_with(b"\\u") {
                let low_start = self.position();
                self.advance_ascii(2);
                let low = self.fixed_code_unit(low_start)?;
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(self.invalid_unicode(start));
                }
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            } else {
                high
            }
        };

        char::from_u32(code).ok_or_else(|| self.invalid_unicode(start))
    }

    fn fixed_code_unit(&mut self, start: crate::Position) -> Result<u32, LexError> {
        let digits = self.src.get(self.ix..self.ix + 4).unwrap_or("");
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.invalid_unicode(start));
        }
        self.advance_ascii(4);
        u32::from_str_radix(digits, 16).map_err(|_| self.invalid_unicode(start))
    }

    fn braced_code_point(&mut self, start: crate::Position) -> Result<u32, LexError> {
        // '{'
        self.advance_ascii(1);
        let digits_start = self.ix;
        while self.peek_byte().is_some_and(|b| b.is_ascii_hexdigit()) {
            self.advance_ascii(1);
        }
        let digits = &self.src[digits_start..self.ix];
        if digits.is_empty() || digits.len() > 6 || self.peek_byte() != Some(b'}') {
            return Err(self.invalid_unicode(start));
        }
        self.advance_ascii(1);
        u32::from_str_radix(digits, 16).map_err(|_| self.invalid_unicode(start))
    }

    fn invalid_unicode(&self, start: crate::Position) -> LexError {
        let end = (self.ix + 1).min(self.src.len());
        let sequence = self.src.get(start.offset..end).unwrap_or("\\u");
        self.error_at(start, format!("Invalid Unicode escape sequence '{}'", sequence))
    }

    fn invalid_character(&self, c: char) -> LexError {
        self.error(format!("Invalid character within String: U+{:04X}", c as u32))
    }

    pub(super) fn block_string(&mut self) -> Result<Token, LexError> {
        // opening quotes
        self.advance_ascii(3);
        let mut raw = String::new();

        loop {
            let rest = &self.bytes[self.ix..];
            if rest.starts_with(b"\"\"\"") {
                self.advance_ascii(3);
                return Ok(Token::BlockString(block_string_value(&raw)));
            }
            if rest.starts_with(b"\\\"\"\"") {
                self.advance_ascii(4);
                raw.push_str("\"\"\"");
                continue;
            }
            match rest.first() {
                None => return Err(self.error("Unterminated string")),
                Some(b'\r') if rest.get(1) == Some(&b'\n') => {
                    self.newline(2);
                    raw.push('\n');
                }
                Some(b'\n') | Some(b'\r') => {
                    self.newline(1);
                    raw.push('\n');
                }
                Some(_) => {
                    let Some(c) = self.peek_char() else {
                        return Err(self.error("Unterminated string"));
                    };
                    if is_control(c) {
                        return Err(self.invalid_character(c));
                    }
                    self.advance_char(c);
                    raw.push(c);
                }
            }
        }
    }
}

/// Control characters other than tab are not source characters. Line
/// terminators are handled before this check.
fn is_control(c: char) -> bool {
    c < '\u{0020}' && c != '\t'
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Dedent a raw block string and strip surrounding blank lines.
///
/// The first line never contributes to the common indentation.
pub(crate) fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();

    let common_indent = lines
        .iter()
        .skip(1)
        .filter(|line| !is_blank(line))
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let dedented: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || common_indent == 0 {
                *line
            } else {
                // indentation is ASCII so char count equals byte count
                line.get(common_indent.min(line.len())..).unwrap_or("")
            }
        })
        .collect();

    let start = dedented.iter().position(|line| !is_blank(line));
    let end = dedented.iter().rposition(|line| !is_blank(line));
    match (start, end) {
        (Some(start), Some(end)) => dedented[start..=end].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn lex_one(src: &str) -> Result<Token, LexError> {
        Lexer::new(src).next_token().map(|t| t.item)
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(
            lex_one(r#""quote \" slash \/ tab \t""#).unwrap(),
            Token::String("quote \" slash / tab \t".to_string())
        );
    }

    #[test]
    fn test_unicode_escapes() {
        assert_eq!(
            lex_one(r#""A\u{1F600}😀""#).unwrap(),
            Token::String("A\u{1F600}\u{1F600}".to_string())
        );
    }

    #[test]
    fn test_invalid_escape_points_at_backslash() {
        let err = lex_one(r#""abc \x""#).unwrap_err();
        assert_eq!(err.message, "Invalid escape sequence '\\x'");
        assert_eq!((err.line, err.column), (1, 6));
    }

    #[test]
    fn test_lone_surrogate_is_rejected() {
        let err = lex_one(r#""\uD83D""#).unwrap_err();
        assert!(err.message.starts_with("Invalid Unicode escape sequence"));
        assert_eq!(err.column, 2);
    }

    #[test]
    fn test_newline_terminates_string() {
        let err = lex_one("\"abc\ndef\"").unwrap_err();
        assert_eq!(err.message, "Unterminated string");
        assert_eq!((err.line, err.column), (1, 5));
    }

    #[test]
    fn test_block_string_dedent() {
        let src = "\"\"\"\n    Hello,\n      World!\n\n    Yours,\n      GraphQL.\n  \"\"\"";
        assert_eq!(
            lex_one(src).unwrap(),
            Token::BlockString("Hello,\n  World!\n\nYours,\n  GraphQL.".to_string())
        );
    }

    #[test]
    fn test_block_string_escaped_quotes() {
        assert_eq!(
            lex_one(r#""""contains \""" inside""""#).unwrap(),
            Token::BlockString("contains \"\"\" inside".to_string())
        );
    }

    #[test]
    fn test_block_string_tracks_lines() {
        let mut lexer = Lexer::new("\"\"\"a\nb\"\"\" next");
        lexer.next_token().unwrap();
        let next = lexer.next_token().unwrap();
        assert_eq!((next.pos.line, next.pos.column), (2, 6));
    }

    #[test]
    fn test_block_string_value_only_blank_lines() {
        assert_eq!(block_string_value("\n   \n\t\n"), "");
    }
}

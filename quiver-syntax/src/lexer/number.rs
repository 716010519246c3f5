use super::{LexError, Lexer, Token};

impl Lexer<'_> {
    /// IntValue or FloatValue. The raw text is kept so large values survive.
    pub(super) fn number(&mut self) -> Result<Token, LexError> {
        let start = self.ix;
        let mut is_float = false;

        if self.peek_byte() == Some(b'-') {
            self.advance_ascii(1);
        }

        match self.peek_byte() {
            Some(b'0') => {
                self.advance_ascii(1);
                if self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                    return Err(self.error(format!(
                        "Invalid number, unexpected digit after 0: '{}'",
                        self.peek_byte().map(char::from).unwrap_or('0')
                    )));
                }
            }
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.expected_digit()),
        }

        if self.peek_byte() == Some(b'.') {
            is_float = true;
            self.advance_ascii(1);
            if !self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.expected_digit());
            }
            self.digits();
        }

        if matches!(self.peek_byte(), Some(b'e' | b'E')) {
            is_float = true;
            self.advance_ascii(1);
            if matches!(self.peek_byte(), Some(b'+' | b'-')) {
                self.advance_ascii(1);
            }
            if !self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.expected_digit());
            }
            self.digits();
        }

        // a number may not be directly followed by a name start or a dot
        if let Some(b) = self.peek_byte()
            && (b == b'.' || b == b'_' || b.is_ascii_alphabetic())
        {
            return Err(self.error(format!(
                "Invalid number, expected digit but got: '{}'",
                char::from(b)
            )));
        }

        let raw = self.src[start..self.ix].to_string();
        Ok(if is_float {
            Token::Float(raw)
        } else {
            Token::Int(raw)
        })
    }

    fn digits(&mut self) {
        while self.peek_byte().is_some_and(|b| b.is_ascii_digit()) {
            self.advance_ascii(1);
        }
    }

    fn expected_digit(&self) -> LexError {
        match self.peek_char() {
            Some(c) => self.error(format!("Invalid number, expected digit but got: '{}'", c)),
            None => self.error("Invalid number, expected digit but got: <EOF>"),
        }
    }
}

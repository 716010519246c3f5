use super::{PResult, Parser};
use crate::{
    ast::{Argument, Directive, Type, Value},
    lexer::{Punctuator, Token},
};

impl Parser<'_> {
    /// `true` rejects variables, as required in default values and schema
    /// directives.
    pub(crate) fn parse_value(&mut self, is_const: bool) -> PResult<Value> {
        match self.peek() {
            Token::Punctuator(Punctuator::Dollar) => {
                if is_const {
                    return Err(self.error("Unexpected variable in constant value"));
                }
                self.bump()?;
                Ok(Value::Variable(self.expect_name()?))
            }
            Token::Punctuator(Punctuator::BracketL) => {
                self.bump()?;
                let mut items = Vec::new();
                while !self.eat(Punctuator::BracketR)? {
                    items.push(self.parse_value(is_const)?);
                }
                Ok(Value::List(items))
            }
            Token::Punctuator(Punctuator::BraceL) => {
                self.bump()?;
                let mut fields = Vec::new();
                while !self.eat(Punctuator::BraceR)? {
                    let name = self.expect_name()?;
                    self.expect(Punctuator::Colon)?;
                    fields.push((name, self.parse_value(is_const)?));
                }
                Ok(Value::Object(fields))
            }
            Token::Int(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::BlockString(_)
            | Token::Name(_) => Ok(match self.bump()?.item {
                Token::Int(raw) => Value::Int(raw),
                Token::Float(raw) => Value::Float(raw),
                Token::String(s) | Token::BlockString(s) => Value::String(s),
                Token::Name(name) => match name.as_str() {
                    "true" => Value::Boolean(true),
                    "false" => Value::Boolean(false),
                    "null" => Value::Null,
                    _ => Value::Enum(name),
                },
                _ => Value::Null,
            }),
            _ => Err(self.unexpected("a value")),
        }
    }

    pub(crate) fn parse_arguments(&mut self, is_const: bool) -> PResult<Vec<Argument>> {
        if !self.eat(Punctuator::ParenL)? {
            return Ok(Vec::new());
        }
        let mut arguments = Vec::new();
        loop {
            let pos = self.pos();
            let name = self.expect_name()?;
            self.expect(Punctuator::Colon)?;
            let value = self.parse_value(is_const)?;
            arguments.push(Argument { name, value, pos });
            if self.eat(Punctuator::ParenR)? {
                return Ok(arguments);
            }
        }
    }

    pub(crate) fn parse_directives(&mut self, is_const: bool) -> PResult<Vec<Directive>> {
        let mut directives = Vec::new();
        while self.at(Punctuator::At) {
            let pos = self.pos();
            self.bump()?;
            let name = self.expect_name()?;
            let arguments = self.parse_arguments(is_const)?;
            directives.push(Directive {
                name,
                arguments,
                pos,
            });
        }
        Ok(directives)
    }

    pub(crate) fn parse_type(&mut self) -> PResult<Type> {
        let ty = if self.eat(Punctuator::BracketL)? {
            let inner = self.parse_type()?;
            self.expect(Punctuator::BracketR)?;
            Type::List(Box::new(inner))
        } else {
            Type::Named(self.expect_name()?)
        };
        if self.eat(Punctuator::Bang)? {
            Ok(Type::NonNull(Box::new(ty)))
        } else {
            Ok(ty)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{Type, Value},
        parser::{Failure, Parser},
    };

    fn value(src: &str, is_const: bool) -> Result<Value, String> {
        let mut parser = Parser::new(src).unwrap();
        parser.parse_value(is_const).map_err(|e| match e {
            Failure::Syntax(e) => e.message,
            Failure::Lex(e) => e.message,
        })
    }

    #[test]
    fn test_values() {
        assert_eq!(
            value(r#"{ a: [1, 2.5, "x", ENUM, null, true], b: {} }"#, true).unwrap(),
            Value::Object(vec![
                (
                    "a".to_string(),
                    Value::List(vec![
                        Value::Int("1".into()),
                        Value::Float("2.5".into()),
                        Value::String("x".into()),
                        Value::Enum("ENUM".into()),
                        Value::Null,
                        Value::Boolean(true),
                    ])
                ),
                ("b".to_string(), Value::Object(Vec::new())),
            ])
        );
    }

    #[test]
    fn test_variable_in_const_value() {
        assert_eq!(value("$id", false).unwrap(), Value::Variable("id".into()));
        assert_eq!(
            value("[$id]", true).unwrap_err(),
            "Unexpected variable in constant value"
        );
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(value(")", false).unwrap_err(), "Expected a value, found ')'");
    }

    #[test]
    fn test_type_references() {
        let mut parser = Parser::new("[[Int!]]!").unwrap();
        let ty = parser.parse_type().map_err(|_| ()).unwrap();
        assert_eq!(
            ty,
            Type::NonNull(Box::new(Type::List(Box::new(Type::List(Box::new(
                Type::NonNull(Box::new(Type::named("Int")))
            ))))))
        );
    }
}

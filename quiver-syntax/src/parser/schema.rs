use super::{PResult, Parser};
use crate::{
    ast::{
        Definition, DirectiveDefinition, DirectiveLocation, EnumType, EnumValueDefinition,
        FieldDefinition, InputObjectType, InputValueDefinition, ObjectType, OperationKind,
        RootOperation, ScalarType, SchemaDefinition, TypeDefinition, UnionType,
    },
    lexer::{Punctuator, Token},
};

impl Parser<'_> {
    pub(crate) fn parse_description(&mut self) -> PResult<Option<String>> {
        match self.peek() {
            Token::String(_) | Token::BlockString(_) => match self.bump()?.item {
                Token::String(s) | Token::BlockString(s) => Ok(Some(s)),
                _ => Ok(None),
            },
            _ => Ok(None),
        }
    }

    /// `schema @dirs { query: Query ... }`. The body is optional for
    /// extensions.
    pub(crate) fn parse_schema_definition(
        &mut self,
        description: Option<String>,
        is_extension: bool,
    ) -> PResult<SchemaDefinition> {
        let pos = self.pos();
        self.expect_keyword("schema")?;
        let directives = self.parse_directives(true)?;
        let mut root_operations = Vec::new();

        if !is_extension || self.at(Punctuator::BraceL) {
            self.expect(Punctuator::BraceL)?;
            loop {
                let pos = self.pos();
                let keyword = self.expect_name()?;
                let Some(kind) = OperationKind::from_keyword(&keyword) else {
                    return Err(self.error(format!(
                        "Expected query, mutation or subscription, found '{}'",
                        keyword
                    )));
                };
                self.expect(Punctuator::Colon)?;
                let named_type = self.expect_name()?;
                root_operations.push(RootOperation {
                    kind,
                    named_type,
                    pos,
                });
                if self.eat(Punctuator::BraceR)? {
                    break;
                }
            }
        }

        Ok(SchemaDefinition {
            description,
            directives,
            root_operations,
            pos,
        })
    }

    pub(crate) fn parse_extension(&mut self) -> PResult<Definition> {
        self.expect_keyword("extend")?;
        if self.at_keyword("schema") {
            return Ok(Definition::SchemaExtension(
                self.parse_schema_definition(None, true)?,
            ));
        }
        Ok(Definition::TypeExtension(
            self.parse_type_definition(None, true)?,
        ))
    }

    pub(crate) fn parse_type_definition(
        &mut self,
        description: Option<String>,
        is_extension: bool,
    ) -> PResult<TypeDefinition> {
        let pos = self.pos();
        let keyword = self.expect_name()?;
        let name = self.expect_name()?;

        let definition = match keyword.as_str() {
            "scalar" => TypeDefinition::Scalar(ScalarType {
                description,
                name,
                directives: self.parse_directives(true)?,
                pos,
            }),
            "type" | "interface" => {
                let implements = self.parse_implements()?;
                let directives = self.parse_directives(true)?;
                let fields = self.parse_fields_definition()?;
                let ty = ObjectType {
                    description,
                    name,
                    implements,
                    directives,
                    fields,
                    pos,
                };
                if keyword == "type" {
                    TypeDefinition::Object(ty)
                } else {
                    TypeDefinition::Interface(ty)
                }
            }
            "union" => {
                let directives = self.parse_directives(true)?;
                let mut members = Vec::new();
                if self.eat(Punctuator::Equals)? {
                    self.eat(Punctuator::Pipe)?;
                    members.push(self.expect_name()?);
                    while self.eat(Punctuator::Pipe)? {
                        members.push(self.expect_name()?);
                    }
                }
                TypeDefinition::Union(UnionType {
                    description,
                    name,
                    directives,
                    members,
                    pos,
                })
            }
            "enum" => {
                let directives = self.parse_directives(true)?;
                let values = self.parse_enum_values()?;
                TypeDefinition::Enum(EnumType {
                    description,
                    name,
                    directives,
                    values,
                    pos,
                })
            }
            "input" => {
                let directives = self.parse_directives(true)?;
                let fields = if self.eat(Punctuator::BraceL)? {
                    self.parse_input_values(Punctuator::BraceR)?
                } else {
                    Vec::new()
                };
                TypeDefinition::InputObject(InputObjectType {
                    description,
                    name,
                    directives,
                    fields,
                    pos,
                })
            }
            other => {
                let expected = if is_extension {
                    "schema, scalar, type, interface, union, enum or input"
                } else {
                    "scalar, type, interface, union, enum or input"
                };
                return Err(self.error(format!("Expected {}, found '{}'", expected, other)));
            }
        };

        Ok(definition)
    }

    fn parse_implements(&mut self) -> PResult<Vec<String>> {
        let mut interfaces = Vec::new();
        if self.at_keyword("implements") {
            self.bump()?;
            self.eat(Punctuator::Amp)?;
            interfaces.push(self.expect_name()?);
            while self.eat(Punctuator::Amp)? {
                interfaces.push(self.expect_name()?);
            }
        }
        Ok(interfaces)
    }

    fn parse_fields_definition(&mut self) -> PResult<Vec<FieldDefinition>> {
        if !self.eat(Punctuator::BraceL)? {
            return Ok(Vec::new());
        }
        let mut fields = Vec::new();
        loop {
            let description = self.parse_description()?;
            let pos = self.pos();
            let name = self.expect_name()?;
            let arguments = if self.eat(Punctuator::ParenL)? {
                self.parse_input_values(Punctuator::ParenR)?
            } else {
                Vec::new()
            };
            self.expect(Punctuator::Colon)?;
            let ty = self.parse_type()?;
            let directives = self.parse_directives(true)?;
            fields.push(FieldDefinition {
                description,
                name,
                arguments,
                ty,
                directives,
                pos,
            });
            if self.eat(Punctuator::BraceR)? {
                return Ok(fields);
            }
        }
    }

    /// Input values up to and including `close`; the opener is consumed by
    /// the caller.
    fn parse_input_values(&mut self, close: Punctuator) -> PResult<Vec<InputValueDefinition>> {
        let mut values = Vec::new();
        loop {
            let description = self.parse_description()?;
            let pos = self.pos();
            let name = self.expect_name()?;
            self.expect(Punctuator::Colon)?;
            let ty = self.parse_type()?;
            let default_value = if self.eat(Punctuator::Equals)? {
                Some(self.parse_value(true)?)
            } else {
                None
            };
            let directives = self.parse_directives(true)?;
            values.push(InputValueDefinition {
                description,
                name,
                ty,
                default_value,
                directives,
                pos,
            });
            if self.eat(close)? {
                return Ok(values);
            }
        }
    }

    fn parse_enum_values(&mut self) -> PResult<Vec<EnumValueDefinition>> {
        if !self.eat(Punctuator::BraceL)? {
            return Ok(Vec::new());
        }
        let mut values = Vec::new();
        loop {
            let description = self.parse_description()?;
            let pos = self.pos();
            if self.at_keyword("true") || self.at_keyword("false") || self.at_keyword("null") {
                return Err(self.error(format!(
                    "{} is reserved and cannot be used for an enum value",
                    self.peek()
                )));
            }
            let name = self.expect_name()?;
            let directives = self.parse_directives(true)?;
            values.push(EnumValueDefinition {
                description,
                name,
                directives,
                pos,
            });
            if self.eat(Punctuator::BraceR)? {
                return Ok(values);
            }
        }
    }

    pub(crate) fn parse_directive_definition(
        &mut self,
        description: Option<String>,
    ) -> PResult<DirectiveDefinition> {
        let pos = self.pos();
        self.expect_keyword("directive")?;
        self.expect(Punctuator::At)?;
        let name = self.expect_name()?;
        let arguments = if self.eat(Punctuator::ParenL)? {
            self.parse_input_values(Punctuator::ParenR)?
        } else {
            Vec::new()
        };
        let repeatable = if self.at_keyword("repeatable") {
            self.bump()?;
            true
        } else {
            false
        };
        self.expect_keyword("on")?;
        self.eat(Punctuator::Pipe)?;
        let mut locations = vec![self.parse_directive_location()?];
        while self.eat(Punctuator::Pipe)? {
            locations.push(self.parse_directive_location()?);
        }

        Ok(DirectiveDefinition {
            description,
            name,
            arguments,
            repeatable,
            locations,
            pos,
        })
    }

    fn parse_directive_location(&mut self) -> PResult<DirectiveLocation> {
        if !self.at_name() {
            return Err(self.unexpected("a directive location"));
        }
        let failure = self.error(format!("Unknown directive location {}", self.peek()));
        let name = self.expect_name()?;
        name.parse().map_err(|_| failure)
    }
}

use super::{PResult, Parser};
use crate::{
    ast::{
        Field, FragmentDefinition, FragmentSpread, InlineFragment, OperationDefinition,
        OperationKind, Selection, SelectionSet, VariableDefinition,
    },
    lexer::Punctuator,
};

impl Parser<'_> {
    pub(crate) fn parse_operation(&mut self) -> PResult<OperationDefinition> {
        let pos = self.pos();
        if self.at(Punctuator::BraceL) {
            return Ok(OperationDefinition {
                kind: OperationKind::Query,
                name: None,
                variables: Vec::new(),
                directives: Vec::new(),
                selection_set: self.parse_selection_set()?,
                pos,
            });
        }

        let keyword = self.expect_name()?;
        let Some(kind) = OperationKind::from_keyword(&keyword) else {
            return Err(self.error(format!("Unknown operation type '{}'", keyword)));
        };
        let name = if self.at_name() {
            Some(self.expect_name()?)
        } else {
            None
        };
        let variables = self.parse_variable_definitions()?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(OperationDefinition {
            kind,
            name,
            variables,
            directives,
            selection_set,
            pos,
        })
    }

    fn parse_variable_definitions(&mut self) -> PResult<Vec<VariableDefinition>> {
        if !self.eat(Punctuator::ParenL)? {
            return Ok(Vec::new());
        }
        let mut variables = Vec::new();
        loop {
            let pos = self.pos();
            self.expect(Punctuator::Dollar)?;
            let name = self.expect_name()?;
            self.expect(Punctuator::Colon)?;
            let ty = self.parse_type()?;
            let default_value = if self.eat(Punctuator::Equals)? {
                Some(self.parse_value(true)?)
            } else {
                None
            };
            let directives = self.parse_directives(true)?;
            variables.push(VariableDefinition {
                name,
                ty,
                default_value,
                directives,
                pos,
            });
            if self.eat(Punctuator::ParenR)? {
                return Ok(variables);
            }
        }
    }

    /// `{ selection+ }`
    pub(crate) fn parse_selection_set(&mut self) -> PResult<SelectionSet> {
        let pos = self.pos();
        self.expect(Punctuator::BraceL)?;
        let mut selections = Vec::new();
        loop {
            selections.push(self.parse_selection()?);
            if self.eat(Punctuator::BraceR)? {
                return Ok(SelectionSet { selections, pos });
            }
        }
    }

    fn parse_selection(&mut self) -> PResult<Selection> {
        let pos = self.pos();
        if !self.eat(Punctuator::Spread)? {
            return Ok(Selection::Field(self.parse_field()?));
        }

        if self.at_keyword("on") {
            self.bump()?;
            let type_condition = Some(self.expect_name()?);
            let directives = self.parse_directives(false)?;
            let selection_set = self.parse_selection_set()?;
            return Ok(Selection::InlineFragment(InlineFragment {
                type_condition,
                directives,
                selection_set,
                pos,
            }));
        }

        if self.at_name() {
            let name = self.expect_name()?;
            let directives = self.parse_directives(false)?;
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                pos,
            }));
        }

        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;
        Ok(Selection::InlineFragment(InlineFragment {
            type_condition: None,
            directives,
            selection_set,
            pos,
        }))
    }

    fn parse_field(&mut self) -> PResult<Field> {
        let pos = self.pos();
        let first = self.expect_name()?;
        let (alias, name) = if self.eat(Punctuator::Colon)? {
            (Some(first), self.expect_name()?)
        } else {
            (None, first)
        };
        let arguments = self.parse_arguments(false)?;
        let directives = self.parse_directives(false)?;
        let selection_set = if self.at(Punctuator::BraceL) {
            Some(self.parse_selection_set()?)
        } else {
            None
        };

        Ok(Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            pos,
        })
    }

    pub(crate) fn parse_fragment_definition(&mut self) -> PResult<FragmentDefinition> {
        let pos = self.pos();
        self.expect_keyword("fragment")?;
        if self.at_keyword("on") {
            return Err(self.error("Unexpected Name \"on\", fragments cannot be named 'on'"));
        }
        let name = self.expect_name()?;
        self.expect_keyword("on")?;
        let type_condition = self.expect_name()?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            pos,
        })
    }
}

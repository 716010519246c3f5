//! Canonical GraphQL printer for both SDL and executable documents.

use std::fmt::{self, Write as _};

use crate::ast::{
    Argument, Definition, Directive, DirectiveDefinition, Document, EnumValueDefinition,
    FieldDefinition, FragmentDefinition, InputValueDefinition, OperationDefinition,
    SchemaDefinition, Selection, SelectionSet, TypeDefinition, VariableDefinition, write_quoted,
};

/// Prints documents with a fixed indentation.
///
/// Output is deterministic: printing a parsed document and parsing the output
/// again yields the same text.
#[derive(Debug, Clone)]
pub struct Printer {
    indent: String,
}

impl Default for Printer {
    fn default() -> Self {
        Self::with_indent(2)
    }
}

impl Printer {
    pub fn with_indent(width: usize) -> Self {
        Self {
            indent: " ".repeat(width),
        }
    }

    /// Definitions separated by a blank line, with a trailing newline.
    pub fn print(&self, document: &Document) -> String {
        let mut out = String::new();
        for (i, definition) in document.definitions.iter().enumerate() {
            if i > 0 {
                out.push_str("\n\n");
            }
            self.definition(&mut out, definition);
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn print_definition(&self, definition: &Definition) -> String {
        let mut out = String::new();
        self.definition(&mut out, definition);
        out
    }

    pub fn print_operation(&self, operation: &OperationDefinition) -> String {
        let mut out = String::new();
        self.operation(&mut out, operation);
        out
    }

    pub fn print_fragment(&self, fragment: &FragmentDefinition) -> String {
        let mut out = String::new();
        self.fragment(&mut out, fragment);
        out
    }

    fn definition(&self, out: &mut String, definition: &Definition) {
        match definition {
            Definition::Operation(op) => self.operation(out, op),
            Definition::Fragment(fragment) => self.fragment(out, fragment),
            Definition::Schema(schema) => self.schema(out, schema, false),
            Definition::SchemaExtension(schema) => self.schema(out, schema, true),
            Definition::Type(ty) => self.type_definition(out, ty, false),
            Definition::TypeExtension(ty) => self.type_definition(out, ty, true),
            Definition::Directive(directive) => self.directive_definition(out, directive),
        }
    }

    fn pad(&self, out: &mut String, level: usize) {
        for _ in 0..level {
            out.push_str(&self.indent);
        }
    }

    fn description(&self, out: &mut String, description: Option<&str>, level: usize) {
        let Some(description) = description else {
            return;
        };
        self.pad(out, level);
        if description.contains('\n') {
            out.push_str("\"\"\"\n");
            for line in description.split('\n') {
                if !line.is_empty() {
                    self.pad(out, level);
                    out.push_str(&line.replace("\"\"\"", "\\\"\"\""));
                }
                out.push('\n');
            }
            self.pad(out, level);
            out.push_str("\"\"\"");
        } else {
            let _ = write_quoted(out, description);
        }
        out.push('\n');
    }

    fn directives(&self, out: &mut String, directives: &[Directive]) {
        for directive in directives {
            out.push_str(" @");
            out.push_str(&directive.name);
            self.arguments(out, &directive.arguments);
        }
    }

    fn arguments(&self, out: &mut String, arguments: &[Argument]) {
        if arguments.is_empty() {
            return;
        }
        out.push('(');
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{}: {}", argument.name, argument.value);
        }
        out.push(')');
    }

    fn schema(&self, out: &mut String, schema: &SchemaDefinition, is_extension: bool) {
        self.description(out, schema.description.as_deref(), 0);
        if is_extension {
            out.push_str("extend ");
        }
        out.push_str("schema");
        self.directives(out, &schema.directives);
        if schema.root_operations.is_empty() && is_extension {
            return;
        }
        out.push_str(" {\n");
        for root in &schema.root_operations {
            self.pad(out, 1);
            let _ = writeln!(out, "{}: {}", root.kind, root.named_type);
        }
        out.push('}');
    }

    fn type_definition(&self, out: &mut String, ty: &TypeDefinition, is_extension: bool) {
        self.description(out, ty.description(), 0);
        if is_extension {
            out.push_str("extend ");
        }
        out.push_str(ty.keyword());
        out.push(' ');
        out.push_str(ty.name());

        match ty {
            TypeDefinition::Scalar(scalar) => self.directives(out, &scalar.directives),
            TypeDefinition::Object(object) | TypeDefinition::Interface(object) => {
                if !object.implements.is_empty() {
                    out.push_str(" implements ");
                    out.push_str(&object.implements.join(" & "));
                }
                self.directives(out, &object.directives);
                self.block(out, &object.fields, |out, field| self.field_definition(out, field));
            }
            TypeDefinition::Union(union) => {
                self.directives(out, &union.directives);
                if !union.members.is_empty() {
                    out.push_str(" = ");
                    out.push_str(&union.members.join(" | "));
                }
            }
            TypeDefinition::Enum(enumeration) => {
                self.directives(out, &enumeration.directives);
                self.block(out, &enumeration.values, |out, value| {
                    self.enum_value(out, value)
                });
            }
            TypeDefinition::InputObject(input) => {
                self.directives(out, &input.directives);
                self.block(out, &input.fields, |out, field| {
                    self.description(out, field.description.as_deref(), 1);
                    self.pad(out, 1);
                    self.input_value(out, field);
                });
            }
        }
    }

    fn block<T>(&self, out: &mut String, items: &[T], mut item: impl FnMut(&mut String, &T)) {
        if items.is_empty() {
            return;
        }
        out.push_str(" {\n");
        for it in items {
            item(out, it);
            out.push('\n');
        }
        out.push('}');
    }

    fn field_definition(&self, out: &mut String, field: &FieldDefinition) {
        self.description(out, field.description.as_deref(), 1);
        self.pad(out, 1);
        out.push_str(&field.name);
        self.argument_definitions(out, &field.arguments, 1);
        let _ = write!(out, ": {}", field.ty);
        self.directives(out, &field.directives);
    }

    fn enum_value(&self, out: &mut String, value: &EnumValueDefinition) {
        self.description(out, value.description.as_deref(), 1);
        self.pad(out, 1);
        out.push_str(&value.name);
        self.directives(out, &value.directives);
    }

    /// Inline unless an argument carries a description.
    fn argument_definitions(&self, out: &mut String, arguments: &[InputValueDefinition], level: usize) {
        if arguments.is_empty() {
            return;
        }
        if arguments.iter().all(|arg| arg.description.is_none()) {
            out.push('(');
            for (i, argument) in arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.input_value(out, argument);
            }
            out.push(')');
            return;
        }

        out.push_str("(\n");
        for argument in arguments {
            self.description(out, argument.description.as_deref(), level + 1);
            self.pad(out, level + 1);
            self.input_value(out, argument);
            out.push('\n');
        }
        self.pad(out, level);
        out.push(')');
    }

    fn input_value(&self, out: &mut String, value: &InputValueDefinition) {
        let _ = write!(out, "{}: {}", value.name, value.ty);
        if let Some(default) = &value.default_value {
            let _ = write!(out, " = {}", default);
        }
        self.directives(out, &value.directives);
    }

    fn directive_definition(&self, out: &mut String, directive: &DirectiveDefinition) {
        self.description(out, directive.description.as_deref(), 0);
        out.push_str("directive @");
        out.push_str(&directive.name);
        self.argument_definitions(out, &directive.arguments, 0);
        if directive.repeatable {
            out.push_str(" repeatable");
        }
        out.push_str(" on ");
        let locations: Vec<_> = directive.locations.iter().map(|l| l.as_str()).collect();
        out.push_str(&locations.join(" | "));
    }

    fn operation(&self, out: &mut String, operation: &OperationDefinition) {
        if !operation.is_shorthand() {
            out.push_str(operation.kind.as_str());
            if let Some(name) = &operation.name {
                out.push(' ');
                out.push_str(name);
            }
            if !operation.variables.is_empty() {
                if operation.name.is_none() {
                    out.push(' ');
                }
                self.variable_definitions(out, &operation.variables);
            }
            self.directives(out, &operation.directives);
            out.push(' ');
        }
        self.selection_set(out, &operation.selection_set, 0);
    }

    fn variable_definitions(&self, out: &mut String, variables: &[VariableDefinition]) {
        out.push('(');
        for (i, variable) in variables.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "${}: {}", variable.name, variable.ty);
            if let Some(default) = &variable.default_value {
                let _ = write!(out, " = {}", default);
            }
            self.directives(out, &variable.directives);
        }
        out.push(')');
    }

    fn fragment(&self, out: &mut String, fragment: &FragmentDefinition) {
        let _ = write!(
            out,
            "fragment {} on {}",
            fragment.name, fragment.type_condition
        );
        self.directives(out, &fragment.directives);
        out.push(' ');
        self.selection_set(out, &fragment.selection_set, 0);
    }

    fn selection_set(&self, out: &mut String, selection_set: &SelectionSet, level: usize) {
        out.push_str("{\n");
        for selection in &selection_set.selections {
            self.pad(out, level + 1);
            self.selection(out, selection, level + 1);
            out.push('\n');
        }
        self.pad(out, level);
        out.push('}');
    }

    fn selection(&self, out: &mut String, selection: &Selection, level: usize) {
        match selection {
            Selection::Field(field) => {
                if let Some(alias) = &field.alias {
                    out.push_str(alias);
                    out.push_str(": ");
                }
                out.push_str(&field.name);
                self.arguments(out, &field.arguments);
                self.directives(out, &field.directives);
                if let Some(selection_set) = &field.selection_set {
                    out.push(' ');
                    self.selection_set(out, selection_set, level);
                }
            }
            Selection::FragmentSpread(spread) => {
                out.push_str("...");
                out.push_str(&spread.name);
                self.directives(out, &spread.directives);
            }
            Selection::InlineFragment(inline) => {
                out.push_str("...");
                if let Some(type_condition) = &inline.type_condition {
                    out.push_str(" on ");
                    out.push_str(type_condition);
                }
                self.directives(out, &inline.directives);
                out.push(' ');
                self.selection_set(out, &inline.selection_set, level);
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Printer::default().print(self))
    }
}

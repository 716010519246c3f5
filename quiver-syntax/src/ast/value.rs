use std::fmt;

/// An input value literal. Numbers keep their source text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Variable(String),
    Int(String),
    Float(String),
    String(String),
    Boolean(bool),
    Null,
    Enum(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Variable names referenced anywhere inside this value.
    pub fn variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Variable(name) => out.push(name),
            Value::List(items) => items.iter().for_each(|v| v.variables(out)),
            Value::Object(fields) => fields.iter().for_each(|(_, v)| v.variables(out)),
            _ => {}
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Write `value` as a quoted GraphQL string literal.
pub fn write_quoted(f: &mut impl fmt::Write, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{0008}' => f.write_str("\\b")?,
            '\u{000c}' => f.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(f, "\\u{:04X}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Variable(name) => write!(f, "${}", name),
            Value::Int(raw) | Value::Float(raw) => f.write_str(raw),
            Value::String(s) => write_quoted(f, s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => f.write_str("null"),
            Value::Enum(name) => f.write_str(name),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(fields) => {
                f.write_str("{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", name, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let value = Value::Object(vec![
            ("episode".to_string(), Value::Enum("JEDI".to_string())),
            (
                "ids".to_string(),
                Value::List(vec![Value::Int("1".into()), Value::Variable("id".into())]),
            ),
            ("text".to_string(), Value::String("say \"hi\"\n".into())),
        ]);
        assert_eq!(
            value.to_string(),
            r#"{episode: JEDI, ids: [1, $id], text: "say \"hi\"\n"}"#
        );
    }

    #[test]
    fn test_variables() {
        let value = Value::List(vec![
            Value::Variable("a".into()),
            Value::Object(vec![("b".into(), Value::Variable("b".into()))]),
        ]);
        let mut vars = Vec::new();
        value.variables(&mut vars);
        assert_eq!(vars, vec!["a", "b"]);
    }
}

//! Validation context and utilities for manifest parsing.

use miette::SourceSpan;

use crate::{Error, Result};

/// Parsing and validation context that carries source information.
///
/// Holds the source content, filename, and the current table path so
/// validation of nested sections can point at the right key.
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    src: &'a str,
    filename: &'a str,
    /// Table path segments, e.g. `["validation"]`
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    pub fn new(src: &'a str, filename: &'a str) -> Self {
        Self {
            src,
            filename,
            path: Vec::new(),
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn filename(&self) -> &'a str {
        self.filename
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self {
            src: self.src,
            filename: self.filename,
            path,
        }
    }

    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Find the span of a key inside the current table.
    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        match self.path.last() {
            Some(table) => find_key_span(self.src, table, name),
            None => find_name_span(self.src, name),
        }
    }

    /// Validate that a name can be used as a package or module name.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        let span = self.find_span(name);
        if is_reserved_keyword(name) {
            return Err(Error::reserved_keyword(
                name,
                kind,
                self.src,
                self.filename,
                span,
            ));
        }
        if let Some(reason) = validate_identifier(name) {
            return Err(Error::invalid_identifier(
                name,
                kind,
                reason,
                self.src,
                self.filename,
                span,
            ));
        }
        Ok(())
    }

    /// Validate that a name is a GraphQL name (`/[_A-Za-z][_0-9A-Za-z]*/`).
    pub fn validate_graphql_name(&self, name: &str, kind: &str) -> Result<()> {
        if let Some(reason) = validate_graphql_name(name) {
            return Err(Error::invalid_identifier(
                name,
                kind,
                reason,
                self.src,
                self.filename,
                self.find_span(name),
            ));
        }
        Ok(())
    }
}

/// Keywords that cannot name a generated package or module.
pub(crate) const RESERVED_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "try", "typeof", "unsized", "virtual", "yield", "union",
];

pub(crate) fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name)
}

/// Find `name` as a key: `name =`, `name=`, `"name" =` or `.name]`.
pub(crate) fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    let patterns = [
        (format!("\n{} =", name), 1),
        (format!("\n{}=", name), 1),
        (format!("\n\"{}\"", name), 2),
        (format!(".{}]", name), 1),
    ];
    for (pattern, skip) in &patterns {
        if let Some(pos) = src.find(pattern.as_str()) {
            return Some(SourceSpan::from((pos + skip, name.len())));
        }
    }
    if src.starts_with(name) {
        return Some(SourceSpan::from((0, name.len())));
    }
    src.find(name)
        .map(|pos| SourceSpan::from((pos, name.len())))
}

/// Like [`find_name_span`] but only after the `[table]` header.
pub(crate) fn find_key_span(src: &str, table: &str, name: &str) -> Option<SourceSpan> {
    let header = format!("[{}]", table);
    let Some(start) = src.find(&header) else {
        return find_name_span(src, name);
    };
    let section = &src[start..];
    find_name_span(section, name).map(|span| SourceSpan::from((span.offset() + start, span.len())))
}

/// Returns None if valid, Some(reason) if invalid. Dashes are allowed and
/// become underscores in generated names.
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("name cannot be empty");
    }
    if is_reserved_keyword(&name.replace('-', "_")) {
        return Some("name converts to a reserved keyword");
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return Some("name must start with a letter or underscore"),
    }

    let mut prev_was_dash = false;
    for c in chars {
        if c == '-' {
            if prev_was_dash {
                return Some("name cannot contain consecutive dashes");
            }
            prev_was_dash = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            prev_was_dash = false;
        } else {
            return Some("name must contain only letters, numbers, underscores, and dashes");
        }
    }
    if prev_was_dash {
        return Some("name cannot end with a dash");
    }
    None
}

pub(crate) fn validate_graphql_name(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => Some("name cannot be empty"),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            Some("name must start with a letter or underscore")
        }
        _ if name.starts_with("__") => Some("names starting with '__' are reserved for introspection"),
        _ if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') => None,
        _ => Some("name must contain only letters, numbers, and underscores"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("starwars").is_none());
        assert!(validate_identifier("star_wars").is_none());
        assert!(validate_identifier("star-wars").is_none());
        assert!(validate_identifier("_private").is_none());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_some());
        assert!(validate_identifier("1st").is_some());
        assert!(validate_identifier("-name").is_some());
        assert!(validate_identifier("name-").is_some());
        assert!(validate_identifier("a--b").is_some());
        assert!(validate_identifier("hello world").is_some());
        assert!(validate_identifier("type").is_some());
    }

    #[test]
    fn test_graphql_names() {
        assert!(validate_graphql_name("DateTime").is_none());
        assert!(validate_graphql_name("_Any").is_none());
        assert!(validate_graphql_name("Date-Time").is_some());
        assert!(validate_graphql_name("9Lives").is_some());
        assert!(validate_graphql_name("__Type").is_some());
    }

    #[test]
    fn test_find_key_span_in_table() {
        let src = "[project]\nname = \"x\"\n\n[validation]\nname = \"warn\"\n";
        let span = find_key_span(src, "validation", "name").unwrap();
        assert_eq!(span.offset(), 34);
        assert_eq!(span.len(), 4);
    }

    #[test]
    fn test_find_quoted_key() {
        let src = "[scalars]\n\"Date-Time\" = \"x\"\n";
        let span = find_name_span(src, "Date-Time").unwrap();
        assert_eq!(span.offset(), 11);
    }

    #[test]
    fn test_push_path() {
        let ctx = ParseContext::new("", "quiver.toml");
        assert_eq!(ctx.path_string(), "");
        assert_eq!(ctx.push("codegen").push("output").path_string(), "codegen.output");
    }

    #[test]
    fn test_validate_name_keyword() {
        let ctx = ParseContext::new("[project]\nname = \"fn\"\n", "quiver.toml");
        let err = ctx.validate_name("fn", "project").unwrap_err();
        assert!(err.to_string().contains("reserved keyword"));
    }
}

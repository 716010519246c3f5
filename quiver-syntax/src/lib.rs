//! GraphQL lexer, parser, AST and printer.
//!
//! ```
//! use quiver_syntax::{Document, Printer};
//!
//! let document = Document::parse("query Hero { hero { name } }").unwrap();
//! assert_eq!(
//!     Printer::default().print(&document),
//!     "query Hero {\n  hero {\n    name\n  }\n}\n"
//! );
//! ```

pub mod ast;
mod error;
pub mod lexer;
mod parser;
mod position;
mod printer;

use std::path::Path;

pub use ast::Document;
pub use error::{Error, Result, SyntaxError};
pub use parser::{parse_const_value, parse_document};
pub use position::{Position, Spanned};
pub use printer::Printer;

impl Document {
    /// Parse `src` with a placeholder file name for diagnostics.
    pub fn parse(src: &str) -> Result<Document> {
        Self::parse_with_filename(src, "<input>")
    }

    pub fn parse_with_filename(src: &str, filename: &str) -> Result<Document> {
        parse_document(src).map_err(|errors| Error::syntax(errors, src, filename))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Document> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source,
            })
        })?;
        Self::parse_with_filename(&src, &path.display().to_string())
    }
}

/// Parse a document that may only contain operations and fragments.
pub fn parse_executable(src: &str, filename: &str) -> Result<Document> {
    let document = Document::parse_with_filename(src, filename)?;
    let errors: Vec<_> = document
        .definitions
        .iter()
        .filter(|def| !def.is_executable())
        .map(|def| {
            SyntaxError::new(
                "Type system definitions are not allowed in executable documents",
                def.pos(),
                1,
            )
        })
        .collect();
    if errors.is_empty() {
        Ok(document)
    } else {
        Err(Error::syntax(errors, src, filename))
    }
}

/// Parse a type-system (SDL) document.
pub fn parse_schema(src: &str, filename: &str) -> Result<Document> {
    let document = Document::parse_with_filename(src, filename)?;
    let errors: Vec<_> = document
        .definitions
        .iter()
        .filter(|def| def.is_executable())
        .map(|def| {
            SyntaxError::new(
                "Executable definitions are not allowed in schema documents",
                def.pos(),
                1,
            )
        })
        .collect();
    if errors.is_empty() {
        Ok(document)
    } else {
        Err(Error::syntax(errors, src, filename))
    }
}

use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::{lexer::LexError, position::Position};

/// Result type for quiver-syntax operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// A single positioned syntax problem.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(quiver::syntax_error))]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    #[label("{message}")]
    pub span: SourceSpan,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, pos: Position, len: usize) -> Self {
        Self {
            message: message.into(),
            line: pos.line,
            column: pos.column,
            span: SourceSpan::new(pos.offset.into(), len.max(1)),
        }
    }
}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        SyntaxError::new(err.message.clone(), err.position(), 1)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} syntax error(s) in {name}", errors.len())]
    #[diagnostic(code(quiver::parse_error))]
    Syntax {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[related]
        errors: Vec<SyntaxError>,
    },
}

impl Error {
    pub fn syntax(errors: Vec<SyntaxError>, src: &str, filename: &str) -> Box<Self> {
        Box::new(Error::Syntax {
            name: filename.to_string(),
            src: NamedSource::new(filename, src.to_string()),
            errors,
        })
    }

    /// The individual syntax errors, empty for I/O failures.
    pub fn syntax_errors(&self) -> &[SyntaxError] {
        match self {
            Error::Syntax { errors, .. } => errors,
            Error::Io { .. } => &[],
        }
    }
}

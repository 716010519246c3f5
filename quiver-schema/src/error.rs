use std::path::PathBuf;

use miette::Diagnostic;
use quiver_syntax::Position;
use thiserror::Error;

/// Result type for quiver-schema operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(quiver_syntax::Error),

    #[error("type '{name}' is defined more than once ({pos})")]
    #[diagnostic(code(quiver::duplicate_type))]
    DuplicateType { name: String, pos: Position },

    #[error("directive '@{name}' is defined more than once ({pos})")]
    #[diagnostic(code(quiver::duplicate_directive))]
    DuplicateDirective { name: String, pos: Position },

    #[error("cannot extend '{name}': no such type is defined ({pos})")]
    #[diagnostic(code(quiver::missing_extension_target))]
    MissingExtensionTarget { name: String, pos: Position },

    #[error("cannot extend {found} '{name}' with an {expected} extension ({pos})")]
    #[diagnostic(code(quiver::extension_kind_mismatch))]
    ExtensionKindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
        pos: Position,
    },

    #[error("schema has no query root type")]
    #[diagnostic(
        code(quiver::missing_query_root),
        help("define a 'Query' type or a 'schema {{ query: ... }}' definition")
    )]
    MissingQueryRoot,

    #[error("{kind} root type '{name}' is not defined")]
    #[diagnostic(code(quiver::missing_root_type))]
    MissingRootType { kind: &'static str, name: String },

    #[error("{kind} root type '{name}' must be an object type")]
    #[diagnostic(code(quiver::invalid_root_type))]
    RootTypeNotObject { kind: &'static str, name: String },

    #[error("unknown type '{name}' referenced by {referenced_by}")]
    #[diagnostic(code(quiver::unknown_type))]
    UnknownType { name: String, referenced_by: String },

    #[error("invalid introspection result: {message}")]
    #[diagnostic(code(quiver::invalid_introspection))]
    Introspection { message: String },

    #[error("failed to parse introspection JSON")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }

    pub(crate) fn introspection(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Introspection {
            message: message.into(),
        })
    }
}

impl From<Box<quiver_syntax::Error>> for Box<Error> {
    fn from(err: Box<quiver_syntax::Error>) -> Self {
        Box::new(Error::Syntax(*err))
    }
}

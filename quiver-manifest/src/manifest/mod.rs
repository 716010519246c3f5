//! Manifest types and parsing for quiver.toml files.

mod file;
mod parse;
mod sections;
mod validate;

pub use file::QuiverToml;
pub use parse::parse_manifest;
pub use sections::{OperationsConfig, ProjectConfig, ScalarsConfig, SchemaConfig};
use serde::Deserialize;
pub use validate::ParseContext;

use crate::{CodegenConfig, ValidationConfig};

/// Root manifest for quiver.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project: ProjectConfig,

    /// Schema sources, SDL or introspection JSON
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Executable documents, files or directories
    #[serde(default)]
    pub operations: OperationsConfig,

    #[serde(default)]
    pub codegen: CodegenConfig,

    /// Lint level overrides
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Custom scalar bindings
    #[serde(default)]
    pub scalars: ScalarsConfig,
}

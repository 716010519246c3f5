//! `quiver.toml` parsing and validation.
//!
//! ```
//! use quiver_manifest::{IssueLevel, Manifest};
//!
//! let manifest: Manifest = r#"
//! [project]
//! name = "starwars"
//!
//! [validation]
//! unused-fragment = "error"
//! "#
//! .parse()
//! .unwrap();
//!
//! assert_eq!(manifest.project.name, "starwars");
//! assert_eq!(manifest.validation.level("unused-fragment"), Some(IssueLevel::Error));
//! ```

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod codegen;
mod error;
mod manifest;
mod validation;

pub use codegen::{CodegenConfig, TypenameMode};
pub use error::{Error, Result, SourceContext};
pub use manifest::{
    Manifest, OperationsConfig, ParseContext, ProjectConfig, QuiverToml, ScalarsConfig,
    SchemaConfig, parse_manifest,
};
pub use validation::{IssueLevel, KNOWN_LINTS, ValidationConfig};

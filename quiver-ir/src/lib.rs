//! Intermediate representation types for the quiver GraphQL compiler.
//!
//! The IR is what the compiler hands to everything downstream of it: source
//! emitters render models from it, the response runtime decodes JSON with it,
//! and separately compiled modules link against each other through its
//! resolver entries.
//!
//! # Architecture
//!
//! ```text
//! .graphql → quiver-syntax (AST) → quiver-compiler (lower, flatten) → quiver-ir → emitters / runtime
//! ```
//!
//! The IR types are designed to be:
//! - Language-agnostic (no Rust/Kotlin/TypeScript-specific concerns)
//! - Serializable (field order and model ids are part of the file format)
//! - Self-contained (no reference back into the AST or schema)

mod document;
mod error;
mod field;
mod manifest;
mod model;
mod operation;
mod resolver;
mod types;

pub use document::IrDocument;
pub use error::IrError;
pub use field::{FieldSet, ResponseField};
pub use manifest::{OperationManifest, PersistedOperation};
pub use model::{AccessorKind, IrAccessor, IrModel, IrModelGroup, IrProperty};
pub use operation::{IrFragment, IrOperation, IrVariable, OperationType};
pub use resolver::{Resolver, ResolverEntry, ResolverKey, ResolverKind};
pub use types::{BooleanExpression, IrType, IrValue};

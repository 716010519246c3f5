//! Core utilities and types for the quiver GraphQL compiler.
//!
//! This crate provides the small building blocks shared across the quiver
//! workspace: name casing for generated models, artifact file writing, a
//! thread-safe memoizing map and the IR format version.

mod file;
mod memo;
mod utils;
mod version;

// File operations
pub use file::{File, WriteResult};
pub use memo::MemoMap;
// String utilities
pub use utils::{capitalize, decapitalize, to_pascal_case};
pub use version::FormatVersion;

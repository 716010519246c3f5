//! GraphQL schema registry.
//!
//! A [`Schema`] is built from SDL documents (extensions merged) or from an
//! introspection result, and answers the questions the compiler asks while
//! validating and lowering operations: field lookup, possible types of
//! abstract types, and type-condition satisfaction.

mod builtins;
mod error;
mod introspection;
mod schema;

pub use builtins::{is_builtin_directive, is_builtin_scalar};
pub use error::{Error, Result};
pub use schema::Schema;

//! Response adapters for the quiver GraphQL toolchain.
//!
//! Decodes GraphQL responses into typed model instances using the selection
//! descriptors the compiler emits, and encodes them back.
//!
//! # Module Organization
//!
//! - [`json`] - streaming JSON readers and writers
//! - [`adapter`] - the [`Adapter`] contract, scalar adapters and combinators
//! - [`model`] - adapters built from IR field sets, with `__typename` dispatch
//! - [`operation`] - whole-response decoding for one operation

pub mod adapter;
mod error;
pub mod json;
pub mod model;
pub mod operation;
mod path;
mod value;

pub use adapter::{Adapter, AdapterContext, CustomScalarAdapters};
pub use error::{AdapterError, Result};
pub use model::ModelAdapter;
pub use operation::{GraphQLError, Location, OperationAdapter, Response};
pub use path::{PathElement, ResponsePath};
pub use value::{ResponseObject, ResponseValue};

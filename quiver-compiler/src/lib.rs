//! Operation compiler for the quiver GraphQL toolchain.
//!
//! Takes a schema and a set of executable documents and produces the IR
//! every downstream generator consumes.
//!
//! # Module Organization
//!
//! - [`pipeline`] - phases, plugins and the [`Pipeline`](pipeline::Pipeline) runner
//! - [`ir`] - lowering of validated documents to model groups
//! - [`flatten`] - hoisting and deduplication of nested model groups
//! - [`operation_id`] - operation id strategies
//! - [`testing`] - test utilities (feature-gated)

pub mod flatten;
pub mod ir;
pub mod operation_id;
pub mod pipeline;

mod options;
mod scalars;
mod selections;
mod sources;
mod typename;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use operation_id::{OperationIdGenerator, Sha256Ids};
pub use options::CompilerOptions;
pub use scalars::IncompatibleType;
pub use sources::{DOCUMENT_EXTENSIONS, DocumentSet, SourceDocument, location};
pub use typename::add_typename;

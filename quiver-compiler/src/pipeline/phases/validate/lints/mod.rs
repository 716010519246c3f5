//! Built-in lints for executable documents.

mod arguments;
mod deprecated;
mod directives;
mod fields;
mod fragments;
mod operations;
mod variables;

pub use arguments::{ArgumentsLint, TypeMismatchLint};
pub use deprecated::DeprecatedUsageLint;
pub use directives::UnknownDirectiveLint;
pub use fields::{ConflictingFieldsLint, FieldNotFoundLint, SelectionShapeLint};
pub use fragments::{
    FragmentCycleLint, FragmentTypeConditionLint, UnknownFragmentLint, UnusedFragmentLint,
};
pub use operations::{AnonymousOperationLint, DuplicateOperationLint};
pub use variables::{UnusedVariableLint, VariablesLint};

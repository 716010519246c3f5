//! Definitions every schema has whether or not its SDL declares them.

pub(crate) const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

pub(crate) const BUILTIN_DIRECTIVES: &[&str] = &["skip", "include", "deprecated", "specifiedBy"];

pub(crate) const BUILTIN_SDL: &str = r#"
scalar Int
scalar Float
scalar String
scalar Boolean
scalar ID

directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
directive @specifiedBy(url: String!) on SCALAR
"#;

/// Introspection meta fields, resolved without being declared.
pub(crate) const META_SDL: &str = r#"
type __Meta {
  __typename: String!
  __schema: __Schema!
  __type(name: String!): __Type
}
"#;

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

pub fn is_builtin_directive(name: &str) -> bool {
    BUILTIN_DIRECTIVES.contains(&name)
}

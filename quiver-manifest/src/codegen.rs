//! The `[codegen]` section.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Where the compiler inserts `__typename` into selection sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypenameMode {
    /// Every composite selection set.
    Always,
    /// Selection sets containing an inline fragment or a fragment spread.
    IfFragments,
    /// Selection sets whose type is abstract and that branch on a type condition.
    #[default]
    IfPolymorphic,
    /// Selection sets whose type is an interface or a union.
    IfAbstract,
}

impl TypenameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypenameMode::Always => "always",
            TypenameMode::IfFragments => "if-fragments",
            TypenameMode::IfPolymorphic => "if-polymorphic",
            TypenameMode::IfAbstract => "if-abstract",
        }
    }
}

impl fmt::Display for TypenameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TypenameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "always" => Ok(TypenameMode::Always),
            "if-fragments" => Ok(TypenameMode::IfFragments),
            "if-polymorphic" => Ok(TypenameMode::IfPolymorphic),
            "if-abstract" => Ok(TypenameMode::IfAbstract),
            _ => Err(format!(
                "unknown typename mode '{}', expected one of: always, if-fragments, if-polymorphic, if-abstract",
                s
            )),
        }
    }
}

/// Compiler output and IR shaping options.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CodegenConfig {
    /// Directory receiving `ir.json`, `operations.json` and `resolver.json`
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub add_typename: TypenameMode,

    /// Maximum model nesting depth before groups are hoisted to the root.
    /// Zero keeps the tree as built.
    #[serde(default)]
    pub flatten_depth: usize,

    /// Operation id strategy
    #[serde(default = "default_operation_ids")]
    pub operation_ids: String,

    /// Resolver file of an upstream module, consulted before local entries
    pub upstream_resolver: Option<PathBuf>,
}

fn default_output() -> PathBuf {
    PathBuf::from("build/quiver")
}

fn default_operation_ids() -> String {
    "sha256".to_string()
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            add_typename: TypenameMode::default(),
            flatten_depth: 0,
            operation_ids: default_operation_ids(),
            upstream_resolver: None,
        }
    }
}

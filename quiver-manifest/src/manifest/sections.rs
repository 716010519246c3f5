use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::ParseContext;
use crate::Result;

/// Project metadata
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Used to name generated packages
    pub name: String,

    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default = "default_schema_files")]
    pub files: Vec<PathBuf>,
}

fn default_schema_files() -> Vec<PathBuf> {
    vec![PathBuf::from("schema.graphqls")]
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            files: default_schema_files(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OperationsConfig {
    /// Files or directories; directories are searched for `.graphql` and `.gql`
    #[serde(default = "default_operation_files")]
    pub files: Vec<PathBuf>,
}

fn default_operation_files() -> Vec<PathBuf> {
    vec![PathBuf::from("graphql")]
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            files: default_operation_files(),
        }
    }
}

/// Custom scalar name → target type reference, in file order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ScalarsConfig {
    bindings: IndexMap<String, String>,
}

impl ScalarsConfig {
    pub fn get(&self, scalar: &str) -> Option<&str> {
        self.bindings.get(scalar).map(String::as_str)
    }

    pub fn insert(&mut self, scalar: impl Into<String>, target: impl Into<String>) {
        self.bindings.insert(scalar.into(), target.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn validate(&self, ctx: &ParseContext) -> Result<()> {
        for (scalar, target) in &self.bindings {
            ctx.validate_graphql_name(scalar, "scalar")?;
            if target.trim().is_empty() {
                return Err(crate::SourceContext::new(ctx.src(), ctx.filename()).validation_error(
                    format!("scalar '{}' is bound to an empty target type", scalar),
                    ctx.find_span(scalar),
                ));
            }
        }
        Ok(())
    }
}

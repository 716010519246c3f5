//! Compiler settings derived from `quiver.toml`.

use std::{collections::HashMap, fmt, sync::Arc};

use eyre::{Result, WrapErr, eyre};
use quiver_ir::{Resolver, ResolverEntry};
use quiver_manifest::{Manifest, QuiverToml, ScalarsConfig, TypenameMode, ValidationConfig};

use crate::{
    flatten::RemovalTree,
    operation_id::{self, OperationIdGenerator, Sha256Ids},
};

/// Everything the pipeline needs besides the schema and the documents.
#[derive(Clone)]
pub struct CompilerOptions {
    pub add_typename: TypenameMode,
    /// Groups nested deeper than this are hoisted to the root. 0 disables it.
    pub flatten_depth: usize,
    /// Explicit hoisting requests, keyed by operation or fragment name.
    pub removals: HashMap<String, RemovalTree>,
    pub validation: ValidationConfig,
    pub scalars: ScalarsConfig,
    /// Resolver of the module this one builds on.
    pub upstream: Option<Arc<Resolver>>,
    pub ids: Arc<dyn OperationIdGenerator>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            add_typename: TypenameMode::default(),
            flatten_depth: 0,
            removals: HashMap::new(),
            validation: ValidationConfig::default(),
            scalars: ScalarsConfig::default(),
            upstream: None,
            ids: Arc::new(Sha256Ids),
        }
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("add_typename", &self.add_typename)
            .field("flatten_depth", &self.flatten_depth)
            .field("removals", &self.removals.keys().collect::<Vec<_>>())
            .field("validation", &self.validation)
            .field("scalars", &self.scalars)
            .field("upstream", &self.upstream.as_ref().map(|r| r.len()))
            .field("ids", &self.ids.name())
            .finish()
    }
}

impl CompilerOptions {
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let ids = operation_id::by_name(&manifest.codegen.operation_ids).ok_or_else(|| {
            eyre!(
                "unknown operation id strategy '{}'",
                manifest.codegen.operation_ids
            )
        })?;
        Ok(Self {
            add_typename: manifest.codegen.add_typename,
            flatten_depth: manifest.codegen.flatten_depth,
            removals: HashMap::new(),
            validation: manifest.validation.clone(),
            scalars: manifest.scalars.clone(),
            upstream: None,
            ids: Arc::from(ids),
        })
    }

    /// Options for a loaded project, reading the upstream resolver if one is
    /// configured.
    pub fn from_project(project: &QuiverToml) -> Result<Self> {
        let mut options = Self::from_manifest(project.manifest())?;
        if let Some(path) = project.upstream_resolver() {
            let json = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("failed to read upstream resolver '{}'", path.display()))?;
            let entries: Vec<ResolverEntry> = serde_json::from_str(&json)
                .wrap_err_with(|| format!("invalid upstream resolver '{}'", path.display()))?;
            let resolver = Resolver::from_entries(entries)
                .wrap_err_with(|| format!("invalid upstream resolver '{}'", path.display()))?;
            tracing::debug!(path = %path.display(), entries = resolver.len(), "loaded upstream resolver");
            options.upstream = Some(Arc::new(resolver));
        }
        Ok(options)
    }

    pub fn with_removals(mut self, name: impl Into<String>, tree: RemovalTree) -> Self {
        self.removals.insert(name.into(), tree);
        self
    }
}

//! Loading a project from its quiver.toml.

use std::path::Path;

use miette::{Diagnostic, Report};
use quiver_compiler::{CompilerOptions, DocumentSet};
use quiver_manifest::QuiverToml;
use quiver_schema::Schema;

/// Everything a compilation needs, read from disk.
pub struct Project {
    pub config: QuiverToml,
    pub schema: Schema,
    pub documents: DocumentSet,
    pub options: CompilerOptions,
}

impl Project {
    /// Open the manifest and load the schema and documents it points at.
    ///
    /// Failures keep their source spans so they render as miette reports.
    pub fn open(path: &Path) -> miette::Result<Self> {
        let config = QuiverToml::open(path).map_err(report)?;
        let schema = open_schema(&config)?;
        let documents = DocumentSet::load(&config.operation_paths()).map_err(report)?;
        let options =
            CompilerOptions::from_project(&config).map_err(|e| miette::miette!("{:#}", e))?;

        tracing::info!(
            project = %config.manifest().project.name,
            documents = documents.sources().len(),
            "project loaded"
        );

        Ok(Self {
            config,
            schema,
            documents,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.manifest().project.name
    }
}

/// Only the schema; used by commands that never look at operations.
pub fn open_schema(config: &QuiverToml) -> miette::Result<Schema> {
    Schema::from_files(&config.schema_files()).map_err(report)
}

fn report<E>(error: Box<E>) -> Report
where
    E: Diagnostic + Send + Sync + 'static,
{
    Report::new(*error)
}

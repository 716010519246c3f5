use std::path::{Path, PathBuf};

use super::Manifest;
use crate::{Error, Result};

/// A quiver.toml on disk with both raw content and parsed manifest.
///
/// Relative paths inside the manifest are resolved against the directory
/// containing the file.
pub struct QuiverToml {
    path: PathBuf,
    content: String,
    manifest: Manifest,
}

impl QuiverToml {
    /// Open and parse a quiver.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Directory containing the manifest.
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Resolve a manifest-relative path.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    pub fn schema_files(&self) -> Vec<PathBuf> {
        self.manifest.schema.files.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn operation_paths(&self) -> Vec<PathBuf> {
        self.manifest
            .operations
            .files
            .iter()
            .map(|p| self.resolve(p))
            .collect()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.manifest.codegen.output)
    }

    pub fn upstream_resolver(&self) -> Option<PathBuf> {
        self.manifest
            .codegen
            .upstream_resolver
            .as_ref()
            .map(|p| self.resolve(p))
    }
}

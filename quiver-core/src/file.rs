use std::path::{Path, PathBuf};

use eyre::Result;

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written
    Written,
    /// File already had identical content and was left alone
    Unchanged,
}

/// An artifact produced by the compiler (IR, manifest, resolver file).
#[derive(Debug, Clone)]
pub struct File {
    path: PathBuf,
    content: String,
}

impl File {
    /// Create a new file with the given path and content
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the file, leaving it untouched when the content is identical.
    ///
    /// Timestamps stay stable for build tools watching the output directory.
    pub fn write(&self) -> Result<WriteResult> {
        if self.exists()
            && std::fs::read_to_string(&self.path).is_ok_and(|current| current == self.content)
        {
            tracing::debug!(path = %self.path.display(), "artifact unchanged");
            return Ok(WriteResult::Unchanged);
        }

        write_file(&self.path, &self.content)?;
        tracing::debug!(path = %self.path.display(), bytes = self.content.len(), "artifact written");
        Ok(WriteResult::Written)
    }
}

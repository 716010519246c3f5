//! Executable documents as loaded from disk.

use std::path::{Path, PathBuf};

use quiver_syntax::{
    Document, Error, Position, Result,
    ast::{Definition, FragmentDefinition, OperationDefinition},
    parse_executable,
};

/// File extensions picked up when a directory is listed in `[operations]`.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["graphql", "gql"];

/// One parsed executable document and the name used in diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub name: String,
    pub document: Document,
}

/// All executable documents of a compilation unit.
///
/// Operations and fragments share one namespace across files, so lookups go
/// through the set rather than a single document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSet {
    sources: Vec<SourceDocument>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `src` and add it under `name`.
    pub fn add_source(&mut self, name: impl Into<String>, src: &str) -> Result<()> {
        let name = name.into();
        let document = parse_executable(src, &name)?;
        self.sources.push(SourceDocument { name, document });
        Ok(())
    }

    pub fn add_document(&mut self, name: impl Into<String>, document: Document) {
        self.sources.push(SourceDocument {
            name: name.into(),
            document,
        });
    }

    /// Load files and directories. Directories are searched recursively for
    /// `.graphql` and `.gql` files, in sorted order.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut files = Vec::new();
        for path in paths {
            collect_files(path.as_ref(), &mut files)?;
        }

        let mut set = Self::new();
        for file in files {
            tracing::debug!(path = %file.display(), "loading document");
            let src = std::fs::read_to_string(&file).map_err(|source| {
                Box::new(Error::Io {
                    path: file.clone(),
                    source,
                })
            })?;
            set.add_source(file.display().to_string(), &src)?;
        }
        Ok(set)
    }

    pub fn sources(&self) -> &[SourceDocument] {
        &self.sources
    }

    pub(crate) fn sources_mut(&mut self) -> &mut [SourceDocument] {
        &mut self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(|s| s.document.definitions.is_empty())
    }

    /// Every definition with the name of the file it came from.
    pub fn definitions(&self) -> impl Iterator<Item = (&str, &Definition)> {
        self.sources.iter().flat_map(|source| {
            source
                .document
                .definitions
                .iter()
                .map(move |d| (source.name.as_str(), d))
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = (&str, &OperationDefinition)> {
        self.definitions().filter_map(|(file, d)| match d {
            Definition::Operation(op) => Some((file, op)),
            _ => None,
        })
    }

    pub fn fragments(&self) -> impl Iterator<Item = (&str, &FragmentDefinition)> {
        self.definitions().filter_map(|(file, d)| match d {
            Definition::Fragment(fragment) => Some((file, fragment)),
            _ => None,
        })
    }

    /// The first fragment named `name`.
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments()
            .map(|(_, f)| f)
            .find(|f| f.name == name)
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDefinition> {
        self.operations()
            .map(|(_, op)| op)
            .find(|op| op.name.as_deref() == Some(name))
    }
}

/// `file:line:column`, the location format of diagnostics.
pub fn location(file: &str, pos: Position) -> String {
    format!("{}:{}", file, pos)
}

fn collect_files(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let io_error = |source| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    if !path.is_dir() {
        out.push(path.to_path_buf());
        return Ok(());
    }

    let mut entries = std::fs::read_dir(path)
        .map_err(io_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_error)?;
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            collect_files(&entry, out)?;
        } else if entry
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext))
        {
            out.push(entry);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_across_files() {
        let mut set = DocumentSet::new();
        set.add_source("a.graphql", "query Hero { hero { ...HeroName } }")
            .unwrap();
        set.add_source("b.graphql", "fragment HeroName on Character { name }")
            .unwrap();

        assert!(set.operation("Hero").is_some());
        assert_eq!(set.fragment("HeroName").unwrap().type_condition, "Character");
        let files: Vec<_> = set.definitions().map(|(file, _)| file).collect();
        assert_eq!(files, vec!["a.graphql", "b.graphql"]);
    }

    #[test]
    fn test_type_definitions_are_rejected() {
        let mut set = DocumentSet::new();
        let err = set.add_source("a.graphql", "type Query { a: Int }").unwrap_err();
        assert!(err.to_string().contains("a.graphql"));
    }

    #[test]
    fn test_load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("b.graphql"), "query B { b }").unwrap();
        std::fs::write(nested.join("a.gql"), "query A { a }").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not graphql").unwrap();

        let set = DocumentSet::load(&[dir.path()]).unwrap();
        let names: Vec<_> = set
            .operations()
            .filter_map(|(_, op)| op.name.as_deref())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_location() {
        assert_eq!(location("a.graphql", Position::new(3, 5, 20)), "a.graphql:3:5");
    }
}

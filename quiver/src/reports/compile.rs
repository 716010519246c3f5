//! Compile command report data structures.

use std::path::PathBuf;

use quiver_core::WriteResult;

use super::{
    check::plural,
    output::{Output, Report},
};

/// Report data from a compilation.
#[derive(Debug)]
pub struct CompileReport {
    pub project_name: String,

    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,

    pub operation_count: usize,
    pub fragment_count: usize,
    /// Models across all operations and fragments, after flattening.
    pub model_count: usize,
    /// Resolver entries registered by this project.
    pub resolver_count: usize,

    pub result: CompileResult,
}

/// Result of a compilation.
#[derive(Debug)]
pub enum CompileResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    /// Each artifact and whether it actually changed.
    pub files: Vec<(PathBuf, WriteResult)>,
    /// Path to phase snapshots, if visualization was enabled.
    pub debug_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub struct PreviewResult {
    pub files: Vec<ArtifactFile>,
}

/// An artifact and the content it would be written with.
#[derive(Debug)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub content: String,
}

impl Report for CompileReport {
    fn render(&self, out: &mut dyn Output) {
        match &self.result {
            CompileResult::Written(written) => self.render_written(out, written),
            CompileResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl CompileReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        if let Some(debug_dir) = &written.debug_dir {
            out.key_value(
                "Pipeline snapshots written to",
                &debug_dir.display().to_string(),
            );
            out.newline();
        }

        for warning in &self.warnings {
            out.warning(warning);
        }

        out.preformatted(&self.summary());
        out.newline();

        out.section(&format!("Artifacts ({})", written.output_dir.display()));
        for (path, status) in &written.files {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match status {
                WriteResult::Written => out.added_item(&name),
                WriteResult::Unchanged => out.list_item(&format!("{} (unchanged)", name)),
            }
        }
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        for file in &preview.files {
            out.divider(&file.path.display().to_string());
            out.preformatted(file.content.trim_end());
        }

        out.divider("Summary");
        out.preformatted(&self.summary());
        out.preformatted(&format!("{} files would be written", preview.files.len()));
    }

    fn summary(&self) -> String {
        format!(
            "{}: {} operation{}, {} fragment{}, {} model{}, {} resolver entr{}",
            self.project_name,
            self.operation_count,
            plural(self.operation_count),
            self.fragment_count,
            plural(self.fragment_count),
            self.model_count,
            plural(self.model_count),
            self.resolver_count,
            if self.resolver_count == 1 { "y" } else { "ies" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::BufferOutput;

    fn report(result: CompileResult) -> CompileReport {
        CompileReport {
            project_name: "starwars".to_string(),
            warnings: vec![],
            operation_count: 2,
            fragment_count: 1,
            model_count: 5,
            resolver_count: 1,
            result,
        }
    }

    #[test]
    fn test_render_written() {
        let report = report(CompileResult::Written(WrittenResult {
            output_dir: PathBuf::from("build/quiver"),
            files: vec![
                (PathBuf::from("build/quiver/ir.json"), WriteResult::Written),
                (PathBuf::from("build/quiver/operations.json"), WriteResult::Unchanged),
            ],
            debug_dir: None,
        }));
        assert_eq!(
            BufferOutput::render(&report),
            "starwars: 2 operations, 1 fragment, 5 models, 1 resolver entry\n\nArtifacts (build/quiver):\n  + ir.json\n  - operations.json (unchanged)"
        );
    }

    #[test]
    fn test_render_preview() {
        let report = report(CompileResult::Preview(PreviewResult {
            files: vec![ArtifactFile {
                path: PathBuf::from("out/resolver.json"),
                content: "[]\n".to_string(),
            }],
        }));
        let rendered = BufferOutput::render(&report);
        assert!(rendered.starts_with("── out/resolver.json ──\n[]\n── Summary ──"));
        assert!(rendered.ends_with("1 files would be written"));
    }
}

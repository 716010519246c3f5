//! Compile operation - IR, persisted operations and resolver files.

use std::path::Path;

use eyre::{Result, WrapErr, eyre};
use quiver_compiler::pipeline::{CompilationContext, Pipeline, SnapshotPlugin};
use quiver_core::File;

use super::{Project, describe};
use crate::reports::{ArtifactFile, CompileReport, CompileResult, PreviewResult, WrittenResult};

pub const IR_FILE: &str = "ir.json";
pub const OPERATIONS_FILE: &str = "operations.json";
pub const RESOLVER_FILE: &str = "resolver.json";

/// Options for the compile operation.
pub struct CompileOptions<'a> {
    /// Output directory; the manifest's `[codegen] output` when not given.
    pub output_dir: Option<&'a Path>,
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// Whether to output per-phase snapshots.
    pub visualize: bool,
}

/// Execute the compile operation.
///
/// Runs the full pipeline and writes its artifacts. Files whose content did
/// not change are left alone.
pub fn compile(project: Project, opts: CompileOptions) -> Result<CompileReport> {
    let output_dir = opts
        .output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| project.config.output_dir());
    let project_name = project.name().to_string();

    let debug_dir = output_dir.join(".quiver/debug");
    let mut pipeline = Pipeline::new();
    if opts.visualize {
        pipeline = pipeline.plugin(SnapshotPlugin::with_output_dir(&debug_dir));
    }

    let mut ctx = CompilationContext::new(project.schema, project.documents, project.options);
    if let Err(err) = pipeline.run_on(&mut ctx) {
        let errors: Vec<String> = ctx.errors().map(describe).collect();
        if errors.is_empty() {
            return Err(err);
        }
        return Err(eyre!("{}\n\n{}", err, errors.join("\n")));
    }

    let files = artifacts(&ctx, &output_dir)?;
    let ir = ctx.ir()?;
    let mut model_count = 0;
    for group in ir
        .operations
        .iter()
        .flat_map(|op| &op.data_model_groups)
        .chain(ir.fragments.iter().flat_map(|f| &f.data_model_groups))
    {
        group.walk(&mut |_, _, _| model_count += 1);
    }

    let result = if opts.dry_run {
        CompileResult::Preview(PreviewResult { files })
    } else {
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let status = File::new(&file.path, &file.content)
                .write()
                .wrap_err_with(|| format!("failed to write '{}'", file.path.display()))?;
            written.push((file.path, status));
        }
        CompileResult::Written(WrittenResult {
            output_dir,
            files: written,
            debug_dir: opts.visualize.then_some(debug_dir),
        })
    };

    Ok(CompileReport {
        project_name,
        warnings: ctx.warnings().map(describe).collect(),
        operation_count: ir.operations.len(),
        fragment_count: ir.fragments.len(),
        model_count,
        resolver_count: ir.resolver.len(),
        result,
    })
}

fn artifacts(ctx: &CompilationContext, output_dir: &Path) -> Result<Vec<ArtifactFile>> {
    let ir = ctx.ir()?;
    let manifest = ctx
        .manifest
        .as_ref()
        .ok_or_else(|| eyre!("operation manifest not set after analysis"))?;
    let resolver = ctx
        .resolver
        .as_ref()
        .ok_or_else(|| eyre!("resolver not set after analysis"))?;

    let file = |name: &str, mut content: String| {
        content.push('\n');
        ArtifactFile {
            path: output_dir.join(name),
            content,
        }
    };

    Ok(vec![
        file(IR_FILE, ir.to_json()?),
        file(OPERATIONS_FILE, serde_json::to_string_pretty(manifest)?),
        file(
            RESOLVER_FILE,
            serde_json::to_string_pretty(&resolver.all_entries())?,
        ),
    ])
}

//! Pipeline snapshot plugin for visualization and debugging.
//!
//! This module provides a plugin that captures the pipeline state after each phase,
//! enabling visualization of the compilation process.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use eyre::Result;
use quiver_ir::{IrDocument, OperationManifest};
use serde::Serialize;

use super::{CompilationContext, Diagnostic, Plugin};

/// A snapshot of the pipeline state at a specific phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSnapshot {
    /// The phase that just completed.
    pub phase: String,

    /// The IR (available after the "lower" phase).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir: Option<IrDocument>,

    /// Persisted operations (available after the "analyze" phase).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<OperationManifest>,

    /// Diagnostics collected so far.
    pub diagnostics: Vec<Diagnostic>,

    /// Why the phase failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A plugin that captures pipeline state after each phase.
///
/// Use this plugin with the `--visualize` flag to output intermediate
/// representations for debugging and understanding the pipeline.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new().plugin(SnapshotPlugin::with_output_dir(".quiver/debug"));
/// let ctx = pipeline.run(schema, documents, options)?;
/// ```
pub struct SnapshotPlugin {
    snapshots: RwLock<Vec<PhaseSnapshot>>,
    output_dir: Option<PathBuf>,
}

impl SnapshotPlugin {
    /// Create a new snapshot plugin.
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: None,
        }
    }

    /// Create a new snapshot plugin that writes each snapshot to `output_dir`
    /// as soon as its phase completes.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: RwLock::new(Vec::new()),
            output_dir: Some(output_dir.into()),
        }
    }

    /// Get all collected snapshots.
    pub fn snapshots(&self) -> Vec<PhaseSnapshot> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write all snapshots to `dir`, one `<phase>.json` file each.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        for snapshot in snapshots.iter() {
            write_snapshot(dir, snapshot)?;
        }

        Ok(())
    }

    fn capture_snapshot(
        &self,
        phase: &str,
        ctx: &CompilationContext,
        error: Option<String>,
    ) -> PhaseSnapshot {
        let snapshot = PhaseSnapshot {
            phase: phase.to_string(),
            ir: ctx.ir.clone(),
            manifest: ctx.manifest.clone(),
            diagnostics: ctx.diagnostics.clone(),
            error,
        };
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        snapshot
    }
}

fn write_snapshot(dir: &Path, snapshot: &PhaseSnapshot) -> Result<()> {
    let path = dir.join(format!("{}.json", snapshot.phase));
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "wrote snapshot");
    Ok(())
}

impl Default for SnapshotPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        let snapshot = self.capture_snapshot(phase, ctx, None);
        self.persist(&snapshot)
    }

    fn on_phase_failed(
        &self,
        phase: &str,
        ctx: &CompilationContext,
        error: &eyre::Report,
    ) -> Result<()> {
        let snapshot = self.capture_snapshot(phase, ctx, Some(error.to_string()));
        self.persist(&snapshot)
    }
}

impl SnapshotPlugin {
    fn persist(&self, snapshot: &PhaseSnapshot) -> Result<()> {
        if let Some(ref dir) = self.output_dir {
            fs::create_dir_all(dir)?;
            write_snapshot(dir, snapshot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        CompilerOptions,
        pipeline::Pipeline,
        testing::{documents, star_wars_schema},
    };

    struct Shared(Arc<SnapshotPlugin>);

    impl Plugin for Shared {
        fn name(&self) -> &'static str {
            self.0.name()
        }

        fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
            self.0.on_after_phase(phase, ctx)
        }
    }

    #[test]
    fn test_snapshot_plugin_creation() {
        let plugin = SnapshotPlugin::new();
        assert!(plugin.snapshots().is_empty());
    }

    #[test]
    fn test_captures_every_phase() {
        let plugin = Arc::new(SnapshotPlugin::new());
        Pipeline::new()
            .plugin(Shared(plugin.clone()))
            .run(
                star_wars_schema(),
                documents("query Hero { hero { name } }"),
                CompilerOptions::default(),
            )
            .unwrap();

        let snapshots = plugin.snapshots();
        let phases: Vec<_> = snapshots.iter().map(|s| s.phase.as_str()).collect();
        assert_eq!(phases, ["validate", "lower", "flatten", "analyze"]);
        assert!(snapshots[0].ir.is_none());
        assert!(snapshots[1].ir.is_some());
        assert!(snapshots[2].manifest.is_none());
        assert!(snapshots[3].manifest.is_some());
    }

    #[test]
    fn test_writes_to_output_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("debug");
        Pipeline::new()
            .plugin(SnapshotPlugin::with_output_dir(&out))
            .run(
                star_wars_schema(),
                documents("query Hero { hero { name } }"),
                CompilerOptions::default(),
            )
            .unwrap();

        for phase in ["validate", "lower", "flatten", "analyze"] {
            assert!(out.join(format!("{phase}.json")).exists(), "{phase}.json");
        }
        let lower = fs::read_to_string(out.join("lower.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&lower).unwrap();
        assert_eq!(json["phase"], "lower");
        assert_eq!(json["ir"]["operations"][0]["name"], "Hero");
    }

    #[test]
    fn test_failed_phase_is_captured() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("debug");
        Pipeline::new()
            .plugin(SnapshotPlugin::with_output_dir(&out))
            .run(
                star_wars_schema(),
                documents("query Hero { hero { nope } }"),
                CompilerOptions::default(),
            )
            .unwrap_err();

        assert!(!out.join("lower.json").exists());
        let validate = fs::read_to_string(out.join("validate.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&validate).unwrap();
        assert_eq!(json["error"], "Validation failed with 1 error(s)");
        assert_eq!(
            json["diagnostics"][0]["message"],
            "Cannot query field 'nope' on type 'Character'"
        );
    }
}

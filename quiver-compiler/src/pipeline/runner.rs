//! Pipeline orchestrator.

use eyre::Result;
use quiver_schema::Schema;

use super::{
    CompilationContext, Phase, Plugin,
    phases::{AnalyzePhase, FlattenPhase, LowerPhase, ValidatePhase},
};
use crate::{CompilerOptions, DocumentSet};

/// The compilation pipeline orchestrator.
///
/// The pipeline manages the execution of compilation phases and plugin hooks.
/// It runs the built-in phases (validate, lower, flatten, analyze) followed
/// by any user phases, calling plugin hooks before and after each phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .plugin(SnapshotPlugin::new())
///     .phase(MyEmitterPhase);
///
/// let ctx = pipeline.run(schema, documents, options)?;
/// ```
pub struct Pipeline {
    validate: ValidatePhase,
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Create a new pipeline with default built-in phases.
    pub fn new() -> Self {
        Self {
            validate: ValidatePhase::new(),
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Replace the built-in validate phase, e.g. to add custom lints.
    pub fn validate_with(mut self, phase: ValidatePhase) -> Self {
        self.validate = phase;
        self
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run the pipeline.
    ///
    /// Executes all phases in order:
    /// 1. ValidatePhase - lints the documents, fails on any error
    /// 2. LowerPhase - builds the IR
    /// 3. FlattenPhase - hoists and deduplicates models
    /// 4. AnalyzePhase - selections, operation ids, resolver
    /// 5. User phases (if any)
    ///
    /// Plugin hooks are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally.
    pub fn run(
        &self,
        schema: Schema,
        documents: DocumentSet,
        options: CompilerOptions,
    ) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(schema, documents, options);
        self.run_on(&mut ctx)?;
        Ok(ctx)
    }

    /// Run every phase on an existing context. The context keeps whatever the
    /// phases produced when an error is returned.
    pub fn run_on(&self, ctx: &mut CompilationContext) -> Result<()> {
        let builtin: [&dyn Phase; 4] = [&self.validate, &LowerPhase, &FlattenPhase, &AnalyzePhase];
        let user = self.phases.iter().map(|phase| phase.as_ref());

        for phase in builtin.into_iter().chain(user) {
            self.run_phase(phase, ctx)?;
        }
        Ok(())
    }

    /// Run only the validate phase.
    pub fn check(&self, ctx: &mut CompilationContext) -> Result<()> {
        self.run_phase(&self.validate, ctx)
    }

    /// Run a single phase with plugin hooks. A failed phase is reported to
    /// every plugin before its error is returned.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();
        let _span = tracing::info_span!("phase", name = phase_name).entered();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        if let Err(err) = phase.run(ctx) {
            for plugin in &self.plugins {
                if let Err(hook_err) = plugin.on_phase_failed(phase_name, ctx, &err) {
                    tracing::warn!(plugin = plugin.name(), error = %hook_err, "plugin hook failed");
                }
            }
            return Err(err);
        }
        tracing::debug!(
            errors = ctx.error_count(),
            warnings = ctx.warning_count(),
            "phase completed"
        );

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::testing::{documents, star_wars_schema};

    struct CountingPlugin {
        before_count: Arc<AtomicUsize>,
        after_count: Arc<AtomicUsize>,
    }

    impl CountingPlugin {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let before = Arc::new(AtomicUsize::new(0));
            let after = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    before_count: before.clone(),
                    after_count: after.clone(),
                },
                before,
                after,
            )
        }
    }

    impl Plugin for CountingPlugin {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn on_before_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.before_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_after_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.after_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailureRecorder(Arc<Mutex<Vec<(String, usize)>>>);

    impl Plugin for FailureRecorder {
        fn name(&self) -> &'static str {
            "failures"
        }

        fn on_phase_failed(
            &self,
            phase: &str,
            ctx: &CompilationContext,
            _error: &eyre::Report,
        ) -> Result<()> {
            self.0
                .lock()
                .unwrap()
                .push((phase.to_string(), ctx.error_count()));
            eyre::bail!("hook errors do not replace the phase error")
        }
    }

    struct RecordingPhase(Arc<Mutex<Vec<String>>>);

    impl Phase for RecordingPhase {
        fn name(&self) -> &'static str {
            "record"
        }

        fn description(&self) -> &'static str {
            "Record the operations that reached the end of the pipeline"
        }

        fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
            let names = ctx.ir()?.operations.iter().map(|op| op.name.clone());
            self.0.lock().unwrap().extend(names);
            Ok(())
        }
    }

    fn run(src: &str, pipeline: &Pipeline) -> Result<CompilationContext> {
        pipeline.run(star_wars_schema(), documents(src), CompilerOptions::default())
    }

    #[test]
    fn test_pipeline_runs_phases() {
        let ctx = run("query Hero { hero { name } }", &Pipeline::new())
            .expect("pipeline should succeed");

        assert!(ctx.ir.is_some());
        assert!(ctx.manifest.is_some());
        assert!(ctx.resolver.is_some());
    }

    #[test]
    fn test_pipeline_plugin_hooks() {
        let (plugin, before_count, after_count) = CountingPlugin::new();

        let pipeline = Pipeline::new().plugin(plugin);
        let _ = run("query Hero { hero { name } }", &pipeline).expect("pipeline should succeed");

        // 4 built-in phases = 4 before + 4 after hooks
        assert_eq!(before_count.load(Ordering::SeqCst), 4);
        assert_eq!(after_count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_user_phase_runs_last() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new().phase(RecordingPhase(seen.clone()));
        run("query A { hero { name } } query B { hero { id } }", &pipeline).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_validation_errors_stop_the_pipeline() {
        let schema = star_wars_schema();
        let mut ctx = CompilationContext::new(
            schema,
            documents("query Hero { hero { nope } }"),
            CompilerOptions::default(),
        );
        let err = Pipeline::new().run_on(&mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "Validation failed with 1 error(s)");
        assert!(ctx.ir.is_none());
        assert_eq!(
            ctx.errors().next().unwrap().message,
            "Cannot query field 'nope' on type 'Character'"
        );
    }

    #[test]
    fn test_failed_phase_is_reported_to_plugins() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new().plugin(FailureRecorder(failures.clone()));
        let err = run("query Hero { hero { nope } }", &pipeline).unwrap_err();

        assert_eq!(err.to_string(), "Validation failed with 1 error(s)");
        assert_eq!(*failures.lock().unwrap(), vec![("validate".to_string(), 1)]);
    }
}

//! Observers of the compilation pipeline.

use eyre::{Report, Result};

use super::CompilationContext;

/// Hooks called around every phase the [`Pipeline`](super::Pipeline) runs.
///
/// What a plugin finds in the context depends on the phase that just ran:
///
/// | phase      | after it completes                                   |
/// |------------|------------------------------------------------------|
/// | `validate` | lint diagnostics, `ir` still empty                   |
/// | `lower`    | `ir` with the nested model groups of every operation |
/// | `flatten`  | `ir` with hoisted and deduplicated model groups      |
/// | `analyze`  | operation ids, `manifest` and `resolver`             |
///
/// User phases follow with the names they report.
///
/// ```ignore
/// struct DenyDeprecated;
///
/// impl Plugin for DenyDeprecated {
///     fn name(&self) -> &'static str { "deny-deprecated" }
///
///     fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
///         if phase == "validate" && ctx.warnings().any(|d| d.code.as_deref() == Some("deprecated-usage")) {
///             eyre::bail!("deprecated fields are not allowed in this project");
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Called before `phase` runs. An error aborts the pipeline.
    #[allow(unused_variables)]
    fn on_before_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        Ok(())
    }

    /// Called after `phase` completed. An error aborts the pipeline.
    #[allow(unused_variables)]
    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        Ok(())
    }

    /// Called when `phase` failed, e.g. validation found errors. The context
    /// still holds the diagnostics gathered so far. The pipeline returns
    /// `error` whatever the hook returns; hook errors are only logged.
    #[allow(unused_variables)]
    fn on_phase_failed(
        &self,
        phase: &str,
        ctx: &CompilationContext,
        error: &Report,
    ) -> Result<()> {
        Ok(())
    }
}

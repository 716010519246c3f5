//! Flatten phase - hoists nested model groups and unifies duplicates.

use eyre::{Result, WrapErr, eyre};
use quiver_ir::IrModelGroup;

use crate::{
    CompilerOptions,
    flatten::Flattener,
    pipeline::{CompilationContext, Phase},
};

/// Phase that flattens the model tree of every operation and fragment.
///
/// Groups are hoisted by the removal tree registered for the operation (if
/// any) and by `flatten_depth`, then identical groups are unified.
pub struct FlattenPhase;

impl Phase for FlattenPhase {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn description(&self) -> &'static str {
        "Hoist nested models and deduplicate identical shapes"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let options = &ctx.options;
        let ir = ctx
            .ir
            .as_mut()
            .ok_or_else(|| eyre!("IR not set - FlattenPhase must run after LowerPhase"))?;

        for op in &mut ir.operations {
            flatten(options, &op.name, &mut op.data_model_groups)
                .wrap_err_with(|| format!("failed to flatten operation '{}'", op.name))?;
        }
        for fragment in &mut ir.fragments {
            flatten(options, &fragment.name, &mut fragment.data_model_groups)
                .wrap_err_with(|| format!("failed to flatten fragment '{}'", fragment.name))?;
        }
        Ok(())
    }
}

fn flatten(options: &CompilerOptions, name: &str, groups: &mut Vec<IrModelGroup>) -> Result<()> {
    let mut flattener = Flattener::new().max_depth(options.flatten_depth);
    if let Some(removals) = options.removals.get(name) {
        flattener = flattener.removals(removals);
    }
    let before = groups.len();
    *groups = flattener.flatten(std::mem::take(groups))?;
    if groups.len() != before {
        tracing::debug!(name, roots = groups.len(), "hoisted model groups");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        flatten::RemovalTree,
        pipeline::phases::LowerPhase,
        testing::{documents, star_wars_schema},
    };

    fn run(src: &str, options: CompilerOptions) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(star_wars_schema(), documents(src), options);
        LowerPhase.run(&mut ctx)?;
        FlattenPhase.run(&mut ctx)?;
        Ok(ctx)
    }

    fn root_ids(ctx: &CompilationContext, op: &str) -> Vec<String> {
        let op = ctx.ir.as_ref().unwrap().operation(op).unwrap();
        op.data_model_groups
            .iter()
            .map(|g| g.base_model_id.clone())
            .collect()
    }

    #[test]
    fn test_requires_ir() {
        let mut ctx = CompilationContext::new(
            star_wars_schema(),
            documents("query Q { hero { name } }"),
            CompilerOptions::default(),
        );
        let err = FlattenPhase.run(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("must run after LowerPhase"));
    }

    #[test]
    fn test_depth_policy() {
        let options = CompilerOptions {
            flatten_depth: 1,
            ..CompilerOptions::default()
        };
        let ctx = run("query Q { hero { friends { name } } }", options).unwrap();
        assert_eq!(root_ids(&ctx, "Q"), ["Q.Data", "Q.Data.Hero.Friends"]);
    }

    #[test]
    fn test_removals_by_operation_name() {
        let tree = RemovalTree::new().extract(["Data", "Hero"]);
        let options = CompilerOptions::default().with_removals("Q", tree);

        let ctx = run(
            "query Q { hero { name } }\nquery Other { hero { name } }",
            options,
        )
        .unwrap();
        assert_eq!(root_ids(&ctx, "Q"), ["Q.Data", "Q.Data.Hero"]);
        assert_eq!(root_ids(&ctx, "Other"), ["Other.Data"]);
    }

    #[test]
    fn test_bad_removal_path_names_the_operation() {
        let tree = RemovalTree::new().extract(["Data"]);
        let options = CompilerOptions::default().with_removals("Q", tree);

        let err = run("query Q { hero { name } }", options).unwrap_err();
        assert_eq!(err.to_string(), "failed to flatten operation 'Q'");
    }
}

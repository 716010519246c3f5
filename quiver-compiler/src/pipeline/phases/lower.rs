//! Lower phase - builds the IR from the validated documents.

use eyre::Result;

use crate::{
    ir::IrBuilder,
    pipeline::{CompilationContext, Phase},
    typename::add_typename,
};

/// Phase that inserts `__typename` where decoding needs it and lowers the
/// documents to the IR.
///
/// The documents are rewritten in place, so the source recorded on every
/// operation is the text actually sent to the server.
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Insert __typename and build the IR"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        add_typename(&mut ctx.documents, &ctx.schema, ctx.options.add_typename);

        let ir = IrBuilder::new(&ctx.schema, &ctx.documents).build()?;
        tracing::debug!(
            operations = ir.operations.len(),
            fragments = ir.fragments.len(),
            "built IR"
        );
        ctx.ir = Some(ir);
        Ok(())
    }
}

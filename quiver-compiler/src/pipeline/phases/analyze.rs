//! Analyze phase - selections, operation ids and resolver entries.

use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use eyre::{Result, bail, eyre};
use quiver_ir::{
    IrDocument, IrModelGroup, IrType, OperationManifest, PersistedOperation, Resolver,
    ResolverKey, ResolverKind,
};
use quiver_manifest::IssueLevel;
use quiver_schema::Schema;
use quiver_syntax::ast::TypeDefinition;

use crate::{
    pipeline::{CompilationContext, Diagnostic, Phase, Severity},
    scalars::ScalarBindings,
    selections::root_selections,
};

/// Lint name under which incompatible scalar bindings are reported.
const INCOMPATIBLE_TYPE: &str = "incompatible-type";

/// Phase that derives everything downstream consumers need from the
/// flattened IR.
///
/// This phase must run after `FlattenPhase`. It fills in the selection
/// descriptors and operation ids, builds the persisted operation manifest,
/// and registers resolver entries for every operation, fragment, model,
/// schema type and bound custom scalar of the unit.
pub struct AnalyzePhase;

impl Phase for AnalyzePhase {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn description(&self) -> &'static str {
        "Compute selections, operation ids and resolver entries"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let CompilationContext {
            schema,
            options,
            ir,
            manifest,
            resolver,
            diagnostics,
            ..
        } = ctx;
        let ir = ir
            .as_mut()
            .ok_or_else(|| eyre!("IR not set - AnalyzePhase must run after LowerPhase"))?;

        for op in &mut ir.operations {
            op.selections = root_selections(&op.data_model_groups)?;
        }
        for fragment in &mut ir.fragments {
            fragment.selections = root_selections(&fragment.data_model_groups)?;
        }

        let mut persisted = OperationManifest::new(options.ids.name(), options.ids.version());
        for op in &mut ir.operations {
            let id = options.ids.id(&op.name, &op.source);
            persisted.operations.push(PersistedOperation {
                name: op.name.clone(),
                id: id.clone(),
                body: op.source.clone(),
                operation_type: op.operation_type,
            });
            op.id = Some(id);
        }

        let bindings = ScalarBindings::new(schema, &options.scalars);
        let level = options
            .validation
            .level_or(INCOMPATIBLE_TYPE, IssueLevel::Warn);
        if let Some(severity) = Severity::from_level(level) {
            for issue in bindings.check() {
                diagnostics.push(
                    Diagnostic::new(severity, self.name(), issue.to_string())
                        .with_code(INCOMPATIBLE_TYPE),
                );
            }
        }

        let mut local = match &options.upstream {
            Some(upstream) => Resolver::with_upstream(Arc::clone(upstream)),
            None => Resolver::new(),
        };
        let mut conflicts = 0;
        for (key, target) in resolver_entries(schema, ir, &bindings) {
            if let Err(err) = local.register(key, target) {
                conflicts += 1;
                diagnostics.push(Diagnostic::error(self.name(), err.to_string()));
            }
        }
        ir.resolver = local.entries();
        tracing::debug!(
            entries = local.len(),
            operations = persisted.operations.len(),
            "analyzed IR"
        );

        *manifest = Some(persisted);
        *resolver = Some(local);

        if conflicts > 0 {
            bail!("Analysis failed with {} error(s)", conflicts);
        }
        Ok(())
    }
}

/// Every mapping this unit provides, operations first.
fn resolver_entries(
    schema: &Schema,
    ir: &IrDocument,
    bindings: &ScalarBindings<'_>,
) -> Vec<(ResolverKey, String)> {
    let mut entries = Vec::new();
    let mut used = UsedTypes::new(schema);

    for op in &ir.operations {
        entries.push((ResolverKey::new(ResolverKind::Operation, &op.name), op.name.clone()));
        for variable in &op.variables {
            used.add(&variable.ty);
        }
        models(&op.data_model_groups, &mut entries, &mut used);
    }
    for fragment in &ir.fragments {
        entries.push((
            ResolverKey::new(ResolverKind::Fragment, &fragment.name),
            fragment.name.clone(),
        ));
        models(&fragment.data_model_groups, &mut entries, &mut used);
    }

    for name in used.schema_types {
        entries.push((ResolverKey::new(ResolverKind::SchemaType, &name), name));
    }
    for name in used.scalars {
        if let Some(target) = bindings.target(&name) {
            entries.push((ResolverKey::new(ResolverKind::CustomScalar, name), target));
        }
    }
    entries
}

fn models(roots: &[IrModelGroup], entries: &mut Vec<(ResolverKey, String)>, used: &mut UsedTypes<'_>) {
    for root in roots {
        root.walk(&mut |_, model, _| {
            entries.push((ResolverKey::new(ResolverKind::Model, &model.id), model.id.clone()));
            for property in &model.properties {
                used.add(&property.ty);
            }
        });
    }
}

/// Enums, input objects and scalars the unit refers to. Input objects pull
/// in the types of their fields.
struct UsedTypes<'a> {
    schema: &'a Schema,
    schema_types: BTreeSet<String>,
    scalars: BTreeSet<String>,
    visited: HashSet<String>,
}

impl<'a> UsedTypes<'a> {
    fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            schema_types: BTreeSet::new(),
            scalars: BTreeSet::new(),
            visited: HashSet::new(),
        }
    }

    fn add(&mut self, ty: &IrType) {
        match ty.leaf() {
            IrType::Scalar { name } => {
                self.scalars.insert(name.clone());
            }
            IrType::Enum { name } => {
                self.schema_types.insert(name.clone());
            }
            IrType::InputObject { name } => self.input_object(name),
            _ => {}
        }
    }

    fn input_object(&mut self, name: &str) {
        if !self.visited.insert(name.to_string()) {
            return;
        }
        self.schema_types.insert(name.to_string());
        let Some(TypeDefinition::InputObject(input)) = self.schema.get_type(name) else {
            return;
        };
        for field in &input.fields {
            let field_type = field.ty.name();
            match self.schema.get_type(field_type) {
                Some(TypeDefinition::Scalar(_)) => {
                    self.scalars.insert(field_type.to_string());
                }
                Some(TypeDefinition::Enum(_)) => {
                    self.schema_types.insert(field_type.to_string());
                }
                Some(TypeDefinition::InputObject(_)) => self.input_object(field_type),
                _ => {}
            }
        }
    }
}

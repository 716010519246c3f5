//! Custom scalar bindings from `[scalars]`.

use quiver_core::MemoMap;
use quiver_manifest::ScalarsConfig;
use quiver_schema::Schema;
use quiver_syntax::ast::TypeDefinition;
use thiserror::Error;

/// A `[scalars]` binding that names something other than a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncompatibleType {
    #[error("cannot bind '{name}' to '{target}': the schema defines no type '{name}'")]
    Unknown { name: String, target: String },

    #[error("cannot bind '{name}' to '{target}': '{name}' is {kind}, not a scalar")]
    NotScalar {
        name: String,
        target: String,
        kind: &'static str,
    },
}

/// Resolves scalar names to their configured target types.
///
/// Targets are computed once per scalar; incompatible bindings resolve to
/// nothing.
pub struct ScalarBindings<'a> {
    schema: &'a Schema,
    config: &'a ScalarsConfig,
    targets: MemoMap<String, Option<String>>,
}

impl<'a> ScalarBindings<'a> {
    pub fn new(schema: &'a Schema, config: &'a ScalarsConfig) -> Self {
        Self {
            schema,
            config,
            targets: MemoMap::new(),
        }
    }

    /// Every configured binding that cannot be honored, in file order.
    pub fn check(&self) -> Vec<IncompatibleType> {
        self.config
            .iter()
            .filter_map(|(name, target)| self.bind(name, target).err())
            .collect()
    }

    /// The target type of scalar `name`, if it has a compatible binding.
    pub fn target(&self, name: &str) -> Option<String> {
        self.targets.get_or_insert_with(name.to_string(), || {
            let target = self.config.get(name)?;
            self.bind(name, target).ok().map(|()| target.to_string())
        })
    }

    fn bind(&self, name: &str, target: &str) -> Result<(), IncompatibleType> {
        let kind = match self.schema.get_type(name) {
            None => {
                return Err(IncompatibleType::Unknown {
                    name: name.to_string(),
                    target: target.to_string(),
                });
            }
            Some(TypeDefinition::Scalar(_)) => return Ok(()),
            Some(TypeDefinition::Object(_)) => "an object type",
            Some(TypeDefinition::Interface(_)) => "an interface",
            Some(TypeDefinition::Union(_)) => "a union",
            Some(TypeDefinition::Enum(_)) => "an enum",
            Some(TypeDefinition::InputObject(_)) => "an input object",
        };
        Err(IncompatibleType::NotScalar {
            name: name.to_string(),
            target: target.to_string(),
            kind,
        })
    }
}

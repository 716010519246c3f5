use quiver_core::FormatVersion;
use serde::{Deserialize, Serialize};

use crate::{IrError, IrFragment, IrOperation, ResolverEntry};

/// Everything one compilation unit produced, as written to `ir.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrDocument {
    pub format_version: FormatVersion,
    pub operations: Vec<IrOperation>,
    pub fragments: Vec<IrFragment>,
    /// Resolver entries registered by this unit.
    #[serde(default)]
    pub resolver: Vec<ResolverEntry>,
}

impl IrDocument {
    pub const FORMAT_VERSION: FormatVersion = FormatVersion::new(1, 0);

    pub fn new(operations: Vec<IrOperation>, fragments: Vec<IrFragment>) -> Self {
        Self {
            format_version: Self::FORMAT_VERSION,
            operations,
            fragments,
            resolver: Vec::new(),
        }
    }

    pub fn operation(&self, name: &str) -> Option<&IrOperation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn fragment(&self, name: &str) -> Option<&IrFragment> {
        self.fragments.iter().find(|f| f.name == name)
    }

    pub fn to_json(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an IR file, rejecting formats this version cannot read.
    pub fn from_json(json: &str) -> Result<Self, IrError> {
        let document: IrDocument = serde_json::from_str(json)?;
        if !Self::FORMAT_VERSION.can_read(document.format_version) {
            return Err(IrError::IncompatibleVersion {
                found: document.format_version,
                supported: Self::FORMAT_VERSION,
            });
        }
        Ok(document)
    }
}

use quiver_core::FormatVersion;
use thiserror::Error;

use crate::ResolverKey;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("failed to (de)serialize IR")]
    Json(#[from] serde_json::Error),

    #[error("IR format {found} cannot be read by this version (supports {supported})")]
    IncompatibleVersion {
        found: FormatVersion,
        supported: FormatVersion,
    },

    #[error("resolver key {key} already maps to '{existing}', cannot map it to '{target}'")]
    ResolverConflict {
        key: ResolverKey,
        existing: String,
        target: String,
    },

    #[error("field '{field}' has a default field set that is not last")]
    MisplacedDefaultFieldSet { field: String },
}

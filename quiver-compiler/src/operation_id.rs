//! Operation id strategies.

use std::fmt;

use sha2::{Digest, Sha256};

/// Computes the id a server knows an operation by.
///
/// `name` and `version` are recorded in the operation manifest so a change of
/// strategy is detectable by whoever consumes it.
pub trait OperationIdGenerator: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn version(&self) -> u32;

    /// Id of the canonical operation text (the operation followed by every
    /// fragment it uses, sorted by name).
    fn id(&self, name: &str, source: &str) -> String;
}

/// Lowercase hex SHA-256 of the canonical text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Ids;

impl OperationIdGenerator for Sha256Ids {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn version(&self) -> u32 {
        1
    }

    fn id(&self, _name: &str, source: &str) -> String {
        hex::encode(Sha256::digest(source.as_bytes()))
    }
}

/// Look up a built-in strategy by the name used in `quiver.toml`.
pub fn by_name(name: &str) -> Option<Box<dyn OperationIdGenerator>> {
    match name {
        "sha256" => Some(Box::new(Sha256Ids)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_of_empty_text() {
        assert_eq!(
            Sha256Ids.id("Empty", ""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_ids_are_deterministic() {
        let source = "query Hero {\n  hero {\n    name\n  }\n}\n";
        assert_eq!(Sha256Ids.id("Hero", source), Sha256Ids.id("Hero", source));
        assert_ne!(
            Sha256Ids.id("Hero", source),
            Sha256Ids.id("Hero", &source.replace("name", "id"))
        );
        assert_eq!(Sha256Ids.id("Hero", source).len(), 64);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("sha256").unwrap().name(), "sha256");
        assert!(by_name("md5").is_none());
    }
}

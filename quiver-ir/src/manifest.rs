use serde::{Deserialize, Serialize};

use crate::OperationType;

/// Persisted-query manifest: every operation's id and canonical body.
///
/// The generator name and version are recorded so a change of id strategy is
/// visible to whoever registers the manifest with a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationManifest {
    pub format: String,
    pub version: u32,
    pub generator: String,
    pub generator_version: u32,
    pub operations: Vec<PersistedOperation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedOperation {
    pub name: String,
    pub id: String,
    pub body: String,
    pub operation_type: OperationType,
}

impl OperationManifest {
    pub const FORMAT: &'static str = "quiver-persisted-operations";
    pub const VERSION: u32 = 1;

    pub fn new(generator: impl Into<String>, generator_version: u32) -> Self {
        Self {
            format: Self::FORMAT.to_string(),
            version: Self::VERSION,
            generator: generator.into(),
            generator_version,
            operations: Vec::new(),
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&PersistedOperation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&PersistedOperation> {
        self.operations.iter().find(|op| op.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_serialization() {
        let mut manifest = OperationManifest::new("sha256", 1);
        manifest.operations.push(PersistedOperation {
            name: "HeroName".to_string(),
            id: "abc".to_string(),
            body: "query HeroName { hero { name } }".to_string(),
            operation_type: OperationType::Query,
        });

        insta::assert_json_snapshot!(manifest, @r#"
        {
          "format": "quiver-persisted-operations",
          "version": 1,
          "generator": "sha256",
          "generatorVersion": 1,
          "operations": [
            {
              "name": "HeroName",
              "id": "abc",
              "body": "query HeroName { hero { name } }",
              "operationType": "query"
            }
          ]
        }
        "#);
        assert_eq!(manifest.find_by_id("abc").unwrap().name, "HeroName");
        assert!(manifest.find_by_name("Missing").is_none());
    }
}

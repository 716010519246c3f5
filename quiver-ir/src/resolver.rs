//! Mapping from compiler entities to the generated types that represent them.
//!
//! A compilation unit registers an entry for every schema type, model,
//! fragment and custom scalar it generates. Downstream units load those
//! entries as a read-only upstream so they can reference the generated types
//! instead of generating them again.

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::IrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolverKind {
    SchemaType,
    Model,
    Fragment,
    Operation,
    CustomScalar,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverKind::SchemaType => "schemaType",
            ResolverKind::Model => "model",
            ResolverKind::Fragment => "fragment",
            ResolverKind::Operation => "operation",
            ResolverKind::CustomScalar => "customScalar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolverKey {
    pub kind: ResolverKind,
    pub id: String,
}

impl ResolverKey {
    pub fn new(kind: ResolverKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ResolverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)
    }
}

/// A serialized resolver mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverEntry {
    pub key: ResolverKey,
    pub target: String,
}

/// Key → type reference map with an optional read-only upstream.
///
/// Lookups check the local entries first, then walk the upstream chain.
/// Registration only ever touches the local map.
#[derive(Debug, Default)]
pub struct Resolver {
    upstream: Option<Arc<Resolver>>,
    local: IndexMap<ResolverKey, String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver that falls back to `upstream` for unknown keys.
    pub fn with_upstream(upstream: Arc<Resolver>) -> Self {
        Self {
            upstream: Some(upstream),
            local: IndexMap::new(),
        }
    }

    /// Build a resolver from previously serialized entries.
    pub fn from_entries(entries: impl IntoIterator<Item = ResolverEntry>) -> Result<Self, IrError> {
        let mut resolver = Self::new();
        for entry in entries {
            resolver.register(entry.key, entry.target)?;
        }
        Ok(resolver)
    }

    pub fn upstream(&self) -> Option<&Arc<Resolver>> {
        self.upstream.as_ref()
    }

    pub fn resolve(&self, key: &ResolverKey) -> Option<&str> {
        match self.local.get(key) {
            Some(target) => Some(target),
            None => self.upstream.as_ref()?.resolve(key),
        }
    }

    /// Whether `key` is provided by the upstream chain rather than locally.
    pub fn is_upstream(&self, key: &ResolverKey) -> bool {
        !self.local.contains_key(key)
            && self
                .upstream
                .as_ref()
                .is_some_and(|up| up.resolve(key).is_some())
    }

    /// Register `key → target` locally.
    ///
    /// Registering the same mapping twice is a no-op. Mapping a key to a
    /// different target than it already resolves to, locally or upstream, is
    /// an error.
    pub fn register(&mut self, key: ResolverKey, target: impl Into<String>) -> Result<(), IrError> {
        let target = target.into();
        if let Some(existing) = self.resolve(&key) {
            if existing == target {
                return Ok(());
            }
            return Err(IrError::ResolverConflict {
                existing: existing.to_string(),
                key,
                target,
            });
        }
        self.local.insert(key, target);
        Ok(())
    }

    /// Local entries in registration order.
    pub fn entries(&self) -> Vec<ResolverEntry> {
        self.local
            .iter()
            .map(|(key, target)| ResolverEntry {
                key: key.clone(),
                target: target.clone(),
            })
            .collect()
    }

    /// Entries of the whole chain, most distant upstream first.
    ///
    /// This is what a downstream module reads as its own upstream, so a chain
    /// of modules only ever needs the resolver file of its direct parent.
    pub fn all_entries(&self) -> Vec<ResolverEntry> {
        let mut entries = match &self.upstream {
            Some(upstream) => upstream.all_entries(),
            None => Vec::new(),
        };
        entries.extend(self.entries());
        entries
    }

    pub fn len(&self) -> usize {
        self.local.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(id: &str) -> ResolverKey {
        ResolverKey::new(ResolverKind::Model, id)
    }

    #[test]
    fn test_local_then_upstream() {
        let mut base = Resolver::new();
        base.register(model("Base.Data"), "base::BaseQuery::Data").unwrap();
        let base = Arc::new(base);

        let mut feature = Resolver::with_upstream(Arc::clone(&base));
        feature
            .register(model("Feature.Data"), "feature::FeatureQuery::Data")
            .unwrap();

        assert_eq!(
            feature.resolve(&model("Base.Data")),
            Some("base::BaseQuery::Data")
        );
        assert_eq!(
            feature.resolve(&model("Feature.Data")),
            Some("feature::FeatureQuery::Data")
        );
        assert!(feature.is_upstream(&model("Base.Data")));
        assert!(!feature.is_upstream(&model("Feature.Data")));
        assert_eq!(base.resolve(&model("Feature.Data")), None);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut resolver = Resolver::new();
        resolver.register(model("Q.Data"), "Data").unwrap();
        resolver.register(model("Q.Data"), "Data").unwrap();
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_conflict_with_upstream() {
        let mut base = Resolver::new();
        base.register(
            ResolverKey::new(ResolverKind::CustomScalar, "Date"),
            "chrono::NaiveDate",
        )
        .unwrap();

        let mut feature = Resolver::with_upstream(Arc::new(base));
        let err = feature
            .register(
                ResolverKey::new(ResolverKind::CustomScalar, "Date"),
                "time::Date",
            )
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "resolver key customScalar:Date already maps to 'chrono::NaiveDate', cannot map it to 'time::Date'"
        );
        assert!(feature.is_empty());
    }

    #[test]
    fn test_all_entries_walks_the_chain() {
        let mut base = Resolver::new();
        base.register(model("Base.Data"), "base::Data").unwrap();
        let mut middle = Resolver::with_upstream(Arc::new(base));
        middle.register(model("Middle.Data"), "middle::Data").unwrap();
        let mut leaf = Resolver::with_upstream(Arc::new(middle));
        leaf.register(model("Leaf.Data"), "leaf::Data").unwrap();

        let keys: Vec<String> = leaf
            .all_entries()
            .iter()
            .map(|entry| entry.key.to_string())
            .collect();
        assert_eq!(keys, ["model:Base.Data", "model:Middle.Data", "model:Leaf.Data"]);
        assert_eq!(leaf.entries().len(), 1);
    }

    #[test]
    fn test_entries_roundtrip() {
        let mut resolver = Resolver::new();
        resolver.register(model("Q.Data"), "Data").unwrap();
        resolver
            .register(ResolverKey::new(ResolverKind::Fragment, "HeroDetails"), "HeroDetails")
            .unwrap();

        let json = serde_json::to_string(&resolver.entries()).unwrap();
        let entries: Vec<ResolverEntry> = serde_json::from_str(&json).unwrap();
        let restored = Resolver::from_entries(entries).unwrap();

        assert_eq!(restored.entries(), resolver.entries());
    }
}

//! Model flattening and deduplication.
//!
//! Runs on the model groups of one operation or fragment, in three steps:
//!
//! 1. Match the [`RemovalTree`] (and the depth policy) against the model
//!    tree, collecting the ancestor path of every model to extract.
//! 2. Rebuild: hoist the group of each extracted model to the root list.
//!    The parent property keeps the group's base id as its reference.
//! 3. Unify groups with the same model names, nesting depth and structure,
//!    keeping the ids of the first occurrence.
//!
//! Flattening is idempotent.

mod removal;
mod tree;

use std::collections::{HashMap, HashSet, hash_map::Entry};

use quiver_ir::IrModelGroup;
use thiserror::Error;

pub use removal::RemovalTree;
pub use tree::{GroupId, MatchedPath, ModelId, ModelTree};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    #[error("cannot hoist an empty model path")]
    EmptyPath,
    #[error("model '{model}' is already a root model")]
    RootPath { model: String },
    #[error("path to model '{model}' does not match the model tree")]
    BrokenPath { model: String },
}

/// Flattening settings for one operation or fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flattener<'a> {
    max_depth: usize,
    removals: Option<&'a RemovalTree>,
}

impl<'a> Flattener<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hoist every group nested more than `depth` levels below a root.
    /// 0 disables the policy.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn removals(mut self, removals: &'a RemovalTree) -> Self {
        self.removals = Some(removals);
        self
    }

    pub fn flatten(&self, groups: Vec<IrModelGroup>) -> Result<Vec<IrModelGroup>, FlattenError> {
        let mut tree = ModelTree::new(groups);

        if let Some(removals) = self.removals {
            let paths = tree.match_removals(removals);
            tree.rebuild(&paths)?;
        }
        if self.max_depth > 0 {
            loop {
                let paths = tree.paths_below(self.max_depth);
                if paths.is_empty() {
                    break;
                }
                tree.rebuild(&paths)?;
            }
        }

        let mut roots = tree.into_groups();
        deduplicate(&mut roots);
        resolve_name_clashes(&mut roots);
        Ok(roots)
    }
}

/// Unify structurally identical groups found at the same depth, then drop
/// root groups that became duplicates.
///
/// Passes repeat until no group is renamed, so a merge that changes the ids
/// inside a group is seen by the next signature comparison.
pub fn deduplicate(roots: &mut Vec<IrModelGroup>) {
    loop {
        let mut seen = HashMap::new();
        let mut renames = HashMap::new();
        for root in roots.iter() {
            find_duplicates(root, 0, &mut seen, &mut renames);
        }
        let renames = resolve_chains(&renames);
        if renames.is_empty() {
            break;
        }
        tracing::debug!(count = renames.len(), "unified duplicate model ids");
        for root in roots.iter_mut() {
            root.rename_ids(&renames);
        }
    }

    let mut bases = HashSet::new();
    roots.retain(|group| bases.insert(group.base_model_id.clone()));
}

fn find_duplicates(
    group: &IrModelGroup,
    depth: usize,
    seen: &mut HashMap<(usize, String), String>,
    renames: &mut HashMap<String, String>,
) {
    match seen.entry((depth, signature(group))) {
        Entry::Occupied(first) => {
            if first.get() != &group.base_model_id {
                for id in subtree_ids(group) {
                    if let Some(suffix) = relative_suffix(&id, &group.base_model_id) {
                        renames.insert(id.clone(), format!("{}{}", first.get(), suffix));
                    }
                }
            }
            // Descendants are covered by the renames above.
            return;
        }
        Entry::Vacant(entry) => {
            entry.insert(group.base_model_id.clone());
        }
    }
    for model in &group.models {
        for child in &model.model_groups {
            find_duplicates(child, depth + 1, seen, renames);
        }
    }
}

/// Point every rename at the end of its chain. A target that is itself
/// renamed later in the same pass would otherwise be left dangling.
fn resolve_chains(renames: &HashMap<String, String>) -> HashMap<String, String> {
    renames
        .iter()
        .filter_map(|(from, to)| {
            let mut visited = HashSet::from([from.as_str()]);
            let mut target = to;
            while let Some(next) = renames.get(target) {
                if !visited.insert(target.as_str()) {
                    return None;
                }
                target = next;
            }
            (target != from).then(|| (from.clone(), target.clone()))
        })
        .collect()
}

/// The part of `id` below `base`, if `id` is `base` or one of its children.
fn relative_suffix<'a>(id: &'a str, base: &str) -> Option<&'a str> {
    let suffix = id.strip_prefix(base)?;
    (suffix.is_empty() || suffix.starts_with('.')).then_some(suffix)
}

/// Serialized group with ids made relative to its base id, so two copies of
/// the same selection at different places compare equal. Model names are
/// kept as they are.
fn signature(group: &IrModelGroup) -> String {
    let base = group.base_model_id.as_str();
    let relative: HashMap<String, String> = subtree_ids(group)
        .into_iter()
        .filter_map(|id| {
            let suffix = relative_suffix(&id, base)?.to_string();
            Some((id, format!("~{}", suffix)))
        })
        .collect();
    let mut copy = group.clone();
    copy.rename_ids(&relative);
    serde_json::to_string(&copy).unwrap_or_default()
}

fn subtree_ids(group: &IrModelGroup) -> Vec<String> {
    let mut ids = vec![group.base_model_id.clone()];
    group.walk(&mut |group, model, _| {
        for id in [&group.base_model_id, &model.id] {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    });
    ids
}

/// Give root models that share a name with an earlier root model a numeric
/// suffix.
fn resolve_name_clashes(roots: &mut [IrModelGroup]) {
    let mut used: HashSet<String> = HashSet::new();
    for group in roots.iter_mut() {
        for model in &mut group.models {
            if used.contains(&model.model_name) {
                let mut n = 2;
                while used.contains(&format!("{}{}", model.model_name, n)) {
                    n += 1;
                }
                model.model_name = format!("{}{}", model.model_name, n);
            }
        }
        for model in &group.models {
            used.insert(model.model_name.clone());
        }
    }
}

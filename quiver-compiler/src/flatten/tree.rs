//! Arena form of a model tree.

use std::mem;

use quiver_ir::{IrModel, IrModelGroup};

use super::{FlattenError, RemovalTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(usize);

#[derive(Debug)]
struct GroupNode {
    base_model_id: String,
    models: Vec<ModelId>,
    parent: Option<ModelId>,
}

#[derive(Debug)]
struct ModelNode {
    /// The model with `model_groups` moved into the arena.
    model: IrModel,
    groups: Vec<GroupId>,
}

/// Ancestor chain from a root group down to an extracted model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPath(pub Vec<(GroupId, ModelId)>);

/// Model groups stored in flat vectors so groups can be moved between
/// parents without rebuilding the tree.
#[derive(Debug)]
pub struct ModelTree {
    groups: Vec<GroupNode>,
    models: Vec<ModelNode>,
    roots: Vec<GroupId>,
}

impl ModelTree {
    pub fn new(roots: Vec<IrModelGroup>) -> Self {
        let mut tree = Self {
            groups: Vec::new(),
            models: Vec::new(),
            roots: Vec::new(),
        };
        for group in roots {
            let id = tree.insert(group, None);
            tree.roots.push(id);
        }
        tree
    }

    fn insert(&mut self, group: IrModelGroup, parent: Option<ModelId>) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(GroupNode {
            base_model_id: group.base_model_id,
            models: Vec::new(),
            parent,
        });
        for mut model in group.models {
            let children = mem::take(&mut model.model_groups);
            let model_id = ModelId(self.models.len());
            self.models.push(ModelNode {
                model,
                groups: Vec::new(),
            });
            self.groups[id.0].models.push(model_id);
            for child in children {
                let child_id = self.insert(child, Some(model_id));
                self.models[model_id.0].groups.push(child_id);
            }
        }
        id
    }

    pub fn model_name(&self, model: ModelId) -> &str {
        &self.models[model.0].model.model_name
    }

    pub fn base_model_id(&self, group: GroupId) -> &str {
        &self.groups[group.0].base_model_id
    }

    /// Walk the tree in lock step with `removals`, depth first with children
    /// in declaration order, recording the ancestor stack of every extracted
    /// model.
    pub fn match_removals(&self, removals: &RemovalTree) -> Vec<MatchedPath> {
        let mut paths = Vec::new();
        let mut stack = Vec::new();
        for &root in &self.roots {
            self.match_group(root, removals, &mut stack, &mut paths);
        }
        paths
    }

    fn match_group(
        &self,
        group: GroupId,
        node: &RemovalTree,
        stack: &mut Vec<(GroupId, ModelId)>,
        paths: &mut Vec<MatchedPath>,
    ) {
        for &model in &self.groups[group.0].models {
            let Some(child) = node.child(self.model_name(model)) else {
                continue;
            };
            stack.push((group, model));
            if child.is_extracted() {
                paths.push(MatchedPath(stack.clone()));
            }
            for &nested in &self.models[model.0].groups {
                self.match_group(nested, child, stack, paths);
            }
            stack.pop();
        }
    }

    /// One path per group nested more than `max_depth` levels below its root.
    /// Groups below a matched group are not visited.
    pub fn paths_below(&self, max_depth: usize) -> Vec<MatchedPath> {
        let mut paths = Vec::new();
        let mut stack = Vec::new();
        for &root in &self.roots {
            self.deep_groups(root, max_depth, &mut stack, &mut paths);
        }
        paths
    }

    fn deep_groups(
        &self,
        group: GroupId,
        max_depth: usize,
        stack: &mut Vec<(GroupId, ModelId)>,
        paths: &mut Vec<MatchedPath>,
    ) {
        if stack.len() > max_depth {
            if let Some(&first) = self.groups[group.0].models.first() {
                let mut path = stack.clone();
                path.push((group, first));
                paths.push(MatchedPath(path));
            }
            return;
        }
        for &model in &self.groups[group.0].models {
            stack.push((group, model));
            for &nested in &self.models[model.0].groups {
                self.deep_groups(nested, max_depth, stack, paths);
            }
            stack.pop();
        }
    }

    /// Move the group of the last model of every path to the root list.
    ///
    /// The parent property keeps pointing at the group's base id. Hoisting a
    /// group that is already a root is a no-op.
    pub fn rebuild(&mut self, paths: &[MatchedPath]) -> Result<(), FlattenError> {
        for path in paths {
            let [.., (parent_group, parent_model), (group, model)] = path.0.as_slice() else {
                return Err(match path.0.first() {
                    None => FlattenError::EmptyPath,
                    Some(&(_, model)) => FlattenError::RootPath {
                        model: self.model_name(model).to_string(),
                    },
                });
            };
            let node = &self.groups[group.0];
            if node.parent.is_none() && self.roots.contains(group) {
                continue;
            }
            let linked = node.models.contains(model)
                && node.parent == Some(*parent_model)
                && self.groups[parent_group.0].models.contains(parent_model);
            if !linked {
                return Err(FlattenError::BrokenPath {
                    model: self.model_name(*model).to_string(),
                });
            }

            self.models[parent_model.0].groups.retain(|g| g != group);
            self.groups[group.0].parent = None;
            self.roots.push(*group);
            tracing::debug!(group = %self.base_model_id(*group), "hoisted model group");
        }
        Ok(())
    }

    pub fn into_groups(self) -> Vec<IrModelGroup> {
        self.roots.iter().map(|&root| self.group(root)).collect()
    }

    fn group(&self, id: GroupId) -> IrModelGroup {
        let node = &self.groups[id.0];
        IrModelGroup {
            base_model_id: node.base_model_id.clone(),
            models: node
                .models
                .iter()
                .map(|&model| {
                    let node = &self.models[model.0];
                    let mut model = node.model.clone();
                    model.model_groups = node.groups.iter().map(|&g| self.group(g)).collect();
                    model
                })
                .collect(),
        }
    }
}

use indexmap::IndexMap;

/// Models to hoist, addressed by model name from the root group down.
///
/// ```
/// use quiver_compiler::flatten::RemovalTree;
///
/// let tree = RemovalTree::new()
///     .extract(["Data", "Hero"])
///     .extract(["Data", "Hero", "Friends"]);
/// assert!(tree.child("Data").unwrap().child("Hero").unwrap().is_extracted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalTree {
    children: IndexMap<String, RemovalTree>,
    extracted: bool,
}

impl RemovalTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the model at `path` for extraction.
    pub fn extract<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mark(path);
        self
    }

    pub fn mark<I, S>(&mut self, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut node = self;
        for name in path {
            node = node.children.entry(name.into()).or_default();
        }
        node.extracted = true;
    }

    pub fn child(&self, model_name: &str) -> Option<&RemovalTree> {
        self.children.get(model_name)
    }

    pub fn is_extracted(&self) -> bool {
        self.extracted
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && !self.extracted
    }
}

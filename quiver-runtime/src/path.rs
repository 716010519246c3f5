//! Positions inside a response document.

use std::fmt;

/// One step of a [`ResponsePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    Key(String),
    Index(usize),
}

/// Location of a value in a response, e.g. `hero.friends[1].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResponsePath(Vec<PathElement>);

impl ResponsePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: PathElement) {
        self.0.push(element);
    }

    pub fn pop(&mut self) -> Option<PathElement> {
        self.0.pop()
    }

    /// This path extended by `key`.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push(PathElement::Key(key.into()));
        path
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut PathElement> {
        self.0.last_mut()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathElement> for ResponsePath {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, element) in self.0.iter().enumerate() {
            match element {
                PathElement::Key(key) if i == 0 => f.write_str(key)?,
                PathElement::Key(key) => write!(f, ".{}", key)?,
                PathElement::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path: ResponsePath = [
            PathElement::Key("hero".to_string()),
            PathElement::Key("friends".to_string()),
            PathElement::Index(1),
            PathElement::Key("name".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(path.to_string(), "hero.friends[1].name");
    }

    #[test]
    fn test_root() {
        assert_eq!(ResponsePath::new().to_string(), "$");
        assert_eq!(ResponsePath::new().key("hero").to_string(), "hero");
    }

    #[test]
    fn test_list_at_root() {
        let path: ResponsePath = [PathElement::Index(0), PathElement::Key("id".to_string())]
            .into_iter()
            .collect();
        assert_eq!(path.to_string(), "[0].id");
    }
}

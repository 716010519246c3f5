use std::fmt;

/// A type reference such as `[Episode!]!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Named(String),
    NonNull(Box<Type>),
    List(Box<Type>),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    /// Name of the innermost named type.
    pub fn name(&self) -> &str {
        match self {
            Type::Named(name) => name,
            Type::NonNull(inner) | Type::List(inner) => inner.name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNull(_))
    }

    pub fn is_list(&self) -> bool {
        match self {
            Type::List(_) => true,
            Type::NonNull(inner) => inner.is_list(),
            Type::Named(_) => false,
        }
    }

    /// The type with one level of non-null stripped.
    pub fn nullable(&self) -> &Type {
        match self {
            Type::NonNull(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => f.write_str(name),
            Type::NonNull(inner) => write!(f, "{}!", inner),
            Type::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_name() {
        let ty = Type::NonNull(Box::new(Type::List(Box::new(Type::NonNull(Box::new(
            Type::named("Episode"),
        ))))));
        assert_eq!(ty.to_string(), "[Episode!]!");
        assert_eq!(ty.name(), "Episode");
        assert!(ty.is_list());
        assert!(ty.is_non_null());
        assert!(!ty.nullable().is_non_null());
    }
}

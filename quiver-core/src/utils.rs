//! Name casing helpers used when deriving model and accessor names.

/// Uppercase the first character, leaving the rest untouched ("hero" -> "Hero").
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first character, leaving the rest untouched ("Hero" -> "hero").
pub fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Convert a GraphQL name to PascalCase.
///
/// Underscore-separated parts are capitalized and joined; camelCase input
/// keeps its inner capitals (`"heroFriends"` -> `"HeroFriends"`). Leading
/// underscores, as in `__typename`, are dropped.
pub fn to_pascal_case(s: &str) -> String {
    s.split('_').map(capitalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hero"), "Hero");
        assert_eq!(capitalize("Hero"), "Hero");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_decapitalize() {
        assert_eq!(decapitalize("HumanHero"), "humanHero");
        assert_eq!(decapitalize(""), "");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("hero"), "Hero");
        assert_eq!(to_pascal_case("heroFriends"), "HeroFriends");
        assert_eq!(to_pascal_case("hero_friends"), "HeroFriends");
        assert_eq!(to_pascal_case("__typename"), "Typename");
        assert_eq!(to_pascal_case(""), "");
    }
}

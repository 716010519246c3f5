//! The `[validation]` section: per-lint issue levels.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Result, manifest::ParseContext};

/// Lints the compiler knows about. Names in `[validation]` must be one of these.
pub const KNOWN_LINTS: &[&str] = &[
    "field-not-found",
    "selection-shape",
    "type-mismatch",
    "arguments",
    "variables",
    "fragment-type-condition",
    "unknown-fragment",
    "fragment-cycle",
    "unused-fragment",
    "deprecated-usage",
    "conflicting-fields",
    "unknown-directive",
    "duplicate-operation",
    "anonymous-operation",
    "unused-variable",
    "incompatible-type",
];

/// How a lint's findings are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Ignore,
    Warn,
    Error,
}

impl IssueLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueLevel::Ignore => "ignore",
            IssueLevel::Warn => "warn",
            IssueLevel::Error => "error",
        }
    }
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" | "allow" | "off" => Ok(IssueLevel::Ignore),
            "warn" | "warning" => Ok(IssueLevel::Warn),
            "error" | "deny" => Ok(IssueLevel::Error),
            _ => Err(format!(
                "unknown issue level '{}', expected 'ignore', 'warn' or 'error'",
                s
            )),
        }
    }
}

/// Lint overrides keyed by lint name, in file order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ValidationConfig {
    levels: IndexMap<String, IssueLevel>,
}

impl ValidationConfig {
    /// The configured level for a lint, if overridden.
    pub fn level(&self, lint: &str) -> Option<IssueLevel> {
        self.levels.get(lint).copied()
    }

    /// The configured level, or `default` when the lint is not overridden.
    pub fn level_or(&self, lint: &str, default: IssueLevel) -> IssueLevel {
        self.level(lint).unwrap_or(default)
    }

    pub fn set(&mut self, lint: impl Into<String>, level: IssueLevel) {
        self.levels.insert(lint.into(), level);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, IssueLevel)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub(crate) fn validate(&self, ctx: &ParseContext) -> Result<()> {
        for name in self.levels.keys() {
            if !KNOWN_LINTS.contains(&name.as_str()) {
                return Err(crate::Error::unknown_lint(
                    name,
                    KNOWN_LINTS,
                    ctx.src(),
                    ctx.filename(),
                    ctx.find_span(name),
                ));
            }
        }
        Ok(())
    }
}

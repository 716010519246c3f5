//! Diagnostic types for the compilation pipeline.
//!
//! This module provides types for collecting errors, warnings, and informational
//! messages during compilation phases.

use quiver_manifest::IssueLevel;
use serde::Serialize;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A fatal error that prevents further processing.
    Error,
    /// A warning that doesn't prevent processing but should be addressed.
    Warning,
    /// Informational message about the compilation process.
    Info,
}

impl Severity {
    /// Returns true if this is an error severity.
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    /// Severity for a configured issue level; `None` when the issue is ignored.
    pub fn from_level(level: IssueLevel) -> Option<Self> {
        match level {
            IssueLevel::Ignore => None,
            IssueLevel::Warn => Some(Severity::Warning),
            IssueLevel::Error => Some(Severity::Error),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message from a compilation phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The phase that produced this diagnostic.
    pub phase: String,
    /// Name of the lint or check, as used in `[validation]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// The diagnostic message.
    pub message: String,
    /// Optional source location (e.g., "graphql/hero.graphql:3:5").
    pub location: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            phase: phase.into(),
            code: None,
            message: message.into(),
            location: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, phase, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, phase, message)
    }

    /// Create a new info diagnostic.
    pub fn info(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, phase, message)
    }

    /// Add a location to this diagnostic.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = &self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error("validate", "unknown fragment");
        assert!(diag.severity.is_error());
        assert_eq!(diag.phase, "validate");
    }

    #[test]
    fn test_diagnostic_with_location() {
        let diag = Diagnostic::warning("validate", "unused fragment").at("hero.graphql:4:1");
        assert_eq!(diag.location.as_deref(), Some("hero.graphql:4:1"));
    }

    #[test]
    fn test_display_with_code() {
        let diag = Diagnostic::error("validate", "Unknown fragment 'A'")
            .with_code("unknown-fragment")
            .at("a.graphql:1:12");
        assert_eq!(
            diag.to_string(),
            "error[unknown-fragment]: Unknown fragment 'A' (at a.graphql:1:12)"
        );
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Info.to_string(), "info");
    }

    #[test]
    fn test_severity_from_level() {
        assert_eq!(Severity::from_level(IssueLevel::Ignore), None);
        assert_eq!(Severity::from_level(IssueLevel::Warn), Some(Severity::Warning));
        assert_eq!(Severity::from_level(IssueLevel::Error), Some(Severity::Error));
    }
}

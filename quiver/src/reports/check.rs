//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from document validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
    pub operation_count: usize,
    pub fragment_count: usize,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }

        for warning in &self.warnings {
            out.warning(warning);
        }

        if !self.warnings.is_empty() || !self.errors.is_empty() {
            out.newline();
        }

        if self.is_valid() {
            out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
            out.preformatted(&format!(
                "  {} operation{}, {} fragment{}",
                self.operation_count,
                plural(self.operation_count),
                self.fragment_count,
                plural(self.fragment_count)
            ));
        } else {
            out.preformatted(&format!(
                "✗ {} error{} found",
                self.errors.len(),
                plural(self.errors.len())
            ));
        }
    }
}

pub(super) fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

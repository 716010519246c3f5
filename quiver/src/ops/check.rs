//! Check operation - document validation.

use std::path::Path;

use eyre::Result;
use quiver_compiler::pipeline::{CompilationContext, Pipeline};

use super::{Project, describe};
use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Runs only the validate phase and returns its diagnostics. Validation
/// errors end up in the report; any other failure is returned.
pub fn check(project: Project, config_path: &Path) -> Result<CheckReport> {
    let operation_count = project.documents.operations().count();
    let fragment_count = project.documents.fragments().count();

    let mut ctx = CompilationContext::new(project.schema, project.documents, project.options);
    let outcome = Pipeline::new().check(&mut ctx);
    if let Err(err) = outcome
        && !ctx.has_errors()
    {
        return Err(err);
    }

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        errors: ctx.errors().map(describe).collect(),
        warnings: ctx.warnings().map(describe).collect(),
        operation_count,
        fragment_count,
    })
}

#[cfg(test)]
mod tests {
    use quiver_compiler::testing::project_dir;

    use super::*;

    fn run(manifest: &str, operations: &[(&str, &str)]) -> CheckReport {
        let dir = project_dir(manifest, operations).unwrap();
        let config = dir.path().join("quiver.toml");
        let project = Project::open(&config).unwrap();
        check(project, &config).unwrap()
    }

    #[test]
    fn test_valid_project() {
        let report = run(
            "[project]\nname = \"starwars\"\n",
            &[
                ("hero.graphql", "query Hero { hero { ...Details } }"),
                ("details.graphql", "fragment Details on Character { name }"),
            ],
        );
        assert!(report.is_valid());
        assert_eq!(report.operation_count, 1);
        assert_eq!(report.fragment_count, 1);
    }

    #[test]
    fn test_errors_are_reported() {
        let report = run(
            "[project]\nname = \"starwars\"\n",
            &[("hero.graphql", "query Hero { hero { height } }")],
        );
        assert!(!report.is_valid());
        let error = report
            .errors
            .iter()
            .find(|e| e.contains("Cannot query field 'height' on type 'Character'"))
            .unwrap();
        assert!(error.contains("[field-not-found]"));
        assert!(error.contains("hero.graphql"));
    }

    #[test]
    fn test_lint_level_from_manifest() {
        let operations = [
            ("hero.graphql", "query Hero { hero { name } }"),
            ("unused.graphql", "fragment Unused on Character { id }"),
        ];

        let report = run("[project]\nname = \"starwars\"\n", &operations);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);

        let report = run(
            "[project]\nname = \"starwars\"\n\n[validation]\nunused-fragment = \"error\"\n",
            &operations,
        );
        assert!(!report.is_valid());
        assert!(report.warnings.is_empty());
    }
}

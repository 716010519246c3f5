//! Ids operation - operation ids without writing artifacts.

use eyre::{Result, eyre};
use quiver_compiler::pipeline::Pipeline;

use super::Project;
use crate::reports::{IdRow, IdsReport};

/// Compile the project and list the id of every operation.
///
/// Ids are computed from the final document text, so the whole pipeline has
/// to run even though nothing is written.
pub fn ids(project: Project) -> Result<IdsReport> {
    let ctx = Pipeline::new().run(project.schema, project.documents, project.options)?;
    let manifest = ctx
        .manifest
        .ok_or_else(|| eyre!("operation manifest not set after analysis"))?;
    tracing::debug!(generator = %manifest.generator, "listing operation ids");

    let rows = manifest
        .operations
        .into_iter()
        .map(|op| IdRow {
            name: op.name,
            operation_type: op.operation_type.to_string(),
            id: op.id,
        })
        .collect();
    Ok(IdsReport { rows })
}

#[cfg(test)]
mod tests {
    use quiver_compiler::testing::project_dir;

    use super::*;

    #[test]
    fn test_ids_match_manifest_strategy() {
        let dir = project_dir(
            "[project]\nname = \"starwars\"\n",
            &[
                ("hero.graphql", "query Hero { hero { name } }"),
                (
                    "review.graphql",
                    "mutation Review($review: ReviewInput!) { createReview(review: $review) { stars } }",
                ),
            ],
        )
        .unwrap();

        let report = ids(Project::open(&dir.path().join("quiver.toml")).unwrap()).unwrap();
        let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Hero", "Review"]);
        assert_eq!(report.rows[1].operation_type, "mutation");
        assert!(
            report
                .rows
                .iter()
                .all(|r| r.id.len() == 64 && r.id.chars().all(|c| c.is_ascii_hexdigit()))
        );
    }
}

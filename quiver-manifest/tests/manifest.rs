use std::path::PathBuf;

use quiver_manifest::{Error, IssueLevel, Manifest, QuiverToml, TypenameMode};

const FULL: &str = r#"[project]
name = "starwars"

[schema]
files = ["schema.graphqls", "extensions.graphqls"]

[operations]
files = ["graphql", "extra/Hero.graphql"]

[codegen]
output = "out"
add_typename = "always"
flatten_depth = 2
upstream_resolver = "../base/build/quiver/resolver.json"

[validation]
unused-fragment = "error"
deprecated-usage = "ignore"

[scalars]
Date = "chrono::NaiveDate"
URL = "url::Url"
"#;

#[test]
fn test_parse_full_manifest() {
    let manifest: Manifest = FULL.parse().unwrap();

    assert_eq!(manifest.project.name, "starwars");
    assert_eq!(manifest.schema.files.len(), 2);
    assert_eq!(manifest.codegen.add_typename, TypenameMode::Always);
    assert_eq!(manifest.codegen.flatten_depth, 2);
    assert_eq!(manifest.codegen.output, PathBuf::from("out"));
    assert_eq!(
        manifest.validation.level("deprecated-usage"),
        Some(IssueLevel::Ignore)
    );
    let scalars: Vec<_> = manifest.scalars.iter().collect();
    assert_eq!(
        scalars,
        vec![("Date", "chrono::NaiveDate"), ("URL", "url::Url")]
    );
}

#[test]
fn test_minimal_manifest_uses_defaults() {
    let manifest: Manifest = "[project]\nname = \"app\"\n".parse().unwrap();

    assert_eq!(manifest.schema.files, vec![PathBuf::from("schema.graphqls")]);
    assert_eq!(manifest.operations.files, vec![PathBuf::from("graphql")]);
    assert_eq!(manifest.codegen.add_typename, TypenameMode::IfPolymorphic);
    assert!(manifest.validation.is_empty());
    assert!(manifest.scalars.is_empty());
}

#[test]
fn test_missing_project_is_a_parse_error() {
    let err = "[schema]\nfiles = []\n".parse::<Manifest>().unwrap_err();
    assert!(matches!(*err, Error::Parse { .. }));
}

#[test]
fn test_unknown_section_is_rejected() {
    let err = "[project]\nname = \"app\"\n\n[plugins]\nx = 1\n"
        .parse::<Manifest>()
        .unwrap_err();
    assert!(matches!(*err, Error::Parse { .. }));
}

#[test]
fn test_reserved_project_name() {
    let err = "[project]\nname = \"struct\"\n".parse::<Manifest>().unwrap_err();
    assert_eq!(err.to_string(), "'struct' is a reserved keyword");
}

#[test]
fn test_invalid_project_name() {
    let err = "[project]\nname = \"9lives\"\n".parse::<Manifest>().unwrap_err();
    assert_eq!(err.to_string(), "invalid project name '9lives'");
}

#[test]
fn test_unknown_lint_points_at_key() {
    let src = "[project]\nname = \"app\"\n\n[validation]\nunused-fragments = \"warn\"\n";
    let err = src.parse::<Manifest>().unwrap_err();
    match *err {
        Error::UnknownLint { name, span, .. } => {
            assert_eq!(name, "unused-fragments");
            let span = span.unwrap();
            assert_eq!(span.offset(), src.find("unused-fragments").unwrap());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_bad_issue_level() {
    let src = "[project]\nname = \"app\"\n\n[validation]\narguments = \"loud\"\n";
    let err = src.parse::<Manifest>().unwrap_err();
    assert!(matches!(*err, Error::Parse { .. }));
}

#[test]
fn test_invalid_scalar_name() {
    let src = "[project]\nname = \"app\"\n\n[scalars]\n\"Date-Time\" = \"String\"\n";
    let err = src.parse::<Manifest>().unwrap_err();
    assert_eq!(err.to_string(), "invalid scalar name 'Date-Time'");
}

#[test]
fn test_empty_scalar_target() {
    let src = "[project]\nname = \"app\"\n\n[scalars]\nDate = \" \"\n";
    let err = src.parse::<Manifest>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "scalar 'Date' is bound to an empty target type"
    );
}

#[test]
fn test_unknown_operation_id_strategy() {
    let src = "[project]\nname = \"app\"\n\n[codegen]\noperation_ids = \"md5\"\n";
    let err = src.parse::<Manifest>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown operation id strategy 'md5', expected 'sha256'"
    );
}

#[test]
fn test_open_resolves_relative_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiver.toml");
    std::fs::write(&path, FULL).unwrap();

    let toml = QuiverToml::open(&path).unwrap();
    assert_eq!(toml.content(), FULL);
    assert_eq!(toml.base_dir(), dir.path());
    assert_eq!(
        toml.schema_files(),
        vec![
            dir.path().join("schema.graphqls"),
            dir.path().join("extensions.graphqls")
        ]
    );
    assert_eq!(toml.output_dir(), dir.path().join("out"));
    assert_eq!(
        toml.upstream_resolver(),
        Some(dir.path().join("../base/build/quiver/resolver.json"))
    );
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = QuiverToml::open(dir.path().join("quiver.toml"))
        .err()
        .unwrap();
    assert!(matches!(*err, Error::Io { .. }));
}

#[test]
fn test_from_file_reports_filename() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiver.toml");
    std::fs::write(&path, "[project\n").unwrap();

    let err = Manifest::from_file(&path).unwrap_err();
    match *err {
        Error::Parse { src, .. } => assert_eq!(src.name(), path.display().to_string()),
        other => panic!("unexpected error: {other}"),
    }
}

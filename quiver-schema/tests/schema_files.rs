use quiver_schema::Schema;

#[test]
fn test_schema_split_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.graphqls");
    let extra = dir.path().join("extra.graphqls");
    std::fs::write(&base, "type Query { me: User }\ntype User { id: ID! }\n").unwrap();
    std::fs::write(&extra, "extend type User { name: String }\n").unwrap();

    let schema = Schema::from_files(&[&base, &extra]).unwrap();
    assert!(schema.field("User", "name").is_some());
    assert_eq!(
        schema.to_sdl(2),
        "type Query {\n  me: User\n}\n\ntype User {\n  id: ID!\n  name: String\n}\n"
    );
}

#[test]
fn test_missing_file() {
    let err = Schema::from_file("does/not/exist.graphqls").unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
}

#[test]
fn test_syntax_error_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.graphqls");
    std::fs::write(&path, "type Query { a: }\n").unwrap();

    let err = Schema::from_file(&path).unwrap_err();
    assert!(matches!(*err, quiver_schema::Error::Syntax(_)));
}

#[test]
fn test_custom_roots_are_printed() {
    let schema = Schema::from_sdl(
        "schema { query: Root mutation: Edit } type Root { a: Int } type Edit { b: Int }",
        "s",
    )
    .unwrap();
    assert_eq!(schema.root_type(quiver_syntax::ast::OperationKind::Mutation), Some("Edit"));
    assert!(schema.to_sdl(2).starts_with("schema {\n  query: Root\n  mutation: Edit\n}\n"));
}

//! Test utilities for the compiler and the crates built on it.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::path::Path;

use eyre::Result;
use quiver_ir::IrDocument;
use quiver_schema::Schema;

use crate::{
    CompilerOptions, DocumentSet,
    ir::IrBuilder,
    pipeline::{CompilationContext, Pipeline},
};

/// The Star Wars schema used across the test suites.
pub const STAR_WARS_SCHEMA: &str = r#"schema {
  query: Query
  mutation: Mutation
  subscription: Subscription
}

type Query {
  hero(episode: Episode): Character
  character(id: ID!): Character
  human(id: ID!): Human
  droid(id: ID!): Droid
  starship(id: ID!): Starship
  search(text: String!): [SearchResult!]!
  reviews(episode: Episode!): [Review]
}

type Mutation {
  createReview(episode: Episode, review: ReviewInput!): Review
}

type Subscription {
  reviewAdded(episode: Episode): Review
}

"The episodes in the original trilogy"
enum Episode {
  NEWHOPE
  EMPIRE
  JEDI
}

enum LengthUnit {
  METER
  FOOT
}

interface Character {
  id: ID!
  name: String!
  friends: [Character]
  appearsIn: [Episode]!
}

type Human implements Character {
  id: ID!
  name: String!
  homePlanet: String
  height(unit: LengthUnit = METER): Float
  mass: Float
  friends: [Character]
  appearsIn: [Episode]!
  starships: [Starship]
  birthDate: Date
}

type Droid implements Character {
  id: ID!
  name: String!
  friends: [Character]
  appearsIn: [Episode]!
  primaryFunction: String
  nickname: String @deprecated(reason: "Use name")
}

type Starship {
  id: ID!
  name: String!
  length(unit: LengthUnit = METER): Float
  coordinates: [[Float!]!]
}

union SearchResult = Human | Droid | Starship

type Review {
  stars: Int!
  commentary: String
  createdAt: Date
}

input ReviewInput {
  stars: Int!
  commentary: String
}

scalar Date
"#;

pub fn star_wars_schema() -> Schema {
    Schema::from_sdl(STAR_WARS_SCHEMA, "starwars.graphqls").unwrap()
}

/// Parse `src` as a single document named `test.graphql`.
pub fn documents(src: &str) -> DocumentSet {
    let mut documents = DocumentSet::new();
    documents.add_source("test.graphql", src).unwrap();
    documents
}

/// Build the IR for `src` against the Star Wars schema, without
/// validation, `__typename` insertion or flattening.
pub fn lower(src: &str) -> IrDocument {
    let schema = star_wars_schema();
    let documents = documents(src);
    IrBuilder::new(&schema, &documents).build().unwrap()
}

/// Run the full pipeline on `src` with default options.
pub fn compile(src: &str) -> Result<CompilationContext> {
    compile_with(src, CompilerOptions::default())
}

pub fn compile_with(src: &str, options: CompilerOptions) -> Result<CompilationContext> {
    Pipeline::new().run(star_wars_schema(), documents(src), options)
}

/// Write a project with a `quiver.toml`, the Star Wars schema and the given
/// operation files into a temporary directory.
///
/// The directory will be cleaned up when the returned `TempDir` is dropped.
pub fn project_dir(manifest: &str, operations: &[(&str, &str)]) -> Result<tempfile::TempDir> {
    let dir = tempfile::TempDir::new()?;
    write(dir.path(), "quiver.toml", manifest)?;
    write(dir.path(), "schema.graphqls", STAR_WARS_SCHEMA)?;
    for (name, src) in operations {
        write(dir.path(), &format!("graphql/{}", name), src)?;
    }
    Ok(dir)
}

fn write(root: &Path, relative: &str, content: &str) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

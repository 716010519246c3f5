//! Printing a parsed SDL document must reproduce canonical input exactly.

use quiver_syntax::{Document, Printer, parse_schema};

const SCHEMA: &str = r#"schema {
  query: Query
  mutation: Mutation
}

"""
The query root.
Every read starts here.
"""
type Query {
  hero(episode: Episode = JEDI): Character
  search(text: String!, first: Int = 10): [SearchResult!]!
  "Look up a droid by id"
  droid(id: ID!): Droid @deprecated(reason: "Use `hero`")
}

type Mutation {
  createReview(
    "Episode being reviewed"
    episode: Episode
    review: ReviewInput!
  ): Review
}

interface Node {
  id: ID!
}

interface Character implements Node {
  id: ID!
  name: String!
  friends: [Character]
}

type Human implements Character & Node @key(fields: "id") {
  id: ID!
  name: String!
  friends: [Character]
  height(unit: LengthUnit = METER): Float
}

type Droid implements Character & Node {
  id: ID!
  name: String!
  friends: [Character]
  primaryFunction: String
}

union SearchResult = Human | Droid

enum Episode {
  NEWHOPE
  EMPIRE
  JEDI @deprecated
}

enum LengthUnit {
  METER
  FOOT
}

input ReviewInput {
  stars: Int!
  "Optional commentary"
  commentary: String
  tags: [String!] = ["a", "b"]
}

type Review {
  stars: Int!
  commentary: String
}

scalar Date @specifiedBy(url: "https://example.com/date")

directive @key(fields: String!) repeatable on OBJECT | INTERFACE

extend schema @link(url: "https://example.com")

extend type Droid @shareable {
  model: String
}

extend union SearchResult = Review

extend enum LengthUnit {
  INCH
}
"#;

#[test]
fn test_sdl_is_reprinted_byte_identical() {
    let document = parse_schema(SCHEMA, "schema.graphqls").unwrap();
    let printed = Printer::default().print(&document);
    assert_eq!(printed, SCHEMA);
}

#[test]
fn test_parse_print_parse_is_stable() {
    let document = Document::parse(SCHEMA).unwrap();
    let first = document.to_string();
    let second = Document::parse(&first).unwrap().to_string();
    assert_eq!(first, second);
}

#[test]
fn test_compact_input_is_normalized() {
    let document = Document::parse("schema{query:Query}type Query{a(x:Int,y:[ID!]!):String}").unwrap();
    assert_eq!(
        document.to_string(),
        "schema {\n  query: Query\n}\n\ntype Query {\n  a(x: Int, y: [ID!]!): String\n}\n"
    );
}

#[test]
fn test_custom_indent() {
    let document = Document::parse("type Query { a: String }").unwrap();
    assert_eq!(
        Printer::with_indent(4).print(&document),
        "type Query {\n    a: String\n}\n"
    );
}

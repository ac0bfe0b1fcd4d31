use pretty_assertions::assert_eq;

use crate::{
    ast::{
        Definition, InputValue, OperationType, Selection, TypeDefinition, TypeSystemDefinition,
    },
    parser::{
        ParseError, Spanning, parse_executable, parse_executable_with_limit, parse_mixed,
        parse_schema,
    },
};

/// The canonical kitchen-sink query exercising most of the executable
/// grammar.
const KITCHEN_SINK: &str = r#"
query queryName($foo: ComplexType, $site: Site = MOBILE) {
  whoever123is: node(id: [123, 456]) {
    id
    ... on User @defer {
      field2 {
        id
        alias: field1(first: 10, after: $foo) @include(if: $foo) {
          id
          ...frag
        }
      }
    }
    ... @skip(unless: $foo) {
      id
    }
    ... {
      id
    }
  }
}

mutation likeStory {
  like(story: 123) @defer {
    story {
      id
    }
  }
}

subscription StoryLikeSubscription($input: StoryLikeSubscribeInput) {
  storyLikeSubscribe(input: $input) {
    story {
      likers {
        count
      }
      likeSentence {
        text
      }
    }
  }
}

fragment frag on Friend {
  foo(size: $size, bar: $b, obj: {key: "value"})
}

{
  unnamed(truthy: true, falsey: false, nullish: null)
  query
}
"#;

#[test]
fn parse_kitchen_sink() {
    let doc = parse_executable(KITCHEN_SINK).expect("kitchen sink should parse");

    assert_eq!(doc.operations().count(), 4);
    assert_eq!(doc.fragments().count(), 1);
    assert!(doc.fragment_by_name("frag").is_some());

    let kinds: Vec<_> = doc.operations().map(|op| op.item.operation_type).collect();
    assert_eq!(
        kinds,
        vec![
            OperationType::Query,
            OperationType::Mutation,
            OperationType::Subscription,
            OperationType::Query,
        ],
    );
}

#[test]
fn kitchen_sink_aliases_and_arguments() {
    let doc = parse_executable(KITCHEN_SINK).unwrap();
    let query = doc.operations().next().unwrap();

    let Selection::Field(node) = &query.item.selection_set[0] else {
        panic!("expected a field selection");
    };

    assert_eq!(node.item.name.item, "node");
    assert_eq!(node.item.response_name(), "whoever123is");

    let args = node.item.arguments.as_ref().unwrap();
    let id = args.item.get("id").unwrap();
    assert_eq!(
        id.item,
        InputValue::list(vec![InputValue::Int(123), InputValue::Int(456)]),
    );
}

#[test]
fn anonymous_query_shorthand() {
    let doc = parse_executable("{ field }").unwrap();
    let op = doc.operations().next().unwrap();

    assert_eq!(op.item.operation_type, OperationType::Query);
    assert_eq!(op.item.name, None);
    assert_eq!(op.item.selection_set.len(), 1);
}

#[test]
fn variable_default_empty_list() {
    let doc =
        parse_executable("query($empty: [Boolean!]! = []) { fieldWithArg(arg: $empty) }").unwrap();
    let op = doc.operations().next().unwrap();
    let defs = op.item.variable_definitions.as_ref().unwrap();
    let (name, def) = &defs.item.items[0];

    assert_eq!(name.item, "empty");
    assert_eq!(def.var_type.item.to_string(), "[Boolean!]!");
    assert_eq!(
        def.default_value.as_ref().unwrap().item,
        InputValue::List(vec![]),
    );
}

#[test]
fn fragment_named_on_is_reserved() {
    let err = parse_executable("fragment on on Type { field }").unwrap_err();

    assert_eq!(err.item, ParseError::ReservedName("on".into()));
}

#[test]
fn executable_rejects_type_system_definitions() {
    let err = parse_executable("type Query { hero: String }").unwrap_err();

    assert_eq!(err.item, ParseError::UnexpectedToken("type".into()));
}

#[test]
fn mixed_accepts_both_dialects() {
    let doc = parse_mixed(
        r#"
        type Query { hero: String }

        { hero }
        "#,
    )
    .unwrap();

    assert_eq!(doc.definitions.len(), 2);
    assert!(doc.has_type_system_definitions());
    assert_eq!(doc.operations().count(), 1);
}

#[test]
fn schema_rejects_operations() {
    assert!(parse_schema("{ hero }").is_err());
    assert!(parse_schema("query Q { hero }").is_err());
}

#[test]
fn depth_limit_is_enforced() {
    for limit in 1..5 {
        let mut at_limit = String::new();
        for _ in 0..limit {
            at_limit.push_str("{ f ");
        }
        for _ in 0..limit {
            at_limit.push('}');
        }
        assert!(
            parse_executable_with_limit(&at_limit, limit).is_ok(),
            "depth {limit} should fit in a limit of {limit}",
        );

        let mut too_deep = String::new();
        for _ in 0..limit + 1 {
            too_deep.push_str("{ f ");
        }
        for _ in 0..limit + 1 {
            too_deep.push('}');
        }
        assert_eq!(
            parse_executable_with_limit(&too_deep, limit).unwrap_err().item,
            ParseError::SelectionDepthExceeded(limit),
        );
    }
}

#[test]
fn depth_limit_error_names_the_selection_set_rule() {
    let err = parse_executable_with_limit("{ a { b } }", 1).unwrap_err();

    assert_eq!(
        err.item.to_string(),
        "Exceeded the selection set depth limit of 1",
    );
}

const SCHEMA_KITCHEN_SINK: &str = r#"
"""
A simple GraphQL schema which is well described.
"""
schema {
  query: Query
  mutation: Mutation
  subscription: Subscription
}

type Query {
  node(id: ID!): Node
  dog: Dog
}

"A creature in the system."
interface Node {
  id: ID!
}

type Dog implements Node & Pet {
  id: ID!
  name: String!
  barkVolume: Int
  doesKnowCommand(dogCommand: DogCommand!): Boolean!
}

interface Pet {
  name: String!
}

union CatOrDog = Cat | Dog

type Cat implements Node & Pet {
  id: ID!
  name: String!
  meowVolume: Int
}

enum DogCommand {
  SIT
  "Lie down."
  DOWN
  HEEL @deprecated(reason: "No longer taught")
}

input FindDogInput {
  name: String
  owner: String = "unknown"
}

scalar DateTime @specifiedBy(url: "https://scalars.graphql.org/andimarek/date-time")

directive @transform(from: String!) repeatable on FIELD | FIELD_DEFINITION

type Mutation {
  mutateDog(input: FindDogInput): Dog
}

type Subscription {
  newDog: Dog
}

extend type Dog {
  nickname: String
}

extend schema @transform(from: "legacy")
"#;

#[test]
fn parse_schema_kitchen_sink() {
    let doc = parse_schema(SCHEMA_KITCHEN_SINK).expect("schema kitchen sink should parse");

    let mut names = Vec::new();
    for def in &doc.definitions {
        if let Definition::TypeSystem(TypeSystemDefinition::Type(t)) = def {
            names.push(t.item.name().item.clone());
        }
    }

    assert_eq!(
        names,
        vec![
            "Query",
            "Node",
            "Dog",
            "Pet",
            "CatOrDog",
            "Cat",
            "DogCommand",
            "FindDogInput",
            "DateTime",
            "Mutation",
            "Subscription",
        ],
    );
}

#[test]
fn schema_descriptions_are_attached() {
    let doc = parse_schema(SCHEMA_KITCHEN_SINK).unwrap();

    let node = doc
        .definitions
        .iter()
        .find_map(|def| match def {
            Definition::TypeSystem(TypeSystemDefinition::Type(Spanning {
                item: TypeDefinition::Interface(i),
                ..
            })) if i.name.item == "Node" => Some(i),
            _ => None,
        })
        .unwrap();

    assert_eq!(
        node.description.as_ref().map(|d| d.item.as_str()),
        Some("A creature in the system."),
    );
}

#[test]
fn schema_block_description_is_indent_stripped() {
    let doc = parse_schema(SCHEMA_KITCHEN_SINK).unwrap();

    let schema_def = doc
        .definitions
        .iter()
        .find_map(|def| match def {
            Definition::TypeSystem(TypeSystemDefinition::Schema(s)) => Some(s),
            _ => None,
        })
        .unwrap();

    assert_eq!(
        schema_def.item.description.as_ref().map(|d| d.item.as_str()),
        Some("A simple GraphQL schema which is well described."),
    );
    assert_eq!(schema_def.item.operation_types.len(), 3);
}

#[test]
fn implements_ampersand_list() {
    let doc = parse_schema("type A implements B & C { f: Int }").unwrap();

    let Definition::TypeSystem(TypeSystemDefinition::Type(Spanning {
        item: TypeDefinition::Object(obj),
        ..
    })) = &doc.definitions[0]
    else {
        panic!("expected an object definition");
    };

    let interfaces: Vec<_> = obj.interfaces.iter().map(|i| i.item.as_str()).collect();
    assert_eq!(interfaces, vec!["B", "C"]);
}

#[test]
fn directive_definition_repeatable_and_locations() {
    let doc = parse_schema(SCHEMA_KITCHEN_SINK).unwrap();

    let transform = doc
        .definitions
        .iter()
        .find_map(|def| match def {
            Definition::TypeSystem(TypeSystemDefinition::Directive(d)) => Some(d),
            _ => None,
        })
        .unwrap();

    assert_eq!(transform.item.name.item, "transform");
    assert!(transform.item.repeatable);
    let locations: Vec<_> = transform
        .item
        .locations
        .iter()
        .map(|l| l.item.as_str())
        .collect();
    assert_eq!(locations, vec!["FIELD", "FIELD_DEFINITION"]);
}

#[test]
fn enum_reserves_boolean_and_null_names() {
    assert_eq!(
        parse_schema("enum Bad { true }").unwrap_err().item,
        ParseError::ReservedName("true".into()),
    );
    assert_eq!(
        parse_schema("enum Bad { null }").unwrap_err().item,
        ParseError::ReservedName("null".into()),
    );
}

#[test]
fn unterminated_selection_set_errors() {
    let err = parse_executable("{ foo").unwrap_err();

    assert_eq!(err.item, ParseError::UnexpectedEndOfFile);
}

#[test]
fn variable_in_const_position_is_rejected() {
    assert!(parse_executable("query($a: Int = $b) { f }").is_err());
}

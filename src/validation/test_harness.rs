//! Fixtures shared by the per-rule validation tests.

use crate::{
    parser::parse_schema,
    schema::{Schema, SchemaBuilder},
};

/// The default schema the rule tests run against.
pub(crate) const DEFAULT_TEST_SCHEMA: &str = r#"
schema {
  query: QueryRoot
  mutation: MutationRoot
  subscription: SubscriptionRoot
}

directive @onQuery on QUERY
directive @onField repeatable on FIELD

interface Being {
  name(surname: Boolean): String
}

interface Pet {
  name(surname: Boolean): String
}

interface Canine {
  name(surname: Boolean): String
}

enum DogCommand { SIT, HEEL, DOWN }

type Dog implements Being & Pet & Canine {
  name(surname: Boolean): String
  nickname: String
  barkVolume: Int
  barks: Boolean
  doesKnowCommand(dogCommand: DogCommand): Boolean
  isHousetrained(atOtherHomes: Boolean = true): Boolean
  isAtLocation(x: Int, y: Int): Boolean
}

enum FurColor { BROWN, BLACK, TAN, SPOTTED }

type Cat implements Being & Pet {
  name(surname: Boolean): String
  nickname: String
  meows: Boolean
  meowVolume: Int
  furColor: FurColor
}

union CatOrDog = Cat | Dog

interface Intelligent {
  iq: Int
}

type Human implements Being & Intelligent {
  name(surname: Boolean): String
  pets: [Pet]
  relatives: [Human]
  iq: Int
}

type Alien implements Being & Intelligent {
  name(surname: Boolean): String
  numEyes: Int
  iq: Int
}

union DogOrHuman = Dog | Human
union HumanOrAlien = Human | Alien

input ComplexInput {
  requiredField: Boolean!
  intField: Int
  stringField: String
  booleanField: Boolean
  stringListField: [String]
}

type ComplicatedArgs {
  intArgField(intArg: Int): String
  nonNullIntArgField(nonNullIntArg: Int!): String
  stringArgField(stringArg: String): String
  booleanArgField(booleanArg: Boolean): String
  enumArgField(enumArg: FurColor): String
  floatArgField(floatArg: Float): String
  idArgField(idArg: ID): String
  stringListArgField(stringListArg: [String]): String
  complexArgField(complexArg: ComplexInput): String
  multipleReqs(req1: Int!, req2: Int!): String
  multipleOpts(opt1: Int = 0, opt2: Int = 0): String
  multipleOptAndReq(req1: Int!, req2: Int!, opt1: Int = 0, opt2: Int = 0): String
}

type QueryRoot {
  human(id: ID): Human
  alien: Alien
  dog: Dog
  cat: Cat
  pet: Pet
  being: Being
  catOrDog: CatOrDog
  dogOrHuman: DogOrHuman
  humanOrAlien: HumanOrAlien
  complicatedArgs: ComplicatedArgs
}

type MutationRoot {
  testInput(input: TestInput): Int
}

input TestInput {
  id: Int!
  name: String!
}

type Message {
  body: String
  sender: String
}

type SubscriptionRoot {
  newMessage: Message
  disturbance: Int
}
"#;

pub(crate) fn test_schema() -> Schema {
    schema_from_sdl(DEFAULT_TEST_SCHEMA)
}

pub(crate) fn schema_from_sdl(sdl: &str) -> Schema {
    let doc = parse_schema(sdl).expect("test schema should parse");
    let mut builder = SchemaBuilder::new();
    builder
        .add_document(&doc)
        .expect("test schema should register");
    builder.finish().expect("test schema should build")
}

/// Runs a single rule over a query and returns the sorted errors.
macro_rules! rule_errors {
    ($factory:path, $q:expr) => {
        crate::validation::test_harness::rule_errors!(
            $factory,
            $q,
            crate::validation::test_harness::test_schema()
        )
    };
    ($factory:path, $q:expr, $schema:expr) => {{
        let schema = $schema;
        let doc = crate::parser::parse_mixed($q).expect("parse error in rule test");
        let mut ctx = crate::validation::ValidatorContext::new(&schema, &doc);
        let mut visitor = $factory();
        crate::validation::visit(&mut visitor, &mut ctx, &doc);
        ctx.into_errors()
    }};
}

/// Asserts a rule reports nothing for the query.
macro_rules! expect_passes_rule {
    ($factory:path, $q:expr $(, $schema:expr)?) => {{
        let errors = crate::validation::test_harness::rule_errors!($factory, $q $(, $schema)?);
        assert!(
            errors.is_empty(),
            "expected rule to pass, but it reported: {errors:#?}",
        );
    }};
}

/// Asserts a rule reports exactly the given messages (order-insensitive).
macro_rules! expect_fails_rule {
    ($factory:path, $q:expr, $expected:expr $(, $schema:expr)?) => {{
        let errors = crate::validation::test_harness::rule_errors!($factory, $q $(, $schema)?);
        let mut messages: Vec<String> = errors.iter().map(|e| e.message().into()).collect();
        messages.sort_unstable();
        let mut expected: Vec<String> = $expected.iter().map(ToString::to_string).collect();
        expected.sort_unstable();
        assert_eq!(
            messages, expected,
            "rule reported different errors: {errors:#?}",
        );
    }};
}

pub(crate) use {expect_fails_rule, expect_passes_rule, rule_errors};

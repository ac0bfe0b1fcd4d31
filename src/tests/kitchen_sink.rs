//! The kitchen-sink document: every executable construct in one request,
//! validated against a sample schema and resolved against deterministic
//! mocks.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Object, Resolved, Value, graphql_value,
    tests::{run_with, service},
};

const SAMPLE_SCHEMA: &str = r#"
directive @defer on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT

schema {
  query: Query
  mutation: Mutation
  subscription: Subscription
}

enum Site { DESKTOP, MOBILE }

interface Node {
  id: [Int]
}

type Query {
  node(id: [Int]): Node
}

type User implements Node {
  id: [Int]
  field2: Nested
}

type Nested {
  id: [Int]
  field1(first: Int, after: Int): Friend
}

input KeyedInput { key: String }

type Friend implements Node {
  id: [Int]
  foo(size: Int, bar: String, obj: KeyedInput): String
}

type Story { id: [Int] }
type LikePayload { story: Story }

type Mutation {
  like(story: Int): LikePayload
}

input StoryLikeSubscribeInput { storyId: Int }

type Likers { count: Int }
type Sentence { text: String }

type StoryUpdate {
  likers: Likers
  likeSentence: Sentence
}

type StoryLikePayload { story: StoryUpdate }

type Subscription {
  storyLikeSubscribe(input: StoryLikeSubscribeInput): StoryLikePayload
}
"#;

const KITCHEN_SINK: &str = r#"
query queryName($foo: Boolean = true, $site: Site = MOBILE, $size: Int, $b: String) {
  whoever123is: node(id: [123, 456]) {
    id
    ... on User @defer {
      field2 {
        id
        alias: field1(first: 10, after: $size) @include(if: $foo) {
          id
          ...frag
        }
      }
    }
    ... @skip(if: false) {
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
      likers { count }
      likeSentence { text }
    }
  }
}

fragment frag on Friend {
  foo(size: $size, bar: $b, obj: {key: "value"})
}
"#;

fn ids() -> Resolved {
    Resolved::Value(Value::List(vec![Value::Int(123), Value::Int(456)]))
}

fn sample_root() -> Object {
    let friend = Arc::new(
        Object::new(["Friend", "Node"])
            .with_resolver("id", |_| ids().ready())
            .with_resolver("foo", |_| Resolved::value("foo value").ready()),
    );

    let nested = Arc::new(
        Object::new(["Nested"])
            .with_resolver("id", |_| ids().ready())
            .with_resolver("field1", move |_| {
                Resolved::object(Arc::clone(&friend)).ready()
            }),
    );

    let user = Arc::new(
        Object::new(["User", "Node"])
            .with_resolver("id", |_| ids().ready())
            .with_resolver("field2", move |_| {
                Resolved::object(Arc::clone(&nested)).ready()
            }),
    );

    Object::new(["Query"]).with_resolver("node", move |_| {
        Resolved::object(Arc::clone(&user)).ready()
    })
}

#[test]
fn kitchen_sink_parses_and_validates() {
    let service = service(SAMPLE_SCHEMA, sample_root(), None, None);
    let doc = crate::parser::parse_executable(KITCHEN_SINK).expect("kitchen sink should parse");

    assert_eq!(service.validate(&doc), vec![]);
}

#[test]
fn kitchen_sink_query_resolves_against_mocks() {
    let service = service(SAMPLE_SCHEMA, sample_root(), None, None);

    let output = run_with(
        &service,
        KITCHEN_SINK,
        Some("queryName"),
        graphql_value!({}),
        crate::Launch::deferred(),
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "whoever123is": {
                "id": [123, 456],
                "field2": {
                    "id": [123, 456],
                    "alias": {
                        "id": [123, 456],
                        "foo": "foo value",
                    },
                },
            },
        }),
    );
}

#[test]
fn kitchen_sink_mutation_resolves() {
    let story = Arc::new(Object::new(["Story"]).with_resolver("id", |_| ids().ready()));
    let payload = Arc::new(Object::new(["LikePayload"]).with_resolver("story", move |_| {
        Resolved::object(Arc::clone(&story)).ready()
    }));
    let mutation = Object::new(["Mutation"]).with_resolver("like", move |params| {
        assert_eq!(params.argument("story"), Some(&Value::Int(123)));
        Resolved::object(Arc::clone(&payload)).ready()
    });

    let service = service(SAMPLE_SCHEMA, sample_root(), Some(mutation), None);

    let output = run_with(
        &service,
        KITCHEN_SINK,
        Some("likeStory"),
        graphql_value!({}),
        crate::Launch::deferred(),
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        output.data,
        graphql_value!({ "like": { "story": { "id": [123, 456] } } }),
    );
}

//! Introspection entry points resolved through the regular execution path.

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    Object, Resolved,
    parser::parse_schema,
    schema::SchemaBuilder,
    tests::{run, service},
};

const PETS_SCHEMA: &str = r#"
type Query {
  dog: Dog
}

"A very good dog."
type Dog implements Pet {
  name: String!
  barkVolume: Int
  commands(abridged: Boolean): [String!]
  oldName: String @deprecated(reason: "Renamed")
}

interface Pet {
  name: String!
}

enum DogCommand {
  SIT
  HEEL @deprecated(reason: "No longer taught")
}

scalar When @specifiedBy(url: "https://example.com/when")
"#;

fn query_root() -> Object {
    Object::new(["Query"]).with_resolver("dog", |_| Resolved::null_object().ready())
}

#[test]
fn schema_entry_point() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(
        &service,
        "{ __schema { queryType { name kind } mutationType { name } } }",
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "__schema": {
                "queryType": { "name": "Query", "kind": "OBJECT" },
                "mutationType": null,
            },
        }),
    );
}

#[test]
fn type_entry_point_with_wrapped_field_types() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(
        &service,
        r#"
        {
          __type(name: "Dog") {
            name
            kind
            description
            fields {
              name
              type { kind name ofType { kind name } }
            }
            interfaces { name }
          }
        }
        "#,
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "__type": {
                "name": "Dog",
                "kind": "OBJECT",
                "description": "A very good dog.",
                "fields": [
                    {
                        "name": "name",
                        "type": {
                            "kind": "NON_NULL",
                            "name": null,
                            "ofType": { "kind": "SCALAR", "name": "String" },
                        },
                    },
                    {
                        "name": "barkVolume",
                        "type": { "kind": "SCALAR", "name": "Int", "ofType": null },
                    },
                    {
                        "name": "commands",
                        "type": {
                            "kind": "LIST",
                            "name": null,
                            "ofType": { "kind": "NON_NULL", "name": null },
                        },
                    },
                ],
                "interfaces": [{ "name": "Pet" }],
            },
        }),
    );
}

#[test]
fn deprecated_members_are_filtered_by_default() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(
        &service,
        r#"
        {
          all: __type(name: "DogCommand") {
            enumValues(includeDeprecated: true) { name isDeprecated deprecationReason }
          }
          current: __type(name: "DogCommand") {
            enumValues { name }
          }
        }
        "#,
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "all": {
                "enumValues": [
                    { "name": "SIT", "isDeprecated": false, "deprecationReason": null },
                    { "name": "HEEL", "isDeprecated": true, "deprecationReason": "No longer taught" },
                ],
            },
            "current": { "enumValues": [{ "name": "SIT" }] },
        }),
    );
}

#[test]
fn specified_by_url_is_exposed() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(
        &service,
        r#"{ __type(name: "When") { name kind specifiedByURL } }"#,
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "__type": {
                "name": "When",
                "kind": "SCALAR",
                "specifiedByURL": "https://example.com/when",
            },
        }),
    );
}

#[test]
fn possible_types_of_an_interface() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(
        &service,
        r#"{ __type(name: "Pet") { kind possibleTypes { name } } }"#,
    );

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({
            "__type": {
                "kind": "INTERFACE",
                "possibleTypes": [{ "name": "Dog" }],
            },
        }),
    );
}

#[test]
fn built_in_directives_are_listed() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(
        &service,
        "{ __schema { directives { name isRepeatable } } }",
    );

    assert_eq!(output.errors, vec![]);
    let directives = serde_json::to_value(&output.data).unwrap()["__schema"]["directives"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();

    assert_eq!(directives, vec!["skip", "include", "deprecated", "specifiedBy"]);
}

#[test]
fn unknown_type_lookup_is_null() {
    let service = service(PETS_SCHEMA, query_root(), None, None);

    let output = run(&service, r#"{ __type(name: "Nope") { name } }"#);

    assert_eq!(output.errors, vec![]);
    assert_eq!(
        serde_json::to_value(&output.data).unwrap(),
        json!({ "__type": null }),
    );
}

#[test]
fn disabled_introspection_hides_the_entry_points() {
    let doc = parse_schema(PETS_SCHEMA).unwrap();
    let mut builder = SchemaBuilder::new();
    builder.add_document(&doc).unwrap();
    builder.disable_introspection();
    let schema = std::sync::Arc::new(builder.finish().unwrap());

    let service = crate::Request::new(schema, query_root(), None, None);

    let output = run(&service, "{ __schema { queryType { name } } }");

    assert_eq!(output.data, crate::graphql_value!({ "__schema": null }));
    assert_eq!(output.errors.len(), 1);
    assert_eq!(
        output.errors[0].error().message(),
        "Unknown field name: __schema",
    );
}

//! End-to-end scenarios exercising parse, validation, execution and
//! subscriptions together.

mod introspection_queries;
mod kitchen_sink;
mod today;

use std::sync::Arc;

use crate::{
    Launch, Object, Request, ResolveParams, SchemaBuilder, Value,
    executor::ExecutionOutput,
    parser::{parse_executable, parse_schema},
};

pub(crate) fn build_schema(sdl: &str) -> Arc<crate::Schema> {
    let doc = parse_schema(sdl).expect("test schema should parse");
    let mut builder = SchemaBuilder::new();
    builder
        .add_document(&doc)
        .expect("test schema should register");
    Arc::new(builder.finish().expect("test schema should build"))
}

pub(crate) fn service(
    sdl: &str,
    query: Object,
    mutation: Option<Object>,
    subscription: Option<Object>,
) -> Request {
    Request::new(build_schema(sdl), query, mutation, subscription)
}

pub(crate) fn run(service: &Request, query: &str) -> ExecutionOutput {
    run_with(service, query, None, Value::Null, Launch::deferred())
}

pub(crate) fn run_with(
    service: &Request,
    query: &str,
    operation_name: Option<&str>,
    variables: Value,
    launch: Launch,
) -> ExecutionOutput {
    let document = Arc::new(parse_executable(query).expect("test query should parse"));
    service
        .resolve_sync(ResolveParams {
            state: None,
            document,
            operation_name: operation_name.map(Into::into),
            variables,
            launch,
        })
        .expect("test query should resolve")
}

//! GraphQL service runtime: parse schema and request documents, validate
//! requests against a schema, and execute them against resolver tables to
//! produce a response.
//!
//! The crate has three tightly coupled subsystems:
//!
//! - the [`parser`], producing an owned syntax tree for the October 2021
//!   grammar, both the executable and the type-system dialects;
//! - the [`validation`] pass, enforcing the static rules of the GraphQL
//!   specification against a loaded [`Schema`];
//! - the [`executor`], resolving selection sets against user-supplied
//!   resolver tables with pluggable concurrency, plus subscription
//!   registration and event delivery through [`Request`].
//!
//! A minimal round trip:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use graphql_service::{
//!     Launch, Object, Request, Resolved, ResolveParams, SchemaBuilder, graphql_value,
//!     parse_executable, parse_schema,
//! };
//!
//! let schema_doc = parse_schema("type Query { hello: String! }").unwrap();
//! let mut builder = SchemaBuilder::new();
//! builder.add_document(&schema_doc).unwrap();
//! let schema = Arc::new(builder.finish().unwrap());
//!
//! let query_root = Object::new(["Query"])
//!     .with_resolver("hello", |_| Resolved::value("world").ready());
//!
//! let service = Request::new(schema, query_root, None, None);
//!
//! let output = service
//!     .resolve_sync(ResolveParams {
//!         state: None,
//!         document: Arc::new(parse_executable("{ hello }").unwrap()),
//!         operation_name: None,
//!         variables: graphql_value!({}),
//!         launch: Launch::deferred(),
//!     })
//!     .unwrap();
//!
//! assert_eq!(output.data, graphql_value!({ "hello": "world" }));
//! ```

pub mod ast;
pub mod executor;
mod introspection;
pub mod parser;
pub mod request;
pub mod response;
pub mod schema;
pub mod subscriptions;
pub mod types;
pub mod validation;
pub mod value;

#[cfg(test)]
mod tests;

use derive_more::with_trait::{Display, From};
use itertools::Itertools as _;

pub use crate::{
    ast::{Document, InputValue, OperationType},
    executor::{
        ExecutionError, ExecutionOutput, FieldError, FieldResult, FragmentDirectives,
        OperationData, PathSegment, ResolverParams, SharedState,
    },
    parser::{
        DEFAULT_DEPTH_LIMIT, ParseError, SourcePosition, Span, Spanning, parse_executable,
        parse_executable_with_limit, parse_mixed, parse_mixed_with_limit, parse_schema,
        parse_schema_with_limit,
    },
    request::{Request, ResolveParams, SubscribeParams},
    response::GraphQLResponse,
    schema::{
        DirectiveLocation, DirectiveType, NamedType, NamedTypeKind, Schema, SchemaBuilder,
        SchemaViolation, TypeKind, TypeRef, WrapError, WrapperKind,
    },
    subscriptions::{
        SubscriptionCallback, SubscriptionData, SubscriptionFilter, SubscriptionKey,
    },
    types::{Launch, Object, Resolved, Resolver, ResolverFuture},
    validation::{RuleError, validate},
    value::{Object as ValueObject, Value},
};

/// An error that prevented request execution.
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum GraphQLError {
    /// The source is not a valid GraphQL document.
    ParseError(Spanning<ParseError>),

    /// The document violates static rules of the schema.
    #[display("{}", _0.iter().format("\n"))]
    ValidationError(Vec<RuleError>),

    /// The request names no operation and the document has none.
    #[display("No operation provided")]
    NoOperationProvided,

    /// The request is ambiguous about which operation to execute.
    #[display("Multiple operations provided")]
    MultipleOperationsProvided,

    /// The requested operation is not defined in the document.
    #[display("Unknown operation name")]
    UnknownOperationName,

    /// A non-subscription operation was passed to the subscription surface.
    #[display("Operation is not a subscription")]
    NotSubscription,

    /// No root object is registered for the operation's type.
    #[display("No root object registered for {_0} operations")]
    UnsupportedOperation(#[from(ignore)] OperationType),

    /// The schema itself failed to assemble.
    SchemaViolation(SchemaViolation),
}

impl From<RuleError> for GraphQLError {
    fn from(value: RuleError) -> Self {
        vec![value].into()
    }
}

impl std::error::Error for GraphQLError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseError(e) => Some(e),
            Self::ValidationError(errs) => Some(errs.first()?),
            Self::SchemaViolation(e) => Some(e),
            Self::NoOperationProvided
            | Self::MultipleOperationsProvided
            | Self::UnknownOperationName
            | Self::NotSubscription
            | Self::UnsupportedOperation(..) => None,
        }
    }
}

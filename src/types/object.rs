//! Resolver-table objects: the dynamic dispatch surface user code implements.

use std::{fmt, sync::Arc};

use fnv::FnvHashMap;
use futures::future::BoxFuture;

use crate::{
    executor::{FieldResult, ResolverParams},
    value::Value,
};

/// The future a resolver returns.
pub type ResolverFuture = BoxFuture<'static, FieldResult<Resolved>>;

/// A field resolver: maps untyped resolver parameters to a result future.
pub type Resolver = Box<dyn Fn(ResolverParams) -> ResolverFuture + Send + Sync>;

/// What a resolver hands back to the executor before type-modifier
/// adaptation.
///
/// Nested lists suspend at each inner boundary; objects are resolved against
/// the field's sub-selection by the executor.
pub enum Resolved {
    /// A finished leaf value.
    Value(Value),

    /// A composite result, or `None` for a null object.
    Object(Option<Arc<Object>>),

    /// A list of results, each adapted recursively.
    List(Vec<Resolved>),
}

impl Resolved {
    /// Wraps a plain value.
    pub fn value(v: impl Into<Value>) -> Self {
        Self::Value(v.into())
    }

    /// Wraps an object to resolve against the sub-selection.
    pub fn object(obj: Arc<Object>) -> Self {
        Self::Object(Some(obj))
    }

    /// A null result in an object position.
    pub fn null_object() -> Self {
        Self::Object(None)
    }

    /// An immediately ready resolver future.
    pub fn ready(self) -> ResolverFuture {
        Box::pin(async move { Ok(self) })
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Object(Some(o)) => f.debug_tuple("Object").field(&o.type_name()).finish(),
            Self::Object(None) => f.debug_tuple("Object").field(&Value::Null).finish(),
            Self::List(l) => f.debug_tuple("List").field(&l.len()).finish(),
        }
    }
}

impl From<Value> for Resolved {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

/// An object exposing typed fields through a name → resolver table.
///
/// The table is read-only after construction; the executor dispatches fields
/// through it and matches fragment type conditions against `type_names`.
pub struct Object {
    type_names: Vec<String>,
    resolvers: FnvHashMap<String, Resolver>,
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type_names", &self.type_names)
            .field("resolvers", &self.resolvers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Object {
    /// Creates an object answering to the given type names.
    ///
    /// The first name is the primary one, reported for `__typename`; the rest
    /// are the interfaces and unions the object is a possible type of.
    pub fn new<N: Into<String>>(type_names: impl IntoIterator<Item = N>) -> Self {
        Self {
            type_names: type_names.into_iter().map(Into::into).collect(),
            resolvers: FnvHashMap::default(),
        }
    }

    /// Adds a field resolver to the table.
    #[must_use]
    pub fn with_resolver<F>(mut self, field_name: impl Into<String>, resolver: F) -> Self
    where
        F: Fn(ResolverParams) -> ResolverFuture + Send + Sync + 'static,
    {
        self.resolvers.insert(field_name.into(), Box::new(resolver));
        self
    }

    /// Inserts a field resolver into the table.
    pub fn add_resolver<F>(&mut self, field_name: impl Into<String>, resolver: F)
    where
        F: Fn(ResolverParams) -> ResolverFuture + Send + Sync + 'static,
    {
        self.resolvers.insert(field_name.into(), Box::new(resolver));
    }

    /// The primary type name, answered for `__typename`.
    pub fn type_name(&self) -> &str {
        self.type_names.first().map_or("", String::as_str)
    }

    /// Whether a fragment type condition applies to this object.
    pub fn matches_type(&self, type_condition: &str) -> bool {
        self.type_names.iter().any(|n| n == type_condition)
    }

    /// All type names this object answers to.
    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    pub(crate) fn resolver(&self, field_name: &str) -> Option<&Resolver> {
        self.resolvers.get(field_name)
    }
}

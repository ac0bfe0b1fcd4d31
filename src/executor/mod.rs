//! Resolve a validated document to a response value.

pub mod directives;

use std::{
    any::Any,
    collections::HashSet,
    fmt::{self, Display},
    sync::Arc,
};

use fnv::FnvHashMap;
use futures::future::{BoxFuture, join_all};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{
    GraphQLError,
    ast::{
        Document, Field, Fragment, Operation, OperationType, Selection, SelectionSet, Type,
    },
    parser::{SourcePosition, Span, Spanning},
    schema::{NamedType, NamedTypeKind, Schema},
    types::{Launch, Object, Resolved},
    validation::validate_input_values,
    value::{self, Value},
};

pub use self::directives::FragmentDirectives;
use self::directives::{
    evaluate_directives, input_value_to_value, merge_directives, should_include,
};

/// Error raised by a field resolver.
///
/// Represented by a human-readable message and an optional value with
/// additional information. Converts from any [`Display`] type, so error
/// chaining with the `?` operator works out of the box.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    message: String,
    extensions: Value,
}

impl<T: Display> From<T> for FieldError {
    fn from(e: T) -> Self {
        Self {
            message: e.to_string(),
            extensions: Value::Null,
        }
    }
}

impl FieldError {
    /// Constructs a new [`FieldError`] with additional data.
    ///
    /// The `extensions` value is attached to the `"extensions"` key of the
    /// error object in the response; [`Value::Null`] attaches nothing.
    #[must_use]
    pub fn new<T: Display>(e: T, extensions: Value) -> Self {
        Self {
            message: e.to_string(),
            extensions,
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The additional error data, or [`Value::Null`].
    #[must_use]
    pub fn extensions(&self) -> &Value {
        &self.extensions
    }
}

/// The result of a single field resolution.
pub type FieldResult<T> = Result<T, FieldError>;

/// One segment of the path from the response root to a field.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// A response-map key.
    Field(String),

    /// A list index.
    Index(usize),
}

impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field(name) => serializer.serialize_str(name),
            Self::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// The chain of field names and list indices from the response root to the
/// field currently being resolved, shared between child frames.
#[derive(Debug)]
pub enum FieldPath {
    /// The operation root.
    Root,

    /// A field hop, keyed by response name.
    Field(String, Arc<FieldPath>),

    /// A list element hop.
    Index(usize, Arc<FieldPath>),
}

impl FieldPath {
    /// Flattens the chain into root-first segments.
    pub fn to_segments(&self) -> Vec<PathSegment> {
        let mut acc = Vec::new();
        self.collect(&mut acc);
        acc
    }

    fn collect(&self, acc: &mut Vec<PathSegment>) {
        match self {
            Self::Root => (),
            Self::Field(name, parent) => {
                parent.collect(acc);
                acc.push(PathSegment::Field(name.clone()));
            }
            Self::Index(idx, parent) => {
                parent.collect(acc);
                acc.push(PathSegment::Index(*idx));
            }
        }
    }
}

/// An error that occurred while executing a request, annotated with the
/// source position of the failing field and its response path.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionError {
    location: SourcePosition,
    path: Vec<PathSegment>,
    error: FieldError,
}

impl ExecutionError {
    #[doc(hidden)]
    pub fn new(location: SourcePosition, path: Vec<PathSegment>, error: FieldError) -> Self {
        Self {
            location,
            path,
            error,
        }
    }

    /// Constructs an execution error at the beginning of the request.
    pub fn at_origin(error: FieldError) -> Self {
        Self {
            location: SourcePosition::new_origin(),
            path: Vec::new(),
            error,
        }
    }

    /// The underlying field error.
    pub fn error(&self) -> &FieldError {
        &self.error
    }

    /// The source location in the request of the field that failed.
    pub fn location(&self) -> &SourcePosition {
        &self.location
    }

    /// The response path of the field that failed.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }
}

impl Serialize for ExecutionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Location {
            line: usize,
            column: usize,
        }

        let mut map = serializer.serialize_map(None)?;

        map.serialize_entry("message", self.error.message())?;
        map.serialize_entry(
            "locations",
            &[Location {
                line: self.location.line() + 1,
                column: self.location.column() + 1,
            }],
        )?;

        if !self.path.is_empty() {
            map.serialize_entry("path", &self.path)?;
        }

        if !self.error.extensions().is_null() {
            map.serialize_entry("extensions", self.error.extensions())?;
        }

        map.end()
    }
}

/// The `{data, errors}` outcome of resolving one operation or delivering one
/// subscription event.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionOutput {
    /// The resolved data tree.
    pub data: Value,

    /// The errors accumulated at the operation root.
    pub errors: Vec<ExecutionError>,
}

impl ExecutionOutput {
    /// An output carrying only errors, with null data.
    pub fn from_errors(errors: Vec<ExecutionError>) -> Self {
        Self {
            data: Value::Null,
            errors,
        }
    }
}

/// Application-supplied per-request state, shared with every resolver.
pub type SharedState = Option<Arc<dyn Any + Send + Sync>>;

/// Fragment definitions of the active document, keyed by name.
pub type FragmentMap = FnvHashMap<String, Arc<Spanning<Fragment>>>;

/// Everything a request's resolvers share, kept alive by reference counting
/// until the last resolver future completes.
pub struct OperationData {
    /// Application request state.
    pub state: SharedState,

    /// The coerced variable map.
    pub variables: Value,

    /// Operation-level directives, evaluated.
    pub directives: Value,

    /// The document's fragment definitions.
    pub fragments: FragmentMap,
}

impl fmt::Debug for OperationData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationData")
            .field("variables", &self.variables)
            .field("directives", &self.directives)
            .field("fragments", &self.fragments.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl OperationData {
    /// Downcasts the shared request state to a concrete type.
    pub fn state_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.state.as_ref()?.downcast_ref()
    }
}

/// The untyped inputs of a single field resolution.
pub struct ResolverParams {
    /// The coerced argument map; absent arguments with schema defaults are
    /// filled in, explicit `null`s stay.
    pub arguments: Value,

    /// Directives on the field, evaluated.
    pub field_directives: Value,

    /// The directive frames of the enclosing fragments.
    pub fragment_directives: FragmentDirectives,

    /// The field's sub-selection, retained for nested resolution.
    pub selection_set: Option<SelectionSet>,

    /// Shared request data.
    pub operation: Arc<OperationData>,

    /// The launch strategy inherited by child selections.
    pub launch: Launch,

    /// The schema the request executes against.
    pub schema: Arc<Schema>,

    pub(crate) field_path: Arc<FieldPath>,
    pub(crate) field_span: Span,
}

impl fmt::Debug for ResolverParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverParams")
            .field("arguments", &self.arguments)
            .field("field_directives", &self.field_directives)
            .field("field_path", &self.field_path)
            .finish_non_exhaustive()
    }
}

impl ResolverParams {
    /// Looks up a coerced argument by name.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.as_object_value()?.get_field_value(name)
    }

    /// The coerced variable map.
    pub fn variables(&self) -> &Value {
        &self.operation.variables
    }

    /// The source span of the field selection.
    pub fn field_span(&self) -> Span {
        self.field_span
    }

    /// The response path of the field, root first.
    pub fn field_path(&self) -> Vec<PathSegment> {
        self.field_path.to_segments()
    }
}

/// Locates the operation to execute, rejecting ambiguous requests.
pub(crate) fn get_operation<'a>(
    document: &'a Document,
    operation_name: Option<&str>,
) -> Result<&'a Spanning<Operation>, GraphQLError> {
    match operation_name {
        Some(name) => {
            let mut matching = document
                .operations()
                .filter(|op| op.item.name.as_ref().is_some_and(|n| n.item == name));

            let operation = matching.next().ok_or(GraphQLError::UnknownOperationName)?;
            if matching.next().is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }

            Ok(operation)
        }
        None => {
            let mut operations = document.operations();
            let operation = operations.next().ok_or(GraphQLError::NoOperationProvided)?;
            if operations.next().is_some() {
                return Err(GraphQLError::MultipleOperationsProvided);
            }

            Ok(operation)
        }
    }
}

/// Coerces the caller-supplied variable map against the operation's declared
/// variables, applying defaults where the caller omitted a value.
pub(crate) fn coerce_variable_values(
    schema: &Schema,
    operation: &Operation,
    supplied: &Value,
) -> Result<Value, GraphQLError> {
    let empty = value::Object::new();
    let supplied = match supplied {
        Value::Object(o) => o,
        Value::Null => &empty,
        _ => {
            return Err(vec![crate::validation::RuleError::new(
                "Variables must be supplied as an input object",
                &[SourcePosition::new_origin()],
            )]
            .into());
        }
    };

    let errors = validate_input_values(supplied, operation, schema);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let mut coerced = value::Object::new();

    if let Some(defs) = &operation.variable_definitions {
        for (name, def) in defs.item.iter() {
            if let Some(v) = supplied.get_field_value(&name.item) {
                coerced.add_field(
                    name.item.clone(),
                    coerce_value(schema, &def.var_type.item, v.clone()),
                );
            } else if let Some(default) = &def.default_value {
                let literal = input_value_to_value(&default.item, &Value::Null);
                coerced.add_field(
                    name.item.clone(),
                    coerce_value(schema, &def.var_type.item, literal),
                );
            }
        }
    }

    Ok(Value::Object(coerced))
}

/// Shapes an already-validated value to its declared type: single values are
/// promoted to lists, ints promote to floats, enum strings become enum tags,
/// and input-object defaults fill in.
fn coerce_value(schema: &Schema, ty: &Type, v: Value) -> Value {
    if v.is_null() {
        return v;
    }

    match ty {
        Type::NonNullNamed(..) | Type::NonNullList(..) => {
            coerce_value(schema, &ty.nullable(), v)
        }
        Type::List(inner) => match v {
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| coerce_value(schema, inner, item))
                    .collect(),
            ),
            single => Value::List(vec![coerce_value(schema, inner, single)]),
        },
        Type::Named(name) => {
            let Some(t) = schema.concrete_type_by_name(name) else {
                return v;
            };

            match (&t.kind, v) {
                (NamedTypeKind::Scalar { .. }, Value::Int(i)) if name == "Float" => {
                    Value::Float(i.into())
                }
                (NamedTypeKind::Enum { .. }, Value::String(s)) => Value::Enum(s),
                (NamedTypeKind::InputObject { input_fields }, Value::Object(o)) => {
                    let mut coerced = value::Object::with_capacity(o.field_count());
                    for (key, field_value) in o {
                        let field_type = input_fields
                            .iter()
                            .find(|f| f.name == key)
                            .map(|f| f.arg_type.clone());
                        match field_type {
                            Some(field_type) => coerced.add_field(
                                key,
                                coerce_value(schema, &field_type, field_value),
                            ),
                            None => coerced.add_field(key, field_value),
                        };
                    }
                    for input_field in input_fields {
                        if !coerced.contains_field(&input_field.name) {
                            if let Some(default) = &input_field.default_value {
                                coerced.add_field(
                                    input_field.name.clone(),
                                    input_value_to_value(default, &Value::Null),
                                );
                            }
                        }
                    }
                    Value::Object(coerced)
                }
                (_, v) => v,
            }
        }
    }
}

/// Everything shared down one selection recursion.
#[derive(Clone)]
struct SelectionContext {
    schema: Arc<Schema>,
    data: Arc<OperationData>,
    launch: Launch,
    path: Arc<FieldPath>,
}

/// Resolves an operation's root selection set against the root object.
///
/// Mutations force the deferred strategy and resolve their top-level fields
/// serially; everything else launches siblings through the caller's strategy
/// and joins them in source order.
pub(crate) async fn resolve_operation(
    schema: Arc<Schema>,
    root: Arc<Object>,
    operation_type: OperationType,
    selection_set: SelectionSet,
    data: Arc<OperationData>,
    launch: Launch,
) -> ExecutionOutput {
    let serial = operation_type == OperationType::Mutation;
    let launch = if serial { Launch::deferred() } else { launch };

    let ctx = SelectionContext {
        schema,
        data,
        launch,
        path: Arc::new(FieldPath::Root),
    };

    let (data, errors, _) = resolve_selection_set(
        root,
        selection_set,
        FragmentDirectives::default(),
        ctx,
        serial,
    )
    .await;

    ExecutionOutput { data, errors }
}

/// One field selection to resolve, after fragment expansion and directive
/// elision.
struct FieldTask {
    response_name: String,
    field_name: String,
    span: Span,
    arguments: Value,
    field_directives: Value,
    frame: FragmentDirectives,
    selection_set: Option<SelectionSet>,
    field_type: Option<Type>,
}

fn resolve_selection_set(
    object: Arc<Object>,
    selection_set: SelectionSet,
    frame: FragmentDirectives,
    ctx: SelectionContext,
    serial: bool,
) -> BoxFuture<'static, (Value, Vec<ExecutionError>, bool)> {
    Box::pin(async move {
        let mut errors = Vec::new();

        let mut tasks = Vec::new();
        {
            let parent_meta = ctx.schema.concrete_type_by_name(object.type_name());
            gather_fields(
                &object,
                parent_meta,
                &selection_set,
                &frame,
                &ctx,
                &mut tasks,
                &mut errors,
            );
        }

        let mut field_futures = Vec::with_capacity(tasks.len());
        let mut field_infos = Vec::with_capacity(tasks.len());

        for task in tasks {
            let field_path = Arc::new(FieldPath::Field(
                task.response_name.clone(),
                Arc::clone(&ctx.path),
            ));

            field_infos.push((task.response_name.clone(), task.span, Arc::clone(&field_path)));

            field_futures.push(resolve_field(&object, task, field_path, &ctx));
        }

        let outcomes = if serial {
            let mut outcomes = Vec::with_capacity(field_futures.len());
            for fut in field_futures {
                outcomes.push(fut.await);
            }
            outcomes
        } else {
            join_all(field_futures).await
        };

        let mut response = value::Object::with_capacity(outcomes.len());
        let mut poisoned = false;

        for ((response_name, span, field_path), outcome) in field_infos.into_iter().zip(outcomes)
        {
            let (field_value, field_errors, field_poisoned) = outcome;
            errors.extend(field_errors);

            if field_poisoned {
                poisoned = true;
                continue;
            }

            merge_field(
                &mut response,
                &response_name,
                field_value,
                span,
                &field_path,
                &mut errors,
            );
        }

        if poisoned {
            (Value::Null, errors, true)
        } else {
            (Value::Object(response), errors, false)
        }
    })
}

/// Launches one field's resolver and completes its value against the
/// declared type modifiers.
fn resolve_field(
    object: &Object,
    task: FieldTask,
    field_path: Arc<FieldPath>,
    ctx: &SelectionContext,
) -> BoxFuture<'static, (Value, Vec<ExecutionError>, bool)> {
    let field_ctx = SelectionContext {
        schema: Arc::clone(&ctx.schema),
        data: Arc::clone(&ctx.data),
        launch: ctx.launch.clone(),
        path: field_path,
    };

    // `__typename` is answered by the runtime from the object's primary type
    // name, unless the object chose to override it.
    if task.field_name == "__typename" && object.resolver("__typename").is_none() {
        let type_name = object.type_name().to_owned();
        return Box::pin(async move {
            (Value::String(type_name), Vec::new(), false)
        });
    }

    let Some(resolver) = object.resolver(&task.field_name) else {
        let error = FieldError::from(format!("Unknown field name: {}", task.field_name));
        let poisoned = task.field_type.as_ref().is_some_and(Type::is_non_null);
        let err = ExecutionError::new(
            task.span.start,
            field_ctx.path.to_segments(),
            error,
        );
        return Box::pin(async move { (Value::Null, vec![err], poisoned) });
    };

    let params = ResolverParams {
        arguments: task.arguments,
        field_directives: task.field_directives,
        fragment_directives: task.frame.clone(),
        selection_set: task.selection_set.clone(),
        operation: Arc::clone(&field_ctx.data),
        launch: field_ctx.launch.clone(),
        schema: Arc::clone(&field_ctx.schema),
        field_path: Arc::clone(&field_ctx.path),
        field_span: task.span,
    };

    let launched = field_ctx.launch.launch(resolver(params));

    let span = task.span;
    let field_type = task.field_type;
    let selection_set = task.selection_set;
    let frame = task.frame;

    Box::pin(async move {
        match launched.await {
            Ok(resolved) => {
                complete_value(
                    resolved,
                    field_type,
                    selection_set,
                    frame,
                    field_ctx,
                    span,
                )
                .await
            }
            Err(error) => {
                let poisoned = field_type.as_ref().is_some_and(Type::is_non_null);
                let err =
                    ExecutionError::new(span.start, field_ctx.path.to_segments(), error);
                (Value::Null, vec![err], poisoned)
            }
        }
    })
}

/// Adapts a resolver result to the declared type modifiers, resolving nested
/// objects and propagating nulls per the non-null rules.
///
/// The returned flag signals an unabsorbed non-null violation: a poisoned
/// child nulls the value at the first nullable layer, and propagates further
/// only while the enclosing positions are non-null.
fn complete_value(
    resolved: Resolved,
    field_type: Option<Type>,
    selection_set: Option<SelectionSet>,
    frame: FragmentDirectives,
    ctx: SelectionContext,
    span: Span,
) -> BoxFuture<'static, (Value, Vec<ExecutionError>, bool)> {
    Box::pin(async move {
        let non_null = field_type.as_ref().is_some_and(Type::is_non_null);
        let base = field_type.as_ref().map(Type::nullable);

        let (v, mut errors, from_below) = match base {
            Some(Type::List(inner)) => {
                let items = match resolved {
                    Resolved::Value(Value::Null) | Resolved::Object(None) => {
                        (Value::Null, Vec::new(), false)
                    }
                    Resolved::List(items) => {
                        complete_list(items, *inner, selection_set, frame, &ctx, span).await
                    }
                    Resolved::Value(Value::List(values)) => {
                        let items = values.into_iter().map(Resolved::Value).collect();
                        complete_list(items, *inner, selection_set, frame, &ctx, span).await
                    }
                    _ => {
                        let err = ExecutionError::new(
                            span.start,
                            ctx.path.to_segments(),
                            FieldError::from("Field resolved to a non-list value"),
                        );
                        (Value::Null, vec![err], false)
                    }
                };
                items
            }

            Some(Type::Named(..)) | None => match resolved {
                Resolved::Value(v) => (v, Vec::new(), false),
                Resolved::Object(None) => (Value::Null, Vec::new(), false),
                Resolved::Object(Some(obj)) => match selection_set {
                    Some(selection_set) => {
                        resolve_selection_set(obj, selection_set, frame, ctx.clone(), false).await
                    }
                    None => {
                        let err = ExecutionError::new(
                            span.start,
                            ctx.path.to_segments(),
                            FieldError::from("Composite field is missing a selection set"),
                        );
                        (Value::Null, vec![err], false)
                    }
                },
                Resolved::List(..) => {
                    let err = ExecutionError::new(
                        span.start,
                        ctx.path.to_segments(),
                        FieldError::from("Field resolved to a list in a non-list position"),
                    );
                    (Value::Null, vec![err], false)
                }
            },

            // The outer non-null was stripped above.
            Some(Type::NonNullNamed(..) | Type::NonNullList(..)) => {
                unreachable!("`Type::nullable()` strips the outermost non-null")
            }
        };

        if from_below {
            // The origin of the violation already carries the error.
            (Value::Null, errors, non_null)
        } else if non_null && v.is_null() {
            errors.push(ExecutionError::new(
                span.start,
                ctx.path.to_segments(),
                FieldError::from("Cannot return null for non-nullable field"),
            ));
            (Value::Null, errors, true)
        } else {
            (v, errors, false)
        }
    })
}

/// Completes every element of a list result against the element type.
///
/// A poisoned element nulls the list, which is reported upward as an
/// unabsorbed violation for the enclosing layer to settle.
async fn complete_list(
    items: Vec<Resolved>,
    element_type: Type,
    selection_set: Option<SelectionSet>,
    frame: FragmentDirectives,
    ctx: &SelectionContext,
    span: Span,
) -> (Value, Vec<ExecutionError>, bool) {
    let mut values = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    let mut nulled = false;

    for (idx, item) in items.into_iter().enumerate() {
        let item_ctx = SelectionContext {
            schema: Arc::clone(&ctx.schema),
            data: Arc::clone(&ctx.data),
            launch: ctx.launch.clone(),
            path: Arc::new(FieldPath::Index(idx, Arc::clone(&ctx.path))),
        };

        let (v, errs, poisoned) = complete_value(
            item,
            Some(element_type.clone()),
            selection_set.clone(),
            frame.clone(),
            item_ctx,
            span,
        )
        .await;

        errors.extend(errs);
        if poisoned {
            nulled = true;
        }
        values.push(v);
    }

    if nulled {
        (Value::Null, errors, true)
    } else {
        (Value::List(values), errors, false)
    }
}

/// Merges one field's data into the response map under its alias.
///
/// Sibling resolutions of one alias must agree: objects deep-merge, equal
/// values collapse, anything else is an ambiguous-field error.
fn merge_field(
    response: &mut value::Object,
    response_name: &str,
    field_value: Value,
    span: Span,
    field_path: &FieldPath,
    errors: &mut Vec<ExecutionError>,
) {
    match response.get_field_value(response_name) {
        None => {
            response.add_field(response_name.to_owned(), field_value);
        }
        Some(Value::Object(..)) if matches!(field_value, Value::Object(..)) => {
            // `add_field` deep-merges two objects under one key.
            response.add_field(response_name.to_owned(), field_value);
        }
        Some(existing) => {
            if *existing != field_value {
                errors.push(ExecutionError::new(
                    span.start,
                    field_path.to_segments(),
                    FieldError::from(format!(
                        "Ambiguous field \"{response_name}\": merged selections resolved to different values",
                    )),
                ));
            }
        }
    }
}

/// Expands a selection set into field tasks, in source order of first
/// occurrence.
fn gather_fields(
    object: &Object,
    parent_meta: Option<&NamedType>,
    selection_set: &[Selection],
    frame: &FragmentDirectives,
    ctx: &SelectionContext,
    tasks: &mut Vec<FieldTask>,
    errors: &mut Vec<ExecutionError>,
) {
    // Duplicate aliases within one literal selection set resolve once;
    // duplicates introduced through fragments merge afterwards.
    let mut seen: HashSet<&str> = HashSet::new();

    for selection in selection_set {
        match selection {
            Selection::Field(field) => {
                let response_name = field.item.response_name();
                if !seen.insert(response_name) {
                    continue;
                }

                let field_directives =
                    evaluate_directives(field.item.directives.as_ref(), &ctx.data.variables);
                if !should_include(&field_directives) {
                    continue;
                }

                let meta_field = parent_meta.and_then(|t| t.field_by_name(&field.item.name.item));

                tasks.push(FieldTask {
                    response_name: response_name.to_owned(),
                    field_name: field.item.name.item.clone(),
                    span: field.span,
                    arguments: collect_arguments(&field.item, meta_field, &ctx.data.variables),
                    field_directives,
                    frame: frame.clone(),
                    selection_set: field.item.selection_set.clone(),
                    field_type: meta_field.map(|f| f.field_type.clone()),
                });
            }

            Selection::FragmentSpread(spread) => {
                let spread_directives =
                    evaluate_directives(spread.item.directives.as_ref(), &ctx.data.variables);
                if !should_include(&spread_directives) {
                    continue;
                }

                let Some(fragment) = ctx.data.fragments.get(&spread.item.name.item) else {
                    // Validation guarantees the fragment exists; a miss here
                    // is an internal inconsistency surfaced as a field error.
                    errors.push(ExecutionError::new(
                        spread.span.start,
                        ctx.path.to_segments(),
                        FieldError::from(format!(
                            "Unknown fragment name: {}",
                            spread.item.name.item,
                        )),
                    ));
                    continue;
                };

                if !object.matches_type(&fragment.item.type_condition.item) {
                    continue;
                }

                let definition_directives =
                    evaluate_directives(fragment.item.directives.as_ref(), &ctx.data.variables);

                let inner_frame = FragmentDirectives {
                    fragment_definition: merge_directives(
                        &definition_directives,
                        &frame.fragment_definition,
                    ),
                    fragment_spread: merge_directives(&spread_directives, &frame.fragment_spread),
                    inline_fragment: frame.inline_fragment.clone(),
                };

                gather_fields(
                    object,
                    parent_meta,
                    &fragment.item.selection_set,
                    &inner_frame,
                    ctx,
                    tasks,
                    errors,
                );
            }

            Selection::InlineFragment(inline) => {
                let inline_directives =
                    evaluate_directives(inline.item.directives.as_ref(), &ctx.data.variables);
                if !should_include(&inline_directives) {
                    continue;
                }

                if let Some(type_condition) = &inline.item.type_condition {
                    if !object.matches_type(&type_condition.item) {
                        continue;
                    }
                }

                let inner_frame = FragmentDirectives {
                    fragment_definition: frame.fragment_definition.clone(),
                    fragment_spread: frame.fragment_spread.clone(),
                    inline_fragment: merge_directives(&inline_directives, &frame.inline_fragment),
                };

                gather_fields(
                    object,
                    parent_meta,
                    &inline.item.selection_set,
                    &inner_frame,
                    ctx,
                    tasks,
                    errors,
                );
            }
        }
    }
}

/// Builds the coerced argument map of one field selection.
///
/// Explicit `null`s stay in the map; absent arguments with schema defaults
/// are filled in; absent arguments without defaults stay absent.
pub(crate) fn collect_arguments(
    field: &Field,
    meta_field: Option<&crate::schema::Field>,
    variables: &Value,
) -> Value {
    let mut args = value::Object::new();

    if let Some(arguments) = &field.arguments {
        for (name, literal) in arguments.item.iter() {
            args.add_field(
                name.item.clone(),
                input_value_to_value(&literal.item, variables),
            );
        }
    }

    if let Some(meta_field) = meta_field {
        for meta_arg in &meta_field.arguments {
            if !args.contains_field(&meta_arg.name) {
                if let Some(default) = &meta_arg.default_value {
                    args.add_field(
                        meta_arg.name.clone(),
                        input_value_to_value(default, &Value::Null),
                    );
                }
            }
        }
    }

    Value::Object(args)
}

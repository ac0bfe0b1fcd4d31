//! The request facade: validation, execution and subscription bookkeeping
//! over a schema and its per-operation root objects.

use std::sync::{Arc, Mutex};

use fnv::FnvHashMap;

use crate::{
    GraphQLError,
    ast::{Document, Operation, OperationType},
    executor::{
        ExecutionOutput, OperationData, SharedState, coerce_variable_values,
        directives::evaluate_directives, get_operation, resolve_operation,
    },
    parser::Spanning,
    schema::Schema,
    subscriptions::{
        SubscriptionCallback, SubscriptionData, SubscriptionFilter, SubscriptionKey,
        SubscriptionManager, find_root_field,
    },
    types::{Launch, Object},
    validation::{RuleError, validate},
    value::Value,
};

/// Inputs of one request resolution.
pub struct ResolveParams {
    /// Application request state shared with every resolver.
    pub state: SharedState,

    /// The parsed request document.
    pub document: Arc<Document>,

    /// The operation to execute; empty selects the sole operation.
    pub operation_name: Option<String>,

    /// Caller-supplied variable values, as a map value.
    pub variables: Value,

    /// The strategy resolver futures are launched with.
    pub launch: Launch,
}

/// Inputs of one subscription registration.
pub struct SubscribeParams {
    /// Application request state shared with every resolver.
    pub state: SharedState,

    /// The parsed subscription document, retained by the registration.
    pub document: Arc<Document>,

    /// The operation to register; empty selects the sole operation.
    pub operation_name: Option<String>,

    /// Caller-supplied variable values, as a map value.
    pub variables: Value,
}

/// A service entry point: a schema plus the root object of each operation
/// type.
///
/// The schema and root resolver tables are immutable once constructed; the
/// subscription registry is the only mutable state and lives behind an
/// internal lock.
pub struct Request {
    schema: Arc<Schema>,
    operations: FnvHashMap<OperationType, Arc<Object>>,
    subscriptions: Mutex<SubscriptionManager>,
}

impl Request {
    /// Builds a request facade from a schema and root objects.
    ///
    /// When introspection is enabled on the schema, the `__schema` and
    /// `__type(name:)` entry points are grafted onto the query root.
    pub fn new(
        schema: Arc<Schema>,
        mut query: Object,
        mutation: Option<Object>,
        subscription: Option<Object>,
    ) -> Self {
        if schema.introspection_enabled() {
            crate::introspection::graft_entry_points(&mut query, &schema);
        }

        let mut operations = FnvHashMap::default();
        operations.insert(OperationType::Query, Arc::new(query));
        if let Some(mutation) = mutation {
            operations.insert(OperationType::Mutation, Arc::new(mutation));
        }
        if let Some(subscription) = subscription {
            operations.insert(OperationType::Subscription, Arc::new(subscription));
        }

        Self {
            schema,
            operations,
            subscriptions: Mutex::new(SubscriptionManager::default()),
        }
    }

    /// The schema requests execute against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Validates an executable document against the schema.
    pub fn validate(&self, document: &Document) -> Vec<RuleError> {
        validate(&self.schema, document)
    }

    /// Locates the target operation, rejecting documents with duplicate or
    /// ambiguous operation names.
    pub fn find_operation_definition<'a>(
        &self,
        document: &'a Document,
        operation_name: Option<&str>,
    ) -> Result<&'a Spanning<Operation>, GraphQLError> {
        get_operation(document, operation_name)
    }

    /// Validates and executes one operation, producing its `{data, errors}`
    /// outcome.
    ///
    /// Top-level mutation fields execute serially regardless of the chosen
    /// launch strategy.
    pub async fn resolve(&self, params: ResolveParams) -> Result<ExecutionOutput, GraphQLError> {
        let errors = self.validate(&params.document);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let operation = get_operation(&params.document, params.operation_name.as_deref())?;
        let operation_type = operation.item.operation_type;

        let root = self
            .operations
            .get(&operation_type)
            .cloned()
            .ok_or(GraphQLError::UnsupportedOperation(operation_type))?;

        let variables = coerce_variable_values(&self.schema, &operation.item, &params.variables)?;
        let directives = evaluate_directives(operation.item.directives.as_ref(), &variables);

        let data = Arc::new(OperationData {
            state: params.state,
            variables,
            directives,
            fragments: params
                .document
                .fragments()
                .map(|f| (f.item.name.item.clone(), Arc::clone(f)))
                .collect(),
        });

        Ok(resolve_operation(
            Arc::clone(&self.schema),
            root,
            operation_type,
            Arc::clone(&operation.item.selection_set),
            data,
            params.launch,
        )
        .await)
    }

    /// Blocking convenience wrapper around [`Request::resolve`].
    pub fn resolve_sync(&self, params: ResolveParams) -> Result<ExecutionOutput, GraphQLError> {
        futures::executor::block_on(self.resolve(params))
    }

    /// Validates a subscription document and records a registration for its
    /// single root field, capturing the coerced argument map for filtering.
    pub fn subscribe(
        &self,
        params: SubscribeParams,
        callback: SubscriptionCallback,
    ) -> Result<SubscriptionKey, GraphQLError> {
        let errors = self.validate(&params.document);
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let operation = get_operation(&params.document, params.operation_name.as_deref())?;
        if operation.item.operation_type != OperationType::Subscription {
            return Err(GraphQLError::NotSubscription);
        }

        let variables = coerce_variable_values(&self.schema, &operation.item, &params.variables)?;
        let directives = evaluate_directives(operation.item.directives.as_ref(), &variables);

        let data = Arc::new(OperationData {
            state: params.state,
            variables,
            directives,
            fragments: params
                .document
                .fragments()
                .map(|f| (f.item.name.item.clone(), Arc::clone(f)))
                .collect(),
        });

        let (root_field, _) = find_root_field(
            &operation.item.selection_set,
            &params.document,
            &self.schema,
        )
        .ok_or(GraphQLError::UnsupportedOperation(
            OperationType::Subscription,
        ))?;

        let meta_field = self
            .schema
            .subscription_type()
            .and_then(|t| t.field_by_name(&root_field.item.name.item));

        let registration = SubscriptionData {
            field: root_field.item.name.item.clone(),
            arguments: crate::executor::collect_arguments(
                &root_field.item,
                meta_field,
                &data.variables,
            ),
            field_directives: evaluate_directives(
                root_field.item.directives.as_ref(),
                &data.variables,
            ),
            document: Arc::clone(&params.document),
            selection_set: Arc::clone(&operation.item.selection_set),
            data,
            callback,
        };

        Ok(self
            .subscriptions
            .lock()
            .expect("subscription registry lock poisoned")
            .add(registration))
    }

    /// Removes a registration; returns whether the key was known.
    pub fn unsubscribe(&self, key: SubscriptionKey) -> bool {
        self.subscriptions
            .lock()
            .expect("subscription registry lock poisoned")
            .remove(key)
    }

    /// The number of live registrations.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .lock()
            .expect("subscription registry lock poisoned")
            .len()
    }

    /// Delivers an event to every registration on `field_name` whose
    /// recorded arguments pass `filter`, resolving each stored selection
    /// against `subject` (or the registered subscription root when no
    /// subject is injected) and fanning the outcome out to the callbacks.
    ///
    /// Returns the number of registrations notified. The snapshot of
    /// matching registrations is taken under the registry lock; resolution
    /// happens outside it.
    pub async fn deliver(
        &self,
        field_name: &str,
        filter: SubscriptionFilter<'_>,
        subject: Option<Arc<Object>>,
        launch: Launch,
    ) -> usize {
        let snapshot = self
            .subscriptions
            .lock()
            .expect("subscription registry lock poisoned")
            .snapshot(field_name);

        let mut delivered = 0;

        for registration in snapshot {
            if !filter.applies(&registration.arguments) {
                continue;
            }

            let Some(root) = subject
                .clone()
                .or_else(|| self.operations.get(&OperationType::Subscription).cloned())
            else {
                continue;
            };

            let output = resolve_operation(
                Arc::clone(&self.schema),
                root,
                OperationType::Subscription,
                Arc::clone(&registration.selection_set),
                Arc::clone(&registration.data),
                launch.clone(),
            )
            .await;

            (registration.callback)(output);
            delivered += 1;
        }

        delivered
    }

    /// [`Request::deliver`] without a filter: every registration on the
    /// field matches.
    pub async fn deliver_all(&self, field_name: &str, subject: Option<Arc<Object>>) -> usize {
        self.deliver(field_name, SubscriptionFilter::Any, subject, Launch::deferred())
            .await
    }

    /// [`Request::deliver`] with an exact-match argument map.
    pub async fn deliver_matching(
        &self,
        field_name: &str,
        arguments: &Value,
        subject: Option<Arc<Object>>,
    ) -> usize {
        self.deliver(
            field_name,
            SubscriptionFilter::ExactMatch(arguments),
            subject,
            Launch::deferred(),
        )
        .await
    }
}

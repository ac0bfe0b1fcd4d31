//! Subscription registrations and event fan-out.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

use fnv::FnvHashMap;

use crate::{
    ast::{Document, Selection, SelectionSet},
    executor::{ExecutionOutput, OperationData},
    parser::Span,
    schema::Schema,
    value::Value,
};

/// Identifies one registered subscription; monotonically increasing.
pub type SubscriptionKey = usize;

/// Invoked with the resolved payload every time an event is delivered to a
/// registration.
pub type SubscriptionCallback = Box<dyn Fn(ExecutionOutput) + Send + Sync>;

/// How `deliver` decides which registrations receive an event.
///
/// A registration passes iff every argument recorded at subscribe time
/// passes the filter.
pub enum SubscriptionFilter<'a> {
    /// Every registration on the field matches.
    Any,

    /// Every recorded argument must be present and equal in the given map.
    ExactMatch(&'a Value),

    /// A predicate applied to each recorded `(name, value)` pair.
    Callback(&'a dyn Fn(&str, &Value) -> bool),
}

impl SubscriptionFilter<'_> {
    pub(crate) fn applies(&self, recorded_arguments: &Value) -> bool {
        let Some(arguments) = recorded_arguments.as_object_value() else {
            return true;
        };

        arguments.iter().all(|(name, value)| match self {
            Self::Any => true,
            Self::ExactMatch(expected) => expected
                .as_object_value()
                .and_then(|m| m.get_field_value(name))
                .is_some_and(|expected| expected == value),
            Self::Callback(apply) => apply(name, value),
        })
    }
}

/// Everything retained for one subscription, enough to re-resolve the stored
/// selection when an event arrives.
pub struct SubscriptionData {
    /// The single root field subscribed to.
    pub field: String,

    /// The root field's coerced argument map, recorded for filtering.
    pub arguments: Value,

    /// Directives on the root field, evaluated.
    pub field_directives: Value,

    pub(crate) document: Arc<Document>,
    pub(crate) selection_set: SelectionSet,
    pub(crate) data: Arc<OperationData>,
    pub(crate) callback: SubscriptionCallback,
}

impl SubscriptionData {
    /// The parsed query retained for this registration, so events can
    /// re-resolve it.
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }
}

impl fmt::Debug for SubscriptionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionData")
            .field("field", &self.field)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

/// Owns registrations by key and an inverted field-name index.
#[derive(Debug, Default)]
pub(crate) struct SubscriptionManager {
    subscriptions: BTreeMap<SubscriptionKey, Arc<SubscriptionData>>,
    listeners: FnvHashMap<String, BTreeSet<SubscriptionKey>>,
    next_key: SubscriptionKey,
}

impl SubscriptionManager {
    pub(crate) fn add(&mut self, registration: SubscriptionData) -> SubscriptionKey {
        let key = self.next_key;
        self.next_key += 1;

        self.listeners
            .entry(registration.field.clone())
            .or_default()
            .insert(key);
        self.subscriptions.insert(key, Arc::new(registration));

        key
    }

    pub(crate) fn remove(&mut self, key: SubscriptionKey) -> bool {
        let Some(registration) = self.subscriptions.remove(&key) else {
            return false;
        };

        if let Some(keys) = self.listeners.get_mut(&registration.field) {
            keys.remove(&key);
            if keys.is_empty() {
                self.listeners.remove(&registration.field);
            }
        }

        // The key allocator restarts once the last registration is gone.
        if self.subscriptions.is_empty() {
            self.next_key = 0;
        }

        true
    }

    /// A snapshot of the registrations listening on a field, in key order.
    pub(crate) fn snapshot(&self, field: &str) -> Vec<Arc<SubscriptionData>> {
        self.listeners
            .get(field)
            .map(|keys| {
                keys.iter()
                    .filter_map(|key| self.subscriptions.get(key).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.len()
    }
}

/// Finds the single root field of a validated subscription operation,
/// expanding fragment spreads against the schema's subscription root type.
pub(crate) fn find_root_field<'a>(
    selection_set: &'a [Selection],
    document: &'a Document,
    schema: &Schema,
) -> Option<(&'a crate::parser::Spanning<crate::ast::Field>, Span)> {
    let root_type = schema.subscription_type()?;

    for selection in selection_set {
        match selection {
            Selection::Field(field) => return Some((field, field.span)),
            Selection::InlineFragment(inline) => {
                let applies = inline
                    .item
                    .type_condition
                    .as_ref()
                    .is_none_or(|cond| schema.is_named_subtype(&root_type.name, &cond.item));
                if applies {
                    if let Some(found) =
                        find_root_field(&inline.item.selection_set, document, schema)
                    {
                        return Some(found);
                    }
                }
            }
            Selection::FragmentSpread(spread) => {
                let Some(fragment) = document.fragment_by_name(&spread.item.name.item) else {
                    continue;
                };
                if schema.is_named_subtype(&root_type.name, &fragment.item.type_condition.item) {
                    if let Some(found) =
                        find_root_field(&fragment.item.selection_set, document, schema)
                    {
                        return Some(found);
                    }
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{SubscriptionFilter, SubscriptionManager};
    use crate::graphql_value;

    fn dummy_registration(field: &str, arguments: crate::value::Value) -> super::SubscriptionData {
        use std::sync::Arc;

        super::SubscriptionData {
            field: field.into(),
            arguments,
            field_directives: graphql_value!({}),
            document: Arc::new(crate::ast::Document {
                definitions: vec![],
            }),
            selection_set: Arc::new(vec![]),
            data: Arc::new(crate::executor::OperationData {
                state: None,
                variables: graphql_value!({}),
                directives: graphql_value!({}),
                fragments: Default::default(),
            }),
            callback: Box::new(|_| ()),
        }
    }

    #[test]
    fn keys_are_monotonic_and_reset_when_empty() {
        let mut manager = SubscriptionManager::default();

        let a = manager.add(dummy_registration("a", graphql_value!({})));
        let b = manager.add(dummy_registration("b", graphql_value!({})));
        assert_eq!((a, b), (0, 1));

        assert!(manager.remove(a));
        let c = manager.add(dummy_registration("c", graphql_value!({})));
        assert_eq!(c, 2);

        assert!(manager.remove(b));
        assert!(manager.remove(c));
        assert!(!manager.remove(c));

        // Empty again: the allocator restarts.
        let d = manager.add(dummy_registration("d", graphql_value!({})));
        assert_eq!(d, 0);
    }

    #[test]
    fn snapshot_is_indexed_by_field_name() {
        let mut manager = SubscriptionManager::default();
        manager.add(dummy_registration("a", graphql_value!({})));
        manager.add(dummy_registration("b", graphql_value!({})));
        manager.add(dummy_registration("a", graphql_value!({})));

        assert_eq!(manager.snapshot("a").len(), 2);
        assert_eq!(manager.snapshot("b").len(), 1);
        assert_eq!(manager.snapshot("c").len(), 0);
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn exact_match_filter() {
        let recorded = graphql_value!({ "id": 5, "kind": "urgent" });

        assert!(SubscriptionFilter::Any.applies(&recorded));

        let exact = graphql_value!({ "id": 5, "kind": "urgent", "extra": true });
        assert!(SubscriptionFilter::ExactMatch(&exact).applies(&recorded));

        let wrong = graphql_value!({ "id": 6, "kind": "urgent" });
        assert!(!SubscriptionFilter::ExactMatch(&wrong).applies(&recorded));

        let missing = graphql_value!({ "id": 5 });
        assert!(!SubscriptionFilter::ExactMatch(&missing).applies(&recorded));
    }

    #[test]
    fn callback_filter_must_pass_every_argument() {
        let recorded = graphql_value!({ "id": 5, "kind": "urgent" });

        let pass = |_: &str, _: &crate::value::Value| true;
        assert!(SubscriptionFilter::Callback(&pass).applies(&recorded));

        let only_id = |name: &str, _: &crate::value::Value| name == "id";
        assert!(!SubscriptionFilter::Callback(&only_id).applies(&recorded));
    }
}

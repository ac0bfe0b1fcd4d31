//! Directive evaluation and the per-frame directive state carried through
//! selection traversal.

use crate::{
    ast::{Directives, InputValue},
    value::{Object, Value},
};

/// The directive maps in scope for one selection frame.
///
/// A new frame is pushed when entering a fragment spread or inline fragment;
/// on a name collision the entry closer to the selection wins and the outer
/// entry is dropped.
#[derive(Clone, Debug)]
pub struct FragmentDirectives {
    /// Directives on the fragment definition.
    pub fragment_definition: Value,

    /// Directives on the spread usage site.
    pub fragment_spread: Value,

    /// Directives on the enclosing inline fragments.
    pub inline_fragment: Value,
}

impl Default for FragmentDirectives {
    fn default() -> Self {
        Self {
            fragment_definition: Value::Object(Object::new()),
            fragment_spread: Value::Object(Object::new()),
            inline_fragment: Value::Object(Object::new()),
        }
    }
}

/// Evaluates a literal into a value, substituting variables from the coerced
/// variable map.
pub(crate) fn input_value_to_value(literal: &InputValue, variables: &Value) -> Value {
    match literal {
        InputValue::Null => Value::Null,
        InputValue::Int(i) => Value::Int(*i),
        InputValue::Float(f) => Value::Float(*f),
        InputValue::String(s) => Value::String(s.clone()),
        InputValue::Boolean(b) => Value::Bool(*b),
        InputValue::Enum(e) => Value::Enum(e.clone()),
        InputValue::Variable(name) => variables
            .as_object_value()
            .and_then(|vars| vars.get_field_value(name))
            .cloned()
            .unwrap_or(Value::Null),
        InputValue::List(items) => Value::List(
            items
                .iter()
                .map(|item| input_value_to_value(&item.item, variables))
                .collect(),
        ),
        InputValue::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(name, value)| {
                    (
                        name.item.clone(),
                        input_value_to_value(&value.item, variables),
                    )
                })
                .collect(),
        ),
    }
}

/// Evaluates a directive list into a `name -> arguments` map.
pub(crate) fn evaluate_directives(directives: Option<&Directives>, variables: &Value) -> Value {
    let Some(directives) = directives else {
        return Value::Object(Object::new());
    };

    let mut map = Object::with_capacity(directives.len());

    for directive in directives {
        let mut args = Object::new();
        if let Some(arguments) = &directive.item.arguments {
            for (name, value) in arguments.item.iter() {
                args.add_field(name.item.clone(), input_value_to_value(&value.item, variables));
            }
        }
        map.add_field(directive.item.name.item.clone(), Value::Object(args));
    }

    Value::Object(map)
}

/// Merges `outer` entries into `inner`; `inner` wins on name collision.
pub(crate) fn merge_directives(inner: &Value, outer: &Value) -> Value {
    let mut merged = inner.as_object_value().cloned().unwrap_or_default();

    if let Some(outer) = outer.as_object_value() {
        for (name, args) in outer.iter() {
            if !merged.contains_field(name) {
                merged.add_field(name.clone(), args.clone());
            }
        }
    }

    Value::Object(merged)
}

/// Applies `@skip`/`@include` from an evaluated directive map; `@skip` wins
/// when both apply.
pub(crate) fn should_include(directive_map: &Value) -> bool {
    let Some(map) = directive_map.as_object_value() else {
        return true;
    };

    let condition = |directive: &str| {
        map.get_field_value(directive)
            .and_then(Value::as_object_value)
            .and_then(|args| args.get_field_value("if"))
            .and_then(Value::as_bool_value)
    };

    if condition("skip") == Some(true) {
        return false;
    }

    condition("include") != Some(false)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        evaluate_directives, input_value_to_value, merge_directives, should_include,
    };
    use crate::{ast::InputValue, graphql_value, parser::parse_executable, value::Value};

    fn field_directives(query: &str, variables: Value) -> Value {
        let doc = parse_executable(query).unwrap();
        let op = doc.operations().next().unwrap();
        let crate::ast::Selection::Field(field) = &op.item.selection_set[0] else {
            panic!("expected a field");
        };
        evaluate_directives(field.item.directives.as_ref(), &variables)
    }

    #[test]
    fn literal_substitution() {
        let vars = graphql_value!({ "answer": 42 });
        assert_eq!(
            input_value_to_value(&InputValue::Variable("answer".into()), &vars),
            Value::Int(42),
        );
        assert_eq!(
            input_value_to_value(&InputValue::Variable("missing".into()), &vars),
            Value::Null,
        );
    }

    #[test]
    fn directive_arguments_are_evaluated() {
        let dirs = field_directives(
            "{ field @include(if: $cond) }",
            graphql_value!({ "cond": true }),
        );
        assert_eq!(dirs, graphql_value!({ "include": { "if": true } }));
    }

    #[test]
    fn skip_include_interaction() {
        assert!(should_include(&graphql_value!({})));
        assert!(!should_include(&graphql_value!({ "skip": { "if": true } })));
        assert!(should_include(&graphql_value!({ "skip": { "if": false } })));
        assert!(!should_include(&graphql_value!({ "include": { "if": false } })));
        // `@skip` wins when both are present and disagree.
        assert!(!should_include(&graphql_value!({
            "skip": { "if": true },
            "include": { "if": true },
        })));
        assert!(should_include(&graphql_value!({
            "skip": { "if": false },
            "include": { "if": true },
        })));
    }

    #[test]
    fn inner_wins_on_merge() {
        let merged = merge_directives(
            &graphql_value!({ "tag": { "value": "inner" } }),
            &graphql_value!({ "tag": { "value": "outer" }, "extra": {} }),
        );
        assert_eq!(
            merged,
            graphql_value!({ "tag": { "value": "inner" }, "extra": {} }),
        );
    }
}

use std::collections::HashSet;

use crate::{
    ast::{InputValue, Type},
    schema::{NamedTypeKind, Schema},
};

/// Whether a value literal is shape-compatible with the declared input type.
///
/// Variables are always accepted here; their own typing is checked by the
/// variables-in-allowed-position rule and at coercion time.
pub fn is_valid_literal_value(schema: &Schema, arg_type: &Type, arg_value: &InputValue) -> bool {
    match arg_type {
        Type::NonNullNamed(..) | Type::NonNullList(..) => {
            if arg_value.is_null() {
                false
            } else {
                is_valid_literal_value(schema, &arg_type.nullable(), arg_value)
            }
        }
        Type::List(inner) => match arg_value {
            InputValue::List(items) => items
                .iter()
                .all(|i| is_valid_literal_value(schema, inner, &i.item)),
            // A single value is promoted to a one-element list.
            v => is_valid_literal_value(schema, inner, v),
        },
        Type::Named(name) => {
            if matches!(arg_value, InputValue::Null | InputValue::Variable(..)) {
                return true;
            }

            let Some(t) = schema.concrete_type_by_name(name) else {
                return false;
            };

            match &t.kind {
                NamedTypeKind::Scalar { .. } => match (t.name.as_str(), arg_value) {
                    ("Int", InputValue::Int(..)) => true,
                    ("Float", InputValue::Int(..) | InputValue::Float(..)) => true,
                    ("String", InputValue::String(..)) => true,
                    ("Boolean", InputValue::Boolean(..)) => true,
                    ("ID", InputValue::String(..) | InputValue::Int(..)) => true,
                    ("Int" | "Float" | "String" | "Boolean" | "ID", _) => false,
                    // Custom scalars accept any non-composite literal.
                    (
                        _,
                        InputValue::Int(..)
                        | InputValue::Float(..)
                        | InputValue::String(..)
                        | InputValue::Boolean(..),
                    ) => true,
                    _ => false,
                },
                // A string can be coerced into an enum at runtime, but it is
                // not valid as an enum *literal*.
                NamedTypeKind::Enum { .. } => arg_value
                    .as_enum_value()
                    .is_some_and(|v| t.enum_value_by_name(v).is_some()),
                NamedTypeKind::InputObject { input_fields } => {
                    let InputValue::Object(obj) = arg_value else {
                        return false;
                    };

                    let mut remaining_required_fields = input_fields
                        .iter()
                        .filter_map(|f| f.is_required().then_some(f.name.as_str()))
                        .collect::<HashSet<_>>();

                    let all_types_ok = obj.iter().all(|(key, value)| {
                        remaining_required_fields.remove(key.item.as_str());
                        input_fields
                            .iter()
                            .find(|f| f.name == key.item)
                            .is_some_and(|f| {
                                is_valid_literal_value(schema, &f.arg_type, &value.item)
                            })
                    });

                    all_types_ok && remaining_required_fields.is_empty()
                }
                // Composite output types never validate as input literals.
                _ => false,
            }
        }
    }
}

//! Validation of caller-supplied variable values against the declared
//! variable types of an operation.

use std::{collections::HashSet, fmt};

use crate::{
    ast::{Operation, Type, VariableDefinitions},
    parser::SourcePosition,
    schema::{Argument, NamedType, NamedTypeKind, Schema},
    validation::RuleError,
    value::{Object, Value},
};

#[derive(Debug)]
enum Path<'a> {
    Root,
    ArrayElement(usize, &'a Path<'a>),
    ObjectField(&'a str, &'a Path<'a>),
}

/// Checks every supplied variable value against the operation's declared
/// variable types, honoring nullability and wrappers.
///
/// Values for undeclared variables are ignored; defaults are applied later
/// during coercion.
pub fn validate_input_values(
    values: &Object,
    operation: &Operation,
    schema: &Schema,
) -> Vec<RuleError> {
    let mut errs = vec![];

    if let Some(vars) = &operation.variable_definitions {
        validate_var_defs(values, &vars.item, schema, &mut errs);
    }

    errs.sort();
    errs
}

fn validate_var_defs(
    values: &Object,
    var_defs: &VariableDefinitions,
    schema: &Schema,
    errors: &mut Vec<RuleError>,
) {
    for (name, def) in var_defs.iter() {
        let raw_type_name = def.var_type.item.innermost_name();
        match schema.concrete_type_by_name(raw_type_name) {
            Some(t) if t.is_input() => {
                let provided = values.get_field_value(&name.item);

                if def.var_type.item.is_non_null()
                    && is_absent_or_null(provided)
                    && def.default_value.is_none()
                {
                    errors.push(RuleError::new(
                        &format!(
                            r#"Variable "${}" of required type "{}" was not provided"#,
                            name.item, def.var_type.item,
                        ),
                        &[name.span.start],
                    ));
                } else if let Some(v) = provided {
                    unify_value(
                        &name.item,
                        &name.span.start,
                        v,
                        &def.var_type.item,
                        schema,
                        errors,
                        &Path::Root,
                    );
                }
            }
            _ => errors.push(RuleError::new(
                &format!(
                    r#"Variable "${}" expected value of type "{}" which cannot be used as an input type"#,
                    name.item, def.var_type.item,
                ),
                &[name.span.start],
            )),
        }
    }
}

fn unify_value(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &Value,
    expected: &Type,
    schema: &Schema,
    errors: &mut Vec<RuleError>,
    path: &Path<'_>,
) {
    match expected {
        Type::NonNullNamed(..) | Type::NonNullList(..) => {
            if value.is_null() {
                push_unification_error(
                    errors,
                    var_name,
                    var_pos,
                    path,
                    &format!(r#"Expected "{expected}", found null"#),
                );
            } else {
                unify_value(
                    var_name,
                    var_pos,
                    value,
                    &expected.nullable(),
                    schema,
                    errors,
                    path,
                );
            }
        }

        Type::List(inner) => {
            if value.is_null() {
                return;
            }

            match value.as_list_value() {
                Some(l) => {
                    for (i, v) in l.iter().enumerate() {
                        unify_value(
                            var_name,
                            var_pos,
                            v,
                            inner,
                            schema,
                            errors,
                            &Path::ArrayElement(i, path),
                        );
                    }
                }
                // A single value is promoted to a one-element list.
                None => unify_value(var_name, var_pos, value, inner, schema, errors, path),
            }
        }

        Type::Named(name) => {
            if value.is_null() {
                return;
            }

            let t = schema
                .concrete_type_by_name(name)
                .expect("input type was checked during validation");
            match &t.kind {
                NamedTypeKind::Scalar { .. } => {
                    unify_scalar(var_name, var_pos, value, t, errors, path);
                }
                NamedTypeKind::Enum { .. } => {
                    unify_enum(var_name, var_pos, value, t, errors, path);
                }
                NamedTypeKind::InputObject { input_fields } => {
                    unify_input_object(
                        var_name,
                        var_pos,
                        value,
                        t,
                        input_fields,
                        schema,
                        errors,
                        path,
                    );
                }
                _ => unreachable!("non-input type slipped through `is_input()`"),
            }
        }
    }
}

fn unify_scalar(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &Value,
    meta: &NamedType,
    errors: &mut Vec<RuleError>,
    path: &Path<'_>,
) {
    let ok = match meta.name.as_str() {
        "Int" => matches!(value, Value::Int(..)),
        "Float" => matches!(value, Value::Int(..) | Value::Float(..)),
        "String" => matches!(value, Value::String(..)),
        "Boolean" => matches!(value, Value::Bool(..)),
        "ID" => matches!(value, Value::String(..) | Value::Int(..) | Value::Id(..)),
        // Custom scalars pass through opaquely as long as they aren't
        // composite.
        _ => !matches!(value, Value::List(..) | Value::Object(..)),
    };

    if !ok {
        let found = match value {
            Value::List(..) => ", found list".into(),
            Value::Object(..) => ", found object".into(),
            _ => String::new(),
        };
        push_unification_error(
            errors,
            var_name,
            var_pos,
            path,
            &format!(r#"Expected "{}"{found}"#, meta.name),
        );
    }
}

fn unify_enum(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &Value,
    meta: &NamedType,
    errors: &mut Vec<RuleError>,
    path: &Path<'_>,
) {
    match value {
        Value::String(name) | Value::Enum(name) => {
            if meta.enum_value_by_name(name).is_none() {
                push_unification_error(
                    errors,
                    var_name,
                    var_pos,
                    path,
                    &format!(r#"Invalid value for enum "{}""#, meta.name),
                );
            }
        }
        _ => push_unification_error(
            errors,
            var_name,
            var_pos,
            path,
            &format!(r#"Expected "{}", found not a string or enum"#, meta.name),
        ),
    }
}

#[expect(clippy::too_many_arguments, reason = "mirrors `unify_value`")]
fn unify_input_object(
    var_name: &str,
    var_pos: &SourcePosition,
    value: &Value,
    meta: &NamedType,
    input_fields: &[Argument],
    schema: &Schema,
    errors: &mut Vec<RuleError>,
    path: &Path<'_>,
) {
    let Some(obj) = value.as_object_value() else {
        push_unification_error(
            errors,
            var_name,
            var_pos,
            path,
            &format!(r#"Expected "{}", found not an object"#, meta.name),
        );
        return;
    };

    let mut keys: HashSet<&str> = obj.iter().map(|(k, _)| k.as_str()).collect();

    for input_field in input_fields {
        let mut has_value = false;
        keys.remove(input_field.name.as_str());

        if let Some(value) = obj.get_field_value(&input_field.name) {
            if !value.is_null() {
                has_value = true;

                unify_value(
                    var_name,
                    var_pos,
                    value,
                    &input_field.arg_type,
                    schema,
                    errors,
                    &Path::ObjectField(&input_field.name, path),
                );
            }
        }

        if !has_value && input_field.is_required() {
            push_unification_error(
                errors,
                var_name,
                var_pos,
                &Path::ObjectField(&input_field.name, path),
                &format!(r#"Expected "{}", found null"#, input_field.arg_type),
            );
        }
    }

    for key in keys {
        push_unification_error(
            errors,
            var_name,
            var_pos,
            &Path::ObjectField(key, path),
            "Unknown field",
        );
    }
}

fn is_absent_or_null(v: Option<&Value>) -> bool {
    v.is_none_or(Value::is_null)
}

fn push_unification_error(
    errors: &mut Vec<RuleError>,
    var_name: &str,
    var_pos: &SourcePosition,
    path: &Path<'_>,
    message: &str,
) {
    errors.push(RuleError::new(
        &format!(r#"Variable "${var_name}" got invalid value. {path}{message}"#),
        &[*var_pos],
    ));
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Root => write!(f, ""),
            Path::ArrayElement(idx, prev) => write!(f, "{prev}In element #{idx}: "),
            Path::ObjectField(name, prev) => write!(f, "{prev}In field \"{name}\": "),
        }
    }
}

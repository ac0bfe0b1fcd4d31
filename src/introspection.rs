//! The introspection object set: `__Schema`, `__Type` and friends, expressed
//! through the same resolver tables user objects use, wrapping the schema
//! model.

use std::sync::Arc;

use crate::{
    executor::ResolverParams,
    schema::{
        Argument, DirectiveType, EnumValue, Field, NamedTypeKind, Schema, TypeKind, TypeRef,
        WrapperKind,
    },
    types::{Object, Resolved, ResolverFuture},
    value::Value,
};

/// Adds the `__schema` and `__type(name:)` entry points to a query root.
pub(crate) fn graft_entry_points(query_root: &mut Object, schema: &Arc<Schema>) {
    let schema_for_schema = Arc::clone(schema);
    query_root.add_resolver("__schema", move |_: ResolverParams| {
        Resolved::object(schema_object(&schema_for_schema)).ready()
    });

    let schema_for_type = Arc::clone(schema);
    query_root.add_resolver("__type", move |params: ResolverParams| {
        let schema = Arc::clone(&schema_for_type);
        Box::pin(async move {
            let name = params
                .argument("name")
                .and_then(Value::as_string_value)
                .unwrap_or_default()
                .to_owned();

            Ok(match schema.type_ref_by_name(&name) {
                Some(type_ref) => Resolved::object(type_object(&schema, type_ref)),
                None => Resolved::null_object(),
            })
        })
    });
}

fn value_resolver(v: Value) -> impl Fn(ResolverParams) -> ResolverFuture {
    move |_| Resolved::Value(v.clone()).ready()
}

fn optional_string(v: Option<String>) -> Value {
    v.map_or(Value::Null, Value::String)
}

/// The `__Schema` object.
pub(crate) fn schema_object(schema: &Arc<Schema>) -> Arc<Object> {
    let mut object = Object::new(["__Schema"]);

    object.add_resolver(
        "description",
        value_resolver(optional_string(schema.description().map(Into::into))),
    );

    let schema_for_types = Arc::clone(schema);
    object.add_resolver("types", move |_| {
        let schema = Arc::clone(&schema_for_types);
        Box::pin(async move {
            let types = schema
                .type_list()
                .iter()
                .map(|t| {
                    let type_ref = TypeRef::Named(Arc::downgrade(t));
                    Resolved::object(type_object(&schema, type_ref))
                })
                .collect();
            Ok(Resolved::List(types))
        })
    });

    let schema_for_query = Arc::clone(schema);
    object.add_resolver("queryType", move |_| {
        let schema = Arc::clone(&schema_for_query);
        Box::pin(async move {
            let name = schema.query_type().name.clone();
            let type_ref = schema
                .type_ref_by_name(&name)
                .expect("query root is registered");
            Ok(Resolved::object(type_object(&schema, type_ref)))
        })
    });

    let schema_for_mutation = Arc::clone(schema);
    object.add_resolver("mutationType", move |_| {
        let schema = Arc::clone(&schema_for_mutation);
        Box::pin(async move {
            Ok(match schema.mutation_type() {
                Some(t) => {
                    let type_ref = schema
                        .type_ref_by_name(&t.name.clone())
                        .expect("mutation root is registered");
                    Resolved::object(type_object(&schema, type_ref))
                }
                None => Resolved::null_object(),
            })
        })
    });

    let schema_for_subscription = Arc::clone(schema);
    object.add_resolver("subscriptionType", move |_| {
        let schema = Arc::clone(&schema_for_subscription);
        Box::pin(async move {
            Ok(match schema.subscription_type() {
                Some(t) => {
                    let type_ref = schema
                        .type_ref_by_name(&t.name.clone())
                        .expect("subscription root is registered");
                    Resolved::object(type_object(&schema, type_ref))
                }
                None => Resolved::null_object(),
            })
        })
    });

    let schema_for_directives = Arc::clone(schema);
    object.add_resolver("directives", move |_| {
        let schema = Arc::clone(&schema_for_directives);
        Box::pin(async move {
            let directives = schema
                .directive_list()
                .iter()
                .map(|d| Resolved::object(directive_object(&schema, d.clone())))
                .collect();
            Ok(Resolved::List(directives))
        })
    });

    Arc::new(object)
}

/// A `__Type` object over a (possibly wrapped) type reference.
pub(crate) fn type_object(schema: &Arc<Schema>, type_ref: TypeRef) -> Arc<Object> {
    let mut object = Object::new(["__Type"]);

    let named = type_ref.as_named();
    let wrapper = type_ref.as_wrapper();

    let kind = match (&named, &wrapper) {
        (Some(named), _) => named.type_kind(),
        (_, Some(wrapper)) => match wrapper.kind {
            WrapperKind::List => TypeKind::List,
            WrapperKind::NonNull => TypeKind::NonNull,
        },
        _ => TypeKind::Scalar,
    };
    object.add_resolver("kind", value_resolver(Value::Enum(kind.to_string())));

    object.add_resolver(
        "name",
        value_resolver(optional_string(named.as_ref().map(|t| t.name.clone()))),
    );
    object.add_resolver(
        "description",
        value_resolver(optional_string(
            named.as_ref().and_then(|t| t.description.clone()),
        )),
    );

    let specified_by_url = named.as_ref().and_then(|t| match &t.kind {
        NamedTypeKind::Scalar { specified_by_url } => specified_by_url.clone(),
        _ => None,
    });
    object.add_resolver(
        "specifiedByURL",
        value_resolver(optional_string(specified_by_url)),
    );

    let schema_for_fields = Arc::clone(schema);
    let named_for_fields = named.clone();
    object.add_resolver("fields", move |params: ResolverParams| {
        let schema = Arc::clone(&schema_for_fields);
        let named = named_for_fields.clone();
        Box::pin(async move {
            let include_deprecated = params
                .argument("includeDeprecated")
                .and_then(Value::as_bool_value)
                .unwrap_or(false);

            let Some(fields) = named.as_ref().and_then(|t| t.fields()) else {
                return Ok(Resolved::Value(Value::Null));
            };

            Ok(Resolved::List(
                fields
                    .iter()
                    .filter(|f| include_deprecated || !f.deprecation_status.is_deprecated())
                    .map(|f| Resolved::object(field_object(&schema, f.clone())))
                    .collect(),
            ))
        })
    });

    let schema_for_interfaces = Arc::clone(schema);
    let named_for_interfaces = named.clone();
    object.add_resolver("interfaces", move |_| {
        let schema = Arc::clone(&schema_for_interfaces);
        let named = named_for_interfaces.clone();
        Box::pin(async move {
            let interface_names = named.as_ref().and_then(|t| match &t.kind {
                NamedTypeKind::Object {
                    interface_names, ..
                }
                | NamedTypeKind::Interface {
                    interface_names, ..
                } => Some(interface_names.clone()),
                _ => None,
            });

            let Some(interface_names) = interface_names else {
                return Ok(Resolved::Value(Value::Null));
            };

            Ok(Resolved::List(
                interface_names
                    .iter()
                    .filter_map(|name| schema.type_ref_by_name(name))
                    .map(|type_ref| Resolved::object(type_object(&schema, type_ref)))
                    .collect(),
            ))
        })
    });

    let schema_for_possible = Arc::clone(schema);
    let named_for_possible = named.clone();
    object.add_resolver("possibleTypes", move |_| {
        let schema = Arc::clone(&schema_for_possible);
        let named = named_for_possible.clone();
        Box::pin(async move {
            let Some(named) = named.as_ref().filter(|t| t.is_abstract()) else {
                return Ok(Resolved::Value(Value::Null));
            };

            Ok(Resolved::List(
                schema
                    .possible_types(named)
                    .iter()
                    .filter_map(|t| schema.type_ref_by_name(&t.name))
                    .map(|type_ref| Resolved::object(type_object(&schema, type_ref)))
                    .collect(),
            ))
        })
    });

    let named_for_enum = named.clone();
    object.add_resolver("enumValues", move |params: ResolverParams| {
        let named = named_for_enum.clone();
        Box::pin(async move {
            let include_deprecated = params
                .argument("includeDeprecated")
                .and_then(Value::as_bool_value)
                .unwrap_or(false);

            let values = named.as_ref().and_then(|t| match &t.kind {
                NamedTypeKind::Enum { values } => Some(values.clone()),
                _ => None,
            });

            let Some(values) = values else {
                return Ok(Resolved::Value(Value::Null));
            };

            Ok(Resolved::List(
                values
                    .iter()
                    .filter(|v| include_deprecated || !v.deprecation_status.is_deprecated())
                    .map(|v| Resolved::object(enum_value_object(v.clone())))
                    .collect(),
            ))
        })
    });

    let schema_for_inputs = Arc::clone(schema);
    let named_for_inputs = named.clone();
    object.add_resolver("inputFields", move |_| {
        let schema = Arc::clone(&schema_for_inputs);
        let named = named_for_inputs.clone();
        Box::pin(async move {
            let input_fields = named.as_ref().and_then(|t| match &t.kind {
                NamedTypeKind::InputObject { input_fields } => Some(input_fields.clone()),
                _ => None,
            });

            let Some(input_fields) = input_fields else {
                return Ok(Resolved::Value(Value::Null));
            };

            Ok(Resolved::List(
                input_fields
                    .iter()
                    .map(|f| Resolved::object(input_value_object(&schema, f.clone())))
                    .collect(),
            ))
        })
    });

    let schema_for_of_type = Arc::clone(schema);
    object.add_resolver("ofType", move |_| {
        let schema = Arc::clone(&schema_for_of_type);
        let wrapper = wrapper.clone();
        Box::pin(async move {
            Ok(match wrapper {
                Some(wrapper) => Resolved::object(type_object(&schema, wrapper.of_type.clone())),
                None => Resolved::null_object(),
            })
        })
    });

    Arc::new(object)
}

/// A `__Field` object.
fn field_object(schema: &Arc<Schema>, field: Field) -> Arc<Object> {
    let mut object = Object::new(["__Field"]);

    object.add_resolver("name", value_resolver(Value::String(field.name.clone())));
    object.add_resolver(
        "description",
        value_resolver(optional_string(field.description.clone())),
    );
    object.add_resolver(
        "isDeprecated",
        value_resolver(Value::Bool(field.deprecation_status.is_deprecated())),
    );
    object.add_resolver(
        "deprecationReason",
        value_resolver(optional_string(
            field.deprecation_status.reason().map(Into::into),
        )),
    );

    let schema_for_args = Arc::clone(schema);
    let arguments = field.arguments.clone();
    object.add_resolver("args", move |_| {
        let schema = Arc::clone(&schema_for_args);
        let arguments = arguments.clone();
        Box::pin(async move {
            Ok(Resolved::List(
                arguments
                    .iter()
                    .map(|a| Resolved::object(input_value_object(&schema, a.clone())))
                    .collect(),
            ))
        })
    });

    let schema_for_type = Arc::clone(schema);
    object.add_resolver("type", move |_| {
        let schema = Arc::clone(&schema_for_type);
        let field_type = field.field_type.clone();
        Box::pin(async move {
            let type_ref = schema.make_type(&field_type)?;
            Ok(Resolved::object(type_object(&schema, type_ref)))
        })
    });

    Arc::new(object)
}

/// A `__InputValue` object.
fn input_value_object(schema: &Arc<Schema>, input_value: Argument) -> Arc<Object> {
    let mut object = Object::new(["__InputValue"]);

    object.add_resolver(
        "name",
        value_resolver(Value::String(input_value.name.clone())),
    );
    object.add_resolver(
        "description",
        value_resolver(optional_string(input_value.description.clone())),
    );
    object.add_resolver(
        "defaultValue",
        value_resolver(optional_string(
            input_value.default_value.as_ref().map(ToString::to_string),
        )),
    );

    let schema_for_type = Arc::clone(schema);
    object.add_resolver("type", move |_| {
        let schema = Arc::clone(&schema_for_type);
        let arg_type = input_value.arg_type.clone();
        Box::pin(async move {
            let type_ref = schema.make_type(&arg_type)?;
            Ok(Resolved::object(type_object(&schema, type_ref)))
        })
    });

    Arc::new(object)
}

/// A `__EnumValue` object.
fn enum_value_object(value: EnumValue) -> Arc<Object> {
    let mut object = Object::new(["__EnumValue"]);

    object.add_resolver("name", value_resolver(Value::String(value.name.clone())));
    object.add_resolver(
        "description",
        value_resolver(optional_string(value.description.clone())),
    );
    object.add_resolver(
        "isDeprecated",
        value_resolver(Value::Bool(value.deprecation_status.is_deprecated())),
    );
    object.add_resolver(
        "deprecationReason",
        value_resolver(optional_string(
            value.deprecation_status.reason().map(Into::into),
        )),
    );

    Arc::new(object)
}

/// A `__Directive` object.
fn directive_object(schema: &Arc<Schema>, directive: DirectiveType) -> Arc<Object> {
    let mut object = Object::new(["__Directive"]);

    object.add_resolver(
        "name",
        value_resolver(Value::String(directive.name.clone())),
    );
    object.add_resolver(
        "description",
        value_resolver(optional_string(directive.description.clone())),
    );
    object.add_resolver(
        "isRepeatable",
        value_resolver(Value::Bool(directive.repeatable)),
    );
    object.add_resolver(
        "locations",
        value_resolver(Value::List(
            directive
                .locations
                .iter()
                .map(|l| Value::Enum(l.to_string()))
                .collect(),
        )),
    );

    let schema_for_args = Arc::clone(schema);
    object.add_resolver("args", move |_| {
        let schema = Arc::clone(&schema_for_args);
        let arguments = directive.arguments.clone();
        Box::pin(async move {
            Ok(Resolved::List(
                arguments
                    .iter()
                    .map(|a| Resolved::object(input_value_object(&schema, a.clone())))
                    .collect(),
            ))
        })
    });

    Arc::new(object)
}

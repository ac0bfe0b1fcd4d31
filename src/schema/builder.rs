//! Assembles a [`Schema`] from parsed schema documents.

use std::sync::Arc;

use derive_more::with_trait::{Display, Error};
use fnv::FnvHashMap;

use crate::{
    ast::{
        Definition, Directives, Document, InputValueDefinition, OperationType, Type,
        TypeDefinition, TypeSystemDefinition,
    },
    parser::Spanning,
    schema::model::{
        Argument, DeprecationStatus, DirectiveLocation, DirectiveType, EnumValue, Field,
        NamedType, NamedTypeKind, Schema,
    },
};

/// Error assembling a schema from its definitions.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum SchemaViolation {
    /// Two definitions share one type name.
    #[display("Type \"{_0}\" is defined more than once")]
    DuplicateType(#[error(not(source))] String),

    /// Two definitions share one directive name.
    #[display("Directive \"@{_0}\" is defined more than once")]
    DuplicateDirective(#[error(not(source))] String),

    /// More than one `schema { … }` definition.
    #[display("The schema is defined more than once")]
    DuplicateSchemaDefinition,

    /// A referenced type is not defined anywhere.
    #[display("Unknown type \"{_0}\" referenced from \"{_1}\"")]
    UnknownType(
        #[error(not(source))] String,
        #[error(not(source))] String,
    ),

    /// An `extend` has no matching definition.
    #[display("Cannot extend undefined type \"{_0}\"")]
    UnknownExtensionTarget(#[error(not(source))] String),

    /// An `extend` names a type of a different kind.
    #[display("Cannot extend type \"{_0}\" with a different kind of definition")]
    ExtensionKindMismatch(#[error(not(source))] String),

    /// No query root could be determined.
    #[display("The schema defines no query root type")]
    MissingQueryType,

    /// An operation root is bound to a non-object type.
    #[display("The {_0} root type \"{_1}\" is not an object type")]
    RootTypeNotObject(
        #[error(not(source))] OperationType,
        #[error(not(source))] String,
    ),

    /// A union member is not an object type.
    #[display("Union \"{_0}\" member \"{_1}\" is not an object type")]
    UnionMemberNotObject(
        #[error(not(source))] String,
        #[error(not(source))] String,
    ),

    /// An `implements` entry is not an interface type.
    #[display("Type \"{_0}\" implements \"{_1}\" which is not an interface")]
    NotAnInterface(
        #[error(not(source))] String,
        #[error(not(source))] String,
    ),

    /// A directive definition names an unknown location.
    #[display("Directive \"@{_0}\" declares unknown location \"{_1}\"")]
    UnknownDirectiveLocation(
        #[error(not(source))] String,
        #[error(not(source))] String,
    ),
}

/// Incrementally assembles a [`Schema`].
///
/// Built-in scalars and directives are registered up front; documents add
/// definitions; `finish` applies extensions, seals interface possible-types
/// and verifies referential integrity.
pub struct SchemaBuilder {
    types: Vec<NamedType>,
    type_indices: FnvHashMap<String, usize>,
    directives: Vec<DirectiveType>,
    root_bindings: FnvHashMap<OperationType, String>,
    description: Option<String>,
    introspection_enabled: bool,
    pending_extensions: Vec<TypeDefinition>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Creates a builder pre-populated with the built-in scalars and
    /// directives.
    pub fn new() -> Self {
        let mut builder = Self {
            types: Vec::new(),
            type_indices: FnvHashMap::default(),
            directives: Vec::new(),
            root_bindings: FnvHashMap::default(),
            description: None,
            introspection_enabled: true,
            pending_extensions: Vec::new(),
        };

        for name in ["Int", "Float", "String", "Boolean", "ID"] {
            builder.register(NamedType {
                name: name.into(),
                description: None,
                kind: NamedTypeKind::Scalar {
                    specified_by_url: None,
                },
            });
        }

        let condition_arg = Argument {
            name: "if".into(),
            description: None,
            arg_type: Type::NonNullNamed("Boolean".into()),
            default_value: None,
        };
        let executable_sites = vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ];

        builder.directives.push(DirectiveType {
            name: "skip".into(),
            description: None,
            locations: executable_sites.clone(),
            arguments: vec![condition_arg.clone()],
            repeatable: false,
        });
        builder.directives.push(DirectiveType {
            name: "include".into(),
            description: None,
            locations: executable_sites,
            arguments: vec![condition_arg],
            repeatable: false,
        });
        builder.directives.push(DirectiveType {
            name: "deprecated".into(),
            description: None,
            locations: vec![
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::ArgumentDefinition,
                DirectiveLocation::InputFieldDefinition,
                DirectiveLocation::EnumValue,
            ],
            arguments: vec![Argument {
                name: "reason".into(),
                description: None,
                arg_type: Type::Named("String".into()),
                default_value: Some(crate::ast::InputValue::String(
                    "No longer supported".into(),
                )),
            }],
            repeatable: false,
        });
        builder.directives.push(DirectiveType {
            name: "specifiedBy".into(),
            description: None,
            locations: vec![DirectiveLocation::Scalar],
            arguments: vec![Argument {
                name: "url".into(),
                description: None,
                arg_type: Type::NonNullNamed("String".into()),
                default_value: None,
            }],
            repeatable: false,
        });

        builder
    }

    /// Disables the `__schema`/`__type` entry points on the resulting schema.
    pub fn disable_introspection(&mut self) -> &mut Self {
        self.introspection_enabled = false;
        self
    }

    fn register(&mut self, t: NamedType) {
        self.type_indices.insert(t.name.clone(), self.types.len());
        self.types.push(t);
    }

    /// Adds every definition of a parsed schema document.
    pub fn add_document(&mut self, doc: &Document) -> Result<&mut Self, SchemaViolation> {
        for def in &doc.definitions {
            let Definition::TypeSystem(ts) = def else {
                continue;
            };

            match ts {
                TypeSystemDefinition::Schema(schema_def) => {
                    if !self.root_bindings.is_empty() || self.description.is_some() {
                        return Err(SchemaViolation::DuplicateSchemaDefinition);
                    }
                    self.description = schema_def.item.description.as_ref().map(|d| d.item.clone());
                    for binding in &schema_def.item.operation_types {
                        self.root_bindings.insert(
                            binding.item.operation_type,
                            binding.item.type_name.item.clone(),
                        );
                    }
                }
                TypeSystemDefinition::SchemaExtension(schema_def) => {
                    for binding in &schema_def.item.operation_types {
                        self.root_bindings.insert(
                            binding.item.operation_type,
                            binding.item.type_name.item.clone(),
                        );
                    }
                }
                TypeSystemDefinition::Type(type_def) => {
                    let named = convert_type_definition(&type_def.item);
                    if self.type_indices.contains_key(&named.name) {
                        return Err(SchemaViolation::DuplicateType(named.name));
                    }
                    self.register(named);
                }
                TypeSystemDefinition::TypeExtension(type_def) => {
                    self.pending_extensions.push(type_def.item.clone());
                }
                TypeSystemDefinition::Directive(directive_def) => {
                    let name = directive_def.item.name.item.clone();
                    if self.directives.iter().any(|d| d.name == name) {
                        return Err(SchemaViolation::DuplicateDirective(name));
                    }

                    let mut locations = Vec::new();
                    for loc in &directive_def.item.locations {
                        locations.push(DirectiveLocation::from_name(&loc.item).ok_or_else(
                            || {
                                SchemaViolation::UnknownDirectiveLocation(
                                    name.clone(),
                                    loc.item.clone(),
                                )
                            },
                        )?);
                    }

                    self.directives.push(DirectiveType {
                        name,
                        description: directive_def
                            .item
                            .description
                            .as_ref()
                            .map(|d| d.item.clone()),
                        locations,
                        arguments: convert_input_values(&directive_def.item.arguments),
                        repeatable: directive_def.item.repeatable,
                    });
                }
            }
        }

        Ok(self)
    }

    /// Applies pending extensions, resolves the operation roots, verifies
    /// referential integrity and seals the schema.
    pub fn finish(mut self) -> Result<Schema, SchemaViolation> {
        let extensions = std::mem::take(&mut self.pending_extensions);
        for extension in extensions {
            self.apply_extension(extension)?;
        }

        self.check_references()?;
        self.seal_possible_types();

        let query_type = self.resolve_root(OperationType::Query, "Query")?;
        let mutation_type = self.resolve_root(OperationType::Mutation, "Mutation")?;
        let subscription_type = self.resolve_root(OperationType::Subscription, "Subscription")?;

        let Some(query_type) = query_type else {
            return Err(SchemaViolation::MissingQueryType);
        };

        Ok(Schema::new(
            self.types.into_iter().map(Arc::new).collect(),
            self.type_indices,
            query_type,
            mutation_type,
            subscription_type,
            self.directives,
            self.description,
            self.introspection_enabled,
        ))
    }

    fn resolve_root(
        &self,
        operation: OperationType,
        default_name: &str,
    ) -> Result<Option<usize>, SchemaViolation> {
        let name = match self.root_bindings.get(&operation) {
            Some(bound) => bound.clone(),
            None if self.root_bindings.is_empty() => default_name.into(),
            // An explicit `schema { … }` withholds unbound roots.
            None => return Ok(None),
        };

        let Some(&idx) = self.type_indices.get(&name) else {
            return if self.root_bindings.contains_key(&operation) {
                Err(SchemaViolation::UnknownType(name, format!("{operation} root")))
            } else {
                Ok(None)
            };
        };

        if !matches!(self.types[idx].kind, NamedTypeKind::Object { .. }) {
            return Err(SchemaViolation::RootTypeNotObject(operation, name));
        }

        Ok(Some(idx))
    }

    fn apply_extension(&mut self, extension: TypeDefinition) -> Result<(), SchemaViolation> {
        let name = extension.name().item.clone();
        let Some(&idx) = self.type_indices.get(&name) else {
            return Err(SchemaViolation::UnknownExtensionTarget(name));
        };

        let target = &mut self.types[idx];

        match (&mut target.kind, extension) {
            (
                NamedTypeKind::Scalar { specified_by_url },
                TypeDefinition::Scalar(ext),
            ) => {
                if let Some(url) = specified_by_url_from(&ext.directives) {
                    *specified_by_url = Some(url);
                }
            }
            (
                NamedTypeKind::Object {
                    interface_names,
                    fields,
                },
                TypeDefinition::Object(ext),
            ) => {
                interface_names.extend(ext.interfaces.iter().map(|i| i.item.clone()));
                fields.extend(ext.fields.iter().map(|f| convert_field(&f.item)));
            }
            (
                NamedTypeKind::Interface {
                    interface_names,
                    fields,
                    ..
                },
                TypeDefinition::Interface(ext),
            ) => {
                interface_names.extend(ext.interfaces.iter().map(|i| i.item.clone()));
                fields.extend(ext.fields.iter().map(|f| convert_field(&f.item)));
            }
            (NamedTypeKind::Union { member_names }, TypeDefinition::Union(ext)) => {
                member_names.extend(ext.members.iter().map(|m| m.item.clone()));
            }
            (NamedTypeKind::Enum { values }, TypeDefinition::Enum(ext)) => {
                values.extend(ext.values.iter().map(|v| EnumValue {
                    name: v.item.name.item.clone(),
                    description: v.item.description.as_ref().map(|d| d.item.clone()),
                    deprecation_status: deprecation_from(&v.item.directives),
                }));
            }
            (NamedTypeKind::InputObject { input_fields }, TypeDefinition::InputObject(ext)) => {
                input_fields.extend(convert_input_values(&ext.fields));
            }
            _ => return Err(SchemaViolation::ExtensionKindMismatch(name)),
        }

        Ok(())
    }

    /// Every type reference must resolve; union members must be objects;
    /// `implements` entries must be interfaces.
    fn check_references(&self) -> Result<(), SchemaViolation> {
        let kind_of = |name: &str| {
            self.type_indices
                .get(name)
                .map(|&idx| &self.types[idx].kind)
        };

        let check_type = |t: &Type, site: &str| {
            let name = t.innermost_name();
            if self.type_indices.contains_key(name) {
                Ok(())
            } else {
                Err(SchemaViolation::UnknownType(name.into(), site.into()))
            }
        };

        for t in &self.types {
            match &t.kind {
                NamedTypeKind::Object {
                    interface_names,
                    fields,
                }
                | NamedTypeKind::Interface {
                    interface_names,
                    fields,
                    ..
                } => {
                    for iface in interface_names {
                        match kind_of(iface) {
                            Some(NamedTypeKind::Interface { .. }) => {}
                            Some(_) => {
                                return Err(SchemaViolation::NotAnInterface(
                                    t.name.clone(),
                                    iface.clone(),
                                ));
                            }
                            None => {
                                return Err(SchemaViolation::UnknownType(
                                    iface.clone(),
                                    t.name.clone(),
                                ));
                            }
                        }
                    }
                    for field in fields {
                        let site = format!("{}.{}", t.name, field.name);
                        check_type(&field.field_type, &site)?;
                        for arg in &field.arguments {
                            check_type(&arg.arg_type, &site)?;
                        }
                    }
                }
                NamedTypeKind::Union { member_names } => {
                    for member in member_names {
                        match kind_of(member) {
                            Some(NamedTypeKind::Object { .. }) => {}
                            Some(_) => {
                                return Err(SchemaViolation::UnionMemberNotObject(
                                    t.name.clone(),
                                    member.clone(),
                                ));
                            }
                            None => {
                                return Err(SchemaViolation::UnknownType(
                                    member.clone(),
                                    t.name.clone(),
                                ));
                            }
                        }
                    }
                }
                NamedTypeKind::InputObject { input_fields } => {
                    for field in input_fields {
                        let site = format!("{}.{}", t.name, field.name);
                        check_type(&field.arg_type, &site)?;
                    }
                }
                NamedTypeKind::Scalar { .. } | NamedTypeKind::Enum { .. } => {}
            }
        }

        for directive in &self.directives {
            for arg in &directive.arguments {
                check_type(&arg.arg_type, &format!("@{}", directive.name))?;
            }
        }

        Ok(())
    }

    /// Fills each interface's `possible_types` with the transitive closure of
    /// objects declaring it, directly or through interface inheritance.
    fn seal_possible_types(&mut self) {
        let mut interface_closures: FnvHashMap<usize, Vec<usize>> = FnvHashMap::default();

        for (obj_idx, t) in self.types.iter().enumerate() {
            let NamedTypeKind::Object {
                interface_names, ..
            } = &t.kind
            else {
                continue;
            };

            let mut stack: Vec<&str> = interface_names.iter().map(String::as_str).collect();
            let mut seen: Vec<usize> = Vec::new();

            while let Some(iface_name) = stack.pop() {
                let Some(&iface_idx) = self.type_indices.get(iface_name) else {
                    continue;
                };
                if seen.contains(&iface_idx) {
                    continue;
                }
                seen.push(iface_idx);

                if let NamedTypeKind::Interface {
                    interface_names: parents,
                    ..
                } = &self.types[iface_idx].kind
                {
                    stack.extend(parents.iter().map(String::as_str));
                }
            }

            for iface_idx in seen {
                interface_closures.entry(iface_idx).or_default().push(obj_idx);
            }
        }

        for (iface_idx, objects) in interface_closures {
            if let NamedTypeKind::Interface { possible_types, .. } =
                &mut self.types[iface_idx].kind
            {
                *possible_types = objects;
            }
        }
    }
}

fn convert_type_definition(def: &TypeDefinition) -> NamedType {
    match def {
        TypeDefinition::Scalar(d) => NamedType {
            name: d.name.item.clone(),
            description: d.description.as_ref().map(|s| s.item.clone()),
            kind: NamedTypeKind::Scalar {
                specified_by_url: specified_by_url_from(&d.directives),
            },
        },
        TypeDefinition::Object(d) => NamedType {
            name: d.name.item.clone(),
            description: d.description.as_ref().map(|s| s.item.clone()),
            kind: NamedTypeKind::Object {
                interface_names: d.interfaces.iter().map(|i| i.item.clone()).collect(),
                fields: d.fields.iter().map(|f| convert_field(&f.item)).collect(),
            },
        },
        TypeDefinition::Interface(d) => NamedType {
            name: d.name.item.clone(),
            description: d.description.as_ref().map(|s| s.item.clone()),
            kind: NamedTypeKind::Interface {
                interface_names: d.interfaces.iter().map(|i| i.item.clone()).collect(),
                possible_types: Vec::new(),
                fields: d.fields.iter().map(|f| convert_field(&f.item)).collect(),
            },
        },
        TypeDefinition::Union(d) => NamedType {
            name: d.name.item.clone(),
            description: d.description.as_ref().map(|s| s.item.clone()),
            kind: NamedTypeKind::Union {
                member_names: d.members.iter().map(|m| m.item.clone()).collect(),
            },
        },
        TypeDefinition::Enum(d) => NamedType {
            name: d.name.item.clone(),
            description: d.description.as_ref().map(|s| s.item.clone()),
            kind: NamedTypeKind::Enum {
                values: d
                    .values
                    .iter()
                    .map(|v| EnumValue {
                        name: v.item.name.item.clone(),
                        description: v.item.description.as_ref().map(|s| s.item.clone()),
                        deprecation_status: deprecation_from(&v.item.directives),
                    })
                    .collect(),
            },
        },
        TypeDefinition::InputObject(d) => NamedType {
            name: d.name.item.clone(),
            description: d.description.as_ref().map(|s| s.item.clone()),
            kind: NamedTypeKind::InputObject {
                input_fields: convert_input_values(&d.fields),
            },
        },
    }
}

fn convert_field(def: &crate::ast::FieldDefinition) -> Field {
    Field {
        name: def.name.item.clone(),
        description: def.description.as_ref().map(|s| s.item.clone()),
        arguments: convert_input_values(&def.arguments),
        field_type: def.field_type.item.clone(),
        deprecation_status: deprecation_from(&def.directives),
    }
}

fn convert_input_values(defs: &[Spanning<InputValueDefinition>]) -> Vec<Argument> {
    defs.iter()
        .map(|d| Argument {
            name: d.item.name.item.clone(),
            description: d.item.description.as_ref().map(|s| s.item.clone()),
            arg_type: d.item.value_type.item.clone(),
            default_value: d.item.default_value.as_ref().map(|v| v.item.clone()),
        })
        .collect()
}

fn deprecation_from(directives: &Option<Directives>) -> DeprecationStatus {
    let Some(directives) = directives else {
        return DeprecationStatus::Current;
    };

    for directive in directives {
        if directive.item.name.item == "deprecated" {
            let reason = directive
                .item
                .arguments
                .as_ref()
                .and_then(|args| args.item.get("reason"))
                .and_then(|v| v.item.as_string_value().map(Into::into));
            return DeprecationStatus::Deprecated(reason);
        }
    }

    DeprecationStatus::Current
}

fn specified_by_url_from(directives: &Option<Directives>) -> Option<String> {
    directives.as_ref()?.iter().find_map(|directive| {
        if directive.item.name.item == "specifiedBy" {
            directive
                .item
                .arguments
                .as_ref()
                .and_then(|args| args.item.get("url"))
                .and_then(|v| v.item.as_string_value().map(Into::into))
        } else {
            None
        }
    })
}

//! In-memory representation of a loaded type system.

use std::{
    fmt,
    sync::{Arc, RwLock, Weak},
};

use derive_more::with_trait::{Display, Error};
use fnv::FnvHashMap;

use crate::ast::{InputValue, Type};

/// The kind of a type as reported by introspection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs, reason = "self-explanatory")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        })
    }
}

/// Whether an element is deprecated, and why.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeprecationStatus {
    /// The element is in active use.
    Current,

    /// The element is deprecated, with an optional reason.
    Deprecated(Option<String>),
}

impl DeprecationStatus {
    /// Whether the element is deprecated.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Self::Deprecated(..))
    }

    /// The deprecation reason, if one was supplied.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Deprecated(Some(r)) => Some(r),
            _ => None,
        }
    }
}

/// An argument of a field or directive, or an input-object field.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    /// Name of the argument.
    pub name: String,

    /// Description attached in the schema source.
    pub description: Option<String>,

    /// The declared (possibly wrapped) type, as written.
    pub arg_type: Type,

    /// The default-value literal, if any.
    pub default_value: Option<InputValue>,
}

impl Argument {
    /// An argument is required when its type is non-null and it carries no
    /// default.
    pub fn is_required(&self) -> bool {
        self.arg_type.is_non_null() && self.default_value.is_none()
    }
}

/// A field on an object or interface type.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Name of the field.
    pub name: String,

    /// Description attached in the schema source.
    pub description: Option<String>,

    /// Declared arguments, in source order.
    pub arguments: Vec<Argument>,

    /// The declared (possibly wrapped) return type, as written.
    pub field_type: Type,

    /// Deprecation state from `@deprecated`.
    pub deprecation_status: DeprecationStatus,
}

impl Field {
    /// Looks up a declared argument by name.
    pub fn argument_by_name(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// One value of an enum type.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValue {
    /// The value name.
    pub name: String,

    /// Description attached in the schema source.
    pub description: Option<String>,

    /// Deprecation state from `@deprecated`.
    pub deprecation_status: DeprecationStatus,
}

/// The kind-specific payload of a named type.
#[derive(Clone, Debug, PartialEq)]
pub enum NamedTypeKind {
    /// A built-in or custom scalar.
    Scalar {
        /// URL from `@specifiedBy(url:)`, if any.
        specified_by_url: Option<String>,
    },

    /// An object type.
    Object {
        /// Names of the implemented interfaces.
        interface_names: Vec<String>,

        /// Declared fields, in source order.
        fields: Vec<Field>,
    },

    /// An interface type.
    Interface {
        /// Names of the implemented interfaces.
        interface_names: Vec<String>,

        /// Indices into the schema's type vector of every object that
        /// (transitively) declares this interface.
        possible_types: Vec<usize>,

        /// Declared fields, in source order.
        fields: Vec<Field>,
    },

    /// A union type.
    Union {
        /// Names of the member object types.
        member_names: Vec<String>,
    },

    /// An enum type.
    Enum {
        /// Declared values, in source order.
        values: Vec<EnumValue>,
    },

    /// An input object type.
    InputObject {
        /// Declared input fields, in source order.
        input_fields: Vec<Argument>,
    },
}

/// A named type registered in a [`Schema`].
#[derive(Clone, Debug, PartialEq)]
pub struct NamedType {
    /// The type name; unique per schema.
    pub name: String,

    /// Description attached in the schema source.
    pub description: Option<String>,

    /// The kind-specific payload.
    pub kind: NamedTypeKind,
}

impl NamedType {
    /// The introspection kind of this type.
    pub fn type_kind(&self) -> TypeKind {
        match &self.kind {
            NamedTypeKind::Scalar { .. } => TypeKind::Scalar,
            NamedTypeKind::Object { .. } => TypeKind::Object,
            NamedTypeKind::Interface { .. } => TypeKind::Interface,
            NamedTypeKind::Union { .. } => TypeKind::Union,
            NamedTypeKind::Enum { .. } => TypeKind::Enum,
            NamedTypeKind::InputObject { .. } => TypeKind::InputObject,
        }
    }

    /// Fields declared on an object or interface.
    pub fn fields(&self) -> Option<&[Field]> {
        match &self.kind {
            NamedTypeKind::Object { fields, .. } | NamedTypeKind::Interface { fields, .. } => {
                Some(fields)
            }
            _ => None,
        }
    }

    /// Looks up a field on an object or interface by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields()?.iter().find(|f| f.name == name)
    }

    /// Looks up an input field on an input object by name.
    pub fn input_field_by_name(&self, name: &str) -> Option<&Argument> {
        match &self.kind {
            NamedTypeKind::InputObject { input_fields } => {
                input_fields.iter().find(|f| f.name == name)
            }
            _ => None,
        }
    }

    /// Looks up an enum value by name.
    pub fn enum_value_by_name(&self, name: &str) -> Option<&EnumValue> {
        match &self.kind {
            NamedTypeKind::Enum { values } => values.iter().find(|v| v.name == name),
            _ => None,
        }
    }

    /// Objects, interfaces and unions can be sub-selected.
    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            NamedTypeKind::Object { .. }
                | NamedTypeKind::Interface { .. }
                | NamedTypeKind::Union { .. }
        )
    }

    /// Scalars and enums terminate a selection.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            NamedTypeKind::Scalar { .. } | NamedTypeKind::Enum { .. }
        )
    }

    /// Interfaces and unions resolve to one of several object types.
    pub fn is_abstract(&self) -> bool {
        matches!(
            self.kind,
            NamedTypeKind::Interface { .. } | NamedTypeKind::Union { .. }
        )
    }

    /// Scalars, enums and input objects may appear in input positions.
    pub fn is_input(&self) -> bool {
        matches!(
            self.kind,
            NamedTypeKind::Scalar { .. }
                | NamedTypeKind::Enum { .. }
                | NamedTypeKind::InputObject { .. }
        )
    }
}

/// The wrapping applied by a wrapper type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum WrapperKind {
    /// A `[T]` list wrapper.
    List,

    /// A `T!` non-null wrapper.
    NonNull,
}

/// An interned `[T]` or `T!` wrapper.
///
/// Wrappers are never named; the interning table inside the [`Schema`] is
/// their strong owner, and `of_type` is a weak back-reference.
#[derive(Debug)]
pub struct WrapperType {
    /// Whether this wraps as a list or as non-null.
    pub kind: WrapperKind,

    /// The wrapped type.
    pub of_type: TypeRef,
}

/// A reference to a registered named type or an interned wrapper.
///
/// Holds weak references; ownership flows from the [`Schema`] to its types,
/// and types never own other named types.
#[derive(Clone, Debug)]
pub enum TypeRef {
    /// Reference to a named type.
    Named(Weak<NamedType>),

    /// Reference to an interned wrapper type.
    Wrapper(Weak<WrapperType>),
}

impl TypeRef {
    /// Upgrades a named reference.
    pub fn as_named(&self) -> Option<Arc<NamedType>> {
        match self {
            Self::Named(w) => w.upgrade(),
            Self::Wrapper(..) => None,
        }
    }

    /// Upgrades a wrapper reference.
    pub fn as_wrapper(&self) -> Option<Arc<WrapperType>> {
        match self {
            Self::Named(..) => None,
            Self::Wrapper(w) => w.upgrade(),
        }
    }

    /// The named type at the innermost position of the wrapper chain.
    pub fn innermost_named(&self) -> Option<Arc<NamedType>> {
        match self {
            Self::Named(w) => w.upgrade(),
            Self::Wrapper(w) => w.upgrade()?.of_type.innermost_named(),
        }
    }

    /// Whether the outermost layer is a non-null wrapper.
    pub fn is_non_null(&self) -> bool {
        self.as_wrapper()
            .is_some_and(|w| w.kind == WrapperKind::NonNull)
    }

    /// The canonical display name, e.g. `[Int!]`.
    ///
    /// Also serves as the interning key for derived wrappers.
    pub fn display_name(&self) -> String {
        match self {
            Self::Named(w) => w
                .upgrade()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| "<dropped>".into()),
            Self::Wrapper(w) => match w.upgrade() {
                Some(w) => match w.kind {
                    WrapperKind::List => format!("[{}]", w.of_type.display_name()),
                    WrapperKind::NonNull => format!("{}!", w.of_type.display_name()),
                },
                None => "<dropped>".into(),
            },
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Error deriving a wrapper type or resolving a type literal.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum WrapError {
    /// A non-null wrapper may not directly wrap another non-null wrapper.
    #[display("Cannot wrap a non-null type in another non-null wrapper")]
    DoubleNonNull,

    /// The named type is not registered in the schema.
    #[display("Unknown type \"{_0}\"")]
    UnknownType(#[error(not(source))] String),
}

/// Where a directive may legally appear.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(missing_docs, reason = "self-explanatory")]
pub enum DirectiveLocation {
    Query,
    Mutation,
    Subscription,
    Field,
    FragmentDefinition,
    FragmentSpread,
    InlineFragment,
    VariableDefinition,
    Schema,
    Scalar,
    Object,
    FieldDefinition,
    ArgumentDefinition,
    Interface,
    Union,
    Enum,
    EnumValue,
    InputObject,
    InputFieldDefinition,
}

impl DirectiveLocation {
    /// Parses an SDL location name like `FIELD_DEFINITION`.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "QUERY" => Self::Query,
            "MUTATION" => Self::Mutation,
            "SUBSCRIPTION" => Self::Subscription,
            "FIELD" => Self::Field,
            "FRAGMENT_DEFINITION" => Self::FragmentDefinition,
            "FRAGMENT_SPREAD" => Self::FragmentSpread,
            "INLINE_FRAGMENT" => Self::InlineFragment,
            "VARIABLE_DEFINITION" => Self::VariableDefinition,
            "SCHEMA" => Self::Schema,
            "SCALAR" => Self::Scalar,
            "OBJECT" => Self::Object,
            "FIELD_DEFINITION" => Self::FieldDefinition,
            "ARGUMENT_DEFINITION" => Self::ArgumentDefinition,
            "INTERFACE" => Self::Interface,
            "UNION" => Self::Union,
            "ENUM" => Self::Enum,
            "ENUM_VALUE" => Self::EnumValue,
            "INPUT_OBJECT" => Self::InputObject,
            "INPUT_FIELD_DEFINITION" => Self::InputFieldDefinition,
            _ => return None,
        })
    }

    /// The SDL name of this location.
    pub fn as_name(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Mutation => "MUTATION",
            Self::Subscription => "SUBSCRIPTION",
            Self::Field => "FIELD",
            Self::FragmentDefinition => "FRAGMENT_DEFINITION",
            Self::FragmentSpread => "FRAGMENT_SPREAD",
            Self::InlineFragment => "INLINE_FRAGMENT",
            Self::VariableDefinition => "VARIABLE_DEFINITION",
            Self::Schema => "SCHEMA",
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::FieldDefinition => "FIELD_DEFINITION",
            Self::ArgumentDefinition => "ARGUMENT_DEFINITION",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::EnumValue => "ENUM_VALUE",
            Self::InputObject => "INPUT_OBJECT",
            Self::InputFieldDefinition => "INPUT_FIELD_DEFINITION",
        }
    }
}

impl fmt::Display for DirectiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_name())
    }
}

/// A directive registered in a [`Schema`].
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveType {
    /// Name of the directive, without the leading `@`.
    pub name: String,

    /// Description attached in the schema source.
    pub description: Option<String>,

    /// The locations the directive may appear at.
    pub locations: Vec<DirectiveLocation>,

    /// Declared arguments, in source order.
    pub arguments: Vec<Argument>,

    /// Whether the directive may appear more than once per site.
    pub repeatable: bool,
}

/// A loaded, immutable type system shared between request executions.
///
/// All mutation happens inside the builder; after construction the only
/// interior mutability are the two wrapper-interning tables, guarded by
/// reader–writer locks so derived wrappers may be created during concurrent
/// introspection.
#[derive(Debug)]
pub struct Schema {
    pub(crate) types: Vec<Arc<NamedType>>,
    pub(crate) type_indices: FnvHashMap<String, usize>,
    pub(crate) query_type: usize,
    pub(crate) mutation_type: Option<usize>,
    pub(crate) subscription_type: Option<usize>,
    pub(crate) directives: Vec<DirectiveType>,
    pub(crate) description: Option<String>,
    pub(crate) introspection_enabled: bool,

    list_types: RwLock<FnvHashMap<String, Arc<WrapperType>>>,
    non_null_types: RwLock<FnvHashMap<String, Arc<WrapperType>>>,
}

impl Schema {
    pub(crate) fn new(
        types: Vec<Arc<NamedType>>,
        type_indices: FnvHashMap<String, usize>,
        query_type: usize,
        mutation_type: Option<usize>,
        subscription_type: Option<usize>,
        directives: Vec<DirectiveType>,
        description: Option<String>,
        introspection_enabled: bool,
    ) -> Self {
        Self {
            types,
            type_indices,
            query_type,
            mutation_type,
            subscription_type,
            directives,
            description,
            introspection_enabled,
            list_types: RwLock::new(FnvHashMap::default()),
            non_null_types: RwLock::new(FnvHashMap::default()),
        }
    }

    /// The schema description, if one was attached.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether `__schema`/`__type` are exposed on the query root.
    pub fn introspection_enabled(&self) -> bool {
        self.introspection_enabled
    }

    /// Looks up a named type, returning a shared handle.
    pub fn type_by_name(&self, name: &str) -> Option<Arc<NamedType>> {
        self.type_indices
            .get(name)
            .map(|&idx| Arc::clone(&self.types[idx]))
    }

    /// Looks up a named type, returning a borrowed reference.
    pub fn concrete_type_by_name(&self, name: &str) -> Option<&NamedType> {
        self.type_indices.get(name).map(|&idx| &*self.types[idx])
    }

    /// A weak reference to a named type, for building wrapper chains.
    pub fn type_ref_by_name(&self, name: &str) -> Option<TypeRef> {
        self.type_indices
            .get(name)
            .map(|&idx| TypeRef::Named(Arc::downgrade(&self.types[idx])))
    }

    /// All named types, in registration order.
    pub fn type_list(&self) -> &[Arc<NamedType>] {
        &self.types
    }

    /// The query root object type.
    pub fn query_type(&self) -> &NamedType {
        &self.types[self.query_type]
    }

    /// The mutation root object type, if the schema supports mutations.
    pub fn mutation_type(&self) -> Option<&NamedType> {
        self.mutation_type.map(|idx| &*self.types[idx])
    }

    /// The subscription root object type, if the schema supports
    /// subscriptions.
    pub fn subscription_type(&self) -> Option<&NamedType> {
        self.subscription_type.map(|idx| &*self.types[idx])
    }

    /// All registered directives.
    pub fn directive_list(&self) -> &[DirectiveType] {
        &self.directives
    }

    /// Looks up a directive by name.
    pub fn directive_by_name(&self, name: &str) -> Option<&DirectiveType> {
        self.directives.iter().find(|d| d.name == name)
    }

    /// Derives (or returns the interned) wrapper around `inner`.
    ///
    /// The read path takes a shared lock and hits overwhelmingly on steady
    /// state; a miss upgrades to an exclusive lock and double-checks to avoid
    /// duplicate insertion. Wrapping a non-null wrapper in another non-null
    /// is rejected.
    pub fn wrap(&self, kind: WrapperKind, inner: &TypeRef) -> Result<TypeRef, WrapError> {
        if kind == WrapperKind::NonNull && inner.is_non_null() {
            return Err(WrapError::DoubleNonNull);
        }

        let key = inner.display_name();
        let table = match kind {
            WrapperKind::List => &self.list_types,
            WrapperKind::NonNull => &self.non_null_types,
        };

        {
            let read = table.read().expect("wrapper table lock poisoned");
            if let Some(interned) = read.get(&key) {
                return Ok(TypeRef::Wrapper(Arc::downgrade(interned)));
            }
        }

        let mut write = table.write().expect("wrapper table lock poisoned");
        let interned = write.entry(key).or_insert_with(|| {
            Arc::new(WrapperType {
                kind,
                of_type: inner.clone(),
            })
        });

        Ok(TypeRef::Wrapper(Arc::downgrade(interned)))
    }

    /// Materializes a type literal into a (possibly wrapped) [`TypeRef`],
    /// interning any wrappers.
    pub fn make_type(&self, t: &Type) -> Result<TypeRef, WrapError> {
        match t {
            Type::Named(n) => self
                .type_ref_by_name(n)
                .ok_or_else(|| WrapError::UnknownType(n.clone())),
            Type::List(inner) => {
                let inner = self.make_type(inner)?;
                self.wrap(WrapperKind::List, &inner)
            }
            Type::NonNullNamed(n) => {
                let inner = self
                    .type_ref_by_name(n)
                    .ok_or_else(|| WrapError::UnknownType(n.clone()))?;
                self.wrap(WrapperKind::NonNull, &inner)
            }
            Type::NonNullList(inner) => {
                let list = self.make_type(&Type::List(inner.clone()))?;
                self.wrap(WrapperKind::NonNull, &list)
            }
        }
    }

    /// The concrete object types an abstract type may resolve to.
    ///
    /// # Panics
    ///
    /// If `t` is not an interface or union.
    pub fn possible_types(&self, t: &NamedType) -> Vec<&NamedType> {
        match &t.kind {
            NamedTypeKind::Union { member_names } => member_names
                .iter()
                .filter_map(|n| self.concrete_type_by_name(n))
                .collect(),
            NamedTypeKind::Interface { possible_types, .. } => possible_types
                .iter()
                .map(|&idx| &*self.types[idx])
                .collect(),
            _ => panic!("can't retrieve possible types of a non-abstract type"),
        }
    }

    /// Whether `possible_type` is one of `abstract_type`'s possible types.
    pub fn is_possible_type(&self, abstract_type: &NamedType, possible_type: &NamedType) -> bool {
        self.possible_types(abstract_type)
            .iter()
            .any(|t| t.name == possible_type.name)
    }

    /// Whether two composite types can overlap at runtime.
    pub fn type_overlap(&self, t1: &NamedType, t2: &NamedType) -> bool {
        if t1.name == t2.name {
            return true;
        }

        match (t1.is_abstract(), t2.is_abstract()) {
            (true, true) => self
                .possible_types(t1)
                .iter()
                .any(|t| self.is_possible_type(t2, t)),
            (true, false) => self.is_possible_type(t1, t2),
            (false, true) => self.is_possible_type(t2, t1),
            (false, false) => false,
        }
    }

    /// Whether `sub_type` may be used where `super_type` is expected.
    pub fn is_subtype(&self, sub_type: &Type, super_type: &Type) -> bool {
        use crate::ast::Type::{List, Named, NonNullList, NonNullNamed};

        if super_type == sub_type {
            return true;
        }

        match (super_type, sub_type) {
            (NonNullNamed(super_name), NonNullNamed(sub_name))
            | (Named(super_name), Named(sub_name) | NonNullNamed(sub_name)) => {
                self.is_named_subtype(sub_name, super_name)
            }
            (NonNullList(super_inner), NonNullList(sub_inner))
            | (List(super_inner), List(sub_inner) | NonNullList(sub_inner)) => {
                self.is_subtype(sub_inner, super_inner)
            }
            _ => false,
        }
    }

    /// Whether the named `sub_type_name` may substitute for
    /// `super_type_name`.
    pub fn is_named_subtype(&self, sub_type_name: &str, super_type_name: &str) -> bool {
        if sub_type_name == super_type_name {
            true
        } else if let (Some(sub_type), Some(super_type)) = (
            self.concrete_type_by_name(sub_type_name),
            self.concrete_type_by_name(super_type_name),
        ) {
            super_type.is_abstract() && self.is_possible_type(super_type, sub_type)
        } else {
            false
        }
    }
}

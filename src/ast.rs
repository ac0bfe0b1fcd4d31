//! Syntax tree for executable and type-system documents.
//!
//! The tree is fully owned: nodes own their names and literals, and selection
//! sets and fragment definitions are reference-counted so operation data and
//! subscription registrations can retain the parts they need for as long as
//! resolver futures are in flight.

use std::{fmt, sync::Arc};

use crate::parser::Spanning;

/// A type literal in a syntax tree.
///
/// Carries no semantic information and might refer to types that don't exist.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// A nullable named type, e.g. `String`.
    Named(String),

    /// A nullable list type, e.g. `[String]`.
    ///
    /// The list itself is what's nullable, the containing type might be
    /// non-null.
    List(Box<Type>),

    /// A non-null named type, e.g. `String!`.
    NonNullNamed(String),

    /// A non-null list type, e.g. `[String]!`.
    NonNullList(Box<Type>),
}

impl Type {
    /// Returns the name of a named type.
    ///
    /// Only applies to named types; lists will return `None`.
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => Some(n),
            Type::List(..) | Type::NonNullList(..) => None,
        }
    }

    /// Returns the innermost name by unpacking lists.
    ///
    /// All type literals contain exactly one named type.
    pub fn innermost_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => n,
            Type::List(l) | Type::NonNullList(l) => l.innermost_name(),
        }
    }

    /// Determines if a type only can represent non-null values.
    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(..) | Type::NonNullList(..))
    }

    /// Strips the outermost non-null marker, if any.
    pub fn nullable(&self) -> Type {
        match self {
            Type::NonNullNamed(n) => Type::Named(n.clone()),
            Type::NonNullList(l) => Type::List(l.clone()),
            t => t.clone(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{n}"),
            Type::NonNullNamed(n) => write!(f, "{n}!"),
            Type::List(t) => write!(f, "[{t}]"),
            Type::NonNullList(t) => write!(f, "[{t}]!"),
        }
    }
}

/// A JSON-like value that can be passed into the query execution, either
/// out-of-band, or in-band as default variable values. These are _not_ constant
/// and might contain variables.
#[derive(Clone, Debug)]
pub enum InputValue {
    /// An explicit `null` literal.
    Null,

    /// A 32-bit integer literal.
    Int(i32),

    /// A float literal.
    Float(f64),

    /// A string literal, already unescaped.
    String(String),

    /// A `true` or `false` literal.
    Boolean(bool),

    /// An enum value literal, e.g. `EMPIRE`.
    Enum(String),

    /// A `$variable` usage.
    Variable(String),

    /// A list literal.
    List(Vec<Spanning<InputValue>>),

    /// An input object literal, fields in source order.
    Object(Vec<(Spanning<String>, Spanning<InputValue>)>),
}

impl InputValue {
    /// Shorthand for an unlocated scalar list from plain values.
    pub fn list(l: Vec<InputValue>) -> Self {
        Self::List(l.into_iter().map(Spanning::unlocated).collect())
    }

    /// Shorthand for an unlocated input object from plain pairs.
    pub fn object<K: Into<String>>(o: Vec<(K, InputValue)>) -> Self {
        Self::Object(
            o.into_iter()
                .map(|(k, v)| (Spanning::unlocated(k.into()), Spanning::unlocated(v)))
                .collect(),
        )
    }

    /// Does this value represent a `null` literal?
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Is this value a variable usage?
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(..))
    }

    /// View the underlying enum name, if present.
    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            Self::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// View the underlying string, if present.
    pub fn as_string_value(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Recursively collects all `$variable` usages in this value.
    pub fn referenced_variables(&self) -> Vec<&str> {
        match self {
            Self::Variable(name) => vec![name.as_str()],
            Self::List(l) => l
                .iter()
                .flat_map(|v| v.item.referenced_variables())
                .collect(),
            Self::Object(o) => o
                .iter()
                .flat_map(|(_, v)| v.item.referenced_variables())
                .collect(),
            _ => vec![],
        }
    }
}

/// Equality is structural and location-agnostic: nested spans never
/// participate, and object fields compare without regard to order.
impl PartialEq for InputValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Variable(a), Self::Variable(b)) => a == b,
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(a, b)| a.item == b.item)
            }
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(ak, av)| {
                        b.iter()
                            .any(|(bk, bv)| ak.item == bk.item && av.item == bv.item)
                    })
            }
            _ => false,
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Enum(v) => write!(f, "{v}"),
            Self::Variable(v) => write!(f, "${v}"),
            Self::List(v) => {
                write!(f, "[")?;
                for (i, spanning) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", spanning.item)?;
                }
                write!(f, "]")
            }
            Self::Object(o) => {
                write!(f, "{{")?;
                for (i, (k, v)) in o.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k.item, v.item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Arguments supplied on a field or directive, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct Arguments {
    #[doc(hidden)]
    pub items: Vec<(Spanning<String>, Spanning<InputValue>)>,
}

impl Arguments {
    #[doc(hidden)]
    pub fn into_iter(self) -> impl Iterator<Item = (Spanning<String>, Spanning<InputValue>)> {
        self.items.into_iter()
    }

    #[doc(hidden)]
    pub fn iter(&self) -> impl Iterator<Item = &(Spanning<String>, Spanning<InputValue>)> {
        self.items.iter()
    }

    #[doc(hidden)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[doc(hidden)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[doc(hidden)]
    pub fn get(&self, key: &str) -> Option<&Spanning<InputValue>> {
        self.items
            .iter()
            .find(|&(k, _)| k.item == key)
            .map(|(_, v)| v)
    }
}

/// A `@directive(args)` usage site.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    /// Name of the directive, without the leading `@`.
    pub name: Spanning<String>,

    /// Arguments supplied at the usage site, if any.
    pub arguments: Option<Spanning<Arguments>>,
}

#[doc(hidden)]
pub type Directives = Vec<Spanning<Directive>>;

/// A declaration of a single operation variable.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinition {
    /// The declared type of the variable.
    pub var_type: Spanning<Type>,

    /// Default value applied when the caller omits the variable.
    pub default_value: Option<Spanning<InputValue>>,

    /// Directives on the variable definition itself.
    pub directives: Option<Directives>,
}

/// The variable declarations of an operation, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct VariableDefinitions {
    #[doc(hidden)]
    pub items: Vec<(Spanning<String>, VariableDefinition)>,
}

impl VariableDefinitions {
    #[doc(hidden)]
    pub fn iter(&self) -> impl Iterator<Item = &(Spanning<String>, VariableDefinition)> {
        self.items.iter()
    }
}

/// A brace-delimited list of fields, fragment spreads, and inline fragments.
///
/// Reference-counted: selection sets are retained by resolver parameters and
/// subscription registrations after the document handle is gone.
pub type SelectionSet = Arc<Vec<Selection>>;

/// A field selection with optional alias, arguments and sub-selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// The response-map alias, if one was written.
    pub alias: Option<Spanning<String>>,

    /// The name of the field on the enclosing type.
    pub name: Spanning<String>,

    /// Arguments supplied to the field.
    pub arguments: Option<Spanning<Arguments>>,

    /// Directives on the field.
    pub directives: Option<Directives>,

    /// Sub-selection, required for composite and forbidden for leaf types.
    pub selection_set: Option<SelectionSet>,
}

impl Field {
    /// The key this field occupies in the response map: its alias, or its
    /// name when no alias was written.
    pub fn response_name(&self) -> &str {
        self.alias
            .as_ref()
            .map_or(&self.name.item, |alias| &alias.item)
    }
}

/// A `...Name` usage in a selection set.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentSpread {
    /// Name of the fragment being spread.
    pub name: Spanning<String>,

    /// Directives on the spread site.
    pub directives: Option<Directives>,
}

/// An `... on Type { … }` (or `... { … }`) usage in a selection set.
#[derive(Clone, Debug, PartialEq)]
pub struct InlineFragment {
    /// The type condition, if one was written.
    pub type_condition: Option<Spanning<String>>,

    /// Directives on the inline fragment.
    pub directives: Option<Directives>,

    /// The inlined selection.
    pub selection_set: SelectionSet,
}

/// A single entry in a selection set.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// A field selection.
    Field(Spanning<Field>),

    /// A named fragment spread.
    FragmentSpread(Spanning<FragmentSpread>),

    /// An inline fragment.
    InlineFragment(Spanning<InlineFragment>),
}

/// A named fragment definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    /// Name of the fragment; `on` is reserved.
    pub name: Spanning<String>,

    /// The type condition after `on`.
    pub type_condition: Spanning<String>,

    /// Directives on the definition site.
    pub directives: Option<Directives>,

    /// The fragment's selection.
    pub selection_set: SelectionSet,
}

/// The kind of an operation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationType {
    /// A read-only fetch.
    Query,

    /// A write followed by a fetch, with serially executed root fields.
    Mutation,

    /// A long-lived operation delivering events.
    Subscription,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        })
    }
}

/// A query, mutation, or subscription definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    /// The operation kind.
    pub operation_type: OperationType,

    /// The operation name; anonymous operations have none.
    pub name: Option<Spanning<String>>,

    /// Declared variables.
    pub variable_definitions: Option<Spanning<VariableDefinitions>>,

    /// Directives on the operation.
    pub directives: Option<Directives>,

    /// The top-level selection.
    pub selection_set: SelectionSet,
}

/// A top-level definition in a parsed document.
#[derive(Clone, Debug, PartialEq)]
pub enum Definition {
    /// An executable operation definition.
    Operation(Spanning<Operation>),

    /// An executable fragment definition.
    Fragment(Arc<Spanning<Fragment>>),

    /// A type-system definition or extension.
    TypeSystem(TypeSystemDefinition),
}

/// A parsed GraphQL document, owning its definitions.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The top-level definitions, in source order.
    pub definitions: Vec<Definition>,
}

impl Document {
    /// Iterates all operation definitions.
    pub fn operations(&self) -> impl Iterator<Item = &Spanning<Operation>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Operation(op) => Some(op),
            _ => None,
        })
    }

    /// Iterates all fragment definitions.
    pub fn fragments(&self) -> impl Iterator<Item = &Arc<Spanning<Fragment>>> {
        self.definitions.iter().filter_map(|d| match d {
            Definition::Fragment(f) => Some(f),
            _ => None,
        })
    }

    /// Looks up a fragment definition by name.
    pub fn fragment_by_name(&self, name: &str) -> Option<&Arc<Spanning<Fragment>>> {
        self.fragments().find(|f| f.item.name.item == name)
    }

    /// Whether the document contains any type-system definitions.
    pub fn has_type_system_definitions(&self) -> bool {
        self.definitions
            .iter()
            .any(|d| matches!(d, Definition::TypeSystem(..)))
    }
}

/// A type-system definition or extension in a schema document.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSystemDefinition {
    /// The `schema { … }` operation-type bindings.
    Schema(Spanning<SchemaDefinition>),

    /// A named type definition.
    Type(Spanning<TypeDefinition>),

    /// A `directive @name on …` definition.
    Directive(Spanning<DirectiveDefinition>),

    /// An `extend schema` definition.
    SchemaExtension(Spanning<SchemaDefinition>),

    /// An `extend <kind> Name` definition; the payload carries only the
    /// extending members.
    TypeExtension(Spanning<TypeDefinition>),
}

/// The `schema { query: …, mutation: …, subscription: … }` definition.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDefinition {
    /// Leading description, if any.
    pub description: Option<Spanning<String>>,

    /// Directives on the schema definition.
    pub directives: Option<Directives>,

    /// The root operation type bindings.
    pub operation_types: Vec<Spanning<RootOperationTypeDefinition>>,
}

/// One `query: TypeName` style binding inside a schema definition.
#[derive(Clone, Debug, PartialEq)]
pub struct RootOperationTypeDefinition {
    /// Which operation this binds.
    pub operation_type: OperationType,

    /// The bound object type name.
    pub type_name: Spanning<String>,
}

/// A named type definition in a schema document.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDefinition {
    /// A `scalar Name` definition.
    Scalar(ScalarTypeDefinition),

    /// A `type Name { … }` definition.
    Object(ObjectTypeDefinition),

    /// An `interface Name { … }` definition.
    Interface(InterfaceTypeDefinition),

    /// A `union Name = A | B` definition.
    Union(UnionTypeDefinition),

    /// An `enum Name { … }` definition.
    Enum(EnumTypeDefinition),

    /// An `input Name { … }` definition.
    InputObject(InputObjectTypeDefinition),
}

impl TypeDefinition {
    /// The defined type's name.
    pub fn name(&self) -> &Spanning<String> {
        match self {
            Self::Scalar(d) => &d.name,
            Self::Object(d) => &d.name,
            Self::Interface(d) => &d.name,
            Self::Union(d) => &d.name,
            Self::Enum(d) => &d.name,
            Self::InputObject(d) => &d.name,
        }
    }
}

/// A custom scalar definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarTypeDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub directives: Option<Directives>,
}

/// An object type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectTypeDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    /// Names after `implements`, in source order.
    pub interfaces: Vec<Spanning<String>>,
    pub directives: Option<Directives>,
    pub fields: Vec<Spanning<FieldDefinition>>,
}

/// An interface type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceTypeDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    /// Names after `implements`, in source order.
    pub interfaces: Vec<Spanning<String>>,
    pub directives: Option<Directives>,
    pub fields: Vec<Spanning<FieldDefinition>>,
}

/// A union type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct UnionTypeDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub directives: Option<Directives>,
    /// The member object type names.
    pub members: Vec<Spanning<String>>,
}

/// An enum type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumTypeDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub directives: Option<Directives>,
    pub values: Vec<Spanning<EnumValueDefinition>>,
}

/// A single value inside an enum definition.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumValueDefinition {
    pub description: Option<Spanning<String>>,
    /// The value name; `true`, `false` and `null` are reserved.
    pub name: Spanning<String>,
    pub directives: Option<Directives>,
}

/// An input object type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct InputObjectTypeDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub directives: Option<Directives>,
    pub fields: Vec<Spanning<InputValueDefinition>>,
}

/// A field on an object or interface definition.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub arguments: Vec<Spanning<InputValueDefinition>>,
    pub field_type: Spanning<Type>,
    pub directives: Option<Directives>,
}

/// An argument or input-object field declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct InputValueDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub value_type: Spanning<Type>,
    pub default_value: Option<Spanning<InputValue>>,
    pub directives: Option<Directives>,
}

/// A `directive @name(args) repeatable on LOCATIONS` definition.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectiveDefinition {
    pub description: Option<Spanning<String>>,
    pub name: Spanning<String>,
    pub arguments: Vec<Spanning<InputValueDefinition>>,
    /// Whether the directive may appear more than once per site.
    pub repeatable: bool,
    /// The declared location names, e.g. `FIELD`.
    pub locations: Vec<Spanning<String>>,
}

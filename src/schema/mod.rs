//! The schema model and its builder.

pub mod builder;
pub mod model;

pub use self::builder::{SchemaBuilder, SchemaViolation};
pub use self::model::{
    Argument, DeprecationStatus, DirectiveLocation, DirectiveType, EnumValue, Field, NamedType,
    NamedTypeKind, Schema, TypeKind, TypeRef, WrapError, WrapperKind, WrapperType,
};

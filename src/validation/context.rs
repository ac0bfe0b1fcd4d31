use std::{collections::HashSet, fmt};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{
    ast::{Definition, Document, Type},
    parser::SourcePosition,
    schema::{NamedType, Schema},
};

/// A structural violation found while validating a request against a schema.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RuleError {
    locations: Vec<SourcePosition>,
    message: String,
}

impl RuleError {
    #[doc(hidden)]
    pub fn new(message: &str, locations: &[SourcePosition]) -> Self {
        Self {
            message: message.into(),
            locations: locations.to_vec(),
        }
    }

    /// The message of this validation error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The source positions of this validation error.
    ///
    /// All validation errors contain at least one source position; some rules
    /// supply extra context through multiple positions.
    pub fn locations(&self) -> &[SourcePosition] {
        &self.locations
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // All `RuleError`s carry at least one source position.
        let locations = self
            .locations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}. At {locations}", self.message)
    }
}

impl std::error::Error for RuleError {}

impl Serialize for RuleError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Location {
            line: usize,
            column: usize,
        }

        struct Locations<'a>(&'a [SourcePosition]);

        impl Serialize for Locations<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
                for pos in self.0 {
                    seq.serialize_element(&Location {
                        line: pos.line() + 1,
                        column: pos.column() + 1,
                    })?;
                }
                seq.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("message", &self.message)?;
        map.serialize_entry("locations", &Locations(&self.locations))?;
        map.end()
    }
}

#[doc(hidden)]
pub struct ValidatorContext<'a> {
    pub schema: &'a Schema,
    errors: Vec<RuleError>,
    type_stack: Vec<Option<&'a NamedType>>,
    type_literal_stack: Vec<Option<Type>>,
    parent_type_stack: Vec<Option<&'a NamedType>>,
    input_type_stack: Vec<Option<&'a NamedType>>,
    input_type_literal_stack: Vec<Option<Type>>,
    fragment_names: HashSet<&'a str>,
}

impl<'a> ValidatorContext<'a> {
    #[doc(hidden)]
    pub fn new(schema: &'a Schema, document: &'a Document) -> Self {
        Self {
            errors: Vec::new(),
            schema,
            type_stack: Vec::new(),
            type_literal_stack: Vec::new(),
            parent_type_stack: Vec::new(),
            input_type_stack: Vec::new(),
            input_type_literal_stack: Vec::new(),
            fragment_names: document
                .definitions
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(frag) => Some(frag.item.name.item.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    #[doc(hidden)]
    pub fn append_errors(&mut self, mut errors: Vec<RuleError>) {
        self.errors.append(&mut errors);
    }

    #[doc(hidden)]
    pub fn report_error(&mut self, message: &str, locations: &[SourcePosition]) {
        self.errors.push(RuleError::new(message, locations));
    }

    #[doc(hidden)]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[doc(hidden)]
    pub fn into_errors(mut self) -> Vec<RuleError> {
        self.errors.sort();
        self.errors
    }

    #[doc(hidden)]
    pub fn with_pushed_type<F, R>(&mut self, t: Option<&Type>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        if let Some(t) = t {
            self.type_stack
                .push(self.schema.concrete_type_by_name(t.innermost_name()));
        } else {
            self.type_stack.push(None);
        }

        self.type_literal_stack.push(t.cloned());

        let res = f(self);

        self.type_literal_stack.pop();
        self.type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_parent_type<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        self.parent_type_stack
            .push(*self.type_stack.last().unwrap_or(&None));
        let res = f(self);
        self.parent_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn with_pushed_input_type<F, R>(&mut self, t: Option<&Type>, f: F) -> R
    where
        F: FnOnce(&mut ValidatorContext<'a>) -> R,
    {
        if let Some(t) = t {
            self.input_type_stack
                .push(self.schema.concrete_type_by_name(t.innermost_name()));
        } else {
            self.input_type_stack.push(None);
        }

        self.input_type_literal_stack.push(t.cloned());

        let res = f(self);

        self.input_type_literal_stack.pop();
        self.input_type_stack.pop();

        res
    }

    #[doc(hidden)]
    pub fn current_type(&self) -> Option<&'a NamedType> {
        *self.type_stack.last().unwrap_or(&None)
    }

    #[doc(hidden)]
    pub fn current_type_literal(&self) -> Option<&Type> {
        match self.type_literal_stack.last() {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    #[doc(hidden)]
    pub fn parent_type(&self) -> Option<&'a NamedType> {
        *self.parent_type_stack.last().unwrap_or(&None)
    }

    #[doc(hidden)]
    pub fn current_input_type(&self) -> Option<&'a NamedType> {
        *self.input_type_stack.last().unwrap_or(&None)
    }

    #[doc(hidden)]
    pub fn current_input_type_literal(&self) -> Option<&Type> {
        match self.input_type_literal_stack.last() {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    #[doc(hidden)]
    pub fn is_known_fragment(&self, name: &str) -> bool {
        self.fragment_names.contains(name)
    }
}

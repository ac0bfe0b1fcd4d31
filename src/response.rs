//! The serializable response wrapper producing the wire shape.

use serde::ser::{self, SerializeMap, SerializeSeq};

use crate::{
    GraphQLError,
    executor::{ExecutionError, ExecutionOutput},
    value::Value,
};

/// The simple response type expected by callers serializing to the wire.
///
/// Success serializes to `{"data": …}` with an `"errors"` list appended when
/// field errors accumulated; a failed request serializes to `{"errors": …}`
/// alone.
#[derive(Debug)]
pub struct GraphQLResponse(Result<(Value, Vec<ExecutionError>), GraphQLError>);

impl GraphQLResponse {
    /// Wraps an execution outcome.
    pub fn from_result(r: Result<ExecutionOutput, GraphQLError>) -> Self {
        Self(r.map(|output| (output.data, output.errors)))
    }

    /// Constructs an error response outside execution.
    pub fn error(error: GraphQLError) -> Self {
        Self(Err(error))
    }

    /// Was the request executed at all?
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }
}

impl From<Result<ExecutionOutput, GraphQLError>> for GraphQLResponse {
    fn from(r: Result<ExecutionOutput, GraphQLError>) -> Self {
        Self::from_result(r)
    }
}

impl ser::Serialize for GraphQLResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match &self.0 {
            Ok((res, err)) => {
                let mut map = serializer.serialize_map(None)?;

                map.serialize_key("data")?;
                map.serialize_value(res)?;

                if !err.is_empty() {
                    map.serialize_key("errors")?;
                    map.serialize_value(err)?;
                }

                map.end()
            }
            Err(err) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_key("errors")?;
                map.serialize_value(&SerializableError(err))?;
                map.end()
            }
        }
    }
}

/// Renders a request-level error as a one-element (or, for validation, an
/// n-element) error list.
struct SerializableError<'a>(&'a GraphQLError);

impl ser::Serialize for SerializableError<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        #[derive(serde::Serialize)]
        struct Location {
            line: usize,
            column: usize,
        }

        match self.0 {
            GraphQLError::ValidationError(errors) => {
                let mut seq = serializer.serialize_seq(Some(errors.len()))?;
                for error in errors {
                    seq.serialize_element(error)?;
                }
                seq.end()
            }
            GraphQLError::ParseError(error) => {
                let mut seq = serializer.serialize_seq(Some(1))?;

                struct Entry<'a>(&'a crate::parser::Spanning<crate::parser::ParseError>);

                impl ser::Serialize for Entry<'_> {
                    fn serialize<S: ser::Serializer>(
                        &self,
                        serializer: S,
                    ) -> Result<S::Ok, S::Error> {
                        let mut map = serializer.serialize_map(Some(2))?;
                        map.serialize_entry("message", &self.0.item.to_string())?;
                        map.serialize_entry(
                            "locations",
                            &[Location {
                                line: self.0.span.start.line() + 1,
                                column: self.0.span.start.column() + 1,
                            }],
                        )?;
                        map.end()
                    }
                }

                seq.serialize_element(&Entry(error))?;
                seq.end()
            }
            other => {
                let mut seq = serializer.serialize_seq(Some(1))?;

                struct Message(String);

                impl ser::Serialize for Message {
                    fn serialize<S: ser::Serializer>(
                        &self,
                        serializer: S,
                    ) -> Result<S::Ok, S::Error> {
                        let mut map = serializer.serialize_map(Some(1))?;
                        map.serialize_entry("message", &self.0)?;
                        map.end()
                    }
                }

                seq.serialize_element(&Message(other.to_string()))?;
                seq.end()
            }
        }
    }
}

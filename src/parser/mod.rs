//! Parse the GraphQL October 2021 grammar into a syntax tree.

mod document;
mod lexer;
#[allow(clippy::module_inception, reason = "`parser::parser` is intended")]
mod parser;
mod schema_document;
mod utils;
mod value;

#[cfg(test)]
mod tests;

use crate::ast::Document;

pub use self::document::DocumentMode;
pub use self::lexer::{Lexer, LexerError, Token};
pub use self::parser::{DEFAULT_DEPTH_LIMIT, ParseError};
pub use self::utils::{SourcePosition, Span, Spanning};

pub(crate) use self::document::parse_document_source;
pub(crate) use self::parser::{
    OptionParseResult, ParseResult, Parser, UnlocatedParseResult,
};

/// Parses an executable document: operation and fragment definitions only.
///
/// A source that fails here because it leads with a type-system definition
/// can be retried with [`parse_mixed`] so validation can produce a precise
/// error instead of a parse error.
pub fn parse_executable(s: &str) -> Result<Document, Spanning<ParseError>> {
    parse_executable_with_limit(s, DEFAULT_DEPTH_LIMIT)
}

/// Same as [`parse_executable`] with a caller-supplied selection-set depth
/// limit.
pub fn parse_executable_with_limit(
    s: &str,
    depth_limit: usize,
) -> Result<Document, Spanning<ParseError>> {
    parse_document_source(s, DocumentMode::Executable, depth_limit)
}

/// Parses a schema document: type-system definitions and extensions only.
pub fn parse_schema(s: &str) -> Result<Document, Spanning<ParseError>> {
    parse_schema_with_limit(s, DEFAULT_DEPTH_LIMIT)
}

/// Same as [`parse_schema`] with a caller-supplied selection-set depth limit.
pub fn parse_schema_with_limit(
    s: &str,
    depth_limit: usize,
) -> Result<Document, Spanning<ParseError>> {
    parse_document_source(s, DocumentMode::Schema, depth_limit)
}

/// Parses a document mixing both dialects freely.
pub fn parse_mixed(s: &str) -> Result<Document, Spanning<ParseError>> {
    parse_mixed_with_limit(s, DEFAULT_DEPTH_LIMIT)
}

/// Same as [`parse_mixed`] with a caller-supplied selection-set depth limit.
pub fn parse_mixed_with_limit(
    s: &str,
    depth_limit: usize,
) -> Result<Document, Spanning<ParseError>> {
    parse_document_source(s, DocumentMode::Mixed, depth_limit)
}

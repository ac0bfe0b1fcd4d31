use std::fmt;

use compact_str::{CompactString, format_compact};
use derive_more::with_trait::{Display, Error};

use crate::parser::{Lexer, LexerError, Spanning, Token};

/// Default limit on nested selection sets, generous but finite.
pub const DEFAULT_DEPTH_LIMIT: usize = 128;

/// Error while parsing a GraphQL document.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// An unexpected token occurred in the source.
    #[display("Unexpected \"{_0}\"")]
    UnexpectedToken(#[error(not(source))] CompactString),

    /// The input source abruptly ended.
    #[display("Unexpected end of input")]
    UnexpectedEndOfFile,

    /// An error during tokenization occurred.
    LexerError(LexerError),

    /// Entering another selection set would exceed the configured nesting
    /// limit.
    #[display("Exceeded the selection set depth limit of {_0}")]
    SelectionDepthExceeded(#[error(not(source))] usize),

    /// A reserved name occurred where it is disallowed, e.g. a fragment named
    /// `on` or an enum value named `null`.
    #[display("Unexpected reserved name \"{_0}\"")]
    ReservedName(#[error(not(source))] CompactString),
}

impl ParseError {
    /// Creates a [`ParseError::UnexpectedToken`] out of the provided [`Token`].
    #[must_use]
    pub fn unexpected_token(token: Token<'_>) -> Self {
        Self::UnexpectedToken(format_compact!("{token}"))
    }
}

#[doc(hidden)]
pub type ParseResult<T> = Result<Spanning<T>, Spanning<ParseError>>;

#[doc(hidden)]
pub type UnlocatedParseResult<T> = Result<T, Spanning<ParseError>>;

#[doc(hidden)]
pub type OptionParseResult<T> = Result<Option<Spanning<T>>, Spanning<ParseError>>;

#[doc(hidden)]
#[derive(Debug)]
pub struct Parser<'a> {
    tokens: Vec<Spanning<Token<'a>>>,
    depth: usize,
    depth_limit: usize,
}

impl<'a> Parser<'a> {
    #[doc(hidden)]
    pub fn new(lexer: &mut Lexer<'a>, depth_limit: usize) -> Result<Self, Spanning<LexerError>> {
        let mut tokens = Vec::new();

        for res in lexer {
            match res {
                Ok(s) => tokens.push(s),
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            tokens,
            depth: 0,
            depth_limit,
        })
    }

    #[doc(hidden)]
    pub fn peek(&self) -> &Spanning<Token<'a>> {
        &self.tokens[0]
    }

    #[doc(hidden)]
    pub fn next_token(&mut self) -> ParseResult<Token<'a>> {
        if self.tokens.len() == 1 {
            Err(Spanning::new(
                self.peek().span,
                ParseError::UnexpectedEndOfFile,
            ))
        } else {
            Ok(self.tokens.remove(0))
        }
    }

    #[doc(hidden)]
    pub fn expect(&mut self, expected: &Token<'_>) -> ParseResult<Token<'a>> {
        if &self.peek().item != expected {
            Err(self.next_token()?.map(ParseError::unexpected_token))
        } else {
            self.next_token()
        }
    }

    #[doc(hidden)]
    pub fn skip(
        &mut self,
        expected: &Token<'_>,
    ) -> Result<Option<Spanning<Token<'a>>>, Spanning<ParseError>> {
        if &self.peek().item == expected {
            Ok(Some(self.next_token()?))
        } else if self.peek().item == Token::EndOfFile {
            Err(Spanning::zero_width(
                &self.peek().span.start,
                ParseError::UnexpectedEndOfFile,
            ))
        } else {
            Ok(None)
        }
    }

    /// Runs `f` inside one more level of selection set nesting, failing when
    /// the configured depth limit would be exceeded.
    #[doc(hidden)]
    pub fn with_nested_selection<T, F>(&mut self, f: F) -> ParseResult<T>
    where
        F: FnOnce(&mut Parser<'a>) -> ParseResult<T>,
    {
        if self.depth >= self.depth_limit {
            return Err(Spanning::zero_width(
                &self.peek().span.start,
                ParseError::SelectionDepthExceeded(self.depth_limit),
            ));
        }

        self.depth += 1;
        let res = f(self);
        self.depth -= 1;

        res
    }

    #[doc(hidden)]
    pub fn delimited_list<T, F>(
        &mut self,
        opening: &Token<'_>,
        parser: F,
        closing: &Token<'_>,
    ) -> ParseResult<Vec<Spanning<T>>>
    where
        T: fmt::Debug,
        F: Fn(&mut Parser<'a>) -> ParseResult<T>,
    {
        let Spanning { span, .. } = self.expect(opening)?;
        let start_pos = span.start;
        let mut items = Vec::new();

        loop {
            if let Some(Spanning { span, .. }) = self.skip(closing)? {
                return Ok(Spanning::start_end(&start_pos, &span.end, items));
            }

            items.push(parser(self)?);
        }
    }

    #[doc(hidden)]
    pub fn delimited_nonempty_list<T, F>(
        &mut self,
        opening: &Token<'_>,
        parser: F,
        closing: &Token<'_>,
    ) -> ParseResult<Vec<Spanning<T>>>
    where
        T: fmt::Debug,
        F: Fn(&mut Parser<'a>) -> ParseResult<T>,
    {
        let Spanning { span, .. } = self.expect(opening)?;
        let start_pos = span.start;
        let mut items = Vec::new();

        loop {
            items.push(parser(self)?);

            if let Some(end_spanning) = self.skip(closing)? {
                return Ok(Spanning::start_end(&start_pos, end_spanning.end(), items));
            }
        }
    }

    #[doc(hidden)]
    pub fn unlocated_delimited_nonempty_list<T, F>(
        &mut self,
        opening: &Token<'_>,
        parser: F,
        closing: &Token<'_>,
    ) -> ParseResult<Vec<T>>
    where
        T: fmt::Debug,
        F: Fn(&mut Parser<'a>) -> UnlocatedParseResult<T>,
    {
        let Spanning { span, .. } = self.expect(opening)?;
        let start_pos = span.start;
        let mut items = Vec::new();

        loop {
            items.push(parser(self)?);

            if let Some(end_spanning) = self.skip(closing)? {
                return Ok(Spanning::start_end(&start_pos, end_spanning.end(), items));
            }
        }
    }

    #[doc(hidden)]
    pub fn expect_name(&mut self) -> ParseResult<&'a str> {
        match *self.peek() {
            Spanning {
                item: Token::Name(_),
                ..
            } => Ok(self.next_token()?.map(|token| {
                if let Token::Name(name) = token {
                    name
                } else {
                    panic!("internal parse error in `expect_name`");
                }
            })),
            Spanning {
                item: Token::EndOfFile,
                ..
            } => Err(Spanning::new(
                self.peek().span,
                ParseError::UnexpectedEndOfFile,
            )),
            _ => Err(self.next_token()?.map(ParseError::unexpected_token)),
        }
    }

    /// Whether the next token is the given keyword name.
    #[doc(hidden)]
    pub fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek().item, Token::Name(n) if n == keyword)
    }

    /// Consumes the next token if it is the given keyword name.
    #[doc(hidden)]
    pub fn skip_keyword(&mut self, keyword: &str) -> Result<Option<Spanning<Token<'a>>>, Spanning<ParseError>> {
        if self.peek_keyword(keyword) {
            Ok(Some(self.next_token()?))
        } else {
            Ok(None)
        }
    }
}

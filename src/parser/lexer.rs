use std::{char, fmt, iter::Peekable, str::CharIndices};

use derive_more::with_trait::{Display, Error};

use crate::parser::{SourcePosition, Spanning};

#[doc(hidden)]
#[derive(Debug)]
pub struct Lexer<'a> {
    iterator: Peekable<CharIndices<'a>>,
    source: &'a str,
    position: SourcePosition,
    has_reached_eof: bool,
}

/// A single token in the input source.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs, reason = "self-explanatory")]
pub enum Token<'a> {
    Name(&'a str),
    Int(i32),
    Float(f64),
    String(String),
    BlockString(String),
    ExclamationMark,
    Dollar,
    Ampersand,
    ParenOpen,
    ParenClose,
    BracketOpen,
    BracketClose,
    CurlyOpen,
    CurlyClose,
    Ellipsis,
    Colon,
    Equals,
    At,
    Pipe,
    EndOfFile,
}

/// Error while tokenizing the input source.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum LexerError {
    /// A character not appearing anywhere in the GraphQL language, such as
    /// `?` or `%`, was found.
    #[display("Unknown character \"{_0}\"")]
    UnknownCharacter(#[error(not(source))] char),

    /// A character that does exist in the GraphQL language was found where it
    /// isn't expected.
    #[display("Unexpected character \"{_0}\"")]
    UnexpectedCharacter(#[error(not(source))] char),

    /// A string literal misses its terminating `"`, contains a raw line
    /// break, or ends inside an escape sequence.
    #[display("Unterminated string literal")]
    UnterminatedString,

    /// A block string literal misses its terminating `"""`.
    #[display("Unterminated block string literal")]
    UnterminatedBlockString,

    /// An invalid source character was found inside a string literal, such as
    /// an ASCII control character.
    #[display("Unknown character \"{_0}\" in string literal")]
    UnknownCharacterInString(#[error(not(source))] char),

    /// Only a limited set of escape sequences is supported; emitted when e.g.
    /// `"\l"` is scanned.
    #[display("Unknown escape sequence \"{_0}\" in string")]
    UnknownEscapeSequence(#[error(not(source))] String),

    /// A `\uXXXX` escape doesn't name a valid Unicode code point, including a
    /// lone surrogate half.
    #[display("Invalid unicode code point in escape sequence \"{_0}\"")]
    InvalidUnicodeEscape(#[error(not(source))] String),

    /// The current token requires a succeeding character, but the source has
    /// reached EOF; emitted when scanning e.g. `"1."`.
    #[display("Unexpected end of input")]
    UnexpectedEndOfFile,

    /// An invalid number literal was found.
    #[display("Invalid number literal")]
    InvalidNumber,
}

pub type LexerResult<'a> = Result<Spanning<Token<'a>>, Spanning<LexerError>>;

impl<'a> Lexer<'a> {
    #[doc(hidden)]
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            iterator: source.char_indices().peekable(),
            source,
            position: SourcePosition::new_origin(),
            has_reached_eof: false,
        };

        // A leading UTF-8 BOM is an ignored token.
        if let Some((_, '\u{feff}')) = lexer.peek_char() {
            lexer.next_char();
        }

        lexer
    }

    fn peek_char(&mut self) -> Option<(usize, char)> {
        self.iterator.peek().copied()
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        let next = self.iterator.next();

        if let Some((_, ch)) = next {
            if ch == '\n' {
                self.position.advance_line();
            } else {
                self.position.advance_col();
            }
        }

        next
    }

    fn emit_single_char(&mut self, t: Token<'a>) -> Spanning<Token<'a>> {
        let start_pos = self.position;

        self.next_char()
            .expect("internal error in lexer: `emit_single_char()` reached EOF");

        Spanning::single_width(&start_pos, t)
    }

    fn scan_over_whitespace(&mut self) {
        while let Some((_, ch)) = self.peek_char() {
            if ch == '\t' || ch == ' ' || ch == '\n' || ch == '\r' || ch == ',' || ch == '\u{feff}'
            {
                self.next_char();
            } else if ch == '#' {
                self.next_char();

                while let Some((_, ch)) = self.peek_char() {
                    if ch == '\n' || ch == '\r' {
                        break;
                    }
                    self.next_char();
                }
            } else {
                break;
            }
        }
    }

    fn scan_ellipsis(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;

        for _ in 0..3 {
            let (_, ch) = self.next_char().ok_or_else(|| {
                Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
            })?;
            if ch != '.' {
                return Err(Spanning::zero_width(
                    &start_pos,
                    LexerError::UnexpectedCharacter('.'),
                ));
            }
        }

        Ok(Spanning::start_end(
            &start_pos,
            &self.position,
            Token::Ellipsis,
        ))
    }

    fn scan_name(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        let (start_idx, start_ch) = self.next_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;
        debug_assert!(is_name_start(start_ch));

        let mut end_idx = start_idx;

        while let Some((idx, ch)) = self.peek_char() {
            if is_name_cont(ch) {
                self.next_char();
                end_idx = idx;
            } else {
                break;
            }
        }

        Ok(Spanning::start_end(
            &start_pos,
            &self.position,
            Token::Name(&self.source[start_idx..=end_idx]),
        ))
    }

    fn scan_string(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        let (_, start_ch) = self.next_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;
        debug_assert!(start_ch == '"');

        if let Some((_, '"')) = self.peek_char() {
            self.next_char();

            if let Some((_, '"')) = self.peek_char() {
                self.next_char();
                return self.scan_block_string(&start_pos);
            }

            // An empty string literal: the second `"` terminated it.
            return Ok(Spanning::start_end(
                &start_pos,
                &self.position,
                Token::String(String::new()),
            ));
        }

        let mut acc = String::new();

        while let Some((_, ch)) = self.peek_char() {
            if ch == '"' {
                self.next_char();
                return Ok(Spanning::start_end(
                    &start_pos,
                    &self.position,
                    Token::String(acc),
                ));
            } else if ch == '\\' {
                self.next_char();

                match self.peek_char() {
                    Some((_, '"')) => {
                        self.next_char();
                        acc.push('"');
                    }
                    Some((_, '\\')) => {
                        self.next_char();
                        acc.push('\\');
                    }
                    Some((_, '/')) => {
                        self.next_char();
                        acc.push('/');
                    }
                    Some((_, 'b')) => {
                        self.next_char();
                        acc.push('\u{0008}');
                    }
                    Some((_, 'f')) => {
                        self.next_char();
                        acc.push('\u{000c}');
                    }
                    Some((_, 'n')) => {
                        self.next_char();
                        acc.push('\n');
                    }
                    Some((_, 'r')) => {
                        self.next_char();
                        acc.push('\r');
                    }
                    Some((_, 't')) => {
                        self.next_char();
                        acc.push('\t');
                    }
                    Some((_, 'u')) => {
                        let escape_pos = self.position;
                        self.next_char();
                        acc.push(self.scan_escaped_unicode(&escape_pos)?);
                    }
                    Some((_, ch)) => {
                        let mut s = String::from("\\");
                        s.push(ch);

                        return Err(Spanning::zero_width(
                            &self.position,
                            LexerError::UnknownEscapeSequence(s),
                        ));
                    }
                    None => {
                        return Err(Spanning::zero_width(
                            &self.position,
                            LexerError::UnterminatedString,
                        ));
                    }
                }
            } else if ch == '\n' || ch == '\r' {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnterminatedString,
                ));
            } else if !is_source_char(ch) {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnknownCharacterInString(ch),
                ));
            } else {
                self.next_char();
                acc.push(ch);
            }
        }

        Err(Spanning::zero_width(
            &self.position,
            LexerError::UnterminatedString,
        ))
    }

    /// Scans the remainder of a `"""` block string; the opening quotes have
    /// already been consumed.
    fn scan_block_string(&mut self, start_pos: &SourcePosition) -> LexerResult<'a> {
        let mut raw = String::new();

        loop {
            let Some((_, ch)) = self.peek_char() else {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnterminatedBlockString,
                ));
            };

            if ch == '"' {
                let quotes = self.count_quotes();
                if quotes >= 3 {
                    // The first three quotes terminate; any preceding ones
                    // were literal content.
                    for _ in 0..quotes - 3 {
                        raw.push('"');
                    }
                    return Ok(Spanning::start_end(
                        start_pos,
                        &self.position,
                        Token::BlockString(strip_block_indent(&raw)),
                    ));
                }
                for _ in 0..quotes {
                    raw.push('"');
                }
            } else if ch == '\\' {
                self.next_char();
                // Only `\"""` is an escape inside block strings.
                if self.peek_quotes(3) {
                    self.next_char();
                    self.next_char();
                    self.next_char();
                    raw.push_str("\"\"\"");
                } else {
                    raw.push('\\');
                }
            } else if !is_source_char(ch) {
                return Err(Spanning::zero_width(
                    &self.position,
                    LexerError::UnknownCharacterInString(ch),
                ));
            } else {
                self.next_char();
                raw.push(ch);
            }
        }
    }

    /// Consumes a run of consecutive `"` characters and returns its length.
    fn count_quotes(&mut self) -> usize {
        let mut n = 0;
        while let Some((_, '"')) = self.peek_char() {
            self.next_char();
            n += 1;
        }
        n
    }

    /// Whether the next `n` characters are all `"`, without consuming them.
    fn peek_quotes(&mut self, n: usize) -> bool {
        let mut probe = self.iterator.clone();
        for _ in 0..n {
            match probe.next() {
                Some((_, '"')) => {}
                _ => return false,
            }
        }
        true
    }

    fn scan_escaped_unicode(
        &mut self,
        start_pos: &SourcePosition,
    ) -> Result<char, Spanning<LexerError>> {
        let unit = self.scan_code_unit(start_pos)?;

        // Consecutive `\uXXXX` escapes in the surrogate range combine into a
        // single code point.
        if (0xd800..=0xdbff).contains(&unit) {
            let followed_by_escape = {
                let mut probe = self.iterator.clone();
                matches!(
                    (probe.next(), probe.next()),
                    (Some((_, '\\')), Some((_, 'u')))
                )
            };

            if followed_by_escape {
                self.next_char();
                self.next_char();
                let low = self.scan_code_unit(start_pos)?;
                if (0xdc00..=0xdfff).contains(&low) {
                    let c = 0x10000 + ((unit - 0xd800) << 10) + (low - 0xdc00);
                    return char::from_u32(c).ok_or_else(|| {
                        Spanning::zero_width(
                            start_pos,
                            LexerError::InvalidUnicodeEscape(format!("\\u{unit:04X}\\u{low:04X}")),
                        )
                    });
                }
                return Err(Spanning::zero_width(
                    start_pos,
                    LexerError::InvalidUnicodeEscape(format!("\\u{unit:04X}\\u{low:04X}")),
                ));
            }

            return Err(Spanning::zero_width(
                start_pos,
                LexerError::InvalidUnicodeEscape(format!("\\u{unit:04X}")),
            ));
        }

        char::from_u32(unit).ok_or_else(|| {
            Spanning::zero_width(
                start_pos,
                LexerError::InvalidUnicodeEscape(format!("\\u{unit:04X}")),
            )
        })
    }

    /// Scans exactly four hex digits of a `\uXXXX` escape; `\u` has already
    /// been consumed.
    fn scan_code_unit(&mut self, start_pos: &SourcePosition) -> Result<u32, Spanning<LexerError>> {
        let mut escape = String::with_capacity(4);

        for _ in 0..4 {
            let (_, ch) = self.next_char().ok_or_else(|| {
                Spanning::zero_width(&self.position, LexerError::UnterminatedString)
            })?;

            if !ch.is_ascii_hexdigit() {
                escape.push(ch);
                return Err(Spanning::zero_width(
                    start_pos,
                    LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
                ));
            }

            escape.push(ch);
        }

        u32::from_str_radix(&escape, 16).map_err(|_| {
            Spanning::zero_width(
                start_pos,
                LexerError::UnknownEscapeSequence(format!("\\u{escape}")),
            )
        })
    }

    fn scan_number(&mut self) -> LexerResult<'a> {
        let start_pos = self.position;
        let (start_idx, init_ch) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;

        if init_ch == '-' {
            self.next_char();
        }

        let mut end_idx = self.scan_integer_digits()?;
        let mut is_float = false;

        if let Some((_, '.')) = self.peek_char() {
            self.next_char();
            is_float = true;
            end_idx = self.scan_digits()?;
        }

        if let Some((_, ch)) = self.peek_char() {
            if ch == 'e' || ch == 'E' {
                self.next_char();
                is_float = true;

                if let Some((_, ch)) = self.peek_char() {
                    if ch == '-' || ch == '+' {
                        self.next_char();
                    }
                }
                end_idx = self.scan_digits()?;
            }
        }

        // A number may not run directly into a name or another number.
        if let Some((_, ch)) = self.peek_char() {
            if is_name_start(ch) || ch == '.' || ch.is_ascii_digit() {
                return Err(Spanning::zero_width(&self.position, LexerError::InvalidNumber));
            }
        }

        let number = &self.source[start_idx..=end_idx];

        let token = if is_float {
            Token::Float(
                number
                    .parse()
                    .map_err(|_| Spanning::zero_width(&start_pos, LexerError::InvalidNumber))?,
            )
        } else {
            Token::Int(
                number
                    .parse()
                    .map_err(|_| Spanning::zero_width(&start_pos, LexerError::InvalidNumber))?,
            )
        };

        Ok(Spanning::start_end(&start_pos, &self.position, token))
    }

    /// Scans the integer part digits; rejects a leading zero followed by more
    /// digits. Returns the byte index of the last consumed digit.
    fn scan_integer_digits(&mut self) -> Result<usize, Spanning<LexerError>> {
        let (first_idx, ch) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;

        if ch == '0' {
            self.next_char();

            if let Some((_, next)) = self.peek_char() {
                if next.is_ascii_digit() {
                    return Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnexpectedCharacter(next),
                    ));
                }
            }

            Ok(first_idx)
        } else {
            self.scan_digits()
        }
    }

    /// Scans at least one digit and returns the byte index of the last one.
    fn scan_digits(&mut self) -> Result<usize, Spanning<LexerError>> {
        let (start_idx, ch) = self.peek_char().ok_or_else(|| {
            Spanning::zero_width(&self.position, LexerError::UnexpectedEndOfFile)
        })?;
        let mut end_idx = start_idx;

        if !ch.is_ascii_digit() {
            return Err(Spanning::zero_width(
                &self.position,
                LexerError::UnexpectedCharacter(ch),
            ));
        }

        while let Some((idx, ch)) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            self.next_char();
            end_idx = idx;
        }

        Ok(end_idx)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexerResult<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_reached_eof {
            return None;
        }

        self.scan_over_whitespace();

        let ch = self.iterator.peek().map(|&(_, ch)| ch);

        Some(match ch {
            Some('!') => Ok(self.emit_single_char(Token::ExclamationMark)),
            Some('$') => Ok(self.emit_single_char(Token::Dollar)),
            Some('&') => Ok(self.emit_single_char(Token::Ampersand)),
            Some('(') => Ok(self.emit_single_char(Token::ParenOpen)),
            Some(')') => Ok(self.emit_single_char(Token::ParenClose)),
            Some('[') => Ok(self.emit_single_char(Token::BracketOpen)),
            Some(']') => Ok(self.emit_single_char(Token::BracketClose)),
            Some('{') => Ok(self.emit_single_char(Token::CurlyOpen)),
            Some('}') => Ok(self.emit_single_char(Token::CurlyClose)),
            Some(':') => Ok(self.emit_single_char(Token::Colon)),
            Some('=') => Ok(self.emit_single_char(Token::Equals)),
            Some('@') => Ok(self.emit_single_char(Token::At)),
            Some('|') => Ok(self.emit_single_char(Token::Pipe)),
            Some('.') => self.scan_ellipsis(),
            Some('"') => self.scan_string(),
            Some(ch) => {
                if is_number_start(ch) {
                    self.scan_number()
                } else if is_name_start(ch) {
                    self.scan_name()
                } else {
                    Err(Spanning::zero_width(
                        &self.position,
                        LexerError::UnknownCharacter(ch),
                    ))
                }
            }
            None => {
                self.has_reached_eof = true;
                Ok(Spanning::zero_width(&self.position, Token::EndOfFile))
            }
        })
    }
}

/// Applies the block string semantics: strips the common indent of all lines
/// after the first and trims leading and trailing blank lines.
fn strip_block_indent(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();

    let common_indent = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min();

    let mut stripped: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                *line
            } else {
                let indent = common_indent.unwrap_or(0).min(line.len());
                &line[indent..]
            }
        })
        .collect();

    while stripped.first().is_some_and(|l| l.trim().is_empty()) {
        stripped.remove(0);
    }
    while stripped.last().is_some_and(|l| l.trim().is_empty()) {
        stripped.pop();
    }

    stripped.join("\n")
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(name) => write!(f, "{name}"),
            Token::Int(i) => write!(f, "{i}"),
            Token::Float(v) => write!(f, "{v}"),
            Token::String(s) | Token::BlockString(s) => {
                write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
            Token::ExclamationMark => write!(f, "!"),
            Token::Dollar => write!(f, "$"),
            Token::Ampersand => write!(f, "&"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::BracketOpen => write!(f, "["),
            Token::BracketClose => write!(f, "]"),
            Token::CurlyOpen => write!(f, "{{"),
            Token::CurlyClose => write!(f, "}}"),
            Token::Ellipsis => write!(f, "..."),
            Token::Colon => write!(f, ":"),
            Token::Equals => write!(f, "="),
            Token::At => write!(f, "@"),
            Token::Pipe => write!(f, "|"),
            Token::EndOfFile => write!(f, "End of file"),
        }
    }
}

fn is_source_char(c: char) -> bool {
    c == '\t' || c == '\n' || c == '\r' || c >= ' '
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_cont(c: char) -> bool {
    is_name_start(c) || c.is_ascii_digit()
}

fn is_number_start(c: char) -> bool {
    c == '-' || c.is_ascii_digit()
}

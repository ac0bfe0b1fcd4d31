use std::sync::Arc;

use crate::{
    ast::{
        Arguments, Definition, Directive, Directives, Document, Field, Fragment, FragmentSpread,
        InlineFragment, InputValue, Operation, OperationType, Selection, SelectionSet, Type,
        VariableDefinition, VariableDefinitions,
    },
    parser::{
        Lexer, OptionParseResult, ParseError, ParseResult, Parser, Spanning, Token,
        UnlocatedParseResult,
        schema_document::parse_type_system_definition,
        value::parse_value_literal,
    },
};

/// Which dialects a document parse accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentMode {
    /// Operation and fragment definitions only.
    Executable,

    /// Type-system definitions and extensions only.
    Schema,

    /// Either dialect, mixed freely.
    Mixed,
}

#[doc(hidden)]
pub fn parse_document_source(
    s: &str,
    mode: DocumentMode,
    depth_limit: usize,
) -> UnlocatedParseResult<Document> {
    let mut lexer = Lexer::new(s);
    let mut parser =
        Parser::new(&mut lexer, depth_limit).map_err(|s| s.map(ParseError::LexerError))?;

    parse_document(&mut parser, mode)
}

fn parse_document<'a>(
    parser: &mut Parser<'a>,
    mode: DocumentMode,
) -> UnlocatedParseResult<Document> {
    let mut definitions = Vec::new();

    loop {
        definitions.push(parse_definition(parser, mode)?);

        if parser.peek().item == Token::EndOfFile {
            return Ok(Document { definitions });
        }
    }
}

fn parse_definition<'a>(
    parser: &mut Parser<'a>,
    mode: DocumentMode,
) -> UnlocatedParseResult<Definition> {
    let is_type_system_token = match parser.peek().item {
        Token::Name(
            "schema" | "scalar" | "type" | "interface" | "union" | "enum" | "input" | "directive"
            | "extend",
        ) => true,
        Token::String(_) | Token::BlockString(_) => true,
        _ => false,
    };

    if is_type_system_token {
        return match mode {
            DocumentMode::Executable => Err(parser.next_token()?.map(ParseError::unexpected_token)),
            DocumentMode::Schema | DocumentMode::Mixed => Ok(Definition::TypeSystem(
                parse_type_system_definition(parser)?,
            )),
        };
    }

    match parser.peek().item {
        Token::CurlyOpen
        | Token::Name("query" | "mutation" | "subscription") => {
            if mode == DocumentMode::Schema {
                return Err(parser.next_token()?.map(ParseError::unexpected_token));
            }
            Ok(Definition::Operation(parse_operation_definition(parser)?))
        }
        Token::Name("fragment") => {
            if mode == DocumentMode::Schema {
                return Err(parser.next_token()?.map(ParseError::unexpected_token));
            }
            Ok(Definition::Fragment(Arc::new(parse_fragment_definition(
                parser,
            )?)))
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_operation_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<Operation> {
    if parser.peek().item == Token::CurlyOpen {
        let selection_set = parse_selection_set(parser)?;

        Ok(Spanning::start_end(
            &selection_set.span.start,
            &selection_set.span.end,
            Operation {
                operation_type: OperationType::Query,
                name: None,
                variable_definitions: None,
                directives: None,
                selection_set: selection_set.item,
            },
        ))
    } else {
        let start_pos = parser.peek().span.start;
        let operation_type = parse_operation_type(parser)?;
        let name = match parser.peek().item {
            Token::Name(_) => Some(parser.expect_name()?.map(Into::into)),
            _ => None,
        };
        let variable_definitions = parse_variable_definitions(parser)?;
        let directives = parse_directives(parser, false)?;
        let selection_set = parse_selection_set(parser)?;

        Ok(Spanning::start_end(
            &start_pos,
            &selection_set.span.end,
            Operation {
                operation_type: operation_type.item,
                name,
                variable_definitions,
                directives: directives.map(|s| s.item),
                selection_set: selection_set.item,
            },
        ))
    }
}

fn parse_fragment_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<Fragment> {
    let Spanning { span, .. } = parser.expect(&Token::Name("fragment"))?;
    let start_pos = span.start;
    let name = match parser.expect_name() {
        Ok(n) => {
            if n.item == "on" {
                return Err(n.map(|_| ParseError::ReservedName("on".into())));
            }
            n
        }
        Err(e) => return Err(e),
    };

    parser.expect(&Token::Name("on"))?;
    let type_cond = parser.expect_name()?;
    let directives = parse_directives(parser, false)?;
    let selection_set = parse_selection_set(parser)?;

    Ok(Spanning::start_end(
        &start_pos,
        &selection_set.span.end,
        Fragment {
            name: name.map(Into::into),
            type_condition: type_cond.map(Into::into),
            directives: directives.map(|s| s.item),
            selection_set: selection_set.item,
        },
    ))
}

fn parse_optional_selection_set<'a>(
    parser: &mut Parser<'a>,
) -> OptionParseResult<SelectionSet> {
    if parser.peek().item == Token::CurlyOpen {
        Ok(Some(parse_selection_set(parser)?))
    } else {
        Ok(None)
    }
}

pub(crate) fn parse_selection_set<'a>(parser: &mut Parser<'a>) -> ParseResult<SelectionSet> {
    parser.with_nested_selection(|parser| {
        Ok(parser
            .unlocated_delimited_nonempty_list(
                &Token::CurlyOpen,
                parse_selection,
                &Token::CurlyClose,
            )?
            .map(Arc::new))
    })
}

fn parse_selection<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<Selection> {
    match parser.peek().item {
        Token::Ellipsis => parse_fragment(parser),
        _ => parse_field(parser).map(Selection::Field),
    }
}

fn parse_fragment<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<Selection> {
    let Spanning { span, .. } = parser.expect(&Token::Ellipsis)?;
    let start_pos = span.start;

    match parser.peek().item {
        Token::Name("on") => {
            parser.next_token()?;
            let name = parser.expect_name()?;
            let directives = parse_directives(parser, false)?;
            let selection_set = parse_selection_set(parser)?;

            Ok(Selection::InlineFragment(Spanning::start_end(
                &start_pos,
                &selection_set.span.end,
                InlineFragment {
                    type_condition: Some(name.map(Into::into)),
                    directives: directives.map(|s| s.item),
                    selection_set: selection_set.item,
                },
            )))
        }
        Token::CurlyOpen => {
            let selection_set = parse_selection_set(parser)?;

            Ok(Selection::InlineFragment(Spanning::start_end(
                &start_pos,
                &selection_set.span.end,
                InlineFragment {
                    type_condition: None,
                    directives: None,
                    selection_set: selection_set.item,
                },
            )))
        }
        Token::Name(_) => {
            let frag_name = parser.expect_name()?;
            let directives = parse_directives(parser, false)?;

            let end_pos = directives
                .as_ref()
                .map_or(frag_name.span.end, |s| s.span.end);

            Ok(Selection::FragmentSpread(Spanning::start_end(
                &start_pos,
                &end_pos,
                FragmentSpread {
                    name: frag_name.map(Into::into),
                    directives: directives.map(|s| s.item),
                },
            )))
        }
        Token::At => {
            let directives = parse_directives(parser, false)?;
            let selection_set = parse_selection_set(parser)?;

            Ok(Selection::InlineFragment(Spanning::start_end(
                &start_pos,
                &selection_set.span.end,
                InlineFragment {
                    type_condition: None,
                    directives: directives.map(|s| s.item),
                    selection_set: selection_set.item,
                },
            )))
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_field<'a>(parser: &mut Parser<'a>) -> ParseResult<Field> {
    let mut alias = Some(parser.expect_name()?);

    let name = if parser.skip(&Token::Colon)?.is_some() {
        parser.expect_name()?
    } else {
        alias.take().unwrap()
    };

    let arguments = parse_arguments(parser, false)?;
    let directives = parse_directives(parser, false)?;
    let selection_set = parse_optional_selection_set(parser)?;

    let start_pos = alias.as_ref().unwrap_or(&name).span.start;
    let end_pos = selection_set
        .as_ref()
        .map(|s| s.span.end)
        .or_else(|| directives.as_ref().map(|s| s.span.end))
        .or_else(|| arguments.as_ref().map(|s| s.span.end))
        .unwrap_or(name.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        Field {
            alias: alias.map(|a| a.map(Into::into)),
            name: name.map(Into::into),
            arguments,
            directives: directives.map(|s| s.item),
            selection_set: selection_set.map(|s| s.item),
        },
    ))
}

pub(crate) fn parse_arguments<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> OptionParseResult<Arguments> {
    if parser.peek().item != Token::ParenOpen {
        Ok(None)
    } else {
        Ok(Some(
            parser
                .delimited_nonempty_list(
                    &Token::ParenOpen,
                    |p| parse_argument(p, is_const),
                    &Token::ParenClose,
                )?
                .map(|args| Arguments {
                    items: args.into_iter().map(|s| s.item).collect(),
                }),
        ))
    }
}

fn parse_argument<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<(Spanning<String>, Spanning<InputValue>)> {
    let name = parser.expect_name()?;
    parser.expect(&Token::Colon)?;
    let value = parse_value_literal(parser, is_const)?;
    let end = value.span.end;

    Ok(Spanning::start_end(
        &name.span.start,
        &end,
        (name.map(Into::into), value),
    ))
}

fn parse_operation_type<'a>(parser: &mut Parser<'a>) -> ParseResult<OperationType> {
    match parser.peek().item {
        Token::Name("query") => Ok(parser.next_token()?.map(|_| OperationType::Query)),
        Token::Name("mutation") => Ok(parser.next_token()?.map(|_| OperationType::Mutation)),
        Token::Name("subscription") => {
            Ok(parser.next_token()?.map(|_| OperationType::Subscription))
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_variable_definitions<'a>(
    parser: &mut Parser<'a>,
) -> OptionParseResult<VariableDefinitions> {
    if parser.peek().item != Token::ParenOpen {
        Ok(None)
    } else {
        Ok(Some(
            parser
                .delimited_nonempty_list(
                    &Token::ParenOpen,
                    parse_variable_definition,
                    &Token::ParenClose,
                )?
                .map(|defs| VariableDefinitions {
                    items: defs.into_iter().map(|s| s.item).collect(),
                }),
        ))
    }
}

fn parse_variable_definition<'a>(
    parser: &mut Parser<'a>,
) -> ParseResult<(Spanning<String>, VariableDefinition)> {
    let Spanning { span, .. } = parser.expect(&Token::Dollar)?;
    let start_pos = span.start;
    let var_name = parser.expect_name()?;
    parser.expect(&Token::Colon)?;
    let var_type = parse_type(parser)?;

    let default_value = if parser.skip(&Token::Equals)?.is_some() {
        Some(parse_value_literal(parser, true)?)
    } else {
        None
    };

    let directives = parse_directives(parser, true)?;

    let end_pos = directives
        .as_ref()
        .map(|s| s.span.end)
        .or_else(|| default_value.as_ref().map(|s| s.span.end))
        .unwrap_or(var_type.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        (
            Spanning::start_end(&start_pos, &var_name.span.end, var_name.item.into()),
            VariableDefinition {
                var_type,
                default_value,
                directives: directives.map(|s| s.item),
            },
        ),
    ))
}

pub(crate) fn parse_directives<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> OptionParseResult<Directives> {
    if parser.peek().item != Token::At {
        Ok(None)
    } else {
        let mut items = Vec::new();
        while parser.peek().item == Token::At {
            items.push(parse_directive(parser, is_const)?);
        }

        let start = items.first().map(|s| s.span.start).unwrap();
        let end = items.last().map(|s| s.span.end).unwrap();

        Ok(Some(Spanning::start_end(&start, &end, items)))
    }
}

fn parse_directive<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<Directive> {
    let Spanning { span, .. } = parser.expect(&Token::At)?;
    let start_pos = span.start;
    let name = parser.expect_name()?;
    let arguments = parse_arguments(parser, is_const)?;

    let end_pos = arguments.as_ref().map_or(name.span.end, |s| s.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        Directive {
            name: name.map(Into::into),
            arguments,
        },
    ))
}

pub(crate) fn parse_type<'a>(parser: &mut Parser<'a>) -> ParseResult<Type> {
    let parsed_type = if let Some(Spanning { span, .. }) = parser.skip(&Token::BracketOpen)? {
        let start_pos = span.start;
        let inner_type = parse_type(parser)?;
        let Spanning { span, .. } = parser.expect(&Token::BracketClose)?;
        Spanning::start_end(&start_pos, &span.end, Type::List(Box::new(inner_type.item)))
    } else {
        parser
            .expect_name()?
            .map(|s| Type::Named(s.into()))
    };

    Ok(match *parser.peek() {
        Spanning {
            item: Token::ExclamationMark,
            ..
        } => wrap_non_null(parser, parsed_type)?,
        _ => parsed_type,
    })
}

fn wrap_non_null<'a>(parser: &mut Parser<'a>, inner: Spanning<Type>) -> ParseResult<Type> {
    let Spanning { span, .. } = parser.expect(&Token::ExclamationMark)?;

    let wrapped = match inner.item {
        Type::Named(name) => Type::NonNullNamed(name),
        Type::List(l) => Type::NonNullList(l),
        t => t,
    };

    Ok(Spanning::start_end(&inner.span.start, &span.end, wrapped))
}

use crate::{
    ast::InputValue,
    parser::{ParseError, ParseResult, Parser, Spanning, Token},
};

pub fn parse_value_literal<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<InputValue> {
    match *parser.peek() {
        Spanning {
            item: Token::BracketOpen,
            ..
        } => parse_list_literal(parser, is_const),
        Spanning {
            item: Token::CurlyOpen,
            ..
        } => parse_object_literal(parser, is_const),
        Spanning {
            item: Token::Dollar,
            ..
        } if !is_const => parse_variable_literal(parser),
        Spanning {
            item: Token::Int(i),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Int(i))),
        Spanning {
            item: Token::Float(f),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Float(f))),
        Spanning {
            item: Token::String(_) | Token::BlockString(_),
            ..
        } => Ok(parser.next_token()?.map(|t| match t {
            Token::String(s) | Token::BlockString(s) => InputValue::String(s),
            _ => panic!("internal parser error in `parse_value_literal`"),
        })),
        Spanning {
            item: Token::Name("true"),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Boolean(true))),
        Spanning {
            item: Token::Name("false"),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Boolean(false))),
        Spanning {
            item: Token::Name("null"),
            ..
        } => Ok(parser.next_token()?.map(|_| InputValue::Null)),
        Spanning {
            item: Token::Name(name),
            ..
        } => Ok(parser
            .next_token()?
            .map(|_| InputValue::Enum(name.into()))),
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_list_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    Ok(parser
        .delimited_list(
            &Token::BracketOpen,
            |p| parse_value_literal(p, is_const),
            &Token::BracketClose,
        )?
        .map(InputValue::List))
}

fn parse_object_literal<'a>(parser: &mut Parser<'a>, is_const: bool) -> ParseResult<InputValue> {
    Ok(parser
        .delimited_list(
            &Token::CurlyOpen,
            |p| parse_object_field(p, is_const),
            &Token::CurlyClose,
        )?
        .map(|items| InputValue::Object(items.into_iter().map(|s| s.item).collect())))
}

fn parse_object_field<'a>(
    parser: &mut Parser<'a>,
    is_const: bool,
) -> ParseResult<(Spanning<String>, Spanning<InputValue>)> {
    let key = parser.expect_name()?;

    parser.expect(&Token::Colon)?;

    let value = parse_value_literal(parser, is_const)?;
    let end = value.span.end;

    Ok(Spanning::start_end(
        &key.span.start,
        &end,
        (key.map(Into::into), value),
    ))
}

fn parse_variable_literal<'a>(parser: &mut Parser<'a>) -> ParseResult<InputValue> {
    let Spanning { span, .. } = parser.expect(&Token::Dollar)?;
    let name = parser.expect_name()?;

    Ok(Spanning::start_end(
        &span.start,
        &name.span.end,
        InputValue::Variable(name.item.into()),
    ))
}

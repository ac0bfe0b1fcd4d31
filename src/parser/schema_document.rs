//! Grammar for the type-system dialect: definitions and `extend` forms.

use crate::{
    ast::{
        DirectiveDefinition, EnumTypeDefinition, EnumValueDefinition, FieldDefinition,
        InputObjectTypeDefinition, InputValueDefinition, InterfaceTypeDefinition,
        ObjectTypeDefinition, OperationType, RootOperationTypeDefinition, ScalarTypeDefinition,
        SchemaDefinition, TypeDefinition, TypeSystemDefinition, UnionTypeDefinition,
    },
    parser::{
        ParseError, ParseResult, Parser, Spanning, Token, UnlocatedParseResult,
        document::{parse_directives, parse_type},
        value::parse_value_literal,
    },
};

pub(crate) fn parse_type_system_definition<'a>(
    parser: &mut Parser<'a>,
) -> UnlocatedParseResult<TypeSystemDefinition> {
    let description = parse_description(parser)?;

    match parser.peek().item {
        Token::Name("schema") => Ok(TypeSystemDefinition::Schema(parse_schema_definition(
            parser,
            description,
        )?)),
        Token::Name("directive") => Ok(TypeSystemDefinition::Directive(
            parse_directive_definition(parser, description)?,
        )),
        Token::Name("scalar" | "type" | "interface" | "union" | "enum" | "input") => Ok(
            TypeSystemDefinition::Type(parse_type_definition(parser, description)?),
        ),
        Token::Name("extend") => {
            if let Some(description) = description {
                return Err(description.map(|_| ParseError::UnexpectedToken("extend".into())));
            }
            parse_extension(parser)
        }
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_extension<'a>(parser: &mut Parser<'a>) -> UnlocatedParseResult<TypeSystemDefinition> {
    parser.expect(&Token::Name("extend"))?;

    match parser.peek().item {
        Token::Name("schema") => Ok(TypeSystemDefinition::SchemaExtension(
            parse_schema_definition(parser, None)?,
        )),
        Token::Name("scalar" | "type" | "interface" | "union" | "enum" | "input") => Ok(
            TypeSystemDefinition::TypeExtension(parse_type_definition(parser, None)?),
        ),
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    match parser.peek().item {
        Token::Name("scalar") => parse_scalar_type_definition(parser, description),
        Token::Name("type") => parse_object_type_definition(parser, description),
        Token::Name("interface") => parse_interface_type_definition(parser, description),
        Token::Name("union") => parse_union_type_definition(parser, description),
        Token::Name("enum") => parse_enum_type_definition(parser, description),
        Token::Name("input") => parse_input_object_type_definition(parser, description),
        _ => Err(parser.next_token()?.map(ParseError::unexpected_token)),
    }
}

fn parse_description<'a>(
    parser: &mut Parser<'a>,
) -> Result<Option<Spanning<String>>, Spanning<ParseError>> {
    match parser.peek().item {
        Token::String(_) | Token::BlockString(_) => {
            Ok(Some(parser.next_token()?.map(|t| match t {
                Token::String(s) | Token::BlockString(s) => s,
                _ => panic!("internal parser error in `parse_description`"),
            })))
        }
        _ => Ok(None),
    }
}

fn parse_schema_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<SchemaDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("schema"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let directives = parse_directives(parser, true)?;

    let (operation_types, end_pos) = if parser.peek().item == Token::CurlyOpen {
        let types = parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_root_operation_type_definition,
            &Token::CurlyClose,
        )?;
        let end = types.span.end;
        (types.item, end)
    } else {
        let end = directives.as_ref().map_or(span.end, |d| d.span.end);
        (Vec::new(), end)
    };

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        SchemaDefinition {
            description,
            directives: directives.map(|s| s.item),
            operation_types,
        },
    ))
}

fn parse_root_operation_type_definition<'a>(
    parser: &mut Parser<'a>,
) -> ParseResult<RootOperationTypeDefinition> {
    let operation_type = match parser.peek().item {
        Token::Name("query") => parser.next_token()?.map(|_| OperationType::Query),
        Token::Name("mutation") => parser.next_token()?.map(|_| OperationType::Mutation),
        Token::Name("subscription") => parser.next_token()?.map(|_| OperationType::Subscription),
        _ => return Err(parser.next_token()?.map(ParseError::unexpected_token)),
    };

    parser.expect(&Token::Colon)?;
    let type_name = parser.expect_name()?;

    Ok(Spanning::start_end(
        &operation_type.span.start,
        &type_name.span.end,
        RootOperationTypeDefinition {
            operation_type: operation_type.item,
            type_name: type_name.map(Into::into),
        },
    ))
}

fn parse_scalar_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("scalar"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let name = parser.expect_name()?;
    let directives = parse_directives(parser, true)?;

    let end_pos = directives.as_ref().map_or(name.span.end, |d| d.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Scalar(ScalarTypeDefinition {
            description,
            name: name.map(Into::into),
            directives: directives.map(|s| s.item),
        }),
    ))
}

fn parse_object_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("type"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let name = parser.expect_name()?;
    let interfaces = parse_implements_interfaces(parser)?;
    let directives = parse_directives(parser, true)?;
    let (fields, end_pos) = parse_fields_definition(parser, name.span.end)?;

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Object(ObjectTypeDefinition {
            description,
            name: name.map(Into::into),
            interfaces,
            directives: directives.map(|s| s.item),
            fields,
        }),
    ))
}

fn parse_interface_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("interface"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let name = parser.expect_name()?;
    let interfaces = parse_implements_interfaces(parser)?;
    let directives = parse_directives(parser, true)?;
    let (fields, end_pos) = parse_fields_definition(parser, name.span.end)?;

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Interface(InterfaceTypeDefinition {
            description,
            name: name.map(Into::into),
            interfaces,
            directives: directives.map(|s| s.item),
            fields,
        }),
    ))
}

fn parse_implements_interfaces<'a>(
    parser: &mut Parser<'a>,
) -> Result<Vec<Spanning<String>>, Spanning<ParseError>> {
    let mut interfaces = Vec::new();

    if parser.skip_keyword("implements")?.is_some() {
        parser.skip(&Token::Ampersand)?;
        interfaces.push(parser.expect_name()?.map(Into::into));

        while parser.skip(&Token::Ampersand)?.is_some() {
            interfaces.push(parser.expect_name()?.map(Into::into));
        }
    }

    Ok(interfaces)
}

fn parse_fields_definition<'a>(
    parser: &mut Parser<'a>,
    fallback_end: crate::parser::SourcePosition,
) -> Result<(Vec<Spanning<FieldDefinition>>, crate::parser::SourcePosition), Spanning<ParseError>>
{
    if parser.peek().item != Token::CurlyOpen {
        return Ok((Vec::new(), fallback_end));
    }

    let fields = parser.delimited_nonempty_list(
        &Token::CurlyOpen,
        parse_field_definition,
        &Token::CurlyClose,
    )?;
    let end = fields.span.end;

    Ok((fields.item, end))
}

fn parse_field_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<FieldDefinition> {
    let description = parse_description(parser)?;
    let name = parser.expect_name()?;
    let start_pos = description.as_ref().map_or(name.span.start, |d| d.span.start);
    let arguments = parse_arguments_definition(parser)?;
    parser.expect(&Token::Colon)?;
    let field_type = parse_type(parser)?;
    let directives = parse_directives(parser, true)?;

    let end_pos = directives
        .as_ref()
        .map_or(field_type.span.end, |d| d.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        FieldDefinition {
            description,
            name: name.map(Into::into),
            arguments,
            field_type,
            directives: directives.map(|s| s.item),
        },
    ))
}

fn parse_arguments_definition<'a>(
    parser: &mut Parser<'a>,
) -> Result<Vec<Spanning<InputValueDefinition>>, Spanning<ParseError>> {
    if parser.peek().item != Token::ParenOpen {
        return Ok(Vec::new());
    }

    Ok(parser
        .delimited_nonempty_list(
            &Token::ParenOpen,
            parse_input_value_definition,
            &Token::ParenClose,
        )?
        .item)
}

fn parse_input_value_definition<'a>(
    parser: &mut Parser<'a>,
) -> ParseResult<InputValueDefinition> {
    let description = parse_description(parser)?;
    let name = parser.expect_name()?;
    let start_pos = description.as_ref().map_or(name.span.start, |d| d.span.start);
    parser.expect(&Token::Colon)?;
    let value_type = parse_type(parser)?;

    let default_value = if parser.skip(&Token::Equals)?.is_some() {
        Some(parse_value_literal(parser, true)?)
    } else {
        None
    };

    let directives = parse_directives(parser, true)?;

    let end_pos = directives
        .as_ref()
        .map(|d| d.span.end)
        .or_else(|| default_value.as_ref().map(|v| v.span.end))
        .unwrap_or(value_type.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        InputValueDefinition {
            description,
            name: name.map(Into::into),
            value_type,
            default_value,
            directives: directives.map(|s| s.item),
        },
    ))
}

fn parse_union_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("union"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let name = parser.expect_name()?;
    let directives = parse_directives(parser, true)?;

    let mut members = Vec::new();
    let mut end_pos = directives.as_ref().map_or(name.span.end, |d| d.span.end);

    if parser.skip(&Token::Equals)?.is_some() {
        parser.skip(&Token::Pipe)?;
        let member = parser.expect_name()?;
        end_pos = member.span.end;
        members.push(member.map(Into::into));

        while parser.skip(&Token::Pipe)?.is_some() {
            let member = parser.expect_name()?;
            end_pos = member.span.end;
            members.push(member.map(Into::into));
        }
    }

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Union(UnionTypeDefinition {
            description,
            name: name.map(Into::into),
            directives: directives.map(|s| s.item),
            members,
        }),
    ))
}

fn parse_enum_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("enum"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let name = parser.expect_name()?;
    let directives = parse_directives(parser, true)?;

    let (values, end_pos) = if parser.peek().item == Token::CurlyOpen {
        let values = parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_enum_value_definition,
            &Token::CurlyClose,
        )?;
        let end = values.span.end;
        (values.item, end)
    } else {
        let end = directives.as_ref().map_or(name.span.end, |d| d.span.end);
        (Vec::new(), end)
    };

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::Enum(EnumTypeDefinition {
            description,
            name: name.map(Into::into),
            directives: directives.map(|s| s.item),
            values,
        }),
    ))
}

fn parse_enum_value_definition<'a>(parser: &mut Parser<'a>) -> ParseResult<EnumValueDefinition> {
    let description = parse_description(parser)?;
    let name = parser.expect_name()?;
    let start_pos = description.as_ref().map_or(name.span.start, |d| d.span.start);

    if matches!(name.item, "true" | "false" | "null") {
        return Err(Spanning::new(
            name.span,
            ParseError::ReservedName(name.item.into()),
        ));
    }

    let directives = parse_directives(parser, true)?;
    let end_pos = directives.as_ref().map_or(name.span.end, |d| d.span.end);

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        EnumValueDefinition {
            description,
            name: name.map(Into::into),
            directives: directives.map(|s| s.item),
        },
    ))
}

fn parse_input_object_type_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<TypeDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("input"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    let name = parser.expect_name()?;
    let directives = parse_directives(parser, true)?;

    let (fields, end_pos) = if parser.peek().item == Token::CurlyOpen {
        let fields = parser.delimited_nonempty_list(
            &Token::CurlyOpen,
            parse_input_value_definition,
            &Token::CurlyClose,
        )?;
        let end = fields.span.end;
        (fields.item, end)
    } else {
        let end = directives.as_ref().map_or(name.span.end, |d| d.span.end);
        (Vec::new(), end)
    };

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        TypeDefinition::InputObject(InputObjectTypeDefinition {
            description,
            name: name.map(Into::into),
            directives: directives.map(|s| s.item),
            fields,
        }),
    ))
}

fn parse_directive_definition<'a>(
    parser: &mut Parser<'a>,
    description: Option<Spanning<String>>,
) -> ParseResult<DirectiveDefinition> {
    let Spanning { span, .. } = parser.expect(&Token::Name("directive"))?;
    let start_pos = description.as_ref().map_or(span.start, |d| d.span.start);
    parser.expect(&Token::At)?;
    let name = parser.expect_name()?;
    let arguments = parse_arguments_definition(parser)?;
    let repeatable = parser.skip_keyword("repeatable")?.is_some();

    parser.expect(&Token::Name("on"))?;
    parser.skip(&Token::Pipe)?;

    let mut locations = Vec::new();
    let location = parser.expect_name()?;
    let mut end_pos = location.span.end;
    locations.push(location.map(Into::into));

    while parser.skip(&Token::Pipe)?.is_some() {
        let location = parser.expect_name()?;
        end_pos = location.span.end;
        locations.push(location.map(Into::into));
    }

    Ok(Spanning::start_end(
        &start_pos,
        &end_pos,
        DirectiveDefinition {
            description,
            name: name.map(Into::into),
            arguments,
            repeatable,
            locations,
        },
    ))
}

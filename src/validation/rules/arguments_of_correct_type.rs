use crate::{
    ast::{Directive, Field, InputValue},
    parser::Spanning,
    schema::Argument,
    types::utilities::is_valid_literal_value,
    validation::{ValidatorContext, Visitor},
};

pub struct ArgumentsOfCorrectType<'a> {
    current_args: Option<&'a Vec<Argument>>,
}

pub fn factory<'a>() -> ArgumentsOfCorrectType<'a> {
    ArgumentsOfCorrectType { current_args: None }
}

impl<'a> Visitor<'a> for ArgumentsOfCorrectType<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        self.current_args = ctx
            .schema
            .directive_by_name(&directive.item.name.item)
            .map(|d| &d.arguments);
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|t| t.field_by_name(&field.item.name.item))
            .map(|f| &f.arguments);
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, arg_value): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        let Some(argument_meta) = self
            .current_args
            .and_then(|args| args.iter().find(|a| a.name == arg_name.item))
        else {
            return;
        };

        if !is_valid_literal_value(ctx.schema, &argument_meta.arg_type, &arg_value.item) {
            ctx.report_error(
                &error_message(&arg_name.item, &argument_meta.arg_type.to_string()),
                &[arg_value.span.start],
            );
        }
    }
}

fn error_message(arg_name: &str, type_name: &str) -> String {
    format!("Invalid value for argument \"{arg_name}\", expected type \"{type_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn good_values() {
        expect_passes_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: 2)
              stringArgField(stringArg: "foo")
              booleanArgField(booleanArg: true)
              enumArgField(enumArg: BLACK)
              floatArgField(floatArg: 1.1)
              intoFloat: floatArgField(floatArg: 1)
              idArgField(idArg: "someIdString")
              intoId: idArgField(idArg: 1)
              stringListArgField(stringListArg: ["one", "two"])
              singleToList: stringListArgField(stringListArg: "one")
              complexArgField(complexArg: { requiredField: true, intField: 4 })
              multipleReqs(req1: 1, req2: 2)
            }
          }
        "#
        );
    }

    #[test]
    fn null_into_nullable_argument() {
        expect_passes_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: null)
            }
          }
        "#
        );
    }

    #[test]
    fn variables_are_not_checked_here() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo($any: String) {
            complicatedArgs {
              intArgField(intArg: $any)
            }
          }
        "#
        );
    }

    #[test]
    fn string_into_int() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: "3")
            }
          }
        "#,
            &[&error_message("intArg", "Int")]
        );
    }

    #[test]
    fn float_into_int() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              intArgField(intArg: 3.0)
            }
          }
        "#,
            &[&error_message("intArg", "Int")]
        );
    }

    #[test]
    fn string_literal_into_enum() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              enumArgField(enumArg: "BLACK")
            }
          }
        "#,
            &[&error_message("enumArg", "FurColor")]
        );
    }

    #[test]
    fn unknown_enum_value() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              enumArgField(enumArg: PURPLE)
            }
          }
        "#,
            &[&error_message("enumArg", "FurColor")]
        );
    }

    #[test]
    fn null_into_required_argument() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              nonNullIntArgField(nonNullIntArg: null)
            }
          }
        "#,
            &[&error_message("nonNullIntArg", "Int!")]
        );
    }

    #[test]
    fn incomplete_input_object() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              complexArgField(complexArg: { intField: 4 })
            }
          }
        "#,
            &[&error_message("complexArg", "ComplexInput")]
        );
    }

    #[test]
    fn directive_argument_type() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              name @include(if: "yes")
            }
          }
        "#,
            &[&error_message("if", "Boolean!")]
        );
    }
}

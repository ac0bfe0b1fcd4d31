use crate::{
    ast::{Directive, Field, InputValue},
    parser::Spanning,
    schema::Argument,
    validation::{ValidatorContext, Visitor},
};

#[derive(Debug)]
enum ArgumentPosition<'a> {
    Directive(&'a str),
    Field(&'a str, String),
}

pub struct KnownArgumentNames<'a> {
    current_args: Option<(ArgumentPosition<'a>, &'a Vec<Argument>)>,
}

pub fn factory<'a>() -> KnownArgumentNames<'a> {
    KnownArgumentNames { current_args: None }
}

impl<'a> Visitor<'a> for KnownArgumentNames<'a> {
    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        self.current_args = ctx
            .schema
            .directive_by_name(&directive.item.name.item)
            .map(|d| {
                (
                    ArgumentPosition::Directive(&directive.item.name.item),
                    &d.arguments,
                )
            });
    }

    fn exit_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive>) {
        self.current_args = None;
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        self.current_args = ctx
            .parent_type()
            .and_then(|t| {
                Some((
                    t.name.clone(),
                    t.field_by_name(&field.item.name.item)?,
                ))
            })
            .map(|(type_name, meta_field)| {
                (
                    ArgumentPosition::Field(&field.item.name.item, type_name),
                    &meta_field.arguments,
                )
            });
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.current_args = None;
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        if let Some((position, args)) = &self.current_args {
            if !args.iter().any(|a| a.name == arg_name.item) {
                let message = match position {
                    ArgumentPosition::Field(field_name, type_name) => field_error_message(
                        &arg_name.item,
                        field_name,
                        type_name,
                    ),
                    ArgumentPosition::Directive(directive_name) => {
                        directive_error_message(&arg_name.item, directive_name)
                    }
                };

                ctx.report_error(&message, &[arg_name.span.start]);
            }
        }
    }
}

fn field_error_message(arg_name: &str, field_name: &str, type_name: &str) -> String {
    format!(
        "Unknown argument \"{arg_name}\" on field \"{field_name}\" of type \"{type_name}\"",
    )
}

fn directive_error_message(arg_name: &str, directive_name: &str) -> String {
    format!("Unknown argument \"{arg_name}\" on directive \"{directive_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_arguments_are_valid() {
        expect_passes_rule!(
            factory,
            r#"
          {
            dog {
              doesKnowCommand(dogCommand: SIT)
              isHousetrained(atOtherHomes: true) @include(if: true)
            }
          }
        "#
        );
    }

    #[test]
    fn unknown_field_argument() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              doesKnowCommand(command: CLEAN_UP_HOUSE)
            }
          }
        "#,
            &[&field_error_message("command", "doesKnowCommand", "Dog")]
        );
    }

    #[test]
    fn unknown_directive_argument() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              name @include(unless: false)
            }
          }
        "#,
            &[&directive_error_message("unless", "include")]
        );
    }

    #[test]
    fn unknown_arguments_deep_in_fragments() {
        expect_fails_rule!(
            factory,
            r#"
          fragment deepFragment on Dog {
            doesKnowCommand(unknown: true)
          }
        "#,
            &[&field_error_message("unknown", "doesKnowCommand", "Dog")]
        );
    }
}

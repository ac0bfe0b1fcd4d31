use crate::{
    ast::{Directive, Field},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct ProvidedRequiredArguments;

pub fn factory() -> ProvidedRequiredArguments {
    ProvidedRequiredArguments
}

impl<'a> Visitor<'a> for ProvidedRequiredArguments {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let Some(meta_field) = ctx
            .parent_type()
            .and_then(|t| t.field_by_name(&field.item.name.item))
        else {
            return;
        };

        for meta_arg in &meta_field.arguments {
            let supplied = field
                .item
                .arguments
                .as_ref()
                .is_some_and(|args| args.item.get(&meta_arg.name).is_some());

            if meta_arg.is_required() && !supplied {
                ctx.report_error(
                    &field_error_message(
                        &field.item.name.item,
                        &meta_arg.name,
                        &meta_arg.arg_type.to_string(),
                    ),
                    &[field.span.start],
                );
            }
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        directive: &'a Spanning<Directive>,
    ) {
        let Some(meta_directive) = ctx.schema.directive_by_name(&directive.item.name.item) else {
            return;
        };

        for meta_arg in &meta_directive.arguments {
            let supplied = directive
                .item
                .arguments
                .as_ref()
                .is_some_and(|args| args.item.get(&meta_arg.name).is_some());

            if meta_arg.is_required() && !supplied {
                ctx.report_error(
                    &directive_error_message(
                        &directive.item.name.item,
                        &meta_arg.name,
                        &meta_arg.arg_type.to_string(),
                    ),
                    &[directive.span.start],
                );
            }
        }
    }
}

fn field_error_message(field_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" argument \"{arg_name}\" of type \"{type_name}\" is required but not provided",
    )
}

fn directive_error_message(directive_name: &str, arg_name: &str, type_name: &str) -> String {
    format!(
        "Directive \"@{directive_name}\" argument \"{arg_name}\" of type \"{type_name}\" is required but not provided",
    )
}

#[cfg(test)]
mod tests {
    use super::{directive_error_message, factory, field_error_message};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn optional_arguments_may_be_omitted() {
        expect_passes_rule!(
            factory,
            r#"
          {
            dog {
              isHousetrained
              isAtLocation(x: 0)
            }
          }
        "#
        );
    }

    #[test]
    fn required_arguments_provided() {
        expect_passes_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              multipleReqs(req1: 1, req2: 2)
            }
          }
        "#
        );
    }

    #[test]
    fn missing_one_required_argument() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              multipleReqs(req2: 2)
            }
          }
        "#,
            &[&field_error_message("multipleReqs", "req1", "Int!")]
        );
    }

    #[test]
    fn missing_all_required_arguments() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              multipleReqs
            }
          }
        "#,
            &[
                &field_error_message("multipleReqs", "req1", "Int!"),
                &field_error_message("multipleReqs", "req2", "Int!"),
            ]
        );
    }

    #[test]
    fn missing_directive_argument() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              name @include
            }
          }
        "#,
            &[&directive_error_message("include", "if", "Boolean!")]
        );
    }
}

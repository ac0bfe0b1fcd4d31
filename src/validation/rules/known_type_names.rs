use crate::{
    ast::{Fragment, InlineFragment, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct KnownTypeNames;

pub fn factory() -> KnownTypeNames {
    KnownTypeNames
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<InlineFragment>,
    ) {
        if let Some(type_cond) = &fragment.item.type_condition {
            validate_type(ctx, &type_cond.item, &type_cond.span.start);
        }
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment>,
    ) {
        let type_cond = &fragment.item.type_condition;
        validate_type(ctx, &type_cond.item, &type_cond.span.start);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (_, var_def): &'a (Spanning<String>, VariableDefinition),
    ) {
        validate_type(
            ctx,
            var_def.var_type.item.innermost_name(),
            &var_def.var_type.span.start,
        );
    }
}

fn validate_type(ctx: &mut ValidatorContext<'_>, type_name: &str, location: &SourcePosition) {
    if ctx.schema.concrete_type_by_name(type_name).is_none() {
        ctx.report_error(&error_message(type_name), &[*location]);
    }
}

fn error_message(type_name: &str) -> String {
    format!("Unknown type \"{type_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_type_names_are_valid() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo($var: String, $required: [String!]!) {
            complicatedArgs { stringArgField(stringArg: $var) }
            ... on QueryRoot { dog { name } }
            ...PetFields
          }
          fragment PetFields on Pet {
            name
          }
        "#
        );
    }

    #[test]
    fn unknown_type_names_are_invalid() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo($var: JumbledUpLetters) {
            complicatedArgs { intArgField(intArg: 2) }
            ... on Badger { name }
            ...PetFields
          }
          fragment PetFields on Peettt {
            name
          }
        "#,
            &[
                &error_message("JumbledUpLetters"),
                &error_message("Badger"),
                &error_message("Peettt"),
            ]
        );
    }
}

use crate::{
    ast::FragmentSpread,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct KnownFragmentNames;

pub fn factory() -> KnownFragmentNames {
    KnownFragmentNames
}

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        if !ctx.is_known_fragment(&spread.item.name.item) {
            ctx.report_error(
                &error_message(&spread.item.name.item),
                &[spread.item.name.span.start],
            );
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!("Unknown fragment \"{frag_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn known_fragment_names_are_valid() {
        expect_passes_rule!(
            factory,
            r#"
          {
            human(id: 4) {
              ...HumanFields
              ... on Human {
                ...HumanFields
              }
            }
          }
          fragment HumanFields on Human {
            name(surname: true)
          }
        "#
        );
    }

    #[test]
    fn unknown_fragment_names_are_invalid() {
        expect_fails_rule!(
            factory,
            r#"
          {
            human(id: 4) {
              ...UnknownFragment1
              ... on Human {
                ...UnknownFragment2
              }
            }
          }
        "#,
            &[
                &error_message("UnknownFragment1"),
                &error_message("UnknownFragment2"),
            ]
        );
    }
}

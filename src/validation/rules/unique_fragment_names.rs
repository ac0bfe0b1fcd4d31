use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::Fragment,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueFragmentNames<'a> {
    names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueFragmentNames<'a> {
    UniqueFragmentNames {
        names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueFragmentNames<'a> {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment>,
    ) {
        match self.names.entry(&f.item.name.item) {
            Entry::Occupied(e) => {
                ctx.report_error(
                    &error_message(&f.item.name.item),
                    &[*e.get(), f.item.name.span.start],
                );
            }
            Entry::Vacant(e) => {
                e.insert(f.item.name.span.start);
            }
        }
    }
}

fn error_message(frag_name: &str) -> String {
    format!("There can only be one fragment named \"{frag_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn distinct_fragment_names() {
        expect_passes_rule!(
            factory,
            r#"
          {
            dog {
              ...fragA
              ...fragB
            }
          }
          fragment fragA on Dog { name }
          fragment fragB on Dog { nickname }
        "#
        );
    }

    #[test]
    fn duplicate_fragment_names() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              ...fragA
            }
          }
          fragment fragA on Dog { name }
          fragment fragA on Dog { nickname }
        "#,
            &[&error_message("fragA")]
        );
    }
}

use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::Operation,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueOperationNames<'a> {
    names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueOperationNames<'a> {
    UniqueOperationNames {
        names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueOperationNames<'a> {
    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        if let Some(op_name) = &op.item.name {
            match self.names.entry(&op_name.item) {
                Entry::Occupied(e) => {
                    ctx.report_error(&error_message(&op_name.item), &[*e.get(), op.span.start]);
                }
                Entry::Vacant(e) => {
                    e.insert(op.span.start);
                }
            }
        }
    }
}

fn error_message(op_name: &str) -> String {
    format!("There can only be one operation named \"{op_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn no_operations() {
        expect_passes_rule!(
            factory,
            r#"
          fragment fragA on Dog {
            name
          }
        "#
        );
    }

    #[test]
    fn multiple_operations() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo { dog { name } }
          query Bar { dog { name } }
          mutation Baz { testInput }
        "#
        );
    }

    #[test]
    fn fragment_and_operation_named_the_same() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo {
            ...Foo
          }
          fragment Foo on QueryRoot {
            dog { name }
          }
        "#
        );
    }

    #[test]
    fn multiple_operations_of_same_name() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo { dog { name } }
          query Foo { cat { name } }
        "#,
            &[&error_message("Foo")]
        );
    }

    #[test]
    fn same_name_on_different_operation_types() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo { dog { name } }
          mutation Foo { testInput }
        "#,
            &[&error_message("Foo")]
        );
    }
}

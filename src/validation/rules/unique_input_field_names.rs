use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::InputValue,
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueInputFieldNames<'a> {
    known_name_stack: Vec<HashMap<&'a str, SourcePosition>>,
}

pub fn factory<'a>() -> UniqueInputFieldNames<'a> {
    UniqueInputFieldNames {
        known_name_stack: Vec::new(),
    }
}

impl<'a> Visitor<'a> for UniqueInputFieldNames<'a> {
    fn enter_object_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
        self.known_name_stack.push(HashMap::new());
    }

    fn exit_object_value(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
    ) {
        self.known_name_stack.pop();
    }

    fn enter_object_field(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (field_name, _): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        if let Some(known_names) = self.known_name_stack.last_mut() {
            match known_names.entry(&field_name.item) {
                Entry::Occupied(e) => {
                    ctx.report_error(
                        &error_message(&field_name.item),
                        &[*e.get(), field_name.span.start],
                    );
                }
                Entry::Vacant(e) => {
                    e.insert(field_name.span.start);
                }
            }
        }
    }
}

fn error_message(field_name: &str) -> String {
    format!("There can only be one input field named \"{field_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn input_object_with_fields() {
        expect_passes_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              complexArgField(complexArg: { requiredField: true, intField: 4 })
            }
          }
        "#
        );
    }

    #[test]
    fn duplicate_input_object_fields() {
        expect_fails_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              complexArgField(complexArg: { requiredField: true, requiredField: false })
            }
          }
        "#,
            &[&error_message("requiredField")]
        );
    }

    #[test]
    fn nested_duplicates_are_scoped() {
        expect_passes_rule!(
            factory,
            r#"
          {
            complicatedArgs {
              complexArgField(complexArg: { requiredField: true, stringField: "same" })
              second: complexArgField(complexArg: { requiredField: true, stringField: "same" })
            }
          }
        "#
        );
    }
}

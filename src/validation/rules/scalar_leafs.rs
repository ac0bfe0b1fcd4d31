use crate::{
    ast::Field,
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct ScalarLeafs;

pub fn factory() -> ScalarLeafs {
    ScalarLeafs
}

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let field_name = &field.item.name.item;

        let error = if let (Some(t), Some(focused)) = (ctx.current_type(), ctx.current_type_literal())
        {
            let has_selection = field.item.selection_set.is_some();

            if t.is_leaf() && has_selection {
                Some(no_allowed_error_message(field_name, &focused.to_string()))
            } else if t.is_composite() && !has_selection {
                Some(required_error_message(field_name, &focused.to_string()))
            } else {
                None
            }
        } else {
            None
        };

        if let Some(error) = error {
            ctx.report_error(&error, &[field.span.start]);
        }
    }
}

fn no_allowed_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" must not have a selection since type \"{type_name}\" has no subfields",
    )
}

fn required_error_message(field_name: &str, type_name: &str) -> String {
    format!(
        "Field \"{field_name}\" of type \"{type_name}\" must have a selection of subfields. Did you mean \"{field_name} {{ ... }}\"?",
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, no_allowed_error_message, required_error_message};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn valid_scalar_selection() {
        expect_passes_rule!(
            factory,
            r#"
          fragment scalarSelection on Dog {
            barks
          }
        "#
        );
    }

    #[test]
    fn object_without_subselection_fails() {
        expect_fails_rule!(
            factory,
            "{ human }",
            &[&required_error_message("human", "Human")]
        );
    }

    #[test]
    fn interface_without_subselection_fails() {
        expect_fails_rule!(
            factory,
            "{ pet }",
            &[&required_error_message("pet", "Pet")]
        );
    }

    #[test]
    fn scalar_with_subselection_fails() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              barkVolume {
                tooDeep
              }
            }
          }
        "#,
            &[&no_allowed_error_message("barkVolume", "Int")]
        );
    }

    #[test]
    fn enum_with_subselection_fails() {
        expect_fails_rule!(
            factory,
            r#"
          {
            cat {
              furColor {
                inHexdec
              }
            }
          }
        "#,
            &[&no_allowed_error_message("furColor", "FurColor")]
        );
    }
}

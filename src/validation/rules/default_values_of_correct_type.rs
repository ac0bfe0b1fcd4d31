use crate::{
    ast::VariableDefinition,
    parser::Spanning,
    types::utilities::is_valid_literal_value,
    validation::{ValidatorContext, Visitor},
};

pub struct DefaultValuesOfCorrectType;

pub fn factory() -> DefaultValuesOfCorrectType {
    DefaultValuesOfCorrectType
}

impl<'a> Visitor<'a> for DefaultValuesOfCorrectType {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, var_def): &'a (Spanning<String>, VariableDefinition),
    ) {
        let Some(default_value) = &var_def.default_value else {
            return;
        };

        // A default on a non-null variable makes the variable optional; the
        // literal itself is checked against the nullable form.
        let check_type = var_def.var_type.item.nullable();

        if !is_valid_literal_value(ctx.schema, &check_type, &default_value.item) {
            ctx.report_error(
                &error_message(&var_name.item, &var_def.var_type.item.to_string()),
                &[default_value.span.start],
            );
        }
    }
}

fn error_message(arg_name: &str, type_name: &str) -> String {
    format!("Invalid default value for argument \"{arg_name}\", expected type \"{type_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn variables_without_defaults() {
        expect_passes_rule!(
            factory,
            r#"
          query NullableValues($a: Int, $b: String, $c: ComplexInput) {
            dog { name }
          }
        "#
        );
    }

    #[test]
    fn valid_default_values() {
        expect_passes_rule!(
            factory,
            r#"
          query WithDefaultValues(
            $a: Int = 1,
            $b: String = "ok",
            $c: ComplexInput = { requiredField: true, intField: 3 }
          ) {
            dog { name }
          }
        "#
        );
    }

    #[test]
    fn non_null_variables_may_default() {
        expect_passes_rule!(
            factory,
            r#"
          query WithDefaults($a: Int! = 3, $empty: [Boolean!]! = []) {
            dog { name }
          }
        "#
        );
    }

    #[test]
    fn defaults_with_incorrect_types() {
        expect_fails_rule!(
            factory,
            r#"
          query InvalidDefaultValues($a: Int = "one", $b: String = 4) {
            dog { name }
          }
        "#,
            &[
                &error_message("a", "Int"),
                &error_message("b", "String"),
            ]
        );
    }

    #[test]
    fn complex_variables_missing_required_field() {
        expect_fails_rule!(
            factory,
            r#"
          query MissingRequiredField($a: ComplexInput = { intField: 3 }) {
            dog { name }
          }
        "#,
            &[&error_message("a", "ComplexInput")]
        );
    }
}

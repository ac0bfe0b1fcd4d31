use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::{Operation, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueVariableNames<'a> {
    names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueVariableNames<'a> {
    UniqueVariableNames {
        names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueVariableNames<'a> {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation>,
    ) {
        self.names = HashMap::new();
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (var_name, _): &'a (Spanning<String>, VariableDefinition),
    ) {
        match self.names.entry(&var_name.item) {
            Entry::Occupied(e) => {
                ctx.report_error(
                    &error_message(&var_name.item),
                    &[*e.get(), var_name.span.start],
                );
            }
            Entry::Vacant(e) => {
                e.insert(var_name.span.start);
            }
        }
    }
}

fn error_message(var_name: &str) -> String {
    format!("There can only be one variable named \"{var_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn unique_variable_names() {
        expect_passes_rule!(
            factory,
            r#"
          query A($x: Int, $y: String) { human(id: $x) { name(surname: true) } }
          query B($x: String, $y: Int) { complicatedArgs { stringArgField(stringArg: $x) } }
        "#
        );
    }

    #[test]
    fn duplicate_variable_names() {
        expect_fails_rule!(
            factory,
            r#"
          query A($x: Int, $x: Int, $x: String) { complicatedArgs { intArgField(intArg: $x) } }
        "#,
            &[&error_message("x"), &error_message("x")]
        );
    }
}

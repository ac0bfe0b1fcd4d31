use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, Operation, Type, VariableDefinition},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct VariablesInAllowedPosition<'a> {
    spreads: HashMap<Scope<'a>, HashSet<&'a str>>,
    variable_usages: HashMap<Scope<'a>, Vec<(Spanning<&'a str>, Type)>>,
    variable_defs: HashMap<Scope<'a>, Vec<&'a (Spanning<String>, VariableDefinition)>>,
    current_scope: Option<Scope<'a>>,
}

pub fn factory<'a>() -> VariablesInAllowedPosition<'a> {
    VariablesInAllowedPosition {
        spreads: HashMap::new(),
        variable_usages: HashMap::new(),
        variable_defs: HashMap::new(),
        current_scope: None,
    }
}

impl<'a> VariablesInAllowedPosition<'a> {
    fn collect_incorrect_usages(
        &self,
        from: &Scope<'a>,
        var_defs: &[&'a (Spanning<String>, VariableDefinition)],
        ctx: &mut ValidatorContext<'a>,
        visited: &mut HashSet<Scope<'a>>,
    ) {
        if visited.contains(from) {
            return;
        }

        visited.insert(from.clone());

        if let Some(usages) = self.variable_usages.get(from) {
            for (var_name, var_type) in usages {
                let Some((var_def_name, var_def)) = var_defs
                    .iter()
                    .find(|(n, _)| n.item == var_name.item)
                    .map(|(n, d)| (n, d))
                else {
                    continue;
                };

                // A nullable declaration with a default still satisfies a
                // non-null position.
                let expected_type = match (&var_def.default_value, &var_def.var_type.item) {
                    (Some(_), Type::List(inner)) => Type::NonNullList(inner.clone()),
                    (Some(_), Type::Named(name)) => Type::NonNullNamed(name.clone()),
                    (_, t) => t.clone(),
                };

                if !ctx.schema.is_subtype(&expected_type, var_type) {
                    ctx.report_error(
                        &error_message(
                            &var_def_name.item,
                            &expected_type.to_string(),
                            &var_type.to_string(),
                        ),
                        &[var_def_name.span.start, var_name.span.start],
                    );
                }
            }
        }

        if let Some(spreads) = self.spreads.get(from) {
            for spread in spreads {
                self.collect_incorrect_usages(&Scope::Fragment(spread), var_defs, ctx, visited);
            }
        }
    }
}

impl<'a> Visitor<'a> for VariablesInAllowedPosition<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        for (op_scope, var_defs) in &self.variable_defs {
            let mut visited = HashSet::new();
            self.collect_incorrect_usages(op_scope, var_defs, ctx, &mut visited);
        }
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        fragment: &'a Spanning<Fragment>,
    ) {
        self.current_scope = Some(Scope::Fragment(&fragment.item.name.item));
    }

    fn enter_fragment_spread(
        &mut self,
        _: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        if let Some(scope) = self.current_scope.clone() {
            self.spreads
                .entry(scope)
                .or_default()
                .insert(&spread.item.name.item);
        }
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        let op_name = op.item.name.as_ref().map(|n| n.item.as_str());
        self.current_scope = Some(Scope::Operation(op_name));
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        def: &'a (Spanning<String>, VariableDefinition),
    ) {
        if let Some(scope) = self.current_scope.clone() {
            self.variable_defs.entry(scope).or_default().push(def);
        }
    }

    fn enter_variable_value(&mut self, ctx: &mut ValidatorContext<'a>, var_name: Spanning<&'a str>) {
        if let (Some(scope), Some(input_type)) =
            (self.current_scope.clone(), ctx.current_input_type_literal())
        {
            self.variable_usages
                .entry(scope)
                .or_default()
                .push((var_name, input_type.clone()));
        }
    }
}

fn error_message(var_name: &str, type_name: &str, expected_type_name: &str) -> String {
    format!(
        "Variable \"${var_name}\" of type \"{type_name}\" used in position expecting type \"{expected_type_name}\"",
    )
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn exact_type_match() {
        expect_passes_rule!(
            factory,
            r#"
          query Query($intArg: Int) {
            complicatedArgs {
              intArgField(intArg: $intArg)
            }
          }
        "#
        );
    }

    #[test]
    fn non_null_into_nullable_position() {
        expect_passes_rule!(
            factory,
            r#"
          query Query($intArg: Int!) {
            complicatedArgs {
              intArgField(intArg: $intArg)
            }
          }
        "#
        );
    }

    #[test]
    fn nullable_with_default_into_non_null_position() {
        expect_passes_rule!(
            factory,
            r#"
          query Query($intArg: Int = 1) {
            complicatedArgs {
              nonNullIntArgField(nonNullIntArg: $intArg)
            }
          }
        "#
        );
    }

    #[test]
    fn usage_through_fragment() {
        expect_passes_rule!(
            factory,
            r#"
          query Query($stringArg: String) {
            complicatedArgs {
              ...stringFragment
            }
          }
          fragment stringFragment on ComplicatedArgs {
            stringArgField(stringArg: $stringArg)
          }
        "#
        );
    }

    #[test]
    fn nullable_into_non_null_position() {
        expect_fails_rule!(
            factory,
            r#"
          query Query($intArg: Int) {
            complicatedArgs {
              nonNullIntArgField(nonNullIntArg: $intArg)
            }
          }
        "#,
            &[&error_message("intArg", "Int", "Int!")]
        );
    }

    #[test]
    fn wrong_scalar_type() {
        expect_fails_rule!(
            factory,
            r#"
          query Query($stringArg: String) {
            complicatedArgs {
              intArgField(intArg: $stringArg)
            }
          }
        "#,
            &[&error_message("stringArg", "String", "Int")]
        );
    }

    #[test]
    fn wrong_type_through_fragment() {
        expect_fails_rule!(
            factory,
            r#"
          query Query($booleanArg: Boolean) {
            complicatedArgs {
              ...intFragment
            }
          }
          fragment intFragment on ComplicatedArgs {
            intArgField(intArg: $booleanArg)
          }
        "#,
            &[&error_message("booleanArg", "Boolean", "Int")]
        );
    }

    #[test]
    fn string_into_string_list_position() {
        expect_fails_rule!(
            factory,
            r#"
          query Query($stringVar: String) {
            complicatedArgs {
              stringListArgField(stringListArg: $stringVar)
            }
          }
        "#,
            &[&error_message("stringVar", "String", "[String]")]
        );
    }
}

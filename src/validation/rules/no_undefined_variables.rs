use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, Operation, VariableDefinition},
    parser::{SourcePosition, Spanning},
    validation::{RuleError, ValidatorContext, Visitor},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct NoUndefinedVariables<'a> {
    defined_variables: HashMap<Option<&'a str>, (SourcePosition, HashSet<&'a str>)>,
    used_variables: HashMap<Scope<'a>, Vec<Spanning<&'a str>>>,
    current_scope: Option<Scope<'a>>,
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
}

pub fn factory<'a>() -> NoUndefinedVariables<'a> {
    NoUndefinedVariables {
        defined_variables: HashMap::new(),
        used_variables: HashMap::new(),
        current_scope: None,
        spreads: HashMap::new(),
    }
}

impl<'a> NoUndefinedVariables<'a> {
    fn find_undef_vars(
        &self,
        scope: &Scope<'a>,
        defined: &HashSet<&'a str>,
        unused: &mut Vec<Spanning<&'a str>>,
        visited: &mut HashSet<Scope<'a>>,
    ) {
        if visited.contains(scope) {
            return;
        }

        visited.insert(scope.clone());

        if let Some(used_vars) = self.used_variables.get(scope) {
            for var in used_vars {
                if !defined.contains(var.item) {
                    unused.push(*var);
                }
            }
        }

        if let Some(spreads) = self.spreads.get(scope) {
            for spread in spreads {
                self.find_undef_vars(&Scope::Fragment(spread), defined, unused, visited);
            }
        }
    }
}

impl<'a> Visitor<'a> for NoUndefinedVariables<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, _: &'a Document) {
        let mut errors = Vec::new();

        for (op_name, (pos, def_vars)) in &self.defined_variables {
            let mut unused = Vec::new();
            let mut visited = HashSet::new();
            self.find_undef_vars(
                &Scope::Operation(*op_name),
                def_vars,
                &mut unused,
                &mut visited,
            );

            for var in unused {
                errors.push(RuleError::new(
                    &error_message(var.item, *op_name),
                    &[var.span.start, *pos],
                ));
            }
        }

        ctx.append_errors(errors);
    }

    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        let op_name = op.item.name.as_ref().map(|n| n.item.as_str());
        self.current_scope = Some(Scope::Operation(op_name));
        self.defined_variables
            .insert(op_name, (op.span.start, HashSet::new()));
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment>,
    ) {
        self.current_scope = Some(Scope::Fragment(&f.item.name.item));
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
                .push(&spread.item.name.item);
        }
    }

    fn enter_variable_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        (var_name, _): &'a (Spanning<String>, VariableDefinition),
    ) {
        if let Some(Scope::Operation(ref name)) = self.current_scope {
            if let Some(&mut (_, ref mut vars)) = self.defined_variables.get_mut(name) {
                vars.insert(&var_name.item);
            }
        }
    }

    fn enter_variable_value(&mut self, _: &mut ValidatorContext<'a>, var: Spanning<&'a str>) {
        if let Some(scope) = self.current_scope.clone() {
            self.used_variables
                .entry(scope)
                .or_default()
                .push(var);
        }
    }
}

fn error_message(var_name: &str, op_name: Option<&str>) -> String {
    if let Some(op_name) = op_name {
        format!("Variable \"${var_name}\" is not defined by operation \"{op_name}\"")
    } else {
        format!("Variable \"${var_name}\" is not defined")
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_variables_defined() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo($a: String, $b: String) {
            complicatedArgs {
              first: stringArgField(stringArg: $a)
              second: stringArgField(stringArg: $b)
            }
          }
        "#
        );
    }

    #[test]
    fn variables_defined_and_used_in_fragments() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo($a: String) {
            complicatedArgs {
              ...FragA
            }
          }
          fragment FragA on ComplicatedArgs {
            stringArgField(stringArg: $a)
          }
        "#
        );
    }

    #[test]
    fn undefined_variable() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo($a: String) {
            complicatedArgs {
              stringArgField(stringArg: $b)
            }
          }
        "#,
            &[&error_message("b", Some("Foo"))]
        );
    }

    #[test]
    fn undefined_variable_in_fragment() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo {
            complicatedArgs {
              ...FragA
            }
          }
          fragment FragA on ComplicatedArgs {
            stringArgField(stringArg: $missing)
          }
        "#,
            &[&error_message("missing", Some("Foo"))]
        );
    }
}

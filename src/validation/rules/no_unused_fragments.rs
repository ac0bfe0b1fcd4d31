use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Document, Fragment, FragmentSpread, Operation},
    parser::Spanning,
    validation::{RuleError, ValidatorContext, Visitor},
};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Scope<'a> {
    Operation(Option<&'a str>),
    Fragment(&'a str),
}

pub struct NoUnusedFragments<'a> {
    spreads: HashMap<Scope<'a>, Vec<&'a str>>,
    defined_fragments: Vec<Spanning<&'a str>>,
    current_scope: Option<Scope<'a>>,
}

pub fn factory<'a>() -> NoUnusedFragments<'a> {
    NoUnusedFragments {
        spreads: HashMap::new(),
        defined_fragments: Vec::new(),
        current_scope: None,
    }
}

impl<'a> NoUnusedFragments<'a> {
    fn find_reachable_fragments(&self, from: &Scope<'a>, result: &mut HashSet<&'a str>) {
        if let Scope::Fragment(name) = from {
            if result.contains(name) {
                return;
            }
            result.insert(name);
        }

        if let Some(spreads) = self.spreads.get(from) {
            for spread in spreads {
                self.find_reachable_fragments(&Scope::Fragment(spread), result);
            }
        }
    }
}

impl<'a> Visitor<'a> for NoUnusedFragments<'a> {
    fn exit_document(&mut self, ctx: &mut ValidatorContext<'a>, d: &'a Document) {
        let mut reachable = HashSet::new();

        for op in d.operations() {
            let op_name = op.item.name.as_ref().map(|n| n.item.as_str());
            self.find_reachable_fragments(&Scope::Operation(op_name), &mut reachable);
        }

        for fragment in &self.defined_fragments {
            if !reachable.contains(fragment.item) {
                ctx.append_errors(vec![RuleError::new(
                    &error_message(fragment.item),
                    &[fragment.span.start],
                )]);
            }
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

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment>,
    ) {
        let name = f.item.name.item.as_str();
        self.current_scope = Some(Scope::Fragment(name));
        self.defined_fragments
            .push(Spanning::new(f.item.name.span, name));
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
}

fn error_message(frag_name: &str) -> String {
    format!("Fragment \"{frag_name}\" is never used")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn all_fragments_used() {
        expect_passes_rule!(
            factory,
            r#"
          {
            human(id: 4) {
              ...HumanFields1
              ... on Human {
                ...HumanFields2
              }
            }
          }
          fragment HumanFields1 on Human {
            name(surname: true)
            ...HumanFields3
          }
          fragment HumanFields2 on Human { name }
          fragment HumanFields3 on Human { name }
        "#
        );
    }

    #[test]
    fn unused_fragments_reported() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo {
            human(id: 4) {
              ...HumanFields1
            }
          }
          fragment HumanFields1 on Human { name }
          fragment Unused1 on Human { name }
          fragment Unused2 on Human { name }
        "#,
            &[&error_message("Unused1"), &error_message("Unused2")]
        );
    }

    #[test]
    fn fragments_reachable_only_from_fragments_are_unused() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo {
            human(id: 4) { name }
          }
          fragment Unused1 on Human {
            name
            ...Unused2
          }
          fragment Unused2 on Human { name }
        "#,
            &[&error_message("Unused1"), &error_message("Unused2")]
        );
    }
}

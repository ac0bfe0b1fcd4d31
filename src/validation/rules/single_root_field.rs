use std::collections::{HashMap, HashSet};

use crate::{
    ast::{Definition, Document, Fragment, Operation, OperationType, Selection},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct SingleRootField<'a> {
    fragments: HashMap<&'a str, &'a Spanning<Fragment>>,
}

pub fn factory<'a>() -> SingleRootField<'a> {
    SingleRootField {
        fragments: HashMap::new(),
    }
}

impl<'a> SingleRootField<'a> {
    /// Counts the top-level fields of a selection after expanding fragment
    /// spreads; cycles are already rejected by another rule.
    fn count_root_fields(&self, selection_set: &[Selection], visited: &mut HashSet<&'a str>) -> usize {
        let mut count = 0;

        for selection in selection_set {
            match selection {
                Selection::Field(..) => count += 1,
                Selection::InlineFragment(frag) => {
                    count += self.count_root_fields(&frag.item.selection_set, visited);
                }
                Selection::FragmentSpread(spread) => {
                    let Some(fragment) = self.fragments.get(spread.item.name.item.as_str())
                    else {
                        continue;
                    };
                    if visited.insert(&fragment.item.name.item) {
                        count += self.count_root_fields(&fragment.item.selection_set, visited);
                    }
                }
            }
        }

        count
    }
}

impl<'a> Visitor<'a> for SingleRootField<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, doc: &'a Document) {
        for def in &doc.definitions {
            if let Definition::Fragment(f) = def {
                self.fragments.insert(&f.item.name.item, f);
            }
        }
    }

    fn enter_operation_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        op: &'a Spanning<Operation>,
    ) {
        if op.item.operation_type != OperationType::Subscription {
            return;
        }

        let mut visited = HashSet::new();
        if self.count_root_fields(&op.item.selection_set, &mut visited) > 1 {
            let name = op.item.name.as_ref().map(|n| n.item.as_str());
            ctx.report_error(&error_message(name), &[op.span.start]);
        }
    }
}

fn error_message(op_name: Option<&str>) -> String {
    match op_name {
        Some(name) => format!("Subscription \"{name}\" has more than one root field"),
        None => "Subscription has more than one root field".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn queries_may_have_many_roots() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo {
            dog { name }
            cat { name }
          }
        "#
        );
    }

    #[test]
    fn single_root_subscription() {
        expect_passes_rule!(
            factory,
            r#"
          subscription Sub {
            newMessage { body }
          }
        "#
        );
    }

    #[test]
    fn single_root_through_fragment() {
        expect_passes_rule!(
            factory,
            r#"
          subscription Sub {
            ...newMessageFields
          }
          fragment newMessageFields on SubscriptionRoot {
            newMessage { body }
          }
        "#
        );
    }

    #[test]
    fn two_roots_fail() {
        expect_fails_rule!(
            factory,
            r#"
          subscription S {
            newMessage { body }
            disturbance
          }
        "#,
            &[&error_message(Some("S"))]
        );
    }

    #[test]
    fn two_roots_through_fragment_fail() {
        expect_fails_rule!(
            factory,
            r#"
          subscription Sub {
            ...multipleFields
          }
          fragment multipleFields on SubscriptionRoot {
            newMessage { body }
            disturbance
          }
        "#,
            &[&error_message(Some("Sub"))]
        );
    }

    #[test]
    fn anonymous_subscription_with_two_roots_fails() {
        expect_fails_rule!(
            factory,
            r#"
          subscription {
            newMessage { body }
            disturbance
          }
        "#,
            &[&error_message(None)]
        );
    }
}

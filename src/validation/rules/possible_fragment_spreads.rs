use std::collections::HashMap;

use crate::{
    ast::{Definition, Document, FragmentSpread, InlineFragment},
    parser::Spanning,
    schema::NamedType,
    validation::{ValidatorContext, Visitor},
};

pub struct PossibleFragmentSpreads<'a> {
    fragment_types: HashMap<&'a str, &'a str>,
}

pub fn factory<'a>() -> PossibleFragmentSpreads<'a> {
    PossibleFragmentSpreads {
        fragment_types: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for PossibleFragmentSpreads<'a> {
    fn enter_document(&mut self, _: &mut ValidatorContext<'a>, defs: &'a Document) {
        for def in &defs.definitions {
            if let Definition::Fragment(f) = def {
                self.fragment_types
                    .insert(&f.item.name.item, &f.item.type_condition.item);
            }
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        frag: &'a Spanning<InlineFragment>,
    ) {
        let (Some(frag_type), Some(parent_type)) = (ctx.current_type(), ctx.parent_type()) else {
            return;
        };

        if !can_overlap(ctx, frag_type, parent_type) {
            ctx.report_error(
                &inline_error_message(&parent_type.name, &frag_type.name),
                &[frag.span.start],
            );
        }
    }

    fn enter_fragment_spread(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        spread: &'a Spanning<FragmentSpread>,
    ) {
        let Some(frag_type) = self
            .fragment_types
            .get(spread.item.name.item.as_str())
            .and_then(|name| ctx.schema.concrete_type_by_name(name))
        else {
            return;
        };
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };

        if !can_overlap(ctx, frag_type, parent_type) {
            ctx.report_error(
                &spread_error_message(
                    &spread.item.name.item,
                    &parent_type.name,
                    &frag_type.name,
                ),
                &[spread.span.start],
            );
        }
    }
}

fn can_overlap(ctx: &ValidatorContext<'_>, frag_type: &NamedType, parent_type: &NamedType) -> bool {
    if !frag_type.is_composite() || !parent_type.is_composite() {
        // Conditions on non-composite types are reported elsewhere.
        return true;
    }

    ctx.schema.type_overlap(parent_type, frag_type)
}

fn spread_error_message(frag_name: &str, parent_type: &str, frag_type: &str) -> String {
    format!(
        "Fragment \"{frag_name}\" cannot be spread here as objects of type \"{parent_type}\" can never be of type \"{frag_type}\"",
    )
}

fn inline_error_message(parent_type: &str, frag_type: &str) -> String {
    format!(
        "Fragment cannot be spread here as objects of type \"{parent_type}\" can never be of type \"{frag_type}\"",
    )
}

#[cfg(test)]
mod tests {
    use super::{factory, inline_error_message, spread_error_message};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn same_object_spread() {
        expect_passes_rule!(
            factory,
            r#"
          fragment objectWithinObject on Dog { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }

          { dog { ...objectWithinObject } }
        "#
        );
    }

    #[test]
    fn object_into_implemented_interface() {
        expect_passes_rule!(
            factory,
            r#"
          fragment objectWithinInterface on Pet { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }

          { pet { ...objectWithinInterface } }
        "#
        );
    }

    #[test]
    fn object_into_containing_union() {
        expect_passes_rule!(
            factory,
            r#"
          fragment objectWithinUnion on CatOrDog { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }

          { catOrDog { ...objectWithinUnion } }
        "#
        );
    }

    #[test]
    fn interface_into_overlapping_union() {
        expect_passes_rule!(
            factory,
            r#"
          fragment petWithinUnion on CatOrDog { ...petFragment }
          fragment petFragment on Pet { name }

          { catOrDog { ...petWithinUnion } }
        "#
        );
    }

    #[test]
    fn different_object_into_object() {
        expect_fails_rule!(
            factory,
            r#"
          fragment invalidObjectWithinObject on Cat { ...dogFragment }
          fragment dogFragment on Dog { barkVolume }

          { cat { ...invalidObjectWithinObject } }
        "#,
            &[&spread_error_message("dogFragment", "Cat", "Dog")]
        );
    }

    #[test]
    fn inline_object_into_disjoint_object() {
        expect_fails_rule!(
            factory,
            r#"
          fragment invalidObjectWithinObjectAnon on Cat {
            ... on Dog { barkVolume }
          }

          { cat { ...invalidObjectWithinObjectAnon } }
        "#,
            &[&inline_error_message("Cat", "Dog")]
        );
    }

    #[test]
    fn object_into_disjoint_union() {
        expect_fails_rule!(
            factory,
            r#"
          fragment humanFragment on Human { iq }
          fragment invalidUnionSpread on CatOrDog { ...humanFragment }

          { catOrDog { ...invalidUnionSpread } }
        "#,
            &[&spread_error_message("humanFragment", "CatOrDog", "Human")]
        );
    }
}

use crate::{
    ast::Field,
    parser::Spanning,
    schema::NamedTypeKind,
    validation::{ValidatorContext, Visitor},
};

pub struct FieldsOnCorrectType;

pub fn factory() -> FieldsOnCorrectType {
    FieldsOnCorrectType
}

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let Some(parent_type) = ctx.parent_type() else {
            return;
        };

        let field_name = &field.item.name.item;

        // `__typename` applies to every composite scope, and is the only
        // field selectable on a union.
        if field_name == "__typename" && parent_type.is_composite() {
            return;
        }

        // The query root additionally exposes the introspection entry points.
        if matches!(field_name.as_str(), "__schema" | "__type")
            && parent_type.name == ctx.schema.query_type().name
        {
            return;
        }

        let exists = match &parent_type.kind {
            NamedTypeKind::Object { .. } | NamedTypeKind::Interface { .. } => {
                parent_type.field_by_name(field_name).is_some()
            }
            NamedTypeKind::Union { .. } => false,
            // Sub-selections on leaf types are reported by the scalar-leafs
            // rule, not here.
            _ => return,
        };

        if !exists {
            ctx.report_error(
                &error_message(field_name, &parent_type.name),
                &[field.span.start],
            );
        }
    }
}

fn error_message(field: &str, type_name: &str) -> String {
    format!("Unknown field \"{field}\" on type \"{type_name}\"")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn fields_on_object() {
        expect_passes_rule!(
            factory,
            r#"
          {
            dog {
              name
              barkVolume
              __typename
            }
          }
        "#
        );
    }

    #[test]
    fn aliased_fields_on_interface() {
        expect_passes_rule!(
            factory,
            r#"
          {
            pet {
              otherName: name
            }
          }
        "#
        );
    }

    #[test]
    fn typename_on_union() {
        expect_passes_rule!(
            factory,
            r#"
          {
            catOrDog {
              __typename
              ... on Dog { name }
            }
          }
        "#
        );
    }

    #[test]
    fn introspection_on_query_root() {
        expect_passes_rule!(
            factory,
            r#"
          {
            __schema { queryType { name } }
            __type(name: "Dog") { name }
          }
        "#
        );
    }

    #[test]
    fn unknown_field_on_object() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              meowVolume
            }
          }
        "#,
            &[&error_message("meowVolume", "Dog")]
        );
    }

    #[test]
    fn direct_field_on_union() {
        expect_fails_rule!(
            factory,
            r#"
          {
            catOrDog {
              directField
            }
          }
        "#,
            &[&error_message("directField", "CatOrDog")]
        );
    }

    #[test]
    fn unknown_field_on_interface() {
        expect_fails_rule!(
            factory,
            r#"
          {
            pet {
              tailLength
            }
          }
        "#,
            &[&error_message("tailLength", "Pet")]
        );
    }
}

use crate::{
    ast::{TypeSystemDefinition, TypeDefinition},
    parser::SourcePosition,
    validation::{ValidatorContext, Visitor},
};

pub struct ExecutableDefinitions;

pub fn factory() -> ExecutableDefinitions {
    ExecutableDefinitions
}

impl<'a> Visitor<'a> for ExecutableDefinitions {
    fn enter_type_system_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        def: &'a TypeSystemDefinition,
    ) {
        let (name, pos) = describe(def);
        ctx.report_error(&error_message(&name), &[pos]);
    }
}

fn describe(def: &TypeSystemDefinition) -> (String, SourcePosition) {
    match def {
        TypeSystemDefinition::Schema(d) => ("schema".into(), d.span.start),
        TypeSystemDefinition::SchemaExtension(d) => ("schema".into(), d.span.start),
        TypeSystemDefinition::Directive(d) => (format!("@{}", d.item.name.item), d.span.start),
        TypeSystemDefinition::Type(d) | TypeSystemDefinition::TypeExtension(d) => {
            (type_name(&d.item), d.span.start)
        }
    }
}

fn type_name(def: &TypeDefinition) -> String {
    format!("\"{}\"", def.name().item)
}

fn error_message(def_name: &str) -> String {
    format!("The {def_name} definition is not executable")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn operations_and_fragments_only() {
        expect_passes_rule!(
            factory,
            r#"
          query Foo {
            dog {
              ...fragA
            }
          }
          fragment fragA on Dog { name }
        "#
        );
    }

    #[test]
    fn type_definition_in_request() {
        expect_fails_rule!(
            factory,
            r#"
          query Foo { dog { name } }

          type Cow {
            moos: Boolean
          }
        "#,
            &[&error_message("\"Cow\"")]
        );
    }

    #[test]
    fn schema_definition_in_request() {
        expect_fails_rule!(
            factory,
            r#"
          schema {
            query: QueryRoot
          }

          query Foo { dog { name } }
        "#,
            &[&error_message("schema")]
        );
    }
}

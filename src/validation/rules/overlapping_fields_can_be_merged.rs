use std::collections::HashMap;

use crate::{
    ast::{Field, Fragment, Operation},
    parser::{SourcePosition, Spanning},
    schema::NamedTypeKind,
    validation::{ValidatorContext, Visitor},
};

/// What a response key was first resolved to within one scope.
struct FieldEntry<'a> {
    return_type: Option<String>,
    object_type: Option<String>,
    field_name: &'a str,
    arguments: String,
    position: SourcePosition,
}

/// Checks that selections sharing a response key are mergeable.
///
/// Keeps an alias table per enclosing field (inline fragments share their
/// parent's table, since their fields land in the same response map): two
/// entries must agree on the wrapped return type, and when they can apply to
/// the same concrete object type they must also agree on field name and
/// arguments.
pub struct OverlappingFieldsCanBeMerged<'a> {
    scope_stack: Vec<HashMap<&'a str, FieldEntry<'a>>>,
}

pub fn factory<'a>() -> OverlappingFieldsCanBeMerged<'a> {
    OverlappingFieldsCanBeMerged {
        scope_stack: Vec::new(),
    }
}

impl<'a> OverlappingFieldsCanBeMerged<'a> {
    fn register_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        let return_type = ctx.current_type_literal().map(ToString::to_string);

        let object_type = ctx.parent_type().and_then(|t| match t.kind {
            NamedTypeKind::Object { .. } => Some(t.name.clone()),
            _ => None,
        });

        let entry = FieldEntry {
            return_type,
            object_type,
            field_name: &field.item.name.item,
            arguments: normalized_arguments(field),
            position: field.span.start,
        };

        let Some(scope) = self.scope_stack.last_mut() else {
            return;
        };

        let response_name = field.item.response_name();
        let Some(existing) = scope.get(response_name) else {
            scope.insert(response_name, entry);
            return;
        };

        if let Some(reason) = merge_conflict(existing, &entry) {
            ctx.report_error(
                &error_message(response_name, reason),
                &[existing.position, field.span.start],
            );
        }
    }
}

/// Whether two entries for one response key cannot be merged, and why.
fn merge_conflict(existing: &FieldEntry<'_>, new: &FieldEntry<'_>) -> Option<&'static str> {
    if existing.return_type != new.return_type {
        return Some("they return conflicting types");
    }

    // Two different concrete object types never apply to the same runtime
    // object, so their selections can coexist.
    if let (Some(a), Some(b)) = (&existing.object_type, &new.object_type) {
        if a != b {
            return None;
        }
    }

    if existing.field_name != new.field_name {
        return Some("they resolve different fields");
    }

    if existing.arguments != new.arguments {
        return Some("they have differing arguments");
    }

    None
}

fn normalized_arguments(field: &Spanning<Field>) -> String {
    let Some(args) = &field.item.arguments else {
        return String::new();
    };

    let mut rendered: Vec<String> = args
        .item
        .iter()
        .map(|(name, value)| format!("{}:{}", name.item, value.item))
        .collect();
    rendered.sort_unstable();
    rendered.join(",")
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation>,
    ) {
        self.scope_stack.push(HashMap::new());
    }

    fn exit_operation_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Operation>,
    ) {
        self.scope_stack.pop();
    }

    fn enter_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment>,
    ) {
        self.scope_stack.push(HashMap::new());
    }

    fn exit_fragment_definition(
        &mut self,
        _: &mut ValidatorContext<'a>,
        _: &'a Spanning<Fragment>,
    ) {
        self.scope_stack.pop();
    }

    fn enter_field(&mut self, ctx: &mut ValidatorContext<'a>, field: &'a Spanning<Field>) {
        self.register_field(ctx, field);
        self.scope_stack.push(HashMap::new());
    }

    fn exit_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.scope_stack.pop();
    }
}

fn error_message(response_name: &str, reason: &str) -> String {
    format!("Conflicting field \"{response_name}\": {reason}")
}

#[cfg(test)]
mod tests {
    use super::{error_message, factory};
    use crate::validation::test_harness::{expect_fails_rule, expect_passes_rule};

    #[test]
    fn unique_fields() {
        expect_passes_rule!(
            factory,
            r#"
          fragment uniqueFields on Dog {
            name
            nickname
          }
          { dog { ...uniqueFields } }
        "#
        );
    }

    #[test]
    fn identical_fields() {
        expect_passes_rule!(
            factory,
            r#"
          fragment mergeIdenticalFields on Dog {
            name
            name
          }
          { dog { ...mergeIdenticalFields } }
        "#
        );
    }

    #[test]
    fn identical_fields_with_identical_args() {
        expect_passes_rule!(
            factory,
            r#"
          fragment mergeIdenticalFieldsWithIdenticalArgs on Dog {
            doesKnowCommand(dogCommand: SIT)
            doesKnowCommand(dogCommand: SIT)
          }
          { dog { ...mergeIdenticalFieldsWithIdenticalArgs } }
        "#
        );
    }

    #[test]
    fn different_args_with_different_aliases() {
        expect_passes_rule!(
            factory,
            r#"
          fragment differentArgsWithDifferentAliases on Dog {
            knowsSit: doesKnowCommand(dogCommand: SIT)
            knowsDown: doesKnowCommand(dogCommand: DOWN)
          }
          { dog { ...differentArgsWithDifferentAliases } }
        "#
        );
    }

    #[test]
    fn same_aliases_on_different_concrete_types() {
        expect_passes_rule!(
            factory,
            r#"
          {
            pet {
              ... on Dog { volume: barkVolume }
              ... on Cat { volume: meowVolume }
            }
          }
        "#
        );
    }

    #[test]
    fn conflicting_args() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              a: doesKnowCommand(dogCommand: SIT)
              a: doesKnowCommand(dogCommand: HEEL)
            }
          }
        "#,
            &[&error_message("a", "they have differing arguments")]
        );
    }

    #[test]
    fn alias_masking_direct_field_access() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              name: nickname
              name
            }
          }
        "#,
            &[&error_message("name", "they resolve different fields")]
        );
    }

    #[test]
    fn conflicting_return_types() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              mixed: name
              mixed: barkVolume
            }
          }
        "#,
            &[&error_message("mixed", "they return conflicting types")]
        );
    }

    #[test]
    fn deep_conflict_is_scoped_to_its_selection() {
        expect_fails_rule!(
            factory,
            r#"
          {
            dog {
              x: name
            }
            cat {
              x: name
              x: nickname
            }
          }
        "#,
            &[&error_message("x", "they resolve different fields")]
        );
    }
}

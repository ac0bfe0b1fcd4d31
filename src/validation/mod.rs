//! Request validation: a single pass over a parsed executable document,
//! enforcing the static rules of the GraphQL specification against a
//! schema.

mod context;
mod input_value;
mod multi_visitor;
pub mod rules;
mod traits;
mod visitor;

#[cfg(test)]
#[macro_use]
pub(crate) mod test_harness;

use crate::{ast::Document, schema::Schema};

pub use self::context::{RuleError, ValidatorContext};
pub use self::input_value::validate_input_values;
pub use self::multi_visitor::{MultiVisitorCons, MultiVisitorNil};
pub use self::traits::Visitor;
pub use self::visitor::visit;

/// Validates an executable document against a schema.
///
/// Returns the accumulated rule violations, sorted by source position; an
/// empty vector means the document may be executed.
pub fn validate(schema: &Schema, document: &Document) -> Vec<RuleError> {
    let mut ctx = ValidatorContext::new(schema, document);
    visit_all_rules(&mut ctx, document);
    ctx.into_errors()
}

#[doc(hidden)]
pub fn visit_all_rules<'a>(ctx: &mut ValidatorContext<'a>, doc: &'a Document) {
    let mut mv = MultiVisitorNil
        .with(rules::arguments_of_correct_type::factory())
        .with(rules::default_values_of_correct_type::factory())
        .with(rules::executable_definitions::factory())
        .with(rules::fields_on_correct_type::factory())
        .with(rules::fragments_on_composite_types::factory())
        .with(rules::known_argument_names::factory())
        .with(rules::known_directives::factory())
        .with(rules::known_fragment_names::factory())
        .with(rules::known_type_names::factory())
        .with(rules::lone_anonymous_operation::factory())
        .with(rules::no_fragment_cycles::factory())
        .with(rules::no_undefined_variables::factory())
        .with(rules::no_unused_fragments::factory())
        .with(rules::overlapping_fields_can_be_merged::factory())
        .with(rules::possible_fragment_spreads::factory())
        .with(rules::provided_required_arguments::factory())
        .with(rules::scalar_leafs::factory())
        .with(rules::single_root_field::factory())
        .with(rules::unique_argument_names::factory())
        .with(rules::unique_fragment_names::factory())
        .with(rules::unique_input_field_names::factory())
        .with(rules::unique_operation_names::factory())
        .with(rules::unique_variable_names::factory())
        .with(rules::variables_are_input_types::factory())
        .with(rules::variables_in_allowed_position::factory());

    visit(&mut mv, ctx, doc);
}

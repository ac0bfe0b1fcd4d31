use crate::{
    ast::{Fragment, InlineFragment},
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

pub struct FragmentsOnCompositeTypes;

pub fn factory() -> FragmentsOnCompositeTypes {
    FragmentsOnCompositeTypes
}

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<Fragment>,
    ) {
        if ctx.current_type().is_some_and(|t| !t.is_composite()) {
            ctx.report_error(
                &error_message(
                    Some(&f.item.name.item),
                    &f.item.type_condition.item,
                ),
                &[f.item.type_condition.span.start],
            );
        }
    }

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        f: &'a Spanning<InlineFragment>,
    ) {
        let Some(type_cond) = &f.item.type_condition else {
            return;
        };

        if ctx.current_type().is_some_and(|t| !t.is_composite()) {
            ctx.report_error(
                &error_message(None, &type_cond.item),
                &[type_cond.span.start],
            );
        }
    }
}

fn error_message(fragment_name: Option<&str>, on_type: &str) -> String {
    match fragment_name {
        Some(name) => {
            format!("Fragment \"{name}\" cannot condition on non composite type \"{on_type}\"")
        }
        None => format!("Fragment cannot condition on non composite type \"{on_type}\""),
    }
}

use std::collections::hash_map::{Entry, HashMap};

use crate::{
    ast::{Directive, Field, InputValue},
    parser::{SourcePosition, Spanning},
    validation::{ValidatorContext, Visitor},
};

pub struct UniqueArgumentNames<'a> {
    known_names: HashMap<&'a str, SourcePosition>,
}

pub fn factory<'a>() -> UniqueArgumentNames<'a> {
    UniqueArgumentNames {
        known_names: HashMap::new(),
    }
}

impl<'a> Visitor<'a> for UniqueArgumentNames<'a> {
    fn enter_directive(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Directive>) {
        self.known_names = HashMap::new();
    }

    fn enter_field(&mut self, _: &mut ValidatorContext<'a>, _: &'a Spanning<Field>) {
        self.known_names = HashMap::new();
    }

    fn enter_argument(
        &mut self,
        ctx: &mut ValidatorContext<'a>,
        (arg_name, _): &'a (Spanning<String>, Spanning<InputValue>),
    ) {
        match self.known_names.entry(&arg_name.item) {
            Entry::Occupied(e) => {
                ctx.report_error(
                    &error_message(&arg_name.item),
                    &[*e.get(), arg_name.span.start],
                );
            }
            Entry::Vacant(e) => {
                e.insert(arg_name.span.start);
            }
        }
    }
}

fn error_message(arg_name: &str) -> String {
    format!("There can be only one argument named \"{arg_name}\"")
}

use crate::{
    ast::{
        Directive, Document, Field, Fragment, FragmentSpread, InlineFragment, InputValue,
        Operation, Selection, TypeSystemDefinition, VariableDefinition,
    },
    parser::Spanning,
    validation::{ValidatorContext, Visitor},
};

#[doc(hidden)]
pub struct MultiVisitorNil;

impl MultiVisitorNil {
    #[doc(hidden)]
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

#[doc(hidden)]
pub struct MultiVisitorCons<A, B>(A, B);

impl<A, B> MultiVisitorCons<A, B> {
    #[doc(hidden)]
    pub fn with<V>(self, visitor: V) -> MultiVisitorCons<V, Self> {
        MultiVisitorCons(visitor, self)
    }
}

impl<'a> Visitor<'a> for MultiVisitorNil {}

/// Delegates every visitor callback to both halves of the cons cell.
macro_rules! delegate {
    ($($name:ident: $Type:ty,)*) => {
        $(
            fn $name(&mut self, ctx: &mut ValidatorContext<'a>, item: $Type) {
                self.0.$name(ctx, item);
                self.1.$name(ctx, item);
            }
        )*
    };
}

impl<'a, A, B> Visitor<'a> for MultiVisitorCons<A, B>
where
    A: Visitor<'a> + 'a,
    B: Visitor<'a> + 'a,
{
    delegate! {
        enter_document: &'a Document,
        exit_document: &'a Document,
        enter_operation_definition: &'a Spanning<Operation>,
        exit_operation_definition: &'a Spanning<Operation>,
        enter_fragment_definition: &'a Spanning<Fragment>,
        exit_fragment_definition: &'a Spanning<Fragment>,
        enter_type_system_definition: &'a TypeSystemDefinition,
        exit_type_system_definition: &'a TypeSystemDefinition,
        enter_variable_definition: &'a (Spanning<String>, VariableDefinition),
        exit_variable_definition: &'a (Spanning<String>, VariableDefinition),
        enter_directive: &'a Spanning<Directive>,
        exit_directive: &'a Spanning<Directive>,
        enter_argument: &'a (Spanning<String>, Spanning<InputValue>),
        exit_argument: &'a (Spanning<String>, Spanning<InputValue>),
        enter_selection_set: &'a [Selection],
        exit_selection_set: &'a [Selection],
        enter_field: &'a Spanning<Field>,
        exit_field: &'a Spanning<Field>,
        enter_fragment_spread: &'a Spanning<FragmentSpread>,
        exit_fragment_spread: &'a Spanning<FragmentSpread>,
        enter_inline_fragment: &'a Spanning<InlineFragment>,
        exit_inline_fragment: &'a Spanning<InlineFragment>,
        enter_null_value: Spanning<()>,
        exit_null_value: Spanning<()>,
        enter_int_value: Spanning<i32>,
        exit_int_value: Spanning<i32>,
        enter_float_value: Spanning<f64>,
        exit_float_value: Spanning<f64>,
        enter_string_value: Spanning<&'a str>,
        exit_string_value: Spanning<&'a str>,
        enter_boolean_value: Spanning<bool>,
        exit_boolean_value: Spanning<bool>,
        enter_enum_value: Spanning<&'a str>,
        exit_enum_value: Spanning<&'a str>,
        enter_variable_value: Spanning<&'a str>,
        exit_variable_value: Spanning<&'a str>,
        enter_list_value: Spanning<&'a Vec<Spanning<InputValue>>>,
        exit_list_value: Spanning<&'a Vec<Spanning<InputValue>>>,
        enter_object_value: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
        exit_object_value: Spanning<&'a Vec<(Spanning<String>, Spanning<InputValue>)>>,
        enter_object_field: &'a (Spanning<String>, Spanning<InputValue>),
        exit_object_field: &'a (Spanning<String>, Spanning<InputValue>),
    }
}

/// Constructs JSON-like [`Value`]s using JSON syntax.
///
/// Mostly used to build expected responses in tests and extension payloads
/// for field errors.
///
/// # Example
///
/// ```rust
/// # use graphql_service::{graphql_value, Value};
/// #
/// # let _: Value =
/// graphql_value!(null);
/// # let _: Value =
/// graphql_value!(1234);
/// # let _: Value =
/// graphql_value!("test");
/// # let _: Value =
/// graphql_value!([1234, "test", true]);
/// # let _: Value =
/// graphql_value!({"key": "value", "foo": 1234});
/// ```
///
/// [`Value`]: crate::Value
#[macro_export]
macro_rules! graphql_value {
    ///////////
    // Array //
    ///////////

    // Done with or without trailing comma.
    (@array [$($elems:expr),* $(,)?]) => {
        $crate::value::Value::list(vec![
            $( $crate::graphql_value!($elems), )*
        ])
    };

    // Next element is `null`.
    (@array [$($elems:expr,)*] null $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!(null)] $($rest)*
        )
    };

    // Next element is an array.
    (@array [$($elems:expr,)*] [$($array:tt)*] $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!([$($array)*])] $($rest)*
        )
    };

    // Next element is a map.
    (@array [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!({$($map)*})] $($rest)*
        )
    };

    // Next element is an expression followed by comma.
    (@array [$($elems:expr,)*] $next:expr, $($rest:tt)*) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!($next),] $($rest)*
        )
    };

    // Last element is an expression with no trailing comma.
    (@array [$($elems:expr,)*] $last:expr) => {
        $crate::graphql_value!(
            @array [$($elems,)* $crate::graphql_value!($last)]
        )
    };

    // Comma after the most recent element.
    (@array [$($elems:expr),*] , $($rest:tt)*) => {
        $crate::graphql_value!(@array [$($elems,)*] $($rest)*)
    };

    ////////////
    // Object //
    ////////////

    // Insert the current entry followed by trailing comma.
    (@object $object:ident [$key:expr] ($value:expr) , $($rest:tt)*) => {
        let _ = $object.add_field($key, $value);
        $crate::graphql_value!(@object $object $($rest)*);
    };

    // Insert the last entry without trailing comma.
    (@object $object:ident [$key:expr] ($value:expr)) => {
        let _ = $object.add_field($key, $value);
    };

    // Next value is `null`.
    (@object $object:ident $key:tt : null $($rest:tt)*) => {
        $crate::graphql_value!(@object $object [$key] ($crate::graphql_value!(null)) $($rest)*);
    };

    // Next value is an array.
    (@object $object:ident $key:tt : [$($array:tt)*] $($rest:tt)*) => {
        $crate::graphql_value!(
            @object $object [$key] ($crate::graphql_value!([$($array)*])) $($rest)*
        );
    };

    // Next value is a map.
    (@object $object:ident $key:tt : {$($map:tt)*} $($rest:tt)*) => {
        $crate::graphql_value!(
            @object $object [$key] ($crate::graphql_value!({$($map)*})) $($rest)*
        );
    };

    // Next value is an expression followed by comma.
    (@object $object:ident $key:tt : $value:expr , $($rest:tt)*) => {
        $crate::graphql_value!(@object $object [$key] ($crate::graphql_value!($value)) , $($rest)*);
    };

    // Last value is an expression with no trailing comma.
    (@object $object:ident $key:tt : $value:expr) => {
        $crate::graphql_value!(@object $object [$key] ($crate::graphql_value!($value)));
    };

    // Done.
    (@object $object:ident) => {};

    //////////////
    // Defaults //
    //////////////

    ([ $($arr:tt)* ]) => {
        $crate::graphql_value!(@array [] $($arr)*)
    };

    ({}) => {
        $crate::value::Value::object($crate::value::Object::with_capacity(0))
    };

    ({ $($map:tt)+ }) => {
        $crate::value::Value::object({
            let mut object = $crate::value::Object::with_capacity(0);
            $crate::graphql_value!(@object object $($map)*);
            object
        })
    };

    (null) => ($crate::value::Value::null());

    ($e:expr) => ($crate::value::Value::from($e));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::value::Value;

    #[test]
    fn scalars() {
        assert_eq!(graphql_value!(123), Value::Int(123));
        assert_eq!(graphql_value!(123.5), Value::Float(123.5));
        assert_eq!(graphql_value!("test"), Value::String("test".into()));
        assert_eq!(graphql_value!(false), Value::Bool(false));
        assert_eq!(graphql_value!(null), Value::Null);
        assert_eq!(graphql_value!(Some("test")), Value::String("test".into()));
    }

    #[test]
    fn lists() {
        assert_eq!(
            graphql_value!([123, "Test", false]),
            Value::list(vec![
                Value::Int(123),
                Value::String("Test".into()),
                Value::Bool(false),
            ]),
        );
        assert_eq!(
            graphql_value!([123, [1 + 2], 789]),
            Value::list(vec![
                Value::Int(123),
                Value::list(vec![Value::Int(3)]),
                Value::Int(789),
            ]),
        );
        assert_eq!(graphql_value!([]), Value::list(vec![]));
    }

    #[test]
    fn objects() {
        assert_eq!(
            graphql_value!({ "key": 123, "next": true }),
            Value::object(
                vec![("key", Value::Int(123)), ("next", Value::Bool(true))]
                    .into_iter()
                    .collect(),
            ),
        );
        assert_eq!(
            graphql_value!({ "nested": { "answer": [42] }, "slot": null }),
            Value::object(
                vec![
                    (
                        "nested",
                        Value::object(
                            vec![("answer", Value::list(vec![Value::Int(42)]))]
                                .into_iter()
                                .collect(),
                        ),
                    ),
                    ("slot", Value::Null),
                ]
                .into_iter()
                .collect(),
            ),
        );
    }

    #[test]
    fn display() {
        assert_eq!(graphql_value!(null).to_string(), "null");
        assert_eq!(graphql_value!([1, null, "foo"]).to_string(), "[1, null, \"foo\"]");
        assert_eq!(
            graphql_value!({ "int": 1, "string": "foo" }).to_string(),
            r#"{"int": 1, "string": "foo"}"#,
        );
    }
}

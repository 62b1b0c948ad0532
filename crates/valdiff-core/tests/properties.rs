use proptest::prelude::*;
use valdiff_core::assert::{self, AssertArgs, Engine};
use valdiff_core::{AssertError, Object, Value};

fn json_like() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1.0e9f64..1.0e9).prop_map(Value::Number),
        "[ -~\n]{0,24}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(|items| Object::array(items).into()),
            prop::collection::btree_map("[a-z_]{1,8}", inner, 0..6).prop_map(|props| {
                let object = Object::plain();
                for (key, value) in props {
                    object.insert(key, value);
                }
                object.into()
            }),
        ]
    })
}

proptest! {
    #[test]
    fn a_value_always_equals_itself(value in json_like()) {
        prop_assert!(assert::check(value.clone(), value).is_ok());
    }

    #[test]
    fn rebuilt_documents_compare_equal(value in json_like()) {
        let json = value.to_json().expect("json-like values convert");
        let rebuilt = Value::from_json_value(json.clone()).expect("converted back");
        let original = Value::from_json_value(json).expect("converted back");
        prop_assert!(assert::check(original, rebuilt).is_ok());
    }

    #[test]
    fn differences_always_render_both_blocks(actual in json_like(), expect in json_like()) {
        match Engine::default().assert(AssertArgs::new(actual, expect)) {
            Ok(()) => {}
            Err(AssertError::Assertion(err)) => {
                prop_assert!(err.diff().starts_with("actual: "));
                prop_assert!(err.diff().contains("\n---\nexpect: "));
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }
}

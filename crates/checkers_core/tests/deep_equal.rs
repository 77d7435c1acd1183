//! Integration tests for `checkers_core::deep_equal`.
//!
//! These lock in the exact mismatch text, since `DeepEquals` failures are shown to users verbatim.

use std::collections::{BTreeMap, HashMap};

use checkers_core::{MismatchKind, PathElem, StructValue, Value, deep_equal};

fn mismatch(obtained: impl Into<Value>, expected: impl Into<Value>) -> String {
    match deep_equal(&obtained.into(), &expected.into()) {
        Ok(()) => panic!("values unexpectedly compared equal"),
        Err(err) => err.to_string(),
    }
}

#[test]
fn maps_differing_at_one_key() {
    let obtained: HashMap<&str, Value> = HashMap::from([("foo", 1234.into()), ("bar", "result".into())]);
    let expected: HashMap<&str, Value> = HashMap::from([("foo", 1234.into()), ("bar", "something".into())]);
    insta::assert_snapshot!(
        mismatch(obtained, expected),
        @r#"mismatch at ["bar"]: unequal; obtained "result"; expected "something""#
    );
}

#[test]
fn map_key_missing_on_expected_side() {
    let obtained = BTreeMap::from([("a", 1), ("b", 2)]);
    let expected = BTreeMap::from([("a", 1), ("c", 2)]);
    insta::assert_snapshot!(
        mismatch(obtained, expected),
        @r#"mismatch at ["b"]: validity mismatch; obtained 2; expected nil"#
    );
}

#[test]
fn map_length_mismatch() {
    let obtained = BTreeMap::from([(1u8, true)]);
    let expected = BTreeMap::from([(1u8, true), (2u8, false)]);
    insta::assert_snapshot!(
        mismatch(obtained, expected),
        @"mismatch at top level: length mismatch, 1 vs 2; obtained {1: true}; expected {1: true, 2: false}"
    );
}

#[test]
fn nested_sequence_index_path() {
    let obtained = vec![vec![1, 2], vec![3, 4]];
    let expected = vec![vec![1, 2], vec![3, 5]];
    insta::assert_snapshot!(
        mismatch(obtained, expected),
        @"mismatch at [1][1]: unequal; obtained 4; expected 5"
    );
}

#[test]
fn struct_inside_map_inside_struct() {
    let inner = |port: u16| StructValue::new("Endpoint").with_field("port", port);
    let config = |port: u16| {
        let mut endpoints: BTreeMap<String, Value> = BTreeMap::new();
        endpoints.insert("api".to_string(), inner(port).into());
        StructValue::new("Config").with_field("endpoints", endpoints)
    };
    let err = deep_equal(&config(80).into(), &config(8080).into()).unwrap_err();
    assert_eq!(
        err.path.elems(),
        &[
            PathElem::Field("endpoints".into()),
            PathElem::Key("\"api\"".into()),
            PathElem::Field("port".into()),
        ]
    );
    insta::assert_snapshot!(err.to_string(), @r#"mismatch at .endpoints["api"].port: unequal; obtained 80; expected 8080"#);
}

#[test]
fn integer_widths_are_distinct_types() {
    let err = deep_equal(&1i32.into(), &1i64.into()).unwrap_err();
    assert_eq!(
        err.kind,
        MismatchKind::TypeMismatch {
            obtained: "i32".into(),
            expected: "i64".into()
        }
    );
    insta::assert_snapshot!(err.to_string(), @"mismatch at top level: type mismatch i32 vs i64; obtained 1; expected 1");
}

#[test]
fn equal_aggregates() {
    let a = StructValue::new("User")
        .with_field("name", "ana")
        .with_field("tags", vec!["admin", "ops"])
        .with_field("manager", None::<String>);
    assert!(deep_equal(&a.clone().into(), &a.into()).is_ok());
    assert!(deep_equal(&[1.5f64, 2.5].into(), &[1.5f64, 2.5].into()).is_ok());
}

#[test]
fn nan_is_never_equal() {
    assert!(deep_equal(&f64::NAN.into(), &f64::NAN.into()).is_err());
}

#[test]
fn callables_never_compare_equal() {
    let f = Value::func(|| {});
    assert!(deep_equal(&f, &f.clone()).is_err());
}

#[test]
fn errors_and_stringers_compare_by_text() {
    let io = |msg: &str| Value::error(std::io::Error::other(msg.to_string()));
    assert!(deep_equal(&io("boom"), &io("boom")).is_ok());
    assert!(deep_equal(&io("boom"), &io("bang")).is_err());
    assert!(deep_equal(&Value::stringer(42), &Value::stringer(42)).is_ok());
}

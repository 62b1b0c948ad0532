use valdiff_core::assert::{self, AssertArgs, Engine};
use valdiff_core::{AssertError, AssertOptions, AssertionError, EngineConfig, Object, UsageError, Value};

fn failure(actual: impl Into<Value>, expect: impl Into<Value>) -> AssertionError {
    failure_with(AssertArgs::new(actual, expect))
}

fn failure_with(args: AssertArgs) -> AssertionError {
    match Engine::default().assert(args) {
        Err(AssertError::Assertion(err)) => err,
        other => panic!("expected the values to differ, got {other:?}"),
    }
}

#[test]
fn changed_property_is_shown_with_its_neighbour() {
    let actual = Object::plain().with_property("a", 1).with_property("b", 2);
    let expect = Object::plain().with_property("a", 1).with_property("b", 3);
    let err = failure(actual, expect);
    assert_eq!(err.diff(), "actual: {\n  a: 1,\n  b: 2,\n}\n---\nexpect: {\n  a: 1,\n  b: 3,\n}");
}

#[test]
fn added_element_only_appears_on_the_expect_side() {
    let actual = Object::array([1, 2, 3].map(Value::from));
    let expect = Object::array([1, 2, 3, 4].map(Value::from));
    let err = failure(actual, expect);
    assert_eq!(err.actual_diff(), "[1, 2, 3]");
    assert_eq!(err.expect_diff(), "[1, 2, 3, 4]");
}

#[test]
fn multiline_strings_keep_every_line_in_context() {
    let err = failure("a\nb\nc", "a\nx\nc");
    assert_eq!(err.actual_diff(), "1| a\n        2| b\n        3| c");
    assert_eq!(err.expect_diff(), "1| a\n        2| x\n        3| c");
    assert!(!err.diff().contains('↕'));
}

#[test]
fn passing_matcher_consumes_the_comparison() {
    assert!(assert::check(1, assert::between(0.0, 10.0)).is_ok());
    assert!(assert::check("v1.2.0", assert::starts_with("v1.")).is_ok());
    assert!(assert::check(0.1 + 0.2, assert::close_to(0.3)).is_ok());
}

#[test]
fn failing_matcher_renders_its_notation() {
    let err = failure(11, assert::between(0.0, 10.0));
    assert_eq!(err.actual_diff(), "11");
    assert_eq!(err.expect_diff(), "assert.between(0, 10)");
}

#[test]
fn matchers_nest_inside_structures() {
    let actual = Object::plain().with_property("id", 42).with_property("name", "Ada");
    let expect = Object::plain().with_property("id", assert::any("Number")).with_property("name", "Ada");
    assert!(Engine::default().assert(AssertArgs::new(actual, expect)).is_ok());
}

#[test]
fn quotes_are_shared_by_both_sides() {
    let err = failure("it's", "it\"s");
    assert_eq!(err.actual_diff(), "`it's`");
    assert_eq!(err.expect_diff(), "`it\"s`");
}

#[test]
fn quotes_fall_back_to_escaping_without_backticks() {
    let options = AssertOptions::default().with_quote_backtick(false).expect("valid options");
    let err = failure_with(AssertArgs::new("it's", "it\"s").with_options(options));
    assert_eq!(err.actual_diff(), "\"it's\"");
    assert_eq!(err.expect_diff(), "\"it\\\"s\"");
}

#[test]
fn cycles_render_as_references() {
    let actual = Object::plain();
    actual.insert("self", actual.clone());
    actual.insert("x", 1);
    let expect = Object::plain();
    expect.insert("self", expect.clone());
    expect.insert("x", 2);
    let err = failure(actual, expect);
    assert!(err.actual_diff().contains("self: <ref #root>,"), "{}", err.actual_diff());
    assert!(err.expect_diff().contains("x: 2,"), "{}", err.expect_diff());
}

#[test]
fn the_same_cyclic_object_is_equal_to_itself() {
    let object = Object::plain();
    object.insert("self", object.clone());
    assert!(assert::check(object.clone(), object).is_ok());
}

#[test]
fn type_changes_show_both_notations() {
    let err = failure(1, "1");
    assert_eq!(err.diff(), "actual: 1\n---\nexpect: \"1\"");
}

#[test]
fn negative_zero_differs_from_zero() {
    let err = failure(-0.0, 0.0);
    assert_eq!(err.diff(), "actual: -0\n---\nexpect: 0");
}

#[test]
fn urls_are_wrapped_in_their_constructor() {
    let err = failure(Object::url("http://example.com/a"), Object::url("http://example.com/b"));
    assert_eq!(err.actual_diff(), "URL(\"http://example.com/a\")");
    assert_eq!(err.expect_diff(), "URL(\"http://example.com/b\")");
}

#[test]
fn long_strings_are_cut_around_the_difference() {
    let actual = "x".repeat(200) + "A" + &"y".repeat(200);
    let expect = "x".repeat(200) + "B" + &"y".repeat(200);
    let options = AssertOptions::default().with_max_columns(30).expect("valid options");
    let err = failure_with(AssertArgs::new(actual, expect).with_options(options));
    let line = err.actual_diff();
    assert!(line.starts_with("\"…"), "{line}");
    assert!(line.ends_with("…\""), "{line}");
    assert!(line.contains('A'));
    assert!(line.chars().count() <= 22, "{line}");
}

#[test]
fn colors_mark_only_the_differing_side() {
    let engine = Engine::new(EngineConfig::default().with_color(true));
    let err = engine.assert(AssertArgs::new(true, false)).unwrap_err();
    let failure = err.as_assertion().expect("assertion failure");
    assert!(failure.actual_diff().contains("\u{1b}[31m"));
    assert!(failure.expect_diff().contains("\u{1b}[32m"));
}

#[test]
fn usage_errors_explain_the_call() {
    let engine = Engine::default();
    let call = Object::plain().with_property("actual", 1).with_property("expected", 1);
    let err = engine.assert_call(&call.into()).unwrap_err();
    assert!(matches!(err, AssertError::Usage(UsageError::UnknownKey { .. })));
    assert_eq!(err.to_string(), "assert does not accept `expected`");
}

#[test]
fn call_options_reach_the_renderer() {
    let engine = Engine::default();
    let actual = Object::plain().with_property("b", 2).with_property("a", 1);
    let expect = Object::plain().with_property("b", 3).with_property("a", 1);
    let call = Object::plain()
        .with_property("actual", actual)
        .with_property("expect", expect)
        .with_property("order", "sort")
        .with_property("message", "objects differ");
    let err = engine.assert_call(&call.into()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "objects differ\n\nactual: {\n  a: 1,\n  b: 2,\n}\n---\nexpect: {\n  a: 1,\n  b: 3,\n}"
    );
}

#[test]
fn set_members_pair_by_structure() {
    let member = || Value::from(Object::plain().with_property("a", 1));
    assert!(assert::check(Object::set([member()]), Object::set([member()])).is_ok());
}

#[test]
fn unpaired_set_members_are_added_and_removed() {
    let actual = Object::set([
        Object::plain().with_property("b", 2).into(),
        Object::plain().with_property("a", 1).into(),
    ]);
    let expect = Object::set([
        Object::plain().with_property("a", 1).into(),
        Object::plain().with_property("a", 3).into(),
    ]);
    let err = failure(actual, expect);
    assert!(err.actual_diff().contains("{b: 2}"), "{}", err.actual_diff());
    assert!(err.expect_diff().contains("{a: 3}"), "{}", err.expect_diff());
}

#[test]
fn failed_negation_shows_the_negated_value() {
    let value = || Object::plain().with_property("a", 1);
    let err = failure(value(), assert::not(value()));
    assert_eq!(err.expect_diff(), "assert.not({a: 1})");
}

#[test]
fn forced_multiline_is_accepted_as_a_call_option() {
    let call = Object::plain()
        .with_property("actual", Object::array([1, 2].map(Value::from)))
        .with_property("expect", Object::array([1, 3].map(Value::from)))
        .with_property("forceMultilineDiff", true);
    let err = Engine::default().assert_call(&call.into()).unwrap_err();
    let failure = err.as_assertion().expect("assertion failure");
    assert_eq!(failure.diff(), "actual: [\n  1,\n  2,\n]\n---\nexpect: [\n  1,\n  3,\n]");
}

#[test]
fn multiline_property_values_stay_within_max_columns() {
    let text = |middle: &str| ["a".repeat(80), middle.repeat(80), "c".repeat(80)].join("\n");
    let actual = Object::plain().with_property("key", text("b")).with_property("z", 1);
    let expect = Object::plain().with_property("key", text("x")).with_property("z", 1);
    let options = AssertOptions::default().with_max_columns(30).expect("valid options");
    let err = failure_with(AssertArgs::new(actual, expect).with_options(options));
    for line in err.diff().lines() {
        assert!(line.chars().count() <= 30, "{line:?} is wider than 30 columns");
    }
}

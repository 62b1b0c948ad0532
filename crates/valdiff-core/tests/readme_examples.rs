use valdiff_core::assert::{self, AssertArgs, Engine};
use valdiff_core::{AssertOptions, Object, Value};

#[test]
fn top_level_readme_quickstart() -> Result<(), Box<dyn std::error::Error>> {
    let actual = Value::from_json_str(r#"{"name":"Ada","langs":["en","fr"]}"#)?;
    let expect = Value::from_json_str(r#"{"name":"Ada","langs":["en","de"]}"#)?;

    let err = Engine::default().assert(AssertArgs::new(actual, expect)).unwrap_err();
    let failure = err.as_assertion().ok_or("expected a diff")?;
    assert!(failure.message().starts_with("actual and expect are different\n\n"));
    assert!(failure.actual_diff().contains("\"fr\""));
    assert!(failure.expect_diff().contains("\"de\""));
    Ok(())
}

#[test]
fn readme_matcher_example() {
    let actual = Object::plain().with_property("id", 7).with_property("score", 0.30000000000000004);
    let expect = Object::plain()
        .with_property("id", assert::any("Number"))
        .with_property("score", assert::close_to(0.3));
    assert!(assert::check(actual, expect).is_ok());
}

#[test]
fn readme_options_example() -> Result<(), Box<dyn std::error::Error>> {
    let options = AssertOptions::default().with_max_columns(40)?.with_max_diff(1)?;
    let err = Engine::default()
        .assert(AssertArgs::new(1, 2).with_message("ids differ").with_options(options))
        .unwrap_err();
    assert_eq!(err.to_string(), "ids differ\n\nactual: 1\n---\nexpect: 2");
    Ok(())
}

use valdiff_benches::available_corpora;
use valdiff_core::assert::Engine;
use valdiff_core::{AssertOptions, EngineConfig};

#[test]
fn valdiff_benches_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let corpus = available_corpora().iter().find(|c| c.name() == "records").expect("registered corpus");
    let dataset = corpus.load();
    let err = dataset.assert().expect_err("records differ");
    let failure = err.as_assertion().ok_or("expected an assertion failure")?;
    println!("{failure}");
    assert!(failure.diff().contains("example.org"));
    Ok(())
}

#[test]
fn narrow_columns_bound_the_labelled_lines() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Engine::new(EngineConfig::default());
    let options = AssertOptions::default().with_max_columns(40)?;
    for corpus in available_corpora() {
        let err = corpus.load().assert_with(&engine, options.clone()).expect_err(corpus.name());
        let failure = err.as_assertion().ok_or("expected an assertion failure")?;
        for line in failure.diff().lines().filter(|line| line.starts_with("actual: ") || line.starts_with("expect: ")) {
            assert!(line.chars().count() <= 40, "{}: {line:?}", corpus.name());
        }
    }
    Ok(())
}

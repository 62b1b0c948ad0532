//! Benchmark corpora for `valdiff`.
//!
//! Every corpus is generated in memory so benchmarks and tests share the
//! same inputs without fixture files. A corpus yields a [`Dataset`] holding
//! an actual and an expect value that differ in a known place.
//!
//! # Examples
//!
//! ```
//! let corpus = valdiff_benches::available_corpora()
//!     .iter()
//!     .find(|corpus| corpus.name() == "wide-array")
//!     .expect("registered corpus");
//! let dataset = corpus.load();
//! assert!(dataset.assert().is_err());
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use valdiff_core::assert::{AssertArgs, Engine};
use valdiff_core::{AssertError, AssertOptions, Object, Value};

/// A named generator of benchmark inputs.
#[derive(Debug, Clone, Copy)]
pub struct Corpus {
    name: &'static str,
    description: &'static str,
    build: fn() -> Dataset,
}

impl Corpus {
    /// Short identifier used as the benchmark id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// One-line summary of the shape being compared.
    #[must_use]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Builds a fresh pair of values.
    #[must_use]
    pub fn load(&self) -> Dataset {
        (self.build)()
    }
}

/// An actual/expect pair ready to be asserted.
#[derive(Debug, Clone)]
pub struct Dataset {
    actual: Value,
    expect: Value,
}

impl Dataset {
    /// Value passed as `actual`.
    #[must_use]
    pub fn actual(&self) -> &Value {
        &self.actual
    }

    /// Value passed as `expect`.
    #[must_use]
    pub fn expect(&self) -> &Value {
        &self.expect
    }

    /// Runs the default engine over the pair.
    pub fn assert(&self) -> Result<(), AssertError> {
        self.assert_with(&Engine::default(), AssertOptions::default())
    }

    /// Runs `engine` over the pair with explicit options.
    pub fn assert_with(&self, engine: &Engine, options: AssertOptions) -> Result<(), AssertError> {
        engine.assert(AssertArgs::new(self.actual.clone(), self.expect.clone()).with_options(options))
    }
}

static CORPORA: [Corpus; 4] = [
    Corpus {
        name: "wide-array",
        description: "10k numbers with a single changed element in the middle",
        build: wide_array,
    },
    Corpus {
        name: "deep-object",
        description: "objects nested 64 levels deep with a changed leaf",
        build: deep_object,
    },
    Corpus {
        name: "records",
        description: "500 user records where every tenth email differs",
        build: records,
    },
    Corpus {
        name: "long-text",
        description: "a 2k line string with one edited line",
        build: long_text,
    },
];

/// Returns every registered corpus.
#[must_use]
pub fn available_corpora() -> &'static [Corpus] {
    &CORPORA
}

fn numbers(len: u32, changed: Option<u32>) -> Value {
    let object = Object::array(Vec::<Value>::new());
    for index in 0..len {
        let value = if Some(index) == changed { f64::from(index) + 0.5 } else { f64::from(index) };
        object.push(value);
    }
    object.into()
}

fn wide_array() -> Dataset {
    Dataset { actual: numbers(10_000, None), expect: numbers(10_000, Some(5_000)) }
}

fn nested(depth: u32, leaf: &str) -> Value {
    let mut value = Value::from(leaf);
    for level in (0..depth).rev() {
        value = Object::plain().with_property("level", level).with_property("child", value).into();
    }
    value
}

fn deep_object() -> Dataset {
    Dataset { actual: nested(64, "left"), expect: nested(64, "right") }
}

fn user(id: u32, domain: &str) -> Value {
    Object::plain()
        .with_property("id", id)
        .with_property("name", format!("user {id}"))
        .with_property("email", format!("user{id}@{domain}"))
        .with_property("active", id % 3 != 0)
        .with_property("tags", Object::array(["a", "b"].map(Value::from)))
        .into()
}

fn users(changed_domain: Option<&str>) -> Value {
    let list = Object::array(Vec::<Value>::new());
    for id in 0..500 {
        let domain = match changed_domain {
            Some(domain) if id % 10 == 0 => domain,
            _ => "example.com",
        };
        list.push(user(id, domain));
    }
    list.into()
}

fn records() -> Dataset {
    Dataset { actual: users(None), expect: users(Some("example.org")) }
}

fn text(edited: Option<usize>) -> Value {
    let lines: Vec<String> = (0..2_000)
        .map(|line| if Some(line) == edited { format!("edited line {line}") } else { format!("line {line}") })
        .collect();
    Value::from(lines.join("\n"))
}

fn long_text() -> Dataset {
    Dataset { actual: text(None), expect: text(Some(1_000)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_corpus_differs() {
        for corpus in available_corpora() {
            let err = corpus.load().assert().expect_err(corpus.name());
            assert!(err.as_assertion().is_some(), "{}: {err}", corpus.name());
        }
    }

    #[test]
    fn corpus_names_are_unique() {
        let mut names: Vec<_> = available_corpora().iter().map(Corpus::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), available_corpora().len());
    }
}

//! Fuzzing harnesses for `valdiff`.
//!
//! Each public function accepts raw bytes and drives a different entry point
//! of the comparison engine: document decoding, the typed assertion facade
//! and the loosely typed call surface. Usage errors and decoding failures are
//! swallowed so fuzzers can keep exploring; panics are the only findings.
//!
//! # Examples
//!
//! Decode and compare a JSON snippet:
//!
//! ```
//! valdiff_fuzz::fuzz_documents(b"{\"a\":[1,2]}");
//! ```
//!
//! Compare two random values built from deterministic input:
//!
//! ```
//! valdiff_fuzz::fuzz_assert(&[1, 2, 3, 4, 5, 6, 7, 8]);
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::Unstructured;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use valdiff_core::assert::{AssertArgs, Engine};
use valdiff_core::{AssertError, AssertOptions, EngineConfig, Object, Value};

const MAX_DEPTH: usize = 4;
const MAX_ARRAY_LEN: u8 = 6;
const MAX_OBJECT_LEN: u8 = 6;
const MAX_STRING_LEN: u8 = 12;
const MAX_COLUMNS: u8 = 120;

/// Decodes the bytes as JSON and YAML and compares the results.
///
/// Each decoded document is first compared with itself, which must always
/// succeed, and then with the other decoding when both exist.
///
/// ```
/// valdiff_fuzz::fuzz_documents(b"key: [a, b]");
/// ```
pub fn fuzz_documents(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let engine = Engine::default();
    let json = Value::from_json_str(text).ok();
    let yaml = Value::from_yaml_str(text).ok();
    for value in json.iter().chain(yaml.iter()) {
        let outcome = engine.assert(AssertArgs::new(value.clone(), value.clone()));
        assert!(outcome.is_ok(), "a document differs from itself: {outcome:?}");
    }
    if let (Some(json), Some(yaml)) = (json, yaml) {
        let _ = engine.assert(AssertArgs::new(json, yaml));
    }
}

/// Compares two randomly generated values with randomly chosen options.
///
/// The same pair is sent through [`Engine::assert`] and through
/// [`Engine::assert_call`] so both the typed and the call surfaces render.
///
/// ```
/// valdiff_fuzz::fuzz_assert(b"seed");
/// ```
pub fn fuzz_assert(data: &[u8]) {
    let mut unstructured = Unstructured::new(data);
    let Some(actual) = random_value(&mut unstructured) else {
        return;
    };
    let Some(expect) = random_value(&mut unstructured) else {
        return;
    };
    let color = unstructured.arbitrary().unwrap_or(false);
    let columns = unstructured.int_in_range::<u8>(1..=MAX_COLUMNS).unwrap_or(MAX_COLUMNS);
    let multiline = unstructured.arbitrary().unwrap_or(false);

    let engine = Engine::new(EngineConfig::default().with_color(color));
    let options = AssertOptions::default()
        .with_max_columns(usize::from(columns))
        .and_then(|options| options.with_force_multiline_diff(multiline));
    if let Ok(options) = options {
        check_outcome(engine.assert(AssertArgs::new(actual.clone(), expect.clone()).with_options(options)));
    }

    let call = Object::plain()
        .with_property("actual", actual)
        .with_property("expect", expect)
        .with_property("MAX_COLUMNS", u32::from(columns));
    check_outcome(engine.assert_call(&call.into()));
}

fn check_outcome(outcome: Result<(), AssertError>) {
    if let Err(AssertError::Assertion(failure)) = outcome {
        assert!(failure.diff().starts_with("actual: "), "malformed diff: {}", failure.diff());
    }
}

fn random_value(unstructured: &mut Unstructured<'_>) -> Option<Value> {
    let json = json_value_from_unstructured(unstructured, 0).ok()?;
    Value::from_json_value(json).ok()
}

fn json_value_from_unstructured(
    unstructured: &mut Unstructured<'_>,
    depth: usize,
) -> Result<JsonValue, arbitrary::Error> {
    if depth >= MAX_DEPTH {
        return json_leaf(unstructured);
    }

    match unstructured.int_in_range::<u8>(0..=5)? {
        4 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_ARRAY_LEN)?);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(json_value_from_unstructured(unstructured, depth + 1)?);
            }
            Ok(JsonValue::Array(items))
        }
        5 => {
            let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_OBJECT_LEN)?);
            let mut map = JsonMap::new();
            for _ in 0..len {
                let key = random_string(unstructured)?;
                let value = json_value_from_unstructured(unstructured, depth + 1)?;
                map.insert(key, value);
            }
            Ok(JsonValue::Object(map))
        }
        _ => json_leaf(unstructured),
    }
}

fn json_leaf(unstructured: &mut Unstructured<'_>) -> Result<JsonValue, arbitrary::Error> {
    match unstructured.int_in_range::<u8>(0..=3)? {
        0 => Ok(JsonValue::Null),
        1 => Ok(JsonValue::Bool(unstructured.arbitrary()?)),
        2 => Ok(JsonValue::Number(random_number(unstructured)?)),
        _ => Ok(JsonValue::String(random_string(unstructured)?)),
    }
}

fn random_number(unstructured: &mut Unstructured<'_>) -> Result<JsonNumber, arbitrary::Error> {
    if unstructured.arbitrary()? {
        Ok(JsonNumber::from(unstructured.arbitrary::<i32>()?))
    } else {
        let numerator = f64::from(unstructured.arbitrary::<i32>()?);
        let denominator = f64::from(unstructured.int_in_range::<u16>(1..=1024)?);
        JsonNumber::from_f64(numerator / denominator).ok_or(arbitrary::Error::IncorrectFormat)
    }
}

// Newlines are included so multiline string layout gets exercised.
fn random_string(unstructured: &mut Unstructured<'_>) -> Result<String, arbitrary::Error> {
    let len = usize::from(unstructured.int_in_range::<u8>(0..=MAX_STRING_LEN)?);
    let mut string = String::with_capacity(len);
    for _ in 0..len {
        let byte = unstructured.int_in_range::<u8>(0x1f..=0x7e)?;
        string.push(if byte == 0x1f { '\n' } else { char::from(byte) });
    }
    Ok(string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_harness_handles_both_formats() {
        fuzz_documents(b"{\"a\": [1, 2, {\"b\": null}]}");
        fuzz_documents(b"a:\n  - 1\n  - two\n");
        fuzz_documents(&[0xff, 0xfe]);
    }

    #[test]
    fn assert_harness_runs() {
        fuzz_assert(b"assert harness input with enough bytes for two values");
        fuzz_assert(&[]);
    }

    #[test]
    fn random_values_respect_depth() {
        let bytes: Vec<u8> = (0..=255).cycle().take(4096).collect();
        let mut unstructured = Unstructured::new(&bytes);
        let value = json_value_from_unstructured(&mut unstructured, 0).expect("enough input");
        assert!(depth(&value) <= MAX_DEPTH);
    }

    fn depth(value: &JsonValue) -> usize {
        match value {
            JsonValue::Array(items) => 1 + items.iter().map(depth).max().unwrap_or(0),
            JsonValue::Object(map) => 1 + map.values().map(depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

//! The assertion facade and the matcher constructors.
//!
//! [`Engine`] compares an actual and an expect value and, when they differ,
//! returns an [`AssertionError`] holding both renderings:
//!
//! ```
//! use valdiff_core::assert::{self, AssertArgs, Engine};
//! use valdiff_core::Object;
//!
//! let engine = Engine::default();
//! let actual = Object::plain().with_property("a", 1).with_property("b", 2);
//! let expect = Object::plain().with_property("a", 1).with_property("b", 3);
//! let err = engine.assert(AssertArgs::new(actual, expect)).unwrap_err();
//! let failure = err.as_assertion().unwrap();
//! assert!(failure.diff().starts_with("actual: {\n"));
//!
//! assert!(assert::check(5, assert::between(0.0, 10.0)).is_ok());
//! ```

use std::rc::Rc;

use regex::Regex;

use crate::compare::{ComparisonId, Comparator};
use crate::node::{Forest, NodeId, Side, Slot};
use crate::render::{Ctx, Renderer};
use crate::{
    AssertError, AssertOptions, AssertionError, ContextWindow, DefaultWellKnown, EngineConfig, Matcher,
    ObjectKind, Order, PerValueLimits, PropertyKey, PropertyValue, StringMeasure, UnicodeMeasure, UsageError,
    Value, WellKnownValues, DEFAULT_CLOSE_TO_PRECISION,
};

const DEFAULT_MESSAGE: &str = "actual and expect are different";
const ACTUAL_LABEL: &str = "actual: ";
const EXPECT_LABEL: &str = "expect: ";

/// Keys accepted by [`Engine::assert_call`].
pub const CALL_KEYS: [&str; 13] = [
    "actual",
    "expect",
    "message",
    "details",
    "MAX_DEPTH",
    "MAX_DEPTH_INSIDE_DIFF",
    "MAX_DIFF",
    "MAX_DIFF_PER_VALUE",
    "MAX_CONTEXT_BEFORE_DIFF",
    "MAX_CONTEXT_AFTER_DIFF",
    "MAX_COLUMNS",
    "order",
    "forceMultilineDiff",
];

/// One assertion: the two values plus optional message, details and
/// per-call options.
#[derive(Clone, Debug)]
pub struct AssertArgs {
    actual: Value,
    expect: Value,
    message: Option<String>,
    details: Option<Value>,
    options: Option<AssertOptions>,
}

impl AssertArgs {
    /// Compares `actual` against `expect` with the engine defaults.
    pub fn new<A, E>(actual: A, expect: E) -> Self
    where
        A: Into<Value>,
        E: Into<Value>,
    {
        Self { actual: actual.into(), expect: expect.into(), message: None, details: None, options: None }
    }

    /// Replaces the first line of the failure message.
    #[must_use]
    pub fn with_message<S>(mut self, message: S) -> Self
    where
        S: Into<String>,
    {
        self.message = Some(message.into());
        self
    }

    /// Appends a JSON block to the failure message.
    #[must_use]
    pub fn with_details<V>(mut self, details: V) -> Self
    where
        V: Into<Value>,
    {
        self.details = Some(details.into());
        self
    }

    /// Overrides the engine's default options for this call.
    #[must_use]
    pub fn with_options(mut self, options: AssertOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Compares values and renders their differences.
///
/// The configuration and collaborators are fixed at construction; an
/// engine can serve any number of assertions.
pub struct Engine {
    config: EngineConfig,
    measure: Rc<dyn StringMeasure>,
    well_known: Rc<dyn WellKnownValues>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an engine with the default collaborators.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config, measure: Rc::new(UnicodeMeasure), well_known: Rc::new(DefaultWellKnown) }
    }

    /// Replaces the text measurement.
    #[must_use]
    pub fn with_measure<M>(mut self, measure: M) -> Self
    where
        M: StringMeasure + 'static,
    {
        self.measure = Rc::new(measure);
        self
    }

    /// Replaces the well-known value resolver.
    #[must_use]
    pub fn with_well_known<W>(mut self, well_known: W) -> Self
    where
        W: WellKnownValues + 'static,
    {
        self.well_known = Rc::new(well_known);
        self
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compares the two values of `args`.
    ///
    /// # Errors
    ///
    /// Returns [`AssertError::Assertion`] when the values differ.
    pub fn assert(&self, args: AssertArgs) -> Result<(), AssertError> {
        let options = args.options.unwrap_or_else(|| self.config.defaults().clone());
        let mut forest = Forest::new(Rc::clone(&self.measure), Rc::clone(&self.well_known));
        let actual = forest.add_root(&args.actual, Side::Actual);
        let expect = forest.add_root(&args.expect, Side::Expect);
        let root = Comparator::new(&mut forest, &options).compare_roots(actual, expect);
        if !forest.comparison(root).has_any_diff() {
            return Ok(());
        }

        let (actual_start, expect_start) = match first_difference(&forest, root) {
            Some(diff) => start_nodes(&forest, diff, options.max_depth()),
            None => (actual, expect),
        };
        let start_depth = forest.node(actual_start).depth();
        tracing::debug!(
            start = %forest.node(actual_start).path(),
            depth = start_depth,
            "rendering differences"
        );
        let hint = (actual_start != actual).then(|| forest.node(actual_start).path().to_string());

        let offset = ACTUAL_LABEL.len();
        let columns = options.max_columns().saturating_sub(offset).max(1);
        let mut renderer = Renderer::new(&mut forest, &options, &self.config);
        let actual_diff = renderer.render(actual_start, Ctx::new(offset, columns, start_depth)).text;
        let expect_diff = renderer.render(expect_start, Ctx::new(offset, columns, start_depth)).text;
        let diff = format!("{ACTUAL_LABEL}{actual_diff}\n---\n{EXPECT_LABEL}{expect_diff}");

        let mut message = args.message.unwrap_or_else(|| DEFAULT_MESSAGE.to_owned());
        message.push_str("\n\n");
        if let Some(path) = hint {
            message.push_str(&format!("diff starts at `{path}`\n"));
        }
        message.push_str(&diff);
        if let Some(details) = &args.details {
            message.push_str("\n--- details ---\n");
            message.push_str(&details_block(details));
            message.push_str("\n---------------");
        }
        Err(AssertionError::new(message, diff, actual_diff, expect_diff).into())
    }

    /// Runs an assertion described by a plain object such as
    /// `{ actual, expect, MAX_COLUMNS: 60 }`.
    ///
    /// ```
    /// use valdiff_core::assert::Engine;
    /// use valdiff_core::{Object, UsageError, AssertError};
    ///
    /// let engine = Engine::default();
    /// let call = Object::plain().with_property("actual", 1).with_property("expect", 1);
    /// assert!(engine.assert_call(&call.into()).is_ok());
    ///
    /// let call = Object::plain().with_property("actual", 1);
    /// let err = engine.assert_call(&call.into()).unwrap_err();
    /// assert!(matches!(err, AssertError::Usage(UsageError::MissingKey { key: "expect" })));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AssertError::Usage`] when the call object is malformed and
    /// [`AssertError::Assertion`] when the values differ.
    pub fn assert_call(&self, call: &Value) -> Result<(), AssertError> {
        let args = parse_call(call, self.config.defaults())?;
        self.assert(args)
    }
}

/// Compares two values with a default [`Engine`].
///
/// # Errors
///
/// Returns [`AssertError::Assertion`] when the values differ.
pub fn check<A, E>(actual: A, expect: E) -> Result<(), AssertError>
where
    A: Into<Value>,
    E: Into<Value>,
{
    Engine::default().assert(AssertArgs::new(actual, expect))
}

/// Expects any value except `value`.
pub fn not<V>(value: V) -> Value
where
    V: Into<Value>,
{
    Matcher::Not(value.into()).into()
}

/// Expects a value built by the named constructor, or a primitive of that
/// type (`Number`, `String`, `Boolean`, `BigInt`, `Symbol`).
pub fn any<S>(constructor: S) -> Value
where
    S: Into<String>,
{
    Matcher::Any(constructor.into()).into()
}

/// Expects a number within `[min, max]`.
#[must_use]
pub fn between(min: f64, max: f64) -> Value {
    Matcher::Between(min, max).into()
}

/// Expects a number at most `bound`.
#[must_use]
pub fn below_or_equals(bound: f64) -> Value {
    Matcher::BelowOrEquals(bound).into()
}

/// Expects a number at least `bound`.
#[must_use]
pub fn above_or_equals(bound: f64) -> Value {
    Matcher::AboveOrEquals(bound).into()
}

/// Expects a number within [`DEFAULT_CLOSE_TO_PRECISION`] of `target`.
#[must_use]
pub fn close_to(target: f64) -> Value {
    close_to_within(target, DEFAULT_CLOSE_TO_PRECISION)
}

/// Expects a number within `precision` of `target`.
#[must_use]
pub fn close_to_within(target: f64, precision: f64) -> Value {
    Matcher::CloseTo { target, precision }.into()
}

/// Expects a string starting with `prefix`.
pub fn starts_with<S>(prefix: S) -> Value
where
    S: Into<String>,
{
    Matcher::StartsWith(prefix.into()).into()
}

/// Expects a string matching `pattern`.
#[must_use]
pub fn matches(pattern: Regex) -> Value {
    Matcher::Matches(pattern).into()
}

/// Depth-first search for the first comparison reporting a difference of
/// its own.
fn first_difference(forest: &Forest, root: ComparisonId) -> Option<NodeId> {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let comparison = forest.comparison(id);
        if comparison.self_reasons().any() {
            return comparison.actual().node().or_else(|| comparison.expect().node());
        }
        stack.extend(comparison.children().iter().rev().copied());
    }
    None
}

/// The outermost pair of value nodes enclosing `diff` that stays within
/// `max_depth` levels of it.
fn start_nodes(forest: &Forest, diff: NodeId, max_depth: usize) -> (NodeId, NodeId) {
    let floor = forest.node(diff).depth().saturating_sub(max_depth);
    let mut start = None;
    let mut current = Some(diff);
    while let Some(id) = current {
        let node = forest.node(id);
        if node.depth() < floor {
            break;
        }
        if let (true, Some(Slot::Node(other))) = (node.is_value_level(), node.other()) {
            start = Some((id, other));
        }
        current = node.parent();
    }
    let (mut id, mut other) = start.unwrap_or((diff, diff));
    if start.is_none() {
        while let Some(parent) = forest.node(id).parent() {
            id = parent;
        }
        other = forest.node(id).other().and_then(Slot::node).unwrap_or(id);
    }
    match forest.node(id).side() {
        Side::Actual => (id, other),
        Side::Expect => (other, id),
    }
}

fn details_block(details: &Value) -> String {
    details
        .to_json()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| details.notation())
}

fn parse_call(call: &Value, defaults: &AssertOptions) -> Result<AssertArgs, UsageError> {
    let object = match call {
        Value::Object(object) if matches!(*object.kind(), ObjectKind::Plain) => object,
        other => return Err(UsageError::NotAnObject { found: describe(other) }),
    };
    let data = object.data();
    let mut fields: Vec<(&str, &Value)> = Vec::new();
    for prop in data.properties() {
        let key = match &prop.key {
            PropertyKey::String(key) => key,
            PropertyKey::Symbol(symbol) => return Err(UsageError::UnknownKey { key: format!("[{symbol}]") }),
        };
        let PropertyValue::Data { value, .. } = &prop.descriptor.value else {
            return Err(UsageError::InvalidOption {
                key: key.clone(),
                expected: "a data property",
                found: "an accessor".into(),
            });
        };
        if !CALL_KEYS.contains(&key.as_str()) {
            return Err(UsageError::UnknownKey { key: key.clone() });
        }
        fields.push((key.as_str(), value));
    }
    let field = |name: &str| fields.iter().find(|(key, _)| *key == name).map(|(_, value)| *value);
    let actual = field("actual").ok_or(UsageError::MissingKey { key: "actual" })?;
    let expect = field("expect").ok_or(UsageError::MissingKey { key: "expect" })?;

    let mut args = AssertArgs::new(actual.clone(), expect.clone());
    if let Some(message) = field("message") {
        let text = message.as_str().ok_or_else(|| invalid("message", "a string", message))?;
        args = args.with_message(text);
    }
    if let Some(details) = field("details") {
        args = args.with_details(details.clone());
    }

    let mut options = defaults.clone();
    for (key, value) in &fields {
        options = match *key {
            "MAX_DEPTH" => {
                let depth = count(key, value)?;
                in_range(key, options.with_max_depth(depth))?
            }
            "MAX_DEPTH_INSIDE_DIFF" => {
                let depth = count(key, value)?;
                in_range(key, options.with_max_depth_inside_diff(depth))?
            }
            "MAX_DIFF" => {
                let budget = count(key, value)?;
                in_range(key, options.with_max_diff(budget))?
            }
            "MAX_DIFF_PER_VALUE" => {
                let limits = per_value_limits(key, value, options.max_diff_per_value())?;
                in_range(key, options.with_max_diff_per_value(limits))?
            }
            "MAX_CONTEXT_BEFORE_DIFF" => {
                let window = context_window(key, value, options.max_context_before_diff())?;
                in_range(key, options.with_max_context_before_diff(window))?
            }
            "MAX_CONTEXT_AFTER_DIFF" => {
                let window = context_window(key, value, options.max_context_after_diff())?;
                in_range(key, options.with_max_context_after_diff(window))?
            }
            "MAX_COLUMNS" => {
                let columns = count(key, value)?;
                in_range(key, options.with_max_columns(columns))?
            }
            "order" => {
                let name = value.as_str().ok_or_else(|| invalid(key, "\"natural\" or \"sort\"", value))?;
                let order = in_range(key, name.parse::<Order>())?;
                in_range(key, options.with_order(order))?
            }
            "forceMultilineDiff" => {
                let Value::Bool(force) = value else {
                    return Err(invalid(key, "a boolean", value));
                };
                in_range(key, options.with_force_multiline_diff(*force))?
            }
            _ => options,
        };
    }
    Ok(args.with_options(options))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(object) => match &*object.kind() {
            ObjectKind::Plain => "object".into(),
            _ => value.notation(),
        },
        other => other.type_name().into(),
    }
}

fn invalid(key: &str, expected: &'static str, value: &Value) -> UsageError {
    UsageError::InvalidOption { key: key.to_owned(), expected, found: describe(value) }
}

fn in_range<T>(key: &str, result: Result<T, crate::OptionsError>) -> Result<T, UsageError> {
    result.map_err(|source| UsageError::OptionOutOfRange { key: key.to_owned(), source })
}

fn count(key: &str, value: &Value) -> Result<usize, UsageError> {
    match value {
        Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n <= usize::MAX as f64 => Ok(*n as usize),
        Value::Number(n) if *n == f64::INFINITY => Ok(usize::MAX),
        _ => Err(invalid(key, "a non-negative integer", value)),
    }
}

fn per_value_limits(key: &str, value: &Value, base: PerValueLimits) -> Result<PerValueLimits, UsageError> {
    if let Value::Number(_) = value {
        return count(key, value).map(PerValueLimits::uniform);
    }
    let mut limits = base;
    for (name, limit) in sub_options(key, value, "a number or { prop, index, entry, line }")? {
        let slot = match name.as_str() {
            "prop" => &mut limits.prop,
            "index" => &mut limits.index,
            "entry" => &mut limits.entry,
            "line" => &mut limits.line,
            _ => return Err(UsageError::UnknownKey { key: format!("{key}.{name}") }),
        };
        *slot = count(&format!("{key}.{name}"), &limit)?;
    }
    Ok(limits)
}

fn context_window(key: &str, value: &Value, base: ContextWindow) -> Result<ContextWindow, UsageError> {
    if let Value::Number(_) = value {
        return count(key, value).map(ContextWindow::uniform);
    }
    let mut window = base;
    for (name, rows) in sub_options(key, value, "a number or { prop, line }")? {
        let slot = match name.as_str() {
            "prop" => &mut window.prop,
            "line" => &mut window.line,
            _ => return Err(UsageError::UnknownKey { key: format!("{key}.{name}") }),
        };
        *slot = count(&format!("{key}.{name}"), &rows)?;
    }
    Ok(window)
}

fn sub_options(key: &str, value: &Value, expected: &'static str) -> Result<Vec<(String, Value)>, UsageError> {
    let Value::Object(object) = value else {
        return Err(invalid(key, expected, value));
    };
    if !matches!(*object.kind(), ObjectKind::Plain) {
        return Err(invalid(key, expected, value));
    }
    let data = object.data();
    data.properties()
        .iter()
        .map(|prop| match (&prop.key, &prop.descriptor.value) {
            (PropertyKey::String(name), PropertyValue::Data { value, .. }) => Ok((name.clone(), value.clone())),
            _ => Err(invalid(key, expected, value)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Object;

    fn call(pairs: Vec<(&str, Value)>) -> Value {
        let object = Object::plain();
        for (key, value) in pairs {
            object.insert(key, value);
        }
        object.into()
    }

    fn failure(args: AssertArgs) -> AssertionError {
        match Engine::default().assert(args) {
            Err(AssertError::Assertion(err)) => err,
            other => panic!("expected an assertion failure, got {other:?}"),
        }
    }

    #[test]
    fn equal_values_pass() {
        assert!(check(Value::Undefined, Value::Undefined).is_ok());
        assert!(check("same", "same").is_ok());
    }

    #[test]
    fn different_primitives_render_both_sides() {
        let err = failure(AssertArgs::new(true, false));
        assert_eq!(err.diff(), "actual: true\n---\nexpect: false");
        assert_eq!(err.message(), "actual and expect are different\n\nactual: true\n---\nexpect: false");
    }

    #[test]
    fn custom_message_and_details_frame_the_diff() {
        let details = Object::plain().with_property("attempt", 2);
        let err = failure(AssertArgs::new(1, 2).with_message("wrong count").with_details(details));
        assert!(err.message().starts_with("wrong count\n\nactual: 1\n"));
        assert!(err.message().ends_with("--- details ---\n{\n  \"attempt\": 2.0\n}\n---------------"));
    }

    #[test]
    fn deep_differences_start_below_the_root() {
        let mut actual = Value::from(1);
        let mut expect = Value::from(2);
        for key in ["f", "e", "d", "c", "b", "a"] {
            actual = Object::plain().with_property(key, actual).into();
            expect = Object::plain().with_property(key, expect).into();
        }
        let err = failure(AssertArgs::new(actual, expect));
        assert!(err.message().contains("diff starts at `actual.a`\n"), "{}", err.message());
    }

    #[test]
    fn call_objects_require_both_sides() {
        let engine = Engine::default();
        let err = engine.assert_call(&call(vec![("expect", Value::from(1))])).unwrap_err();
        assert!(matches!(err, AssertError::Usage(UsageError::MissingKey { key: "actual" })));
        let err = engine.assert_call(&Value::from(1)).unwrap_err();
        assert!(matches!(err, AssertError::Usage(UsageError::NotAnObject { ref found }) if found == "number"));
    }

    #[test]
    fn undefined_counts_as_present() {
        let engine = Engine::default();
        let args = call(vec![("actual", Value::Undefined), ("expect", Value::Undefined)]);
        assert!(engine.assert_call(&args).is_ok());
    }

    #[test]
    fn unknown_keys_fail_before_comparing() {
        let engine = Engine::default();
        let args = call(vec![("actual", Value::from(1)), ("expect", Value::from(1)), ("colour", Value::Null)]);
        let err = engine.assert_call(&args).unwrap_err();
        assert!(matches!(err, AssertError::Usage(UsageError::UnknownKey { ref key }) if key == "colour"));
    }

    #[test]
    fn call_options_are_validated() {
        let engine = Engine::default();
        let args = call(vec![
            ("actual", Value::from(1)),
            ("expect", Value::from(2)),
            ("MAX_COLUMNS", Value::from(0)),
        ]);
        let err = engine.assert_call(&args).unwrap_err();
        assert!(matches!(err, AssertError::Usage(UsageError::OptionOutOfRange { .. })));

        let args = call(vec![("actual", Value::from(1)), ("expect", Value::from(1)), ("order", Value::from(3))]);
        let err = engine.assert_call(&args).unwrap_err();
        let expected = "\"natural\" or \"sort\"";
        assert!(matches!(err, AssertError::Usage(UsageError::InvalidOption { expected: e, .. }) if e == expected));
    }

    #[test]
    fn nested_option_objects_override_single_kinds() {
        let limits = Object::plain().with_property("line", 7);
        let options = call(vec![
            ("actual", Value::from(1)),
            ("expect", Value::from(1)),
            ("MAX_DIFF_PER_VALUE", limits.into()),
            ("MAX_CONTEXT_AFTER_DIFF", Value::from(4)),
        ]);
        let args = parse_call(&options, &AssertOptions::default()).unwrap();
        let parsed = args.options.unwrap();
        assert_eq!(parsed.max_diff_per_value(), PerValueLimits { line: 7, ..PerValueLimits::default() });
        assert_eq!(parsed.max_context_after_diff(), ContextWindow::uniform(4));
    }

    #[test]
    fn matcher_constructors_describe_themselves() {
        assert_eq!(between(0.0, 10.0).notation(), "assert.between(0, 10)");
        assert_eq!(close_to(0.3).notation(), "assert.closeTo(0.3)");
        assert_eq!(any("Date").notation(), "assert.any(Date)");
        assert_eq!(not(1).notation(), "assert.not(1)");
    }
}

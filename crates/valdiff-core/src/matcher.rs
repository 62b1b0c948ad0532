//! Custom expectations placed on the expect side of an assertion.

use std::fmt;

use regex::Regex;

use crate::value::boxed_constructor;
use crate::{format_number, ObjectKind, Value};

/// Default tolerance of [`Matcher::CloseTo`] built through
/// [`assert::close_to`](crate::assert::close_to).
pub const DEFAULT_CLOSE_TO_PRECISION: f64 = 1e-2;

const NOT_NOTATION_DEPTH: usize = 2;

/// A custom expectation.
///
/// Matchers are wrapped in opaque objects (see [`Value::from`]) and only
/// take effect on the expect side. On the actual side they compare like
/// any other object.
#[derive(Clone, Debug)]
pub enum Matcher {
    /// Passes when the actual value differs from the inner value.
    Not(Value),
    /// Passes when the actual value was built by the named constructor, or
    /// is a primitive of that type (`Number`, `String`, …).
    Any(String),
    /// Passes when the actual number lies within `[min, max]`.
    Between(f64, f64),
    /// Passes when the actual number is at most the bound.
    BelowOrEquals(f64),
    /// Passes when the actual number is at least the bound.
    AboveOrEquals(f64),
    /// Passes when the actual number is within `precision` of `target`.
    CloseTo {
        /// Expected number.
        target: f64,
        /// Accepted absolute distance.
        precision: f64,
    },
    /// Passes when the actual string starts with the prefix.
    StartsWith(String),
    /// Passes when the actual string matches the pattern.
    Matches(Regex),
}

/// Gives matchers access to the value under test and to nested
/// comparisons.
pub(crate) trait MatchContext {
    /// The actual value under test.
    fn actual(&self) -> Value;

    /// Compares the actual value against `expect`, returning whether they
    /// are equal. Nested comparisons never count against diff budgets.
    fn subcompare(&mut self, expect: &Value) -> bool;
}

impl Matcher {
    /// Decides whether the actual value satisfies the expectation.
    pub(crate) fn check(&self, cx: &mut dyn MatchContext) -> bool {
        match self {
            Self::Not(value) => !cx.subcompare(value),
            Self::Any(name) => constructed_by(&cx.actual(), name),
            Self::Between(min, max) => {
                cx.subcompare(&Self::AboveOrEquals(*min).into())
                    && cx.subcompare(&Self::BelowOrEquals(*max).into())
            }
            Self::BelowOrEquals(bound) => cx.actual().as_f64().is_some_and(|n| n <= *bound),
            Self::AboveOrEquals(bound) => cx.actual().as_f64().is_some_and(|n| n >= *bound),
            Self::CloseTo { target, precision } => {
                cx.actual().as_f64().is_some_and(|n| (n - target).abs() <= *precision)
            }
            Self::StartsWith(prefix) => {
                cx.actual().as_str().is_some_and(|s| s.starts_with(prefix.as_str()))
            }
            Self::Matches(pattern) => cx.actual().as_str().is_some_and(|s| pattern.is_match(s)),
        }
    }
}

fn constructed_by(value: &Value, name: &str) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Object(object) => {
            let data = object.data();
            if let ObjectKind::Boxed(inner) = &data.kind {
                if boxed_constructor(inner) == name {
                    return true;
                }
            }
            data.prototype.iter().any(|proto| proto == name)
        }
        primitive => boxed_constructor(primitive) == name,
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not(value) => write!(f, "assert.not({})", value.inline_notation(NOT_NOTATION_DEPTH)),
            Self::Any(name) => write!(f, "assert.any({name})"),
            Self::Between(min, max) => {
                write!(f, "assert.between({}, {})", format_number(*min), format_number(*max))
            }
            Self::BelowOrEquals(bound) => write!(f, "assert.belowOrEquals({})", format_number(*bound)),
            Self::AboveOrEquals(bound) => write!(f, "assert.aboveOrEquals({})", format_number(*bound)),
            Self::CloseTo { target, precision } if *precision == DEFAULT_CLOSE_TO_PRECISION => {
                write!(f, "assert.closeTo({})", format_number(*target))
            }
            Self::CloseTo { target, precision } => write!(
                f,
                "assert.closeTo({}, {})",
                format_number(*target),
                format_number(*precision)
            ),
            Self::StartsWith(prefix) => {
                write!(f, "assert.startsWith({})", Value::from(prefix.as_str()).notation())
            }
            Self::Matches(pattern) => write!(f, "assert.matches(/{}/)", pattern.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Object;

    struct Fixed(Value);

    impl MatchContext for Fixed {
        fn actual(&self) -> Value {
            self.0.clone()
        }

        fn subcompare(&mut self, expect: &Value) -> bool {
            match expect.as_matcher() {
                Some(matcher) => matcher.check(self),
                None => self.0.same_value(expect),
            }
        }
    }

    #[test]
    fn between_is_inclusive_on_both_bounds() {
        let between = Matcher::Between(0.0, 10.0);
        assert!(between.check(&mut Fixed(Value::from(0))));
        assert!(between.check(&mut Fixed(Value::from(10))));
        assert!(!between.check(&mut Fixed(Value::from(10.5))));
        assert!(!between.check(&mut Fixed(Value::from("5"))));
    }

    #[test]
    fn not_inverts_the_nested_outcome() {
        let not = Matcher::Not(Value::from(1));
        assert!(not.check(&mut Fixed(Value::from(2))));
        assert!(!not.check(&mut Fixed(Value::from(1))));
    }

    #[test]
    fn any_walks_prototypes_and_primitive_types() {
        let instance: Value = Object::instance_of("User").into();
        assert!(Matcher::Any("User".into()).check(&mut Fixed(instance.clone())));
        assert!(Matcher::Any("Object".into()).check(&mut Fixed(instance)));
        assert!(Matcher::Any("Number".into()).check(&mut Fixed(Value::from(3))));
        assert!(!Matcher::Any("String".into()).check(&mut Fixed(Value::from(3))));
        assert!(!Matcher::Any("Object".into()).check(&mut Fixed(Value::Null)));
    }

    #[test]
    fn notation_reads_like_the_call_that_built_it() {
        assert_eq!(Matcher::Between(0.0, 10.0).to_string(), "assert.between(0, 10)");
        let close = Matcher::CloseTo { target: 0.3, precision: DEFAULT_CLOSE_TO_PRECISION };
        assert_eq!(close.to_string(), "assert.closeTo(0.3)");
        assert_eq!(Matcher::StartsWith("ab".into()).to_string(), "assert.startsWith(\"ab\")");
        let pattern = Regex::new("^a+$").unwrap();
        assert_eq!(Matcher::Matches(pattern).to_string(), "assert.matches(/^a+$/)");
    }

    #[test]
    fn negated_composites_are_spelled_out_when_small() {
        let small = Object::plain().with_property("a", 1).with_property("odd key", "x");
        assert_eq!(Matcher::Not(small.into()).to_string(), "assert.not({a: 1, \"odd key\": \"x\"})");

        let inner = Object::plain().with_property("b", Object::array([1, 2].map(Value::from)));
        let nested = Object::plain().with_property("a", inner);
        assert_eq!(Matcher::Not(nested.into()).to_string(), "assert.not({a: {b: Array(2)}})");

        let wide = Object::plain();
        for key in ["a", "b", "c", "d", "e"] {
            wide.insert(key, 1);
        }
        assert_eq!(Matcher::Not(wide.into()).to_string(), "assert.not(Object)");
        assert_eq!(Matcher::Not(Object::array(Vec::new()).into()).to_string(), "assert.not([])");
    }
}

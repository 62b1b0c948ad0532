//! Pluggable collaborators for measuring text and naming well-known values.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{PathSegment, Value, ValuePath};

const ZERO_WIDTH_JOINER: char = '\u{200d}';

/// Measures terminal width and splits strings into display units.
pub trait StringMeasure {
    /// Returns the number of terminal columns `text` occupies.
    fn width(&self, text: &str) -> usize;

    /// Splits `text` into grapheme-like units rendered and compared one by
    /// one.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Default measurement backed by the Unicode East Asian Width tables.
///
/// Zero-width code points (combining marks, variation selectors, joiners)
/// stay attached to the preceding unit, and a zero-width joiner also pulls
/// in the code point that follows it.
///
/// ```
/// # use valdiff_core::{StringMeasure, UnicodeMeasure};
/// let measure = UnicodeMeasure;
/// assert_eq!(measure.width("漢字"), 4);
/// assert_eq!(measure.tokenize("e\u{301}x"), vec!["e\u{301}", "x"]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct UnicodeMeasure;

impl StringMeasure for UnicodeMeasure {
    fn width(&self, text: &str) -> usize {
        UnicodeWidthStr::width(text)
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut units: Vec<String> = Vec::new();
        let mut glue_next = false;
        for c in text.chars() {
            let attaches = glue_next || (c != '\t' && !c.is_control() && c.width() == Some(0));
            match units.last_mut() {
                Some(last) if attaches => last.push(c),
                _ => units.push(c.to_string()),
            }
            glue_next = c == ZERO_WIDTH_JOINER;
        }
        units
    }
}

/// Maps values back to a global path such as `Number.MAX_VALUE`.
pub trait WellKnownValues {
    /// Returns the global path naming `value`, if any.
    fn path_of(&self, value: &Value) -> Option<ValuePath>;
}

/// Recognises `Number` constants and well-known symbols.
///
/// ```
/// # use valdiff_core::{DefaultWellKnown, Symbol, Value, WellKnownValues};
/// let known = DefaultWellKnown;
/// let path = known.path_of(&Value::Number(f64::MAX)).unwrap();
/// assert_eq!(path.to_string(), "Number.MAX_VALUE");
/// let path = known.path_of(&Symbol::well_known("iterator").into()).unwrap();
/// assert_eq!(path.to_string(), "Symbol.iterator");
/// assert!(known.path_of(&Value::Number(1.0)).is_none());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultWellKnown;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl WellKnownValues for DefaultWellKnown {
    fn path_of(&self, value: &Value) -> Option<ValuePath> {
        let member = match value {
            Value::Number(n) => number_constant(*n)?,
            Value::Symbol(symbol) => {
                return symbol.well_known_name().map(|name| {
                    ValuePath::root("Symbol").append(PathSegment::identifier(name))
                });
            }
            _ => return None,
        };
        Some(ValuePath::root("Number").append(PathSegment::identifier(member)))
    }
}

fn number_constant(n: f64) -> Option<&'static str> {
    if n == f64::MAX {
        Some("MAX_VALUE")
    } else if n == f64::from_bits(1) {
        Some("MIN_VALUE")
    } else if n == MAX_SAFE_INTEGER {
        Some("MAX_SAFE_INTEGER")
    } else if n == -MAX_SAFE_INTEGER {
        Some("MIN_SAFE_INTEGER")
    } else if n == f64::EPSILON {
        Some("EPSILON")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joiner_sequences_stay_together() {
        let family = "\u{1f468}\u{200d}\u{1f469}";
        let units = UnicodeMeasure.tokenize(&format!("{family}!"));
        assert_eq!(units, vec![family.to_owned(), "!".to_owned()]);
    }

    #[test]
    fn control_characters_are_their_own_units() {
        assert_eq!(UnicodeMeasure.tokenize("a\u{1}b"), vec!["a", "\u{1}", "b"]);
    }

    #[test]
    fn leading_combining_mark_starts_a_unit() {
        assert_eq!(UnicodeMeasure.tokenize("\u{301}a"), vec!["\u{301}", "a"]);
    }

    #[test]
    fn safe_integer_bounds_are_named() {
        let path = DefaultWellKnown.path_of(&Value::Number(-MAX_SAFE_INTEGER)).unwrap();
        assert_eq!(path.to_string(), "Number.MIN_SAFE_INTEGER");
        assert!(DefaultWellKnown.path_of(&Value::from("MAX_VALUE")).is_none());
    }
}

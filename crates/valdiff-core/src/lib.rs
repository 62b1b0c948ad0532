//! Structural comparison of dynamic values with width-bounded diff
//! rendering.
//!
//! `valdiff-core` compares an *actual* and an *expect* value, annotates
//! both trees with what differs, and renders each side into a compact,
//! column-bounded block suitable for assertion failure messages.
//!
//! ```
//! use valdiff_core::assert::{AssertArgs, Engine};
//! use valdiff_core::{Object, Value};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::default();
//!     let actual = Object::array([1, 2, 3].map(Value::from));
//!     let expect = Object::array([1, 2, 3, 4].map(Value::from));
//!
//!     let err = engine.assert(AssertArgs::new(actual, expect)).unwrap_err();
//!     let failure = err.as_assertion().ok_or("expected a diff")?;
//!     assert_eq!(failure.actual_diff(), "[1, 2, 3]");
//!     assert_eq!(failure.expect_diff(), "[1, 2, 3, 4]");
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assert;
mod compare;
mod error;
mod matcher;
mod measure;
mod node;
mod options;
mod path;
mod quote;
mod render;
mod value;

pub use compare::{Comparison, ComparisonId, Reasons};
pub use error::{AssertError, AssertionError, ConvertError, OptionsError, UsageError};
pub use matcher::{Matcher, DEFAULT_CLOSE_TO_PRECISION};
pub use measure::{DefaultWellKnown, StringMeasure, UnicodeMeasure, WellKnownValues};
pub use node::{
    Category, ChildKey, DiffType, Forest, GroupKind, IdentityFlags, ItemKey, Node, NodeId, Placeholder, PropKey,
    Side, Slot,
};
pub use options::{AssertOptions, ContextWindow, EngineConfig, OnelineOrder, Order, PerValueLimits};
pub use path::{PathSegment, ValuePath};
pub use value::{
    format_date, format_number, Descriptor, FunctionInfo, FunctionKind, Integrity, Object, ObjectData, ObjectKind,
    Property, PropertyKey, PropertyValue, Symbol, Value, WELL_KNOWN_SYMBOLS,
};

/// Returns the semantic version of the `valdiff-core` crate.
///
/// ```
/// assert!(!valdiff_core::version().is_empty());
/// ```
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

use thiserror::Error;

/// Errors that can occur while converting external documents into [`Value`].
///
/// [`Value`]: crate::Value
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The provided JSON input was invalid.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The provided YAML input was invalid.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Encountered a number that cannot be represented as an IEEE-754 f64.
    #[error("number {value} cannot be represented as f64")]
    NumberOutOfRange {
        /// The textual representation of the offending number.
        value: String,
    },
    /// YAML maps may only contain scalar keys.
    #[error("unsupported YAML key type: {found}")]
    UnsupportedYamlKey {
        /// A description of the key that triggered the error.
        found: String,
    },
    /// YAML tags have no counterpart in the value model.
    #[error("unsupported YAML tag: {tag}")]
    UnsupportedYamlTag {
        /// The tag identifier encountered in the document.
        tag: String,
    },
}

/// Errors emitted when constructing [`AssertOptions`].
///
/// [`AssertOptions`]: crate::AssertOptions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    /// The column budget must leave room for at least one character.
    #[error("max columns must be at least 1")]
    ZeroColumns,
    /// A diff budget of zero would hide every difference.
    #[error("max diff must be at least 1")]
    ZeroDiffBudget,
    /// The key order name is not recognised.
    #[error("unknown order `{name}`, expected `natural` or `sort`")]
    UnknownOrder {
        /// The rejected order name.
        name: String,
    },
}

/// A malformed call to the assertion entry point.
///
/// Usage errors are raised before any comparison starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    /// The sole argument was not a plain object.
    #[error("assert must be called with an object, received {found}")]
    NotAnObject {
        /// A short description of the received value.
        found: String,
    },
    /// One of the mandatory keys is absent.
    #[error("assert must be called with {{ actual, expect }}, `{key}` is missing")]
    MissingKey {
        /// The missing key.
        key: &'static str,
    },
    /// The call object contained a key the engine does not know.
    #[error("assert does not accept `{key}`")]
    UnknownKey {
        /// The offending key.
        key: String,
    },
    /// A known option carried a value of the wrong shape.
    #[error("assert option `{key}` must be {expected}, received {found}")]
    InvalidOption {
        /// The option name as written by the caller.
        key: String,
        /// What the option accepts.
        expected: &'static str,
        /// A short description of the received value.
        found: String,
    },
    /// The option value passed validation of its shape but not of its range.
    #[error("assert option `{key}` is invalid: {source}")]
    OptionOutOfRange {
        /// The option name as written by the caller.
        key: String,
        /// The underlying validation failure.
        #[source]
        source: OptionsError,
    },
}

/// The outcome of a failed comparison.
///
/// The [`Display`](std::fmt::Display) implementation yields the full
/// human-readable message; the rendered halves are also exposed
/// separately.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AssertionError {
    message: String,
    diff: String,
    actual_diff: String,
    expect_diff: String,
}

impl AssertionError {
    pub(crate) fn new(
        message: String,
        diff: String,
        actual_diff: String,
        expect_diff: String,
    ) -> Self {
        Self { message, diff, actual_diff, expect_diff }
    }

    /// Returns the complete message shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the `actual: … --- expect: …` block.
    #[must_use]
    pub fn diff(&self) -> &str {
        &self.diff
    }

    /// Returns the rendering of the actual side without its label.
    #[must_use]
    pub fn actual_diff(&self) -> &str {
        &self.actual_diff
    }

    /// Returns the rendering of the expect side without its label.
    #[must_use]
    pub fn expect_diff(&self) -> &str {
        &self.expect_diff
    }
}

/// Every error the assertion facade can return.
#[derive(Debug, Error)]
pub enum AssertError {
    /// The call itself was malformed.
    #[error(transparent)]
    Usage(#[from] UsageError),
    /// The options could not be validated.
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// The values differ.
    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

impl AssertError {
    /// Returns the assertion failure when the values differed.
    #[must_use]
    pub fn as_assertion(&self) -> Option<&AssertionError> {
        match self {
            Self::Assertion(err) => Some(err),
            _ => None,
        }
    }
}

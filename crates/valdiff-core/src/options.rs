use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::OptionsError;

/// Controls the order in which object properties are displayed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    /// Insertion order (default).
    #[default]
    Natural,
    /// Lexicographic key order.
    Sort,
}

impl FromStr for Order {
    type Err = OptionsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "natural" => Ok(Self::Natural),
            "sort" => Ok(Self::Sort),
            other => Err(OptionsError::UnknownOrder { name: other.to_owned() }),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Natural => f.write_str("natural"),
            Order::Sort => f.write_str("sort"),
        }
    }
}

/// The order in which neighbours of the focused child are added when a
/// group is laid out on a single line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnelineOrder {
    /// Alternate previous and next, starting with previous (default).
    #[default]
    PickAroundStartingBefore,
    /// Alternate next and previous, starting with next.
    PickAroundStartingAfter,
    /// Every previous child first, then every next child.
    AllBeforeThenAllAfter,
    /// Every next child first, then every previous child.
    AllAfterThenAllBefore,
}

/// How many differences a single value may report per kind of child
/// before further ones are collapsed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerValueLimits {
    /// Object properties.
    pub prop: usize,
    /// Array and typed-array elements.
    pub index: usize,
    /// Map, set, search-param and header entries.
    pub entry: usize,
    /// Lines of a multi-line string.
    pub line: usize,
}

impl Default for PerValueLimits {
    fn default() -> Self {
        Self { prop: 2, index: 3, entry: 2, line: 2 }
    }
}

impl PerValueLimits {
    /// Uses the same limit for every kind.
    #[must_use]
    pub fn uniform(limit: usize) -> Self {
        Self { prop: limit, index: limit, entry: limit, line: limit }
    }
}

/// Rows kept around a difference in multiline layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextWindow {
    /// Rows of properties, elements and entries.
    pub prop: usize,
    /// Lines of strings.
    pub line: usize,
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self { prop: 2, line: 3 }
    }
}

impl ContextWindow {
    /// Uses the same window for properties and lines.
    #[must_use]
    pub fn uniform(rows: usize) -> Self {
        Self { prop: rows, line: rows }
    }
}

/// Budgets and layout switches applied to one assertion.
///
/// ```
/// # use valdiff_core::{AssertOptions, Order};
/// let opts = AssertOptions::default()
///     .with_max_columns(60)
///     .and_then(|opts| opts.with_order(Order::Sort))
///     .expect("valid options");
/// assert_eq!(opts.max_columns(), 60);
/// assert_eq!(opts.max_depth(), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssertOptions {
    max_depth: usize,
    max_depth_inside_diff: usize,
    max_diff: usize,
    max_diff_per_value: PerValueLimits,
    max_context_before_diff: ContextWindow,
    max_context_after_diff: ContextWindow,
    max_columns: usize,
    order: Order,
    oneline_order: OnelineOrder,
    force_multiline_diff: bool,
    quote_backtick: bool,
}

impl Default for AssertOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_depth_inside_diff: 1,
            max_diff: 15,
            max_diff_per_value: PerValueLimits::default(),
            max_context_before_diff: ContextWindow::default(),
            max_context_after_diff: ContextWindow::default(),
            max_columns: 100,
            order: Order::Natural,
            oneline_order: OnelineOrder::default(),
            force_multiline_diff: false,
            quote_backtick: true,
        }
    }
}

impl AssertOptions {
    /// Depth below the first rendered value after which composites collapse.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Depth below the nearest differing ancestor after which unchanged
    /// composites collapse.
    #[must_use]
    pub fn max_depth_inside_diff(&self) -> usize {
        self.max_depth_inside_diff
    }

    /// Total number of differences reported before collapsing the rest.
    #[must_use]
    pub fn max_diff(&self) -> usize {
        self.max_diff
    }

    /// Per-kind difference ceilings within one value.
    #[must_use]
    pub fn max_diff_per_value(&self) -> PerValueLimits {
        self.max_diff_per_value
    }

    /// Rows shown before each difference.
    #[must_use]
    pub fn max_context_before_diff(&self) -> ContextWindow {
        self.max_context_before_diff
    }

    /// Rows shown after each difference.
    #[must_use]
    pub fn max_context_after_diff(&self) -> ContextWindow {
        self.max_context_after_diff
    }

    /// Column budget of each rendered line.
    #[must_use]
    pub fn max_columns(&self) -> usize {
        self.max_columns
    }

    /// Property display order.
    #[must_use]
    pub fn order(&self) -> Order {
        self.order
    }

    /// Expansion order for single-line layouts.
    #[must_use]
    pub fn oneline_order(&self) -> OnelineOrder {
        self.oneline_order
    }

    /// Whether differing groups always use the multiline layout.
    #[must_use]
    pub fn force_multiline_diff(&self) -> bool {
        self.force_multiline_diff
    }

    /// Whether backticks may be chosen as string quotes.
    #[must_use]
    pub fn quote_backtick(&self) -> bool {
        self.quote_backtick
    }

    /// Sets [`max_depth`](Self::max_depth).
    pub fn with_max_depth(mut self, depth: usize) -> Result<Self, OptionsError> {
        self.max_depth = depth;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`max_depth_inside_diff`](Self::max_depth_inside_diff).
    pub fn with_max_depth_inside_diff(mut self, depth: usize) -> Result<Self, OptionsError> {
        self.max_depth_inside_diff = depth;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`max_diff`](Self::max_diff).
    ///
    /// ```
    /// # use valdiff_core::{AssertOptions, OptionsError};
    /// let err = AssertOptions::default().with_max_diff(0).unwrap_err();
    /// assert_eq!(err, OptionsError::ZeroDiffBudget);
    /// ```
    pub fn with_max_diff(mut self, max_diff: usize) -> Result<Self, OptionsError> {
        self.max_diff = max_diff;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`max_diff_per_value`](Self::max_diff_per_value).
    pub fn with_max_diff_per_value(mut self, limits: PerValueLimits) -> Result<Self, OptionsError> {
        self.max_diff_per_value = limits;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`max_context_before_diff`](Self::max_context_before_diff).
    pub fn with_max_context_before_diff(mut self, window: ContextWindow) -> Result<Self, OptionsError> {
        self.max_context_before_diff = window;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`max_context_after_diff`](Self::max_context_after_diff).
    pub fn with_max_context_after_diff(mut self, window: ContextWindow) -> Result<Self, OptionsError> {
        self.max_context_after_diff = window;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`max_columns`](Self::max_columns).
    ///
    /// ```
    /// # use valdiff_core::{AssertOptions, OptionsError};
    /// let err = AssertOptions::default().with_max_columns(0).unwrap_err();
    /// assert_eq!(err, OptionsError::ZeroColumns);
    /// ```
    pub fn with_max_columns(mut self, columns: usize) -> Result<Self, OptionsError> {
        self.max_columns = columns;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`order`](Self::order).
    pub fn with_order(mut self, order: Order) -> Result<Self, OptionsError> {
        self.order = order;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`oneline_order`](Self::oneline_order).
    pub fn with_oneline_order(mut self, order: OnelineOrder) -> Result<Self, OptionsError> {
        self.oneline_order = order;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`force_multiline_diff`](Self::force_multiline_diff).
    pub fn with_force_multiline_diff(mut self, force: bool) -> Result<Self, OptionsError> {
        self.force_multiline_diff = force;
        self.validate()?;
        Ok(self)
    }

    /// Sets [`quote_backtick`](Self::quote_backtick).
    pub fn with_quote_backtick(mut self, allowed: bool) -> Result<Self, OptionsError> {
        self.quote_backtick = allowed;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), OptionsError> {
        if self.max_columns == 0 {
            return Err(OptionsError::ZeroColumns);
        }
        if self.max_diff == 0 {
            return Err(OptionsError::ZeroDiffBudget);
        }
        Ok(())
    }
}

/// Engine-wide settings fixed at construction.
///
/// ```
/// # use valdiff_core::EngineConfig;
/// let config = EngineConfig::default().with_color(true);
/// assert!(config.color_enabled());
/// assert!(!config.underline_enabled());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    color: bool,
    underline: bool,
    defaults: AssertOptions,
}

impl EngineConfig {
    /// Whether diffs carry ANSI colors.
    #[must_use]
    pub fn color_enabled(&self) -> bool {
        self.color
    }

    /// Whether differing text is also underlined.
    #[must_use]
    pub fn underline_enabled(&self) -> bool {
        self.underline
    }

    /// Options applied when an assertion does not override them.
    #[must_use]
    pub fn defaults(&self) -> &AssertOptions {
        &self.defaults
    }

    /// Enables or disables ANSI colors.
    #[must_use]
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Enables or disables underlining of differing text.
    #[must_use]
    pub fn with_underline(mut self, enabled: bool) -> Self {
        self.underline = enabled;
        self
    }

    /// Replaces the default options.
    #[must_use]
    pub fn with_defaults(mut self, defaults: AssertOptions) -> Self {
        self.defaults = defaults;
        self
    }
}

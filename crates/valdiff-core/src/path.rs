use std::fmt;

use crate::quote::{is_identifier, quote_key};

/// Represents one step taken from a value to reach one of its children.
///
/// ```
/// # use valdiff_core::PathSegment;
/// let prop = PathSegment::property("name");
/// let index = PathSegment::index(2);
/// assert!(matches!(prop, PathSegment::Property(_)));
/// assert!(matches!(index, PathSegment::Index(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A bare name such as the root label or a global (`Number`).
    Identifier(String),
    /// Array-like index access.
    Index(usize),
    /// Engine-internal slot, e.g. the entries of a map.
    InternalSlot(String),
    /// Own property access by string key.
    Property(String),
    /// Own property access by symbol; holds the symbol's rendering.
    Symbol(String),
}

impl PathSegment {
    /// Creates an identifier segment.
    #[must_use]
    pub fn identifier<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::Identifier(value.into())
    }

    /// Creates a property segment.
    #[must_use]
    pub fn property<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::Property(value.into())
    }

    /// Creates an index segment.
    #[must_use]
    pub fn index(value: usize) -> Self {
        Self::Index(value)
    }

    /// Creates an internal slot segment.
    #[must_use]
    pub fn internal<S>(value: S) -> Self
    where
        S: Into<String>,
    {
        Self::InternalSlot(value.into())
    }

    fn write_to(&self, f: &mut fmt::Formatter<'_>, leading: bool) -> fmt::Result {
        match self {
            Self::Identifier(name) if leading => f.write_str(name),
            Self::Identifier(name) => write!(f, ".{name}"),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::InternalSlot(name) if leading => write!(f, "[[{name}]]"),
            Self::InternalSlot(name) => write!(f, ".[[{name}]]"),
            Self::Property(key) if is_identifier(key) => {
                if leading {
                    f.write_str(key)
                } else {
                    write!(f, ".{key}")
                }
            }
            Self::Property(key) => write!(f, "[{}]", quote_key(key)),
            Self::Symbol(description) => write!(f, "[{description}]"),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, true)
    }
}

/// Describes how a value was reached from the root of its tree.
///
/// Paths are immutable: [`ValuePath::append`] returns a new path.
///
/// ```
/// # use valdiff_core::{PathSegment, ValuePath};
/// let path = ValuePath::root("actual")
///     .append(PathSegment::property("users"))
///     .append(PathSegment::index(0))
///     .append(PathSegment::property("first name"));
/// assert_eq!(path.to_string(), "actual.users[0][\"first name\"]");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValuePath(Vec<PathSegment>);

impl ValuePath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a path holding a single identifier segment.
    #[must_use]
    pub fn root<S>(name: S) -> Self
    where
        S: Into<String>,
    {
        Self(vec![PathSegment::identifier(name)])
    }

    /// Returns a new path extended by `segment`.
    #[must_use]
    pub fn append(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(segment);
        Self(segments)
    }

    /// Returns the underlying segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path with the last segment removed, if any.
    ///
    /// ```
    /// # use valdiff_core::{PathSegment, ValuePath};
    /// let path = ValuePath::root("actual").append(PathSegment::index(1));
    /// assert_eq!(path.drop_last(), ValuePath::root("actual"));
    /// ```
    #[must_use]
    pub fn drop_last(&self) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        Self(segments)
    }

    /// Renders the path with its first segment replaced by `label`.
    ///
    /// Two paths reached the same way from their respective roots render
    /// identically regardless of which tree they belong to.
    ///
    /// ```
    /// # use valdiff_core::{PathSegment, ValuePath};
    /// let actual = ValuePath::root("actual").append(PathSegment::property("self"));
    /// let expect = ValuePath::root("expect").append(PathSegment::property("self"));
    /// assert_eq!(actual.relative_to("root"), expect.relative_to("root"));
    /// assert_eq!(actual.relative_to("root"), "root.self");
    /// ```
    #[must_use]
    pub fn relative_to(&self, label: &str) -> String {
        let mut relabelled = Vec::with_capacity(self.0.len());
        relabelled.push(PathSegment::identifier(label));
        relabelled.extend(self.0.iter().skip(1).cloned());
        Self(relabelled).to_string()
    }
}

impl From<Vec<PathSegment>> for ValuePath {
    fn from(value: Vec<PathSegment>) -> Self {
        Self(value)
    }
}

impl From<PathSegment> for ValuePath {
    fn from(value: PathSegment) -> Self {
        Self(vec![value])
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            segment.write_to(f, idx == 0)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValuePath {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ValuePath {
    type Item = PathSegment;
    type IntoIter = std::vec::IntoIter<PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_slots_and_symbols_render_in_brackets() {
        let path = ValuePath::root("expect")
            .append(PathSegment::internal("entries"))
            .append(PathSegment::index(3))
            .append(PathSegment::Symbol("Symbol(tag)".into()));
        assert_eq!(path.to_string(), "expect.[[entries]][3][Symbol(tag)]");
    }

    #[test]
    fn append_leaves_original_untouched() {
        let base = ValuePath::root("actual");
        let extended = base.append(PathSegment::property("a"));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert_eq!(extended.to_string(), "actual.a");
    }

    #[test]
    fn well_known_paths_join_identifiers_with_dots() {
        let path = ValuePath::root("Number").append(PathSegment::identifier("MAX_VALUE"));
        assert_eq!(path.to_string(), "Number.MAX_VALUE");
    }
}

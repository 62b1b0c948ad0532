//! Lock-step comparison of an actual and an expect tree.
//!
//! Comparing annotates both trees in place: every visited node learns its
//! diff type and counterpart, and every pair of nodes produces a
//! [`Comparison`] recording why it differs.

use std::collections::{BTreeSet, HashMap};

use crate::matcher::MatchContext;
use crate::node::{Category, CompareMeta, DiffType, Forest, GroupKind, Layout, NodeId, Placeholder, Shape, Side, Slot};
use crate::quote::choose_quote;
use crate::{AssertOptions, Value};

/// Index of a comparison inside its [`Forest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComparisonId(pub(crate) usize);

/// Comparisons responsible for a difference, split by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reasons {
    /// Values present on the expect side only.
    pub added: BTreeSet<ComparisonId>,
    /// Values present on the actual side only.
    pub removed: BTreeSet<ComparisonId>,
    /// Values present on both sides with different content.
    pub modified: BTreeSet<ComparisonId>,
}

impl Reasons {
    /// Whether any reason is recorded.
    #[must_use]
    pub fn any(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty())
    }

    /// Total number of recorded reasons.
    #[must_use]
    pub fn count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    fn extend(&mut self, other: &Self) {
        self.added.extend(other.added.iter().copied());
        self.removed.extend(other.removed.iter().copied());
        self.modified.extend(other.modified.iter().copied());
    }
}

/// The result of comparing one actual/expect pair.
#[derive(Clone, Debug)]
pub struct Comparison {
    pub(crate) actual: Slot,
    pub(crate) expect: Slot,
    pub(crate) parent: Option<ComparisonId>,
    pub(crate) children: Vec<ComparisonId>,
    pub(crate) self_reasons: Reasons,
    pub(crate) inside: Reasons,
    pub(crate) overall: Reasons,
    pub(crate) has_any_diff: bool,
    pub(crate) done: bool,
}

impl Comparison {
    fn new(actual: Slot, expect: Slot, parent: Option<ComparisonId>) -> Self {
        Self {
            actual,
            expect,
            parent,
            children: Vec::new(),
            self_reasons: Reasons::default(),
            inside: Reasons::default(),
            overall: Reasons::default(),
            has_any_diff: false,
            done: false,
        }
    }

    /// The actual side.
    #[must_use]
    pub fn actual(&self) -> Slot {
        self.actual
    }

    /// The expect side.
    #[must_use]
    pub fn expect(&self) -> Slot {
        self.expect
    }

    /// The enclosing comparison.
    #[must_use]
    pub fn parent(&self) -> Option<ComparisonId> {
        self.parent
    }

    /// Comparisons of the children, in comparison order.
    #[must_use]
    pub fn children(&self) -> &[ComparisonId] {
        &self.children
    }

    /// Differences of the pair itself.
    #[must_use]
    pub fn self_reasons(&self) -> &Reasons {
        &self.self_reasons
    }

    /// Differences found below the pair.
    #[must_use]
    pub fn inside(&self) -> &Reasons {
        &self.inside
    }

    /// Union of [`self_reasons`](Self::self_reasons) and
    /// [`inside`](Self::inside).
    #[must_use]
    pub fn overall(&self) -> &Reasons {
        &self.overall
    }

    /// Whether anything differs in or below the pair.
    #[must_use]
    pub fn has_any_diff(&self) -> bool {
        self.has_any_diff
    }

    /// Whether the comparison finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[derive(Clone, Copy)]
enum Reason {
    Added,
    Removed,
    Modified,
}

/// Walks two trees of a [`Forest`] and records their differences.
pub(crate) struct Comparator<'a> {
    forest: &'a mut Forest,
    options: &'a AssertOptions,
    diff_count: usize,
    counting: bool,
    recompare: bool,
}

impl<'a> Comparator<'a> {
    pub(crate) fn new(forest: &'a mut Forest, options: &'a AssertOptions) -> Self {
        Self { forest, options, diff_count: 0, counting: true, recompare: false }
    }

    /// Compares two roots, returning the top-level comparison.
    pub(crate) fn compare_roots(&mut self, actual: NodeId, expect: NodeId) -> ComparisonId {
        let root = self.compare(Slot::Node(actual), Slot::Node(expect), None);
        tracing::debug!(
            diffs = self.diff_count,
            comparisons = self.forest.comparisons.len(),
            has_any_diff = self.forest.comparisons[root.0].has_any_diff,
            "trees compared"
        );
        root
    }

    /// Compares a pair of slots.
    ///
    /// # Panics
    ///
    /// Panics when a node was already compared and no matcher asked for a
    /// re-comparison.
    pub(crate) fn compare(&mut self, actual: Slot, expect: Slot, parent: Option<ComparisonId>) -> ComparisonId {
        let id = ComparisonId(self.forest.comparisons.len());
        self.forest.comparisons.push(Comparison::new(actual, expect, parent));
        if let Some(parent) = parent {
            self.forest.comparisons[parent.0].children.push(id);
        }
        if let Some(node) = actual.node() {
            self.claim(node, expect, id);
        }
        if let Some(node) = expect.node() {
            self.claim(node, actual, id);
        }
        match (actual, expect) {
            (Slot::Node(a), Slot::Node(e)) => self.compare_nodes(id, a, e),
            (Slot::Node(node), Slot::Placeholder(placeholder))
            | (Slot::Placeholder(placeholder), Slot::Node(node)) => {
                self.against_placeholder(id, node, placeholder);
            }
            (Slot::Placeholder(_), Slot::Placeholder(_)) => {}
        }
        self.finish(id);
        id
    }

    fn claim(&mut self, node: NodeId, other: Slot, id: ComparisonId) {
        let recompare = self.recompare;
        let node = self.forest.node_mut(node);
        assert!(
            !node.meta.compared || recompare,
            "node at `{}` was already compared",
            node.path
        );
        node.meta = CompareMeta { compared: true, other: Some(other), comparison: Some(id), ..CompareMeta::default() };
    }

    fn mark(&mut self, node: NodeId, diff: DiffType, whole: bool) {
        let meta = &mut self.forest.node_mut(node).meta;
        meta.diff_type = Some(diff);
        meta.whole = whole;
    }

    fn reason(&mut self, id: ComparisonId, reason: Reason) {
        let reasons = &mut self.forest.comparisons[id.0].self_reasons;
        match reason {
            Reason::Added => reasons.added.insert(id),
            Reason::Removed => reasons.removed.insert(id),
            Reason::Modified => reasons.modified.insert(id),
        };
    }

    fn compare_nodes(&mut self, id: ComparisonId, a: NodeId, e: NodeId) {
        let expect = self.forest.node(e);
        if expect.flags.is_matcher && expect.side == Side::Expect {
            self.apply_matcher(id, a, e);
            return;
        }
        let actual = self.forest.node(a);
        tracing::trace!(path = %actual.path, "comparing");
        let (category, other_category) = (actual.category, expect.category);
        let hidden = (actual.is_hidden || expect.is_hidden) && category != Category::Entries;
        if hidden {
            self.mark(a, DiffType::Same, true);
            self.mark(e, DiffType::Same, true);
            return;
        }
        if category != other_category {
            self.category_mismatch(id, a, e);
            return;
        }
        match category {
            Category::Primitive
            | Category::EntryKey
            | Category::EntryValue
            | Category::PathPart
            | Category::WellKnown => self.compare_primitives(id, a, e),
            Category::Composite => {
                let same_object = match (&actual.value, &expect.value) {
                    (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
                    _ => false,
                };
                if same_object {
                    self.mark(a, DiffType::Same, true);
                    self.mark(e, DiffType::Same, true);
                } else {
                    self.mark(a, DiffType::Same, false);
                    self.mark(e, DiffType::Same, false);
                    self.compare_children(id, a, e);
                }
            }
            Category::Reference => {
                if actual.text == expect.text {
                    self.mark(a, DiffType::Same, true);
                    self.mark(e, DiffType::Same, true);
                } else {
                    self.reason(id, Reason::Modified);
                    self.mark(a, DiffType::Modified, true);
                    self.mark(e, DiffType::Modified, true);
                }
            }
            Category::Entries | Category::Entry => {
                self.mark(a, DiffType::Same, false);
                self.mark(e, DiffType::Same, false);
                self.compare_children(id, a, e);
            }
        }
    }

    fn compare_primitives(&mut self, id: ComparisonId, a: NodeId, e: NodeId) {
        let (actual, expect) = (self.forest.node(a), self.forest.node(e));
        let quote = (actual.quoted && expect.quoted).then(|| {
            let combined = format!("{}{}", actual.value.as_str().unwrap_or_default(), expect.value.as_str().unwrap_or_default());
            choose_quote(&combined, self.options.quote_backtick())
        });
        let same = actual.value.same_value(&expect.value);
        let same_shape = actual.shape == expect.shape && actual.shape != Shape::Atom;
        if quote.is_some() {
            self.forest.node_mut(a).quote = quote;
            self.forest.node_mut(e).quote = quote;
        }
        if same {
            self.mark(a, DiffType::Same, true);
            self.mark(e, DiffType::Same, true);
            return;
        }
        self.reason(id, Reason::Modified);
        self.mark(a, DiffType::Modified, !same_shape);
        self.mark(e, DiffType::Modified, !same_shape);
        if same_shape {
            self.compare_children(id, a, e);
        }
    }

    fn category_mismatch(&mut self, id: ComparisonId, a: NodeId, e: NodeId) {
        let (actual, expect) = (self.forest.node(a), self.forest.node(e));
        let primitive_like = |category| {
            !matches!(category, Category::Composite | Category::Reference | Category::Entries | Category::Entry)
        };
        let comparable = (primitive_like(actual.category) && primitive_like(expect.category))
            || unboxed(&actual.value).same_value(&unboxed(&expect.value));
        if comparable {
            self.reason(id, Reason::Modified);
            self.mark(a, DiffType::Modified, true);
            self.mark(e, DiffType::Modified, true);
        } else {
            self.reason(id, Reason::Removed);
            self.reason(id, Reason::Added);
            self.mark(a, DiffType::Solo, true);
            self.mark(e, DiffType::Solo, true);
        }
    }

    fn against_placeholder(&mut self, id: ComparisonId, node: NodeId, placeholder: Placeholder) {
        match placeholder {
            Placeholder::Nothing => self.mark(node, DiffType::Solo, true),
            Placeholder::AddedOrRemoved => {
                let reason = match self.forest.node(node).side {
                    Side::Actual => Reason::Removed,
                    Side::Expect => Reason::Added,
                };
                self.reason(id, reason);
                self.mark(node, DiffType::Solo, true);
            }
            Placeholder::Same => self.mark(node, DiffType::Same, true),
            Placeholder::Modified => {
                self.reason(id, Reason::Modified);
                self.mark(node, DiffType::Modified, true);
            }
        }
    }

    fn apply_matcher(&mut self, id: ComparisonId, a: NodeId, e: NodeId) {
        let Some(matcher) = self.forest.node(e).value.as_matcher() else {
            return;
        };
        let passed = matcher.check(&mut MatchScope { comparator: self, actual: a });
        tracing::trace!(matcher = %matcher, passed, "matcher checked");
        let (outcome, diff) =
            if passed { (Placeholder::Same, DiffType::Same) } else { (Placeholder::Modified, DiffType::Modified) };
        let recompare = std::mem::replace(&mut self.recompare, true);
        self.compare(Slot::Node(a), Slot::Placeholder(outcome), Some(id));
        self.recompare = recompare;
        let meta = &mut self.forest.node_mut(a).meta;
        meta.other = Some(Slot::Node(e));
        meta.comparison = Some(id);
        self.mark(e, diff, true);
    }

    /// Compares the actual node against a freshly built expect value,
    /// leaving budgets untouched.
    fn subcompare(&mut self, actual: NodeId, expect: &Value) -> bool {
        let path = self.forest.node(actual).path.clone();
        let expect = self.forest.add_root_at(expect, Side::Expect, path);
        let saved = (self.diff_count, self.counting, self.recompare);
        self.counting = false;
        self.recompare = true;
        let id = self.compare(Slot::Node(actual), Slot::Node(expect), None);
        (self.diff_count, self.counting, self.recompare) = saved;
        !self.forest.comparisons[id.0].has_any_diff
    }

    fn compare_children(&mut self, id: ComparisonId, a: NodeId, e: NodeId) {
        let actual_children = self.forest.children(a);
        let expect_children = self.forest.children(e);
        let ceiling = match self.forest.node(a).layout {
            Layout::Group(kind) => Some(self.group_ceiling(kind)),
            _ => None,
        };
        let mut pairs = self.pair_children(&actual_children, &expect_children);
        if matches!(self.forest.node(a).layout, Layout::Group(GroupKind::Set)) {
            self.pair_set_members(&mut pairs);
        }
        let mut group_diffs = 0;
        for (actual, expect) in pairs {
            let over_budget = self.counting
                && (ceiling.is_some_and(|limit| group_diffs >= limit) || self.diff_count >= self.options.max_diff());
            let actual_slot = actual.map_or_else(|| self.missing(expect), Slot::Node);
            let expect_slot = expect.map_or_else(|| self.missing(actual), Slot::Node);
            let child = self.compare(actual_slot, expect_slot, Some(id));
            if !self.forest.comparisons[child.0].has_any_diff {
                continue;
            }
            group_diffs += 1;
            if over_budget {
                for node in [actual, expect].into_iter().flatten() {
                    self.forest.node_mut(node).meta.max_diff_reached = true;
                }
            }
        }
        if ceiling.is_some_and(|limit| group_diffs > limit) {
            tracing::debug!(path = %self.forest.node(a).path, diffs = group_diffs, "per-value diff budget exhausted");
        }
    }

    fn group_ceiling(&self, kind: GroupKind) -> usize {
        let limits = self.options.max_diff_per_value();
        match kind {
            GroupKind::Props => limits.prop,
            GroupKind::Indexed => limits.index,
            GroupKind::Lines => limits.line,
            GroupKind::Map | GroupKind::Set | GroupKind::SearchParams | GroupKind::Headers => limits.entry,
        }
    }

    fn missing(&self, present: Option<NodeId>) -> Slot {
        match present {
            Some(node) if self.forest.node(node).is_hidden => Slot::Placeholder(Placeholder::Nothing),
            _ => Slot::Placeholder(Placeholder::AddedOrRemoved),
        }
    }

    /// Pairs children by key. Expect order leads unless the actual side
    /// holds every expect key plus extra ones.
    fn pair_children(&self, actual: &[NodeId], expect: &[NodeId]) -> Vec<(Option<NodeId>, Option<NodeId>)> {
        let key = |id: &NodeId| self.forest.node(*id).key.clone();
        let actual_by_key: HashMap<_, _> = actual.iter().map(|id| (key(id), *id)).collect();
        let expect_by_key: HashMap<_, _> = expect.iter().map(|id| (key(id), *id)).collect();
        let actual_leads = actual.len() > expect.len() && expect.iter().all(|id| actual_by_key.contains_key(&key(id)));
        let mut pairs = Vec::with_capacity(actual.len().max(expect.len()));
        if actual_leads {
            pairs.extend(actual.iter().map(|id| (Some(*id), expect_by_key.get(&key(id)).copied())));
        } else {
            pairs.extend(expect.iter().map(|id| (actual_by_key.get(&key(id)).copied(), Some(*id))));
            pairs.extend(
                actual.iter().filter(|id| !expect_by_key.contains_key(&key(id))).map(|id| (Some(*id), None)),
            );
        }
        pairs
    }

    /// Set members holding objects pair up with the first unpaired member
    /// of the other side that compares equal to them.
    fn pair_set_members(&mut self, pairs: &mut Vec<(Option<NodeId>, Option<NodeId>)>) {
        let mut paired = Vec::new();
        for index in 0..pairs.len() {
            let (Some(actual), None) = pairs[index] else {
                continue;
            };
            if !self.holds_object(actual) {
                continue;
            }
            let candidate = (0..pairs.len()).find(|&other| match pairs[other] {
                (None, Some(expect)) => self.holds_object(expect) && self.equivalent(actual, expect),
                _ => false,
            });
            if let Some(other) = candidate {
                pairs[other].0 = Some(actual);
                paired.push(index);
            }
        }
        for index in paired.into_iter().rev() {
            pairs.remove(index);
        }
    }

    fn holds_object(&self, id: NodeId) -> bool {
        matches!(self.forest.node(id).value, Value::Object(_))
    }

    /// Compares fresh copies of two nodes' values without touching the
    /// nodes themselves or the diff budgets.
    fn equivalent(&mut self, actual: NodeId, expect: NodeId) -> bool {
        let (actual, expect) = (self.forest.node(actual), self.forest.node(expect));
        let (actual_value, actual_path) = (actual.value.clone(), actual.path.clone());
        let (expect_value, expect_path) = (expect.value.clone(), expect.path.clone());
        let actual = self.forest.add_root_at(&actual_value, Side::Actual, actual_path);
        let expect = self.forest.add_root_at(&expect_value, Side::Expect, expect_path);
        let saved = (self.diff_count, self.counting);
        self.counting = false;
        let id = self.compare(Slot::Node(actual), Slot::Node(expect), None);
        (self.diff_count, self.counting) = saved;
        !self.forest.comparisons[id.0].has_any_diff
    }

    fn finish(&mut self, id: ComparisonId) {
        let mut inside = Reasons::default();
        for child in self.forest.comparisons[id.0].children.clone() {
            inside.extend(&self.forest.comparisons[child.0].overall);
        }
        let comparison = &mut self.forest.comparisons[id.0];
        let mut overall = comparison.self_reasons.clone();
        overall.extend(&inside);
        comparison.inside = inside;
        comparison.has_any_diff = overall.any();
        comparison.overall = overall;
        comparison.done = true;
        let comparison = &self.forest.comparisons[id.0];
        let counts = comparison.self_reasons.any()
            && [comparison.actual, comparison.expect]
                .into_iter()
                .filter_map(Slot::node)
                .any(|node| self.forest.node(node).is_value_level());
        if counts && self.counting {
            self.diff_count += 1;
            if self.diff_count == self.options.max_diff() {
                tracing::debug!(max_diff = self.diff_count, "global diff budget exhausted");
            }
        }
    }
}

fn unboxed(value: &Value) -> Value {
    match value {
        Value::Object(object) => match &*object.kind() {
            crate::ObjectKind::Boxed(inner) => (**inner).clone(),
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

struct MatchScope<'c, 'a> {
    comparator: &'c mut Comparator<'a>,
    actual: NodeId,
}

impl MatchContext for MatchScope<'_, '_> {
    fn actual(&self) -> Value {
        self.comparator.forest.node(self.actual).value.clone()
    }

    fn subcompare(&mut self, expect: &Value) -> bool {
        self.comparator.subcompare(self.actual, expect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Descriptor, Object, ObjectKind};

    fn compare(actual: &Value, expect: &Value) -> (Forest, ComparisonId, NodeId, NodeId) {
        let mut forest = Forest::default();
        let a = forest.add_root(actual, Side::Actual);
        let e = forest.add_root(expect, Side::Expect);
        let options = AssertOptions::default();
        let root = Comparator::new(&mut forest, &options).compare_roots(a, e);
        (forest, root, a, e)
    }

    #[test]
    fn equal_primitives_have_no_diff() {
        let (forest, root, a, _) = compare(&Value::from(1), &Value::from(1));
        assert!(!forest.comparison(root).has_any_diff());
        assert_eq!(forest.node(a).diff_type(), Some(DiffType::Same));
    }

    #[test]
    fn negative_zero_differs_from_zero() {
        let (forest, root, ..) = compare(&Value::from(0.0), &Value::from(-0.0));
        assert!(forest.comparison(root).has_any_diff());
    }

    #[test]
    fn differing_property_is_the_only_self_reason() {
        let actual = Object::plain().with_property("a", 1).with_property("b", 2).into();
        let expect = Object::plain().with_property("a", 1).with_property("b", 3).into();
        let (forest, root, ..) = compare(&actual, &expect);
        let overall = forest.comparison(root).overall();
        assert_eq!(overall.modified.len(), 1);
        assert!(overall.added.is_empty() && overall.removed.is_empty());
    }

    #[test]
    fn missing_element_is_added_on_expect_side() {
        let actual = Object::array([1, 2, 3].map(Value::from)).into();
        let expect = Object::array([1, 2, 3, 4].map(Value::from)).into();
        let (mut forest, root, _, e) = compare(&actual, &expect);
        assert_eq!(forest.comparison(root).overall().added.len(), 1);
        let indexed = forest.child(e, &crate::ChildKey::Indexed).unwrap();
        let last = forest.child(indexed, &crate::ChildKey::Index(3)).unwrap();
        assert_eq!(forest.node(last).diff_type(), Some(DiffType::Solo));
    }

    #[test]
    fn set_members_holding_objects_pair_by_structure() {
        let actual = Object::set([
            Object::plain().with_property("b", 2).into(),
            Object::plain().with_property("a", 1).into(),
        ])
        .into();
        let expect = Object::set([
            Object::plain().with_property("a", 1).into(),
            Object::plain().with_property("a", 3).into(),
        ])
        .into();
        let (forest, root, ..) = compare(&actual, &expect);
        let overall = forest.comparison(root).overall();
        assert_eq!((overall.added.len(), overall.removed.len(), overall.modified.len()), (1, 1, 0));
    }

    #[test]
    fn shared_identity_short_circuits() {
        let shared = Object::plain().with_property("deep", Object::plain());
        let (forest, root, a, _) = compare(&shared.clone().into(), &shared.into());
        assert!(!forest.comparison(root).has_any_diff());
        assert!(forest.node(a).meta.whole);
    }

    #[test]
    fn type_change_marks_both_sides_solo() {
        let (forest, root, a, e) = compare(&Value::from(1), &Object::plain().into());
        let overall = forest.comparison(root).overall();
        assert_eq!((overall.added.len(), overall.removed.len()), (1, 1));
        assert_eq!(forest.node(a).diff_type(), Some(DiffType::Solo));
        assert_eq!(forest.node(e).diff_type(), Some(DiffType::Solo));
    }

    #[test]
    fn boxed_value_against_its_primitive_is_modified() {
        let (forest, _, a, _) = compare(&Object::boxed(1).into(), &Value::from(1));
        assert_eq!(forest.node(a).diff_type(), Some(DiffType::Modified));
        assert!(matches!(*forest.node(a).value().as_object().unwrap().kind(), ObjectKind::Boxed(_)));
    }

    #[test]
    fn quotes_are_unified_across_sides() {
        let (forest, _, a, e) = compare(&Value::from("it's"), &Value::from("it\"s"));
        assert_eq!(forest.node(a).quote, forest.node(e).quote);
        assert_eq!(forest.node(a).quote, Some('`'));
    }

    #[test]
    fn passing_matcher_consumes_the_comparison() {
        let (forest, root, a, _) = compare(&Value::from(1), &crate::Matcher::Between(0.0, 10.0).into());
        assert!(!forest.comparison(root).has_any_diff());
        assert_eq!(forest.node(a).diff_type(), Some(DiffType::Same));
    }

    #[test]
    fn failing_matcher_marks_actual_modified() {
        let (forest, root, a, e) = compare(&Value::from(11), &crate::Matcher::Between(0.0, 10.0).into());
        assert!(forest.comparison(root).has_any_diff());
        assert_eq!(forest.node(a).diff_type(), Some(DiffType::Modified));
        assert_eq!(forest.node(e).diff_type(), Some(DiffType::Modified));
    }

    #[test]
    fn not_matcher_inverts_nested_structure() {
        let inner: Value = Object::plain().with_property("a", 1).into();
        let actual: Value = Object::plain().with_property("a", 2).into();
        let (forest, root, ..) = compare(&actual, &crate::Matcher::Not(inner).into());
        assert!(!forest.comparison(root).has_any_diff());
    }

    #[test]
    fn differences_past_the_group_ceiling_are_flagged() {
        let actual = Object::array((0..6).map(Value::from)).into();
        let expect = Object::array((10..16).map(Value::from)).into();
        let (mut forest, _, a, _) = compare(&actual, &expect);
        let indexed = forest.child(a, &crate::ChildKey::Indexed).unwrap();
        let flagged: Vec<bool> =
            forest.children(indexed).into_iter().map(|id| forest.node(id).max_diff_reached()).collect();
        assert_eq!(flagged, vec![false, false, false, true, true, true]);
    }

    #[test]
    fn hidden_error_stack_never_differs() {
        let actual = Object::error("Error", "boom");
        actual.define_property("stack", Descriptor::data("Error: boom\n    at elsewhere").hidden());
        let expect = Object::error("Error", "boom");
        let (forest, root, ..) = compare(&actual.into(), &expect.into());
        assert!(!forest.comparison(root).has_any_diff());
    }

    #[test]
    #[should_panic(expected = "already compared")]
    fn comparing_a_node_twice_is_a_bug() {
        let mut forest = Forest::default();
        let a = forest.add_root(&Value::from(1), Side::Actual);
        let e = forest.add_root(&Value::from(1), Side::Expect);
        let options = AssertOptions::default();
        let mut comparator = Comparator::new(&mut forest, &options);
        comparator.compare_roots(a, e);
        comparator.compare_roots(a, e);
    }
}

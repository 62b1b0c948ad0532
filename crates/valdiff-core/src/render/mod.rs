//! Turns compared trees into width-bounded text.
//!
//! Groups of children are laid out either on one line, centred on the
//! first difference, or one row per child with context windows around each
//! difference. Every single-line rendering fits the columns it is given.

use crate::node::{Category, ChildKey, DiffType, Forest, GroupKind, Layout, NodeId, Shown, DisplayMemo, Side, Slot};
use crate::quote::{choose_quote, escape_fragment};
use crate::{AssertOptions, EngineConfig, OnelineOrder, Order, Value};

pub(crate) const COLOR_RESET: &str = "\u{1b}[0m";
pub(crate) const COLOR_RED: &str = "\u{1b}[31m";
pub(crate) const COLOR_GREEN: &str = "\u{1b}[32m";
const UNDERLINE: &str = "\u{1b}[4m";

const MARKER: &str = "…";
const MARKER_WIDTH: usize = 1;
const INDENT: usize = 2;

/// Color used for differing text of a side.
pub(crate) fn side_color(side: Side) -> &'static str {
    match side {
        Side::Actual => COLOR_RED,
        Side::Expect => COLOR_GREEN,
    }
}

/// Position and budgets of one render call.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Ctx {
    /// Absolute column where the rendering starts.
    pub(crate) offset: usize,
    /// Columns available on the current line.
    pub(crate) columns: usize,
    /// Indentation level of the current line.
    pub(crate) indent: usize,
    /// Whether an ancestor is laid out on one line.
    pub(crate) oneline: bool,
    quote: Option<char>,
    paint: Option<DiffType>,
    start_depth: usize,
    diff_depth: Option<usize>,
}

impl Ctx {
    pub(crate) fn new(offset: usize, columns: usize, start_depth: usize) -> Self {
        Self {
            offset,
            columns,
            indent: 0,
            oneline: false,
            quote: None,
            paint: None,
            start_depth,
            diff_depth: None,
        }
    }

    pub(crate) fn oneline(mut self) -> Self {
        self.oneline = true;
        self
    }

    fn at(self, offset: usize, columns: usize) -> Self {
        Self { offset, columns, ..self }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Rendered {
    pub(crate) text: String,
    /// Absolute column after the last character.
    pub(crate) end: usize,
    pub(crate) multiline: bool,
    pub(crate) truncated: bool,
}

impl Rendered {
    fn single(text: String, ctx: Ctx, width: usize, truncated: bool) -> Self {
        Self { text, end: ctx.offset + width, multiline: false, truncated }
    }
}

pub(crate) struct Renderer<'a> {
    forest: &'a mut Forest,
    options: &'a AssertOptions,
    color: bool,
    underline: bool,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(forest: &'a mut Forest, options: &'a AssertOptions, config: &EngineConfig) -> Self {
        Self { forest, options, color: config.color_enabled(), underline: config.underline_enabled() }
    }

    pub(crate) fn render(&mut self, id: NodeId, ctx: Ctx) -> Rendered {
        if ctx.columns == 0 {
            return self.marker_only(id, ctx);
        }
        let layout = self.forest.node(id).layout;
        match layout {
            Layout::Leaf => self.render_leaf(id, ctx),
            Layout::Sequence if self.collapses(id, ctx) => self.render_collapsed(id, ctx),
            Layout::Sequence => self.render_sequence(id, ctx),
            Layout::Around => self.render_around(id, ctx),
            Layout::Group(kind) if !ctx.oneline && self.wants_multiline(id, kind, ctx) => match kind {
                GroupKind::Lines => self.render_lines(id, ctx),
                _ => self.render_rows(id, kind, ctx),
            },
            Layout::Group(_) => self.render_around(id, ctx),
        }
    }

    fn width(&self, text: &str) -> usize {
        self.forest.measure().width(text)
    }

    fn paint(&self, text: &str, id: NodeId, ctx: Ctx) -> String {
        let node = self.forest.node(id);
        let diff = ctx.paint.or(node.meta.diff_type);
        if !self.color || text.is_empty() || !matches!(diff, Some(DiffType::Modified | DiffType::Solo)) {
            return text.to_owned();
        }
        let underline = if self.underline { UNDERLINE } else { "" };
        format!("{}{underline}{text}{COLOR_RESET}", side_color(node.side))
    }

    /// Whether the node, or anything below it, differs.
    fn differs(&self, id: NodeId, ctx: Ctx) -> bool {
        if let Some(paint) = ctx.paint {
            return paint != DiffType::Same;
        }
        let meta = &self.forest.node(id).meta;
        matches!(meta.diff_type, Some(DiffType::Modified | DiffType::Solo))
            || meta.comparison.is_some_and(|comparison| self.forest.comparison(comparison).has_any_diff())
    }

    fn quote_of(&self, id: NodeId) -> char {
        let node = self.forest.node(id);
        node.quote.unwrap_or_else(|| {
            choose_quote(node.value.as_str().unwrap_or_default(), self.options.quote_backtick())
        })
    }

    fn child_ctx(&self, id: NodeId, ctx: Ctx) -> Ctx {
        let node = self.forest.node(id);
        let paint = ctx.paint.or_else(|| node.meta.whole.then_some(node.meta.diff_type).flatten());
        let diff_depth =
            if node.is_value_level() && self.differs(id, ctx) { Some(node.depth) } else { ctx.diff_depth };
        let quote = if node.quoted { Some(self.quote_of(id)) } else { ctx.quote };
        Ctx { paint, diff_depth, quote, ..ctx }
    }

    fn markers(&self, id: NodeId) -> (String, String, &'static str) {
        let node = self.forest.node(id);
        if node.quoted {
            let quote = self.quote_of(id).to_string();
            (quote.clone(), quote, node.separator)
        } else {
            (node.start_marker.clone(), node.end_marker.clone(), node.separator)
        }
    }

    fn visible_children(&mut self, id: NodeId) -> Vec<NodeId> {
        let children = self.forest.children(id);
        children.into_iter().filter(|child| !self.forest.node(*child).is_hidden).collect()
    }

    fn marker_only(&self, id: NodeId, ctx: Ctx) -> Rendered {
        Rendered::single(self.paint(MARKER, id, ctx), ctx, MARKER_WIDTH, true)
    }

    /// Fits `text` into the available columns, cutting it with a trailing
    /// marker when needed.
    fn fit(&self, text: &str, id: NodeId, ctx: Ctx) -> Rendered {
        let width = self.width(text);
        if width <= ctx.columns {
            return Rendered::single(self.paint(text, id, ctx), ctx, width, false);
        }
        let mut kept = String::new();
        let mut used = 0;
        for unit in self.forest.measure().tokenize(text) {
            let unit_width = self.width(&unit);
            if used + unit_width + MARKER_WIDTH > ctx.columns {
                break;
            }
            kept.push_str(&unit);
            used += unit_width;
        }
        kept.push_str(MARKER);
        Rendered::single(self.paint(&kept, id, ctx), ctx, used + MARKER_WIDTH, true)
    }

    fn render_leaf(&mut self, id: NodeId, ctx: Ctx) -> Rendered {
        let node = self.forest.node(id);
        let text = if node.fragment {
            escape_fragment(&node.text, ctx.quote).into_owned()
        } else {
            node.text.clone()
        };
        self.fit(&text, id, ctx)
    }

    fn collapses(&self, id: NodeId, ctx: Ctx) -> bool {
        let node = self.forest.node(id);
        if node.category != Category::Composite {
            return false;
        }
        if node.meta.max_diff_reached || node.depth > ctx.start_depth + self.options.max_depth() {
            return true;
        }
        !self.differs(id, ctx)
            && ctx.diff_depth.is_some_and(|depth| node.depth > depth + self.options.max_depth_inside_diff())
    }

    fn render_collapsed(&mut self, id: NodeId, ctx: Ctx) -> Rendered {
        let notation = match &self.forest.node(id).value {
            Value::Object(object) => object.collapsed_notation(),
            other => other.notation(),
        };
        self.fit(&notation, id, ctx)
    }

    fn render_sequence(&mut self, id: NodeId, ctx: Ctx) -> Rendered {
        let children = self.visible_children(id);
        let (start, end, separator) = self.markers(id);
        let (start_width, end_width, separator_width) =
            (self.width(&start), self.width(&end), self.width(separator));
        let minimum = start_width + end_width + if children.is_empty() { 0 } else { MARKER_WIDTH };
        if ctx.columns < minimum {
            return self.marker_only(id, ctx);
        }
        let inner = self.child_ctx(id, ctx);
        let limit = ctx.offset + ctx.columns;
        let mut text = self.paint(&start, id, ctx);
        let mut column = ctx.offset + start_width;
        let mut multiline = false;
        let mut truncated = false;
        for (index, child) in children.iter().enumerate() {
            let last = index + 1 == children.len();
            let reserve = if last { end_width } else { separator_width + MARKER_WIDTH + end_width };
            let available = limit.saturating_sub(column + reserve);
            if available == 0 {
                text.push_str(&self.paint(MARKER, id, ctx));
                column += MARKER_WIDTH;
                truncated = true;
                break;
            }
            let rendered = self.render(*child, inner.at(column, available));
            text.push_str(&rendered.text);
            column = rendered.end;
            multiline |= rendered.multiline;
            if rendered.truncated {
                truncated = true;
                break;
            }
            if !last {
                text.push_str(&self.paint(separator, id, ctx));
                column += separator_width;
            }
        }
        text.push_str(&self.paint(&end, id, ctx));
        Rendered { text, end: column + end_width, multiline, truncated }
    }

    fn render_around(&mut self, id: NodeId, ctx: Ctx) -> Rendered {
        let children = self.visible_children(id);
        let (start, end, separator) = self.markers(id);
        let (start_width, end_width, separator_width) =
            (self.width(&start), self.width(&end), self.width(separator));
        let count = children.len();
        if count == 0 {
            let text = format!("{start}{end}");
            return if start_width + end_width <= ctx.columns {
                Rendered::single(self.paint(&text, id, ctx), ctx, start_width + end_width, false)
            } else {
                self.marker_only(id, ctx)
            };
        }
        if ctx.columns < start_width + end_width + MARKER_WIDTH {
            return self.marker_only(id, ctx);
        }
        let budget = ctx.columns - start_width - end_width;
        let inner = self.child_ctx(id, ctx).oneline();
        let cost_before = |lo: usize| if lo > 0 { MARKER_WIDTH + separator_width } else { 0 };
        let cost_after = |hi: usize| if hi + 1 < count { separator_width + MARKER_WIDTH } else { 0 };
        let focus = children
            .iter()
            .position(|child| self.differs(*child, inner) && !self.forest.node(*child).meta.max_diff_reached)
            .unwrap_or(0);
        let (bound_lo, bound_hi) = match &self.forest.node(id).display {
            Some(DisplayMemo { columns, shown: Shown::Range { start, end } }) if *columns == ctx.columns => {
                (*start, *end)
            }
            _ => (0, count - 1),
        };
        let content_offset = ctx.offset + start_width;
        let mut rendered: Vec<Option<Rendered>> = vec![None; count];
        let available = budget.saturating_sub(cost_before(focus) + cost_after(focus));
        if available == 0 {
            return self.marker_only(id, ctx);
        }
        let first = self.render(children[focus], inner.at(content_offset, available));
        let mut used = first.end - content_offset;
        let focus_truncated = first.truncated;
        rendered[focus] = Some(first);
        let (mut lo, mut hi) = (focus, focus);
        if !focus_truncated {
            let order = self.options.oneline_order();
            let alternate =
                matches!(order, OnelineOrder::PickAroundStartingBefore | OnelineOrder::PickAroundStartingAfter);
            let mut prefer_before =
                matches!(order, OnelineOrder::PickAroundStartingBefore | OnelineOrder::AllBeforeThenAllAfter);
            let (mut open_before, mut open_after) = (true, true);
            loop {
                open_before &= lo > bound_lo;
                open_after &= hi < bound_hi;
                if !open_before && !open_after {
                    break;
                }
                let before = if !open_before {
                    false
                } else if !open_after {
                    true
                } else {
                    prefer_before
                };
                let (candidate, next_lo, next_hi) = if before { (lo - 1, lo - 1, hi) } else { (hi + 1, lo, hi + 1) };
                let room = budget.saturating_sub(used + separator_width + cost_before(next_lo) + cost_after(next_hi));
                let mut accepted = false;
                if room > 0 {
                    let candidate_offset = content_offset + used + separator_width;
                    let attempt = self.render(children[candidate], inner.at(candidate_offset, room));
                    let width = attempt.end - candidate_offset;
                    if !attempt.truncated && width <= room {
                        used += separator_width + width;
                        rendered[candidate] = Some(attempt);
                        (lo, hi) = (next_lo, next_hi);
                        accepted = true;
                    }
                }
                if !accepted {
                    if before {
                        open_before = false;
                    } else {
                        open_after = false;
                    }
                }
                if alternate {
                    prefer_before = !before;
                }
            }
        }
        self.forest.node_mut(id).display =
            Some(DisplayMemo { columns: ctx.columns, shown: Shown::Range { start: lo, end: hi } });

        let painted_separator = self.paint(separator, id, ctx);
        let mut text = self.paint(&start, id, ctx);
        if lo > 0 {
            text.push_str(&self.paint(MARKER, id, ctx));
            text.push_str(&painted_separator);
        }
        for (index, slot) in rendered.iter().enumerate().take(hi + 1).skip(lo) {
            if index > lo {
                text.push_str(&painted_separator);
            }
            if let Some(child) = slot {
                text.push_str(&child.text);
            }
        }
        if hi + 1 < count {
            text.push_str(&painted_separator);
            text.push_str(&self.paint(MARKER, id, ctx));
        }
        text.push_str(&self.paint(&end, id, ctx));
        let width = start_width + cost_before(lo) + used + cost_after(hi) + end_width;
        Rendered::single(text, ctx, width, focus_truncated || lo > 0 || hi + 1 < count)
    }

    fn wants_multiline(&mut self, id: NodeId, kind: GroupKind, ctx: Ctx) -> bool {
        let own = self.visible_children(id);
        if own.is_empty() {
            return false;
        }
        let other = match self.forest.node(id).meta.other {
            Some(Slot::Node(other)) => self.visible_children(other).len(),
            _ => 0,
        };
        if kind == GroupKind::Lines {
            return own.len() > 1 || other > 1;
        }
        let forced = self.options.force_multiline_diff() && self.differs(id, ctx);
        if forced {
            return true;
        }
        let complex = own.iter().any(|child| self.is_complex(*child));
        match kind {
            GroupKind::Indexed => complex,
            _ => complex || own.len() > 1 || other > 1,
        }
    }

    fn is_complex(&mut self, id: NodeId) -> bool {
        let target = match self.forest.node(id).category {
            Category::Entry => self.forest.child(id, &ChildKey::Value),
            _ => Some(id),
        };
        let Some(target) = target else {
            return false;
        };
        let node = self.forest.node(target);
        match &node.value {
            Value::Object(object) if node.category == Category::Composite && node.layout == Layout::Sequence => {
                let data = object.data();
                !data.elements().is_empty()
                    || !data.entries().is_empty()
                    || data.properties().iter().any(|prop| prop.descriptor.enumerable)
            }
            Value::String(text) => node.layout == Layout::Group(GroupKind::Lines) && text.contains('\n'),
            _ => false,
        }
    }

    fn ordered_children(&mut self, id: NodeId, kind: GroupKind) -> Vec<NodeId> {
        let children = self.visible_children(id);
        if kind != GroupKind::Props || self.options.order() != Order::Sort {
            return children;
        }
        let mut keyed: Vec<(String, NodeId)> = children
            .into_iter()
            .map(|child| {
                let key = self.forest.child(child, &ChildKey::Key).map(|key| self.forest.node(key).text.clone());
                (key.unwrap_or_default(), child)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.into_iter().map(|(_, child)| child).collect()
    }

    /// Chooses the rows to show: each difference with its context window,
    /// single-row gaps filled in.
    fn shown_rows(&mut self, id: NodeId, children: &[NodeId], kind: GroupKind, ctx: Ctx) -> Vec<bool> {
        if let Some(DisplayMemo { columns, shown: Shown::Rows(rows) }) = &self.forest.node(id).display {
            if *columns == ctx.columns && rows.len() == children.len() {
                return rows.clone();
            }
        }
        let (before, after) = match kind {
            GroupKind::Lines => {
                (self.options.max_context_before_diff().line, self.options.max_context_after_diff().line)
            }
            _ => (self.options.max_context_before_diff().prop, self.options.max_context_after_diff().prop),
        };
        let count = children.len();
        let mut shown = vec![false; count];
        let differing: Vec<usize> = children
            .iter()
            .enumerate()
            .filter(|(_, child)| self.differs(**child, ctx) && !self.forest.node(**child).meta.max_diff_reached)
            .map(|(index, _)| index)
            .collect();
        if differing.is_empty() {
            shown.iter_mut().take(after + 1).for_each(|row| *row = true);
        }
        for row in differing {
            let last = (row + after).min(count - 1);
            shown[row.saturating_sub(before)..=last].iter_mut().for_each(|row| *row = true);
        }
        for index in 0..count {
            let before_shown = index == 0 || shown[index - 1];
            let after_shown = index + 1 == count || shown[index + 1];
            if !shown[index] && before_shown && after_shown {
                shown[index] = true;
            }
        }
        self.forest.node_mut(id).display =
            Some(DisplayMemo { columns: ctx.columns, shown: Shown::Rows(shown.clone()) });
        shown
    }

    fn skip_marker(&self, hidden: &[NodeId], kind: GroupKind, ctx: Ctx) -> String {
        let (mut modified, mut added, mut removed) = (0, 0, 0);
        for child in hidden {
            let node = self.forest.node(*child);
            match ctx.paint.or(node.meta.diff_type) {
                Some(DiffType::Solo) if node.side == Side::Expect => added += 1,
                Some(DiffType::Solo) => removed += 1,
                Some(DiffType::Modified) => modified += 1,
                _ if self.differs(*child, ctx) => modified += 1,
                _ => {}
            }
        }
        let mut marker = format!("↕ {} {} ↕", hidden.len(), kind.noun(hidden.len()));
        let counts: Vec<String> = [(modified, "modified"), (added, "added"), (removed, "removed")]
            .into_iter()
            .filter(|(count, _)| *count > 0)
            .map(|(count, label)| format!("{count} {label}"))
            .collect();
        if !counts.is_empty() {
            marker.push_str(&format!(" ({})", counts.join(", ")));
        }
        marker
    }

    /// Drops the per-kind counts when the full marker would not fit.
    fn fitted_skip_marker(&self, hidden: &[NodeId], kind: GroupKind, ctx: Ctx, columns: usize) -> String {
        let marker = self.skip_marker(hidden, kind, ctx);
        if self.width(&marker) <= columns {
            return marker;
        }
        let short = format!("↕ {} {} ↕", hidden.len(), kind.noun(hidden.len()));
        if self.width(&short) <= columns {
            short
        } else {
            MARKER.to_owned()
        }
    }

    fn render_rows(&mut self, id: NodeId, kind: GroupKind, ctx: Ctx) -> Rendered {
        let children = self.ordered_children(id, kind);
        let inner = self.child_ctx(id, ctx);
        let shown = self.shown_rows(id, &children, kind, inner);
        let (start, end, _) = self.markers(id);
        let indent = ctx.indent + 1;
        let pad = " ".repeat(indent * INDENT);
        let row_offset = indent * INDENT;
        let right = ctx.offset + ctx.columns;
        let row_columns = right.saturating_sub(row_offset + 1).max(1);
        let marker_columns = right.saturating_sub(row_offset);
        let row_ctx = Ctx { offset: row_offset, columns: row_columns, indent, oneline: false, ..inner };
        let mut lines = vec![self.paint(&start, id, ctx)];
        let mut hidden = Vec::new();
        for (child, visible) in children.iter().zip(&shown) {
            if !*visible {
                hidden.push(*child);
                continue;
            }
            if !hidden.is_empty() {
                lines.push(format!("{pad}{}", self.fitted_skip_marker(&hidden, kind, inner, marker_columns)));
                hidden.clear();
            }
            let rendered = self.render(*child, row_ctx);
            lines.push(format!("{pad}{},", rendered.text));
        }
        if !hidden.is_empty() {
            lines.push(format!("{pad}{}", self.fitted_skip_marker(&hidden, kind, inner, marker_columns)));
        }
        let closing_indent = ctx.indent * INDENT;
        lines.push(format!("{}{}", " ".repeat(closing_indent), self.paint(&end, id, ctx)));
        Rendered { text: lines.join("\n"), end: closing_indent + self.width(&end), multiline: true, truncated: false }
    }

    /// Multi-line strings: one row per line behind a line-number gutter,
    /// continuation rows aligned on the starting column.
    fn render_lines(&mut self, id: NodeId, ctx: Ctx) -> Rendered {
        let lines = self.visible_children(id);
        let mut inner = self.child_ctx(id, ctx);
        inner.quote = None;
        let shown = self.shown_rows(id, &lines, GroupKind::Lines, inner);
        let gutter = lines.len().to_string().len();
        let text_offset = ctx.offset + gutter + 2;
        let text_columns = (ctx.offset + ctx.columns).saturating_sub(text_offset).max(1);
        let line_ctx = Ctx { oneline: true, ..inner }.at(text_offset, text_columns);
        let prefix = " ".repeat(ctx.offset);
        let mut rows: Vec<String> = Vec::new();
        let mut hidden = Vec::new();
        let mut end = ctx.offset;
        for (index, (line, visible)) in lines.iter().zip(&shown).enumerate() {
            if !*visible {
                hidden.push(*line);
                continue;
            }
            if !hidden.is_empty() {
                let marker = self.fitted_skip_marker(&hidden, GroupKind::Lines, inner, ctx.columns);
                end = ctx.offset + self.width(&marker);
                rows.push(marker);
                hidden.clear();
            }
            let number = format!("{:>gutter$}| ", index + 1);
            let rendered = self.render(*line, line_ctx);
            end = rendered.end;
            rows.push(format!("{}{}", self.paint(&number, *line, inner), rendered.text));
        }
        if !hidden.is_empty() {
            let marker = self.fitted_skip_marker(&hidden, GroupKind::Lines, inner, ctx.columns);
            end = ctx.offset + self.width(&marker);
            rows.push(marker);
        }
        let text = rows.join(&format!("\n{prefix}"));
        Rendered { text, end, multiline: rows.len() > 1, truncated: false }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::compare::Comparator;
    use crate::{Object, StringMeasure, UnicodeMeasure};

    fn rendered_pair(actual: &Value, expect: &Value, columns: usize) -> (String, String) {
        rendered_pair_with(&AssertOptions::default(), actual, expect, columns)
    }

    fn rendered_pair_with(options: &AssertOptions, actual: &Value, expect: &Value, columns: usize) -> (String, String) {
        let config = EngineConfig::default();
        let mut forest = Forest::default();
        let a = forest.add_root(actual, Side::Actual);
        let e = forest.add_root(expect, Side::Expect);
        Comparator::new(&mut forest, options).compare_roots(a, e);
        let mut renderer = Renderer::new(&mut forest, options, &config);
        let left = renderer.render(a, Ctx::new(0, columns, 0)).text;
        let right = renderer.render(e, Ctx::new(0, columns, 0)).text;
        (left, right)
    }

    #[test]
    fn long_strings_end_with_a_marker() {
        let (left, _) = rendered_pair(&Value::from("abcdefghij"), &Value::from("abcdefghij"), 6);
        assert_eq!(left, "\"abc…\"");
    }

    #[test]
    fn oneline_focus_follows_the_first_difference() {
        let actual: String = ('a'..='z').collect();
        let mut expect = actual.clone();
        expect.replace_range(20..21, "_");
        let (left, right) = rendered_pair(&Value::from(actual), &Value::from(expect), 12);
        assert_eq!(left, "\"…qrstuvwx…\"");
        assert_eq!(right, "\"…qrst_vwx…\"");
    }

    #[test]
    fn oneline_order_decides_which_neighbours_are_kept() {
        let actual: String = ('a'..='z').collect();
        let mut expect = actual.clone();
        expect.replace_range(12..13, "_");
        let cases = [
            (OnelineOrder::PickAroundStartingBefore, "\"…ijklmnop…\""),
            (OnelineOrder::PickAroundStartingAfter, "\"…jklmnopq…\""),
            (OnelineOrder::AllBeforeThenAllAfter, "\"…fghijklm…\""),
            (OnelineOrder::AllAfterThenAllBefore, "\"…mnopqrst…\""),
        ];
        for (order, shown) in cases {
            let options = AssertOptions::default().with_oneline_order(order).expect("valid options");
            let (left, _) =
                rendered_pair_with(&options, &Value::from(actual.as_str()), &Value::from(expect.as_str()), 12);
            assert_eq!(left, shown, "{order:?}");
        }
    }

    #[test]
    fn sorted_order_lists_properties_by_key() {
        let actual = Object::plain().with_property("b", 1).with_property("a", 2).with_property("c", 3);
        let expect = Object::plain().with_property("b", 1).with_property("a", 2).with_property("c", 4);
        let (natural, _) = rendered_pair(&actual.clone().into(), &expect.clone().into(), 80);
        assert_eq!(natural, "{\n  b: 1,\n  a: 2,\n  c: 3,\n}");
        let options = AssertOptions::default().with_order(Order::Sort).expect("valid options");
        let (sorted, _) = rendered_pair_with(&options, &actual.into(), &expect.into(), 80);
        assert_eq!(sorted, "{\n  a: 2,\n  b: 1,\n  c: 3,\n}");
    }

    #[test]
    fn forced_multiline_puts_each_element_on_its_own_row() {
        let actual = Value::from(Object::array([1, 2, 3].map(Value::from)));
        let expect = Value::from(Object::array([1, 2, 4].map(Value::from)));
        let (left, _) = rendered_pair(&actual, &expect, 80);
        assert_eq!(left, "[1, 2, 3]");
        let options = AssertOptions::default().with_force_multiline_diff(true).expect("valid options");
        let (left, right) = rendered_pair_with(&options, &actual, &expect, 80);
        assert_eq!(left, "[\n  1,\n  2,\n  3,\n]");
        assert_eq!(right, "[\n  1,\n  2,\n  4,\n]");
    }

    #[test]
    fn differences_past_the_per_value_budget_collapse() {
        let nested = |values: [i32; 4]| {
            Value::from(Object::array(values.map(|n| Value::from(Object::array([Value::from(n)])))))
        };
        let (left, right) = rendered_pair(&nested([1, 2, 3, 4]), &nested([9, 8, 7, 6]), 80);
        assert_eq!(left, "[\n  [1],\n  [2],\n  [3],\n  Array(1),\n]");
        assert_eq!(right, "[\n  [9],\n  [8],\n  [7],\n  Array(1),\n]");
    }

    #[test]
    fn narrow_neighbours_replace_the_marker() {
        let (left, right) = rendered_pair(&Value::from("abcd"), &Value::from("abcX"), 6);
        assert_eq!(left, "\"abcd\"");
        assert_eq!(right, "\"abcX\"");
    }

    #[test]
    fn unchanged_nested_objects_collapse_inside_a_diff() {
        let deep = Object::plain().with_property("c", Object::plain().with_property("d", 1));
        let actual = Object::plain().with_property("a", deep.clone()).with_property("x", 1);
        let expect = Object::plain().with_property("a", deep).with_property("x", 2);
        let (left, _) = rendered_pair(&actual.into(), &expect.into(), 80);
        assert_eq!(left, "{\n  a: {\n    c: Object,\n  },\n  x: 1,\n}");
    }

    #[test]
    fn hidden_rows_are_counted_in_a_skip_marker() {
        let actual = Object::array((0..10).map(|n| Value::from(Object::plain().with_property("n", n))));
        let expect = Object::array((0..10).map(|n| {
            let n = if n == 8 { 80 } else { n };
            Value::from(Object::plain().with_property("n", n))
        }));
        let (left, _) = rendered_pair(&actual.into(), &expect.into(), 80);
        assert!(left.starts_with("[\n  ↕ 6 values ↕\n  {n: 6},\n"), "{left}");
        assert!(left.ends_with("  {n: 8},\n  {n: 9},\n]"), "{left}");
    }

    #[test]
    fn multiline_strings_use_a_gutter() {
        let (left, right) = rendered_pair(&Value::from("a\nb\nc"), &Value::from("a\nx\nc"), 80);
        assert_eq!(left, "1| a\n2| b\n3| c");
        assert_eq!(right, "1| a\n2| x\n3| c");
    }

    #[test]
    fn colors_only_wrap_differing_text() {
        let options = AssertOptions::default();
        let config = EngineConfig::default().with_color(true);
        let mut forest = Forest::default();
        let a = forest.add_root(&Value::from(true), Side::Actual);
        let e = forest.add_root(&Value::from(false), Side::Expect);
        Comparator::new(&mut forest, &options).compare_roots(a, e);
        let mut renderer = Renderer::new(&mut forest, &options, &config);
        assert_eq!(renderer.render(a, Ctx::new(0, 20, 0)).text, format!("{COLOR_RED}true{COLOR_RESET}"));
        assert_eq!(renderer.render(e, Ctx::new(0, 20, 0)).text, format!("{COLOR_GREEN}false{COLOR_RESET}"));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-1.0e6f64..1.0e6).prop_map(Value::Number),
            "[a-z\"' \n]{0,16}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(|items| Object::array(items).into()),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..5).prop_map(|props| {
                    let object = Object::plain();
                    for (key, value) in props {
                        object.insert(key, value);
                    }
                    object.into()
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn oneline_rendering_respects_the_column_budget(
            actual in arb_value(),
            expect in arb_value(),
            columns in 1usize..60,
        ) {
            let options = AssertOptions::default();
            let config = EngineConfig::default();
            let mut forest = Forest::default();
            let a = forest.add_root(&actual, Side::Actual);
            let e = forest.add_root(&expect, Side::Expect);
            Comparator::new(&mut forest, &options).compare_roots(a, e);
            let mut renderer = Renderer::new(&mut forest, &options, &config);
            let ctx = Ctx::new(0, columns, 0).oneline();
            let first = renderer.render(a, ctx);
            let second = renderer.render(a, ctx);
            prop_assert!(UnicodeMeasure.width(&first.text) <= columns, "{:?} wider than {}", first.text, columns);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn multiline_rows_respect_the_column_budget(
            actual in arb_value(),
            expect in arb_value(),
            columns in 40usize..80,
        ) {
            let options = AssertOptions::default().with_force_multiline_diff(true).expect("valid options");
            let config = EngineConfig::default();
            let mut forest = Forest::default();
            let a = forest.add_root(&actual, Side::Actual);
            let e = forest.add_root(&expect, Side::Expect);
            Comparator::new(&mut forest, &options).compare_roots(a, e);
            let mut renderer = Renderer::new(&mut forest, &options, &config);
            for root in [a, e] {
                let text = renderer.render(root, Ctx::new(0, columns, 0)).text;
                for line in text.lines() {
                    prop_assert!(UnicodeMeasure.width(line) <= columns, "{:?} wider than {}", line, columns);
                }
            }
        }
    }

    #[test]
    fn multiline_string_rows_reserve_the_trailing_comma() {
        let text = |middle: &str| ["a".repeat(80), middle.repeat(80), "c".repeat(80)].join("\n");
        let actual = Object::plain().with_property("key", text("b")).with_property("z", 1);
        let expect = Object::plain().with_property("key", text("x")).with_property("z", 1);
        let (left, right) = rendered_pair(&actual.into(), &expect.into(), 30);
        for line in left.lines().chain(right.lines()) {
            assert!(UnicodeMeasure.width(line) <= 30, "{line:?} is wider than 30 columns");
        }
        assert!(left.contains("3| c"), "{left}");
    }
}

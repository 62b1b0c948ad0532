//! Lazily expanded value trees.
//!
//! Both sides of an assertion live in one [`Forest`]. Each tree is rooted
//! at a node built from the caller's value; children are produced on first
//! access from a recipe stored on the node, so untouched branches of large
//! values are never expanded.

mod builder;

use std::collections::HashMap;
use std::rc::Rc;

use crate::compare::{Comparison, ComparisonId};
use crate::{StringMeasure, Value, ValuePath, WellKnownValues};

pub(crate) use builder::StringMode;
use builder::Source;

/// Index of a node inside its [`Forest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// Which input a tree was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The value under test.
    Actual,
    /// The expected value.
    Expect,
}

impl Side {
    /// The label used as root path identifier and in rendered output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Side::Actual => "actual",
            Side::Expect => "expect",
        }
    }
}

/// Broad classification deciding how a node is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Scalars and the decomposed parts of scalars.
    Primitive,
    /// Objects, arrays, functions and the like.
    Composite,
    /// A second visit to an object already present in the tree.
    Reference,
    /// A value recognised as a global such as `Number.MAX_VALUE`.
    WellKnown,
    /// A structural group of children (properties, elements, entries, call
    /// arguments).
    Entries,
    /// A key/value pair inside a group.
    Entry,
    /// The key half of an entry when it is not itself a value.
    EntryKey,
    /// A value slot holding no runtime value (array holes, accessors).
    EntryValue,
    /// One segment of a well-known path.
    PathPart,
}

/// Identity flags computed once when a composite node is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct IdentityFlags {
    pub is_array: bool,
    pub is_typed_array: bool,
    pub is_map: bool,
    pub is_set: bool,
    pub is_function: bool,
    pub is_class: bool,
    pub is_error: bool,
    pub is_date: bool,
    pub is_url: bool,
    pub is_url_search_params: bool,
    pub is_headers: bool,
    pub is_regexp: bool,
    pub is_promise: bool,
    pub is_boxed: bool,
    pub is_matcher: bool,
    pub is_null_prototype: bool,
}

/// The kind of children a group holds; selects budgets, context windows and
/// skip-marker wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Own properties.
    Props,
    /// Array or typed-array elements.
    Indexed,
    /// Map entries.
    Map,
    /// Set members.
    Set,
    /// `URLSearchParams` entries.
    SearchParams,
    /// `Headers` entries.
    Headers,
    /// Lines of a string.
    Lines,
}

impl GroupKind {
    pub(crate) fn noun(self, count: usize) -> &'static str {
        let singular = count == 1;
        match self {
            Self::Props if singular => "prop",
            Self::Props => "props",
            Self::Indexed | Self::Set if singular => "value",
            Self::Indexed | Self::Set => "values",
            Self::Lines if singular => "line",
            Self::Lines => "lines",
            _ if singular => "entry",
            _ => "entries",
        }
    }
}

/// How a primitive-like node decomposes; nodes of equal shape compare
/// their parts when their values differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Shape {
    #[default]
    Atom,
    Number,
    Text,
    Url,
    Date,
    Header,
    HeaderItem,
    Quality,
    Line,
    WellKnown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Layout {
    /// Own text only.
    Leaf,
    /// Children left to right, truncating the tail.
    Sequence,
    /// Children around the first difference on one line.
    Around,
    /// Oneline or multiline, decided per render.
    Group(GroupKind),
}

/// Identity of a map key or set member.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKey {
    /// A primitive, canonicalised for SameValueZero.
    Primitive(String),
    /// An object, by identity.
    Object(usize),
    /// A symbol, by identity.
    Symbol(usize),
}

/// Identity of an own property key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropKey {
    /// A string key.
    Name(String),
    /// A symbol key, by identity.
    Symbol(usize),
}

/// How a node is reached from its parent; children with equal keys are
/// compared with each other.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChildKey {
    /// A tree root.
    Root,
    /// The frozen/sealed/non-extensible marker of a composite.
    Integrity,
    /// The constructor notation of a composite.
    Construct,
    /// The internal entries group of a composite.
    Internal,
    /// The indexed elements group of a composite.
    Indexed,
    /// The own properties group of a composite.
    Props,
    /// The callee name of a call-style construct.
    Name,
    /// The argument list of a call-style construct.
    Args,
    /// A call argument.
    Arg(usize),
    /// An element, line or positional part.
    Index(usize),
    /// A named part of a decomposed primitive.
    Part(&'static str),
    /// An own property entry.
    Prop(PropKey),
    /// A map entry or set member.
    Item(ItemKey),
    /// A named entry with its occurrence among equal names.
    Named(String, usize),
    /// The key half of an entry.
    Key,
    /// The value half of an entry.
    Value,
}

/// Outcome of comparing a node with its counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiffType {
    /// Nothing about the node itself differs.
    Same,
    /// The node exists on both sides but its own value differs.
    Modified,
    /// The node exists on one side only.
    Solo,
}

/// Stand-ins used when one side has no real counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholder {
    /// The other side cannot have this kind of child at all.
    Nothing,
    /// The other side has no entry under this key.
    AddedOrRemoved,
    /// Treat the whole subtree as unchanged.
    Same,
    /// Treat the whole subtree as changed.
    Modified,
}

/// One side of a comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// A real node.
    Node(NodeId),
    /// A placeholder sentinel.
    Placeholder(Placeholder),
}

impl Slot {
    /// Returns the node when the slot holds one.
    #[must_use]
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::Placeholder(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CompareMeta {
    pub(crate) compared: bool,
    pub(crate) diff_type: Option<DiffType>,
    pub(crate) other: Option<Slot>,
    pub(crate) comparison: Option<ComparisonId>,
    pub(crate) max_diff_reached: bool,
    /// The diff type applies to the whole subtree, children were not
    /// compared individually.
    pub(crate) whole: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Shown {
    Rows(Vec<bool>),
    Range { start: usize, end: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DisplayMemo {
    pub(crate) columns: usize,
    pub(crate) shown: Shown,
}

/// One value at one position in one tree.
#[derive(Debug)]
pub struct Node {
    pub(crate) side: Side,
    pub(crate) tree: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) key: ChildKey,
    pub(crate) depth: usize,
    pub(crate) path: ValuePath,
    pub(crate) category: Category,
    pub(crate) flags: IdentityFlags,
    pub(crate) value: Value,
    pub(crate) text: String,
    pub(crate) layout: Layout,
    pub(crate) shape: Shape,
    pub(crate) start_marker: String,
    pub(crate) end_marker: String,
    pub(crate) separator: &'static str,
    pub(crate) quoted: bool,
    pub(crate) quote: Option<char>,
    pub(crate) fragment: bool,
    pub(crate) is_part: bool,
    pub(crate) is_hidden: bool,
    pub(crate) source: Source,
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) meta: CompareMeta,
    pub(crate) display: Option<DisplayMemo>,
}

impl Node {
    /// The tree this node belongs to.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// The owning parent, `None` for roots.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The key under which the parent holds this node.
    #[must_use]
    pub fn key(&self) -> &ChildKey {
        &self.key
    }

    /// Visual nesting depth; structural groups keep their parent's depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// How the value was reached from the root.
    #[must_use]
    pub fn path(&self) -> &ValuePath {
        &self.path
    }

    /// The node's category.
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// Identity flags of composite nodes.
    #[must_use]
    pub fn flags(&self) -> IdentityFlags {
        self.flags
    }

    /// The underlying value for primitive-like and composite nodes.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Own text of leaf nodes.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The comparison outcome, `None` until compared.
    #[must_use]
    pub fn diff_type(&self) -> Option<DiffType> {
        self.meta.diff_type
    }

    /// The counterpart in the other tree, `None` until compared.
    #[must_use]
    pub fn other(&self) -> Option<Slot> {
        self.meta.other
    }

    /// Whether the node is compared but never rendered.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    /// Whether the node came after the diff budget ran out.
    #[must_use]
    pub fn max_diff_reached(&self) -> bool {
        self.meta.max_diff_reached
    }

    /// The ANSI color of the node's own text, when it differs.
    #[must_use]
    pub fn color(&self) -> Option<&'static str> {
        match self.meta.diff_type {
            Some(DiffType::Modified | DiffType::Solo) => Some(crate::render::side_color(self.side)),
            _ => None,
        }
    }

    /// Whether the node stands for a runtime value rather than structure or
    /// a fragment of a value.
    pub(crate) fn is_value_level(&self) -> bool {
        !self.is_part
            && matches!(
                self.category,
                Category::Primitive | Category::Composite | Category::Reference | Category::WellKnown
            )
    }
}

struct TreeState {
    seen: HashMap<usize, NodeId>,
}

/// Arena holding the actual and expect trees plus their comparisons.
///
/// ```
/// # use valdiff_core::{Forest, Object, Side, Value};
/// let mut forest = Forest::default();
/// let root = forest.add_root(&Object::plain().with_property("a", 1).into(), Side::Actual);
/// let parts = forest.children(root);
/// assert_eq!(parts.len(), 1);
/// assert_eq!(forest.node(root).path().to_string(), "actual");
/// ```
pub struct Forest {
    nodes: Vec<Node>,
    trees: Vec<TreeState>,
    pub(crate) comparisons: Vec<Comparison>,
    measure: Rc<dyn StringMeasure>,
    well_known: Rc<dyn WellKnownValues>,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new(Rc::new(crate::UnicodeMeasure), Rc::new(crate::DefaultWellKnown))
    }
}

impl Forest {
    /// Creates an empty forest using the given collaborators.
    pub fn new(measure: Rc<dyn StringMeasure>, well_known: Rc<dyn WellKnownValues>) -> Self {
        Self { nodes: Vec::new(), trees: Vec::new(), comparisons: Vec::new(), measure, well_known }
    }

    /// Builds the root node of a new tree for `value`.
    pub fn add_root(&mut self, value: &Value, side: Side) -> NodeId {
        self.add_root_at(value, side, ValuePath::root(side.label()))
    }

    pub(crate) fn add_root_at(&mut self, value: &Value, side: Side, path: ValuePath) -> NodeId {
        let tree = self.trees.len();
        self.trees.push(TreeState { seen: HashMap::new() });
        let origin = builder::Origin { tree, side, parent: None, key: ChildKey::Root, depth: 0, path };
        self.build_value(value, origin, StringMode::DETECT)
    }

    /// Returns a node.
    ///
    /// # Panics
    ///
    /// Panics when `id` does not belong to this forest.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Number of nodes built so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was built yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the children of `id`, generating them on first access.
    pub fn children(&mut self, id: NodeId) -> Vec<NodeId> {
        if let Some(children) = &self.nodes[id.0].children {
            return children.clone();
        }
        let source = std::mem::take(&mut self.nodes[id.0].source);
        let children = self.generate(id, source);
        self.nodes[id.0].children = Some(children.clone());
        children
    }

    /// Returns the child of `id` stored under `key`.
    pub fn child(&mut self, id: NodeId, key: &ChildKey) -> Option<NodeId> {
        self.children(id).into_iter().find(|child| self.nodes[child.0].key == *key)
    }

    /// Returns a comparison produced by the comparator.
    ///
    /// # Panics
    ///
    /// Panics when `id` does not belong to this forest.
    #[must_use]
    pub fn comparison(&self, id: ComparisonId) -> &Comparison {
        &self.comparisons[id.0]
    }

    pub(crate) fn measure(&self) -> &dyn StringMeasure {
        self.measure.as_ref()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

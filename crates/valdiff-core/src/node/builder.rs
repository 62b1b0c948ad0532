use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use url::{Position, Url};

use super::{
    Category, ChildKey, CompareMeta, Forest, GroupKind, IdentityFlags, ItemKey, Layout, Node, NodeId,
    PropKey, Shape, Side,
};
use crate::quote::{is_bare_key, quote_key};
use crate::value::boxed_constructor;
use crate::{
    format_date, format_number, Descriptor, FunctionKind, Integrity, Object, ObjectData, ObjectKind,
    PathSegment, PropertyKey, PropertyValue, Value, ValuePath,
};

/// Controls how string values are decomposed at a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StringMode {
    detect: bool,
    split_lines: bool,
}

impl StringMode {
    /// Sniff URLs and dates, split on line breaks.
    pub(crate) const DETECT: Self = Self { detect: true, split_lines: true };
    /// Keep the string as a single line of characters.
    pub(crate) const VERBATIM: Self = Self { detect: false, split_lines: false };
}

pub(crate) struct Origin {
    pub(crate) tree: usize,
    pub(crate) side: Side,
    pub(crate) parent: Option<NodeId>,
    pub(crate) key: ChildKey,
    pub(crate) depth: usize,
    pub(crate) path: ValuePath,
}

/// Recipe for the children of a node, consumed on first access.
#[derive(Debug, Default)]
pub(crate) enum Source {
    #[default]
    Empty,
    Number(f64),
    Lines {
        text: String,
        split: bool,
    },
    Chars(String),
    Url(String),
    Date(String),
    HeaderValue(String),
    HeaderItem(String),
    Quality(f64),
    WellKnown(ValuePath),
    Composite(Object),
    Call {
        name: String,
        args: Vec<Value>,
    },
    Args(Vec<Value>),
    Props(Object),
    Indexed(Object),
    Internal(Object),
    Entry {
        key: EntryPart,
        value: EntryPart,
    },
}

#[derive(Debug)]
pub(crate) enum EntryPart {
    Label { text: String, category: Category },
    Value { value: Value, path: ValuePath, mode: StringMode },
    Header { text: String, path: ValuePath },
}

enum Construct {
    None,
    Name(String),
    Call(String, Vec<Value>),
}

impl Node {
    fn new(origin: Origin, category: Category, layout: Layout) -> Self {
        Self {
            side: origin.side,
            tree: origin.tree,
            parent: origin.parent,
            key: origin.key,
            depth: origin.depth,
            path: origin.path,
            category,
            flags: IdentityFlags::default(),
            value: Value::Undefined,
            text: String::new(),
            layout,
            shape: Shape::Atom,
            start_marker: String::new(),
            end_marker: String::new(),
            separator: "",
            quoted: false,
            quote: None,
            fragment: false,
            is_part: false,
            is_hidden: false,
            source: Source::Empty,
            children: None,
            meta: CompareMeta::default(),
            display: None,
        }
    }

    fn leaf(origin: Origin, category: Category, text: String, value: Value) -> Self {
        let mut node = Self::new(origin, category, Layout::Leaf);
        node.text = text;
        node.value = value;
        node
    }

    fn bracketed(mut self, start: &str, end: &str, separator: &'static str) -> Self {
        start.clone_into(&mut self.start_marker);
        end.clone_into(&mut self.end_marker);
        self.separator = separator;
        self
    }
}

impl Forest {
    /// Classifies `value` and creates its node; children stay pending.
    pub(crate) fn build_value(&mut self, value: &Value, origin: Origin, mode: StringMode) -> NodeId {
        if let Some(matcher) = value.as_matcher() {
            let mut node = Node::leaf(origin, Category::Composite, matcher.to_string(), value.clone());
            node.flags.is_matcher = true;
            return self.push(node);
        }
        if let Value::Object(object) = value {
            if let Some(first) = self.trees[origin.tree].seen.get(&object.id()).copied() {
                let target = self.nodes[first.0].path.relative_to("root");
                let node = Node::leaf(origin, Category::Reference, format!("<ref #{target}>"), value.clone());
                return self.push(node);
            }
        }
        if let Some(path) = self.well_known.path_of(value) {
            let mut node = Node::new(origin, Category::WellKnown, Layout::Sequence);
            node.value = value.clone();
            node.shape = Shape::WellKnown;
            node.source = Source::WellKnown(path);
            return self.push(node);
        }
        match value {
            Value::Undefined => self.push_leaf(origin, "undefined".into(), value),
            Value::Null => self.push_leaf(origin, "null".into(), value),
            Value::Bool(v) => self.push_leaf(origin, v.to_string(), value),
            Value::Number(n) if n.is_finite() && *n != 0.0 => {
                let mut node = Node::new(origin, Category::Primitive, Layout::Sequence);
                node.value = value.clone();
                node.shape = Shape::Number;
                node.source = Source::Number(*n);
                self.push(node)
            }
            Value::Number(n) => self.push_leaf(origin, format_number(*n), value),
            Value::BigInt(n) => self.push_leaf(origin, format!("{n}n"), value),
            Value::String(text) => self.build_string(text, origin, mode),
            Value::Symbol(symbol) => self.push_leaf(origin, symbol.to_string(), value),
            Value::Object(object) => self.build_composite(object, origin),
        }
    }

    fn push_leaf(&mut self, origin: Origin, text: String, value: &Value) -> NodeId {
        self.push(Node::leaf(origin, Category::Primitive, text, value.clone()))
    }

    fn build_string(&mut self, text: &str, origin: Origin, mode: StringMode) -> NodeId {
        let mut node = Node::new(origin, Category::Primitive, Layout::Group(GroupKind::Lines));
        node.value = Value::String(text.to_owned());
        node.quoted = true;
        node.shape = Shape::Text;
        node.source = if mode.detect && looks_like_url(text) {
            node.layout = Layout::Around;
            node.shape = Shape::Url;
            Source::Url(text.to_owned())
        } else if mode.detect && looks_like_date(text) {
            node.layout = Layout::Around;
            node.shape = Shape::Date;
            Source::Date(text.to_owned())
        } else {
            if mode.split_lines {
                node.separator = "\\n";
            }
            Source::Lines { text: text.to_owned(), split: mode.split_lines }
        };
        self.push(node)
    }

    fn build_header_value(&mut self, text: String, origin: Origin) -> NodeId {
        let mut node = Node::new(origin, Category::Primitive, Layout::Around);
        node.separator = ", ";
        node.quoted = true;
        node.value = Value::String(text.clone());
        node.shape = Shape::Header;
        node.source = Source::HeaderValue(text);
        self.push(node)
    }

    fn build_composite(&mut self, object: &Object, origin: Origin) -> NodeId {
        let tree = origin.tree;
        let mut node = Node::new(origin, Category::Composite, Layout::Sequence);
        node.separator = " ";
        node.value = Value::Object(object.clone());
        node.flags = identity_flags(&object.data());
        node.source = Source::Composite(object.clone());
        let id = self.push(node);
        self.trees[tree].seen.insert(object.id(), id);
        id
    }

    fn origin(&self, parent: NodeId, key: ChildKey, path: ValuePath, wrapper: bool) -> Origin {
        let node = &self.nodes[parent.0];
        Origin {
            tree: node.tree,
            side: node.side,
            parent: Some(parent),
            key,
            depth: if wrapper { node.depth } else { node.depth + 1 },
            path,
        }
    }

    fn push_part(&mut self, parent: NodeId, key: ChildKey, text: String, fragment: bool) -> NodeId {
        let path = self.nodes[parent.0].path.clone();
        let value = Value::String(text.clone());
        let mut node = Node::leaf(self.origin(parent, key, path, false), Category::Primitive, text, value);
        node.is_part = true;
        node.fragment = fragment;
        self.push(node)
    }

    fn group_node(&mut self, parent: NodeId, key: ChildKey, layout: Layout, source: Source) -> Node {
        let path = self.nodes[parent.0].path.clone();
        let mut node = Node::new(self.origin(parent, key, path, true), Category::Entries, layout);
        node.source = source;
        node
    }

    pub(super) fn generate(&mut self, id: NodeId, source: Source) -> Vec<NodeId> {
        match source {
            Source::Empty => Vec::new(),
            Source::Number(n) => self.number_parts(id, n),
            Source::Lines { text, split } => self.lines(id, text, split),
            Source::Chars(line) => {
                let units = self.measure.tokenize(&line);
                units
                    .into_iter()
                    .enumerate()
                    .map(|(index, unit)| self.push_part(id, ChildKey::Index(index), unit, true))
                    .collect()
            }
            Source::Url(href) => self.url_parts(id, &href),
            Source::Date(text) => digit_runs(&text)
                .into_iter()
                .enumerate()
                .map(|(index, run)| self.push_part(id, ChildKey::Index(index), run, true))
                .collect(),
            Source::HeaderValue(text) => self.header_items(id, &text),
            Source::HeaderItem(item) => self.header_attributes(id, &item),
            Source::Quality(q) => {
                let name = self.push_part(id, ChildKey::Part("name"), "q".into(), true);
                let path = self.nodes[id.0].path.clone();
                let origin = self.origin(id, ChildKey::Part("value"), path, false);
                let value = self.build_value(&Value::Number(q), origin, StringMode::VERBATIM);
                vec![name, value]
            }
            Source::WellKnown(path) => {
                let segments: Vec<String> = path.segments().iter().map(ToString::to_string).collect();
                segments
                    .into_iter()
                    .enumerate()
                    .map(|(index, segment)| {
                        let text = if index == 0 { segment } else { format!(".{segment}") };
                        let own = self.nodes[id.0].path.clone();
                        let origin = self.origin(id, ChildKey::Index(index), own, false);
                        let value = Value::String(text.clone());
                        self.push(Node::leaf(origin, Category::PathPart, text, value))
                    })
                    .collect()
            }
            Source::Composite(object) => self.composite_parts(id, &object),
            Source::Call { name, args } => {
                let callee = self.push_part(id, ChildKey::Name, name, false);
                let group = self.group_node(id, ChildKey::Args, Layout::Around, Source::Args(args));
                let group = self.push(group.bracketed("(", ")", ", "));
                vec![callee, group]
            }
            Source::Args(args) => args
                .iter()
                .enumerate()
                .map(|(index, arg)| {
                    let path = self.nodes[id.0].path.clone();
                    let origin = self.origin(id, ChildKey::Arg(index), path, false);
                    self.build_value(arg, origin, StringMode::DETECT)
                })
                .collect(),
            Source::Props(object) => self.property_entries(id, &object),
            Source::Indexed(object) => self.indexed_elements(id, &object),
            Source::Internal(object) => self.internal_entries(id, &object),
            Source::Entry { key, value } => {
                let key = self.entry_part(id, ChildKey::Key, key);
                let value = self.entry_part(id, ChildKey::Value, value);
                vec![key, value]
            }
        }
    }

    fn number_parts(&mut self, id: NodeId, n: f64) -> Vec<NodeId> {
        let digits = format_number(n.abs());
        let (integer, decimal) = match digits.split_once('.') {
            Some((integer, decimal)) => (integer.to_owned(), Some(format!(".{decimal}"))),
            None => (digits, None),
        };
        let mut parts = Vec::with_capacity(3);
        if n.is_sign_negative() {
            parts.push(self.push_part(id, ChildKey::Part("sign"), "-".into(), false));
        }
        parts.push(self.push_part(id, ChildKey::Part("integer"), integer, false));
        if let Some(decimal) = decimal {
            parts.push(self.push_part(id, ChildKey::Part("decimal"), decimal, false));
        }
        parts
    }

    fn lines(&mut self, id: NodeId, text: String, split: bool) -> Vec<NodeId> {
        let lines: Vec<String> =
            if split { text.split('\n').map(str::to_owned).collect() } else { vec![text] };
        lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let path = self.nodes[id.0].path.clone();
                let mut node =
                    Node::new(self.origin(id, ChildKey::Index(index), path, false), Category::Primitive, Layout::Around);
                node.is_part = true;
                node.value = Value::String(line.clone());
                node.shape = Shape::Line;
                node.source = Source::Chars(line);
                self.push(node)
            })
            .collect()
    }

    fn url_parts(&mut self, id: NodeId, href: &str) -> Vec<NodeId> {
        let Ok(url) = Url::parse(href) else {
            return vec![self.push_part(id, ChildKey::Part("href"), href.to_owned(), true)];
        };
        let pieces = [
            ("protocol", &url[..Position::BeforeUsername]),
            ("auth", &url[Position::BeforeUsername..Position::BeforeHost]),
            ("hostname", &url[Position::BeforeHost..Position::AfterHost]),
            ("port", &url[Position::AfterHost..Position::BeforePath]),
            ("pathname", &url[Position::BeforePath..Position::AfterPath]),
            ("search", &url[Position::AfterPath..Position::AfterQuery]),
            ("hash", &url[Position::AfterQuery..]),
        ];
        pieces
            .into_iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(name, text)| self.push_part(id, ChildKey::Part(name), text.to_owned(), true))
            .collect()
    }

    fn header_items(&mut self, id: NodeId, text: &str) -> Vec<NodeId> {
        text.split(',')
            .map(str::trim)
            .enumerate()
            .map(|(index, item)| {
                let path = self.nodes[id.0].path.clone();
                let mut node =
                    Node::new(self.origin(id, ChildKey::Index(index), path, false), Category::Primitive, Layout::Sequence);
                node.is_part = true;
                node.separator = ";";
                node.value = Value::String(item.to_owned());
                node.shape = Shape::HeaderItem;
                node.source = Source::HeaderItem(item.to_owned());
                self.push(node)
            })
            .collect()
    }

    fn header_attributes(&mut self, id: NodeId, item: &str) -> Vec<NodeId> {
        item.split(';')
            .map(str::trim)
            .enumerate()
            .map(|(index, attribute)| {
                let quality = attribute
                    .split_once('=')
                    .filter(|(name, _)| name.trim() == "q")
                    .and_then(|(_, value)| value.trim().parse::<f64>().ok());
                match quality {
                    Some(q) => {
                        let path = self.nodes[id.0].path.clone();
                        let mut node = Node::new(
                            self.origin(id, ChildKey::Index(index), path, false),
                            Category::Primitive,
                            Layout::Sequence,
                        );
                        node.is_part = true;
                        node.separator = "=";
                        node.value = Value::String(attribute.to_owned());
                        node.shape = Shape::Quality;
                        node.source = Source::Quality(q);
                        self.push(node)
                    }
                    None => self.push_part(id, ChildKey::Index(index), attribute.to_owned(), true),
                }
            })
            .collect()
    }

    fn composite_parts(&mut self, id: NodeId, object: &Object) -> Vec<NodeId> {
        let data = object.data();
        let mut parts = Vec::new();
        let integrity = match data.integrity {
            Integrity::None => None,
            Integrity::NonExtensible => Some("non-extensible"),
            Integrity::Sealed => Some("sealed"),
            Integrity::Frozen => Some("frozen"),
        };
        if let Some(label) = integrity {
            parts.push(self.push_part(id, ChildKey::Integrity, label.into(), false));
        }
        match construct_of(&data) {
            Construct::None => {}
            Construct::Name(name) => parts.push(self.push_part(id, ChildKey::Construct, name, false)),
            Construct::Call(name, args) => {
                let call = self.group_node(id, ChildKey::Construct, Layout::Sequence, Source::Call { name, args });
                parts.push(self.push(call));
            }
        }
        let internal = match data.kind {
            ObjectKind::Map => Some((GroupKind::Map, "{", "}")),
            ObjectKind::Set => Some((GroupKind::Set, "[", "]")),
            ObjectKind::UrlSearchParams => Some((GroupKind::SearchParams, "{", "}")),
            ObjectKind::Headers => Some((GroupKind::Headers, "{", "}")),
            _ => None,
        };
        if let Some((kind, start, end)) = internal {
            let group =
                self.group_node(id, ChildKey::Internal, Layout::Group(kind), Source::Internal(object.clone()));
            parts.push(self.push(group.bracketed(start, end, ", ")));
        }
        if matches!(data.kind, ObjectKind::Array | ObjectKind::TypedArray(_)) {
            let group = self.group_node(
                id,
                ChildKey::Indexed,
                Layout::Group(GroupKind::Indexed),
                Source::Indexed(object.clone()),
            );
            parts.push(self.push(group.bracketed("[", "]", ", ")));
        }
        let is_error = matches!(data.kind, ObjectKind::Error);
        let listed = data.properties.iter().filter(|prop| !(is_error && is_named(&prop.key, "message")));
        let shown = listed.clone().filter(|prop| !(is_error && is_named(&prop.key, "stack"))).count();
        let plain = matches!(data.kind, ObjectKind::Plain);
        if plain || listed.count() > 0 {
            let mut group =
                self.group_node(id, ChildKey::Props, Layout::Group(GroupKind::Props), Source::Props(object.clone()))
                    .bracketed("{", "}", ", ");
            group.is_hidden = !plain && shown == 0;
            parts.push(self.push(group));
        }
        parts
    }

    fn property_entries(&mut self, id: NodeId, object: &Object) -> Vec<NodeId> {
        let data = object.data();
        let is_error = matches!(data.kind, ObjectKind::Error);
        let base = self.nodes[id.0].path.clone();
        let mut entries = Vec::with_capacity(data.properties.len());
        for prop in &data.properties {
            let (key, segment, label) = match &prop.key {
                PropertyKey::String(name) => {
                    if is_error && name == "message" {
                        continue;
                    }
                    let label = if is_bare_key(name) { name.clone() } else { quote_key(name) };
                    (PropKey::Name(name.clone()), PathSegment::property(name.clone()), label)
                }
                PropertyKey::Symbol(symbol) => {
                    let label = format!("[{symbol}]");
                    (PropKey::Symbol(symbol.id()), PathSegment::Symbol(symbol.to_string()), label)
                }
            };
            let path = base.append(segment);
            let value = match &prop.descriptor.value {
                PropertyValue::Data { value, .. } => {
                    EntryPart::Value { value: value.clone(), path: path.clone(), mode: StringMode::DETECT }
                }
                PropertyValue::Accessor { get, set } => {
                    EntryPart::Label { text: accessor_label(*get, *set).into(), category: Category::EntryValue }
                }
            };
            let label = qualify(label, &prop.descriptor, data.integrity);
            let mut entry =
                Node::new(self.origin(id, ChildKey::Prop(key), path, true), Category::Entry, Layout::Sequence);
            entry.separator = ": ";
            entry.is_hidden = is_error && is_named(&prop.key, "stack");
            entry.source =
                Source::Entry { key: EntryPart::Label { text: label, category: Category::EntryKey }, value };
            entries.push(self.push(entry));
        }
        entries
    }

    fn indexed_elements(&mut self, id: NodeId, object: &Object) -> Vec<NodeId> {
        let data = object.data();
        let base = self.nodes[id.0].path.clone();
        let mut elements = Vec::with_capacity(data.elements.len());
        for (index, element) in data.elements.iter().enumerate() {
            let origin = self.origin(id, ChildKey::Index(index), base.append(PathSegment::index(index)), false);
            let child = match element {
                Some(value) => self.build_value(value, origin, StringMode::DETECT),
                None => self.push(Node::leaf(origin, Category::EntryValue, "empty".into(), Value::from("empty"))),
            };
            elements.push(child);
        }
        elements
    }

    fn internal_entries(&mut self, id: NodeId, object: &Object) -> Vec<NodeId> {
        let data = object.data();
        let base = self.nodes[id.0].path.append(PathSegment::internal("entries"));
        let mut children = Vec::with_capacity(data.entries.len());
        match &data.kind {
            ObjectKind::Map => {
                for (index, (key, value)) in data.entries.iter().enumerate() {
                    let path = base.append(PathSegment::index(index));
                    let mut entry = Node::new(
                        self.origin(id, ChildKey::Item(item_key(key)), path.clone(), true),
                        Category::Entry,
                        Layout::Sequence,
                    );
                    entry.separator = " => ";
                    entry.source = Source::Entry {
                        key: EntryPart::Value { value: key.clone(), path: path.clone(), mode: StringMode::VERBATIM },
                        value: EntryPart::Value { value: value.clone(), path, mode: StringMode::DETECT },
                    };
                    children.push(self.push(entry));
                }
            }
            ObjectKind::Set => {
                for (index, (member, _)) in data.entries.iter().enumerate() {
                    let path = base.append(PathSegment::index(index));
                    let origin = self.origin(id, ChildKey::Item(item_key(member)), path, false);
                    children.push(self.build_value(member, origin, StringMode::DETECT));
                }
            }
            ObjectKind::UrlSearchParams | ObjectKind::Headers => {
                let headers = matches!(data.kind, ObjectKind::Headers);
                let mut occurrences: HashMap<String, usize> = HashMap::new();
                for (index, (name, value)) in data.entries.iter().enumerate() {
                    let name = name.as_str().map_or_else(|| name.notation(), str::to_owned);
                    let name = if headers { name.to_lowercase() } else { name };
                    let counter = occurrences.entry(name.clone()).or_insert(0);
                    let occurrence = *counter;
                    *counter += 1;
                    let path = base.append(PathSegment::index(index));
                    let text = value.as_str().map_or_else(|| value.notation(), str::to_owned);
                    let value = if headers {
                        header_value(&name, text, path.clone())
                    } else {
                        EntryPart::Value { value: Value::String(text), path: path.clone(), mode: StringMode::VERBATIM }
                    };
                    let mut entry = Node::new(
                        self.origin(id, ChildKey::Named(name.clone(), occurrence), path, true),
                        Category::Entry,
                        Layout::Sequence,
                    );
                    entry.separator = " => ";
                    entry.source = Source::Entry {
                        key: EntryPart::Label { text: quote_key(&name), category: Category::EntryKey },
                        value,
                    };
                    children.push(self.push(entry));
                }
            }
            _ => {}
        }
        children
    }

    fn entry_part(&mut self, entry: NodeId, key: ChildKey, part: EntryPart) -> NodeId {
        match part {
            EntryPart::Label { text, category } => {
                let path = self.nodes[entry.0].path.clone();
                let value = Value::String(text.clone());
                let origin = self.origin(entry, key, path, false);
                self.push(Node::leaf(origin, category, text, value))
            }
            EntryPart::Value { value, path, mode } => {
                let origin = self.origin(entry, key, path, false);
                self.build_value(&value, origin, mode)
            }
            EntryPart::Header { text, path } => {
                let origin = self.origin(entry, key, path, false);
                self.build_header_value(text, origin)
            }
        }
    }
}

fn is_named(key: &PropertyKey, name: &str) -> bool {
    matches!(key, PropertyKey::String(key) if key == name)
}

fn identity_flags(data: &ObjectData) -> IdentityFlags {
    let mut flags = IdentityFlags { is_null_prototype: data.prototype.is_empty(), ..IdentityFlags::default() };
    match &data.kind {
        ObjectKind::Plain => {}
        ObjectKind::Array => flags.is_array = true,
        ObjectKind::TypedArray(_) => flags.is_typed_array = true,
        ObjectKind::Map => flags.is_map = true,
        ObjectKind::Set => flags.is_set = true,
        ObjectKind::Date(_) => flags.is_date = true,
        ObjectKind::Url(_) => flags.is_url = true,
        ObjectKind::UrlSearchParams => flags.is_url_search_params = true,
        ObjectKind::Headers => flags.is_headers = true,
        ObjectKind::RegExp { .. } => flags.is_regexp = true,
        ObjectKind::Function(info) => {
            flags.is_function = true;
            flags.is_class = info.kind == FunctionKind::Class;
        }
        ObjectKind::Error => flags.is_error = true,
        ObjectKind::Promise => flags.is_promise = true,
        ObjectKind::Boxed(_) => flags.is_boxed = true,
        ObjectKind::Matcher(_) => flags.is_matcher = true,
    }
    flags
}

fn construct_of(data: &ObjectData) -> Construct {
    let nearest = data.prototype.first().cloned();
    let custom = data.has_custom_prototype();
    let named = |fallback: &str| nearest.clone().unwrap_or_else(|| fallback.to_owned());
    match &data.kind {
        ObjectKind::Plain | ObjectKind::Array => match &nearest {
            None => Construct::Name("[Object: null prototype]".into()),
            Some(name) if custom => Construct::Name(name.clone()),
            Some(_) => Construct::None,
        },
        ObjectKind::Date(millis) => Construct::Call(named("Date"), vec![Value::String(format_date(*millis))]),
        ObjectKind::Url(href) => Construct::Call(named("URL"), vec![Value::String(href.clone())]),
        ObjectKind::Error => {
            let message = data.get("message").cloned().unwrap_or_else(|| Value::from(""));
            Construct::Call(named("Error"), vec![message])
        }
        ObjectKind::Boxed(inner) => Construct::Call(named(boxed_constructor(inner)), vec![(**inner).clone()]),
        ObjectKind::RegExp { source, flags } => Construct::Name(format!("/{source}/{flags}")),
        ObjectKind::Function(info) => Construct::Name(info.signature()),
        ObjectKind::Matcher(matcher) => Construct::Name(matcher.to_string()),
        _ => Construct::Name(named("[Object: null prototype]")),
    }
}

fn qualify(label: String, descriptor: &Descriptor, integrity: Integrity) -> String {
    let mut qualifiers = Vec::new();
    if !descriptor.enumerable {
        qualifiers.push("non-enumerable");
    }
    if matches!(descriptor.value, PropertyValue::Data { writable: false, .. }) && integrity < Integrity::Frozen {
        qualifiers.push("readonly");
    }
    if !descriptor.configurable && integrity < Integrity::Sealed {
        qualifiers.push("non-configurable");
    }
    if qualifiers.is_empty() {
        label
    } else {
        format!("{} {label}", qualifiers.join(" "))
    }
}

fn accessor_label(get: bool, set: bool) -> &'static str {
    match (get, set) {
        (true, true) => "[get/set]",
        (true, false) => "[get]",
        (false, true) => "[set]",
        (false, false) => "undefined",
    }
}

fn header_value(name: &str, text: String, path: ValuePath) -> EntryPart {
    if matches!(name, "age" | "content-length") {
        if let Ok(number) = text.trim().parse::<f64>() {
            return EntryPart::Value { value: Value::Number(number), path, mode: StringMode::VERBATIM };
        }
    }
    EntryPart::Header { text, path }
}

/// Map keys and set members pair up by SameValueZero for primitives and by
/// identity otherwise.
pub(crate) fn item_key(value: &Value) -> ItemKey {
    let canonical = match value {
        Value::Object(object) => return ItemKey::Object(object.id()),
        Value::Symbol(symbol) => return ItemKey::Symbol(symbol.id()),
        Value::Undefined => "undefined".to_owned(),
        Value::Null => "null".to_owned(),
        Value::Bool(v) => format!("boolean:{v}"),
        Value::Number(n) if *n == 0.0 => "number:0".to_owned(),
        Value::Number(n) => format!("number:{}", format_number(*n)),
        Value::BigInt(n) => format!("bigint:{n}"),
        Value::String(s) => format!("string:{s}"),
    };
    ItemKey::Primitive(canonical)
}

fn looks_like_url(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| url.has_host() && url.as_str() == text)
}

fn looks_like_date(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok() || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

fn digit_runs(text: &str) -> Vec<String> {
    let mut runs: Vec<String> = Vec::new();
    let mut previous = None;
    for c in text.chars() {
        let digit = c.is_ascii_digit();
        match runs.last_mut() {
            Some(run) if previous == Some(digit) => run.push(c),
            _ => runs.push(c.to_string()),
        }
        previous = Some(digit);
    }
    runs
}

//! The dynamic value model compared by the engine.
//!
//! Values mirror the shapes a scripting runtime hands to an assertion:
//! primitives, symbols, and shared mutable objects that may form cycles.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use serde_yaml::Value as YamlValue;

use crate::quote::{is_bare_key, quote_key};
use crate::{ConvertError, Matcher};

const INLINE_MEMBERS: usize = 4;

/// A runtime value.
///
/// ```
/// # use valdiff_core::Value;
/// assert!(Value::Number(f64::NAN).same_value(&Value::Number(f64::NAN)));
/// assert!(!Value::Number(0.0).same_value(&Value::Number(-0.0)));
/// assert!(Value::Number(0.0).same_value_zero(&Value::Number(-0.0)));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Undefined,
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An IEEE-754 double.
    Number(f64),
    /// An arbitrary precision integer, bounded to `i128` here.
    BigInt(i128),
    /// A string.
    String(String),
    /// A symbol compared by identity.
    Symbol(Symbol),
    /// A shared object compared by identity.
    Object(Object),
}

impl Value {
    /// Parses a JSON document.
    ///
    /// ```
    /// # use valdiff_core::Value;
    /// let value = Value::from_json_str("{\"hello\":[1,2]}")?;
    /// assert!(value.as_object().is_some());
    /// # Ok::<(), valdiff_core::ConvertError>(())
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, ConvertError> {
        if input.trim().is_empty() {
            return Ok(Self::Undefined);
        }
        let value: JsonValue = serde_json::from_str(input)?;
        Self::from_json_value(value)
    }

    /// Parses a YAML document.
    ///
    /// ```
    /// # use valdiff_core::Value;
    /// let value = Value::from_yaml_str("---\nanswer: 42\n")?;
    /// assert!(value.as_object().is_some());
    /// # Ok::<(), valdiff_core::ConvertError>(())
    /// ```
    pub fn from_yaml_str(input: &str) -> Result<Self, ConvertError> {
        if input.trim().is_empty() {
            return Ok(Self::Undefined);
        }
        let value: YamlValue = serde_yaml::from_str(input)?;
        Self::from_yaml_value(value)
    }

    /// Converts a serde JSON value.
    pub fn from_json_value(value: JsonValue) -> Result<Self, ConvertError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(v)),
            JsonValue::Number(num) => num
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| ConvertError::NumberOutOfRange { value: num.to_string() }),
            JsonValue::String(s) => Ok(Self::String(s)),
            JsonValue::Array(values) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    items.push(Self::from_json_value(value)?);
                }
                Ok(Object::array(items).into())
            }
            JsonValue::Object(map) => {
                let object = Object::plain();
                for (key, value) in map {
                    object.insert(key, Self::from_json_value(value)?);
                }
                Ok(object.into())
            }
        }
    }

    fn from_yaml_value(value: YamlValue) -> Result<Self, ConvertError> {
        match value {
            YamlValue::Null => Ok(Self::Null),
            YamlValue::Bool(v) => Ok(Self::Bool(v)),
            YamlValue::Number(num) => num
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| ConvertError::NumberOutOfRange { value: num.to_string() }),
            YamlValue::String(s) => Ok(Self::String(s)),
            YamlValue::Sequence(seq) => {
                let mut items = Vec::with_capacity(seq.len());
                for value in seq {
                    items.push(Self::from_yaml_value(value)?);
                }
                Ok(Object::array(items).into())
            }
            YamlValue::Mapping(map) => {
                let object = Object::plain();
                for (key, value) in map {
                    let key = match key {
                        YamlValue::String(s) => s,
                        YamlValue::Number(n) => n.to_string(),
                        YamlValue::Bool(b) => b.to_string(),
                        other => {
                            return Err(ConvertError::UnsupportedYamlKey {
                                found: format!("{other:?}"),
                            });
                        }
                    };
                    object.insert(key, Self::from_yaml_value(value)?);
                }
                Ok(object.into())
            }
            YamlValue::Tagged(tagged) => {
                Err(ConvertError::UnsupportedYamlTag { tag: tagged.tag.to_string() })
            }
        }
    }

    /// Converts the value into JSON when representable.
    ///
    /// Follows `JSON.stringify` conventions: `undefined`, symbols and
    /// functions are dropped from objects and become `null` inside arrays,
    /// non-finite numbers become `null`. Returns `None` for unrepresentable
    /// roots and for cyclic graphs.
    ///
    /// ```
    /// # use valdiff_core::{Object, Value};
    /// let value: Value = Object::plain().with_property("a", 1).into();
    /// assert_eq!(value.to_json().unwrap().to_string(), "{\"a\":1.0}");
    /// ```
    #[must_use]
    pub fn to_json(&self) -> Option<JsonValue> {
        self.to_json_guarded(&mut HashSet::new())
    }

    fn to_json_guarded(&self, visiting: &mut HashSet<usize>) -> Option<JsonValue> {
        match self {
            Self::Undefined | Self::Symbol(_) => None,
            Self::Null => Some(JsonValue::Null),
            Self::Bool(v) => Some(JsonValue::Bool(*v)),
            Self::Number(n) => {
                Some(JsonNumber::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number))
            }
            Self::BigInt(_) => None,
            Self::String(s) => Some(JsonValue::String(s.clone())),
            Self::Object(object) => {
                if !visiting.insert(object.id()) {
                    return None;
                }
                let converted = object.to_json_guarded(visiting);
                visiting.remove(&object.id());
                converted
            }
        }
    }

    /// SameValue equality: `NaN` equals itself and `+0` differs from `-0`.
    #[must_use]
    pub fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                a == b && a.is_sign_negative() == b.is_sign_negative()
            }
            _ => self.same_value_zero(other),
        }
    }

    /// SameValueZero equality used for map keys and set members.
    #[must_use]
    pub fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => (a.is_nan() && b.is_nan()) || a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Returns the `typeof`-style name of the value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Object(object) if object.is_function() => "function",
            Self::Object(_) => "object",
        }
    }

    /// Returns the object when the value is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Returns the string content when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content of numbers and bigints.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::BigInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the matcher carried by a matcher object.
    #[must_use]
    pub fn as_matcher(&self) -> Option<Matcher> {
        let object = self.as_object()?;
        match &*object.kind() {
            ObjectKind::Matcher(matcher) => Some(matcher.clone()),
            _ => None,
        }
    }

    /// Like [`Value::notation`], but small plain objects and arrays are
    /// spelled out up to `depth` levels.
    pub(crate) fn inline_notation(&self, depth: usize) -> String {
        match self {
            Self::Object(object) => object.inline_notation(depth),
            other => other.notation(),
        }
    }

    /// Renders a compact single-line notation, used by matcher notations.
    ///
    /// ```
    /// # use valdiff_core::{Object, Value};
    /// assert_eq!(Value::from("a\"b").notation(), "'a\"b'");
    /// assert_eq!(Value::from(Object::array([Value::from(1)])).notation(), "Array(1)");
    /// ```
    #[must_use]
    pub fn notation(&self) -> String {
        match self {
            Self::Undefined => "undefined".into(),
            Self::Null => "null".into(),
            Self::Bool(v) => v.to_string(),
            Self::Number(n) => format_number(*n),
            Self::BigInt(n) => format!("{n}n"),
            Self::String(s) => {
                let quote = crate::quote::choose_quote(s, true);
                format!("{quote}{}{quote}", crate::quote::escape_fragment(s, Some(quote)))
            }
            Self::Symbol(symbol) => symbol.to_string(),
            Self::Object(object) => object.collapsed_notation(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Matcher> for Value {
    fn from(value: Matcher) -> Self {
        Object::new(ObjectKind::Matcher(value)).into()
    }
}

/// Formats a number the way a script runtime prints it.
///
/// ```
/// # use valdiff_core::format_number;
/// assert_eq!(format_number(1.0), "1");
/// assert_eq!(format_number(-0.0), "-0");
/// assert_eq!(format_number(0.25), "0.25");
/// assert_eq!(format_number(1e21), "1e+21");
/// assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
/// ```
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0".into() } else { "0".into() };
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    format!("{value}")
}

#[derive(Debug)]
enum SymbolOrigin {
    Local,
    Registry(String),
    WellKnown(&'static str),
}

#[derive(Debug)]
struct SymbolData {
    description: Option<String>,
    origin: SymbolOrigin,
}

/// A unique value compared by identity.
///
/// ```
/// # use valdiff_core::Symbol;
/// assert!(!Symbol::new("a").ptr_eq(&Symbol::new("a")));
/// assert!(Symbol::for_key("app").ptr_eq(&Symbol::for_key("app")));
/// assert_eq!(Symbol::well_known("iterator").to_string(), "Symbol(Symbol.iterator)");
/// ```
#[derive(Clone, Debug)]
pub struct Symbol(Rc<SymbolData>);

/// Names accepted by [`Symbol::well_known`].
pub const WELL_KNOWN_SYMBOLS: [&str; 13] = [
    "asyncIterator",
    "hasInstance",
    "isConcatSpreadable",
    "iterator",
    "match",
    "matchAll",
    "replace",
    "search",
    "species",
    "split",
    "toPrimitive",
    "toStringTag",
    "unscopables",
];

thread_local! {
    static SYMBOL_REGISTRY: RefCell<HashMap<String, Symbol>> = RefCell::new(HashMap::new());
}

impl Symbol {
    /// Creates a fresh symbol with a description.
    #[must_use]
    pub fn new<S>(description: S) -> Self
    where
        S: Into<String>,
    {
        Self(Rc::new(SymbolData { description: Some(description.into()), origin: SymbolOrigin::Local }))
    }

    /// Creates a fresh symbol without description.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Rc::new(SymbolData { description: None, origin: SymbolOrigin::Local }))
    }

    /// Returns the registry symbol for `key`, creating it on first use.
    #[must_use]
    pub fn for_key(key: &str) -> Self {
        let registry_key = format!("for:{key}");
        Self::registered(registry_key, || SymbolData {
            description: Some(key.to_owned()),
            origin: SymbolOrigin::Registry(key.to_owned()),
        })
    }

    /// Returns one of the runtime's well-known symbols.
    ///
    /// Unknown names fall back to a registry-like symbol of the same name so
    /// identity is stable either way.
    #[must_use]
    pub fn well_known(name: &str) -> Self {
        let interned = WELL_KNOWN_SYMBOLS.iter().copied().find(|known| *known == name);
        let registry_key = format!("wk:{name}");
        Self::registered(registry_key, || match interned {
            Some(known) => SymbolData {
                description: Some(format!("Symbol.{known}")),
                origin: SymbolOrigin::WellKnown(known),
            },
            None => SymbolData {
                description: Some(name.to_owned()),
                origin: SymbolOrigin::Registry(name.to_owned()),
            },
        })
    }

    fn registered(key: String, make: impl FnOnce() -> SymbolData) -> Self {
        SYMBOL_REGISTRY.with(|registry| {
            registry.borrow_mut().entry(key).or_insert_with(|| Self(Rc::new(make()))).clone()
        })
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    /// Returns the well-known name (`iterator`, …) for well-known symbols.
    #[must_use]
    pub fn well_known_name(&self) -> Option<&'static str> {
        match self.0.origin {
            SymbolOrigin::WellKnown(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the registry key for symbols created by [`Symbol::for_key`].
    #[must_use]
    pub fn registry_key(&self) -> Option<&str> {
        match &self.0.origin {
            SymbolOrigin::Registry(key) => Some(key),
            _ => None,
        }
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.origin {
            SymbolOrigin::Registry(key) => {
                write!(f, "Symbol.for({})", Value::from(key.as_str()).notation())
            }
            _ => write!(f, "Symbol({})", self.description().unwrap_or_default()),
        }
    }
}

/// How a function was declared; drives its rendered signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function name()`.
    Classic,
    /// `() =>`.
    Arrow,
    /// `async function name()`.
    Async,
    /// `function* name()`.
    Generator,
    /// `async function* name()`.
    AsyncGenerator,
    /// `class Name`.
    Class,
    /// `name()` declared with method shorthand.
    Method,
}

/// Describes a function object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionInfo {
    /// The function's name; empty for anonymous functions.
    pub name: String,
    /// The declaration form.
    pub kind: FunctionKind,
}

impl FunctionInfo {
    /// Creates a description of a function.
    #[must_use]
    pub fn new<S>(name: S, kind: FunctionKind) -> Self
    where
        S: Into<String>,
    {
        Self { name: name.into(), kind }
    }

    /// Returns the signature displayed for the function.
    ///
    /// ```
    /// # use valdiff_core::{FunctionInfo, FunctionKind};
    /// assert_eq!(FunctionInfo::new("load", FunctionKind::Async).signature(), "async function load()");
    /// assert_eq!(FunctionInfo::new("User", FunctionKind::Class).signature(), "class User");
    /// ```
    #[must_use]
    pub fn signature(&self) -> String {
        let name = &self.name;
        match self.kind {
            FunctionKind::Classic if name.is_empty() => "function ()".into(),
            FunctionKind::Classic => format!("function {name}()"),
            FunctionKind::Arrow => "() =>".into(),
            FunctionKind::Async => format!("async function {name}()"),
            FunctionKind::Generator => format!("function* {name}()"),
            FunctionKind::AsyncGenerator => format!("async function* {name}()"),
            FunctionKind::Class if name.is_empty() => "class".into(),
            FunctionKind::Class => format!("class {name}"),
            FunctionKind::Method => format!("{name}()"),
        }
    }
}

/// The internal shape of an object.
#[derive(Clone, Debug)]
pub enum ObjectKind {
    /// An ordinary object.
    Plain,
    /// An array; elements live in the indexed storage.
    Array,
    /// A typed array such as `Uint8Array`.
    TypedArray(String),
    /// A map; pairs live in the entry storage.
    Map,
    /// A set; members live in the entry storage as `(value, undefined)`.
    Set,
    /// A date holding milliseconds since the epoch.
    Date(f64),
    /// A parsed URL holding its href.
    Url(String),
    /// Query parameters; pairs live in the entry storage.
    UrlSearchParams,
    /// HTTP headers; pairs live in the entry storage.
    Headers,
    /// A regular expression literal.
    RegExp {
        /// Pattern source.
        source: String,
        /// Flags such as `gi`.
        flags: String,
    },
    /// A callable.
    Function(FunctionInfo),
    /// An error; its name comes from the prototype chain.
    Error,
    /// A pending or settled promise; its state is not observable.
    Promise,
    /// A primitive wrapped in an object, e.g. `new Number(1)`.
    Boxed(Box<Value>),
    /// A custom expectation produced by the `assert` matcher constructors.
    Matcher(Matcher),
}

impl ObjectKind {
    fn default_prototype(&self) -> Vec<String> {
        let own = match self {
            Self::Plain | Self::Matcher(_) => return vec!["Object".into()],
            Self::Array => "Array".to_owned(),
            Self::TypedArray(name) => name.clone(),
            Self::Map => "Map".into(),
            Self::Set => "Set".into(),
            Self::Date(_) => "Date".into(),
            Self::Url(_) => "URL".into(),
            Self::UrlSearchParams => "URLSearchParams".into(),
            Self::Headers => "Headers".into(),
            Self::RegExp { .. } => "RegExp".into(),
            Self::Function(_) => "Function".into(),
            Self::Error => "Error".into(),
            Self::Promise => "Promise".into(),
            Self::Boxed(inner) => boxed_constructor(inner).into(),
        };
        vec![own, "Object".into()]
    }
}

pub(crate) fn boxed_constructor(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::BigInt(_) => "BigInt",
        Value::String(_) => "String",
        Value::Symbol(_) => "Symbol",
        _ => "Object",
    }
}

/// Restrictions applied with `Object.freeze` and friends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Integrity {
    /// No restriction.
    #[default]
    None,
    /// New properties cannot be added.
    NonExtensible,
    /// Properties cannot be added or removed.
    Sealed,
    /// Properties cannot be added, removed or written.
    Frozen,
}

/// A property key.
#[derive(Clone, Debug)]
pub enum PropertyKey {
    /// A string key.
    String(String),
    /// A symbol key.
    Symbol(Symbol),
}

impl PropertyKey {
    /// Key equality: strings by content, symbols by identity.
    #[must_use]
    pub fn same_key(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

/// The content of a property.
#[derive(Clone, Debug)]
pub enum PropertyValue {
    /// A plain data property.
    Data {
        /// The stored value.
        value: Value,
        /// Whether assignment is allowed.
        writable: bool,
    },
    /// A getter and/or setter pair; accessors are never invoked.
    Accessor {
        /// Whether a getter is defined.
        get: bool,
        /// Whether a setter is defined.
        set: bool,
    },
}

/// A property descriptor.
#[derive(Clone, Debug)]
pub struct Descriptor {
    /// Data or accessor content.
    pub value: PropertyValue,
    /// Whether the property shows up in enumeration.
    pub enumerable: bool,
    /// Whether the property can be redefined or deleted.
    pub configurable: bool,
}

impl Descriptor {
    /// A writable, enumerable, configurable data property.
    #[must_use]
    pub fn data<V>(value: V) -> Self
    where
        V: Into<Value>,
    {
        Self {
            value: PropertyValue::Data { value: value.into(), writable: true },
            enumerable: true,
            configurable: true,
        }
    }

    /// An enumerable, configurable accessor property.
    #[must_use]
    pub fn accessor(get: bool, set: bool) -> Self {
        Self { value: PropertyValue::Accessor { get, set }, enumerable: true, configurable: true }
    }

    /// Marks the descriptor non-enumerable.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    /// Marks a data descriptor read-only.
    #[must_use]
    pub fn readonly(mut self) -> Self {
        if let PropertyValue::Data { writable, .. } = &mut self.value {
            *writable = false;
        }
        self
    }

    /// Marks the descriptor non-configurable.
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.configurable = false;
        self
    }
}

/// An own property.
#[derive(Clone, Debug)]
pub struct Property {
    /// The property key.
    pub key: PropertyKey,
    /// The property descriptor.
    pub descriptor: Descriptor,
}

/// The storage behind an [`Object`].
#[derive(Debug)]
pub struct ObjectData {
    pub(crate) kind: ObjectKind,
    pub(crate) prototype: Vec<String>,
    pub(crate) integrity: Integrity,
    pub(crate) elements: Vec<Option<Value>>,
    pub(crate) entries: Vec<(Value, Value)>,
    pub(crate) properties: Vec<Property>,
}

impl ObjectData {
    /// Returns the object kind.
    #[must_use]
    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    /// Returns the prototype chain as constructor names, nearest first.
    #[must_use]
    pub fn prototype(&self) -> &[String] {
        &self.prototype
    }

    /// Returns the integrity level.
    #[must_use]
    pub fn integrity(&self) -> Integrity {
        self.integrity
    }

    /// Returns indexed elements; `None` marks a hole.
    #[must_use]
    pub fn elements(&self) -> &[Option<Value>] {
        &self.elements
    }

    /// Returns internal entries (map pairs, set members, params, headers).
    #[must_use]
    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// Returns own properties in definition order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Looks up an own string-keyed data property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.iter().find_map(|prop| match (&prop.key, &prop.descriptor.value) {
            (PropertyKey::String(k), PropertyValue::Data { value, .. }) if k == key => Some(value),
            _ => None,
        })
    }

    /// Whether the nearest prototype differs from the kind's default.
    pub(crate) fn has_custom_prototype(&self) -> bool {
        self.prototype != self.kind.default_prototype()
    }
}

/// A shared, mutable object compared by identity.
///
/// Interior mutability lets callers build cyclic graphs after creation:
///
/// ```
/// # use valdiff_core::{Object, Value};
/// let node = Object::plain();
/// node.insert("self", node.clone());
/// assert!(Value::from(node.clone()).same_value(&node.into()));
/// ```
#[derive(Clone)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// Creates an empty object of the given kind with its default prototype.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        let prototype = kind.default_prototype();
        Self(Rc::new(RefCell::new(ObjectData {
            kind,
            prototype,
            integrity: Integrity::None,
            elements: Vec::new(),
            entries: Vec::new(),
            properties: Vec::new(),
        })))
    }

    /// Creates an empty ordinary object.
    #[must_use]
    pub fn plain() -> Self {
        Self::new(ObjectKind::Plain)
    }

    /// Creates an ordinary object whose prototype is `null`.
    #[must_use]
    pub fn null_prototype() -> Self {
        Self::plain().with_prototype(Vec::<String>::new())
    }

    /// Creates an instance of a user-defined class.
    #[must_use]
    pub fn instance_of<S>(class: S) -> Self
    where
        S: Into<String>,
    {
        Self::plain().with_prototype([class.into(), "Object".to_owned()])
    }

    /// Creates an array without holes.
    #[must_use]
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::array_with_holes(items.into_iter().map(Some))
    }

    /// Creates an array where `None` marks a hole.
    #[must_use]
    pub fn array_with_holes<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Option<Value>>,
    {
        let object = Self::new(ObjectKind::Array);
        object.0.borrow_mut().elements = items.into_iter().collect();
        object
    }

    /// Creates a typed array such as `Uint8Array`.
    #[must_use]
    pub fn typed_array<S, I>(name: S, items: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = f64>,
    {
        let object = Self::new(ObjectKind::TypedArray(name.into()));
        object.0.borrow_mut().elements = items.into_iter().map(|n| Some(Value::Number(n))).collect();
        object
    }

    /// Creates a map from key/value pairs.
    #[must_use]
    pub fn map<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let object = Self::new(ObjectKind::Map);
        {
            let mut data = object.0.borrow_mut();
            for (key, value) in pairs {
                match data.entries.iter_mut().find(|(k, _)| k.same_value_zero(&key)) {
                    Some(existing) => existing.1 = value,
                    None => data.entries.push((key, value)),
                }
            }
        }
        object
    }

    /// Creates a set; duplicate members are dropped.
    #[must_use]
    pub fn set<I>(members: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let object = Self::new(ObjectKind::Set);
        {
            let mut data = object.0.borrow_mut();
            for member in members {
                if !data.entries.iter().any(|(k, _)| k.same_value_zero(&member)) {
                    data.entries.push((member, Value::Undefined));
                }
            }
        }
        object
    }

    /// Creates a date from milliseconds since the epoch.
    #[must_use]
    pub fn date(millis: f64) -> Self {
        Self::new(ObjectKind::Date(millis))
    }

    /// Creates a URL object.
    #[must_use]
    pub fn url<S>(href: S) -> Self
    where
        S: Into<String>,
    {
        Self::new(ObjectKind::Url(href.into()))
    }

    /// Creates a `URLSearchParams` from name/value pairs.
    #[must_use]
    pub fn search_params<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::string_pairs(ObjectKind::UrlSearchParams, pairs)
    }

    /// Creates a `Headers` from name/value pairs.
    #[must_use]
    pub fn headers<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::string_pairs(ObjectKind::Headers, pairs)
    }

    fn string_pairs<I, K, V>(kind: ObjectKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let object = Self::new(kind);
        object.0.borrow_mut().entries = pairs
            .into_iter()
            .map(|(k, v)| (Value::String(k.into()), Value::String(v.into())))
            .collect();
        object
    }

    /// Creates a regular expression.
    #[must_use]
    pub fn regexp<S, F>(source: S, flags: F) -> Self
    where
        S: Into<String>,
        F: Into<String>,
    {
        Self::new(ObjectKind::RegExp { source: source.into(), flags: flags.into() })
    }

    /// Creates a function object.
    #[must_use]
    pub fn function(info: FunctionInfo) -> Self {
        Self::new(ObjectKind::Function(info))
    }

    /// Creates an error with a non-enumerable `message` and `stack`.
    ///
    /// `name` other than `Error` becomes the nearest prototype, as for
    /// `TypeError` and friends.
    #[must_use]
    pub fn error<N, M>(name: N, message: M) -> Self
    where
        N: Into<String>,
        M: Into<String>,
    {
        let name = name.into();
        let message = message.into();
        let mut prototype = vec!["Error".to_owned(), "Object".to_owned()];
        if name != "Error" {
            prototype.insert(0, name.clone());
        }
        let stack = format!("{name}: {message}\n    at <anonymous>");
        let object = Self::new(ObjectKind::Error).with_prototype(prototype);
        object.define_property("message", Descriptor::data(message).hidden());
        object.define_property("stack", Descriptor::data(stack).hidden());
        object
    }

    /// Creates a promise.
    #[must_use]
    pub fn promise() -> Self {
        Self::new(ObjectKind::Promise)
    }

    /// Wraps a primitive, as `new Number(1)` does.
    #[must_use]
    pub fn boxed<V>(value: V) -> Self
    where
        V: Into<Value>,
    {
        Self::new(ObjectKind::Boxed(Box::new(value.into())))
    }

    /// Replaces the prototype chain; an empty chain means a `null` prototype.
    #[must_use]
    pub fn with_prototype<I, S>(self, chain: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.borrow_mut().prototype = chain.into_iter().map(Into::into).collect();
        self
    }

    /// Adds or replaces an enumerable data property, returning the object.
    #[must_use]
    pub fn with_property<K, V>(self, key: K, value: V) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        self.insert(key, value);
        self
    }

    /// Adds or replaces an enumerable data property in place.
    pub fn insert<K, V>(&self, key: K, value: V)
    where
        K: Into<PropertyKey>,
        V: Into<Value>,
    {
        self.define_property(key, Descriptor::data(value));
    }

    /// Defines a property with an explicit descriptor.
    pub fn define_property<K>(&self, key: K, descriptor: Descriptor)
    where
        K: Into<PropertyKey>,
    {
        let key = key.into();
        let mut data = self.0.borrow_mut();
        match data.properties.iter_mut().find(|prop| prop.key.same_key(&key)) {
            Some(existing) => existing.descriptor = descriptor,
            None => data.properties.push(Property { key, descriptor }),
        }
    }

    /// Appends an element to the indexed storage.
    pub fn push<V>(&self, value: V)
    where
        V: Into<Value>,
    {
        self.0.borrow_mut().elements.push(Some(value.into()));
    }

    /// Appends an entry to the internal storage, for maps built in place.
    pub fn push_entry<K, V>(&self, key: K, value: V)
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        self.0.borrow_mut().entries.push((key.into(), value.into()));
    }

    /// Applies `Object.freeze`.
    #[must_use]
    pub fn freeze(self) -> Self {
        self.restrict(Integrity::Frozen)
    }

    /// Applies `Object.seal`.
    #[must_use]
    pub fn seal(self) -> Self {
        self.restrict(Integrity::Sealed)
    }

    /// Applies `Object.preventExtensions`.
    #[must_use]
    pub fn prevent_extensions(self) -> Self {
        self.restrict(Integrity::NonExtensible)
    }

    fn restrict(self, level: Integrity) -> Self {
        {
            let mut data = self.0.borrow_mut();
            data.integrity = data.integrity.max(level);
            if level >= Integrity::Sealed {
                for prop in &mut data.properties {
                    prop.descriptor.configurable = false;
                    if level == Integrity::Frozen {
                        if let PropertyValue::Data { writable, .. } = &mut prop.descriptor.value {
                            *writable = false;
                        }
                    }
                }
            }
        }
        self
    }

    /// Borrows the object's storage.
    #[must_use]
    pub fn data(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    /// Borrows the object's kind.
    #[must_use]
    pub fn kind(&self) -> Ref<'_, ObjectKind> {
        Ref::map(self.0.borrow(), |data| &data.kind)
    }

    /// Whether the object is callable.
    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(*self.kind(), ObjectKind::Function(_))
    }

    /// Identity comparison.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// Literal form of small plain objects and arrays, such as `{a: 1}`.
    /// Anything larger, or deeper than `depth`, uses the collapsed notation.
    pub(crate) fn inline_notation(&self, depth: usize) -> String {
        if depth == 0 {
            return self.collapsed_notation();
        }
        let data = self.data();
        match &data.kind {
            ObjectKind::Array if data.elements.len() <= INLINE_MEMBERS => {
                let items: Vec<String> = data
                    .elements
                    .iter()
                    .map(|item| item.as_ref().map_or_else(|| "empty".to_owned(), |v| v.inline_notation(depth - 1)))
                    .collect();
                format!("[{}]", items.join(", "))
            }
            ObjectKind::Plain if data.prototype.first().is_some_and(|name| name == "Object") => {
                let mut fields = Vec::new();
                for prop in data.properties.iter().filter(|prop| prop.descriptor.enumerable) {
                    let (PropertyKey::String(key), PropertyValue::Data { value, .. }) =
                        (&prop.key, &prop.descriptor.value)
                    else {
                        return self.collapsed_notation();
                    };
                    let key = if is_bare_key(key) { key.clone() } else { quote_key(key) };
                    fields.push(format!("{key}: {}", value.inline_notation(depth - 1)));
                }
                if fields.len() > INLINE_MEMBERS {
                    return self.collapsed_notation();
                }
                if fields.is_empty() {
                    "{}".to_owned()
                } else {
                    format!("{{{}}}", fields.join(", "))
                }
            }
            _ => self.collapsed_notation(),
        }
    }

    /// The short form used once a value is too deep to expand.
    pub(crate) fn collapsed_notation(&self) -> String {
        let data = self.data();
        match &data.kind {
            ObjectKind::Array => format!("Array({})", data.elements.len()),
            ObjectKind::TypedArray(name) => format!("{name}({})", data.elements.len()),
            ObjectKind::Map => format!("Map({})", data.entries.len()),
            ObjectKind::Set => format!("Set({})", data.entries.len()),
            ObjectKind::Matcher(matcher) => matcher.to_string(),
            ObjectKind::Function(info) => info.signature(),
            _ => match data.prototype.first() {
                Some(name) => name.clone(),
                None => "[Object: null prototype]".into(),
            },
        }
    }

    fn to_json_guarded(&self, visiting: &mut HashSet<usize>) -> Option<JsonValue> {
        let data = self.data();
        match &data.kind {
            ObjectKind::Array | ObjectKind::TypedArray(_) => {
                let items = data
                    .elements
                    .iter()
                    .map(|item| match item {
                        Some(Value::Object(o)) if visiting.contains(&o.id()) => None,
                        Some(value) if !matches!(value, Value::Object(o) if o.is_function()) => {
                            value.to_json_guarded(visiting).or(Some(JsonValue::Null))
                        }
                        _ => Some(JsonValue::Null),
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(JsonValue::Array(items))
            }
            ObjectKind::Date(ms) => Some(JsonValue::String(format_date(*ms))),
            ObjectKind::Url(href) => Some(JsonValue::String(href.clone())),
            ObjectKind::Boxed(inner) => inner.to_json_guarded(visiting),
            ObjectKind::Function(_) => None,
            _ => {
                let mut map = JsonMap::new();
                for prop in &data.properties {
                    let (PropertyKey::String(key), PropertyValue::Data { value, .. }) =
                        (&prop.key, &prop.descriptor.value)
                    else {
                        continue;
                    };
                    if !prop.descriptor.enumerable {
                        continue;
                    }
                    if let Value::Object(object) = value {
                        if visiting.contains(&object.id()) {
                            return None;
                        }
                    }
                    if let Some(json) = value.to_json_guarded(visiting) {
                        map.insert(key.clone(), json);
                    }
                }
                Some(JsonValue::Object(map))
            }
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => write!(f, "Object({:?} #{:x})", data.kind, self.id()),
            Err(_) => write!(f, "Object(<borrowed> #{:x})", self.id()),
        }
    }
}

/// Formats epoch milliseconds as an ISO-8601 timestamp.
///
/// ```
/// # use valdiff_core::format_date;
/// assert_eq!(format_date(0.0), "1970-01-01T00:00:00.000Z");
/// assert_eq!(format_date(f64::NAN), "Invalid Date");
/// ```
#[must_use]
pub fn format_date(millis: f64) -> String {
    if !millis.is_finite() {
        return "Invalid Date".into();
    }
    match DateTime::from_timestamp_millis(millis as i64) {
        Some(date) => date.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "Invalid Date".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_numbers_and_nesting_convert() {
        let value = Value::from_json_str("{\"a\":[1,null,\"x\"]}").unwrap();
        let object = value.as_object().unwrap();
        let data = object.data();
        let Some(Value::Object(list)) = data.get("a") else {
            panic!("expected array under a");
        };
        assert_eq!(list.data().elements().len(), 3);
        assert!(matches!(*list.kind(), ObjectKind::Array));
    }

    #[test]
    fn empty_input_is_undefined() {
        assert!(matches!(Value::from_json_str("  ").unwrap(), Value::Undefined));
    }

    #[test]
    fn yaml_scalar_keys_become_strings() {
        let value = Value::from_yaml_str("1: one\ntrue: yes\n").unwrap();
        let object = value.as_object().unwrap();
        assert!(object.data().get("1").is_some());
        assert!(object.data().get("true").is_some());
    }

    #[test]
    fn cyclic_graphs_do_not_serialize() {
        let object = Object::plain();
        object.insert("self", object.clone());
        assert!(Value::from(object).to_json().is_none());
    }

    #[test]
    fn shared_but_acyclic_graphs_serialize() {
        let shared = Object::plain().with_property("n", 1);
        let root = Object::plain().with_property("a", shared.clone()).with_property("b", shared);
        let json = Value::from(root).to_json().unwrap();
        assert_eq!(json["a"], json["b"]);
    }

    #[test]
    fn freeze_marks_properties_readonly_and_locked() {
        let object = Object::plain().with_property("a", 1).freeze();
        let data = object.data();
        let descriptor = &data.properties()[0].descriptor;
        assert!(!descriptor.configurable);
        assert!(matches!(descriptor.value, PropertyValue::Data { writable: false, .. }));
        assert_eq!(data.integrity(), Integrity::Frozen);
    }

    #[test]
    fn sets_drop_duplicates_by_same_value_zero() {
        let set = Object::set([Value::from(0.0), Value::from(-0.0), Value::from(f64::NAN), Value::from(f64::NAN)]);
        assert_eq!(set.data().entries().len(), 2);
    }

    #[test]
    fn errors_keep_message_out_of_enumeration() {
        let error = Object::error("TypeError", "boom");
        let data = error.data();
        assert_eq!(data.prototype()[0], "TypeError");
        assert!(data.properties().iter().all(|p| !p.descriptor.enumerable));
        assert_eq!(data.get("message").and_then(Value::as_str), Some("boom"));
    }

    #[test]
    fn registry_symbols_render_with_their_key() {
        assert_eq!(Symbol::for_key("app").to_string(), "Symbol.for(\"app\")");
        assert_eq!(Symbol::anonymous().to_string(), "Symbol()");
    }
}

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;

use crate::ast::Expr;

/// Object storage: insertion-ordered, unique keys.
pub type Map = IndexMap<String, Value>;

/// Key under which an object keeps its `...` placeholder.
pub const PLACEHOLDER_KEY: &str = "...";

/// A node of an Eson value tree.
///
/// The JSON variants mirror `serde_json` with a split between integers and
/// floats. Three variants extend JSON:
///
/// - [`Value::Interpolated`] only appears in parsed documents; resolution
///   replaces it with a [`Value::String`].
/// - [`Value::Ellipsis`] is the `...` placeholder. Inside objects it is stored
///   under [`PLACEHOLDER_KEY`].
/// - [`Value::Date`] is the opaque date produced by the `date()` built-in.
///
/// # Examples
///
/// ```
/// use eson::{Map, Value};
///
/// let mut obj = Map::new();
/// obj.insert("name".to_string(), Value::String("eson".to_string()));
/// obj.insert("stars".to_string(), Value::Integer(42));
/// let object = Value::Object(obj);
///
/// assert_eq!(object.get("stars"), Some(&Value::Integer(42)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys, in source order
    Object(Map),

    /// `f`-string awaiting resolution
    Interpolated(Vec<Segment>),

    /// `...` placeholder
    Ellipsis,

    /// Date value returned by `date()`
    Date(DateTime<FixedOffset>),
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text, copied verbatim into the result
    Text(String),

    /// Expression evaluated and stringified at resolution time
    Expr(Expr),
}

impl Value {
    /// Human-readable type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Interpolated(_) => "interpolated string",
            Value::Ellipsis => "placeholder",
            Value::Date(_) => "date",
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Ellipsis)
    }

    /// True when no interpolation or placeholder remains anywhere in the tree.
    pub fn is_plain(&self) -> bool {
        match self {
            Value::Interpolated(_) | Value::Ellipsis => false,
            Value::Array(items) => items.iter().all(Value::is_plain),
            Value::Object(map) => map.values().all(Value::is_plain),
            _ => true,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Object member lookup; `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

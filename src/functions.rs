use std::{collections::HashMap, fmt, fmt::Write, sync::Arc};

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate,
    format::{Item, StrftimeItems},
};
use thiserror::Error;

use crate::value::Value;

/// Signature of a callable function.
///
/// Receives the evaluated arguments; for a pipe `x | f(a)` the piped value
/// comes first, so `f` sees `[x, a]`.
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync>;

/// Failure reported by a function implementation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct FunctionError {
    pub message: String,
}

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        FunctionError {
            message: message.into(),
        }
    }

    /// Wrong number of arguments.
    pub fn arity(expected: &str, got: usize) -> Self {
        FunctionError::new(format!("expected {} argument(s), got {}", expected, got))
    }

    /// Argument of the wrong type.
    pub fn argument(position: usize, expected: &str, got: &Value) -> Self {
        FunctionError::new(format!(
            "argument {} must be {}, got {}",
            position + 1,
            expected,
            got.type_name()
        ))
    }
}

/// Named functions available to interpolation expressions.
///
/// The registry is filled before evaluation starts and only read afterwards.
///
/// # Examples
///
/// ```
/// use eson::{FunctionError, FunctionRegistry, Value};
///
/// let registry = FunctionRegistry::new().with("add", |args: &[Value]| {
///     match args {
///         [Value::Integer(a), Value::Integer(b)] => Ok(Value::Integer(a + b)),
///         _ => Err(FunctionError::new("add expects two integers")),
///     }
/// });
///
/// assert!(registry.contains("add"));
/// assert!(!registry.contains("date"));
/// ```
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Function>,
}

impl FunctionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-ins `date` and `format`.
    pub fn with_builtins() -> Self {
        Self::new().with("date", builtin_date).with("format", builtin_format)
    }

    /// Register `function` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Builder form of [`FunctionRegistry::register`].
    pub fn with<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.register(name, function);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

// ========================================
// Built-ins
// ========================================

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date);
    }
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

/// `date()` - current local date and time
/// `date(text)` - parsed date
fn builtin_date(args: &[Value]) -> Result<Value, FunctionError> {
    match args {
        [] => Ok(Value::Date(Local::now().fixed_offset())),
        [Value::Date(date)] => Ok(Value::Date(*date)),
        [Value::String(text)] => parse_date(text)
            .map(Value::Date)
            .ok_or_else(|| FunctionError::new(format!("cannot parse '{}' as a date", text))),
        [other] => Err(FunctionError::argument(0, "a string", other)),
        _ => Err(FunctionError::arity("0 or 1", args.len())),
    }
}

/// `format(date, pattern)` - strftime-style formatting
fn builtin_format(args: &[Value]) -> Result<Value, FunctionError> {
    let [date, pattern] = args else {
        return Err(FunctionError::arity("2", args.len()));
    };

    let date = match date {
        Value::Date(date) => *date,
        Value::String(text) => parse_date(text)
            .ok_or_else(|| FunctionError::new(format!("cannot parse '{}' as a date", text)))?,
        other => return Err(FunctionError::argument(0, "a date", other)),
    };
    let Value::String(pattern) = pattern else {
        return Err(FunctionError::argument(1, "a string", pattern));
    };

    let items: Vec<Item> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FunctionError::new(format!("invalid format pattern '{}'", pattern)));
    }

    let mut formatted = String::new();
    write!(formatted, "{}", date.format_with_items(items.iter()))
        .map_err(|_| FunctionError::new(format!("cannot format date with '{}'", pattern)))?;
    Ok(Value::String(formatted))
}

//! JSON output for resolved Eson values.
//!
//! Objects keep their source order, so a plain document printed here and
//! parsed again yields the same value.
//!
//! - **Compact output** via [`to_json()`]
//! - **Pretty output** via [`to_json_pretty()`], 2-space indentation
//! - **Type preservation**: floats always carry a fraction or exponent so
//!   they parse back as floats
//!
//! Values with no JSON form are printed as `null`: non-finite floats, and
//! unresolved interpolations or placeholders (resolve the document first).
//! Dates are printed as RFC 3339 strings.
//!
//! # Examples
//!
//! ```
//! use eson::Value;
//! use eson::output::{to_json, to_json_pretty};
//!
//! let doc = eson::parse("{ b: 1, a: [2.0, \"x\"] }").unwrap();
//!
//! assert_eq!(to_json(doc.root()), r#"{"b":1,"a":[2.0,"x"]}"#);
//! assert_eq!(to_json_pretty(&Value::Integer(42)), "42");
//! ```

use std::fmt::Write;

use crate::value::{Map, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.print_value(&mut out, value, 0);
        out
    }

    fn print_value(&self, out: &mut String, value: &Value, indent: usize) {
        match value {
            Value::Null | Value::Interpolated(_) | Value::Ellipsis => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Float(n) => out.push_str(&format_json_float(*n)),
            Value::String(s) => write_string(out, s),
            Value::Date(date) => write_string(out, &date.to_rfc3339()),
            Value::Array(arr) => self.print_array(out, arr, indent),
            Value::Object(obj) => self.print_object(out, obj, indent),
        }
    }

    fn print_array(&self, out: &mut String, arr: &[Value], indent: usize) {
        if arr.is_empty() {
            out.push_str("[]");
            return;
        }

        out.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(out, indent + 1);
            self.print_value(out, item, indent + 1);
        }
        self.newline(out, indent);
        out.push(']');
    }

    fn print_object(&self, out: &mut String, obj: &Map, indent: usize) {
        if obj.is_empty() {
            out.push_str("{}");
            return;
        }

        out.push('{');
        for (i, (key, value)) in obj.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(out, indent + 1);
            write_string(out, key);
            out.push_str(if self.pretty { ": " } else { ":" });
            self.print_value(out, value, indent + 1);
        }
        self.newline(out, indent);
        out.push('}');
    }

    fn newline(&self, out: &mut String, level: usize) {
        if self.pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(level));
        }
    }
}

fn format_json_float(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    let mut s = n.to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                // Unicode escape for control chars
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Compact JSON, no whitespace.
///
/// # Examples
///
/// ```
/// use eson::{Map, Value};
/// use eson::output::to_json;
///
/// let mut obj = Map::new();
/// obj.insert("name".to_string(), Value::from("Alice"));
/// obj.insert("age".to_string(), Value::Integer(30));
///
/// assert_eq!(to_json(&Value::Object(obj)), r#"{"name":"Alice","age":30}"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Pretty-printed JSON, one member or element per line.
///
/// # Examples
///
/// ```
/// use eson::Value;
/// use eson::output::to_json_pretty;
///
/// let value = Value::Array(vec![Value::Integer(1), Value::Null]);
/// assert_eq!(to_json_pretty(&value), "[\n  1,\n  null\n]");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floats_keep_fraction() {
        assert_eq!(to_json(&Value::Float(3.0)), "3.0");
        assert_eq!(to_json(&Value::Float(-0.25)), "-0.25");
        assert_eq!(to_json(&Value::Float(f64::INFINITY)), "null");
    }

    #[test]
    fn test_escapes_control_chars() {
        assert_eq!(to_json(&Value::from("a\"b\u{1}")), "\"a\\\"b\\u0001\"");
    }
}

// tests/json_compat_tests.rs
//
// Every JSON document is an Eson document with the same meaning, and plain
// Eson documents print back as JSON.

use eson::{Context, FunctionRegistry, Value, eson_to_json, json_to_eson, to_json, to_json_pretty};

const JSON_SAMPLES: &[&str] = &[
    "null",
    "true",
    "0",
    "-17",
    "3.25",
    "1E2",
    "2.5e-7",
    r#""""#,
    r#""tab\tquote\"slash\/back\\""#,
    r#""é中😀""#,
    "[]",
    "{}",
    "[1, [2, [3, []]], {}]",
    r#"{"a": {"b": {"c": [true, false, null]}}}"#,
    r#"{"name": "eson", "version": "0.1.0", "keywords": ["json", "config"], "stars": 12.5}"#,
    "  \n\t[ 1 ,\r\n 2 ]  \n",
];

fn eson_as_json(source: &str) -> serde_json::Value {
    let doc = eson::parse(source).unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", source, e));
    eson_to_json(doc.into_root())
}

fn resolve(source: &str) -> Value {
    eson::parse(source)
        .unwrap()
        .resolve(&Context::new(), &FunctionRegistry::with_builtins())
        .unwrap()
}

// ============================================================================
// JSON is Eson
// ============================================================================

#[test]
fn test_json_documents_parse_identically() {
    for sample in JSON_SAMPLES {
        let expected: serde_json::Value = serde_json::from_str(sample).unwrap();
        assert_eq!(eson_as_json(sample), expected, "Mismatch for {}", sample);
    }
}

#[test]
fn test_json_documents_are_plain() {
    for sample in JSON_SAMPLES {
        let doc = eson::parse(sample).unwrap();
        assert!(doc.is_plain(), "Expected plain document for {}", sample);
        assert_eq!(doc.annotations().count(), 0);
    }
}

#[test]
fn test_integers_and_floats_stay_distinct() {
    let value = eson::parse("[1, 1.0, 1e0]").unwrap().into_root();
    assert_eq!(
        value,
        Value::Array(vec![Value::Integer(1), Value::Float(1.0), Value::Float(1.0)])
    );
}

#[test]
fn test_serde_conversion_preserves_values() {
    let json = serde_json::json!({"a": [1, 2.5, "x", null, true], "b": {"c": -3}});
    let value = json_to_eson(json.clone());
    assert_eq!(value.get("b").and_then(|b| b.get("c")), Some(&Value::Integer(-3)));
    assert_eq!(eson_to_json(value), json);
}

// ============================================================================
// Eson features are transparent
// ============================================================================

#[test]
fn test_comments_do_not_change_meaning() {
    let commented = r#"
        // leading
        {
            "a": 1, // after a value
            // own line
            "b": "not // a comment"
        }
        // trailing
    "#;
    assert_eq!(
        eson_as_json(commented),
        serde_json::json!({"a": 1, "b": "not // a comment"})
    );
}

#[test]
fn test_annotations_do_not_change_value() {
    let annotated = r#"@schema("v1") {"port": @min(1) 8080, @internal "debug": false}"#;
    assert_eq!(
        eson_as_json(annotated),
        serde_json::json!({"port": 8080, "debug": false})
    );
}

#[test]
fn test_relaxed_syntax_matches_strict_json() {
    let relaxed = "{\n  name: \"eson\"\n  tags: [\n    \"a\"\n    \"b\",\n  ],\n}";
    let strict = r#"{"name": "eson", "tags": ["a", "b"]}"#;
    assert_eq!(eson_as_json(relaxed), eson_as_json(strict));
}

#[test]
fn test_f_string_without_spans_is_plain_string() {
    let doc = eson::parse(r#"{"a": f"no spans here"}"#).unwrap();
    assert!(doc.is_plain());
    assert_eq!(doc.root().get("a"), Some(&Value::from("no spans here")));
}

#[test]
fn test_interpolated_document_is_not_plain() {
    assert!(!eson::parse(r#"f"${ 1 }""#).unwrap().is_plain());
    assert!(!eson::parse("[...]").unwrap().is_plain());
}

// ============================================================================
// JSON output
// ============================================================================

#[test]
fn test_output_round_trips_through_serde() {
    for sample in JSON_SAMPLES {
        let value = resolve(sample);
        let printed: serde_json::Value = serde_json::from_str(&to_json(&value)).unwrap();
        let expected: serde_json::Value = serde_json::from_str(sample).unwrap();
        assert_eq!(printed, expected, "Round trip failed for {}", sample);
    }
}

#[test]
fn test_output_reparses_as_same_eson_value() {
    let source = r#"{"z": [1, 2.0, "q\"uote"], "a": {"nested": null}, "date": f"${ date("2024-01-02") }"}"#;
    let value = resolve(source);
    assert_eq!(eson::parse(&to_json(&value)).unwrap().into_root(), value);
    assert_eq!(eson::parse(&to_json_pretty(&value)).unwrap().into_root(), value);
}

#[test]
fn test_output_keeps_source_order() {
    let value = resolve("{zeta: 1, alpha: 2, mid: f\"${ 3 }\"}");
    assert_eq!(to_json(&value), r#"{"zeta":1,"alpha":2,"mid":"3"}"#);
}

#[test]
fn test_pretty_output() {
    let value = resolve(r#"{"a": [1, {}], "b": "x"}"#);
    assert_eq!(
        to_json_pretty(&value),
        "{\n  \"a\": [\n    1,\n    {}\n  ],\n  \"b\": \"x\"\n}"
    );
}

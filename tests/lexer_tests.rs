// tests/lexer_tests.rs

use eson::ast::{Position, StringPart, TokenKind};
use eson::lexer::{LexErrorKind, Lexer, dedent, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn expr_kinds(input: &str) -> Vec<TokenKind> {
    Lexer::expression(input)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn first(input: &str) -> TokenKind {
    kinds(input).remove(0)
}

fn lex_error(input: &str) -> LexErrorKind {
    tokenize(input).unwrap_err().reason
}

// ============================================================================
// Punctuation
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("{", TokenKind::LBrace),
        ("}", TokenKind::RBrace),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        (":", TokenKind::Colon),
        (",", TokenKind::Comma),
        ("...", TokenKind::Ellipsis),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert!(lexer.next_token().unwrap().is_eof());
    }
}

#[test]
fn test_expression_operators() {
    let test_cases = vec![
        ("$", TokenKind::Dollar),
        (".", TokenKind::Dot),
        ("|", TokenKind::Pipe),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("*", TokenKind::Star),
        ("/", TokenKind::Slash),
        ("%", TokenKind::Percent),
        ("!", TokenKind::Bang),
        ("<", TokenKind::Lt),
        (">", TokenKind::Gt),
        ("==", TokenKind::EqEq),
        ("!=", TokenKind::NotEq),
        ("<=", TokenKind::LtEq),
        (">=", TokenKind::GtEq),
        ("&&", TokenKind::AndAnd),
        ("||", TokenKind::OrOr),
    ];

    for (input, expected) in test_cases {
        assert_eq!(expr_kinds(input), vec![expected, TokenKind::Eof], "Failed for input: {}", input);
    }
}

#[test]
fn test_lone_equals_is_rejected() {
    assert_eq!(lex_error("="), LexErrorKind::UnexpectedChar('='));
    assert_eq!(lex_error("&"), LexErrorKind::UnexpectedChar('&'));
    assert_eq!(lex_error("#"), LexErrorKind::UnexpectedChar('#'));
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_keywords() {
    assert_eq!(first("true"), TokenKind::Boolean(true));
    assert_eq!(first("false"), TokenKind::Boolean(false));
    assert_eq!(first("null"), TokenKind::Null);
    assert_eq!(first("nullable"), TokenKind::Identifier("nullable".into()));
}

#[test]
fn test_non_finite_numbers() {
    assert_eq!(first("Infinity"), TokenKind::Float(f64::INFINITY));
    assert_eq!(first("-Infinity"), TokenKind::Float(f64::NEG_INFINITY));
    assert!(matches!(first("NaN"), TokenKind::Float(n) if n.is_nan()));
    assert_eq!(first("Infinite"), TokenKind::Identifier("Infinite".into()));
    assert_eq!(
        kinds("-Infinitys"),
        vec![
            TokenKind::Minus,
            TokenKind::Identifier("Infinitys".into()),
            TokenKind::Eof
        ]
    );
    // In expressions the sign is an operator
    assert_eq!(
        expr_kinds("-Infinity"),
        vec![TokenKind::Minus, TokenKind::Float(f64::INFINITY), TokenKind::Eof]
    );
}

#[test]
fn test_numbers() {
    let test_cases = vec![
        ("0", TokenKind::Integer(0)),
        ("42", TokenKind::Integer(42)),
        ("-7", TokenKind::Integer(-7)),
        ("3.25", TokenKind::Float(3.25)),
        ("-0.5", TokenKind::Float(-0.5)),
        ("1e3", TokenKind::Float(1000.0)),
        ("2.5E-1", TokenKind::Float(0.25)),
        ("0xff", TokenKind::Integer(255)),
        ("0o17", TokenKind::Integer(15)),
        ("0b1010", TokenKind::Integer(10)),
        ("-0x10", TokenKind::Integer(-16)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(first(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_integer_overflow_becomes_float() {
    assert_eq!(first("9223372036854775808"), TokenKind::Float(9223372036854775808.0));
}

#[test]
fn test_invalid_numbers() {
    for input in ["01", "1e", "12abc", "0xZZ", "1.5e+"] {
        assert!(
            matches!(lex_error(input), LexErrorKind::InvalidNumber(_)),
            "Expected invalid number for {}",
            input
        );
    }
}

#[test]
fn test_minus_is_operator_in_expressions() {
    assert_eq!(
        expr_kinds("a-1"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::Minus,
            TokenKind::Integer(1),
            TokenKind::Eof
        ]
    );
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes() {
    assert_eq!(
        first(r#""a\"b\\c\/d\n\t\r""#),
        TokenKind::String("a\"b\\c/d\n\t\r".into())
    );
    assert_eq!(first(r#""\b\f""#), TokenKind::String("\u{08}\u{0C}".into()));
    assert_eq!(first(r#""é""#), TokenKind::String("é".into()));
    assert_eq!(first(r#""😀""#), TokenKind::String("😀".into()));
    assert_eq!(first(r#""\u{1F600}""#), TokenKind::String("😀".into()));
}

#[test]
fn test_invalid_escapes() {
    assert_eq!(lex_error(r#""\q""#), LexErrorKind::InvalidEscape("\\q".into()));
    // `\$` is only meaningful in f-strings
    assert_eq!(lex_error(r#""\$""#), LexErrorKind::InvalidEscape("\\$".into()));
    assert!(matches!(lex_error(r#""\ud83d""#), LexErrorKind::InvalidEscape(_)));
}

#[test]
fn test_unterminated_strings() {
    assert_eq!(lex_error("\"abc"), LexErrorKind::UnterminatedString);
    assert_eq!(lex_error("\"ab\ncd\""), LexErrorKind::UnterminatedString);
    assert_eq!(lex_error("\"\"\"abc"), LexErrorKind::UnterminatedMultilineString);
}

#[test]
fn test_line_continuation() {
    let source = r#""hello \
        John""#;
    assert_eq!(first(source), TokenKind::String("hello John".into()));
    assert_eq!(first("\"a\\\r\n\n  b\""), TokenKind::String("ab".into()));

    let tokens = tokenize("\"x\\\n  y\" 1").unwrap();
    assert_eq!(tokens[1].position, Position::new(2, 6, 9));
}

#[test]
fn test_raw_strings() {
    let test_cases = vec![
        (r#"r"John""#, "John"),
        (r##"r#"John"#"##, "John"),
        (r###"r##"John"##"###, "John"),
        (r#"r"C:\temp\new""#, r"C:\temp\new"),
        (r##"r#"say "hi""#"##, r#"say "hi""#),
        (r#"r"${ name }""#, "${ name }"),
        ("r\"two\nlines\"", "two\nlines"),
        (r#"r"""#, ""),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            first(input),
            TokenKind::String(expected.into()),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_raw_string_needs_adjacent_quote() {
    assert_eq!(
        kinds(r#"r "x""#),
        vec![
            TokenKind::Identifier("r".into()),
            TokenKind::String("x".into()),
            TokenKind::Eof
        ]
    );
    assert_eq!(lex_error(r##"r#"open""##), LexErrorKind::UnterminatedString);
    assert_eq!(lex_error("r#x"), LexErrorKind::UnexpectedChar('#'));
}

#[test]
fn test_multiline_string_is_verbatim() {
    let source = "\"\"\"\n  line one\n    \\n stays\n  \"\"\"";
    assert_eq!(
        first(source),
        TokenKind::MultilineString("\n  line one\n    \\n stays\n  ".into())
    );
}

#[test]
fn test_multiline_string_dedent() {
    let source = "\"\"\"\n    a\n      b\n    \"\"\"";
    let tokens = Lexer::new(source).dedent_multiline(true).tokenize().unwrap();
    assert_eq!(tokens[0].kind, TokenKind::MultilineString("a\n  b".into()));
}

#[test]
fn test_dedent_helper() {
    assert_eq!(dedent("\n    x\n\n      y\n  "), "x\n\n  y");
    assert_eq!(dedent("no indent"), "no indent");
}

// ============================================================================
// Interpolated strings
// ============================================================================

#[test]
fn test_f_string_without_spans_is_plain() {
    assert_eq!(first(r#"f"hello""#), TokenKind::String("hello".into()));
    assert_eq!(first("f\"\"\"x\"\"\""), TokenKind::MultilineString("x".into()));
}

#[test]
fn test_f_string_spans() {
    let TokenKind::InterpolatedString(parts) = first(r#"f"v${ major }.${minor}""#) else {
        panic!("Expected interpolated string");
    };
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], StringPart::Text("v".into()));
    match &parts[1] {
        StringPart::Expr { tokens, position } => {
            assert_eq!(tokens[0].kind, TokenKind::Identifier("major".into()));
            assert!(tokens[1].is_eof());
            assert_eq!(*position, Position::new(1, 4, 3));
        }
        other => panic!("Expected span, got {:?}", other),
    }
    assert_eq!(parts[2], StringPart::Text(".".into()));
}

#[test]
fn test_span_with_nested_braces_and_strings() {
    let TokenKind::InterpolatedString(parts) = first(r#"f"${ {a: "}"}.a }""#) else {
        panic!("Expected interpolated string");
    };
    let StringPart::Expr { tokens, .. } = &parts[0] else {
        panic!("Expected span");
    };
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::LBrace,
            TokenKind::Identifier("a".into()),
            TokenKind::Colon,
            TokenKind::String("}".into()),
            TokenKind::RBrace,
            TokenKind::Dot,
            TokenKind::Identifier("a".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_hash_delimited_f_strings() {
    match first(r###"f#"say "${ name }""#"###) {
        TokenKind::InterpolatedString(parts) => {
            assert_eq!(parts.len(), 3);
            assert_eq!(parts[0], StringPart::Text("say \"".into()));
            assert!(matches!(&parts[1], StringPart::Expr { tokens, .. }
                if tokens[0].kind == TokenKind::Identifier("name".into())));
            assert_eq!(parts[2], StringPart::Text("\"".into()));
        }
        other => panic!("Expected interpolated string, got {:?}", other),
    }

    // Escapes still apply; line breaks are allowed between `#` delimiters
    assert_eq!(first(r##"f#"a\tb"#"##), TokenKind::String("a\tb".into()));
    assert_eq!(first("f#\"one\ntwo\"#"), TokenKind::String("one\ntwo".into()));
    assert_eq!(lex_error(r##"f#"open""##), LexErrorKind::UnterminatedString);
}

#[test]
fn test_line_continuation_in_f_string() {
    match first("f\"total: \\\n    ${ n }\"") {
        TokenKind::InterpolatedString(parts) => {
            assert_eq!(parts[0], StringPart::Text("total: ".into()));
            assert_eq!(parts.len(), 2);
        }
        other => panic!("Expected interpolated string, got {:?}", other),
    }
}

#[test]
fn test_dedent_keeps_spans_in_place() {
    let source = "f\"\"\"\n    a\u{0}b ${ x }\n      ${ y }\n    \"\"\"";
    let tokens = Lexer::new(source).dedent_multiline(true).tokenize().unwrap();

    let TokenKind::InterpolatedString(parts) = &tokens[0].kind else {
        panic!("Expected interpolated string, got {:?}", tokens[0].kind);
    };
    let span_name = |part: &StringPart| match part {
        StringPart::Expr { tokens, .. } => tokens[0].kind.clone(),
        StringPart::Text(text) => panic!("Expected span, got text {:?}", text),
    };
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], StringPart::Text("a\u{0}b ".into()));
    assert_eq!(span_name(&parts[1]), TokenKind::Identifier("x".into()));
    assert_eq!(parts[2], StringPart::Text("\n  ".into()));
    assert_eq!(span_name(&parts[3]), TokenKind::Identifier("y".into()));
}

#[test]
fn test_deeply_nested_spans_are_rejected() {
    let nested = |depth: usize| format!("{}1{}", "f\"${ ".repeat(depth), " }\"".repeat(depth));
    assert!(tokenize(&nested(20)).is_ok());
    assert_eq!(lex_error(&nested(200)), LexErrorKind::NestingTooDeep(128));
}

#[test]
fn test_escaped_dollar_in_f_string() {
    assert_eq!(first(r#"f"cost: \${x}""#), TokenKind::String("cost: ${x}".into()));
}

#[test]
fn test_plain_string_keeps_dollar_brace() {
    assert_eq!(first(r#""${x}""#), TokenKind::String("${x}".into()));
}

#[test]
fn test_unterminated_interpolation() {
    assert_eq!(lex_error(r#"f"${ a }"#), LexErrorKind::UnterminatedString);
    assert_eq!(lex_error(r#"f"${ a "#), LexErrorKind::UnterminatedInterpolation);
    assert_eq!(lex_error("f\"\"\"${ a"), LexErrorKind::UnterminatedInterpolation);
}

// ============================================================================
// Annotations and comments
// ============================================================================

#[test]
fn test_annotations() {
    assert_eq!(
        kinds("@deprecated @since(2)"),
        vec![
            TokenKind::Annotation("deprecated".into()),
            TokenKind::Annotation("since".into()),
            TokenKind::LParen,
            TokenKind::Integer(2),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
    assert_eq!(lex_error("@ x"), LexErrorKind::InvalidAnnotationName);
    assert_eq!(lex_error("@1"), LexErrorKind::InvalidAnnotationName);
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("// header\n1 // trailing\n"),
        vec![TokenKind::Integer(1), TokenKind::Eof]
    );
}

#[test]
fn test_comments_can_be_kept() {
    let tokens = Lexer::new("// header\n1").keep_comments(true).tokenize().unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Comment("header".into()));
    assert_eq!(tokens[1].kind, TokenKind::Integer(1));
    assert!(tokens[1].newline_before);
}

#[test]
fn test_comment_marker_inside_string() {
    assert_eq!(first(r#""http://x""#), TokenKind::String("http://x".into()));
}

// ============================================================================
// Positions and line breaks
// ============================================================================

#[test]
fn test_positions() {
    let tokens = tokenize("{\n  \"a\": 1\n}").unwrap();
    assert_eq!(tokens[0].position, Position::new(1, 1, 0));
    assert_eq!(tokens[1].position, Position::new(2, 3, 4));
    assert_eq!(tokens[3].position, Position::new(2, 8, 9));
    assert_eq!(tokens[4].position, Position::new(3, 1, 11));
}

#[test]
fn test_newline_flag() {
    let tokens = tokenize("1 2\n3").unwrap();
    assert!(!tokens[1].newline_before);
    assert!(tokens[2].newline_before);
}

#[test]
fn test_error_position() {
    let err = tokenize("[1,\n  #]").unwrap_err();
    assert_eq!(err.position, Position::new(2, 3, 6));
    assert_eq!(err.to_string(), "Unexpected character '#' at line 2, column 3");
}

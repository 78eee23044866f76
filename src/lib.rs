//! # Eson
//!
//! A JSON superset for configuration files. Every JSON document is a valid
//! Eson document; on top of JSON, Eson accepts:
//!
//! - `//` line comments
//! - `"""` multi-line strings
//! - `@name` and `@name(args)` annotations before values and keys
//! - `...` placeholders inside objects and arrays
//! - `f"..."` strings with `${ expr }` interpolation and `|` pipes
//! - unquoted keys, trailing commas, and newlines in place of commas
//!
//! Parsing produces a [`Document`]; resolving it against a [`Context`] and a
//! [`FunctionRegistry`] yields a plain [`Value`] tree.
//!
//! ```
//! use eson::{Context, FunctionRegistry, Value};
//!
//! let doc = eson::parse(r#"
//! // package manifest
//! {
//!     "name": "eson"
//!     "next": f"${ major + 1 }.0.0"
//! }
//! "#).unwrap();
//!
//! let context = Context::new().with("major", 1);
//! let value = doc.resolve(&context, &FunctionRegistry::with_builtins()).unwrap();
//! assert_eq!(value.get("next"), Some(&Value::from("2.0.0")));
//! ```
pub mod ast;
pub mod cli;
pub mod convert;
pub mod document;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod path;
pub mod value;

use thiserror::Error;

pub use ast::{BinOp, Expr, Position, Token, TokenKind, UnaryOp};
pub use convert::{eson_to_json, json_to_eson};
pub use document::{Annotation, Comment, Document};
pub use evaluator::{
    Context, EvalError, EvalErrorKind, Evaluator, PlaceholderPolicy, ResolveOptions, evaluate,
};
pub use functions::{Function, FunctionError, FunctionRegistry};
pub use lexer::{LexError, LexErrorKind, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{MultilineMode, ParseError, ParseOptions, Parser};
pub use path::{Anchor, NodePath, PathStep};
pub use value::{Map, Segment, Value};

/// Failure to turn source text into a [`Document`] or an [`Expr`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn position(&self) -> Position {
        match self {
            Error::Lex(e) => e.position,
            Error::Parse(e) => e.position,
        }
    }
}

/// Parse a document with default options.
pub fn parse(source: &str) -> Result<Document, Error> {
    parse_with(source, &ParseOptions::default())
}

pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Document, Error> {
    let tokens = Lexer::new(source)
        .keep_comments(options.keep_comments)
        .dedent_multiline(options.multiline == MultilineMode::Dedent)
        .tokenize()?;
    Ok(Parser::new(tokens).parse_document()?)
}

/// Parse the body of a `${ ... }` span on its own.
///
/// ```
/// let expr = eson::parse_expression("date() | format(\"%Y\")").unwrap();
/// assert!(matches!(expr, eson::Expr::Pipe { .. }));
/// ```
pub fn parse_expression(source: &str) -> Result<Expr, Error> {
    let tokens = Lexer::expression(source).tokenize()?;
    Ok(Parser::new(tokens).parse()?)
}

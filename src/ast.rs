//! # Eson - Abstract Syntax Tree
//!
//! Syntax-level types shared by the lexer, parser and evaluator.
//!
//! - **[tokens]** - Lexical tokens and source positions
//! - **[expressions]** - Expression trees found inside `${ ... }` spans
//! - **[operators]** - Binary and unary operators used by expressions
//!
//! ## Interpolation
//!
//! An `f`-prefixed string may embed expressions:
//!
//! ```text
//! "copyright": f"(c) ${ date() | format("%Y") } ${ author }"
//! ```
//!
//! Each span is lexed into its own token stream and parsed into an [`Expr`].
//!
//! ### Pipes
//!
//! `|` passes the value on its left as the first argument of the call on its
//! right, and chains left to right:
//!
//! ```text
//! a | f        // f(a)
//! a | f(x)     // f(a, x)
//! a | f | g(x) // g(f(a), x)
//! ```
//!
//! ### Root references
//!
//! `$` is the document being resolved; `.name` and `[expr]` walk into it:
//!
//! ```text
//! f"${ $.name }-${ $.version }"
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
pub use tokens::{Position, StringPart, Token, TokenKind};

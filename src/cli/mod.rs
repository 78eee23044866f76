//! CLI support for eson
//!
//! The `eson` binary is a thin wrapper around these functions, so other tools
//! can check and resolve documents the same way without spawning a process.

mod annotations;
mod check;

pub use annotations::{AnnotationEntry, list_annotations};
pub use check::{CheckOptions, CheckResult, execute_check, parse_var};
pub use crate::convert::{eson_to_json, json_to_eson};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] crate::Error),

    #[error("Resolution error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// No file given and nothing piped to stdin
    #[error("No input provided. Pass a file, '-' for stdin, or pipe a document.")]
    NoInput,

    /// `--context` JSON that is not an object
    #[error("Context JSON must be an object")]
    ContextNotObject,

    /// `--var` argument without `=`
    #[error("Invalid variable '{0}': expected NAME=VALUE")]
    InvalidVar(String),
}

//! Check and resolve eson documents

use super::CliError;
use crate::{Context, FunctionRegistry, PlaceholderPolicy, ResolveOptions, Value};

/// Options for the check and resolve commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Document source text
    pub source: Option<String>,
    /// Only validate syntax, don't resolve
    pub syntax_only: bool,
    /// `NAME=VALUE` context variables
    pub vars: Vec<String>,
    /// Load context variables from environment variables with this prefix
    pub env_prefix: Option<String>,
    /// JSON object whose members become context variables
    pub context_json: Option<String>,
    /// Remove `...` placeholders instead of failing on them
    pub drop_placeholders: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Document resolved to a plain value
    Success(Value),
}

/// Split a `NAME=VALUE` argument.
///
/// The value is read as an Eson literal when it is one (`3`, `true`,
/// `[1, 2]`, `"quoted"`) and as a bare string otherwise.
pub fn parse_var(arg: &str) -> Result<(String, Value), CliError> {
    let (name, raw) = arg
        .split_once('=')
        .filter(|(name, _)| !name.trim().is_empty())
        .ok_or_else(|| CliError::InvalidVar(arg.to_string()))?;

    let value = match crate::parse(raw) {
        Ok(doc) if doc.is_plain() => doc.into_root(),
        _ => Value::String(raw.to_string()),
    };
    Ok((name.trim().to_string(), value))
}

fn build_context(options: &CheckOptions) -> Result<Context, CliError> {
    let mut context = match &options.env_prefix {
        Some(prefix) => Context::from_env_prefix(prefix),
        None => Context::new(),
    };
    if let Some(text) = &options.context_json {
        let json: serde_json::Value = serde_json::from_str(text)?;
        let members = Context::from_json(json).ok_or(CliError::ContextNotObject)?;
        context.merge(members);
    }
    // Explicit variables override the environment and the JSON context
    for arg in &options.vars {
        let (name, value) = parse_var(arg)?;
        context.insert(name, value);
    }
    Ok(context)
}

/// Execute an eson check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let source = options.source.as_ref().ok_or(CliError::NoInput)?;
    let document = crate::parse(source)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let context = build_context(options)?;
    let resolve_options = ResolveOptions {
        placeholders: if options.drop_placeholders {
            PlaceholderPolicy::Drop
        } else {
            PlaceholderPolicy::Reject
        },
    };

    let value = document.resolve_with(&context, &FunctionRegistry::with_builtins(), &resolve_options)?;
    Ok(CheckResult::Success(value))
}

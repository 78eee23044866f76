use std::{collections::HashMap, env, fmt};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Position, UnaryOp},
    convert::json_to_eson,
    document::Document,
    functions::{FunctionError, FunctionRegistry},
    parser::MAX_NESTING_DEPTH,
    path::{Anchor, NodePath, PathStep, reference_keys},
    value::{Map, PLACEHOLDER_KEY, Segment, Value},
};

/// Named values visible to interpolation expressions.
///
/// # Examples
///
/// ```
/// use eson::{Context, Value};
///
/// let context = Context::new().with("author", "Yuri").with("year", 2024);
/// assert_eq!(context.get("year"), Some(&Value::Integer(2024)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    vars: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Add every variable of `other`, replacing existing names.
    pub fn merge(&mut self, other: Context) {
        self.vars.extend(other.vars);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Environment variables whose names start with `prefix`, with the
    /// prefix stripped, as strings. `ESON_AUTHOR` becomes `AUTHOR` for
    /// prefix `ESON_`.
    pub fn from_env_prefix(prefix: &str) -> Self {
        env::vars()
            .filter_map(|(name, value)| {
                let stripped = name.strip_prefix(prefix)?;
                (!stripped.is_empty()).then(|| (stripped.to_string(), Value::String(value)))
            })
            .collect()
    }

    /// Members of a JSON object; `None` when `json` is not an object.
    pub fn from_json(json: serde_json::Value) -> Option<Self> {
        match json_to_eson(json) {
            Value::Object(map) => Some(map.into_iter().collect()),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Context {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Whether `...` placeholders may survive resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderPolicy {
    /// Fail with [`EvalErrorKind::Placeholder`] naming the placeholder's path
    #[default]
    Reject,

    /// Remove placeholders from their containers
    Drop,
}

/// Options for [`Document::resolve_with`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub placeholders: PlaceholderPolicy,
}

/// Failure while evaluating an expression or resolving a document.
///
/// `path` and `position` locate the interpolated string (or placeholder)
/// being resolved; both are `None` for standalone expressions.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", location_suffix(.path, .position))]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub path: Option<NodePath>,
    pub position: Option<Position>,
}

fn location_suffix(path: &Option<NodePath>, position: &Option<Position>) -> String {
    let mut suffix = String::new();
    if let Some(path) = path {
        suffix.push_str(&format!(" at {}", path));
    }
    if let Some(position) = position {
        suffix.push_str(&format!(" ({})", position));
    }
    suffix
}

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalErrorKind {
    /// Identifier not present in the context
    #[error("Undefined name: '{0}' is not defined in the context")]
    UndefinedName(String),

    /// Call to a name missing from the registry
    #[error("Undefined function: '{0}' is not registered")]
    UndefinedFunction(String),

    /// A registered function reported an error
    #[error("Function '{name}' failed: {cause}")]
    FunctionFailed { name: String, cause: FunctionError },

    /// Value with no string form (null, array, object) inside an f-string
    #[error("Cannot interpolate a value of type {0}")]
    NotStringifiable(&'static str),

    /// Callee is not a plain function name
    #[error("Only named functions can be called")]
    NotCallable,

    /// Type mismatch or invalid operation for the given type
    #[error("Type error: {0}")]
    TypeError(String),

    /// Invalid member access or array index
    #[error("Access error: {0}")]
    AccessError(String),

    #[error("Division by zero")]
    DivisionByZero,

    /// `$` reference to a node whose resolution is in progress
    #[error("Cyclic reference: {0} refers back to the value being resolved")]
    CyclicReference(NodePath),

    /// `...` found while resolving with [`PlaceholderPolicy::Reject`]
    #[error("Unresolved placeholder '...'")]
    Placeholder,

    /// Chain of references through more strings than the limit
    #[error("References nested deeper than {0} strings")]
    NestingTooDeep(usize),
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            path: None,
            position: None,
        }
    }

    /// Attach a location unless one is already set.
    fn located(mut self, path: &NodePath, position: Option<Position>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.clone());
            self.position = position;
        }
        self
    }
}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

/// Evaluate a standalone expression; `$` is unavailable.
///
/// # Examples
///
/// ```
/// use eson::{Context, FunctionRegistry, Value};
///
/// let expr = eson::parse_expression("price * 2").unwrap();
/// let context = Context::new().with("price", 21);
///
/// let result = eson::evaluate(&expr, &FunctionRegistry::new(), &context).unwrap();
/// assert_eq!(result, Value::Integer(42));
/// ```
pub fn evaluate(expr: &Expr, registry: &FunctionRegistry, context: &Context) -> Result<Value, EvalError> {
    Evaluator::new(registry, context).eval_expression(expr)
}

/// The expression evaluator and document resolver.
///
/// Holds the function registry and context for one evaluation; when resolving
/// a document it also tracks which interpolated strings are in progress so
/// that references cannot loop, and remembers every node a reference has
/// already resolved.
pub struct Evaluator<'a> {
    registry: &'a FunctionRegistry,
    context: &'a Context,
    document: Option<&'a Document>,
    options: ResolveOptions,
    /// Paths of the interpolated strings currently being resolved
    resolving: Vec<NodePath>,
    resolved: HashMap<NodePath, Value>,
}

impl<'a> Evaluator<'a> {
    pub fn new(registry: &'a FunctionRegistry, context: &'a Context) -> Self {
        Evaluator {
            registry,
            context,
            document: None,
            options: ResolveOptions::default(),
            resolving: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    /// Make `$`, `self` and `super` refer to `document`.
    pub fn with_document(mut self, document: &'a Document) -> Self {
        self.document = Some(document);
        self.resolved.clear();
        self
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn eval_expression(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_expr(expr)
    }

    fn position_of(&self, path: &NodePath) -> Option<Position> {
        self.document.and_then(|doc| doc.position_of(path))
    }

    /// Resolve `value` found at `path`: interpolated strings become plain
    /// strings, containers are rebuilt in order, placeholders follow the
    /// placeholder policy. With a document, `value` must be the document's
    /// node at `path`.
    pub fn resolve_value(&mut self, value: &Value, path: &NodePath) -> Result<Value, EvalError> {
        match value {
            Value::Interpolated(segments) => {
                if let Some(value) = self.resolved.get(path) {
                    return Ok(value.clone());
                }
                self.resolving.push(path.clone());
                let result = self.interpolate(segments);
                self.resolving.pop();

                let value = result
                    .map(Value::String)
                    .map_err(|e| e.located(path, self.position_of(path)))?;
                if self.document.is_some() {
                    self.resolved.insert(path.clone(), value.clone());
                }
                Ok(value)
            }
            Value::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let element = path.index(i);
                    if item.is_placeholder() {
                        self.placeholder(&element)?;
                        continue;
                    }
                    resolved.push(self.resolve_value(item, &element)?);
                }
                Ok(Value::Array(resolved))
            }
            Value::Object(map) => {
                let mut resolved = Map::with_capacity(map.len());
                for (key, member) in map {
                    let member_path = path.key(key.as_str());
                    if key == PLACEHOLDER_KEY && member.is_placeholder() {
                        self.placeholder(&member_path)?;
                        continue;
                    }
                    resolved.insert(key.clone(), self.resolve_value(member, &member_path)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Ellipsis => Err(EvalError::new(EvalErrorKind::Placeholder)
                .located(path, self.position_of(path))),
            other => Ok(other.clone()),
        }
    }

    /// Placeholder inside a container: an error under `Reject`, skipped
    /// under `Drop`.
    fn placeholder(&self, path: &NodePath) -> Result<(), EvalError> {
        match self.options.placeholders {
            PlaceholderPolicy::Drop => Ok(()),
            PlaceholderPolicy::Reject => Err(EvalError::new(EvalErrorKind::Placeholder)
                .located(path, self.position_of(path))),
        }
    }

    fn interpolate(&mut self, segments: &[Segment]) -> Result<String, EvalError> {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expr(expr) => {
                    let value = self.eval_expr(expr)?;
                    out.push_str(&stringify(&value)?);
                }
            }
        }
        Ok(out)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        if let Some(document) = self.document
            && let Some((anchor, keys)) = reference_keys(expr)
        {
            return self.eval_reference(document, anchor, &keys);
        }

        match expr {
            Expr::Literal(Value::Interpolated(segments)) => {
                Ok(Value::String(self.interpolate(segments)?))
            }
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Identifier(name) => self
                .context
                .get(name)
                .cloned()
                .ok_or_else(|| EvalErrorKind::UndefinedName(name.clone()).into()),
            Expr::Root | Expr::Current | Expr::Parent => Err(EvalErrorKind::AccessError(
                "document references are only available while resolving a document".to_string(),
            )
            .into()),
            Expr::Access { object, key } => {
                let obj_value = self.eval_expr(object)?;
                let key_value = self.eval_expr(key)?;
                apply_access(&obj_value, &key_value).map_err(EvalError::from)
            }
            Expr::Call { callee, args } => {
                let name = callee.callee_name().ok_or(EvalErrorKind::NotCallable)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                self.call(name, values)
            }
            Expr::Pipe { left, filter } => {
                let input = self.eval_expr(left)?;
                match filter.as_ref() {
                    Expr::Call { callee, args } => {
                        let name = callee.callee_name().ok_or(EvalErrorKind::NotCallable)?;
                        let mut values = Vec::with_capacity(args.len() + 1);
                        values.push(input);
                        for arg in args {
                            values.push(self.eval_expr(arg)?);
                        }
                        self.call(name, values)
                    }
                    _ => Err(EvalErrorKind::NotCallable.into()),
                }
            }
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                apply_unary(*op, &value).map_err(EvalError::from)
            }
            Expr::Binary { op: BinOp::And, left, right } => {
                if !self.eval_condition(left, "&&")? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval_condition(right, "&&")?))
            }
            Expr::Binary { op: BinOp::Or, left, right } => {
                if self.eval_condition(left, "||")? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval_condition(right, "||")?))
            }
            Expr::Binary { op, left, right } => {
                let left_val = self.eval_expr(left)?;
                let right_val = self.eval_expr(right)?;
                apply_binop(*op, &left_val, &right_val).map_err(EvalError::from)
            }
            Expr::Array(exprs) => {
                let mut arr = Vec::with_capacity(exprs.len());
                for expr in exprs {
                    arr.push(self.eval_expr(expr)?);
                }
                Ok(Value::Array(arr))
            }
            Expr::Object(items) => {
                let mut map = Map::with_capacity(items.len());
                for (key, expr) in items {
                    let value = self.eval_expr(expr)?;
                    map.insert(key.clone(), value);
                }
                Ok(Value::Object(map))
            }
        }
    }

    fn eval_condition(&mut self, expr: &Expr, op: &str) -> Result<bool, EvalError> {
        match self.eval_expr(expr)? {
            Value::Boolean(b) => Ok(b),
            other => Err(EvalErrorKind::TypeError(format!(
                "'{}' requires booleans, got {}",
                op,
                other.type_name()
            ))
            .into()),
        }
    }

    fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
        let function = self
            .registry
            .get(name)
            .ok_or_else(|| EvalErrorKind::UndefinedFunction(name.to_string()))?;

        tracing::trace!(function = name, args = args.len(), "calling function");
        function(&args).map_err(|cause| {
            EvalErrorKind::FunctionFailed {
                name: name.to_string(),
                cause,
            }
            .into()
        })
    }

    /// Path `anchor` stands for. `self` is the container of the innermost
    /// string being resolved and `super` the container above it.
    fn anchor_path(&self, anchor: Anchor) -> Result<NodePath, EvalError> {
        let levels = match anchor {
            Anchor::Root => return Ok(NodePath::root()),
            Anchor::Current => 1,
            Anchor::Parent => 2,
        };
        let current = self.resolving.last().ok_or_else(|| {
            EvalErrorKind::AccessError(format!("'{}' is only available inside a document string", anchor))
        })?;
        current.ancestor(levels).ok_or_else(|| {
            EvalErrorKind::AccessError(format!("'{}' reaches above the root from {}", anchor, current)).into()
        })
    }

    /// Walk the unresolved document from `anchor` along `keys`, then resolve
    /// the node found. Resolved nodes are remembered for the rest of the
    /// resolution.
    fn eval_reference(
        &mut self,
        document: &'a Document,
        anchor: Anchor,
        keys: &[&Expr],
    ) -> Result<Value, EvalError> {
        let mut path = self.anchor_path(anchor)?;
        let mut node = document
            .get(&path)
            .ok_or_else(|| EvalErrorKind::AccessError(format!("{} does not exist", path)))?;
        for key_expr in keys {
            let key = self.eval_expr(key_expr)?;
            let (step, child) = match (node, &key) {
                (Value::Object(map), Value::String(k)) => (PathStep::Key(k.clone()), map.get(k)),
                (Value::Object(map), Value::Integer(k)) => {
                    let k = k.to_string();
                    (PathStep::Key(k.clone()), map.get(&k))
                }
                (Value::Array(items), Value::Integer(n)) => {
                    let index = resolve_index(*n, items.len()).ok_or_else(|| {
                        EvalErrorKind::AccessError(format!(
                            "index {} is out of bounds for {} (length {})",
                            n,
                            path,
                            items.len()
                        ))
                    })?;
                    (PathStep::Index(index), items.get(index))
                }
                (v, k) => {
                    return Err(EvalErrorKind::TypeError(format!(
                        "Cannot access {} at {} with {} key",
                        v.type_name(),
                        path,
                        k.type_name()
                    ))
                    .into());
                }
            };

            path.push(step);
            node = child
                .ok_or_else(|| EvalErrorKind::AccessError(format!("{} does not exist", path)))?;
        }

        if self.resolving.iter().any(|in_progress| path.is_prefix_of(in_progress)) {
            return Err(EvalErrorKind::CyclicReference(path).into());
        }
        if let Some(value) = self.resolved.get(&path) {
            return Ok(value.clone());
        }
        if self.resolving.len() >= MAX_NESTING_DEPTH {
            return Err(EvalErrorKind::NestingTooDeep(MAX_NESTING_DEPTH).into());
        }

        let value = self.resolve_value(node, &path)?;
        self.resolved.insert(path, value.clone());
        Ok(value)
    }
}

/// Negative indexes count from the end: -1 is the last element.
fn resolve_index(n: i64, len: usize) -> Option<usize> {
    let index = if n < 0 {
        len.checked_sub(usize::try_from(n.unsigned_abs()).ok()?)?
    } else {
        usize::try_from(n).ok()?
    };
    (index < len).then_some(index)
}

fn apply_access(object: &Value, key: &Value) -> Result<Value, EvalErrorKind> {
    let missing = |key: &dyn fmt::Display| EvalErrorKind::AccessError(format!("no member '{}'", key));

    match (object, key) {
        (Value::Object(map), Value::String(k)) => map.get(k).cloned().ok_or_else(|| missing(k)),
        (Value::Object(map), Value::Integer(k)) => {
            map.get(&k.to_string()).cloned().ok_or_else(|| missing(k))
        }
        (Value::Array(arr), Value::Integer(n)) => resolve_index(*n, arr.len())
            .and_then(|index| arr.get(index))
            .cloned()
            .ok_or_else(|| {
                EvalErrorKind::AccessError(format!(
                    "index {} is out of bounds (length {})",
                    n,
                    arr.len()
                ))
            }),
        (Value::Array(_), Value::String(k)) => Err(EvalErrorKind::TypeError(format!(
            "Cannot use string key '{}' on array; use integer index instead",
            k
        ))),
        (v, Value::Integer(_)) => Err(EvalErrorKind::TypeError(format!(
            "Cannot use integer index on {}; only arrays support integer indexing",
            v.type_name()
        ))),
        _ => Err(EvalErrorKind::TypeError(format!(
            "Cannot access {} with {} key",
            object.type_name(),
            key.type_name()
        ))),
    }
}

fn apply_unary(op: UnaryOp, value: &Value) -> Result<Value, EvalErrorKind> {
    match (op, value) {
        (UnaryOp::Negate, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| EvalErrorKind::TypeError(format!("integer overflow negating {}", n))),
        (UnaryOp::Negate, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Negate, v) => Err(EvalErrorKind::TypeError(format!(
            "Cannot negate {}",
            v.type_name()
        ))),
        (UnaryOp::Not, v) => Err(EvalErrorKind::TypeError(format!(
            "'!' requires a boolean, got {}",
            v.type_name()
        ))),
    }
}

fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalErrorKind> {
    match op {
        BinOp::Add | BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
            arithmetic(op, left, right)
        }
        BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::LessThan | BinOp::GreaterThan | BinOp::LessEqual | BinOp::GreaterEqual => {
            let ordering = compare(left, right).ok_or_else(|| {
                EvalErrorKind::TypeError(format!(
                    "Cannot compare {} {} {} (comparison requires two numbers, strings or dates)",
                    left.type_name(),
                    op.symbol(),
                    right.type_name()
                ))
            })?;
            Ok(Value::Boolean(match op {
                BinOp::LessThan => ordering.is_lt(),
                BinOp::GreaterThan => ordering.is_gt(),
                BinOp::LessEqual => ordering.is_le(),
                _ => ordering.is_ge(),
            }))
        }
        // Short-circuited by the evaluator; reached only for plain values
        BinOp::And | BinOp::Or => match (left, right) {
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(if op == BinOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            (a, b) => Err(EvalErrorKind::TypeError(format!(
                "'{}' requires booleans, got {} and {}",
                op.symbol(),
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// Numbers compare by value across integer and float.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
            (*a as f64) == *b
        }
        _ => left == right,
    }
}

fn compare(left: &Value, right: &Value) -> Option<std::cmp::Ordering> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (a, b) => a.as_float()?.partial_cmp(&b.as_float()?),
    }
}

fn arithmetic(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalErrorKind> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_op(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => float_op(op, *a, *b),
        (Value::Integer(a), Value::Float(b)) => {
            mixed_op(op, Decimal::from_i64(*a), Decimal::from_f64(*b), *a as f64, *b)
        }
        (Value::Float(a), Value::Integer(b)) => {
            mixed_op(op, Decimal::from_f64(*a), Decimal::from_i64(*b), *a, *b as f64)
        }
        (Value::String(a), Value::String(b)) if op == BinOp::Add => {
            Ok(Value::String(format!("{}{}", a, b)))
        }
        (a, b) => Err(EvalErrorKind::TypeError(match op {
            BinOp::Add => format!("Cannot add {} and {}", a.type_name(), b.type_name()),
            BinOp::Subtract => format!("Cannot subtract {} from {}", b.type_name(), a.type_name()),
            BinOp::Multiply => format!("Cannot multiply {} by {}", a.type_name(), b.type_name()),
            BinOp::Divide => format!("Cannot divide {} by {}", a.type_name(), b.type_name()),
            _ => format!(
                "Cannot compute modulo of {} by {}",
                a.type_name(),
                b.type_name()
            ),
        })),
    }
}

fn integer_op(op: BinOp, a: i64, b: i64) -> Result<Value, EvalErrorKind> {
    if matches!(op, BinOp::Divide | BinOp::Modulo) && b == 0 {
        return Err(EvalErrorKind::DivisionByZero);
    }

    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Subtract => a.checked_sub(b),
        BinOp::Multiply => a.checked_mul(b),
        BinOp::Divide => {
            // Exact division stays integer; otherwise the result is a float
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                Some(_) => return Ok(Value::Float(a as f64 / b as f64)),
                None => None,
            }
        }
        _ => a.checked_rem(b),
    };

    result.map(Value::Integer).ok_or_else(|| {
        EvalErrorKind::TypeError(format!("integer overflow in {} {} {}", a, op.symbol(), b))
    })
}

fn float_op(op: BinOp, a: f64, b: f64) -> Result<Value, EvalErrorKind> {
    Ok(Value::Float(match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        BinOp::Divide if b == 0.0 => return Err(EvalErrorKind::DivisionByZero),
        BinOp::Divide => a / b,
        _ if b == 0.0 => return Err(EvalErrorKind::DivisionByZero),
        _ => a % b,
    }))
}

/// Integer/float mixes are computed in decimal so that `0.5 * 4` is the
/// integer `2`; results that do not fit fall back to float arithmetic.
fn mixed_op(
    op: BinOp,
    ad: Option<Decimal>,
    bd: Option<Decimal>,
    a: f64,
    b: f64,
) -> Result<Value, EvalErrorKind> {
    if matches!(op, BinOp::Divide | BinOp::Modulo) && b == 0.0 {
        return Err(EvalErrorKind::DivisionByZero);
    }

    if let Some(ad) = ad
        && let Some(bd) = bd
    {
        let rd = match op {
            BinOp::Add => ad.checked_add(bd),
            BinOp::Subtract => ad.checked_sub(bd),
            BinOp::Multiply => ad.checked_mul(bd),
            BinOp::Divide => ad.checked_div(bd),
            _ => ad.checked_rem(bd),
        };
        if let Some(rd) = rd {
            if rd.is_integer()
                && let Some(r) = rd.to_i64()
            {
                return Ok(Value::Integer(r));
            } else if let Some(r) = rd.to_f64() {
                return Ok(Value::Float(r));
            }
        }
    }
    float_op(op, a, b)
}

/// Text form of a value inside an interpolated string.
///
/// Integers print in decimal; floats print as the shortest decimal that
/// round-trips (`NaN`, `Infinity` and `-Infinity` when non-finite); dates
/// print as RFC 3339. Null, arrays, objects and unresolved values have no
/// text form.
pub fn stringify(value: &Value) -> Result<String, EvalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(n) => Ok(format_float(*n)),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Date(date) => Ok(date.to_rfc3339()),
        other => Err(EvalErrorKind::NotStringifiable(other.type_name()).into()),
    }
}

fn format_float(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_stringification() {
        assert_eq!(stringify(&Value::Float(1.5)).unwrap(), "1.5");
        assert_eq!(stringify(&Value::Float(3.0)).unwrap(), "3");
        assert_eq!(stringify(&Value::Float(0.1 + 0.2)).unwrap(), "0.30000000000000004");
        assert_eq!(stringify(&Value::Float(f64::NEG_INFINITY)).unwrap(), "-Infinity");
        assert_eq!(stringify(&Value::Float(f64::NAN)).unwrap(), "NaN");
    }

    #[test]
    fn test_mixed_arithmetic_collapses_to_integer() {
        let result = apply_binop(BinOp::Multiply, &Value::Float(0.5), &Value::Integer(4)).unwrap();
        assert_eq!(result, Value::Integer(2));
    }

    #[test]
    fn test_integer_division() {
        assert_eq!(integer_op(BinOp::Divide, 6, 3).unwrap(), Value::Integer(2));
        assert_eq!(integer_op(BinOp::Divide, 7, 2).unwrap(), Value::Float(3.5));
        assert_eq!(integer_op(BinOp::Modulo, 7, 0), Err(EvalErrorKind::DivisionByZero));
        assert!(matches!(
            integer_op(BinOp::Add, i64::MAX, 1),
            Err(EvalErrorKind::TypeError(_))
        ));
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }

    #[test]
    fn test_error_display_includes_location() {
        let err = EvalError::new(EvalErrorKind::UndefinedName("x".into()))
            .located(&NodePath::root().key("a"), Some(Position::new(2, 7, 12)));
        assert_eq!(
            err.to_string(),
            "Undefined name: 'x' is not defined in the context at $.a (line 2, column 7)"
        );
    }
}

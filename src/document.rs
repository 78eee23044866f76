use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    ast::Position,
    evaluator::{Context, EvalError, Evaluator, ResolveOptions},
    functions::FunctionRegistry,
    path::{NodePath, PathStep},
    value::Value,
};

/// `@name` or `@name(arg, ...)` metadata attached to a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<Value>,
}

/// A `//` comment, kept only when [`crate::ParseOptions::keep_comments`] is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Text after the `//`, without the line break
    pub text: String,
    pub position: Position,
}

/// A parsed Eson document.
///
/// Holds the value tree exactly as written (interpolations unevaluated,
/// placeholders in place) plus side tables keyed by [`NodePath`]: the
/// annotations attached to each node and the source position of each node.
///
/// Documents are immutable; [`Document::resolve`] produces a new plain value
/// and leaves the document untouched, so one document can be resolved many
/// times against different contexts.
///
/// # Examples
///
/// ```
/// use eson::{Context, FunctionRegistry, NodePath, Value};
///
/// let doc = eson::parse(r#"
/// @license("Apache-2.0")
/// {
///     name: "eson"
///     greeting: f"hello ${ who }"
/// }
/// "#).unwrap();
///
/// assert_eq!(doc.annotations_for(&NodePath::root())[0].name, "license");
///
/// let context = Context::new().with("who", "world");
/// let resolved = doc.resolve(&context, &FunctionRegistry::new()).unwrap();
/// assert_eq!(resolved.get("greeting"), Some(&Value::from("hello world")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
    annotations: IndexMap<NodePath, Vec<Annotation>>,
    positions: HashMap<NodePath, Position>,
    comments: Vec<Comment>,
}

impl Document {
    pub(crate) fn new(
        root: Value,
        annotations: IndexMap<NodePath, Vec<Annotation>>,
        positions: HashMap<NodePath, Position>,
        comments: Vec<Comment>,
    ) -> Self {
        Document {
            root,
            annotations,
            positions,
            comments,
        }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    /// Node at `path` in the unresolved tree.
    pub fn get(&self, path: &NodePath) -> Option<&Value> {
        path.steps()
            .iter()
            .try_fold(&self.root, |node, step| match (node, step) {
                (Value::Object(map), PathStep::Key(key)) => map.get(key),
                (Value::Array(items), PathStep::Index(i)) => items.get(*i),
                _ => None,
            })
    }

    /// Annotations attached to the node at `path`, in source order.
    pub fn annotations_for(&self, path: &NodePath) -> &[Annotation] {
        self.annotations.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every annotated node, in the order annotations appear in the source.
    pub fn annotations(&self) -> impl Iterator<Item = (&NodePath, &[Annotation])> {
        self.annotations
            .iter()
            .map(|(path, annotations)| (path, annotations.as_slice()))
    }

    /// Position of the first token of the node at `path`.
    pub fn position_of(&self, path: &NodePath) -> Option<Position> {
        self.positions.get(path).copied()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// True when the document has no interpolations or placeholders, i.e.
    /// resolving it would return the tree unchanged.
    pub fn is_plain(&self) -> bool {
        self.root.is_plain()
    }

    /// Resolve with the default options (placeholders rejected).
    pub fn resolve(&self, context: &Context, registry: &FunctionRegistry) -> Result<Value, EvalError> {
        self.resolve_with(context, registry, &ResolveOptions::default())
    }

    /// Evaluate every interpolated string and return the plain value tree.
    ///
    /// Siblings are resolved in document order; the first failure aborts
    /// resolution and is returned with the failing node's path and position.
    pub fn resolve_with(
        &self,
        context: &Context,
        registry: &FunctionRegistry,
        options: &ResolveOptions,
    ) -> Result<Value, EvalError> {
        tracing::debug!(placeholders = ?options.placeholders, "resolving document");

        let result = Evaluator::new(registry, context)
            .with_document(self)
            .with_options(options.clone())
            .resolve_value(&self.root, &NodePath::root());

        match &result {
            Ok(_) => tracing::debug!("document resolved"),
            Err(e) => tracing::debug!(error = %e, "document resolution failed"),
        }
        result
    }
}

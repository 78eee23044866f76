use std::fmt;

use crate::ast::Expr;

/// One step from a container to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Object member by key
    ///
    /// # Examples
    /// - `{"name": ...}` → `Key("name")`
    Key(String),

    /// Array element by position
    ///
    /// # Examples
    /// - `[first, second]` → `Index(1)` for `second`
    Index(usize),
}

/// Structural address of a node, as the sequence of steps from the root.
///
/// Annotations and source positions are keyed by `NodePath`; since documents
/// are immutable the path identifies a node for the lifetime of the document.
///
/// # Examples
///
/// ```
/// use eson::NodePath;
///
/// let path = NodePath::root().key("authors").index(0).key("name");
/// assert_eq!(path.to_string(), "$.authors[0].name");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<PathStep>);

impl NodePath {
    /// The empty path, addressing the root value.
    pub fn root() -> Self {
        NodePath(Vec::new())
    }

    /// Returns this path extended by an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Key(key.into()));
        NodePath(steps)
    }

    /// Returns this path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(PathStep::Index(index));
        NodePath(steps)
    }

    pub fn push(&mut self, step: PathStep) {
        self.0.push(step);
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The path `levels` steps up, or `None` past the root.
    pub fn ancestor(&self, levels: usize) -> Option<NodePath> {
        let len = self.0.len().checked_sub(levels)?;
        Some(NodePath(self.0[..len].to_vec()))
    }

    /// True if `self` addresses `other` or one of its ancestors.
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<PathStep>> for NodePath {
    fn from(steps: Vec<PathStep>) -> Self {
        NodePath(steps)
    }
}

impl AsRef<[PathStep]> for NodePath {
    fn as_ref(&self) -> &[PathStep] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.0 {
            match step {
                PathStep::Key(key) if is_plain_key(key) => write!(f, ".{}", key)?,
                PathStep::Key(key) => write!(f, "[{:?}]", key)?,
                PathStep::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Where a document reference starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `$`
    Root,
    /// `self`
    Current,
    /// `super`
    Parent,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Anchor::Root => "$",
            Anchor::Current => "self",
            Anchor::Parent => "super",
        })
    }
}

/// Split an access chain into its anchor and key expressions.
///
/// Returns `None` when the chain does not start at `$`, `self` or `super`.
///
/// # Examples
/// ```text
/// $              → Some((Root, []))
/// self.name      → Some((Current, [Literal("name")]))
/// $.items[i + 1] → Some((Root, [Literal("items"), Binary(i + 1)]))
/// f().name       → None
/// ```
pub fn reference_keys(expr: &Expr) -> Option<(Anchor, Vec<&Expr>)> {
    let mut keys = Vec::new();
    let mut node = expr;
    // Walk down the object side, then reverse into source order
    let anchor = loop {
        match node {
            Expr::Root => break Anchor::Root,
            Expr::Current => break Anchor::Current,
            Expr::Parent => break Anchor::Parent,
            Expr::Access { object, key } => {
                keys.push(key.as_ref());
                node = object.as_ref();
            }
            _ => return None,
        }
    };
    keys.reverse();
    Some((anchor, keys))
}

use crate::{
    ast::{BinOp, UnaryOp},
    value::Value,
};

/// Expression tree of a single `${ ... }` interpolation span.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value (number, string, boolean, null)
    ///
    /// # Example
    /// ```text
    /// 42
    /// "%Y-%m-%d"
    /// ```
    Literal(Value),

    /// Name looked up in the evaluation context
    ///
    /// # Example
    /// ```text
    /// version
    /// ```
    Identifier(String),

    /// Root document reference (`$`)
    Root,

    /// Container of the string being resolved (`self`)
    ///
    /// # Example
    /// ```text
    /// {"host": "db", "url": f"pg://${ self.host }"}
    /// ```
    Current,

    /// Container one level above `self` (`super`)
    Parent,

    /// Member or index access on another expression
    ///
    /// # Examples
    /// ```text
    /// $.package.name
    /// $["authors"][0]
    /// ```
    Access {
        object: Box<Expr>,
        key: Box<Expr>,
    },

    /// Function call
    ///
    /// # Example
    /// ```text
    /// date()
    /// format(d, "%Y")
    /// ```
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },

    /// Filter application; `filter` is always a [`Expr::Call`]
    ///
    /// `a | f(x)` evaluates as `f(a, x)`.
    ///
    /// # Example
    /// ```text
    /// date() | format("%Y")
    /// ```
    Pipe {
        left: Box<Expr>,
        filter: Box<Expr>,
    },

    /// Prefix operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, 2, major]
    /// ```
    Array(Vec<Expr>),

    /// Object literal
    ///
    /// # Example
    /// ```text
    /// {"name": name}
    /// ```
    Object(Vec<(String, Expr)>),
}

impl Expr {
    /// Name of the function this expression calls, if the callee is a plain
    /// identifier.
    pub fn callee_name(&self) -> Option<&str> {
        match self {
            Expr::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

use std::fmt;

/// Location of a token in the source text.
///
/// `line` and `column` are 1-based and count characters; `offset` is the
/// 0-based byte offset into the UTF-8 source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }

    /// Position of the first character of a document.
    pub fn start() -> Self {
        Position::new(1, 1, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A raw piece of an `f`-string as produced by the lexer.
///
/// Expression spans keep their own token stream (always terminated by
/// [`TokenKind::Eof`]) so the parser can run the expression grammar over it.
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    /// Literal text with escapes already applied
    Text(String),

    /// Tokens of one `${ ... }` span
    Expr {
        tokens: Vec<Token>,
        position: Position,
    },
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,

    /// The exact source text the token was read from
    pub text: String,

    pub position: Position,

    /// True when at least one line break separates this token from the
    /// previous one. Object and array entries may end at such a break.
    pub newline_before: bool,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// String literal enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "tab\there"
    /// ```
    String(String),

    /// Triple-quoted string, captured verbatim
    ///
    /// # Examples
    /// ```text
    /// """
    /// line one
    /// line two
    /// """
    /// ```
    MultilineString(String),

    /// `f`-prefixed string containing at least one `${ ... }` span
    ///
    /// # Examples
    /// ```text
    /// f"Copyright ${ date() | format("%Y") }"
    /// ```
    InterpolatedString(Vec<StringPart>),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -10
    /// 0xff
    /// ```
    Integer(i64),

    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e10
    /// -0.5E-3
    /// ```
    Float(f64),

    /// `true` or `false`
    Boolean(bool),

    /// `null`
    Null,

    // Names
    /// Function name, unquoted key or context variable
    ///
    /// Must start with a letter or underscore, followed by letters, digits
    /// or underscores.
    Identifier(String),

    /// Annotation marker; holds the name without the `@`
    ///
    /// # Examples
    /// ```text
    /// @license("MIT")
    /// @deprecated
    /// ```
    Annotation(String),

    /// Line comment; holds the text after `//`. Only produced when the lexer
    /// is asked to keep comments.
    Comment(String),

    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,

    /// Placeholder marker `...`
    Ellipsis,

    // Expression operators (only meaningful inside `${ ... }`)
    /// Root document reference
    Dollar,
    Dot,
    /// Filter operator
    Pipe,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Bang,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short human-readable description used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::String(s) | TokenKind::MultilineString(s) => format!("string \"{}\"", s),
            TokenKind::InterpolatedString(_) => "interpolated string".to_string(),
            TokenKind::Integer(n) => format!("number {}", n),
            TokenKind::Float(n) => format!("number {}", n),
            TokenKind::Boolean(b) => format!("'{}'", b),
            TokenKind::Null => "'null'".to_string(),
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Annotation(name) => format!("annotation '@{}'", name),
            TokenKind::Comment(_) => "comment".to_string(),
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Ellipsis => "'...'".to_string(),
            TokenKind::Dollar => "'$'".to_string(),
            TokenKind::Dot => "'.'".to_string(),
            TokenKind::Pipe => "'|'".to_string(),
            TokenKind::Plus => "'+'".to_string(),
            TokenKind::Minus => "'-'".to_string(),
            TokenKind::Star => "'*'".to_string(),
            TokenKind::Slash => "'/'".to_string(),
            TokenKind::Percent => "'%'".to_string(),
            TokenKind::EqEq => "'=='".to_string(),
            TokenKind::NotEq => "'!='".to_string(),
            TokenKind::Lt => "'<'".to_string(),
            TokenKind::Gt => "'>'".to_string(),
            TokenKind::LtEq => "'<='".to_string(),
            TokenKind::GtEq => "'>='".to_string(),
            TokenKind::AndAnd => "'&&'".to_string(),
            TokenKind::OrOr => "'||'".to_string(),
            TokenKind::Bang => "'!'".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

use std::{collections::HashMap, mem};

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Position, StringPart, Token, TokenKind, UnaryOp},
    document::{Annotation, Comment, Document},
    path::NodePath,
    value::{Map, PLACEHOLDER_KEY, Segment, Value},
};

/// Deepest nesting of containers, groups and spans the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

const PLACEHOLDER_CLASH: &str = "either a '...' placeholder or a \"...\" key in one object, not both";

/// Structural error: the tokens are valid but do not form a document.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Expected {expected}, found {found} at {position}")]
pub struct ParseError {
    pub position: Position,
    pub expected: String,
    pub found: String,
}

/// How multi-line strings are captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultilineMode {
    /// Everything between the `"""` delimiters, byte for byte
    #[default]
    Verbatim,

    /// Blank first/last line removed and common indentation stripped
    Dedent,
}

/// Options for [`crate::parse_with`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keep `//` comments in [`Document::comments`]
    pub keep_comments: bool,

    pub multiline: MultilineMode,
}

/// Recursive-descent parser over a token stream.
///
/// The same parser handles whole documents ([`Parser::parse_document`]) and
/// the token streams of interpolation spans ([`Parser::parse`]).
pub struct Parser {
    tokens: std::vec::IntoIter<Token>,
    current_token: Token,
    annotations: IndexMap<NodePath, Vec<Annotation>>,
    positions: HashMap<NodePath, Position>,
    comments: Vec<Comment>,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::at_depth(tokens, 0)
    }

    /// Parser for a span found `depth` levels down in an enclosing parse.
    fn at_depth(tokens: Vec<Token>, depth: usize) -> Self {
        let mut parser = Parser {
            tokens: tokens.into_iter(),
            current_token: eof_token(Position::start()),
            annotations: IndexMap::new(),
            positions: HashMap::new(),
            comments: Vec::new(),
            depth,
        };
        parser.advance();
        parser
    }

    /// Moves to the next non-comment token. Past the end, the last position
    /// is repeated as [`TokenKind::Eof`].
    fn advance(&mut self) {
        loop {
            match self.tokens.next() {
                Some(Token {
                    kind: TokenKind::Comment(text),
                    position,
                    ..
                }) => self.comments.push(Comment { text, position }),
                Some(token) => {
                    self.current_token = token;
                    return;
                }
                None => {
                    self.current_token = eof_token(self.current_token.position);
                    return;
                }
            }
        }
    }

    /// Returns the current token and advances past it.
    fn bump(&mut self) -> Token {
        let next = eof_token(self.current_token.position);
        let token = mem::replace(&mut self.current_token, next);
        self.advance();
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(kind)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<(), ParseError> {
        if !self.check(&kind) {
            return Err(self.unexpected(expected));
        }
        self.advance();
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError {
            position: self.current_token.position,
            expected: expected.to_string(),
            found: self.current_token.kind.describe(),
        }
    }

    /// Goes one level deeper, failing past [`MAX_NESTING_DEPTH`].
    fn descend(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.unexpected(&format!("nesting depth <= {}", MAX_NESTING_DEPTH)));
        }
        self.depth += 1;
        Ok(())
    }

    /// Runs `parse` one level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, ParseError>) -> Result<T, ParseError> {
        let depth = self.depth;
        self.descend()?;
        let result = parse(self);
        self.depth = depth;
        result
    }

    /// An entry of an object or array ends at a comma, at the closing
    /// bracket, or at a line break, whichever comes first.
    fn end_entry(&mut self, close: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if self.check(&TokenKind::Comma) {
            self.advance();
            return Ok(());
        }
        if self.check(close) || (self.current_token.newline_before && !self.current_token.is_eof()) {
            return Ok(());
        }
        Err(self.unexpected(expected))
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Parse a complete document. The whole token stream must be consumed.
    pub fn parse_document(mut self) -> Result<Document, ParseError> {
        let root_path = NodePath::root();
        let root = self.parse_annotated_value(&root_path)?;
        self.expect(TokenKind::Eof, "end of input")?;

        tracing::debug!(
            annotated_nodes = self.annotations.len(),
            comments = self.comments.len(),
            "parsed document"
        );
        Ok(Document::new(root, self.annotations, self.positions, self.comments))
    }

    fn attach(&mut self, path: &NodePath, annotations: Vec<Annotation>) {
        if !annotations.is_empty() {
            self.annotations
                .entry(path.clone())
                .or_default()
                .extend(annotations);
        }
    }

    /// Drops everything recorded for `path` and its descendants; used when a
    /// duplicate key replaces an earlier member.
    fn forget(&mut self, path: &NodePath) {
        self.annotations.retain(|p, _| !path.is_prefix_of(p));
        self.positions.retain(|p, _| !path.is_prefix_of(p));
    }

    fn parse_annotated_value(&mut self, path: &NodePath) -> Result<Value, ParseError> {
        let annotations = self.parse_annotations()?;
        self.attach(path, annotations);
        self.parse_value(path)
    }

    fn parse_annotations(&mut self) -> Result<Vec<Annotation>, ParseError> {
        let mut annotations = vec![];

        while let TokenKind::Annotation(name) = &self.current_token.kind {
            let name = name.clone();
            self.advance();

            // Arguments must open on the annotation's own line
            let arguments = if self.check(&TokenKind::LParen) && !self.current_token.newline_before {
                self.parse_annotation_arguments()?
            } else {
                vec![]
            };
            annotations.push(Annotation { name, arguments });
        }
        Ok(annotations)
    }

    fn parse_annotation_arguments(&mut self) -> Result<Vec<Value>, ParseError> {
        self.advance(); // Consume (
        let mut arguments = vec![];

        while !self.check(&TokenKind::RParen) {
            arguments.push(self.parse_literal()?);

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RParen) {
                return Err(self.unexpected("',' or ')' in annotation arguments"));
            }
        }

        self.expect(TokenKind::RParen, "')'")?;
        Ok(arguments)
    }

    fn parse_value(&mut self, path: &NodePath) -> Result<Value, ParseError> {
        self.positions.insert(path.clone(), self.current_token.position);

        match &self.current_token.kind {
            TokenKind::LBrace => self.nested(|p| p.parse_object(path)),
            TokenKind::LBracket => self.nested(|p| p.parse_array(path)),
            TokenKind::InterpolatedString(_) => match self.bump().kind {
                TokenKind::InterpolatedString(parts) => parse_interpolated(parts, self.depth),
                _ => unreachable!(),
            },
            _ => self.parse_scalar("value"),
        }
    }

    fn parse_scalar(&mut self, expected: &str) -> Result<Value, ParseError> {
        match scalar_value(&self.current_token.kind) {
            Some(value) => {
                self.advance();
                Ok(value)
            }
            None => Err(self.unexpected(expected)),
        }
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        let key = match &self.current_token.kind {
            TokenKind::String(s) | TokenKind::Identifier(s) => s.clone(),
            // Infinity and NaN read as numbers but stay usable as bare keys
            TokenKind::Float(_) if matches!(self.current_token.text.as_str(), "Infinity" | "NaN") => {
                self.current_token.text.clone()
            }
            TokenKind::Boolean(b) => b.to_string(),
            TokenKind::Null => "null".to_string(),
            _ => return Err(self.unexpected("object key")),
        };
        self.advance();
        Ok(key)
    }

    fn parse_object(&mut self, path: &NodePath) -> Result<Value, ParseError> {
        self.advance(); // Consume {
        let mut map = Map::new();
        let mut placeholder = false;

        while !self.check(&TokenKind::RBrace) {
            if self.current_token.is_eof() {
                return Err(self.unexpected("'}'"));
            }

            if self.check(&TokenKind::Ellipsis) {
                if !placeholder && map.contains_key(PLACEHOLDER_KEY) {
                    return Err(self.unexpected(PLACEHOLDER_CLASH));
                }
                placeholder = true;
                self.positions
                    .insert(path.key(PLACEHOLDER_KEY), self.current_token.position);
                self.advance();
                map.insert(PLACEHOLDER_KEY.to_string(), Value::Ellipsis);
            } else {
                let annotations = self.parse_annotations()?;
                let key_position = self.current_token.position;
                let found = self.current_token.kind.describe();
                let key = self.parse_key()?;
                if placeholder && key == PLACEHOLDER_KEY {
                    return Err(ParseError {
                        position: key_position,
                        expected: PLACEHOLDER_CLASH.to_string(),
                        found,
                    });
                }
                self.expect(TokenKind::Colon, "':' after object key")?;

                let member = path.key(key.as_str());
                if map.contains_key(&key) {
                    self.forget(&member);
                }
                self.attach(&member, annotations);

                let value = self.parse_annotated_value(&member)?;
                map.insert(key, value);
            }

            self.end_entry(&TokenKind::RBrace, "',' or '}' after object member")?;
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Value::Object(map))
    }

    fn parse_array(&mut self, path: &NodePath) -> Result<Value, ParseError> {
        self.advance(); // Consume [
        let mut items = vec![];

        while !self.check(&TokenKind::RBracket) {
            if self.current_token.is_eof() {
                return Err(self.unexpected("']'"));
            }

            let element = path.index(items.len());
            if self.check(&TokenKind::Ellipsis) {
                self.positions.insert(element, self.current_token.position);
                self.advance();
                items.push(Value::Ellipsis);
            } else {
                items.push(self.parse_annotated_value(&element)?);
            }

            self.end_entry(&TokenKind::RBracket, "',' or ']' after array element")?;
        }

        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Value::Array(items))
    }

    /// Plain value for annotation arguments: no interpolation, no
    /// placeholders, no annotations.
    fn parse_literal(&mut self) -> Result<Value, ParseError> {
        match &self.current_token.kind {
            TokenKind::LBrace => self.nested(|p| {
                p.advance();
                let mut map = Map::new();
                while !p.check(&TokenKind::RBrace) {
                    if p.current_token.is_eof() {
                        return Err(p.unexpected("'}'"));
                    }
                    let key = p.parse_key()?;
                    p.expect(TokenKind::Colon, "':' after object key")?;
                    let value = p.parse_literal()?;
                    map.insert(key, value);
                    p.end_entry(&TokenKind::RBrace, "',' or '}' after object member")?;
                }
                p.expect(TokenKind::RBrace, "'}'")?;
                Ok(Value::Object(map))
            }),
            TokenKind::LBracket => self.nested(|p| {
                p.advance();
                let mut items = vec![];
                while !p.check(&TokenKind::RBracket) {
                    if p.current_token.is_eof() {
                        return Err(p.unexpected("']'"));
                    }
                    items.push(p.parse_literal()?);
                    p.end_entry(&TokenKind::RBracket, "',' or ']' after array element")?;
                }
                p.expect(TokenKind::RBracket, "']'")?;
                Ok(Value::Array(items))
            }),
            TokenKind::InterpolatedString(_) => {
                Err(self.unexpected("literal annotation argument (interpolation is not allowed here)"))
            }
            _ => self.parse_scalar("literal annotation argument"),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Parse primary expressions: literals, names, `$`, `self`, `super`,
    /// groups, array and object literals
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if let Some(value) = scalar_value(&self.current_token.kind) {
            self.advance();
            return Ok(Expr::Literal(value));
        }

        match &self.current_token.kind {
            TokenKind::Identifier(name) => {
                let expr = match name.as_str() {
                    "self" => Expr::Current,
                    "super" => Expr::Parent,
                    _ => Expr::Identifier(name.clone()),
                };
                self.advance();
                Ok(expr)
            }
            TokenKind::Dollar => {
                self.advance();
                Ok(Expr::Root)
            }
            TokenKind::InterpolatedString(_) => match self.bump().kind {
                TokenKind::InterpolatedString(parts) => {
                    parse_interpolated(parts, self.depth).map(Expr::Literal)
                }
                _ => unreachable!(),
            },
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_array_literal()
            }
            TokenKind::LBrace => {
                self.advance();
                self.parse_object_literal()
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_expression()?);

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RBracket) {
                return Err(self.unexpected("',' or ']'"));
            }
        }

        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        while !self.check(&TokenKind::RBrace) {
            let key = self.parse_key()?;
            self.expect(TokenKind::Colon, "':' after object key")?;
            let value = self.parse_expression()?;
            pairs.push((key, value));

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RBrace) {
                return Err(self.unexpected("',' or '}'"));
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::Object(pairs))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.advance(); // Consume (
        let mut args = vec![];

        while !self.check(&TokenKind::RParen) {
            args.push(self.parse_expression()?);

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else if !self.check(&TokenKind::RParen) {
                return Err(self.unexpected("',' or ')' in argument list"));
            }
        }

        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// Calls, `.name` and `[key]` accessors
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        let depth = self.depth;

        loop {
            if matches!(self.current_token.kind, TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket) {
                self.descend()?;
            }
            match &self.current_token.kind {
                TokenKind::LParen => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                    };
                }
                TokenKind::Dot => {
                    self.advance(); // consume '.'
                    let name = self.parse_key()?;
                    expr = Expr::Access {
                        object: Box::new(expr),
                        key: Box::new(Expr::Literal(Value::String(name))),
                    };
                }
                TokenKind::LBracket => {
                    self.advance(); // consume '['
                    let key = self.parse_expression()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Access {
                        object: Box::new(expr),
                        key: Box::new(key),
                    };
                }
                _ => break,
            }
        }
        self.depth = depth;
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current_token.kind {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.nested(Self::parse_unary)?; // Right-associative

        // Fold negative number literals
        Ok(match (op, operand) {
            (UnaryOp::Negate, Expr::Literal(Value::Integer(n))) if n != i64::MIN => {
                Expr::Literal(Value::Integer(-n))
            }
            (UnaryOp::Negate, Expr::Literal(Value::Float(n))) => Expr::Literal(Value::Float(-n)),
            (op, operand) => Expr::Unary {
                op,
                operand: Box::new(operand),
            },
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        let depth = self.depth;

        loop {
            let op = match &self.current_token.kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                TokenKind::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            self.descend()?;
            let right = self.parse_unary()?;

            left = binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        let depth = self.depth;

        loop {
            let op = match &self.current_token.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            self.descend()?;
            let right = self.parse_multiplicative()?;

            left = binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        if let Some(op) = match &self.current_token.kind {
            TokenKind::Lt => Some(BinOp::LessThan),
            TokenKind::Gt => Some(BinOp::GreaterThan),
            TokenKind::LtEq => Some(BinOp::LessEqual),
            TokenKind::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        } {
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        if let Some(op) = match &self.current_token.kind {
            TokenKind::EqEq => Some(BinOp::Equal),
            TokenKind::NotEq => Some(BinOp::NotEqual),
            _ => None,
        } {
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;
        let depth = self.depth;

        while self.check(&TokenKind::AndAnd) {
            self.advance();
            self.descend()?;
            let right = self.parse_equality()?;
            left = binary(BinOp::And, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;
        let depth = self.depth;

        while self.check(&TokenKind::OrOr) {
            self.advance();
            self.descend()?;
            let right = self.parse_and()?;
            left = binary(BinOp::Or, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    /// Right-hand side of `|`: a call, or a bare function name that becomes
    /// a call with no extra arguments.
    fn parse_filter(&mut self) -> Result<Expr, ParseError> {
        let position = self.current_token.position;
        let found = self.current_token.kind.describe();

        match self.parse_postfix()? {
            call @ Expr::Call { .. } => Ok(call),
            name @ Expr::Identifier(_) => Ok(Expr::Call {
                callee: Box::new(name),
                args: vec![],
            }),
            _ => Err(ParseError {
                position,
                expected: "function call after '|'".to_string(),
                found,
            }),
        }
    }

    fn parse_pipe(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_or()?;
        let depth = self.depth;

        while self.check(&TokenKind::Pipe) {
            self.advance();
            self.descend()?;
            let filter = self.parse_filter()?;
            left = Expr::Pipe {
                left: Box::new(left),
                filter: Box::new(filter),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.nested(Self::parse_pipe)
    }

    /// Parse a complete expression; the whole token stream must be consumed.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Eof, "end of expression")?;
        Ok(expr)
    }
}

fn eof_token(position: Position) -> Token {
    Token {
        kind: TokenKind::Eof,
        text: String::new(),
        position,
        newline_before: false,
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn scalar_value(kind: &TokenKind) -> Option<Value> {
    match kind {
        TokenKind::String(s) | TokenKind::MultilineString(s) => Some(Value::String(s.clone())),
        TokenKind::Integer(n) => Some(Value::Integer(*n)),
        TokenKind::Float(n) => Some(Value::Float(*n)),
        TokenKind::Boolean(b) => Some(Value::Boolean(*b)),
        TokenKind::Null => Some(Value::Null),
        _ => None,
    }
}

/// Parses each span's token stream with the expression grammar, continuing
/// the nesting count of the enclosing parse.
fn parse_interpolated(parts: Vec<StringPart>, depth: usize) -> Result<Value, ParseError> {
    let mut segments = Vec::with_capacity(parts.len());

    for part in parts {
        match part {
            StringPart::Text(text) => segments.push(Segment::Text(text)),
            StringPart::Expr { tokens, .. } => {
                let expr = Parser::at_depth(tokens, depth).parse()?;
                segments.push(Segment::Expr(expr));
            }
        }
    }
    Ok(Value::Interpolated(segments))
}

use std::{mem, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::{
    ast::{Position, StringPart, Token, TokenKind},
    parser::MAX_NESTING_DEPTH,
};

static JSON_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?$")
        .expect("number grammar is a valid regex")
});

/// Token-level syntax error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason} at {position}")]
pub struct LexError {
    pub position: Position,
    pub reason: LexErrorKind,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("Unterminated string: missing closing quote")]
    UnterminatedString,

    #[error("Unterminated multi-line string: missing closing \"\"\"")]
    UnterminatedMultilineString,

    #[error("Unterminated interpolation: missing '}}' to close '${{'")]
    UnterminatedInterpolation,

    #[error("Invalid escape sequence: {0}")]
    InvalidEscape(String),

    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("Invalid annotation name: '@' must be followed by an identifier")]
    InvalidAnnotationName,

    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("Interpolation nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

impl LexError {
    pub fn new(position: Position, reason: LexErrorKind) -> Self {
        LexError { position, reason }
    }
}

/// Turns Eson source text into [`Token`]s.
///
/// The lexer runs in one of two modes. Document mode reads JSON-style values,
/// where `-1` is a single number token. Expression mode is used inside
/// `${ ... }` spans, where `-` is always an operator.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    offset: usize,
    keep_comments: bool,
    dedent: bool,
    expression: bool,
    span_depth: usize,
}

/// Closing delimiter of a string literal.
#[derive(Debug, Clone, Copy)]
enum Quote {
    /// `"` followed by this many `#`
    Single(usize),

    /// `"""`
    Triple,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            offset: 0,
            keep_comments: false,
            dedent: false,
            expression: false,
            span_depth: 0,
        }
    }

    /// Lexer for a standalone expression, as found between `${` and `}`.
    pub fn expression(input: &str) -> Self {
        Lexer {
            expression: true,
            ..Lexer::new(input)
        }
    }

    /// Emit [`TokenKind::Comment`] tokens instead of discarding comments.
    pub fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Strip common indentation from multi-line strings.
    pub fn dedent_multiline(mut self, dedent: bool) -> Self {
        self.dedent = dedent;
        self
    }

    /// Lex the whole input. The last token is always [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        tracing::debug!(count = tokens.len(), "tokenized source");
        Ok(tokens)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.offset += ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column, self.offset)
    }

    fn error(&self, reason: LexErrorKind) -> LexError {
        LexError::new(self.here(), reason)
    }

    fn at_triple_quote(&self) -> bool {
        self.current_char() == Some('"')
            && self.peek_char(1) == Some('"')
            && self.peek_char(2) == Some('"')
    }

    /// True when a string opens at `offset`: optional `#`s, then `"`.
    fn at_string_open(&self, offset: usize) -> bool {
        let mut offset = offset;
        while self.peek_char(offset) == Some('#') {
            offset += 1;
        }
        self.peek_char(offset) == Some('"')
    }

    /// True when `word` starts at `offset` and is not part of a longer name.
    fn at_word(&self, offset: usize, word: &str) -> bool {
        word.chars()
            .enumerate()
            .all(|(i, ch)| self.peek_char(offset + i) == Some(ch))
            && !self
                .peek_char(offset + word.chars().count())
                .is_some_and(is_ident_char)
    }

    fn at_closing(&self, quote: Quote) -> bool {
        match quote {
            Quote::Single(hashes) => {
                self.current_char() == Some('"')
                    && (1..=hashes).all(|i| self.peek_char(i) == Some('#'))
            }
            Quote::Triple => self.at_triple_quote(),
        }
    }

    fn read_hashes(&mut self) -> usize {
        let mut hashes = 0;
        while self.current_char() == Some('#') {
            hashes += 1;
            self.advance();
        }
        hashes
    }

    /// Skips whitespace; returns whether a line break was crossed.
    fn skip_whitespace(&mut self) -> bool {
        let mut newline = false;
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                newline |= ch == '\n';
                self.advance();
            } else {
                break;
            }
        }
        newline
    }

    fn read_comment(&mut self) -> String {
        self.advance_by(2); // Consume //
        let mut text = String::new();
        while let Some(ch) = self.current_char() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text.trim().to_string()
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_ident_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let mut newline_before = false;

        loop {
            newline_before |= self.skip_whitespace();

            if self.current_char() == Some('/') && self.peek_char(1) == Some('/') {
                let start = self.here();
                let start_index = self.position;
                let text = self.read_comment();
                if self.keep_comments {
                    return Ok(self.finish(TokenKind::Comment(text), start, start_index, newline_before));
                }
                continue;
            }
            break;
        }

        let start = self.here();
        let start_index = self.position;
        let kind = self.read_token_kind(start)?;
        Ok(self.finish(kind, start, start_index, newline_before))
    }

    fn finish(&self, kind: TokenKind, position: Position, start_index: usize, newline_before: bool) -> Token {
        Token {
            kind,
            text: self.input[start_index..self.position].iter().collect(),
            position,
            newline_before,
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consumes a one- or two-character operator depending on whether the
    /// second character is `second`.
    fn pair(&mut self, second: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.peek_char(1) == Some(second) {
            self.advance_by(2);
            long
        } else {
            self.advance();
            short
        }
    }

    fn read_token_kind(&mut self, start: Position) -> Result<TokenKind, LexError> {
        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('{') => self.single(TokenKind::LBrace),
            Some('}') => self.single(TokenKind::RBrace),
            Some('[') => self.single(TokenKind::LBracket),
            Some(']') => self.single(TokenKind::RBracket),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some(':') => self.single(TokenKind::Colon),
            Some(',') => self.single(TokenKind::Comma),
            Some('$') => self.single(TokenKind::Dollar),
            Some('+') => self.single(TokenKind::Plus),
            Some('*') => self.single(TokenKind::Star),
            Some('/') => self.single(TokenKind::Slash),
            Some('%') => self.single(TokenKind::Percent),
            Some('.') => {
                if self.peek_char(1) == Some('.') && self.peek_char(2) == Some('.') {
                    self.advance_by(3);
                    TokenKind::Ellipsis
                } else {
                    self.single(TokenKind::Dot)
                }
            }
            Some('|') => self.pair('|', TokenKind::OrOr, TokenKind::Pipe),
            Some('!') => self.pair('=', TokenKind::NotEq, TokenKind::Bang),
            Some('<') => self.pair('=', TokenKind::LtEq, TokenKind::Lt),
            Some('>') => self.pair('=', TokenKind::GtEq, TokenKind::Gt),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance_by(2);
                    TokenKind::EqEq
                } else {
                    return Err(self.error(LexErrorKind::UnexpectedChar('=')));
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.advance_by(2);
                    TokenKind::AndAnd
                } else {
                    return Err(self.error(LexErrorKind::UnexpectedChar('&')));
                }
            }
            Some('-') => {
                if self.expression {
                    self.single(TokenKind::Minus)
                } else if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.read_number()?
                } else if self.at_word(1, "Infinity") {
                    self.advance_by(9);
                    TokenKind::Float(f64::NEG_INFINITY)
                } else {
                    self.single(TokenKind::Minus)
                }
            }
            Some('@') => {
                self.advance();
                if self.current_char().is_some_and(is_ident_start) {
                    TokenKind::Annotation(self.read_identifier())
                } else {
                    return Err(LexError::new(start, LexErrorKind::InvalidAnnotationName));
                }
            }
            Some('"') => {
                if self.at_triple_quote() {
                    self.read_multiline(start, false)?
                } else {
                    self.read_string(start, false)?
                }
            }
            Some('f') if self.at_string_open(1) => {
                self.advance(); // Consume f prefix
                if self.at_triple_quote() {
                    self.read_multiline(start, true)?
                } else {
                    self.read_string(start, true)?
                }
            }
            Some('r') if self.at_string_open(1) => {
                self.advance(); // Consume r prefix
                self.read_raw_string(start)?
            }
            Some(ch) if is_ident_start(ch) => {
                let ident = self.read_identifier();
                match ident.as_str() {
                    "true" => TokenKind::Boolean(true),
                    "false" => TokenKind::Boolean(false),
                    "null" => TokenKind::Null,
                    "Infinity" => TokenKind::Float(f64::INFINITY),
                    "NaN" => TokenKind::Float(f64::NAN),
                    _ => TokenKind::Identifier(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some(ch) => return Err(self.error(LexErrorKind::UnexpectedChar(ch))),
        };
        Ok(kind)
    }

    fn read_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.here();
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        // 0x / 0o / 0b integer literals
        if self.current_char() == Some('0')
            && let Some(radix) = self.peek_char(1).and_then(radix_of)
        {
            self.advance_by(2);
            let digits = self.read_identifier();
            let text = format!("{}0{}{}", number, radix_prefix(radix), digits);
            let parsed = i64::from_str_radix(&digits, radix)
                .map_err(|_| LexError::new(start, LexErrorKind::InvalidNumber(text)))?;
            return Ok(TokenKind::Integer(if number.is_empty() { parsed } else { -parsed }));
        }

        while let Some(ch) = self.current_char() {
            let take = match ch {
                '0'..='9' | 'e' | 'E' => true,
                '.' => self.peek_char(1).is_some_and(|c| c.is_ascii_digit()),
                '+' | '-' => number.ends_with(['e', 'E']),
                _ => false,
            };
            if !take {
                break;
            }
            number.push(ch);
            self.advance();
        }

        // Trailing letters make the whole run invalid rather than two tokens
        if self.current_char().is_some_and(is_ident_char) {
            number.push_str(&self.read_identifier());
            return Err(LexError::new(start, LexErrorKind::InvalidNumber(number)));
        }

        if !JSON_NUMBER.is_match(&number) {
            return Err(LexError::new(start, LexErrorKind::InvalidNumber(number)));
        }

        let is_float = number.contains(['.', 'e', 'E']);
        if !is_float && let Ok(n) = number.parse::<i64>() {
            return Ok(TokenKind::Integer(n));
        }
        number
            .parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| LexError::new(start, LexErrorKind::InvalidNumber(number)))
    }

    /// `"..."`, or `#"..."#` with any number of `#` on both sides.
    fn read_string(&mut self, start: Position, interpolated: bool) -> Result<TokenKind, LexError> {
        let hashes = self.read_hashes();
        self.advance(); // Consume opening quote
        let parts = self.read_string_body(start, Quote::Single(hashes), interpolated)?;
        Ok(string_kind(parts, false))
    }

    /// After the `r` prefix: no escapes, no spans, line breaks kept.
    fn read_raw_string(&mut self, start: Position) -> Result<TokenKind, LexError> {
        let hashes = self.read_hashes();
        self.advance(); // Consume opening quote

        let mut text = String::new();
        loop {
            match self.current_char() {
                None => return Err(LexError::new(start, LexErrorKind::UnterminatedString)),
                Some('"') if self.at_closing(Quote::Single(hashes)) => {
                    self.advance_by(hashes + 1);
                    break;
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
        Ok(TokenKind::String(text))
    }

    fn read_multiline(&mut self, start: Position, interpolated: bool) -> Result<TokenKind, LexError> {
        self.advance_by(3); // Consume opening """
        let mut parts = self.read_string_body(start, Quote::Triple, interpolated)?;
        if self.dedent {
            parts = dedent_parts(parts);
        }
        Ok(string_kind(parts, true))
    }

    /// Reads up to and including the closing delimiter.
    ///
    /// Quoted strings process JSON escapes; with no `#` delimiters they may
    /// not contain a raw line break. Multi-line strings are captured verbatim.
    fn read_string_body(
        &mut self,
        start: Position,
        quote: Quote,
        interpolated: bool,
    ) -> Result<Vec<StringPart>, LexError> {
        let mut parts = Vec::new();
        let mut text = String::new();
        let escapes = matches!(quote, Quote::Single(_));

        loop {
            match self.current_char() {
                None => {
                    let reason = match quote {
                        Quote::Triple => LexErrorKind::UnterminatedMultilineString,
                        Quote::Single(_) => LexErrorKind::UnterminatedString,
                    };
                    return Err(LexError::new(start, reason));
                }
                Some('"') if self.at_closing(quote) => {
                    match quote {
                        Quote::Single(hashes) => self.advance_by(hashes + 1),
                        Quote::Triple => self.advance_by(3),
                    }
                    break;
                }
                Some('\n') if matches!(quote, Quote::Single(0)) => {
                    return Err(LexError::new(start, LexErrorKind::UnterminatedString));
                }
                Some('\\') if escapes => {
                    if let Some(ch) = self.read_escape(interpolated)? {
                        text.push(ch);
                    }
                }
                Some('$') if interpolated && self.peek_char(1) == Some('{') => {
                    if !text.is_empty() {
                        parts.push(StringPart::Text(mem::take(&mut text)));
                    }
                    parts.push(self.read_interpolation()?);
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        if !text.is_empty() || parts.is_empty() {
            parts.push(StringPart::Text(text));
        }
        Ok(parts)
    }

    /// One escape sequence. A backslash before whitespace joins lines: the
    /// whitespace is dropped and `None` returned.
    fn read_escape(&mut self, interpolated: bool) -> Result<Option<char>, LexError> {
        let start = self.here();
        self.advance(); // Consume backslash

        if self.current_char().is_some_and(char::is_whitespace) {
            self.skip_whitespace();
            return Ok(None);
        }

        let ch = match self.current_char() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('b') => '\u{08}',
            Some('f') => '\u{0C}',
            Some('/') => '/',
            Some('"') => '"',
            Some('\\') => '\\',
            Some('$') if interpolated => '$',
            Some('u') => {
                self.advance();
                return self.read_unicode_escape(start).map(Some);
            }
            Some(ch) => {
                return Err(LexError::new(start, LexErrorKind::InvalidEscape(format!("\\{}", ch))));
            }
            None => return Err(LexError::new(start, LexErrorKind::UnterminatedString)),
        };
        self.advance();
        Ok(Some(ch))
    }

    /// After `\u`: either `{1-6 hex digits}` or four hex digits, where a high
    /// surrogate must be followed by `\u` and a low surrogate.
    fn read_unicode_escape(&mut self, start: Position) -> Result<char, LexError> {
        let invalid = |text: String| LexError::new(start, LexErrorKind::InvalidEscape(text));

        if self.current_char() == Some('{') {
            self.advance();
            let mut hex = String::new();
            while let Some(ch) = self.current_char() {
                if ch == '}' {
                    break;
                }
                hex.push(ch);
                self.advance();
            }
            if self.current_char() != Some('}') || hex.is_empty() || hex.len() > 6 {
                return Err(invalid(format!("\\u{{{}", hex)));
            }
            self.advance();
            return u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| invalid(format!("\\u{{{}}}", hex)));
        }

        let high = self.read_hex4().ok_or_else(|| invalid("\\u".to_string()))?;
        match high {
            0xD800..=0xDBFF => {
                if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
                    return Err(invalid(format!("\\u{:04X}", high)));
                }
                self.advance_by(2);
                let low = self
                    .read_hex4()
                    .filter(|low| (0xDC00..=0xDFFF).contains(low))
                    .ok_or_else(|| invalid(format!("\\u{:04X}", high)))?;
                let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                char::from_u32(code).ok_or_else(|| invalid(format!("\\u{:04X}\\u{:04X}", high, low)))
            }
            0xDC00..=0xDFFF => Err(invalid(format!("\\u{:04X}", high))),
            _ => char::from_u32(high).ok_or_else(|| invalid(format!("\\u{:04X}", high))),
        }
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let mut value = 0;
        for _ in 0..4 {
            let digit = self.current_char()?.to_digit(16)?;
            value = value * 16 + digit;
            self.advance();
        }
        Some(value)
    }

    /// Lexes one `${ ... }` span in expression mode, up to the matching `}`.
    fn read_interpolation(&mut self) -> Result<StringPart, LexError> {
        let span_start = self.here();
        if self.span_depth >= MAX_NESTING_DEPTH {
            return Err(LexError::new(span_start, LexErrorKind::NestingTooDeep(MAX_NESTING_DEPTH)));
        }
        self.advance_by(2); // Consume ${

        let saved = (self.expression, self.keep_comments);
        self.expression = true;
        self.keep_comments = false;
        self.span_depth += 1;

        let mut tokens = Vec::new();
        let mut depth = 0usize;
        let result = loop {
            let token = match self.next_token() {
                Ok(token) => token,
                Err(e) => break Err(e),
            };
            match token.kind {
                TokenKind::Eof => {
                    break Err(LexError::new(span_start, LexErrorKind::UnterminatedInterpolation));
                }
                TokenKind::RBrace if depth == 0 => {
                    tokens.push(Token {
                        kind: TokenKind::Eof,
                        text: String::new(),
                        position: token.position,
                        newline_before: token.newline_before,
                    });
                    break Ok(());
                }
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                _ => {}
            }
            tokens.push(token);
        };

        (self.expression, self.keep_comments) = saved;
        self.span_depth -= 1;
        result?;

        Ok(StringPart::Expr {
            tokens,
            position: span_start,
        })
    }
}

/// Tokenize `source` in document mode, discarding comments.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn radix_of(ch: char) -> Option<u32> {
    match ch {
        'x' | 'X' => Some(16),
        'o' | 'O' => Some(8),
        'b' | 'B' => Some(2),
        _ => None,
    }
}

fn radix_prefix(radix: u32) -> char {
    match radix {
        16 => 'x',
        8 => 'o',
        _ => 'b',
    }
}

/// A string without spans collapses to a plain string token.
fn string_kind(mut parts: Vec<StringPart>, multiline: bool) -> TokenKind {
    let has_spans = parts.iter().any(|p| matches!(p, StringPart::Expr { .. }));
    if has_spans {
        return TokenKind::InterpolatedString(parts);
    }
    let text = match parts.pop() {
        Some(StringPart::Text(text)) => text,
        _ => String::new(),
    };
    if multiline {
        TokenKind::MultilineString(text)
    } else {
        TokenKind::String(text)
    }
}

/// A character of a multi-line string, or the index of a span within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Char(char),
    Span(usize),
}

impl Piece {
    fn is_indent(self) -> bool {
        matches!(self, Piece::Char(' ' | '\t'))
    }

    fn is_blank(self) -> bool {
        matches!(self, Piece::Char(ch) if ch.is_whitespace())
    }
}

/// Applies [`dedent`] across text parts, keeping spans where they were.
/// A span counts as content, so a line holding one is never blank.
fn dedent_parts(parts: Vec<StringPart>) -> Vec<StringPart> {
    let mut pieces = Vec::new();
    let mut spans = Vec::new();
    for part in parts {
        match part {
            StringPart::Text(text) => pieces.extend(text.chars().map(Piece::Char)),
            span @ StringPart::Expr { .. } => {
                pieces.push(Piece::Span(spans.len()));
                spans.push(Some(span));
            }
        }
    }

    let mut result = Vec::new();
    let mut text = String::new();
    for piece in dedent_pieces(&pieces) {
        match piece {
            Piece::Char(ch) => text.push(ch),
            Piece::Span(index) => {
                if let Some(span) = spans.get_mut(index).and_then(Option::take) {
                    if !text.is_empty() {
                        result.push(StringPart::Text(mem::take(&mut text)));
                    }
                    result.push(span);
                }
            }
        }
    }
    if !text.is_empty() || result.is_empty() {
        result.push(StringPart::Text(text));
    }
    result
}

/// Drops a blank first and last line, then removes the indentation shared by
/// every non-blank line.
pub fn dedent(text: &str) -> String {
    let pieces: Vec<Piece> = text.chars().map(Piece::Char).collect();
    dedent_pieces(&pieces)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Char(ch) => Some(ch),
            Piece::Span(_) => None,
        })
        .collect()
}

fn dedent_pieces(pieces: &[Piece]) -> Vec<Piece> {
    let mut lines: Vec<&[Piece]> = pieces.split(|p| *p == Piece::Char('\n')).collect();

    if lines.len() > 1 && lines.first().is_some_and(|l| is_blank_line(l)) {
        lines.remove(0);
    }
    if lines.len() > 1 && lines.last().is_some_and(|l| is_blank_line(l)) {
        lines.pop();
    }

    let indent = lines
        .iter()
        .filter(|l| !is_blank_line(l))
        .map(|l| l.iter().take_while(|p| p.is_indent()).count())
        .min()
        .unwrap_or(0);

    let mut result = Vec::with_capacity(pieces.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            result.push(Piece::Char('\n'));
        }
        if !is_blank_line(line) {
            result.extend_from_slice(&line[indent.min(line.len())..]);
        }
    }
    result
}

fn is_blank_line(line: &[Piece]) -> bool {
    line.iter().all(|p| p.is_blank())
}

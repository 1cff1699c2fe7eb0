//! Trivia-preserving lexer for C# sources
//!
//! Every byte of the input ends up in exactly one token, so the parser can
//! build a lossless tree: concatenating the token texts reproduces the source.

use std::ops::Range;

use super::SyntaxKind;

/// Byte range of a token in the source
pub type Span = Range<usize>;

/// A lexer error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Result returned by the lexer
pub type LexResult = (Vec<Token>, Vec<LexError>);

/// Lex input preserving all trivia
///
/// - Whitespace and line breaks become `Whitespace`/`Newline` tokens
/// - Comments become `CommentLine`/`CommentDoc`/`CommentBlock` tokens
/// - Preprocessor lines become `Preprocessor` tokens
pub fn lex(input: &str) -> LexResult {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
    /// Only whitespace seen since the last line break
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
            at_line_start: true,
        }
    }

    fn run(mut self) -> LexResult {
        while let Some(current) = self.peek() {
            let start = self.pos;
            let kind = self.lex_token(current);
            debug_assert!(self.pos > start, "lexer must make progress");

            if kind == SyntaxKind::Newline {
                self.at_line_start = true;
            } else if kind != SyntaxKind::Whitespace {
                self.at_line_start = false;
            }

            self.tokens.push(Token::new(
                kind,
                &self.input[start..self.pos],
                start..self.pos,
            ));
        }
        (self.tokens, self.errors)
    }

    fn lex_token(&mut self, current: char) -> SyntaxKind {
        let start = self.pos;
        match current {
            '\n' => {
                self.bump();
                SyntaxKind::Newline
            }
            '\r' => {
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
                SyntaxKind::Newline
            }
            c if is_inline_whitespace(c) => {
                self.eat_while(is_inline_whitespace);
                SyntaxKind::Whitespace
            }
            '/' if self.peek_nth(1) == Some('/') => {
                let is_doc = self.input[start..].starts_with("///")
                    && !self.input[start..].starts_with("////");
                self.eat_while(|c| c != '\n' && c != '\r');
                if is_doc {
                    SyntaxKind::CommentDoc
                } else {
                    SyntaxKind::CommentLine
                }
            }
            '/' if self.peek_nth(1) == Some('*') => {
                self.bump();
                self.bump();
                match self.input[self.pos..].find("*/") {
                    Some(offset) => self.pos += offset + 2,
                    None => {
                        self.pos = self.input.len();
                        self.errors
                            .push(LexError::new("Unterminated block comment", start..self.pos));
                    }
                }
                SyntaxKind::CommentBlock
            }
            '#' if self.at_line_start => {
                self.eat_while(|c| c != '\n' && c != '\r');
                SyntaxKind::Preprocessor
            }
            '"' => {
                self.lex_string(false, false);
                SyntaxKind::StringLit
            }
            '@' | '$' if self.at_string_prefix() => {
                let mut verbatim = false;
                let mut interpolated = false;
                while let Some(c) = self.peek() {
                    match c {
                        '@' => verbatim = true,
                        '$' => interpolated = true,
                        _ => break,
                    }
                    self.bump();
                }
                self.lex_string(verbatim, interpolated);
                SyntaxKind::StringLit
            }
            '@' if self.peek_nth(1).is_some_and(is_ident_start) => {
                self.bump();
                self.eat_while(is_ident_continue);
                SyntaxKind::Ident
            }
            '\'' => {
                self.lex_char();
                SyntaxKind::CharLit
            }
            c if c.is_ascii_digit() => {
                self.lex_number();
                SyntaxKind::NumberLit
            }
            c if is_ident_start(c) => {
                self.eat_while(is_ident_continue);
                SyntaxKind::from_keyword(&self.input[start..self.pos])
                    .unwrap_or(SyntaxKind::Ident)
            }
            '=' if self.peek_nth(1) == Some('>') => {
                self.bump();
                self.bump();
                SyntaxKind::FatArrow
            }
            _ => {
                self.bump();
                match current {
                    '{' => SyntaxKind::LBrace,
                    '}' => SyntaxKind::RBrace,
                    '(' => SyntaxKind::LParen,
                    ')' => SyntaxKind::RParen,
                    '[' => SyntaxKind::LBracket,
                    ']' => SyntaxKind::RBracket,
                    '<' => SyntaxKind::LAngle,
                    '>' => SyntaxKind::RAngle,
                    ';' => SyntaxKind::Semicolon,
                    ',' => SyntaxKind::Comma,
                    '.' => SyntaxKind::Dot,
                    '=' => SyntaxKind::Equals,
                    '?' => SyntaxKind::Question,
                    ':' => SyntaxKind::Colon,
                    '~' => SyntaxKind::Tilde,
                    '+' | '-' | '*' | '/' | '%' | '!' | '&' | '|' | '^' | '#' | '@' | '$'
                    | '\\' | '`' => SyntaxKind::Punct,
                    other => {
                        self.errors.push(LexError::new(
                            format!("Unexpected character '{other}'"),
                            start..self.pos,
                        ));
                        SyntaxKind::Error
                    }
                }
            }
        }
    }

    /// `@"`, `$"`, `$@"` or `@$"` begins a string literal
    fn at_string_prefix(&self) -> bool {
        let rest = &self.input[self.pos..];
        ["@\"", "$\"", "$@\"", "@$\""]
            .iter()
            .any(|prefix| rest.starts_with(prefix))
    }

    /// Lex a string literal starting at the opening quote
    fn lex_string(&mut self, verbatim: bool, interpolated: bool) {
        let start = self.pos;
        self.bump(); // opening quote
        let mut hole_depth = 0usize;

        while let Some(c) = self.peek() {
            if hole_depth > 0 {
                match c {
                    '{' => hole_depth += 1,
                    '}' => hole_depth -= 1,
                    '"' => {
                        // Nested literal inside an interpolation hole
                        self.lex_string(false, false);
                        continue;
                    }
                    '\n' | '\r' if !verbatim => break,
                    _ => {}
                }
                self.bump();
                continue;
            }

            match c {
                '"' if verbatim && self.peek_nth(1) == Some('"') => {
                    self.bump();
                    self.bump();
                }
                '"' => {
                    self.bump();
                    return;
                }
                '\\' if !verbatim => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n' && c != '\r') {
                        self.bump();
                    }
                }
                '{' if interpolated && self.peek_nth(1) == Some('{') => {
                    self.bump();
                    self.bump();
                }
                '{' if interpolated => {
                    hole_depth = 1;
                    self.bump();
                }
                '\n' | '\r' if !verbatim => break,
                _ => self.bump(),
            }
        }

        self.errors
            .push(LexError::new("Unterminated string literal", start..self.pos));
    }

    fn lex_char(&mut self) {
        let start = self.pos;
        self.bump(); // opening quote
        while let Some(c) = self.peek() {
            match c {
                '\'' => {
                    self.bump();
                    return;
                }
                '\\' => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n' && c != '\r') {
                        self.bump();
                    }
                }
                '\n' | '\r' => break,
                _ => self.bump(),
            }
        }
        self.errors
            .push(LexError::new("Unterminated character literal", start..self.pos));
    }

    fn lex_number(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump();
            } else if c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

fn is_inline_whitespace(c: char) -> bool {
    c.is_whitespace() && c != '\n' && c != '\r'
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

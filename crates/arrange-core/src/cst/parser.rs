//! Hierarchical parser for C# declarations
//!
//! Builds a lossless CST from the token stream. Only the declaration
//! structure is parsed (namespaces, usings, types and their members); method
//! bodies, initializers and accessor lists are kept as opaque, balanced token
//! runs.
//!
//! Trivia ownership follows the usual leading/trailing split: a member node
//! starts with all trivia since the previous member and ends with the trivia
//! up to and including the first line break after its last token. Moving a
//! member node therefore moves its documentation comments with it.

use std::ops::Range;

use rowan::{GreenNode, GreenNodeBuilder};

use super::lexer::{Token, lex};
use super::{SyntaxKind, SyntaxNode};

/// A parse error with its byte range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub span: Range<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Result of parsing a document
#[derive(Debug, Clone)]
pub struct Parse {
    green: GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    /// Red tree root for traversal
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Lexer and parser errors, in source order
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse C# source into a hierarchical CST
///
/// The tree is lossless for any input: `parse(s).syntax().text() == s`.
///
/// # Example
///
/// ```
/// use arrange_core::cst::{SyntaxKind, parse};
///
/// let source = "class Point { int y; int x; }";
/// let parse = parse(source);
/// assert!(!parse.has_errors());
/// assert_eq!(parse.syntax().text().to_string(), source);
///
/// let class = parse.syntax().first_child().unwrap();
/// assert_eq!(class.kind(), SyntaxKind::ClassDecl);
/// ```
pub fn parse(source: &str) -> Parse {
    let (tokens, lex_errors) = lex(source);
    let mut errors: Vec<ParseError> = lex_errors
        .into_iter()
        .map(|e| ParseError::new(e.message, e.span))
        .collect();

    let mut parser = Parser::new(&tokens);
    parser.parse_source_file();
    let (green, parse_errors) = parser.finish();

    errors.extend(parse_errors);
    errors.sort_by_key(|e| e.span.start);
    Parse { green, errors }
}

/// Declaration shape decided by lookahead before the node is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Using,
    Namespace,
    Type(SyntaxKind),
    Enum,
    Delegate,
    Event,
    Field,
    Property,
    Constructor,
    Destructor,
    Method,
    Operator,
    Indexer,
    Unknown,
}

/// Token stream parser
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> (GreenNode, Vec<ParseError>) {
        (self.builder.finish(), self.errors)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    fn parse_source_file(&mut self) {
        self.builder.start_node(SyntaxKind::SourceFile.into());
        self.parse_declarations(false);

        // Stray tokens after a file-level closing brace
        while self.pos < self.tokens.len() {
            self.error_token("Unexpected token at end of file");
        }

        self.builder.finish_node();
    }

    /// Parse declarations until EOF or, inside a braced body, until `}`
    ///
    /// The trivia in front of the closing brace stays with the container.
    fn parse_declarations(&mut self, in_braces: bool) {
        loop {
            match self.peek_kind() {
                None => {
                    self.bump_trivia();
                    break;
                }
                Some(SyntaxKind::RBrace) if in_braces => {
                    self.bump_trivia();
                    break;
                }
                Some(SyntaxKind::RBrace) => {
                    self.bump_trivia();
                    self.error_token("Unmatched '}'");
                }
                Some(_) => {
                    let before = self.pos;
                    self.parse_declaration();
                    if self.pos == before {
                        self.error_token("Unexpected token");
                    }
                }
            }
        }
    }

    fn parse_declaration(&mut self) {
        match self.classify() {
            Shape::Using => self.parse_using(),
            Shape::Namespace => self.parse_namespace(),
            Shape::Type(kind) => self.parse_type_decl(kind),
            Shape::Enum => self.parse_enum(),
            Shape::Delegate => self.parse_delegate(),
            Shape::Event => self.parse_event(),
            Shape::Field => self.parse_field(),
            Shape::Property => self.parse_property(),
            Shape::Constructor => self.parse_constructor(),
            Shape::Destructor => self.parse_destructor(),
            Shape::Method => self.parse_method(),
            Shape::Operator => self.parse_signature_member(SyntaxKind::OperatorDecl),
            Shape::Indexer => self.parse_signature_member(SyntaxKind::IndexerDecl),
            Shape::Unknown => self.parse_unknown(),
        }
    }

    /// Open a declaration node: leading trivia, attributes and modifiers
    fn start_declaration(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
        self.bump_trivia();
        while self.at(SyntaxKind::LBracket) {
            self.bump_trivia();
            self.builder.start_node(SyntaxKind::AttributeList.into());
            self.bump_balanced();
            self.builder.finish_node();
        }
        while self.at(SyntaxKind::Modifier)
            || (self.at_contextual("global") && self.nth_kind(1) == Some(SyntaxKind::UsingKw))
        {
            self.bump_trivia();
            self.bump();
        }
    }

    /// Close a declaration node after eating its trailing trivia
    fn finish_declaration(&mut self) {
        self.eat_trailing_trivia();
        self.builder.finish_node();
    }

    /// using [static] [Alias =] Target;
    fn parse_using(&mut self) {
        self.start_declaration(SyntaxKind::UsingDirective);
        self.expect(SyntaxKind::UsingKw);
        if self.at_text(SyntaxKind::Modifier, "static") {
            self.bump_trivia();
            self.bump();
        }

        if self.at(SyntaxKind::Ident) && self.nth_kind(1) == Some(SyntaxKind::Equals) {
            self.parse_name();
            self.expect(SyntaxKind::Equals);
        }

        self.bump_trivia();
        self.builder.start_node(SyntaxKind::TypeRef.into());
        self.bump_until(&[SyntaxKind::Semicolon], false);
        self.builder.finish_node();
        self.expect(SyntaxKind::Semicolon);
        self.finish_declaration();
    }

    /// namespace A.B { ... } or file-scoped namespace A.B;
    fn parse_namespace(&mut self) {
        self.start_declaration(SyntaxKind::NamespaceDecl);
        self.expect(SyntaxKind::NamespaceKw);
        self.parse_name();

        if self.at(SyntaxKind::Semicolon) {
            self.bump_trivia();
            self.bump();
            self.eat_trailing_trivia();
            self.parse_declarations(false);
            self.builder.finish_node();
            return;
        }

        if self.expect(SyntaxKind::LBrace) {
            self.eat_trailing_trivia();
            self.parse_declarations(true);
            self.expect(SyntaxKind::RBrace);
        }
        self.eat_optional(SyntaxKind::Semicolon);
        self.finish_declaration();
    }

    /// class/struct/interface/record declarations with their members
    fn parse_type_decl(&mut self, kind: SyntaxKind) {
        self.start_declaration(kind);

        // `record` and `record struct` are contextual
        if self.at_contextual("record") {
            self.bump_trivia();
            self.bump();
        }
        if self.at(SyntaxKind::ClassKw)
            || self.at(SyntaxKind::StructKw)
            || self.at(SyntaxKind::InterfaceKw)
        {
            self.bump_trivia();
            self.bump();
        }

        self.parse_name();
        if self.at(SyntaxKind::LAngle) {
            self.bump_trivia();
            self.builder.start_node(SyntaxKind::TypeParamList.into());
            self.bump_balanced();
            self.builder.finish_node();
        }

        // Primary constructor parameters, base list and constraints
        self.bump_until(&[SyntaxKind::LBrace, SyntaxKind::Semicolon], false);

        if self.at(SyntaxKind::Semicolon) {
            self.bump_trivia();
            self.bump();
        } else if self.expect(SyntaxKind::LBrace) {
            self.eat_trailing_trivia();
            self.parse_declarations(true);
            self.expect(SyntaxKind::RBrace);
            self.eat_optional(SyntaxKind::Semicolon);
        }
        self.finish_declaration();
    }

    /// enum Name [: base] { A, B }
    fn parse_enum(&mut self) {
        self.start_declaration(SyntaxKind::EnumDecl);
        self.expect(SyntaxKind::EnumKw);
        self.parse_name();
        self.bump_until(&[SyntaxKind::LBrace, SyntaxKind::Semicolon], false);
        self.parse_body(SyntaxKind::Block);
        self.eat_optional(SyntaxKind::Semicolon);
        self.finish_declaration();
    }

    /// delegate Ret Name(params);
    fn parse_delegate(&mut self) {
        self.start_declaration(SyntaxKind::DelegateDecl);
        self.expect(SyntaxKind::DelegateKw);
        self.parse_type_ref();
        self.parse_name();
        self.bump_until(&[SyntaxKind::Semicolon], false);
        self.expect(SyntaxKind::Semicolon);
        self.finish_declaration();
    }

    /// event Type a, b; or event Type Name { add; remove; }
    fn parse_event(&mut self) {
        self.start_declaration(SyntaxKind::EventDecl);
        self.expect(SyntaxKind::EventKw);
        self.parse_type_ref();

        let after_name = self
            .next_significant(self.pos)
            .and_then(|i| self.skip_dotted_name(i));
        let is_accessor_form = after_name
            .and_then(|end| self.significant_kind_at(end))
            .is_some_and(|kind| kind == SyntaxKind::LBrace);

        if is_accessor_form {
            self.parse_name();
            self.bump_trivia();
            self.builder.start_node(SyntaxKind::AccessorList.into());
            self.bump_balanced();
            self.builder.finish_node();
        } else {
            self.parse_declarators();
            self.expect(SyntaxKind::Semicolon);
        }
        self.finish_declaration();
    }

    /// Type a = 1, b;
    fn parse_field(&mut self) {
        self.start_declaration(SyntaxKind::FieldDecl);
        self.parse_type_ref();
        self.parse_declarators();
        self.expect(SyntaxKind::Semicolon);
        self.finish_declaration();
    }

    fn parse_declarators(&mut self) {
        loop {
            self.bump_trivia();
            self.builder.start_node(SyntaxKind::VariableDeclarator.into());
            self.parse_name();
            if self.at(SyntaxKind::LBracket) {
                // Fixed-size buffer length
                self.bump_trivia();
                self.bump_balanced();
            }
            if self.at(SyntaxKind::Equals) {
                self.parse_initializer();
            }
            self.builder.finish_node();

            if self.at(SyntaxKind::Comma) {
                self.bump_trivia();
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Type Name { get; set; } [= value;] or Type Name => expr;
    fn parse_property(&mut self) {
        self.start_declaration(SyntaxKind::PropertyDecl);
        self.parse_type_ref();
        self.parse_name();

        if self.at(SyntaxKind::LBrace) {
            self.bump_trivia();
            self.builder.start_node(SyntaxKind::AccessorList.into());
            self.bump_balanced();
            self.builder.finish_node();
            if self.at(SyntaxKind::Equals) {
                self.parse_initializer();
                self.expect(SyntaxKind::Semicolon);
            }
        } else {
            self.parse_body(SyntaxKind::AccessorList);
        }
        self.finish_declaration();
    }

    /// Name(params) [: base(...)] body
    fn parse_constructor(&mut self) {
        self.start_declaration(SyntaxKind::ConstructorDecl);
        self.parse_name();
        self.parse_param_list();
        self.bump_until(&[SyntaxKind::LBrace, SyntaxKind::FatArrow, SyntaxKind::Semicolon], false);
        self.parse_body(SyntaxKind::Block);
        self.finish_declaration();
    }

    /// ~Name() body
    fn parse_destructor(&mut self) {
        self.start_declaration(SyntaxKind::DestructorDecl);
        self.expect(SyntaxKind::Tilde);
        self.parse_name();
        self.parse_param_list();
        self.parse_body(SyntaxKind::Block);
        self.finish_declaration();
    }

    /// Ret Name<T>(params) [where ...] body
    fn parse_method(&mut self) {
        self.start_declaration(SyntaxKind::MethodDecl);
        self.parse_type_ref();
        self.parse_name();
        if self.at(SyntaxKind::LAngle) {
            self.bump_trivia();
            self.builder.start_node(SyntaxKind::TypeParamList.into());
            self.bump_balanced();
            self.builder.finish_node();
        }
        self.parse_param_list();
        self.bump_until(&[SyntaxKind::LBrace, SyntaxKind::FatArrow, SyntaxKind::Semicolon], false);
        self.parse_body(SyntaxKind::Block);
        self.finish_declaration();
    }

    /// Operators and indexers: signature tokens up to the body
    fn parse_signature_member(&mut self, kind: SyntaxKind) {
        self.start_declaration(kind);
        self.bump_until(&[SyntaxKind::LBrace, SyntaxKind::FatArrow, SyntaxKind::Semicolon], false);
        let body_kind = if kind == SyntaxKind::IndexerDecl {
            SyntaxKind::AccessorList
        } else {
            SyntaxKind::Block
        };
        self.parse_body(body_kind);
        self.finish_declaration();
    }

    /// Anything we cannot classify: consume up to `;` or a closed block
    fn parse_unknown(&mut self) {
        let start = self.peek_span_start();
        self.start_declaration(SyntaxKind::UnknownMember);
        self.bump_until(&[SyntaxKind::Semicolon], true);
        self.eat_optional(SyntaxKind::Semicolon);
        let end = self.pos_offset();
        self.errors
            .push(ParseError::new("Unrecognized declaration", start..end));
        self.finish_declaration();
    }

    // ------------------------------------------------------------------
    // Declaration parts
    // ------------------------------------------------------------------

    fn parse_name(&mut self) {
        self.bump_trivia();
        if !self.at(SyntaxKind::Ident) {
            self.error_here("Expected identifier");
            return;
        }
        let end = self
            .skip_dotted_name(self.pos)
            .unwrap_or(self.pos + 1);
        self.builder.start_node(SyntaxKind::Name.into());
        self.bump_to(end);
        self.builder.finish_node();
    }

    fn parse_type_ref(&mut self) {
        self.bump_trivia();
        match self.skip_type(self.pos) {
            Some(end) => {
                self.builder.start_node(SyntaxKind::TypeRef.into());
                self.bump_to(end);
                self.builder.finish_node();
            }
            None => self.error_here("Expected type"),
        }
    }

    fn parse_param_list(&mut self) {
        self.bump_trivia();
        if self.at(SyntaxKind::LParen) {
            self.builder.start_node(SyntaxKind::ParamList.into());
            self.bump_balanced();
            self.builder.finish_node();
        } else {
            self.error_here("Expected '('");
        }
    }

    /// `= value` up to the next `,` or `;` at depth zero
    fn parse_initializer(&mut self) {
        self.bump_trivia();
        self.builder.start_node(SyntaxKind::Initializer.into());
        self.bump();
        self.bump_until(&[SyntaxKind::Comma, SyntaxKind::Semicolon], false);
        self.builder.finish_node();
    }

    /// `{ ... }` as `block_kind`, `=> expr;`, or a bare `;`
    fn parse_body(&mut self, block_kind: SyntaxKind) {
        match self.peek_kind() {
            Some(SyntaxKind::LBrace) => {
                self.bump_trivia();
                self.builder.start_node(block_kind.into());
                self.bump_balanced();
                self.builder.finish_node();
            }
            Some(SyntaxKind::FatArrow) => {
                self.bump_trivia();
                self.builder.start_node(SyntaxKind::ExpressionBody.into());
                self.bump();
                self.bump_until(&[SyntaxKind::Semicolon], false);
                self.builder.finish_node();
                self.expect(SyntaxKind::Semicolon);
            }
            Some(SyntaxKind::Semicolon) => {
                self.bump_trivia();
                self.bump();
            }
            _ => self.error_here("Expected body, '=>' or ';'"),
        }
    }

    // ------------------------------------------------------------------
    // Lookahead classification
    // ------------------------------------------------------------------

    /// Decide the shape of the declaration starting at the next significant token
    fn classify(&self) -> Shape {
        let Some(mut i) = self.next_significant(self.pos) else {
            return Shape::Unknown;
        };

        while self.kind_at(i) == Some(SyntaxKind::LBracket) {
            match self.skip_balanced(i).and_then(|end| self.next_significant(end)) {
                Some(next) => i = next,
                None => return Shape::Unknown,
            }
        }

        if self.text_at(i) == Some("global")
            && self.significant_kind_at(i + 1) == Some(SyntaxKind::UsingKw)
        {
            return Shape::Using;
        }

        match self.kind_at(i) {
            Some(SyntaxKind::UsingKw) => return Shape::Using,
            Some(SyntaxKind::NamespaceKw) => return Shape::Namespace,
            _ => {}
        }

        while self.kind_at(i) == Some(SyntaxKind::Modifier) {
            match self.next_significant(i + 1) {
                Some(next) => i = next,
                None => return Shape::Unknown,
            }
        }

        match self.kind_at(i) {
            Some(SyntaxKind::ClassKw) => return Shape::Type(SyntaxKind::ClassDecl),
            Some(SyntaxKind::StructKw) => return Shape::Type(SyntaxKind::StructDecl),
            Some(SyntaxKind::InterfaceKw) => return Shape::Type(SyntaxKind::InterfaceDecl),
            Some(SyntaxKind::EnumKw) => return Shape::Enum,
            Some(SyntaxKind::DelegateKw) => return Shape::Delegate,
            Some(SyntaxKind::EventKw) => return Shape::Event,
            Some(SyntaxKind::Tilde) => return Shape::Destructor,
            Some(SyntaxKind::OperatorKw) => return Shape::Operator,
            _ => {}
        }

        if self.text_at(i) == Some("record") {
            match self.significant_kind_at(i + 1) {
                Some(SyntaxKind::StructKw) => return Shape::Type(SyntaxKind::StructDecl),
                Some(SyntaxKind::ClassKw) | Some(SyntaxKind::Ident) => {
                    return Shape::Type(SyntaxKind::ClassDecl);
                }
                _ => {}
            }
        }

        if self.kind_at(i) == Some(SyntaxKind::Ident)
            && self.significant_kind_at(i + 1) == Some(SyntaxKind::LParen)
        {
            return Shape::Constructor;
        }

        let Some(after_type) = self.skip_type(i).and_then(|end| self.next_significant(end)) else {
            return Shape::Unknown;
        };

        match self.kind_at(after_type) {
            Some(SyntaxKind::ThisKw) => Shape::Indexer,
            Some(SyntaxKind::OperatorKw) => Shape::Operator,
            Some(SyntaxKind::Ident) => {
                let Some(mut next) = self
                    .skip_dotted_name(after_type)
                    .and_then(|end| self.next_significant(end))
                else {
                    return Shape::Unknown;
                };
                if self.kind_at(next) == Some(SyntaxKind::LAngle) {
                    match self.skip_balanced(next).and_then(|end| self.next_significant(end)) {
                        Some(after_generics) => next = after_generics,
                        None => return Shape::Unknown,
                    }
                }
                match self.kind_at(next) {
                    Some(SyntaxKind::LParen) => Shape::Method,
                    Some(SyntaxKind::LBrace) | Some(SyntaxKind::FatArrow) => Shape::Property,
                    Some(SyntaxKind::Equals)
                    | Some(SyntaxKind::Comma)
                    | Some(SyntaxKind::Semicolon)
                    | Some(SyntaxKind::LBracket) => Shape::Field,
                    _ => Shape::Unknown,
                }
            }
            _ => Shape::Unknown,
        }
    }

    /// Skip a type reference starting at `i`, returning the index after it
    fn skip_type(&self, i: usize) -> Option<usize> {
        let mut end = match self.kind_at(i)? {
            SyntaxKind::LParen => self.skip_balanced(i)?,
            SyntaxKind::Ident => {
                let mut end = i + 1;
                loop {
                    let Some(next) = self.next_significant(end) else {
                        break;
                    };
                    match self.kind_at(next) {
                        Some(SyntaxKind::LAngle) => end = self.skip_balanced(next)?,
                        Some(SyntaxKind::Dot)
                            if self.significant_kind_at(next + 1) == Some(SyntaxKind::Ident) =>
                        {
                            end = self.next_significant(next + 1)? + 1;
                        }
                        Some(SyntaxKind::Colon)
                            if self.significant_kind_at(next + 1) == Some(SyntaxKind::Colon) =>
                        {
                            // global::System.String
                            let second = self.next_significant(next + 1)?;
                            let ident = self.next_significant(second + 1)?;
                            if self.kind_at(ident) != Some(SyntaxKind::Ident) {
                                break;
                            }
                            end = ident + 1;
                        }
                        _ => break,
                    }
                }
                end
            }
            _ => return None,
        };

        // Nullable, pointer and array suffixes
        while let Some(next) = self.next_significant(end) {
            match self.kind_at(next) {
                Some(SyntaxKind::Question) => end = next + 1,
                Some(SyntaxKind::Punct) if self.text_at(next) == Some("*") => end = next + 1,
                Some(SyntaxKind::LBracket) if self.is_rank_specifier(next) => {
                    end = self.skip_balanced(next)?;
                }
                _ => break,
            }
        }
        Some(end)
    }

    /// `[]` or `[,,]` (as opposed to an attribute or fixed-buffer size)
    fn is_rank_specifier(&self, open: usize) -> bool {
        let mut i = open + 1;
        while let Some(next) = self.next_significant(i) {
            match self.kind_at(next) {
                Some(SyntaxKind::Comma) => i = next + 1,
                Some(SyntaxKind::RBracket) => return true,
                _ => return false,
            }
        }
        false
    }

    /// Skip `Ident(.Ident)*` starting at `i`
    fn skip_dotted_name(&self, i: usize) -> Option<usize> {
        if self.kind_at(i) != Some(SyntaxKind::Ident) {
            return None;
        }
        let mut end = i + 1;
        while let Some(dot) = self.next_significant(end) {
            if self.kind_at(dot) != Some(SyntaxKind::Dot) {
                break;
            }
            match self.next_significant(dot + 1) {
                Some(ident) if self.kind_at(ident) == Some(SyntaxKind::Ident) => end = ident + 1,
                _ => break,
            }
        }
        Some(end)
    }

    /// Skip a balanced `()`, `[]`, `{}` or `<>` group opening at `i`
    fn skip_balanced(&self, i: usize) -> Option<usize> {
        let open = self.kind_at(i)?;
        let close = closing_of(open)?;
        let mut depth = 0usize;
        for (offset, token) in self.tokens[i..].iter().enumerate() {
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
                if depth == 0 {
                    return Some(i + offset + 1);
                }
            } else if open == SyntaxKind::LAngle
                && matches!(
                    token.kind,
                    SyntaxKind::Semicolon | SyntaxKind::LBrace | SyntaxKind::RBrace
                )
            {
                // `<` was a comparison, not a generic list
                return None;
            }
        }
        None
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn kind_at(&self, i: usize) -> Option<SyntaxKind> {
        self.tokens.get(i).map(|t| t.kind)
    }

    fn text_at(&self, i: usize) -> Option<&str> {
        self.tokens.get(i).map(|t| t.text.as_str())
    }

    fn next_significant(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_trivia())
    }

    fn significant_kind_at(&self, from: usize) -> Option<SyntaxKind> {
        self.next_significant(from).and_then(|i| self.kind_at(i))
    }

    /// Kind of the next significant token
    fn peek_kind(&self) -> Option<SyntaxKind> {
        self.significant_kind_at(self.pos)
    }

    /// Kind of the n-th significant token after the next one
    fn nth_kind(&self, n: usize) -> Option<SyntaxKind> {
        let mut i = self.next_significant(self.pos)?;
        for _ in 0..n {
            i = self.next_significant(i + 1)?;
        }
        self.kind_at(i)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn at_text(&self, kind: SyntaxKind, text: &str) -> bool {
        self.next_significant(self.pos)
            .is_some_and(|i| self.kind_at(i) == Some(kind) && self.text_at(i) == Some(text))
    }

    /// Identifier acting as a keyword in this position
    fn at_contextual(&self, keyword: &str) -> bool {
        self.at_text(SyntaxKind::Ident, keyword)
    }

    fn pos_offset(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some(token) => token.span.start,
            None => self.tokens.last().map_or(0, |t| t.span.end),
        }
    }

    fn peek_span_start(&self) -> usize {
        self.next_significant(self.pos)
            .map_or_else(|| self.pos_offset(), |i| self.tokens[i].span.start)
    }

    fn bump(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.builder.token(token.kind.into(), &token.text);
            self.pos += 1;
        }
    }

    fn bump_to(&mut self, end: usize) {
        while self.pos < end && self.pos < self.tokens.len() {
            self.bump();
        }
    }

    fn bump_trivia(&mut self) {
        while self.kind_at(self.pos).is_some_and(SyntaxKind::is_trivia) {
            self.bump();
        }
    }

    /// Same-line trivia plus the first line break
    fn eat_trailing_trivia(&mut self) {
        while let Some(kind) = self.kind_at(self.pos) {
            match kind {
                SyntaxKind::Whitespace
                | SyntaxKind::CommentLine
                | SyntaxKind::CommentDoc
                | SyntaxKind::CommentBlock => self.bump(),
                SyntaxKind::Newline => {
                    self.bump();
                    break;
                }
                _ => break,
            }
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump_trivia();
            self.bump();
            true
        } else {
            self.error_here(&format!("Expected {kind}"));
            false
        }
    }

    fn eat_optional(&mut self, kind: SyntaxKind) {
        if self.at(kind) {
            self.bump_trivia();
            self.bump();
        }
    }

    /// Bump a balanced group starting at the current token
    fn bump_balanced(&mut self) {
        let start = self.pos_offset();
        match self.skip_balanced(self.pos) {
            Some(end) => self.bump_to(end),
            None => {
                self.bump_to(self.tokens.len());
                let end = self.pos_offset();
                self.errors.push(ParseError::new("Unclosed delimiter", start..end));
            }
        }
    }

    /// Bump tokens until one of `stops` at nesting depth zero
    ///
    /// Never consumes a `}` that closes an enclosing body. With
    /// `stop_after_block`, a top-level `{ ... }` group ends the run.
    fn bump_until(&mut self, stops: &[SyntaxKind], stop_after_block: bool) {
        let mut depth = 0usize;
        while let Some(next) = self.next_significant(self.pos) {
            let kind = self.tokens[next].kind;
            if depth == 0 && (stops.contains(&kind) || kind == SyntaxKind::RBrace) {
                break;
            }
            match kind {
                SyntaxKind::LParen | SyntaxKind::LBracket | SyntaxKind::LBrace => depth += 1,
                SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.bump_to(next + 1);
            if stop_after_block && depth == 0 && kind == SyntaxKind::RBrace {
                break;
            }
        }
    }

    fn error_here(&mut self, message: &str) {
        let start = self.peek_span_start();
        let end = self
            .next_significant(self.pos)
            .map_or(start, |i| self.tokens[i].span.end);
        self.errors.push(ParseError::new(message, start..end));
    }

    /// Wrap the current token in an error node
    fn error_token(&mut self, message: &str) {
        if let Some(token) = self.tokens.get(self.pos) {
            self.errors
                .push(ParseError::new(message, token.span.clone()));
            self.builder.start_node(SyntaxKind::Error.into());
            self.bump();
            self.builder.finish_node();
        }
    }
}

fn closing_of(open: SyntaxKind) -> Option<SyntaxKind> {
    match open {
        SyntaxKind::LParen => Some(SyntaxKind::RParen),
        SyntaxKind::LBracket => Some(SyntaxKind::RBracket),
        SyntaxKind::LBrace => Some(SyntaxKind::RBrace),
        SyntaxKind::LAngle => Some(SyntaxKind::RAngle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> SyntaxNode {
        let parse = parse(source);
        assert!(parse.errors().is_empty(), "Parse errors: {:?}", parse.errors());
        let root = parse.syntax();
        assert_eq!(root.text().to_string(), source);
        root
    }

    fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    #[test]
    fn test_parse_members() {
        let source = r#"class Sample
{
    public event EventHandler Changed;
    private int _count = 0, _total;
    public string Name { get; set; } = "";
    public Sample(int count) : base() { _count = count; }
    ~Sample() { }
    public T Get<T>(string key) where T : class => default;
    public static Sample operator +(Sample a, Sample b) => a;
    public int this[int index] { get { return index; } }
    private enum Mode { On, Off }
    private struct Inner { }
    private interface IThing { }
    public delegate void Handler(object sender);
}
"#;
        let root = parse_ok(source);
        let class = root.first_child().unwrap();
        assert_eq!(class.kind(), SyntaxKind::ClassDecl);
        assert_eq!(
            child_kinds(&class),
            vec![
                SyntaxKind::Name,
                SyntaxKind::EventDecl,
                SyntaxKind::FieldDecl,
                SyntaxKind::PropertyDecl,
                SyntaxKind::ConstructorDecl,
                SyntaxKind::DestructorDecl,
                SyntaxKind::MethodDecl,
                SyntaxKind::OperatorDecl,
                SyntaxKind::IndexerDecl,
                SyntaxKind::EnumDecl,
                SyntaxKind::StructDecl,
                SyntaxKind::InterfaceDecl,
                SyntaxKind::DelegateDecl,
            ]
        );
    }

    #[test]
    fn test_member_owns_comments_and_line_break() {
        let source = "class A\n{\n    /// <summary>Doc</summary>\n    int x; // trailing\n\n    int y;\n}\n";
        let root = parse_ok(source);
        let class = root.first_child().unwrap();
        let fields: Vec<String> = class
            .children()
            .filter(|n| n.kind() == SyntaxKind::FieldDecl)
            .map(|n| n.text().to_string())
            .collect();
        assert_eq!(
            fields,
            vec![
                "    /// <summary>Doc</summary>\n    int x; // trailing\n".to_string(),
                "\n    int y;\n".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_namespaces_and_usings() {
        let source = "using System;\nusing static System.Math;\nusing IO = System.IO;\nglobal using System.Linq;\n\nnamespace A.B\n{\n    class C { }\n}\n";
        let root = parse_ok(source);
        assert_eq!(
            child_kinds(&root),
            vec![
                SyntaxKind::UsingDirective,
                SyntaxKind::UsingDirective,
                SyntaxKind::UsingDirective,
                SyntaxKind::UsingDirective,
                SyntaxKind::NamespaceDecl,
            ]
        );
        let namespace = root.children().last().unwrap();
        assert!(namespace.children().any(|n| n.kind() == SyntaxKind::ClassDecl));
    }

    #[test]
    fn test_file_scoped_namespace_contains_rest_of_file() {
        let source = "namespace App;\n\nclass A { }\nstruct B { }\n";
        let root = parse_ok(source);
        let namespace = root.first_child().unwrap();
        assert_eq!(namespace.kind(), SyntaxKind::NamespaceDecl);
        assert_eq!(
            child_kinds(&namespace),
            vec![SyntaxKind::Name, SyntaxKind::ClassDecl, SyntaxKind::StructDecl]
        );
    }

    #[test]
    fn test_generic_and_array_fields() {
        let source = "class A { Dictionary<string, List<int>> map; int[] values; int? maybe; (int, string) pair; }";
        let root = parse_ok(source);
        let class = root.first_child().unwrap();
        assert_eq!(
            class
                .children()
                .filter(|n| n.kind() == SyntaxKind::FieldDecl)
                .count(),
            4
        );
    }

    #[test]
    fn test_attributes_belong_to_member() {
        let source = "class A\n{\n    [Obsolete(\"no\")]\n    [Test] public void M() { }\n}\n";
        let root = parse_ok(source);
        let method = root
            .descendants()
            .find(|n| n.kind() == SyntaxKind::MethodDecl)
            .unwrap();
        assert_eq!(
            method
                .children()
                .filter(|n| n.kind() == SyntaxKind::AttributeList)
                .count(),
            2
        );
    }

    #[test]
    fn test_records() {
        let source = "record Person(string Name);\nrecord struct Point(int X, int Y) { }\n";
        let root = parse_ok(source);
        assert_eq!(
            child_kinds(&root),
            vec![SyntaxKind::ClassDecl, SyntaxKind::StructDecl]
        );
    }

    #[test]
    fn test_unknown_member_is_reported_and_lossless() {
        let source = "class A\n{\n    int x;\n    42 + 1;\n    int y;\n}\n";
        let parse = parse(source);
        assert_eq!(parse.errors().len(), 1);
        assert_eq!(parse.syntax().text().to_string(), source);
        let class = parse.syntax().first_child().unwrap();
        assert!(class.children().any(|n| n.kind() == SyntaxKind::UnknownMember));
        assert_eq!(
            class
                .children()
                .filter(|n| n.kind() == SyntaxKind::FieldDecl)
                .count(),
            2
        );
    }

    #[test]
    fn test_malformed_input_is_lossless() {
        for source in [
            "class",
            "class A {",
            "}}} class A { void M( }",
            "namespace { using ; }",
            "class A { int x = ; public }",
            "/* open",
        ] {
            let parse = parse(source);
            assert_eq!(parse.syntax().text().to_string(), source, "for {source:?}");
            assert!(parse.has_errors(), "expected errors for {source:?}");
        }
    }
}

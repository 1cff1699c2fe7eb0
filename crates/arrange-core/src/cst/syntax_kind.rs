//! Syntax kind enumeration for the C# CST
//!
//! This module defines all possible node and token types in the syntax tree.

use std::fmt;

/// Syntax kind for C# language elements
///
/// The numeric ranges group the kinds:
/// - Trivia (0-9)
/// - Keywords (10-99)
/// - Punctuation (100-149)
/// - Literals & identifiers (150-199)
/// - Nodes (200-399)
/// - Special (400+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Whitespace (spaces, tabs)
    Whitespace = 0,
    /// Line break (`\n`, `\r\n` or `\r`)
    Newline = 1,
    /// Line comment starting with //
    CommentLine = 2,
    /// Documentation comment starting with ///
    CommentDoc = 3,
    /// Block comment /* ... */
    CommentBlock = 4,
    /// Preprocessor directive line (#region, #if, ...)
    Preprocessor = 5,

    // ==================
    // Keywords (10-99)
    // ==================
    ClassKw = 10,
    StructKw = 11,
    InterfaceKw = 12,
    EnumKw = 13,
    DelegateKw = 14,
    EventKw = 15,
    UsingKw = 16,
    NamespaceKw = 17,
    OperatorKw = 18,
    ThisKw = 19,
    /// Declaration modifier (public, static, readonly, ...)
    Modifier = 20,

    // ==================
    // Punctuation (100-149)
    // ==================
    LBrace = 100,
    RBrace = 101,
    LParen = 102,
    RParen = 103,
    LBracket = 104,
    RBracket = 105,
    LAngle = 106,
    RAngle = 107,
    Semicolon = 108,
    Comma = 109,
    Dot = 110,
    Equals = 111,
    /// `=>`
    FatArrow = 112,
    Question = 113,
    Colon = 114,
    Tilde = 115,
    /// Any other operator character
    Punct = 116,

    // ==================
    // Literals & Identifiers (150-199)
    // ==================
    Ident = 150,
    StringLit = 151,
    CharLit = 152,
    NumberLit = 153,

    // ==================
    // Nodes (200-399)
    // ==================
    SourceFile = 200,
    UsingDirective = 201,
    NamespaceDecl = 202,

    // Type declarations
    ClassDecl = 210,
    StructDecl = 211,
    InterfaceDecl = 212,
    EnumDecl = 213,
    DelegateDecl = 214,

    // Member declarations
    FieldDecl = 220,
    EventDecl = 221,
    PropertyDecl = 222,
    ConstructorDecl = 223,
    DestructorDecl = 224,
    MethodDecl = 225,
    OperatorDecl = 226,
    IndexerDecl = 227,
    UnknownMember = 228,

    // Member parts
    Name = 240,
    TypeRef = 241,
    AttributeList = 242,
    ParamList = 243,
    TypeParamList = 244,
    VariableDeclarator = 245,
    Initializer = 246,
    Block = 247,
    AccessorList = 248,
    ExpressionBody = 249,

    // ==================
    // Special (400+)
    // ==================
    Error = 400,
}

impl SyntaxKind {
    /// Check if this is trivia (attached text that carries no syntax)
    pub const fn is_trivia(self) -> bool {
        (self as u16) < 10
    }

    /// Check if this is a comment of any style
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            Self::CommentLine | Self::CommentDoc | Self::CommentBlock
        )
    }

    /// Check if this is a keyword
    pub const fn is_keyword(self) -> bool {
        (self as u16) >= 10 && (self as u16) < 100
    }

    /// Check if this is punctuation
    pub const fn is_punct(self) -> bool {
        (self as u16) >= 100 && (self as u16) < 150
    }

    /// Check if this is a structural node
    pub const fn is_node(self) -> bool {
        (self as u16) >= 200 && (self as u16) < 400
    }

    /// Class-like declarations whose members get arranged
    pub const fn is_arrangeable_type(self) -> bool {
        matches!(self, Self::ClassDecl | Self::StructDecl)
    }

    /// Map a keyword string to its kind
    pub fn from_keyword(text: &str) -> Option<Self> {
        let kind = match text {
            "class" => Self::ClassKw,
            "struct" => Self::StructKw,
            "interface" => Self::InterfaceKw,
            "enum" => Self::EnumKw,
            "delegate" => Self::DelegateKw,
            "event" => Self::EventKw,
            "using" => Self::UsingKw,
            "namespace" => Self::NamespaceKw,
            "operator" => Self::OperatorKw,
            "this" => Self::ThisKw,
            "public" | "private" | "protected" | "internal" | "static" | "readonly" | "const"
            | "volatile" | "abstract" | "sealed" | "virtual" | "override" | "new" | "extern"
            | "unsafe" | "partial" | "async" | "fixed" | "required" | "implicit"
            | "explicit" => Self::Modifier,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

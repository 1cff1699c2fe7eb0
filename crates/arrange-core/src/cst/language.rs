//! Rowan language implementation for C#
//!
//! Connects the `SyntaxKind` enum to Rowan's generic CST infrastructure.

use rowan::Language;

use super::SyntaxKind;

/// Language implementation for C#
///
/// Zero-sized marker type implementing `rowan::Language`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CsLanguage;

impl Language for CsLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            // Trivia
            0 => SyntaxKind::Whitespace,
            1 => SyntaxKind::Newline,
            2 => SyntaxKind::CommentLine,
            3 => SyntaxKind::CommentDoc,
            4 => SyntaxKind::CommentBlock,
            5 => SyntaxKind::Preprocessor,

            // Keywords
            10 => SyntaxKind::ClassKw,
            11 => SyntaxKind::StructKw,
            12 => SyntaxKind::InterfaceKw,
            13 => SyntaxKind::EnumKw,
            14 => SyntaxKind::DelegateKw,
            15 => SyntaxKind::EventKw,
            16 => SyntaxKind::UsingKw,
            17 => SyntaxKind::NamespaceKw,
            18 => SyntaxKind::OperatorKw,
            19 => SyntaxKind::ThisKw,
            20 => SyntaxKind::Modifier,

            // Punctuation
            100 => SyntaxKind::LBrace,
            101 => SyntaxKind::RBrace,
            102 => SyntaxKind::LParen,
            103 => SyntaxKind::RParen,
            104 => SyntaxKind::LBracket,
            105 => SyntaxKind::RBracket,
            106 => SyntaxKind::LAngle,
            107 => SyntaxKind::RAngle,
            108 => SyntaxKind::Semicolon,
            109 => SyntaxKind::Comma,
            110 => SyntaxKind::Dot,
            111 => SyntaxKind::Equals,
            112 => SyntaxKind::FatArrow,
            113 => SyntaxKind::Question,
            114 => SyntaxKind::Colon,
            115 => SyntaxKind::Tilde,
            116 => SyntaxKind::Punct,

            // Literals & identifiers
            150 => SyntaxKind::Ident,
            151 => SyntaxKind::StringLit,
            152 => SyntaxKind::CharLit,
            153 => SyntaxKind::NumberLit,

            // Nodes
            200 => SyntaxKind::SourceFile,
            201 => SyntaxKind::UsingDirective,
            202 => SyntaxKind::NamespaceDecl,
            210 => SyntaxKind::ClassDecl,
            211 => SyntaxKind::StructDecl,
            212 => SyntaxKind::InterfaceDecl,
            213 => SyntaxKind::EnumDecl,
            214 => SyntaxKind::DelegateDecl,
            220 => SyntaxKind::FieldDecl,
            221 => SyntaxKind::EventDecl,
            222 => SyntaxKind::PropertyDecl,
            223 => SyntaxKind::ConstructorDecl,
            224 => SyntaxKind::DestructorDecl,
            225 => SyntaxKind::MethodDecl,
            226 => SyntaxKind::OperatorDecl,
            227 => SyntaxKind::IndexerDecl,
            228 => SyntaxKind::UnknownMember,
            240 => SyntaxKind::Name,
            241 => SyntaxKind::TypeRef,
            242 => SyntaxKind::AttributeList,
            243 => SyntaxKind::ParamList,
            244 => SyntaxKind::TypeParamList,
            245 => SyntaxKind::VariableDeclarator,
            246 => SyntaxKind::Initializer,
            247 => SyntaxKind::Block,
            248 => SyntaxKind::AccessorList,
            249 => SyntaxKind::ExpressionBody,

            // Every raw kind we hand to rowan comes from `kind_to_raw`
            _ => SyntaxKind::Error,
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

/// Red tree node for C#
pub type SyntaxNode = rowan::SyntaxNode<CsLanguage>;
/// Red tree token for C#
pub type SyntaxToken = rowan::SyntaxToken<CsLanguage>;
/// Either a node or a token
pub type SyntaxElement = rowan::SyntaxElement<CsLanguage>;

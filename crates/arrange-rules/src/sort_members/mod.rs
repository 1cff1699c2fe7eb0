//! Member sorting for class and struct declarations
//!
//! Reorders the direct members of every class and struct into a canonical
//! order: events, fields, properties, constructors, methods, enums and
//! nested types, each group sorted by name. Nested types are arranged first,
//! then slotted into their parent like any other member. Classes declared
//! inside an interface are arranged on their own.
//!
//! The work for one type runs in three steps:
//! 1. [`capture`]: classify the type's direct children into buckets,
//!    capturing nested types recursively
//! 2. [`sequence`]: sort each bucket and concatenate them into the
//!    canonical sequence
//! 3. [`rewrite`]: walk the original children again and replace every
//!    member position, in order, with the next element of the sequence
//!
//! Member nodes own their comments and line breaks, so moving a node moves
//! its documentation with it. Children that are not members (interfaces,
//! delegates, operators, indexers, destructors, unrecognized declarations)
//! keep their exact positions.

pub mod capture;
pub mod rewrite;
pub mod sequence;

use arrange_core::Result;
use arrange_core::cst::ast::{AstNode, TypeDecl};
use arrange_core::cst::{SyntaxKind, SyntaxNode};
use rowan::{GreenNode, TextRange};
use tracing::debug;

use crate::rule::{RuleMetadata, RulePhase, SyntaxRule};

pub use capture::{CapturedMember, CapturedType};
pub use rewrite::PositionalRewriter;
pub use sequence::{CanonicalSequence, SequencedMember, canonical_sequence};

/// Rule id of [`SortClassMembersRule`]
pub const SORT_CLASS_MEMBERS: &str = "sort-class-members";

/// Member categories in canonical output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberCategory {
    Event,
    Field,
    Property,
    Constructor,
    Method,
    Enum,
    NestedType,
}

impl MemberCategory {
    pub const ALL: [MemberCategory; 7] = [
        MemberCategory::Event,
        MemberCategory::Field,
        MemberCategory::Property,
        MemberCategory::Constructor,
        MemberCategory::Method,
        MemberCategory::Enum,
        MemberCategory::NestedType,
    ];

    /// Category of a direct child of a type, `None` for untracked kinds
    ///
    /// Capture and rewrite both decide "is this a member position" here, so
    /// they always agree. New kinds must be placed explicitly.
    pub fn classify(kind: SyntaxKind) -> Option<MemberCategory> {
        match kind {
            SyntaxKind::EventDecl => Some(MemberCategory::Event),
            SyntaxKind::FieldDecl => Some(MemberCategory::Field),
            SyntaxKind::PropertyDecl => Some(MemberCategory::Property),
            SyntaxKind::ConstructorDecl => Some(MemberCategory::Constructor),
            SyntaxKind::MethodDecl => Some(MemberCategory::Method),
            SyntaxKind::EnumDecl => Some(MemberCategory::Enum),
            SyntaxKind::ClassDecl | SyntaxKind::StructDecl => Some(MemberCategory::NestedType),

            // Declarations that stay where they are
            SyntaxKind::InterfaceDecl
            | SyntaxKind::DelegateDecl
            | SyntaxKind::DestructorDecl
            | SyntaxKind::OperatorDecl
            | SyntaxKind::IndexerDecl
            | SyntaxKind::UnknownMember
            | SyntaxKind::UsingDirective
            | SyntaxKind::NamespaceDecl
            | SyntaxKind::SourceFile => None,

            // Parts of declarations
            SyntaxKind::Name
            | SyntaxKind::TypeRef
            | SyntaxKind::AttributeList
            | SyntaxKind::ParamList
            | SyntaxKind::TypeParamList
            | SyntaxKind::VariableDeclarator
            | SyntaxKind::Initializer
            | SyntaxKind::Block
            | SyntaxKind::AccessorList
            | SyntaxKind::ExpressionBody
            | SyntaxKind::Error => None,

            // Tokens
            SyntaxKind::Whitespace
            | SyntaxKind::Newline
            | SyntaxKind::CommentLine
            | SyntaxKind::CommentDoc
            | SyntaxKind::CommentBlock
            | SyntaxKind::Preprocessor
            | SyntaxKind::ClassKw
            | SyntaxKind::StructKw
            | SyntaxKind::InterfaceKw
            | SyntaxKind::EnumKw
            | SyntaxKind::DelegateKw
            | SyntaxKind::EventKw
            | SyntaxKind::UsingKw
            | SyntaxKind::NamespaceKw
            | SyntaxKind::OperatorKw
            | SyntaxKind::ThisKw
            | SyntaxKind::Modifier
            | SyntaxKind::LBrace
            | SyntaxKind::RBrace
            | SyntaxKind::LParen
            | SyntaxKind::RParen
            | SyntaxKind::LBracket
            | SyntaxKind::RBracket
            | SyntaxKind::LAngle
            | SyntaxKind::RAngle
            | SyntaxKind::Semicolon
            | SyntaxKind::Comma
            | SyntaxKind::Dot
            | SyntaxKind::Equals
            | SyntaxKind::FatArrow
            | SyntaxKind::Question
            | SyntaxKind::Colon
            | SyntaxKind::Tilde
            | SyntaxKind::Punct
            | SyntaxKind::Ident
            | SyntaxKind::StringLit
            | SyntaxKind::CharLit
            | SyntaxKind::NumberLit => None,
        }
    }
}

/// Capture, sequence and rewrite one class or struct
///
/// Returns the green node of the arranged declaration. Interfaces come back
/// unchanged.
pub fn arrange_type(decl: &TypeDecl) -> Result<GreenNode> {
    if !decl.is_arrangeable() {
        return Ok(decl.syntax().green().into_owned());
    }

    let captured = CapturedType::capture(decl);
    debug!(
        "Arranging type '{}' with {} members",
        captured.name,
        captured.member_count()
    );
    let sequence = canonical_sequence(captured)?;
    PositionalRewriter::new(sequence).rewrite(decl.syntax())
}

/// Class and struct declarations whose parent is not a class or struct
///
/// These are the types no other arrangement reaches: top-level ones and those
/// declared inside namespaces or interfaces, at any depth. A class or struct
/// directly inside another is arranged as part of its parent. Document order.
pub fn arrangement_roots(root: &SyntaxNode) -> impl Iterator<Item = SyntaxNode> {
    root.descendants().filter(|node| {
        node.kind().is_arrangeable_type()
            && !node
                .parent()
                .is_some_and(|parent| parent.kind().is_arrangeable_type())
    })
}

/// Sorts the members of every class and struct in a document
#[derive(Debug, Clone, Copy, Default)]
pub struct SortClassMembersRule;

impl SortClassMembersRule {
    pub fn new() -> Self {
        Self
    }
}

impl SyntaxRule for SortClassMembersRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: SORT_CLASS_MEMBERS,
            description: "Sorts all members in the class",
            phase: RulePhase::Syntax,
            order: 1,
            default_enabled: true,
        }
    }

    /// Arrange root types one at a time, innermost first
    ///
    /// Arranging only touches text inside the type's own range. Types that
    /// come earlier keep their ranges and enclosing ones grow or shrink by
    /// the change in length.
    fn process(&self, root: &SyntaxNode) -> Result<SyntaxNode> {
        let mut pending: Vec<TextRange> =
            arrangement_roots(root).map(|n| n.text_range()).collect();
        let mut current = root.clone();

        while let Some(range) = pending.pop() {
            let Some(node) = current
                .descendants()
                .find(|n| n.kind().is_arrangeable_type() && n.text_range() == range)
            else {
                return Err(arrange_core::ArrangeError::internal_error(format!(
                    "Type declaration at {range:?} disappeared while sorting members"
                )));
            };
            let Some(decl) = TypeDecl::cast(node.clone()) else {
                continue;
            };

            let arranged = arrange_type(&decl)?;
            let new_len = arranged.text_len();
            current = SyntaxNode::new_root(node.replace_with(arranged));

            if new_len != range.len() {
                for enclosing in pending.iter_mut().filter(|r| r.contains_range(range)) {
                    *enclosing =
                        TextRange::at(enclosing.start(), enclosing.len() - range.len() + new_len);
                }
            }
        }

        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrange_core::cst::parse;

    #[test]
    fn test_category_order() {
        let mut categories = MemberCategory::ALL.to_vec();
        categories.reverse();
        categories.sort();
        assert_eq!(categories, MemberCategory::ALL.to_vec());
        assert!(MemberCategory::Event < MemberCategory::Field);
        assert!(MemberCategory::Enum < MemberCategory::NestedType);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            MemberCategory::classify(SyntaxKind::FieldDecl),
            Some(MemberCategory::Field)
        );
        assert_eq!(
            MemberCategory::classify(SyntaxKind::StructDecl),
            Some(MemberCategory::NestedType)
        );
        assert_eq!(MemberCategory::classify(SyntaxKind::InterfaceDecl), None);
        assert_eq!(MemberCategory::classify(SyntaxKind::OperatorDecl), None);
        assert_eq!(MemberCategory::classify(SyntaxKind::Whitespace), None);
    }

    #[test]
    fn test_arrangement_roots() {
        let root = parse(
            "namespace N\n{\n    class A { class Inner { } }\n    interface I { class InI { } }\n    struct B { }\n}\n",
        )
        .syntax();
        let names: Vec<String> = arrangement_roots(&root)
            .filter_map(|n| arrange_core::cst::ast::declared_name(&n))
            .collect();
        assert_eq!(names, vec!["A", "InI", "B"]);
    }

    #[test]
    fn test_arrangement_roots_inside_nested_interface() {
        let root = parse("class A { interface I { class X { class Y { } } } struct S { } }").syntax();
        let names: Vec<String> = arrangement_roots(&root)
            .filter_map(|n| arrange_core::cst::ast::declared_name(&n))
            .collect();
        assert_eq!(names, vec!["A", "X"]);
    }

    #[test]
    fn test_interface_is_left_alone() {
        let source = "interface I { void B(); void A(); }";
        let root = parse(source).syntax();
        let decl = TypeDecl::cast(root.first_child().unwrap()).unwrap();
        let green = arrange_type(&decl).unwrap();
        assert_eq!(SyntaxNode::new_root(green).text().to_string(), source);
    }
}

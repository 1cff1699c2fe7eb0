//! Positional rewrite
//!
//! Walks the original children of a type in source order and replaces every
//! member position with the next element of the canonical sequence. Slots
//! are fungible: a field slot may receive a method. Non-member children are
//! copied unchanged.
//!
//! Whether a slot ends its line belongs to the slot. A member moved into a
//! slot that shares its line with the closing brace gives up its line break,
//! and one moved out of there gets the slot's.

use arrange_core::cst::{SyntaxElement, SyntaxKind, SyntaxNode};
use arrange_core::{ArrangeError, Result};
use rowan::{GreenNode, NodeOrToken};
use tracing::trace;

use super::MemberCategory;
use super::sequence::{CanonicalSequence, SequencedMember};

/// Consumes a canonical sequence one member position at a time
#[derive(Debug)]
pub struct PositionalRewriter {
    type_name: String,
    expected: usize,
    cursor: std::vec::IntoIter<SequencedMember>,
}

impl PositionalRewriter {
    pub fn new(sequence: CanonicalSequence) -> Self {
        Self {
            type_name: sequence.type_name,
            expected: sequence.members.len(),
            cursor: sequence.members.into_iter(),
        }
    }

    /// Produce the rewritten declaration
    ///
    /// Fails with [`ArrangeError::InvariantViolation`] when the number of
    /// member positions differs from the sequence length.
    pub fn rewrite(mut self, target: &SyntaxNode) -> Result<GreenNode> {
        let mut visited = 0usize;
        let mut exhausted = false;
        let mut children = Vec::new();

        for child in target.children_with_tokens() {
            match child {
                NodeOrToken::Node(node) if MemberCategory::classify(node.kind()).is_some() => {
                    visited += 1;
                    match self.cursor.next() {
                        Some(member) => {
                            trace!(
                                "{}: slot {} <- {:?} '{}'",
                                self.type_name, visited, member.category, member.key
                            );
                            children.push(NodeOrToken::Node(fit_line_end(member.green, &node)));
                        }
                        None => {
                            exhausted = true;
                            children.push(NodeOrToken::Node(node.green().into_owned()));
                        }
                    }
                }
                NodeOrToken::Node(node) => {
                    children.push(NodeOrToken::Node(node.green().into_owned()));
                }
                NodeOrToken::Token(token) => {
                    children.push(NodeOrToken::Token(token.green().to_owned()));
                }
            }
        }

        if exhausted || self.cursor.len() > 0 {
            return Err(ArrangeError::invariant_violation(
                self.type_name,
                self.expected,
                visited,
            ));
        }

        Ok(GreenNode::new(target.kind().into(), children))
    }
}

/// Give `member` the whitespace and line break that end `slot`
///
/// Only applied when exactly one of them ends its line. A member ending in a
/// line comment keeps its line break.
fn fit_line_end(member: GreenNode, slot: &SyntaxNode) -> GreenNode {
    let view = SyntaxNode::new_root(member.clone());
    let children: Vec<SyntaxElement> = view.children_with_tokens().collect();
    let slot_children: Vec<SyntaxElement> = slot.children_with_tokens().collect();

    let member_tail = line_tail_len(&children);
    let slot_tail = line_tail_len(&slot_children);
    if ends_line(&children) == ends_line(&slot_children) {
        return member;
    }

    let start = children.len() - member_tail;
    let after_line_comment = start
        .checked_sub(1)
        .map(|i| children[i].kind())
        .is_some_and(|kind| matches!(kind, SyntaxKind::CommentLine | SyntaxKind::CommentDoc));
    if after_line_comment {
        return member;
    }

    let replacement = slot_children[slot_children.len() - slot_tail..]
        .iter()
        .filter_map(|e| e.as_token())
        .map(|t| NodeOrToken::Token(t.green().to_owned()));
    member.splice_children(start..children.len(), replacement)
}

/// Number of trailing whitespace and line break tokens
fn line_tail_len(children: &[SyntaxElement]) -> usize {
    children
        .iter()
        .rev()
        .take_while(|e| matches!(e.kind(), SyntaxKind::Whitespace | SyntaxKind::Newline))
        .count()
}

fn ends_line(children: &[SyntaxElement]) -> bool {
    children
        .last()
        .is_some_and(|e| e.kind() == SyntaxKind::Newline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort_members::capture::CapturedType;
    use crate::sort_members::sequence::canonical_sequence;
    use arrange_core::cst::ast::{AstNode, TypeDecl};
    use arrange_core::cst::parse;

    fn first_type(source: &str) -> TypeDecl {
        TypeDecl::cast(parse(source).syntax().first_child().unwrap()).unwrap()
    }

    fn sequence_of(decl: &TypeDecl) -> CanonicalSequence {
        canonical_sequence(CapturedType::capture(decl)).unwrap()
    }

    #[test]
    fn test_rewrite_is_positional() {
        let source = "class T\n{\n    void B() { }\n    int x;\n}\n";
        let decl = first_type(source);
        let green = PositionalRewriter::new(sequence_of(&decl))
            .rewrite(decl.syntax())
            .unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class T\n{\n    int x;\n    void B() { }\n}\n"
        );
    }

    #[test]
    fn test_non_members_keep_their_slot() {
        let source = "class T\n{\n    void B() { }\n    ~T() { }\n    int x;\n}\n";
        let decl = first_type(source);
        let green = PositionalRewriter::new(sequence_of(&decl))
            .rewrite(decl.syntax())
            .unwrap();
        assert_eq!(
            SyntaxNode::new_root(green).text().to_string(),
            "class T\n{\n    int x;\n    ~T() { }\n    void B() { }\n}\n"
        );
    }

    fn rewritten(source: &str) -> String {
        let decl = first_type(source);
        let green = PositionalRewriter::new(sequence_of(&decl))
            .rewrite(decl.syntax())
            .unwrap();
        SyntaxNode::new_root(green).text().to_string()
    }

    #[test]
    fn test_last_slot_keeps_sharing_the_brace_line() {
        assert_eq!(
            rewritten("class T\n{\n    void B() { }\n    int x; }\n"),
            "class T\n{\n    int x;\n    void B() { } }\n"
        );
    }

    #[test]
    fn test_line_comment_keeps_its_line_break() {
        assert_eq!(
            rewritten("class T\n{\n    void B() { } // b\n    int x; }\n"),
            "class T\n{\n    int x;\n    void B() { } // b\n}\n"
        );
    }

    #[test]
    fn test_single_line_type_is_untouched_beyond_order() {
        assert_eq!(
            rewritten("class T { void B() { } int x; }"),
            "class T { int x; void B() { } }"
        );
    }

    #[test]
    fn test_short_sequence_is_an_invariant_violation() {
        let small = first_type("class Small { int a; }");
        let large = first_type("class Large { int a; int b; int c; }");

        let err = PositionalRewriter::new(sequence_of(&small))
            .rewrite(large.syntax())
            .unwrap_err();
        match err {
            ArrangeError::InvariantViolation {
                type_name,
                expected,
                visited,
            } => {
                assert_eq!(type_name, "Small");
                assert_eq!(expected, 1);
                assert_eq!(visited, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_leftover_sequence_is_an_invariant_violation() {
        let large = first_type("class Large { int a; int b; }");
        let empty = first_type("class Empty { }");

        let err = PositionalRewriter::new(sequence_of(&large))
            .rewrite(empty.syntax())
            .unwrap_err();
        assert!(matches!(
            err,
            ArrangeError::InvariantViolation {
                expected: 2,
                visited: 0,
                ..
            }
        ));
        assert!(!err.is_recoverable());
    }
}

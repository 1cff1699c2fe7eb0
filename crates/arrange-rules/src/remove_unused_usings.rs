//! Removal of unnecessary using directives
//!
//! Driven entirely by diagnostics: every `CS8019` diagnostic is resolved to
//! the token at its start offset and from there to the enclosing using
//! directive. All flagged directives are removed in one rebuild of the tree.
//!
//! A removed directive takes its trailing trivia and blank lines with it.
//! Comments and preprocessor lines in front of it (file headers, `#if`) stay.

use std::collections::HashSet;

use arrange_core::cst::{SyntaxKind, SyntaxNode};
use arrange_core::{Diagnostic, Result, UNNECESSARY_USING};
use rowan::{GreenNode, GreenToken, NodeOrToken, TextSize};
use tracing::debug;

use crate::rule::{LocalSemanticRule, RuleMetadata, RulePhase};

/// Rule id of [`RemoveUnusedUsingsRule`]
pub const REMOVE_UNUSED_USINGS: &str = "remove-unused-usings";

/// Removes using directives flagged as unnecessary
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveUnusedUsingsRule;

impl RemoveUnusedUsingsRule {
    pub fn new() -> Self {
        Self
    }
}

impl LocalSemanticRule for RemoveUnusedUsingsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: REMOVE_UNUSED_USINGS,
            description: "Remove unused using statements from every document",
            phase: RulePhase::LocalSemantic,
            order: 1,
            default_enabled: true,
        }
    }

    fn process(&self, root: &SyntaxNode, diagnostics: &[Diagnostic]) -> Result<SyntaxNode> {
        let targets = flagged_directives(root, diagnostics);
        if targets.is_empty() {
            return Ok(root.clone());
        }

        debug!("Removing {} using directives", targets.len());
        let ancestors: HashSet<SyntaxNode> = targets
            .iter()
            .flat_map(|t| t.ancestors().skip(1))
            .collect();
        Ok(SyntaxNode::new_root(rebuild(root, &targets, &ancestors)))
    }
}

/// Using directives hit by an unnecessary-using diagnostic
fn flagged_directives(root: &SyntaxNode, diagnostics: &[Diagnostic]) -> HashSet<SyntaxNode> {
    let end = root.text_range().end();
    let mut targets = HashSet::new();

    for diagnostic in diagnostics.iter().filter(|d| d.id == UNNECESSARY_USING) {
        let Ok(offset) = TextSize::try_from(diagnostic.start) else {
            continue;
        };
        if offset >= end {
            debug!("Diagnostic at {} is outside the document", diagnostic.start);
            continue;
        }

        let directive = root
            .token_at_offset(offset)
            .right_biased()
            .and_then(|token| {
                token
                    .parent_ancestors()
                    .find(|n| n.kind() == SyntaxKind::UsingDirective)
            });
        match directive {
            Some(directive) => {
                targets.insert(directive);
            }
            None => debug!(
                "Diagnostic at {} does not point at a using directive",
                diagnostic.start
            ),
        }
    }

    targets
}

/// Rebuild `node` without the target directives
fn rebuild(
    node: &SyntaxNode,
    targets: &HashSet<SyntaxNode>,
    ancestors: &HashSet<SyntaxNode>,
) -> GreenNode {
    let mut children = Vec::new();
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(child) if targets.contains(&child) => {
                children.extend(kept_leading_trivia(&child).into_iter().map(NodeOrToken::Token));
            }
            NodeOrToken::Node(child) if ancestors.contains(&child) => {
                children.push(NodeOrToken::Node(rebuild(&child, targets, ancestors)));
            }
            NodeOrToken::Node(child) => children.push(NodeOrToken::Node(child.green().into_owned())),
            NodeOrToken::Token(token) => children.push(NodeOrToken::Token(token.green().to_owned())),
        }
    }
    GreenNode::new(node.kind().into(), children)
}

/// Leading lines of a removed directive that must survive
///
/// Everything up to the last line break before the directive, but only if
/// those lines hold a comment or preprocessor directive.
fn kept_leading_trivia(directive: &SyntaxNode) -> Vec<GreenToken> {
    let leading: Vec<_> = directive
        .children_with_tokens()
        .map_while(|e| e.into_token())
        .take_while(|t| t.kind().is_trivia())
        .collect();

    let has_content = leading
        .iter()
        .any(|t| t.kind().is_comment() || t.kind() == SyntaxKind::Preprocessor);
    if !has_content {
        return Vec::new();
    }

    let Some(last_newline) = leading.iter().rposition(|t| t.kind() == SyntaxKind::Newline) else {
        return Vec::new();
    };
    leading[..=last_newline]
        .iter()
        .map(|t| t.green().to_owned())
        .collect()
}

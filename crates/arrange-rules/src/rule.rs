//! Rule traits and metadata

use std::fmt;

use arrange_core::cst::SyntaxNode;
use arrange_core::{CSHARP, Diagnostic, Result};
use serde::Serialize;

/// When a rule runs relative to the others
///
/// Local-semantic rules consume diagnostics computed on the parsed tree, so
/// they run before any syntax rule moves code around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulePhase {
    LocalSemantic,
    Syntax,
}

impl fmt::Display for RulePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulePhase::LocalSemantic => write!(f, "local-semantic"),
            RulePhase::Syntax => write!(f, "syntax"),
        }
    }
}

/// Static description of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    pub id: &'static str,
    pub description: &'static str,
    pub phase: RulePhase,
    /// Position within the phase, lowest first
    pub order: u32,
    pub default_enabled: bool,
}

/// A rule that rewrites the tree on syntax alone
pub trait SyntaxRule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;

    fn supports_language(&self, language: &str) -> bool {
        language == CSHARP
    }

    /// Return the rewritten root; an error leaves the document untouched
    fn process(&self, root: &SyntaxNode) -> Result<SyntaxNode>;
}

/// A rule driven by diagnostics computed on the current tree
pub trait LocalSemanticRule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;

    fn supports_language(&self, language: &str) -> bool {
        language == CSHARP
    }

    fn process(&self, root: &SyntaxNode, diagnostics: &[Diagnostic]) -> Result<SyntaxNode>;
}

//! Diagnostics consumed by local-semantic rules
//!
//! A [`DiagnosticProvider`] reports diagnostics for one parsed document.
//! Two providers ship with the crate:
//! - [`UnusedUsingAnalyzer`]: a syntactic approximation of the compiler's
//!   unnecessary-using diagnostic
//! - [`ExternalDiagnostics`]: diagnostics exported by a real compiler run,
//!   loaded from a JSON file

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::cst::ast::{AstNode, UsingDirective};
use crate::cst::{SyntaxKind, SyntaxNode};
use crate::error::ArrangeError;
use crate::result::Result;

/// Compiler diagnostic id for an unnecessary using directive
pub const UNNECESSARY_USING: &str = "CS8019";

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational messages
    Info,
    /// Hidden diagnostics and hints
    Hint,
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

/// A diagnostic attached to a byte range of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic identifier, e.g. `CS8019`
    pub id: String,
    pub message: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Document the diagnostic belongs to; `None` matches any document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_severity() -> Severity {
    Severity::Hint
}

impl Diagnostic {
    pub fn new(id: impl Into<String>, message: impl Into<String>, range: Range<usize>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            severity: default_severity(),
            start: range.start,
            end: range.end,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether this diagnostic applies to the document at `path`
    ///
    /// Relative diagnostic paths match any document path ending with them.
    pub fn applies_to(&self, path: Option<&Path>) -> bool {
        match (&self.path, path) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(own), Some(path)) => path == own || path.ends_with(own),
        }
    }
}

/// Source of diagnostics for a parsed document
pub trait DiagnosticProvider: Send + Sync {
    /// Diagnostics for the document at `path` whose tree is `root`
    fn diagnostics(&self, path: Option<&Path>, root: &SyntaxNode) -> Vec<Diagnostic>;
}

/// Flags using directives that have no effect on the document
///
/// Purely syntactic, so it only reports what is certain without binding:
/// - a directive importing the same thing as an earlier one in the same scope
/// - an alias directive whose alias never appears as an identifier
///
/// `global using` directives affect other files and are never reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnusedUsingAnalyzer;

impl UnusedUsingAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticProvider for UnusedUsingAnalyzer {
    fn diagnostics(&self, _path: Option<&Path>, root: &SyntaxNode) -> Vec<Diagnostic> {
        let referenced = referenced_identifiers(root);
        let mut diagnostics = Vec::new();

        let scopes = std::iter::once(root.clone()).chain(
            root.descendants()
                .filter(|n| n.kind() == SyntaxKind::NamespaceDecl),
        );

        for scope in scopes {
            let mut seen = HashSet::new();
            for using in scope.children().filter_map(UsingDirective::cast) {
                if using.is_global() {
                    continue;
                }
                let Some(key) = using.import_key() else {
                    continue;
                };

                let message = if !seen.insert(key.clone()) {
                    format!("Using directive '{key}' duplicates an earlier directive")
                } else if let Some(alias) = using.alias().filter(|a| !referenced.contains(a)) {
                    format!("Using alias '{alias}' is never used")
                } else {
                    continue;
                };

                tracing::trace!("{}", message);
                diagnostics.push(Diagnostic::new(
                    UNNECESSARY_USING,
                    message,
                    significant_range(using.syntax()),
                ));
            }
        }

        diagnostics
    }
}

/// Identifiers used outside of using directives
fn referenced_identifiers(root: &SyntaxNode) -> HashSet<String> {
    root.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() == SyntaxKind::Ident)
        .filter(|t| {
            !t.parent_ancestors()
                .any(|a| a.kind() == SyntaxKind::UsingDirective)
        })
        .map(|t| t.text().trim_start_matches('@').to_string())
        .collect()
}

/// Byte range from the first to the last non-trivia token of `node`
fn significant_range(node: &SyntaxNode) -> Range<usize> {
    let mut tokens = node
        .descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia());
    let full = node.text_range();
    let first = tokens.next();
    let last = tokens.last().or_else(|| first.clone());
    match (first, last) {
        (Some(first), Some(last)) => {
            usize::from(first.text_range().start())..usize::from(last.text_range().end())
        }
        _ => usize::from(full.start())..usize::from(full.end()),
    }
}

/// Diagnostics produced outside this tool, e.g. exported from a compiler run
///
/// The JSON file holds an array of [`Diagnostic`] objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalDiagnostics {
    entries: Vec<Diagnostic>,
}

impl ExternalDiagnostics {
    pub fn new(entries: Vec<Diagnostic>) -> Self {
        Self { entries }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: Vec<Diagnostic> = serde_json::from_str(content).map_err(|e| {
            ArrangeError::config_error(format!("Invalid diagnostics file: {e}"))
        })?;
        Ok(Self { entries })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| ArrangeError::io_error(path, e))?;
        let diagnostics = Self::from_json(&content)?;
        tracing::debug!(
            "Loaded {} diagnostics from {}",
            diagnostics.entries.len(),
            path.display()
        );
        Ok(diagnostics)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticProvider for ExternalDiagnostics {
    fn diagnostics(&self, path: Option<&Path>, _root: &SyntaxNode) -> Vec<Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.applies_to(path))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse;

    fn analyze(source: &str) -> Vec<Diagnostic> {
        UnusedUsingAnalyzer::new().diagnostics(None, &parse(source).syntax())
    }

    #[test]
    fn test_flags_duplicate_using() {
        let source = "using System;\nusing System.IO;\nusing System;\n\nclass A { }\n";
        let diagnostics = analyze(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].id, UNNECESSARY_USING);
        assert_eq!(&source[diagnostics[0].range()], "using System;");
        assert_eq!(diagnostics[0].start, 31);
    }

    #[test]
    fn test_flags_unreferenced_alias() {
        let source = "using IO = System.IO;\nusing Text = System.Text;\n\nclass A { IO.Stream s; }\n";
        let diagnostics = analyze(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(&source[diagnostics[0].range()], "using Text = System.Text;");
    }

    #[test]
    fn test_scopes_are_independent() {
        let source = "using System;\nnamespace N\n{\n    using System;\n    using System;\n}\n";
        let diagnostics = analyze(source);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].start > source.find("namespace").unwrap());
    }

    #[test]
    fn test_global_and_static_usings() {
        let source = "global using System;\nglobal using System;\nusing static System.Math;\nusing System.Math;\n";
        assert!(analyze(source).is_empty());
    }

    #[test]
    fn test_external_diagnostics_filter_by_path() {
        let json = r#"[
            {"id": "CS8019", "message": "Unnecessary using directive.", "start": 0, "end": 13, "path": "src/A.cs"},
            {"id": "CS8019", "message": "Unnecessary using directive.", "start": 14, "end": 30, "path": "src/B.cs"},
            {"id": "CS0168", "message": "Unused variable", "severity": "warning", "start": 5, "end": 6}
        ]"#;
        let external = ExternalDiagnostics::from_json(json).unwrap();
        assert_eq!(external.len(), 3);

        let root = parse("").syntax();
        let for_a = external.diagnostics(Some(Path::new("/repo/src/A.cs")), &root);
        assert_eq!(for_a.len(), 2);
        assert_eq!(for_a[0].severity, Severity::Hint);
        assert_eq!(for_a[1].severity, Severity::Warning);

        let without_path = external.diagnostics(None, &root);
        assert_eq!(without_path.len(), 1);
    }

    #[test]
    fn test_external_diagnostics_invalid_json() {
        assert!(matches!(
            ExternalDiagnostics::from_json("{"),
            Err(ArrangeError::ConfigError { .. })
        ));
    }
}

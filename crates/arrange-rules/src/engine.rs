//! Rule engine implementation

use arrange_core::cst::SyntaxNode;
use arrange_core::{ArrangeError, DiagnosticProvider, Document, Result, RulesConfiguration};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::remove_unused_usings::RemoveUnusedUsingsRule;
use crate::rule::{LocalSemanticRule, RuleMetadata, SyntaxRule};
use crate::sort_members::SortClassMembersRule;

/// A registered rule of either phase
pub enum RegisteredRule {
    LocalSemantic(Box<dyn LocalSemanticRule>),
    Syntax(Box<dyn SyntaxRule>),
}

impl RegisteredRule {
    pub fn metadata(&self) -> RuleMetadata {
        match self {
            RegisteredRule::LocalSemantic(rule) => rule.metadata(),
            RegisteredRule::Syntax(rule) => rule.metadata(),
        }
    }

    pub fn supports_language(&self, language: &str) -> bool {
        match self {
            RegisteredRule::LocalSemantic(rule) => rule.supports_language(language),
            RegisteredRule::Syntax(rule) => rule.supports_language(language),
        }
    }
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RegisteredRule")
            .field(&self.metadata().id)
            .finish()
    }
}

/// A rule as listed to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInfo {
    #[serde(flatten)]
    pub metadata: RuleMetadata,
    pub enabled: bool,
}

/// Result of formatting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOutcome {
    pub text: String,
    /// Whether `text` differs from the input
    pub changed: bool,
    /// Ids of the rules that modified the document, in execution order
    pub applied_rules: Vec<String>,
}

#[derive(Debug)]
struct RuleEntry {
    rule: RegisteredRule,
    enabled: bool,
}

/// Runs the enabled rules over documents
///
/// Rules execute by phase (local-semantic first), then by `order`, then by
/// id. Each rule receives the tree produced by the previous one.
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<RuleEntry>,
}

impl RuleEngine {
    /// An engine without rules
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with every built-in rule in its default state
    pub fn with_builtin_rules() -> Self {
        let mut engine = Self::new();
        engine.register(RegisteredRule::LocalSemantic(Box::new(
            RemoveUnusedUsingsRule::new(),
        )));
        engine.register(RegisteredRule::Syntax(Box::new(SortClassMembersRule::new())));
        engine
    }

    /// Register a rule, replacing any rule with the same id
    pub fn register(&mut self, rule: RegisteredRule) {
        let metadata = rule.metadata();
        if let Some(pos) = self.position(metadata.id) {
            tracing::warn!("Replacing already registered rule '{}'", metadata.id);
            self.rules.remove(pos);
        }

        self.rules.push(RuleEntry {
            rule,
            enabled: metadata.default_enabled,
        });
        self.rules.sort_by_key(|entry| {
            let m = entry.rule.metadata();
            (m.phase, m.order, m.id)
        });
    }

    /// Apply enable/disable flags from configuration
    ///
    /// Unknown rule ids are a configuration error.
    pub fn configure(&mut self, config: &RulesConfiguration) -> Result<()> {
        for (id, enabled) in config.iter() {
            self.set_enabled(id, enabled)?;
        }
        Ok(())
    }

    pub fn set_enabled(&mut self, rule_id: &str, enabled: bool) -> Result<()> {
        let pos = self.position(rule_id).ok_or_else(|| {
            ArrangeError::config_error(format!(
                "Unknown rule '{}'. Known rules: {}",
                rule_id,
                self.rule_ids().join(", ")
            ))
        })?;
        self.rules[pos].enabled = enabled;
        debug!(
            "Rule '{}' {}",
            rule_id,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(())
    }

    /// All registered rules in execution order
    pub fn rules(&self) -> Vec<RuleInfo> {
        self.rules
            .iter()
            .map(|entry| RuleInfo {
                metadata: entry.rule.metadata(),
                enabled: entry.enabled,
            })
            .collect()
    }

    pub fn get(&self, rule_id: &str) -> Option<RuleInfo> {
        self.rules().into_iter().find(|info| info.metadata.id == rule_id)
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|e| e.rule.metadata().id).collect()
    }

    pub fn enabled_count(&self) -> usize {
        self.rules.iter().filter(|e| e.enabled).count()
    }

    /// Run every enabled rule over one document
    ///
    /// Documents with parse errors are refused. A failing rule aborts the
    /// whole document so no partially rewritten text is returned.
    pub fn format(
        &self,
        document: &Document,
        provider: &dyn DiagnosticProvider,
    ) -> Result<FormatOutcome> {
        let parse = document.parse();
        if let Some(first) = parse.errors().first() {
            return Err(ArrangeError::parse_error(format!(
                "{}: {} at {}..{} ({} errors)",
                document.display_name(),
                first.message,
                first.span.start,
                first.span.end,
                parse.errors().len()
            )));
        }

        let mut root = parse.syntax();
        let mut applied_rules = Vec::new();

        for entry in self.rules.iter().filter(|e| e.enabled) {
            let metadata = entry.rule.metadata();
            if !entry.rule.supports_language(&document.language) {
                debug!(
                    "Rule '{}' does not support language '{}'",
                    metadata.id, document.language
                );
                continue;
            }

            let next = self
                .run_rule(&entry.rule, document, provider, &root)
                .inspect_err(|e| {
                    error!(
                        "Rule '{}' failed on {}: {}",
                        metadata.id,
                        document.display_name(),
                        e
                    )
                })?;

            if next.text() != root.text() {
                debug!("Rule '{}' changed {}", metadata.id, document.display_name());
                applied_rules.push(metadata.id.to_string());
            }
            root = next;
        }

        let text = root.text().to_string();
        let changed = text != document.text;
        if changed {
            info!(
                "Formatted {} ({})",
                document.display_name(),
                applied_rules.join(", ")
            );
        }

        Ok(FormatOutcome {
            text,
            changed,
            applied_rules,
        })
    }

    fn run_rule(
        &self,
        rule: &RegisteredRule,
        document: &Document,
        provider: &dyn DiagnosticProvider,
        root: &SyntaxNode,
    ) -> Result<SyntaxNode> {
        match rule {
            RegisteredRule::LocalSemantic(rule) => {
                // Computed on the current tree so offsets match it
                let diagnostics = provider.diagnostics(document.path.as_deref(), root);
                debug!(
                    "{} diagnostics for rule '{}'",
                    diagnostics.len(),
                    rule.metadata().id
                );
                rule.process(root, &diagnostics)
            }
            RegisteredRule::Syntax(rule) => rule.process(root),
        }
    }

    fn position(&self, rule_id: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|e| e.rule.metadata().id == rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remove_unused_usings::REMOVE_UNUSED_USINGS;
    use crate::rule::RulePhase;
    use crate::sort_members::SORT_CLASS_MEMBERS;
    use arrange_core::{ErrorKind, ExternalDiagnostics, UnusedUsingAnalyzer};

    struct FailingRule;

    impl SyntaxRule for FailingRule {
        fn metadata(&self) -> RuleMetadata {
            RuleMetadata {
                id: "always-fails",
                description: "Fails on every document",
                phase: RulePhase::Syntax,
                order: 0,
                default_enabled: true,
            }
        }

        fn process(&self, _root: &SyntaxNode) -> Result<SyntaxNode> {
            Err(ArrangeError::rule_error("always-fails", "boom"))
        }
    }

    #[test]
    fn test_builtin_rules_in_execution_order() {
        let engine = RuleEngine::with_builtin_rules();
        assert_eq!(engine.rule_ids(), vec![REMOVE_UNUSED_USINGS, SORT_CLASS_MEMBERS]);
        assert_eq!(engine.enabled_count(), 2);

        let rules = engine.rules();
        assert_eq!(rules[0].metadata.phase, RulePhase::LocalSemantic);
        assert_eq!(rules[1].metadata.phase, RulePhase::Syntax);
    }

    #[test]
    fn test_configure_disables_rule() {
        let mut engine = RuleEngine::with_builtin_rules();
        let mut config = RulesConfiguration::default();
        config.set(SORT_CLASS_MEMBERS, false);
        engine.configure(&config).unwrap();

        assert!(!engine.get(SORT_CLASS_MEMBERS).unwrap().enabled);
        assert!(engine.get(REMOVE_UNUSED_USINGS).unwrap().enabled);

        let document = Document::new("class T { void B() { } int a; }");
        let outcome = engine.format(&document, &UnusedUsingAnalyzer::new()).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.applied_rules.is_empty());
    }

    #[test]
    fn test_configure_rejects_unknown_rule() {
        let mut engine = RuleEngine::with_builtin_rules();
        let mut config = RulesConfiguration::default();
        config.set("no-such-rule", true);
        let err = engine.configure(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("no-such-rule"));
    }

    #[test]
    fn test_format_applies_both_rules() {
        let document = Document::new(
            "using System;\nusing System;\n\nclass T\n{\n    void B() { }\n    int a;\n}\n",
        );
        let outcome = RuleEngine::with_builtin_rules()
            .format(&document, &UnusedUsingAnalyzer::new())
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(
            outcome.text,
            "using System;\n\nclass T\n{\n    int a;\n    void B() { }\n}\n"
        );
        assert_eq!(
            outcome.applied_rules,
            vec![REMOVE_UNUSED_USINGS.to_string(), SORT_CLASS_MEMBERS.to_string()]
        );
    }

    #[test]
    fn test_format_unchanged_document() {
        let source = "using System;\n\nclass T\n{\n    int a;\n    void B() { }\n}\n";
        let outcome = RuleEngine::with_builtin_rules()
            .format(&Document::new(source), &UnusedUsingAnalyzer::new())
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.text, source);
    }

    #[test]
    fn test_format_refuses_parse_errors() {
        let document = Document::new("class T { int a; ");
        let err = RuleEngine::with_builtin_rules()
            .format(&document, &UnusedUsingAnalyzer::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_failing_rule_aborts_document() {
        let mut engine = RuleEngine::with_builtin_rules();
        engine.register(RegisteredRule::Syntax(Box::new(FailingRule)));
        assert_eq!(engine.rule_ids().last(), Some(&SORT_CLASS_MEMBERS));

        let err = engine
            .format(&Document::new("class T { }"), &UnusedUsingAnalyzer::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Rule);
    }

    #[test]
    fn test_unsupported_language_is_skipped() {
        let mut document = Document::new("class T { void B() { } int a; }");
        document.language = "unknown".to_string();
        let outcome = RuleEngine::with_builtin_rules()
            .format(&document, &UnusedUsingAnalyzer::new())
            .unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn test_external_diagnostics_drive_removal() {
        let source = "using System;\nusing System.Linq;\nclass T { }\n";
        let start = source.find("using System.Linq;").unwrap();
        let provider = ExternalDiagnostics::new(vec![arrange_core::Diagnostic::new(
            arrange_core::UNNECESSARY_USING,
            "Unnecessary using directive.",
            start..start + "using System.Linq;".len(),
        )]);
        let outcome = RuleEngine::with_builtin_rules()
            .format(&Document::new(source), &provider)
            .unwrap();
        assert_eq!(outcome.text, "using System;\nclass T { }\n");
    }
}

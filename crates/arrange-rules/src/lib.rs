//! Arrange Rules
//!
//! The rule engine and the built-in rules:
//! - `remove-unused-usings`: drops using directives flagged as unnecessary
//! - `sort-class-members`: puts class and struct members in canonical order

pub mod engine;
pub mod remove_unused_usings;
pub mod rule;
pub mod sort_members;

pub use engine::{FormatOutcome, RegisteredRule, RuleEngine, RuleInfo};
pub use remove_unused_usings::{REMOVE_UNUSED_USINGS, RemoveUnusedUsingsRule};
pub use rule::{LocalSemanticRule, RuleMetadata, RulePhase, SyntaxRule};
pub use sort_members::{
    MemberCategory, SORT_CLASS_MEMBERS, SortClassMembersRule, arrange_type, arrangement_roots,
};

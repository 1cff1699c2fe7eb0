//! Member capture
//!
//! One pass over a type's direct children, bucketing each member by
//! category in encounter order. Nested classes and structs are captured
//! recursively into their own [`CapturedType`].

use arrange_core::cst::SyntaxNode;
use arrange_core::cst::ast::{AstNode, TypeDecl, declared_name};

use super::MemberCategory;

/// A member node with its sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMember {
    pub node: SyntaxNode,
    /// The member's name; the first declared name for fields and events
    pub key: String,
}

impl CapturedMember {
    fn new(node: SyntaxNode) -> Self {
        let key = declared_name(&node).unwrap_or_default();
        Self { node, key }
    }
}

/// The members of one class or struct, bucketed by category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedType {
    /// The declaration the members were captured from
    pub target: SyntaxNode,
    pub name: String,
    pub events: Vec<CapturedMember>,
    pub fields: Vec<CapturedMember>,
    pub properties: Vec<CapturedMember>,
    pub constructors: Vec<CapturedMember>,
    pub methods: Vec<CapturedMember>,
    pub enums: Vec<CapturedMember>,
    pub nested: Vec<CapturedType>,
}

impl CapturedType {
    /// Capture the members of a class or struct declaration
    pub fn capture(decl: &TypeDecl) -> Self {
        Self::capture_node(decl.syntax())
    }

    fn capture_node(target: &SyntaxNode) -> Self {
        let mut captured = Self {
            target: target.clone(),
            name: declared_name(target).unwrap_or_default(),
            events: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            enums: Vec::new(),
            nested: Vec::new(),
        };

        for child in target.children() {
            let Some(category) = MemberCategory::classify(child.kind()) else {
                continue;
            };
            let bucket = match category {
                MemberCategory::Event => &mut captured.events,
                MemberCategory::Field => &mut captured.fields,
                MemberCategory::Property => &mut captured.properties,
                MemberCategory::Constructor => &mut captured.constructors,
                MemberCategory::Method => &mut captured.methods,
                MemberCategory::Enum => &mut captured.enums,
                MemberCategory::NestedType => {
                    captured.nested.push(capture_nested(&child));
                    continue;
                }
            };
            bucket.push(CapturedMember::new(child));
        }

        captured
    }

    /// Members of a non-nested category, in encounter order
    pub fn bucket(&self, category: MemberCategory) -> &[CapturedMember] {
        match category {
            MemberCategory::Event => &self.events,
            MemberCategory::Field => &self.fields,
            MemberCategory::Property => &self.properties,
            MemberCategory::Constructor => &self.constructors,
            MemberCategory::Method => &self.methods,
            MemberCategory::Enum => &self.enums,
            MemberCategory::NestedType => &[],
        }
    }

    /// Number of direct members, nested types counting as one each
    pub fn member_count(&self) -> usize {
        self.events.len()
            + self.fields.len()
            + self.properties.len()
            + self.constructors.len()
            + self.methods.len()
            + self.enums.len()
            + self.nested.len()
    }
}

/// Start a fresh capture rooted at a nested class or struct
pub fn capture_nested(node: &SyntaxNode) -> CapturedType {
    CapturedType::capture_node(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrange_core::cst::parse;

    fn capture(source: &str) -> CapturedType {
        let root = parse(source).syntax();
        let decl = TypeDecl::cast(root.first_child().unwrap()).unwrap();
        CapturedType::capture(&decl)
    }

    fn keys(members: &[CapturedMember]) -> Vec<&str> {
        members.iter().map(|m| m.key.as_str()).collect()
    }

    #[test]
    fn test_capture_buckets_in_encounter_order() {
        let captured = capture(
            "class T\n{\n    void Zeta() { }\n    int y;\n    void Alpha() { }\n    int x;\n    T() { }\n    event Action Changed;\n    string Name { get; }\n    enum Mode { A }\n}\n",
        );
        assert_eq!(captured.name, "T");
        assert_eq!(keys(&captured.methods), vec!["Zeta", "Alpha"]);
        assert_eq!(keys(&captured.fields), vec!["y", "x"]);
        assert_eq!(keys(&captured.constructors), vec!["T"]);
        assert_eq!(keys(&captured.events), vec!["Changed"]);
        assert_eq!(keys(&captured.properties), vec!["Name"]);
        assert_eq!(keys(&captured.enums), vec!["Mode"]);
        assert_eq!(captured.member_count(), 8);
        assert_eq!(keys(captured.bucket(MemberCategory::Field)), vec!["y", "x"]);
    }

    #[test]
    fn test_first_name_is_the_key() {
        let captured = capture("class T { int Zebra, Apple; event Action Zed, Ann; }");
        assert_eq!(keys(&captured.fields), vec!["Zebra"]);
        assert_eq!(keys(&captured.events), vec!["Zed"]);
    }

    #[test]
    fn test_nested_types_are_captured_recursively() {
        let captured = capture(
            "class Outer\n{\n    class Bravo { int b; int a; }\n    struct Alpha { void M() { } }\n}\n",
        );
        assert_eq!(captured.member_count(), 2);
        assert_eq!(captured.nested.len(), 2);
        assert_eq!(captured.nested[0].name, "Bravo");
        assert_eq!(keys(&captured.nested[0].fields), vec!["b", "a"]);
        assert_eq!(captured.nested[1].name, "Alpha");
        assert_eq!(keys(&captured.nested[1].methods), vec!["M"]);
    }

    #[test]
    fn test_untracked_children_are_skipped() {
        let captured = capture(
            "class T { interface I { } delegate void D(); ~T() { } int this[int i] => i; public static T operator +(T a, T b) => a; int x; }",
        );
        assert_eq!(captured.member_count(), 1);
        assert_eq!(keys(&captured.fields), vec!["x"]);
    }

    #[test]
    fn test_capture_is_read_only() {
        let source = "class T { int b; int a; }";
        let root = parse(source).syntax();
        let decl = TypeDecl::cast(root.first_child().unwrap()).unwrap();
        let _ = CapturedType::capture(&decl);
        assert_eq!(root.text().to_string(), source);
    }
}

//! Typed AST layer over CST
//!
//! Thin, zero-cost wrappers over CST nodes. Each wrapper checks the node kind
//! in `cast()` and exposes accessors for the parts the rules need.
//!
//! # Example
//!
//! ```
//! use arrange_core::cst::ast::{AstNode, SourceFile};
//! use arrange_core::cst::parse;
//!
//! let root = parse("using System;\nclass Point { int x; }").syntax();
//! let file = SourceFile::cast(root).unwrap();
//!
//! assert_eq!(file.usings().next().unwrap().target().unwrap(), "System");
//! assert_eq!(file.type_decls().next().unwrap().name().unwrap(), "Point");
//! ```

use super::{SyntaxKind, SyntaxNode, SyntaxToken};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SyntaxKind) -> bool;
    fn cast(node: SyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident, $($kind:ident)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(node: SyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

/// Find first child of a specific kind
fn child_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

/// Find first direct token of a specific kind
fn token_of_kind(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .find(|t| t.kind() == kind)
}

/// Concatenated text of all non-trivia tokens under `node`
pub fn significant_text(node: &SyntaxNode) -> String {
    node.descendants_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
        .map(|t| t.text().to_string())
        .collect()
}

/// Text of the `Name` child, without trivia
fn name_text(node: &SyntaxNode) -> Option<String> {
    child_of_kind(node, SyntaxKind::Name).map(|name| significant_text(&name))
}

/// Value of the last identifier in the `Name` child
///
/// `IDisposable.Dispose` gives `Dispose` and `@class` gives `class`.
fn identifier_value(node: &SyntaxNode) -> Option<String> {
    let name = child_of_kind(node, SyntaxKind::Name)?;
    name.children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| t.kind() == SyntaxKind::Ident)
        .last()
        .map(|t| t.text().strip_prefix('@').unwrap_or(t.text()).to_string())
}

/// The identifier a declaration introduces
///
/// Explicit interface qualifiers and the verbatim `@` are not part of it. For
/// field and event declarations with several declarators this is the first
/// declarator's name. Operators, indexers and unrecognized members have no
/// name.
pub fn declared_name(node: &SyntaxNode) -> Option<String> {
    match node.kind() {
        SyntaxKind::FieldDecl | SyntaxKind::EventDecl => identifier_value(node).or_else(|| {
            child_of_kind(node, SyntaxKind::VariableDeclarator).and_then(|d| identifier_value(&d))
        }),
        _ => identifier_value(node),
    }
}

// ============================================================================
// File level
// ============================================================================

ast_node!(
    /// Root of a parsed document
    SourceFile,
    SourceFile
);

impl SourceFile {
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> {
        self.syntax.children().filter_map(UsingDirective::cast)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDecl> {
        self.syntax.children().filter_map(NamespaceDecl::cast)
    }

    pub fn type_decls(&self) -> impl Iterator<Item = TypeDecl> {
        self.syntax.children().filter_map(TypeDecl::cast)
    }
}

ast_node!(
    /// `namespace A.B { ... }` or `namespace A.B;`
    NamespaceDecl,
    NamespaceDecl
);

impl NamespaceDecl {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }

    pub fn is_file_scoped(&self) -> bool {
        token_of_kind(&self.syntax, SyntaxKind::LBrace).is_none()
    }

    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> {
        self.syntax.children().filter_map(UsingDirective::cast)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = NamespaceDecl> {
        self.syntax.children().filter_map(NamespaceDecl::cast)
    }

    pub fn type_decls(&self) -> impl Iterator<Item = TypeDecl> {
        self.syntax.children().filter_map(TypeDecl::cast)
    }
}

ast_node!(
    /// `[global] using [static] [Alias =] Target;`
    UsingDirective,
    UsingDirective
);

impl UsingDirective {
    /// Alias name for `using Alias = Target;`
    pub fn alias(&self) -> Option<String> {
        name_text(&self.syntax)
    }

    /// Imported namespace or type, without trivia
    pub fn target(&self) -> Option<String> {
        child_of_kind(&self.syntax, SyntaxKind::TypeRef)
            .map(|t| significant_text(&t))
            .filter(|t| !t.is_empty())
    }

    pub fn is_static(&self) -> bool {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::Modifier && t.text() == "static")
    }

    pub fn is_global(&self) -> bool {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::Ident && t.text() == "global")
    }

    /// Key identifying what this directive imports
    ///
    /// Two directives with the same key are duplicates of each other.
    pub fn import_key(&self) -> Option<String> {
        let target = self.target()?;
        let mut key = String::new();
        if self.is_static() {
            key.push_str("static ");
        }
        if let Some(alias) = self.alias() {
            key.push_str(&alias);
            key.push('=');
        }
        key.push_str(&target);
        Some(key)
    }
}

// ============================================================================
// Type declarations
// ============================================================================

ast_node!(
    /// Class, struct, record or interface declaration
    TypeDecl,
    ClassDecl | StructDecl | InterfaceDecl
);

impl TypeDecl {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }

    pub fn kind(&self) -> SyntaxKind {
        self.syntax.kind()
    }

    /// Whether members of this type get reordered
    pub fn is_arrangeable(&self) -> bool {
        self.kind().is_arrangeable_type()
    }

    /// Member declaration nodes in source order
    pub fn members(&self) -> impl Iterator<Item = SyntaxNode> {
        self.syntax.children().filter(|n| is_member_kind(n.kind()))
    }
}

/// Kinds that may appear as members of a type body
pub fn is_member_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::FieldDecl
            | SyntaxKind::EventDecl
            | SyntaxKind::PropertyDecl
            | SyntaxKind::ConstructorDecl
            | SyntaxKind::DestructorDecl
            | SyntaxKind::MethodDecl
            | SyntaxKind::OperatorDecl
            | SyntaxKind::IndexerDecl
            | SyntaxKind::EnumDecl
            | SyntaxKind::DelegateDecl
            | SyntaxKind::ClassDecl
            | SyntaxKind::StructDecl
            | SyntaxKind::InterfaceDecl
            | SyntaxKind::UnknownMember
    )
}

ast_node!(
    /// `enum Name { ... }`
    EnumDecl,
    EnumDecl
);

impl EnumDecl {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }
}

// ============================================================================
// Members
// ============================================================================

ast_node!(
    /// Field declaration with one or more declarators
    FieldDecl,
    FieldDecl
);

impl FieldDecl {
    pub fn declarators(&self) -> impl Iterator<Item = VariableDeclarator> {
        self.syntax.children().filter_map(VariableDeclarator::cast)
    }

    /// Name of the first declarator
    pub fn first_name(&self) -> Option<String> {
        self.declarators().next().and_then(|d| d.name())
    }

    pub fn type_ref(&self) -> Option<String> {
        child_of_kind(&self.syntax, SyntaxKind::TypeRef).map(|t| significant_text(&t))
    }
}

ast_node!(
    /// One `name [= value]` part of a field or event declaration
    VariableDeclarator,
    VariableDeclarator
);

impl VariableDeclarator {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }

    pub fn has_initializer(&self) -> bool {
        child_of_kind(&self.syntax, SyntaxKind::Initializer).is_some()
    }
}

ast_node!(
    /// Event field (`event T a, b;`) or event with accessors
    EventDecl,
    EventDecl
);

impl EventDecl {
    pub fn name(&self) -> Option<String> {
        declared_name(&self.syntax)
    }

    pub fn has_accessors(&self) -> bool {
        child_of_kind(&self.syntax, SyntaxKind::AccessorList).is_some()
    }
}

ast_node!(PropertyDecl, PropertyDecl);

impl PropertyDecl {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }
}

ast_node!(ConstructorDecl, ConstructorDecl);

impl ConstructorDecl {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }

    pub fn is_static(&self) -> bool {
        self.syntax
            .children_with_tokens()
            .filter_map(|e| e.into_token())
            .any(|t| t.kind() == SyntaxKind::Modifier && t.text() == "static")
    }
}

ast_node!(MethodDecl, MethodDecl);

impl MethodDecl {
    pub fn name(&self) -> Option<String> {
        name_text(&self.syntax)
    }

    pub fn is_generic(&self) -> bool {
        child_of_kind(&self.syntax, SyntaxKind::TypeParamList).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse;

    fn source_file(source: &str) -> SourceFile {
        SourceFile::cast(parse(source).syntax()).unwrap()
    }

    #[test]
    fn test_using_directives() {
        let file = source_file(
            "using System;\nusing static System.Math;\nusing IO = System . IO;\nglobal using System.Linq;\n",
        );
        let usings: Vec<UsingDirective> = file.usings().collect();
        assert_eq!(usings.len(), 4);

        assert_eq!(usings[0].target().unwrap(), "System");
        assert!(!usings[0].is_static());

        assert!(usings[1].is_static());
        assert_eq!(usings[1].import_key().unwrap(), "static System.Math");

        assert_eq!(usings[2].alias().unwrap(), "IO");
        assert_eq!(usings[2].target().unwrap(), "System.IO");
        assert_eq!(usings[2].import_key().unwrap(), "IO=System.IO");

        assert!(usings[3].is_global());
        assert_eq!(usings[3].target().unwrap(), "System.Linq");
    }

    #[test]
    fn test_type_members() {
        let file = source_file(
            "class Widget<T>\n{\n    int a, b;\n    public Widget() { }\n    void Run<U>() { }\n    class Inner { }\n}\n",
        );
        let widget = file.type_decls().next().unwrap();
        assert_eq!(widget.name().unwrap(), "Widget");
        assert!(widget.is_arrangeable());

        let members: Vec<SyntaxNode> = widget.members().collect();
        assert_eq!(members.len(), 4);

        let field = FieldDecl::cast(members[0].clone()).unwrap();
        let names: Vec<String> = field.declarators().filter_map(|d| d.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(field.first_name().unwrap(), "a");
        assert_eq!(field.type_ref().unwrap(), "int");

        let ctor = ConstructorDecl::cast(members[1].clone()).unwrap();
        assert_eq!(ctor.name().unwrap(), "Widget");

        let method = MethodDecl::cast(members[2].clone()).unwrap();
        assert_eq!(method.name().unwrap(), "Run");
        assert!(method.is_generic());

        let inner = TypeDecl::cast(members[3].clone()).unwrap();
        assert_eq!(inner.name().unwrap(), "Inner");
    }

    #[test]
    fn test_declared_name() {
        let file = source_file(
            "struct S { event Action Changed, Reset; event Action Custom { add { } remove { } } int this[int i] => i; }",
        );
        let members: Vec<SyntaxNode> = file.type_decls().next().unwrap().members().collect();
        assert_eq!(declared_name(&members[0]).unwrap(), "Changed");
        assert_eq!(declared_name(&members[1]).unwrap(), "Custom");
        assert!(EventDecl::cast(members[1].clone()).unwrap().has_accessors());
        assert_eq!(declared_name(&members[2]), None);
    }

    #[test]
    fn test_declared_name_is_the_identifier_value() {
        let file = source_file("class C : IZ { void IZ.Alpha() { } int @b; int @class, c; }");
        let members: Vec<SyntaxNode> = file.type_decls().next().unwrap().members().collect();
        assert_eq!(declared_name(&members[0]).unwrap(), "Alpha");
        assert_eq!(declared_name(&members[1]).unwrap(), "b");
        assert_eq!(declared_name(&members[2]).unwrap(), "class");
    }

    #[test]
    fn test_namespaces() {
        let file = source_file("namespace Outer.Inner\n{\n    using System;\n    interface IThing { }\n}\n");
        let namespace = file.namespaces().next().unwrap();
        assert_eq!(namespace.name().unwrap(), "Outer.Inner");
        assert!(!namespace.is_file_scoped());
        assert_eq!(namespace.usings().count(), 1);

        let thing = namespace.type_decls().next().unwrap();
        assert_eq!(thing.kind(), SyntaxKind::InterfaceDecl);
        assert!(!thing.is_arrangeable());
    }
}

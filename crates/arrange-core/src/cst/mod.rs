//! Concrete Syntax Tree (CST) for C#
//!
//! A lossless syntax tree built on Rowan. Every byte of the source,
//! including whitespace, comments and preprocessor lines, is kept in the
//! tree, so a rewritten tree prints back to the original text except where a
//! rule deliberately moved or removed nodes.
//!
//! ## Architecture
//!
//! - **Green tree**: immutable, position independent and cheap to clone.
//!   Rules build new trees by swapping green children.
//! - **Red tree**: the `SyntaxNode` view with parent pointers and offsets,
//!   created on demand for traversal.
//!
//! ## Trivia Handling
//!
//! Trivia is owned by declarations:
//! - **Leading trivia**: everything between the previous declaration and the
//!   first token of this one (blank lines, doc comments, attributes' spacing)
//! - **Trailing trivia**: everything after the last token up to and including
//!   the first line break
//!
//! Whitespace and comments in front of a closing `}` belong to the enclosing
//! body.
//!
//! ## Example
//!
//! ```
//! use arrange_core::cst::{SyntaxKind, parse};
//!
//! let source = "class A\n{\n    // counter\n    int count;\n}\n";
//! let parse = parse(source);
//! assert_eq!(parse.syntax().text().to_string(), source);
//!
//! let field = parse
//!     .syntax()
//!     .descendants()
//!     .find(|n| n.kind() == SyntaxKind::FieldDecl)
//!     .unwrap();
//! assert!(field.text().to_string().contains("// counter"));
//! ```

mod language;
mod lexer;
mod parser;
mod syntax_kind;

pub mod ast;

pub use language::{CsLanguage, SyntaxElement, SyntaxNode, SyntaxToken};
pub use lexer::{LexError, LexResult, Span, Token, lex};
pub use parser::{Parse, ParseError, parse};
pub use syntax_kind::SyntaxKind;

//! Relief - The sculptured element tree for Vize JSX templates.
//!
//! Like the raised surface of a relief sculpture, this crate holds the shape
//! the compiler carves from: an arena-allocated JSX element tree with byte
//! offsets on every node, the compiler error model, and the JSX syntax adapter
//! that lowers oxc's JSX AST into that tree.
//!
//! # Example
//!
//! ```
//! use vize_relief::{parse, Bump, TemplateChildNode};
//!
//! let bump = Bump::new();
//! let (root, errors) = parse(&bump, "<div id=\"app\">{msg}</div>");
//! assert!(errors.is_empty());
//! assert!(matches!(root.children[0], TemplateChildNode::Element(_)));
//! ```

pub mod ast;
pub mod errors;
pub mod options;
pub mod parser;

pub use ast::*;
pub use errors::{CompilerError, ErrorCode};
pub use options::ParserOptions;
pub use parser::{clean_jsx_text, is_component_tag, parse, parse_with_options, JsxParser};

pub use vize_carton::Bump;

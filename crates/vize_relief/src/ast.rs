//! JSX template AST node types.
//!
//! This module defines the element tree the compiler consumes. All nodes are
//! allocated in a bumpalo arena and carry byte offsets so that expressions can
//! be sliced from the original source and mapped back in source maps.

use serde::{Deserialize, Serialize};
use vize_carton::{Box, Bump, String, Vec};

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Root = 0,
    Fragment = 1,
    Element = 2,
    Text = 3,
    ExpressionContainer = 4,
    Attribute = 5,
    NamespacedAttribute = 6,
    SpreadAttribute = 7,
}

/// Element type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ElementType {
    #[default]
    Element = 0,
    Component = 1,
    Template = 2,
}

/// Source position in the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    /// Byte offset from start of file
    pub offset: u32,
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Position {
    pub const fn new(offset: u32, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }
}

/// Source location span [start, end)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
    pub source: String,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::STUB
    }
}

impl SourceLocation {
    /// Stub location for generated nodes
    pub const STUB: Self = Self {
        start: Position {
            offset: 0,
            line: 1,
            column: 1,
        },
        end: Position {
            offset: 0,
            line: 1,
            column: 1,
        },
        source: String::const_new(""),
    };

    pub fn new(start: Position, end: Position, source: impl Into<String>) -> Self {
        Self {
            start,
            end,
            source: source.into(),
        }
    }

    pub fn is_stub(&self) -> bool {
        self.start.offset == 0 && self.end.offset == 0
    }
}

/// Root AST node
#[derive(Debug)]
pub struct RootNode<'a> {
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub source: String,
    pub loc: SourceLocation,
}

impl<'a> RootNode<'a> {
    pub fn new(allocator: &'a Bump, source: impl Into<String>) -> Self {
        Self {
            children: Vec::new_in(allocator),
            source: source.into(),
            loc: SourceLocation::STUB,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Root
    }
}

// ============================================================================
// Template Nodes
// ============================================================================

/// All template child node types
#[derive(Debug)]
pub enum TemplateChildNode<'a> {
    Element(Box<'a, ElementNode<'a>>),
    Fragment(Box<'a, FragmentNode<'a>>),
    Text(Box<'a, TextNode>),
    ExpressionContainer(Box<'a, ExpressionContainerNode<'a>>),
}

impl<'a> TemplateChildNode<'a> {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Element(_) => NodeType::Element,
            Self::Fragment(_) => NodeType::Fragment,
            Self::Text(_) => NodeType::Text,
            Self::ExpressionContainer(_) => NodeType::ExpressionContainer,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Element(n) => &n.loc,
            Self::Fragment(n) => &n.loc,
            Self::Text(n) => &n.loc,
            Self::ExpressionContainer(n) => &n.loc,
        }
    }

    /// Text and expression containers render as text runs when grouped.
    pub fn is_text_like(&self) -> bool {
        matches!(self, Self::Text(_) | Self::ExpressionContainer(_))
    }
}

/// Element node
#[derive(Debug)]
pub struct ElementNode<'a> {
    /// Tag name; dotted for member tags (`Foo.Bar`), `ns:name` for namespaced tags
    pub tag: String,
    pub tag_type: ElementType,
    pub props: Vec<'a, PropNode<'a>>,
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub is_self_closing: bool,
    pub loc: SourceLocation,
}

impl<'a> ElementNode<'a> {
    pub fn new(allocator: &'a Bump, tag: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            tag: tag.into(),
            tag_type: ElementType::Element,
            props: Vec::new_in(allocator),
            children: Vec::new_in(allocator),
            is_self_closing: false,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::Element
    }

    /// Find an attribute by its name (namespace part for namespaced attributes).
    pub fn find_attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.props.iter().find_map(|prop| match prop {
            PropNode::Attribute(attr) if attr.name == name => Some(&**attr),
            _ => None,
        })
    }

    /// Whether any spread attribute is present.
    pub fn has_spread(&self) -> bool {
        self.props.iter().any(|p| matches!(p, PropNode::Spread(_)))
    }
}

/// `<>...</>` fragment node
#[derive(Debug)]
pub struct FragmentNode<'a> {
    pub children: Vec<'a, TemplateChildNode<'a>>,
    pub loc: SourceLocation,
}

impl<'a> FragmentNode<'a> {
    pub fn new(allocator: &'a Bump, loc: SourceLocation) -> Self {
        Self {
            children: Vec::new_in(allocator),
            loc,
        }
    }
}

/// Static JSX text (already whitespace-normalized)
#[derive(Debug, Clone)]
pub struct TextNode {
    pub content: String,
    pub loc: SourceLocation,
}

impl TextNode {
    pub fn new(content: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            loc,
        }
    }
}

/// `{expression}` child
#[derive(Debug)]
pub struct ExpressionContainerNode<'a> {
    pub expression: SimpleExpressionNode,
    /// JSX roots inside the expression, in source order. Each one is wrapped
    /// in a fragment located at the JSX source.
    pub jsx: Vec<'a, FragmentNode<'a>>,
    pub loc: SourceLocation,
}

/// Prop node (attribute or spread)
#[derive(Debug)]
pub enum PropNode<'a> {
    Attribute(Box<'a, AttributeNode>),
    Spread(Box<'a, SpreadNode>),
}

impl<'a> PropNode<'a> {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Attribute(n) => &n.loc,
            Self::Spread(n) => &n.loc,
        }
    }
}

/// Attribute node.
///
/// For namespaced attributes (`v-slot:header`, `onUpdate:title`) `name` holds the
/// namespace and `arg` the local part.
#[derive(Debug, Clone)]
pub struct AttributeNode {
    pub name: String,
    pub arg: Option<String>,
    pub name_loc: SourceLocation,
    /// `None` for boolean attributes (`<input disabled />`)
    pub value: Option<SimpleExpressionNode>,
    pub loc: SourceLocation,
}

impl AttributeNode {
    pub fn new(name: impl Into<String>, loc: SourceLocation) -> Self {
        Self {
            name: name.into(),
            arg: None,
            name_loc: loc.clone(),
            value: None,
            loc,
        }
    }

    pub fn node_type(&self) -> NodeType {
        if self.arg.is_some() {
            NodeType::NamespacedAttribute
        } else {
            NodeType::Attribute
        }
    }

    /// Full attribute name as written, e.g. `v-slot:header`.
    pub fn raw_name(&self) -> String {
        match &self.arg {
            Some(arg) => {
                let mut name = self.name.clone();
                name.push(':');
                name.push_str(arg);
                name
            }
            None => self.name.clone(),
        }
    }
}

/// `{...expression}` attribute
#[derive(Debug, Clone)]
pub struct SpreadNode {
    pub exp: SimpleExpressionNode,
    pub loc: SourceLocation,
}

/// Expression text with its location in the original source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleExpressionNode {
    pub content: String,
    /// Static string literal (attribute string value, static key)
    pub is_static: bool,
    pub loc: SourceLocation,
}

impl SimpleExpressionNode {
    pub fn new(content: impl Into<String>, is_static: bool, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            is_static,
            loc,
        }
    }

    /// Static expression with a stub location
    pub fn static_str(content: impl Into<String>) -> Self {
        Self::new(content, true, SourceLocation::STUB)
    }

    /// Dynamic expression with a stub location
    pub fn dynamic(content: impl Into<String>) -> Self {
        Self::new(content, false, SourceLocation::STUB)
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_name() {
        let mut attr = AttributeNode::new("v-slot", SourceLocation::STUB);
        assert_eq!(attr.raw_name().as_str(), "v-slot");
        attr.arg = Some(String::from("header"));
        assert_eq!(attr.raw_name().as_str(), "v-slot:header");
        assert_eq!(attr.node_type(), NodeType::NamespacedAttribute);
    }

    #[test]
    fn test_find_attribute() {
        let bump = Bump::new();
        let mut el = ElementNode::new(&bump, "input", SourceLocation::STUB);
        el.props.push(PropNode::Attribute(Box::new_in(
            AttributeNode::new("type", SourceLocation::STUB),
            &bump,
        )));
        assert!(el.find_attribute("type").is_some());
        assert!(el.find_attribute("value").is_none());
        assert!(!el.has_spread());
    }
}

//! JSX syntax adapter.
//!
//! Parses the source with oxc as a single JSX expression and lowers the oxc
//! JSX AST into the relief element tree. Expressions are kept as source slices
//! with their byte offsets; the compiler re-parses them on demand.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Expression, JSXAttributeItem, JSXAttributeName, JSXAttributeValue, JSXChild, JSXElement,
    JSXElementName, JSXExpression, JSXFragment, JSXMemberExpression, JSXMemberExpressionObject,
};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use vize_carton::{Box, Bump, String, Vec};

use crate::ast::*;
use crate::errors::{CompilerError, ErrorCode};
use crate::options::ParserOptions;

/// Lowers an oxc JSX tree into relief nodes
pub struct JsxParser<'a, 's> {
    /// Arena allocator for relief nodes
    allocator: &'a Bump,
    /// Source code
    source: &'s str,
    /// Parser options
    options: ParserOptions,
    /// Errors collected during parsing
    errors: std::vec::Vec<CompilerError>,
    /// Newline positions for calculating line/column
    newlines: std::vec::Vec<usize>,
}

impl<'a, 's> JsxParser<'a, 's> {
    pub fn new(allocator: &'a Bump, source: &'s str, options: ParserOptions) -> Self {
        let newlines = source
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self {
            allocator,
            source,
            options,
            errors: std::vec::Vec::new(),
            newlines,
        }
    }

    /// Parse the source and return the tree along with syntax errors
    pub fn parse(mut self) -> (RootNode<'a>, std::vec::Vec<CompilerError>) {
        let mut root = RootNode::new(self.allocator, self.source);
        root.loc = self.create_loc(0, self.source.len());

        let oxc_allocator = Allocator::default();
        let parsed = Parser::new(&oxc_allocator, self.source, SourceType::tsx()).parse_expression();

        match parsed {
            Ok(expression) => match unwrap_parens(&expression) {
                Expression::JSXElement(element) => {
                    let node = self.lower_element(element);
                    root.children.push(node);
                }
                Expression::JSXFragment(fragment) => {
                    root.children = self.lower_children(&fragment.children);
                }
                other => {
                    let span = other.span();
                    let loc = self.create_loc(span.start as usize, span.end as usize);
                    self.errors
                        .push(CompilerError::new(ErrorCode::UnexpectedRoot, Some(loc)));
                }
            },
            Err(diagnostics) => {
                for diagnostic in diagnostics {
                    let loc = diagnostic
                        .labels
                        .as_ref()
                        .and_then(|labels| labels.first())
                        .map(|label| self.create_loc(label.offset(), label.offset() + label.len()));
                    self.errors.push(CompilerError::with_message(
                        ErrorCode::JsxParseError,
                        loc,
                        diagnostic.to_string(),
                    ));
                }
            }
        }

        (root, self.errors)
    }

    /// Calculate position from byte offset
    fn get_pos(&self, offset: usize) -> Position {
        let line = match self.newlines.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i + 1,
        };
        let column = if line == 1 {
            offset + 1
        } else {
            offset - self.newlines[line - 2]
        };
        Position::new(offset as u32, line as u32, column as u32)
    }

    fn create_loc(&self, start: usize, end: usize) -> SourceLocation {
        let end = end.min(self.source.len());
        let start = start.min(end);
        SourceLocation::new(
            self.get_pos(start),
            self.get_pos(end),
            self.source.get(start..end).unwrap_or_default(),
        )
    }

    fn span_loc(&self, span: Span) -> SourceLocation {
        self.create_loc(span.start as usize, span.end as usize)
    }

    fn expression(&self, expression: &Expression<'_>) -> SimpleExpressionNode {
        let loc = self.span_loc(expression.span());
        SimpleExpressionNode::new(loc.source.clone(), false, loc)
    }

    fn lower_element<'o>(&mut self, element: &JSXElement<'o>) -> TemplateChildNode<'a> {
        let opening = &element.opening_element;
        let tag = tag_name(&opening.name);
        let mut node = ElementNode::new(self.allocator, tag, self.span_loc(element.span));
        node.tag_type = self.element_type(&node.tag);
        node.is_self_closing = element.closing_element.is_none();

        for item in &opening.attributes {
            let prop = match item {
                JSXAttributeItem::Attribute(attr) => {
                    let mut attribute = AttributeNode::new("", self.span_loc(attr.span));
                    match &attr.name {
                        JSXAttributeName::Identifier(id) => {
                            attribute.name = String::from(id.name.as_str());
                            attribute.name_loc = self.span_loc(id.span);
                        }
                        JSXAttributeName::NamespacedName(ns) => {
                            attribute.name = String::from(ns.namespace.name.as_str());
                            attribute.arg = Some(String::from(ns.name.name.as_str()));
                            attribute.name_loc = self.span_loc(ns.span);
                        }
                    }
                    attribute.value = attr.value.as_ref().map(|value| self.lower_value(value));
                    PropNode::Attribute(Box::new_in(attribute, self.allocator))
                }
                JSXAttributeItem::SpreadAttribute(spread) => PropNode::Spread(Box::new_in(
                    SpreadNode {
                        exp: self.expression(&spread.argument),
                        loc: self.span_loc(spread.span),
                    },
                    self.allocator,
                )),
            };
            node.props.push(prop);
        }

        node.children = self.lower_children(&element.children);
        TemplateChildNode::Element(Box::new_in(node, self.allocator))
    }

    fn lower_value<'o>(&mut self, value: &JSXAttributeValue<'o>) -> SimpleExpressionNode {
        match value {
            JSXAttributeValue::StringLiteral(lit) => {
                SimpleExpressionNode::new(lit.value.as_str(), true, self.span_loc(lit.span))
            }
            JSXAttributeValue::ExpressionContainer(container) => match &container.expression {
                JSXExpression::EmptyExpression(empty) => {
                    SimpleExpressionNode::new("", false, self.span_loc(empty.span))
                }
                expression => match expression.as_expression() {
                    Some(expression) => self.expression(expression),
                    None => SimpleExpressionNode::new("", false, self.span_loc(container.span)),
                },
            },
            JSXAttributeValue::Element(element) => {
                let loc = self.span_loc(element.span);
                SimpleExpressionNode::new(loc.source.clone(), false, loc)
            }
            JSXAttributeValue::Fragment(fragment) => {
                let loc = self.span_loc(fragment.span);
                SimpleExpressionNode::new(loc.source.clone(), false, loc)
            }
        }
    }

    fn lower_children<'o>(
        &mut self,
        children: &oxc_allocator::Vec<'o, JSXChild<'o>>,
    ) -> Vec<'a, TemplateChildNode<'a>> {
        let mut result = Vec::new_in(self.allocator);
        for child in children {
            match child {
                JSXChild::Text(text) => {
                    let content = clean_jsx_text(text.value.as_str());
                    if !content.is_empty() {
                        let node = TextNode::new(content, self.span_loc(text.span));
                        result.push(TemplateChildNode::Text(Box::new_in(node, self.allocator)));
                    }
                }
                JSXChild::Element(element) => result.push(self.lower_element(element)),
                // Nested fragments have no DOM node of their own.
                JSXChild::Fragment(fragment) => {
                    for node in self.lower_children(&fragment.children) {
                        result.push(node);
                    }
                }
                JSXChild::ExpressionContainer(container) => {
                    let Some(expression) = container.expression.as_expression() else {
                        // `{/* comment */}`
                        continue;
                    };
                    let node = ExpressionContainerNode {
                        expression: self.expression(expression),
                        jsx: self.lower_nested_jsx(expression),
                        loc: self.span_loc(container.span),
                    };
                    result.push(TemplateChildNode::ExpressionContainer(Box::new_in(
                        node,
                        self.allocator,
                    )));
                }
                JSXChild::Spread(spread) => {
                    let node = ExpressionContainerNode {
                        expression: self.expression(&spread.expression),
                        jsx: self.lower_nested_jsx(&spread.expression),
                        loc: self.span_loc(spread.span),
                    };
                    result.push(TemplateChildNode::ExpressionContainer(Box::new_in(
                        node,
                        self.allocator,
                    )));
                }
            }
        }
        result
    }

    /// Lower the outermost JSX elements and fragments inside `expression`.
    fn lower_nested_jsx<'o>(&mut self, expression: &Expression<'o>) -> Vec<'a, FragmentNode<'a>> {
        let mut lowering = NestedJsx {
            roots: Vec::new_in(self.allocator),
            parser: self,
        };
        lowering.visit_expression(expression);
        lowering.roots
    }

    fn element_type(&self, tag: &str) -> ElementType {
        if tag == "template" {
            ElementType::Template
        } else if is_component_tag(tag) && !self.options.is_custom_element(tag) {
            ElementType::Component
        } else {
            ElementType::Element
        }
    }
}

struct NestedJsx<'p, 'a, 's> {
    parser: &'p mut JsxParser<'a, 's>,
    roots: Vec<'a, FragmentNode<'a>>,
}

// Nested roots are not walked: their own expression children are lowered
// along with them.
impl<'o> Visit<'o> for NestedJsx<'_, '_, '_> {
    fn visit_jsx_element(&mut self, it: &JSXElement<'o>) {
        let mut root = FragmentNode::new(self.parser.allocator, self.parser.span_loc(it.span));
        root.children.push(self.parser.lower_element(it));
        self.roots.push(root);
    }

    fn visit_jsx_fragment(&mut self, it: &JSXFragment<'o>) {
        let mut root = FragmentNode::new(self.parser.allocator, self.parser.span_loc(it.span));
        root.children = self.parser.lower_children(&it.children);
        self.roots.push(root);
    }
}

fn unwrap_parens<'e, 'o>(expression: &'e Expression<'o>) -> &'e Expression<'o> {
    match expression {
        Expression::ParenthesizedExpression(paren) => unwrap_parens(&paren.expression),
        other => other,
    }
}

fn tag_name(name: &JSXElementName<'_>) -> String {
    match name {
        JSXElementName::Identifier(id) => String::from(id.name.as_str()),
        JSXElementName::IdentifierReference(id) => String::from(id.name.as_str()),
        JSXElementName::NamespacedName(ns) => {
            vize_carton::format_compact!("{}:{}", ns.namespace.name, ns.name.name)
        }
        JSXElementName::MemberExpression(member) => member_name(member),
        JSXElementName::ThisExpression(_) => String::from("this"),
    }
}

fn member_name(member: &JSXMemberExpression<'_>) -> String {
    let mut name = match &member.object {
        JSXMemberExpressionObject::IdentifierReference(id) => String::from(id.name.as_str()),
        JSXMemberExpressionObject::MemberExpression(inner) => member_name(inner),
        _ => String::from("this"),
    };
    name.push('.');
    name.push_str(member.property.name.as_str());
    name
}

/// Components start with an uppercase letter, are member paths, or are `<component>`.
pub fn is_component_tag(tag: &str) -> bool {
    tag == "component"
        || tag.contains('.')
        || tag.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Normalize JSX text whitespace.
///
/// Lines are trimmed except at the outer edges of the text, blank lines are
/// dropped, and the remaining lines are joined by a single space.
pub fn clean_jsx_text(value: &str) -> String {
    if !value.contains('\n') {
        return String::from(value.replace('\t', " ").as_str());
    }
    let lines: std::vec::Vec<&str> = value.split('\n').collect();
    let last_non_empty = lines
        .iter()
        .rposition(|line| line.chars().any(|c| !c.is_whitespace()));

    let mut result = String::default();
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim_end_matches('\r');
        let mut trimmed: &str = line;
        if i != 0 {
            trimmed = trimmed.trim_start();
        }
        if i != lines.len() - 1 {
            trimmed = trimmed.trim_end();
        }
        if trimmed.is_empty() {
            continue;
        }
        result.push_str(&trimmed.replace('\t', " "));
        if last_non_empty.is_some_and(|last| i < last) {
            result.push(' ');
        }
    }
    result
}

/// Parse a JSX template
pub fn parse<'a>(
    allocator: &'a Bump,
    source: &str,
) -> (RootNode<'a>, std::vec::Vec<CompilerError>) {
    JsxParser::new(allocator, source, ParserOptions::default()).parse()
}

/// Parse a JSX template with options
pub fn parse_with_options<'a>(
    allocator: &'a Bump,
    source: &str,
    options: ParserOptions,
) -> (RootNode<'a>, std::vec::Vec<CompilerError>) {
    JsxParser::new(allocator, source, options).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_element() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div></div>");

        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 1);

        if let TemplateChildNode::Element(el) = &root.children[0] {
            assert_eq!(el.tag.as_str(), "div");
            assert_eq!(el.tag_type, ElementType::Element);
            assert!(!el.is_self_closing);
        } else {
            panic!("Expected element node");
        }
    }

    #[test]
    fn test_parse_fragment_root() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<><span /><b /></>");

        assert!(errors.is_empty());
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_parse_attributes() {
        let allocator = Bump::new();
        let (root, errors) = parse(
            &allocator,
            r#"<input id="a" disabled value={msg} v-model:title_trim={t} {...rest} />"#,
        );
        assert!(errors.is_empty());

        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        assert!(el.is_self_closing);
        assert_eq!(el.props.len(), 5);

        let id = el.find_attribute("id").unwrap();
        let value = id.value.as_ref().unwrap();
        assert!(value.is_static);
        assert_eq!(value.content.as_str(), "a");

        assert!(el.find_attribute("disabled").unwrap().value.is_none());

        let value = el.find_attribute("value").unwrap().value.as_ref().unwrap();
        assert!(!value.is_static);
        assert_eq!(value.content.as_str(), "msg");
        assert_eq!(value.loc.start.offset, 30);

        let model = el.find_attribute("v-model").unwrap();
        assert_eq!(model.arg.as_deref(), Some("title_trim"));

        assert!(el.has_spread());
    }

    #[test]
    fn test_nested_fragment_is_flattened() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div><><b /><i /></><u /></div>");
        assert!(errors.is_empty());
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        assert_eq!(el.children.len(), 3);
    }

    #[test]
    fn test_parse_component_classification() {
        let allocator = Bump::new();
        let (root, _) = parse(
            &allocator,
            "<div><Comp /><Foo.Bar /><component is={x} /><template /><my-el /></div>",
        );
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        let types: std::vec::Vec<ElementType> = el
            .children
            .iter()
            .map(|c| match c {
                TemplateChildNode::Element(e) => e.tag_type,
                _ => panic!("Expected element node"),
            })
            .collect();
        assert_eq!(
            types,
            vec![
                ElementType::Component,
                ElementType::Component,
                ElementType::Component,
                ElementType::Template,
                ElementType::Element,
            ]
        );
    }

    #[test]
    fn test_parse_custom_element() {
        let allocator = Bump::new();
        let options = ParserOptions {
            is_custom_element: Some(|tag| tag.starts_with("Ion")),
            ..Default::default()
        };
        let (root, _) = parse_with_options(&allocator, "<IonButton />", options);
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        assert_eq!(el.tag_type, ElementType::Element);
    }

    #[test]
    fn test_parse_children() {
        let allocator = Bump::new();
        let (root, errors) = parse(
            &allocator,
            "<div>\n  hello\n  world {/* comment */}{msg}\n</div>",
        );
        assert!(errors.is_empty());
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        assert_eq!(el.children.len(), 2);
        let TemplateChildNode::Text(text) = &el.children[0] else {
            panic!("Expected text node");
        };
        assert_eq!(text.content.as_str(), "hello world ");
        assert!(matches!(
            el.children[1],
            TemplateChildNode::ExpressionContainer(_)
        ));
    }

    #[test]
    fn test_nested_jsx_in_expression() {
        let allocator = Bump::new();
        let (root, errors) = parse(&allocator, "<div>{ok ? <span>{a}</span> : <>b</>}</div>");
        assert!(errors.is_empty());
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        let TemplateChildNode::ExpressionContainer(container) = &el.children[0] else {
            panic!("Expected expression container");
        };
        assert_eq!(container.jsx.len(), 2);
        assert_eq!(container.jsx[0].loc.source.as_str(), "<span>{a}</span>");
        assert_eq!(container.jsx[0].loc.start.offset, 11);
        let TemplateChildNode::Element(span) = &container.jsx[0].children[0] else {
            panic!("Expected nested element");
        };
        assert_eq!(span.tag.as_str(), "span");
        assert!(matches!(span.children[0], TemplateChildNode::ExpressionContainer(_)));
        assert!(matches!(container.jsx[1].children[0], TemplateChildNode::Text(_)));
    }

    #[test]
    fn test_clean_jsx_text() {
        assert_eq!(clean_jsx_text("  a  ").as_str(), "  a  ");
        assert_eq!(clean_jsx_text("\n  a\n  b\n").as_str(), "a b");
        assert_eq!(clean_jsx_text("\n   \n").as_str(), "");
        assert_eq!(clean_jsx_text(" ").as_str(), " ");
        assert_eq!(clean_jsx_text("\t").as_str(), " ");
        assert_eq!(clean_jsx_text("a\n   ").as_str(), "a");
    }

    #[test]
    fn test_positions() {
        let allocator = Bump::new();
        let (root, _) = parse(&allocator, "<div>\n  <span />\n</div>");
        let TemplateChildNode::Element(el) = &root.children[0] else {
            panic!("Expected element node");
        };
        let span = el.children[0].loc();
        assert_eq!(span.start.line, 2);
        assert_eq!(span.start.column, 3);
        assert_eq!(span.source.as_str(), "<span />");
    }

    #[test]
    fn test_parse_errors() {
        let allocator = Bump::new();
        let (_, errors) = parse(&allocator, "<div>");
        assert!(!errors.is_empty());
        assert_eq!(errors[0].code, ErrorCode::JsxParseError);

        let (_, errors) = parse(&allocator, "a + b");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnexpectedRoot);
    }
}
